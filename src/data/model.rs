use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COUNTRY_COLUMN: &str = "Country Name";
pub const REGION_COLUMN: &str = "Region";
pub const INCOME_GROUP_COLUMN: &str = "IncomeGroup";
pub const YEAR_COLUMN: &str = "Year";

/// Categorical columns every upload must carry, in addition to the
/// indicator columns listed by [`Indicator::ALL`].
pub const KEY_COLUMNS: [&str; 4] = [COUNTRY_COLUMN, REGION_COLUMN, INCOME_GROUP_COLUMN, YEAR_COLUMN];

/// Every column name the loader insists on, keys first.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    KEY_COLUMNS
        .into_iter()
        .chain(Indicator::ALL.into_iter().map(Indicator::column))
}

// ---------------------------------------------------------------------------
// Indicator – a numeric column of the upload
// ---------------------------------------------------------------------------

/// The numeric indicator columns used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indicator {
    LifeExpectancy,
    Co2,
    HealthExpenditure,
    EducationExpenditure,
    Unemployment,
    Undernourishment,
    Corruption,
    Communicable,
    NonCommunicable,
}

impl Indicator {
    pub const COUNT: usize = 9;

    pub const ALL: [Indicator; Self::COUNT] = [
        Indicator::LifeExpectancy,
        Indicator::Co2,
        Indicator::HealthExpenditure,
        Indicator::EducationExpenditure,
        Indicator::Unemployment,
        Indicator::Undernourishment,
        Indicator::Corruption,
        Indicator::Communicable,
        Indicator::NonCommunicable,
    ];

    /// Exact header text in the uploaded CSV.
    ///
    /// `Prevelance of Undernourishment` keeps the misspelling of the source
    /// data files.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::LifeExpectancy => "Life Expectancy World Bank",
            Indicator::Co2 => "CO2",
            Indicator::HealthExpenditure => "Health Expenditure %",
            Indicator::EducationExpenditure => "Education Expenditure %",
            Indicator::Unemployment => "Unemployment",
            Indicator::Undernourishment => "Prevelance of Undernourishment",
            Indicator::Corruption => "Corruption",
            Indicator::Communicable => "Communicable",
            Indicator::NonCommunicable => "NonCommunicable",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Record – one country-year row
// ---------------------------------------------------------------------------

/// One row of the uploaded table, with the categorical keys parsed and every
/// indicator coerced to a number (`None` when the cell is empty or not
/// numeric).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub country: Option<String>,
    pub region: Option<String>,
    pub income_group: Option<String>,
    pub year: Option<i32>,
    values: [Option<f64>; Indicator::COUNT],
}

impl Record {
    pub fn new(
        country: Option<String>,
        region: Option<String>,
        income_group: Option<String>,
        year: Option<i32>,
    ) -> Self {
        Record {
            country,
            region,
            income_group,
            year,
            values: [None; Indicator::COUNT],
        }
    }

    /// Coerced value of `indicator` for this row.
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.values[indicator.index()]
    }

    pub fn set_value(&mut self, indicator: Indicator, value: Option<f64>) {
        self.values[indicator.index()] = value;
    }

    #[cfg(test)]
    pub fn with(mut self, indicator: Indicator, value: f64) -> Self {
        self.set_value(indicator, Some(value));
        self
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Interpret a raw cell as a categorical label. Empty cells are missing.
pub fn coerce_label(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Interpret a raw cell as a number. Empty, non-numeric and NaN cells are
/// missing.
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Interpret a raw cell as a year. Accepts `2010` as well as `2010.0`.
pub fn coerce_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = coerce_number(trimmed)?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The uploaded table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// Header row as found in the file (required and extra columns).
    headers: Vec<String>,
    /// Raw cell text per row, for the preview table.
    cells: Vec<Vec<String>>,
    /// Distinct regions in order of first appearance.
    regions: Vec<String>,
    /// Distinct income groups in order of first appearance.
    income_groups: Vec<String>,
}

impl Dataset {
    /// Build a dataset and its option lists. `cells` may be empty when no
    /// preview text is available; otherwise it holds one entry per record.
    pub fn new(headers: Vec<String>, records: Vec<Record>, cells: Vec<Vec<String>>) -> Self {
        let regions = distinct_in_order(records.iter().filter_map(|r| r.region.as_deref()));
        let income_groups =
            distinct_in_order(records.iter().filter_map(|r| r.income_group.as_deref()));
        Dataset {
            records,
            headers,
            cells,
            regions,
            income_groups,
        }
    }

    /// Dataset without preview text.
    #[cfg(test)]
    pub fn from_records(records: Vec<Record>) -> Self {
        let headers = required_columns().map(str::to_string).collect();
        Dataset::new(headers, records, Vec::new())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn income_groups(&self) -> &[String] {
        &self.income_groups
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
