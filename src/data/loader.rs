use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::model::{
    coerce_label, coerce_number, coerce_year, required_columns, Dataset, Indicator, Record,
    COUNTRY_COLUMN, INCOME_GROUP_COLUMN, REGION_COLUMN, YEAR_COLUMN,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("malformed CSV{}: {source}", line_suffix(.line))]
    Parse {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

impl From<csv::Error> for LoadError {
    fn from(source: csv::Error) -> Self {
        LoadError::Parse {
            line: source.position().map(|p| p.line()),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file chosen in the file dialog. Only `.csv` is
/// accepted.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext != "csv" {
        return Err(LoadError::UnsupportedExtension(ext));
    }

    let file = std::fs::File::open(path)?;
    load_reader(file)
}

/// Load a dataset from an in-memory upload (drag-and-drop).
pub fn load_bytes(bytes: &[u8]) -> Result<Dataset, LoadError> {
    load_reader(bytes)
}

/// Column positions of the required columns within the header row.
struct ColumnIndex {
    country: usize,
    region: usize,
    income_group: usize,
    year: usize,
    indicators: [usize; Indicator::COUNT],
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = required_columns()
            .filter(|name| position(name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        // Every lookup below succeeds after the check above.
        let at = |name: &str| position(name).unwrap_or_default();
        Ok(ColumnIndex {
            country: at(COUNTRY_COLUMN),
            region: at(REGION_COLUMN),
            income_group: at(INCOME_GROUP_COLUMN),
            year: at(YEAR_COLUMN),
            indicators: Indicator::ALL.map(|ind| at(ind.column())),
        })
    }
}

/// CSV layout: header row with column names, one country-year per line.
/// Columns beyond the required set are kept for the preview only.
pub fn load_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let index = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    let mut cells = Vec::new();

    for result in reader.records() {
        let row = result?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let mut record = Record::new(
            coerce_label(cell(index.country)),
            coerce_label(cell(index.region)),
            coerce_label(cell(index.income_group)),
            coerce_year(cell(index.year)),
        );
        for (indicator, &idx) in Indicator::ALL.iter().zip(index.indicators.iter()) {
            record.set_value(*indicator, coerce_number(cell(idx)));
        }

        records.push(record);
        cells.push(row.iter().map(str::to_string).collect());
    }

    Ok(Dataset::new(headers, records, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Country Name,Region,IncomeGroup,Year,Life Expectancy World Bank,CO2,\
Health Expenditure %,Education Expenditure %,Unemployment,Prevelance of Undernourishment,\
Corruption,Communicable,NonCommunicable";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn loads_rows_and_coerces_indicators() {
        let text = csv_text(&[
            "India,South Asia,Lower middle income,2010,65.0,1.4,3.3,3.8,5.6,17.5,n/a,30.1,55.2",
            "Chile,Latin America & Caribbean,High income,2012,79.0,4.6,7.1,4.5,6.4,,2.5,5.0,80.0",
        ]);
        let ds = load_bytes(text.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        let india = &ds.records()[0];
        assert_eq!(india.country.as_deref(), Some("India"));
        assert_eq!(india.year, Some(2010));
        assert_eq!(india.value(Indicator::LifeExpectancy), Some(65.0));
        assert_eq!(india.value(Indicator::Corruption), None);

        let chile = &ds.records()[1];
        assert_eq!(chile.value(Indicator::Undernourishment), None);
        assert_eq!(chile.value(Indicator::Corruption), Some(2.5));
        assert_eq!(ds.regions(), ["South Asia", "Latin America & Caribbean"]);
    }

    #[test]
    fn keeps_extra_columns_for_preview() {
        let text = format!(
            "Country Code,{HEADER}\nIND,India,South Asia,Lower middle income,2010,65,1,3,4,5,17,3,30,55"
        );
        let ds = load_bytes(text.as_bytes()).unwrap();
        assert_eq!(ds.headers().len(), 14);
        assert_eq!(ds.headers()[0], "Country Code");
        assert_eq!(ds.cells()[0][0], "IND");
        assert_eq!(ds.records()[0].country.as_deref(), Some("India"));
    }

    #[test]
    fn missing_columns_are_a_schema_error() {
        let text = "Country Name,Region,Year\nIndia,South Asia,2010";
        match load_bytes(text.as_bytes()) {
            Err(LoadError::Schema { missing }) => {
                assert!(missing.contains(&"IncomeGroup".to_string()));
                assert!(missing.contains(&"Prevelance of Undernourishment".to_string()));
                assert!(!missing.contains(&"Region".to_string()));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn renamed_column_is_a_schema_error() {
        let text = HEADER.replace("Prevelance", "Prevalence");
        let err = load_bytes(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Schema { ref missing } if missing.len() == 1));
        assert!(err.to_string().contains("Prevelance of Undernourishment"));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let text = csv_text(&["India,South Asia,Lower middle income,2010,65.0"]);
        let err = load_bytes(text.as_bytes()).unwrap_err();
        match err {
            LoadError::Parse { line, .. } => assert!(line.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let mut bytes = csv_text(&[]).into_bytes();
        bytes.extend_from_slice(b"\nInd\xffia,South Asia,Lower middle income,2010,65,1,3,4,5,17,3,30,55");
        match load_bytes(&bytes) {
            Err(LoadError::Parse { line: Some(_), .. }) => {}
            other => panic!("expected parse error with a line, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_is_empty_dataset() {
        let ds = load_bytes(HEADER.as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.regions().is_empty());
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "{}",
            csv_text(&["India,South Asia,Lower middle income,2016,68.6,1.8,3.5,3.8,5.4,14.5,40,25,60"])
        )
        .unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].value(Indicator::Corruption), Some(40.0));
    }

    #[test]
    fn load_file_rejects_other_extensions() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("parquet");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "parquet"
        ));
    }
}
