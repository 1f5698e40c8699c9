use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::filter::FilteredView;
use super::model::{Dataset, Indicator, Record};

// ---------------------------------------------------------------------------
// Mean accumulation
// ---------------------------------------------------------------------------

/// Running sum of the values present in a group; missing values are skipped.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    /// `None` when no value was present.
    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Per-group means of a fixed list of indicators. Keys are exactly the
/// distinct keys of the rows that went in; iteration follows `K`'s order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeans<K> {
    indicators: Vec<Indicator>,
    groups: BTreeMap<K, Vec<Option<f64>>>,
}

impl<K: Ord> GroupedMeans<K> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.keys()
    }

    /// Mean of `indicator` for `key`; `None` if the group is absent or had
    /// no value for that indicator.
    pub fn mean(&self, key: &K, indicator: Indicator) -> Option<f64> {
        let col = self.column_of(indicator)?;
        self.groups.get(key).and_then(|means| means[col])
    }

    /// One series in key order.
    pub fn series(&self, indicator: Indicator) -> Vec<(&K, Option<f64>)> {
        match self.column_of(indicator) {
            Some(col) => self.groups.iter().map(|(k, means)| (k, means[col])).collect(),
            None => Vec::new(),
        }
    }

    fn column_of(&self, indicator: Indicator) -> Option<usize> {
        self.indicators.iter().position(|&i| i == indicator)
    }
}

/// Group `records` by `key` and average each of `indicators` over the
/// values present. Rows without a key belong to no group.
pub fn group_means<'a, K, F>(
    records: impl IntoIterator<Item = &'a Record>,
    key: F,
    indicators: &[Indicator],
) -> GroupedMeans<K>
where
    K: Ord,
    F: Fn(&Record) -> Option<K>,
{
    let mut acc: BTreeMap<K, Vec<MeanAccumulator>> = BTreeMap::new();
    for rec in records {
        let Some(k) = key(rec) else {
            continue;
        };
        let slots = acc
            .entry(k)
            .or_insert_with(|| vec![MeanAccumulator::default(); indicators.len()]);
        for (slot, &ind) in slots.iter_mut().zip(indicators) {
            slot.push(rec.value(ind));
        }
    }

    GroupedMeans {
        indicators: indicators.to_vec(),
        groups: acc
            .into_iter()
            .map(|(k, slots)| (k, slots.iter().map(MeanAccumulator::mean).collect()))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Grouping keys
// ---------------------------------------------------------------------------

/// Income group label ordered by income rank (low, lower middle, upper
/// middle, high); unrecognised labels sort after the ranked ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeGroup(pub String);

impl IncomeGroup {
    pub fn rank(&self) -> Option<u8> {
        let label = self.0.trim().to_ascii_lowercase();
        let label = label.strip_suffix("income").unwrap_or(&label).trim_end();
        match label {
            "low" => Some(0),
            "lower middle" | "lower-middle" => Some(1),
            "upper middle" | "upper-middle" => Some(2),
            "high" => Some(3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for IncomeGroup {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for IncomeGroup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IncomeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn by_region(rec: &Record) -> Option<String> {
    rec.region.clone()
}

fn by_country(rec: &Record) -> Option<String> {
    rec.country.clone()
}

fn by_income_group(rec: &Record) -> Option<IncomeGroup> {
    rec.income_group.clone().map(IncomeGroup)
}

fn by_year(rec: &Record) -> Option<i32> {
    rec.year
}

// ---------------------------------------------------------------------------
// The seven chart aggregates
// ---------------------------------------------------------------------------

/// Chart 1: mean unemployment per region.
pub fn region_unemployment(view: &FilteredView<'_>) -> GroupedMeans<String> {
    group_means(view.records(), by_region, &[Indicator::Unemployment])
}

/// Chart 2: mean life expectancy and undernourishment per region.
pub fn region_life_and_undernourishment(view: &FilteredView<'_>) -> GroupedMeans<String> {
    group_means(
        view.records(),
        by_region,
        &[Indicator::LifeExpectancy, Indicator::Undernourishment],
    )
}

/// Chart 3: row-level (CO2, life expectancy) pairs. Rows missing either
/// value are dropped.
pub fn co2_life_pairs(view: &FilteredView<'_>) -> Vec<[f64; 2]> {
    view.records()
        .filter_map(|rec| {
            Some([
                rec.value(Indicator::Co2)?,
                rec.value(Indicator::LifeExpectancy)?,
            ])
        })
        .collect()
}

/// Chart 4: mean health and education expenditure and life expectancy per
/// country.
pub fn country_expenditure(view: &FilteredView<'_>) -> GroupedMeans<String> {
    group_means(
        view.records(),
        by_country,
        &[
            Indicator::HealthExpenditure,
            Indicator::EducationExpenditure,
            Indicator::LifeExpectancy,
        ],
    )
}

/// Chart 5: mean corruption per region over rows with a numeric corruption
/// value. Regions without any are absent.
pub fn region_corruption(view: &FilteredView<'_>) -> GroupedMeans<String> {
    group_means(
        view.records()
            .filter(|rec| rec.value(Indicator::Corruption).is_some()),
        by_region,
        &[Indicator::Corruption],
    )
}

/// Chart 6: mean life expectancy per income group, in income rank order.
pub fn income_group_life(view: &FilteredView<'_>) -> GroupedMeans<IncomeGroup> {
    group_means(view.records(), by_income_group, &[Indicator::LifeExpectancy])
}

/// Chart 7: mean communicable, non-communicable and life expectancy per
/// year, ascending.
pub fn yearly_disease_burden(view: &FilteredView<'_>) -> GroupedMeans<i32> {
    group_means(
        view.records(),
        by_year,
        &[
            Indicator::Communicable,
            Indicator::NonCommunicable,
            Indicator::LifeExpectancy,
        ],
    )
}

// ---------------------------------------------------------------------------
// Country summary (independent of the filter selection)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountrySummary {
    pub country: String,
    pub life_expectancy: Option<f64>,
    pub co2: Option<f64>,
    pub health_expenditure: Option<f64>,
    pub education_expenditure: Option<f64>,
}

/// Means over every row of `dataset` whose country is `country`.
pub fn country_summary(dataset: &Dataset, country: &str) -> CountrySummary {
    let rows = dataset
        .records()
        .iter()
        .filter(|rec| rec.country.as_deref() == Some(country));
    let means = group_means(
        rows,
        |_| Some(()),
        &[
            Indicator::LifeExpectancy,
            Indicator::Co2,
            Indicator::HealthExpenditure,
            Indicator::EducationExpenditure,
        ],
    );

    CountrySummary {
        country: country.to_string(),
        life_expectancy: means.mean(&(), Indicator::LifeExpectancy),
        co2: means.mean(&(), Indicator::Co2),
        health_expenditure: means.mean(&(), Indicator::HealthExpenditure),
        education_expenditure: means.mean(&(), Indicator::EducationExpenditure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterSelection, YearRange};
    use std::collections::BTreeSet;

    fn row(country: &str, region: &str, income: &str, year: i32) -> Record {
        Record::new(
            Some(country.into()),
            Some(region.into()),
            Some(income.into()),
            Some(year),
        )
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all(ds: &Dataset) -> FilterSelection {
        FilterSelection::everything(ds, YearRange::default())
    }

    #[test]
    fn south_asia_life_expectancy_scenario() {
        let ds = Dataset::from_records(vec![
            row("India", "South Asia", "Lower middle", 2010).with(Indicator::LifeExpectancy, 65.0),
            row("India", "South Asia", "Lower middle", 2012).with(Indicator::LifeExpectancy, 67.0),
        ]);
        let sel = FilterSelection {
            regions: set(&["South Asia"]),
            income_groups: set(&["Lower middle"]),
            years: YearRange::new(2001, 2019),
        };
        let view = filter(&ds, &sel);
        assert_eq!(view.len(), 2);

        let agg = region_life_and_undernourishment(&view);
        let key = "South Asia".to_string();
        assert_eq!(agg.mean(&key, Indicator::LifeExpectancy), Some(66.0));
        assert_eq!(agg.mean(&key, Indicator::Undernourishment), None);
    }

    #[test]
    fn corruption_skips_non_numeric_rows() {
        let csv = "Country Name,Region,IncomeGroup,Year,Life Expectancy World Bank,CO2,\
Health Expenditure %,Education Expenditure %,Unemployment,Prevelance of Undernourishment,\
Corruption,Communicable,NonCommunicable
A,Europe,High income,2010,80,5,8,5,6,2.5,12,3,85
B,Europe,High income,2010,81,6,9,5,7,2.5,n/a,3,85
C,Europe,High income,2010,79,4,7,5,5,2.5,8,3,85
D,Africa,Low income,2010,60,0.3,4,3,9,20,n/a,40,45";
        let ds = crate::data::loader::load_bytes(csv.as_bytes()).unwrap();
        let view = filter(&ds, &all(&ds));

        let agg = region_corruption(&view);
        assert_eq!(agg.mean(&"Europe".to_string(), Indicator::Corruption), Some(10.0));
        assert_eq!(agg.keys().collect::<Vec<_>>(), vec!["Europe"]);

        // The n/a rows still count everywhere else.
        assert_eq!(region_unemployment(&view).len(), 2);
        assert_eq!(co2_life_pairs(&view).len(), 4);
    }

    #[test]
    fn co2_pairs_drop_rows_missing_either_value() {
        let ds = Dataset::from_records(vec![
            row("A", "Europe", "High income", 2010).with(Indicator::LifeExpectancy, 80.0),
            row("B", "Europe", "High income", 2010).with(Indicator::Co2, 6.0),
            row("C", "Europe", "High income", 2010)
                .with(Indicator::Co2, 4.0)
                .with(Indicator::LifeExpectancy, 79.0),
        ]);
        let view = filter(&ds, &all(&ds));
        assert_eq!(view.len(), 3);
        assert_eq!(co2_life_pairs(&view), vec![[4.0, 79.0]]);
    }

    #[test]
    fn all_missing_group_has_undefined_mean() {
        let ds = Dataset::from_records(vec![
            row("A", "Europe", "High income", 2010).with(Indicator::Unemployment, 4.0),
            row("B", "Africa", "Low income", 2010),
        ]);
        let agg = region_unemployment(&filter(&ds, &all(&ds)));
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.mean(&"Africa".to_string(), Indicator::Unemployment), None);
        assert_eq!(agg.mean(&"Europe".to_string(), Indicator::Unemployment), Some(4.0));
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let ds = Dataset::from_records(vec![
            row("India", "South Asia", "Lower middle", 2010).with(Indicator::LifeExpectancy, 65.0),
        ]);
        let sel = FilterSelection {
            regions: BTreeSet::new(),
            ..all(&ds)
        };
        let view = filter(&ds, &sel);
        assert!(view.is_empty());
        assert!(region_unemployment(&view).is_empty());
        assert!(region_life_and_undernourishment(&view).is_empty());
        assert!(co2_life_pairs(&view).is_empty());
        assert!(country_expenditure(&view).is_empty());
        assert!(region_corruption(&view).is_empty());
        assert!(income_group_life(&view).is_empty());
        assert!(yearly_disease_burden(&view).is_empty());
    }

    #[test]
    fn years_ascend_numerically() {
        let ds = Dataset::from_records(vec![
            row("A", "R", "High income", 2012).with(Indicator::Communicable, 1.0),
            row("A", "R", "High income", 2003).with(Indicator::Communicable, 2.0),
            row("A", "R", "High income", 2010).with(Indicator::Communicable, 3.0),
        ]);
        let agg = yearly_disease_burden(&filter(&ds, &all(&ds)));
        assert_eq!(agg.keys().copied().collect::<Vec<_>>(), vec![2003, 2010, 2012]);
        let comm: Vec<Option<f64>> = agg
            .series(Indicator::Communicable)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(comm, vec![Some(2.0), Some(3.0), Some(1.0)]);
    }

    #[test]
    fn income_groups_follow_rank() {
        let ds = Dataset::from_records(vec![
            row("A", "R", "High income", 2010).with(Indicator::LifeExpectancy, 80.0),
            row("B", "R", "Upper middle income", 2010).with(Indicator::LifeExpectancy, 74.0),
            row("C", "R", "Low income", 2010).with(Indicator::LifeExpectancy, 60.0),
            row("D", "R", "Lower middle income", 2010).with(Indicator::LifeExpectancy, 68.0),
            row("E", "R", "Unclassified", 2010).with(Indicator::LifeExpectancy, 70.0),
        ]);
        let agg = income_group_life(&filter(&ds, &all(&ds)));
        let labels: Vec<&str> = agg.keys().map(IncomeGroup::as_str).collect();
        assert_eq!(
            labels,
            vec![
                "Low income",
                "Lower middle income",
                "Upper middle income",
                "High income",
                "Unclassified"
            ]
        );
    }

    #[test]
    fn country_means_average_present_values_only() {
        let ds = Dataset::from_records(vec![
            row("Chile", "LatAm", "High income", 2010)
                .with(Indicator::HealthExpenditure, 7.0)
                .with(Indicator::LifeExpectancy, 78.0),
            row("Chile", "LatAm", "High income", 2011)
                .with(Indicator::HealthExpenditure, 8.0)
                .with(Indicator::EducationExpenditure, 4.0)
                .with(Indicator::LifeExpectancy, 79.0),
        ]);
        let agg = country_expenditure(&filter(&ds, &all(&ds)));
        let chile = "Chile".to_string();
        assert_eq!(agg.mean(&chile, Indicator::HealthExpenditure), Some(7.5));
        assert_eq!(agg.mean(&chile, Indicator::EducationExpenditure), Some(4.0));
        assert_eq!(agg.mean(&chile, Indicator::LifeExpectancy), Some(78.5));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let ds = Dataset::from_records(vec![
            row("A", "Europe", "High income", 2010).with(Indicator::Unemployment, 0.1),
            row("B", "Europe", "High income", 2011).with(Indicator::Unemployment, 0.2),
            row("C", "Asia", "Low income", 2011).with(Indicator::Unemployment, 0.7),
        ]);
        let view = filter(&ds, &all(&ds));
        assert_eq!(region_unemployment(&view), region_unemployment(&view));
        assert_eq!(co2_life_pairs(&view), co2_life_pairs(&view));
    }

    #[test]
    fn summary_ignores_other_countries() {
        let ds = Dataset::from_records(vec![
            row("India", "South Asia", "Lower middle", 2010)
                .with(Indicator::LifeExpectancy, 65.0)
                .with(Indicator::Co2, 1.0),
            row("India", "South Asia", "Lower middle", 2011)
                .with(Indicator::LifeExpectancy, 66.0)
                .with(Indicator::Co2, 2.0),
            row("Chile", "LatAm", "High income", 2011).with(Indicator::LifeExpectancy, 79.0),
        ]);
        let summary = country_summary(&ds, "India");
        assert_eq!(summary.life_expectancy, Some(65.5));
        assert_eq!(summary.co2, Some(1.5));
        assert_eq!(summary.health_expenditure, None);

        let absent = country_summary(&ds, "Peru");
        assert_eq!(absent.life_expectancy, None);
    }
}
