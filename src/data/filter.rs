use std::collections::BTreeSet;

use serde::Deserialize;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter selection: what the sidebar currently asks for
// ---------------------------------------------------------------------------

/// Inclusive year interval. A range with `min > max` contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        YearRange { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::new(2001, 2019)
    }
}

/// Per-dimension selection state.
///
/// An empty region or income-group set selects nothing; "no filter" means
/// every option is in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub regions: BTreeSet<String>,
    pub income_groups: BTreeSet<String>,
    pub years: YearRange,
}

impl FilterSelection {
    /// Selection with every region and income group of `dataset` picked.
    pub fn everything(dataset: &Dataset, years: YearRange) -> Self {
        FilterSelection {
            regions: dataset.regions().iter().cloned().collect(),
            income_groups: dataset.income_groups().iter().cloned().collect(),
            years,
        }
    }

    /// Whether a single row passes all three predicates. Rows with a missing
    /// region, income group or year never pass.
    pub fn matches(&self, record: &Record) -> bool {
        let region_ok = record
            .region
            .as_ref()
            .is_some_and(|r| self.regions.contains(r));
        let income_ok = record
            .income_group
            .as_ref()
            .is_some_and(|g| self.income_groups.contains(g));
        let year_ok = record.year.is_some_and(|y| self.years.contains(y));
        region_ok && income_ok && year_ok
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a dataset passing a selection, as indices into the dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows of `dataset` that pass `selection`, in dataset order.
pub fn filter<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}
