use std::collections::BTreeSet;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::filter::{FilterSelection, YearRange};
use crate::data::loader::LoadError;
use crate::data::model::Dataset;
use crate::data::pipeline::{render, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which filter dimension a sidebar action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Region,
    IncomeGroup,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until the user uploads a file).
    pub dataset: Option<Dataset>,

    /// Name of the uploaded file.
    pub file_name: Option<String>,

    /// Current sidebar selection.
    pub selection: FilterSelection,

    /// Output of the last pipeline run.
    pub view: Option<DashboardView>,

    /// Region colours shared by the region charts.
    pub region_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let selection = FilterSelection {
            years: config.years,
            ..FilterSelection::default()
        };
        Self {
            config,
            selection,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset. Region and income-group selections
    /// start empty; the year range starts at the full configured bounds.
    pub fn set_dataset(&mut self, file_name: String, dataset: Dataset) {
        self.selection = FilterSelection {
            regions: BTreeSet::new(),
            income_groups: BTreeSet::new(),
            years: self.config.years,
        };
        self.region_colors = CategoryColors::new(dataset.regions());
        self.dataset = Some(dataset);
        self.file_name = Some(file_name);
        self.status_message = None;
        self.refresh();
    }

    /// Apply the outcome of a load attempt. A failed load keeps whatever was
    /// shown before.
    pub fn apply_load(&mut self, file_name: String, result: Result<Dataset, LoadError>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with {} columns from {file_name}",
                    dataset.len(),
                    dataset.headers().len()
                );
                if dataset.is_empty() {
                    log::warn!("{file_name} has a header but no data rows");
                }
                self.set_dataset(file_name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load {file_name}: {e}");
                self.status_message = Some(format!("Error loading {file_name}: {e}"));
            }
        }
    }

    /// Rerun the pipeline for the current dataset and selection.
    pub fn refresh(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| render(ds, &self.selection, &self.config.summary_country));
    }

    pub fn selected(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Region => &self.selection.regions,
            Dimension::IncomeGroup => &self.selection.income_groups,
        }
    }

    fn selected_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Region => &mut self.selection.regions,
            Dimension::IncomeGroup => &mut self.selection.income_groups,
        }
    }

    /// All options of a dimension, in order of first appearance.
    pub fn options(&self, dimension: Dimension) -> Vec<String> {
        match (&self.dataset, dimension) {
            (Some(ds), Dimension::Region) => ds.regions().to_vec(),
            (Some(ds), Dimension::IncomeGroup) => ds.income_groups().to_vec(),
            (None, _) => Vec::new(),
        }
    }

    /// Toggle a single option in a dimension's selection.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        let selected = self.selected_mut(dimension);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh();
    }

    /// Select all options of a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        let all: BTreeSet<String> = self.options(dimension).into_iter().collect();
        *self.selected_mut(dimension) = all;
        self.refresh();
    }

    /// Deselect all options of a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.selected_mut(dimension).clear();
        self.refresh();
    }

    /// Select every region and income group at once, keeping the years.
    pub fn select_everything(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = FilterSelection::everything(ds, self.selection.years);
            self.refresh();
        }
    }

    /// Set the year range, clamped to the configured bounds with
    /// `min <= max`.
    pub fn set_years(&mut self, min: i32, max: i32) {
        let bounds = self.config.years;
        let min = min.clamp(bounds.min, bounds.max);
        let max = max.clamp(min, bounds.max);
        let years = YearRange::new(min, max);
        if years != self.selection.years {
            self.selection.years = years;
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    const CSV: &str = "Country Name,Region,IncomeGroup,Year,Life Expectancy World Bank,CO2,\
Health Expenditure %,Education Expenditure %,Unemployment,Prevelance of Undernourishment,\
Corruption,Communicable,NonCommunicable
India,South Asia,Lower middle income,2010,65,1.4,3.3,3.8,5.6,17.5,33,30,55
India,South Asia,Lower middle income,2012,67,1.6,3.4,3.9,5.7,16.0,36,29,57
Norway,Europe & Central Asia,High income,2016,82,8.0,10.0,7.5,4.7,2.5,85,2,88";

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.apply_load("indicators.csv".into(), load_bytes(CSV.as_bytes()));
        state
    }

    #[test]
    fn fresh_upload_selects_nothing() {
        let state = loaded();
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.visible_rows, 0);
        assert!(view.region_unemployment.is_empty());
        assert_eq!(view.summary.life_expectancy, Some(66.0));
        assert_eq!(state.file_name.as_deref(), Some("indicators.csv"));
    }

    #[test]
    fn select_all_shows_every_row() {
        let mut state = loaded();
        state.select_all(Dimension::Region);
        state.select_all(Dimension::IncomeGroup);
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 3);

        state.toggle(Dimension::Region, "South Asia");
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 1);
        state.toggle(Dimension::Region, "South Asia");
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 3);

        state.select_none(Dimension::IncomeGroup);
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 0);
    }

    #[test]
    fn year_range_is_clamped_and_ordered() {
        let mut state = loaded();
        state.select_everything();
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 3);

        state.set_years(2015, 2030);
        assert_eq!(state.selection.years, YearRange::new(2015, 2019));
        assert_eq!(state.view.as_ref().unwrap().visible_rows, 1);

        state.set_years(2018, 2012);
        assert_eq!(state.selection.years, YearRange::new(2018, 2018));
    }

    #[test]
    fn header_only_upload_renders_empty_view() {
        let header = CSV.lines().next().unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.apply_load("empty.csv".into(), load_bytes(header.as_bytes()));
        state.select_everything();

        assert!(state.dataset.as_ref().unwrap().is_empty());
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.visible_rows, 0);
        assert!(view.yearly_disease.is_empty());
        assert_eq!(view.summary.life_expectancy, None);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        state.apply_load("broken.csv".into(), load_bytes(b"Region\nEurope"));
        assert_eq!(state.file_name.as_deref(), Some("indicators.csv"));
        assert!(state.dataset.is_some());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("broken.csv"));
        assert!(msg.contains("Country Name"));
    }
}
