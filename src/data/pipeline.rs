use super::aggregate::{self, CountrySummary, GroupedMeans, IncomeGroup};
use super::filter::{filter, FilterSelection};
use super::model::Dataset;

/// Everything the central panel draws for one (dataset, selection) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub visible_rows: usize,
    pub summary: CountrySummary,
    pub region_unemployment: GroupedMeans<String>,
    pub region_life_undernourishment: GroupedMeans<String>,
    pub co2_life: Vec<[f64; 2]>,
    pub country_expenditure: GroupedMeans<String>,
    pub region_corruption: GroupedMeans<String>,
    pub income_group_life: GroupedMeans<IncomeGroup>,
    pub yearly_disease: GroupedMeans<i32>,
}

/// Run the whole pipeline from scratch: filter, then every aggregate. The
/// country summary reads the unfiltered dataset.
pub fn render(dataset: &Dataset, selection: &FilterSelection, summary_country: &str) -> DashboardView {
    let view = filter(dataset, selection);
    log::debug!(
        "pipeline: {} regions, {} income groups, years {}..={} -> {}/{} rows",
        selection.regions.len(),
        selection.income_groups.len(),
        selection.years.min,
        selection.years.max,
        view.len(),
        dataset.len()
    );

    if view.is_empty() {
        log::debug!("pipeline: selection matches no rows");
    }

    let result = DashboardView {
        visible_rows: view.len(),
        summary: aggregate::country_summary(dataset, summary_country),
        region_unemployment: aggregate::region_unemployment(&view),
        region_life_undernourishment: aggregate::region_life_and_undernourishment(&view),
        co2_life: aggregate::co2_life_pairs(&view),
        country_expenditure: aggregate::country_expenditure(&view),
        region_corruption: aggregate::region_corruption(&view),
        income_group_life: aggregate::income_group_life(&view),
        yearly_disease: aggregate::yearly_disease_burden(&view),
    };
    log::trace!(
        "pipeline: {} regions, {} countries, {} income groups, {} years",
        result.region_unemployment.len(),
        result.country_expenditure.len(),
        result.income_group_life.len(),
        result.yearly_disease.len()
    );
    result
}
