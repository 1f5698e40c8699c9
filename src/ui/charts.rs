use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    AxisHints, Bar, BarChart, HPlacement, Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints,
    Points, Polygon, Text,
};

use crate::color::{normalize, viridis, CategoryColors};
use crate::data::model::Indicator;
use crate::data::pipeline::DashboardView;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart section (central panel)
// ---------------------------------------------------------------------------

/// Render all seven charts for the current view.
pub fn charts(ui: &mut Ui, view: &DashboardView, colors: &CategoryColors) {
    ui.heading("Visualizations:");

    section(ui, "Graph 1: Region-wise Unemployment", view.region_unemployment.is_empty(), |ui| {
        region_unemployment(ui, view, colors)
    });
    section(
        ui,
        "Graph 2: Region-wise Life Expectancy and Prevalence of Undernourishment",
        view.region_life_undernourishment.is_empty(),
        |ui| region_life_undernourishment(ui, view),
    );
    section(
        ui,
        "Graph 3: Scatter Plot: Relationship between CO2 Emissions and Life Expectancy",
        view.co2_life.is_empty(),
        |ui| co2_scatter(ui, view),
    );
    section(
        ui,
        "Graph 4: Impact of Expenditure on Life Expectancy",
        view.country_expenditure.is_empty(),
        |ui| expenditure_scatter(ui, view),
    );
    section(ui, "Graph 5: Region-wise Corruption", view.region_corruption.is_empty(), |ui| {
        corruption_pie(ui, view, colors)
    });
    section(
        ui,
        "Graph 6: Income Group-wise Life Expectancy World Bank",
        view.income_group_life.is_empty(),
        |ui| income_group_line(ui, view),
    );
    section(
        ui,
        "Graph 7: Multiline Plot: Effect of Communicable and Non-Communicable Diseases on Life Expectancy (Grouped by Year)",
        view.yearly_disease.is_empty(),
        |ui| disease_lines(ui, view),
    );
}

fn section(ui: &mut Ui, title: &str, empty: bool, body: impl FnOnce(&mut Ui)) {
    ui.add_space(12.0);
    ui.strong(title);
    if empty {
        ui.label(RichText::new("No data for the current selection.").italics());
    } else {
        body(ui);
    }
}

fn category_axis(plot: Plot<'_>, labels: Vec<String>) -> Plot<'_> {
    plot.x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
}

fn region_unemployment(ui: &mut Ui, view: &DashboardView, colors: &CategoryColors) {
    let series = view.region_unemployment.series(Indicator::Unemployment);
    let labels: Vec<String> = series.iter().map(|(k, _)| (*k).clone()).collect();
    let bars: Vec<Bar> = series
        .iter()
        .enumerate()
        .filter_map(|(i, (region, mean))| {
            Some(
                Bar::new(i as f64, (*mean)?)
                    .name(region.as_str())
                    .fill(colors.color_for(region))
                    .width(0.6),
            )
        })
        .collect();

    category_axis(Plot::new("region_unemployment"), labels)
        .height(CHART_HEIGHT)
        .x_axis_label("Region")
        .y_axis_label("Unemployment")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Unemployment"));
        });
}

fn region_life_undernourishment(ui: &mut Ui, view: &DashboardView) {
    let agg = &view.region_life_undernourishment;
    let life = agg.series(Indicator::LifeExpectancy);
    let under = agg.series(Indicator::Undernourishment);
    let labels: Vec<String> = life.iter().map(|(k, _)| (*k).clone()).collect();

    let axis = DualAxis::fit(
        life.iter().filter_map(|(_, v)| *v),
        under.iter().filter_map(|(_, v)| *v),
    );

    let bar_color = Color32::BLUE.gamma_multiply(0.7);
    let bars: Vec<Bar> = life
        .iter()
        .enumerate()
        .filter_map(|(i, (_, mean))| Some(Bar::new(i as f64, (*mean)?).fill(bar_color).width(0.6)))
        .collect();

    let scaled: Vec<Option<[f64; 2]>> = under
        .iter()
        .enumerate()
        .map(|(i, (_, mean))| mean.map(|v| [i as f64, axis.to_primary(v)]))
        .collect();
    let markers: Vec<[f64; 2]> = scaled.iter().flatten().copied().collect();

    let right_axis = AxisHints::new_y()
        .label("Prevalence of Undernourishment")
        .placement(HPlacement::Right)
        .formatter(move |mark, _range| format!("{:.1}", axis.to_secondary(mark.value)));

    category_axis(Plot::new("region_life_undernourishment"), labels)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Region")
        .custom_y_axes(vec![AxisHints::new_y().label("Life Expectancy"), right_axis])
        .include_y(0.0)
        .include_y(axis.primary_max)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Life Expectancy").color(bar_color));
            for segment in segments(&scaled) {
                plot_ui.line(
                    Line::new(PlotPoints::new(segment))
                        .name("Prevalence of Undernourishment")
                        .color(Color32::RED)
                        .width(2.0),
                );
            }
            plot_ui.points(
                Points::new(PlotPoints::new(markers))
                    .name("Prevalence of Undernourishment")
                    .shape(MarkerShape::Circle)
                    .radius(4.0)
                    .color(Color32::RED),
            );
        });
}

fn co2_scatter(ui: &mut Ui, view: &DashboardView) {
    Plot::new("co2_life")
        .height(CHART_HEIGHT)
        .x_axis_label("Carbon Dioxide Emissions (kiloton)")
        .y_axis_label("Life Expectancy")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::new(view.co2_life.clone()))
                    .name("Relationship between CO2 Emissions and Life Expectancy")
                    .radius(3.0)
                    .color(Color32::from_rgb(31, 119, 180).gamma_multiply(0.7)),
            );
        });
}

fn expenditure_scatter(ui: &mut Ui, view: &DashboardView) {
    let agg = &view.country_expenditure;
    let education: Vec<f64> = agg
        .series(Indicator::EducationExpenditure)
        .into_iter()
        .filter_map(|(_, v)| v)
        .collect();
    let (edu_min, edu_max) = min_max(&education).unwrap_or((0.0, 1.0));

    let points: Vec<(String, [f64; 2], Color32)> = agg
        .keys()
        .filter_map(|country| {
            let health = agg.mean(country, Indicator::HealthExpenditure)?;
            let life = agg.mean(country, Indicator::LifeExpectancy)?;
            let color = agg
                .mean(country, Indicator::EducationExpenditure)
                .map(|e| viridis(normalize(e, edu_min, edu_max)))
                .unwrap_or(Color32::GRAY);
            Some((country.clone(), [health, life], color))
        })
        .collect();

    Plot::new("expenditure_life")
        .height(CHART_HEIGHT)
        .x_axis_label("Health Expenditure %")
        .y_axis_label("Life Expectancy World Bank")
        .show(ui, |plot_ui| {
            for (country, point, color) in points {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![point]))
                        .name(country)
                        .radius(4.0)
                        .color(color.gamma_multiply(0.85)),
                );
            }
        });

    if !education.is_empty() {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label("Education Expenditure %:");
            for (value, color) in gradient_legend(edu_min, edu_max, 5) {
                ui.label(RichText::new("■").color(color));
                ui.label(format!("{value:.2}"));
            }
        });
    }
}

fn corruption_pie(ui: &mut Ui, view: &DashboardView, colors: &CategoryColors) {
    let series = view.region_corruption.series(Indicator::Corruption);
    let entries: Vec<(&str, Option<f64>)> = series.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    let slices = pie_slices(entries);
    if slices.len() < series.len() {
        log::warn!(
            "corruption pie: skipped {} region(s) without a positive mean",
            series.len() - slices.len()
        );
    }

    Plot::new("region_corruption")
        .height(CHART_HEIGHT + 80.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.4)
        .include_x(1.4)
        .include_y(-1.3)
        .include_y(1.3)
        .show(ui, |plot_ui| {
            for slice in &slices {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(slice.polygon(1.0)))
                        .name(&slice.label)
                        .fill_color(colors.color_for(&slice.label))
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                let [lx, ly] = slice.anchor(1.15);
                plot_ui.text(
                    Text::new(PlotPoint::new(lx, ly), RichText::new(&slice.label).strong())
                        .anchor(Align2::CENTER_CENTER),
                );
                let [px, py] = slice.anchor(0.6);
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(px, py),
                        format!("{:.1}%", slice.fraction * 100.0),
                    )
                    .color(Color32::BLACK),
                );
            }
        });
}

fn income_group_line(ui: &mut Ui, view: &DashboardView) {
    let series = view.income_group_life.series(Indicator::LifeExpectancy);
    let labels: Vec<String> = series.iter().map(|(k, _)| k.to_string()).collect();
    let points: Vec<Option<[f64; 2]>> = series
        .iter()
        .enumerate()
        .map(|(i, (_, mean))| mean.map(|v| [i as f64, v]))
        .collect();
    let purple = Color32::from_rgb(128, 0, 128);

    category_axis(Plot::new("income_group_life"), labels)
        .height(CHART_HEIGHT)
        .x_axis_label("Income Group")
        .y_axis_label("Life Expectancy World Bank %")
        .show(ui, |plot_ui| {
            for segment in segments(&points) {
                plot_ui.line(Line::new(PlotPoints::new(segment)).color(purple).width(2.0));
            }
            plot_ui.points(
                Points::new(PlotPoints::new(points.iter().flatten().copied().collect()))
                    .shape(MarkerShape::Circle)
                    .radius(4.0)
                    .color(purple),
            );
        });
}

fn disease_lines(ui: &mut Ui, view: &DashboardView) {
    let agg = &view.yearly_disease;
    let curve = |indicator: Indicator| -> Vec<Option<[f64; 2]>> {
        agg.keys()
            .map(|year| {
                let x = agg.mean(year, indicator)?;
                let y = agg.mean(year, Indicator::LifeExpectancy)?;
                Some([x, y])
            })
            .collect()
    };
    let series = [
        ("Communicable Diseases", curve(Indicator::Communicable), Color32::from_rgb(31, 119, 180)),
        (
            "Non-Communicable Diseases",
            curve(Indicator::NonCommunicable),
            Color32::from_rgb(255, 127, 14),
        ),
    ];

    Plot::new("disease_life")
        .height(CHART_HEIGHT + 80.0)
        .legend(Legend::default())
        .y_axis_label("Life Expectancy")
        .show(ui, |plot_ui| {
            for (name, points, color) in &series {
                for segment in segments(points) {
                    plot_ui.line(Line::new(PlotPoints::new(segment)).name(name).color(*color).width(2.0));
                }
                plot_ui.points(
                    Points::new(PlotPoints::new(points.iter().flatten().copied().collect()))
                        .name(name)
                        .radius(4.0)
                        .color(*color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Tick label for a categorical axis: the label at an integer position,
/// nothing in between or out of range.
pub fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Split a point series at gaps so undefined means are not bridged.
pub fn segments(points: &[Option<[f64; 2]>]) -> Vec<Vec<[f64; 2]>> {
    points
        .split(Option::is_none)
        .map(|run| run.iter().flatten().copied().collect::<Vec<_>>())
        .filter(|run| !run.is_empty())
        .collect()
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// `n` evenly spaced (value, colour) stops over `[min, max]`.
pub fn gradient_legend(min: f64, max: f64, n: usize) -> Vec<(f64, Color32)> {
    match n {
        0 => Vec::new(),
        1 => vec![(min, viridis(0.0))],
        _ => (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                (min + t * (max - min), viridis(t))
            })
            .collect(),
    }
}

/// Maps a secondary series onto the primary y range so both share one plot.
/// The primary axis starts at zero (bars); the secondary spans its data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualAxis {
    pub primary_max: f64,
    secondary_min: f64,
    secondary_max: f64,
}

impl DualAxis {
    pub fn fit(primary: impl Iterator<Item = f64>, secondary: impl Iterator<Item = f64>) -> Self {
        let top = primary.fold(f64::NEG_INFINITY, f64::max);
        let primary_max = if top.is_finite() && top > 0.0 { top * 1.05 } else { 1.0 };

        let secondary: Vec<f64> = secondary.collect();
        let (lo, hi) = match min_max(&secondary) {
            Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => (lo - 1.0, hi + 1.0),
            Some((lo, hi)) => {
                let pad = (hi - lo) * 0.05;
                (lo - pad, hi + pad)
            }
            None => (0.0, 1.0),
        };

        DualAxis {
            primary_max,
            secondary_min: lo,
            secondary_max: hi,
        }
    }

    pub fn to_primary(&self, value: f64) -> f64 {
        (value - self.secondary_min) / (self.secondary_max - self.secondary_min) * self.primary_max
    }

    pub fn to_secondary(&self, value: f64) -> f64 {
        self.secondary_min + value / self.primary_max * (self.secondary_max - self.secondary_min)
    }
}

/// One wedge of a pie, angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub fraction: f64,
    pub start: f64,
    pub end: f64,
}

impl PieSlice {
    /// Closed outline: centre, then the arc.
    pub fn polygon(&self, radius: f64) -> Vec<[f64; 2]> {
        let steps = ((self.end - self.start) / TAU * 120.0).ceil().max(2.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for i in 0..=steps {
            let angle = self.start + (self.end - self.start) * i as f64 / steps as f64;
            points.push([radius * angle.cos(), radius * angle.sin()]);
        }
        points
    }

    /// Point at `radius` on the wedge's bisector.
    pub fn anchor(&self, radius: f64) -> [f64; 2] {
        let mid = (self.start + self.end) / 2.0;
        [radius * mid.cos(), radius * mid.sin()]
    }
}

/// Lay out wedges counter-clockwise from 12 o'clock. Entries without a
/// positive finite value cannot form a wedge and are skipped.
pub fn pie_slices<'a>(entries: impl IntoIterator<Item = (&'a str, Option<f64>)>) -> Vec<PieSlice> {
    let kept: Vec<(&str, f64)> = entries
        .into_iter()
        .filter_map(|(label, v)| v.filter(|v| v.is_finite() && *v > 0.0).map(|v| (label, v)))
        .collect();
    let total: f64 = kept.iter().map(|(_, v)| v).sum();

    let mut angle = FRAC_PI_2;
    kept.into_iter()
        .map(|(label, value)| {
            let fraction = value / total;
            let start = angle;
            angle += fraction * TAU;
            PieSlice {
                label: label.to_string(),
                fraction,
                start,
                end: angle,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn category_labels_only_on_integers() {
        let labels = vec!["Africa".to_string(), "Europe".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Africa");
        assert_eq!(category_label(&labels, 1.0), "Europe");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn segments_break_at_gaps() {
        let pts = vec![
            Some([0.0, 1.0]),
            Some([1.0, 2.0]),
            None,
            Some([3.0, 4.0]),
            None,
            None,
        ];
        let runs = segments(&pts);
        assert_eq!(runs, vec![vec![[0.0, 1.0], [1.0, 2.0]], vec![[3.0, 4.0]]]);
        assert!(segments(&[None]).is_empty());
    }

    #[test]
    fn pie_fractions_sum_to_one_and_skip_bad_values() {
        let slices = pie_slices(vec![
            ("Africa", Some(30.0)),
            ("Europe", Some(10.0)),
            ("Nowhere", None),
            ("Negative", Some(-2.0)),
        ]);
        assert_eq!(slices.len(), 2);
        assert!(approx(slices[0].fraction, 0.75));
        assert!(approx(slices[1].fraction, 0.25));
        assert!(approx(slices[0].start, FRAC_PI_2));
        assert!(approx(slices[1].end, FRAC_PI_2 + TAU));
        assert!(approx(slices[0].end, slices[1].start));
    }

    #[test]
    fn pie_polygon_starts_at_centre() {
        let slice = &pie_slices(vec![("Only", Some(5.0))])[0];
        let outline = slice.polygon(1.0);
        assert_eq!(outline[0], [0.0, 0.0]);
        let [x, y] = outline[1];
        assert!(approx(x, 0.0) && approx(y, 1.0));
        assert!(outline.len() > 100);
    }

    #[test]
    fn dual_axis_round_trips_secondary_values() {
        let axis = DualAxis::fit([60.0, 80.0].into_iter(), [2.0, 22.0].into_iter());
        assert!(approx(axis.primary_max, 84.0));
        for v in [2.0, 10.0, 22.0] {
            assert!(approx(axis.to_secondary(axis.to_primary(v)), v));
        }
        assert!(axis.to_primary(2.0) > 0.0);
        assert!(axis.to_primary(22.0) < axis.primary_max);
    }

    #[test]
    fn dual_axis_handles_flat_and_empty_series() {
        let flat = DualAxis::fit([70.0].into_iter(), [5.0].into_iter());
        assert!(approx(flat.to_primary(5.0), flat.primary_max / 2.0));

        let empty = DualAxis::fit(std::iter::empty(), std::iter::empty());
        assert!(approx(empty.primary_max, 1.0));
    }

    #[test]
    fn gradient_legend_spans_range() {
        let stops = gradient_legend(2.0, 6.0, 5);
        assert_eq!(stops.len(), 5);
        assert!(approx(stops[0].0, 2.0));
        assert!(approx(stops[4].0, 6.0));
        assert_eq!(stops[4].1, viridis(1.0));
        assert!(gradient_legend(0.0, 1.0, 0).is_empty());
    }
}
