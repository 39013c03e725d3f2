use chrono::NaiveDate;
use eframe::egui::{Color32, Response, Ui};
use egui_plot::{
    uniform_grid_spacer, Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot,
    PlotPoints,
};

use crate::color::MonthPalette;
use crate::data::aggregate::{values_by_month, values_by_year, AnnotatedObservation};
use crate::data::filter::CleanedSeries;
use crate::data::model::CALENDAR;
use crate::data::pipeline::PipelineRun;
use crate::data::pivot::PivotMatrix;
use crate::data::stats::BoxSummary;

// ---------------------------------------------------------------------------
// Renderer contract
// ---------------------------------------------------------------------------

/// Turns pipeline artifacts into images. What an image is belongs to the
/// implementation.
pub trait ChartRenderer {
    type Image;

    /// x = date, y = value, one series.
    fn render_line(&mut self, cleaned: &CleanedSeries) -> Self::Image;

    /// One group per year, one bar per month in calendar order.
    fn render_bar(&mut self, pivot: &PivotMatrix) -> Self::Image;

    /// Year-wise (trend) and month-wise (seasonality) distributions.
    fn render_boxes(&mut self, flat: &[AnnotatedObservation]) -> (Self::Image, Self::Image);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Box];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Monthly averages",
            ChartKind::Box => "Box plots",
        }
    }

    /// Default export file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Line => "line_plot.png",
            ChartKind::Bar => "bar_plot.png",
            ChartKind::Box => "box_plot.png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<I> {
    Single(I),
    Pair(I, I),
}

/// Hand the artifact a chart needs to the matching renderer entry point.
pub fn render_chart<R: ChartRenderer>(
    kind: ChartKind,
    run: &PipelineRun,
    renderer: &mut R,
) -> Rendered<R::Image> {
    match kind {
        ChartKind::Line => Rendered::Single(renderer.render_line(run.cleaned())),
        ChartKind::Bar => Rendered::Single(renderer.render_bar(run.pivot())),
        ChartKind::Box => {
            let (by_year, by_month) = renderer.render_boxes(run.annotated());
            Rendered::Pair(by_year, by_month)
        }
    }
}

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Days since 1970-01-01 as a plot coordinate.
pub fn date_to_x(date: NaiveDate) -> f64 {
    (date - epoch()).num_days() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    epoch().checked_add_signed(chrono::Duration::try_days(x.round() as i64)?)
}

/// Label for integer positions `0..labels.len()`, empty elsewhere.
fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// egui_plot renderer (central panel)
// ---------------------------------------------------------------------------

/// Draws charts into an egui `Ui`. Each chart's image is the `Response`
/// covering its title and plot, which the PNG export crops to.
pub struct PlotRenderer<'a> {
    pub ui: &'a mut Ui,
    pub months: &'a MonthPalette,
}

fn titled(ui: &mut Ui, title: &str, add_plot: impl FnOnce(&mut Ui)) -> Response {
    ui.vertical(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| ui.heading(title));
        add_plot(ui);
    })
    .response
}

impl ChartRenderer for PlotRenderer<'_> {
    type Image = Response;

    fn render_line(&mut self, cleaned: &CleanedSeries) -> Response {
        titled(self.ui, "Daily Page Views", |ui: &mut Ui| {
            let points: PlotPoints = cleaned
                .observations()
                .iter()
                .map(|o| [date_to_x(o.date), o.value])
                .collect();

            Plot::new("line_plot")
                .x_axis_label("Date")
                .y_axis_label("Page Views")
                .x_axis_formatter(|mark, _range| {
                    x_to_date(mark.value)
                        .map(|d| d.format("%Y-%m").to_string())
                        .unwrap_or_default()
                })
                .label_formatter(|_name, point| {
                    let date = x_to_date(point.x)
                        .map(|d| d.to_string())
                        .unwrap_or_default();
                    format!("{date}\n{:.0}", point.y)
                })
                .allow_boxed_zoom(true)
                .allow_drag(true)
                .allow_scroll(true)
                .allow_zoom(true)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(points).name("Page views").color(Color32::RED).width(1.0));
                });
        })
    }

    fn render_bar(&mut self, pivot: &PivotMatrix) -> Response {
        let months = self.months;
        titled(self.ui, "Average Daily Page Views per Month", |ui: &mut Ui| {
            let years: Vec<String> = pivot.years().map(|y| y.to_string()).collect();
            let group_width = 0.8;
            let bar_width = group_width / CALENDAR.len() as f64;

            Plot::new("bar_plot")
                .legend(Legend::default().follow_insertion_order(true))
                .x_axis_label("Years")
                .y_axis_label("Average Page Views")
                .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
                .x_axis_formatter(move |mark, _range| category_label(&years, mark.value))
                .allow_drag(true)
                .allow_zoom(true)
                .show(ui, |plot_ui| {
                    // One chart per month so the legend is keyed by month.
                    for month in pivot.columns() {
                        let offset = (month.index() as f64 + 0.5) * bar_width - group_width / 2.0;
                        let bars: Vec<Bar> = pivot
                            .rows()
                            .iter()
                            .enumerate()
                            .filter_map(|(i, row)| {
                                let mean = row.cell(*month)?;
                                Some(
                                    Bar::new(i as f64 + offset, mean)
                                        .width(bar_width)
                                        .name(format!("{} {}", month.name(), row.year)),
                                )
                            })
                            .collect();
                        plot_ui.bar_chart(
                            BarChart::new(bars)
                                .name(month.name())
                                .color(months.color_for(*month)),
                        );
                    }
                });
        })
    }

    fn render_boxes(&mut self, flat: &[AnnotatedObservation]) -> (Response, Response) {
        let months = self.months;
        self.ui.columns(2, |columns: &mut [Ui]| {
            let by_year = titled(&mut columns[0], "Year-wise Box Plot (Trend)", |ui: &mut Ui| {
                let groups = values_by_year(flat);
                let years: Vec<String> = groups.keys().map(|y| y.to_string()).collect();
                let boxes: Vec<BoxElem> = groups
                    .values()
                    .enumerate()
                    .filter_map(|(i, values)| Some(box_elem(i as f64, &BoxSummary::from_values(values)?)))
                    .collect();

                Plot::new("year_box_plot")
                    .x_axis_label("Year")
                    .y_axis_label("Page Views")
                    .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
                    .x_axis_formatter(move |mark, _range| category_label(&years, mark.value))
                    .show(ui, |plot_ui| {
                        plot_ui.box_plot(BoxPlot::new(boxes).name("Page views"));
                    });
            });

            let by_month = titled(&mut columns[1], "Month-wise Box Plot (Seasonality)", |ui: &mut Ui| {
                let labels: Vec<String> = CALENDAR.iter().map(|m| m.short_name().to_string()).collect();

                Plot::new("month_box_plot")
                    .legend(Legend::default().follow_insertion_order(true))
                    .x_axis_label("Month")
                    .y_axis_label("Page Views")
                    .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 3.0, 12.0]))
                    .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
                    .show(ui, |plot_ui| {
                        // Positioned by calendar index so the axis never reorders.
                        for (month, values) in values_by_month(flat) {
                            let Some(summary) = BoxSummary::from_values(&values) else {
                                continue;
                            };
                            plot_ui.box_plot(
                                BoxPlot::new(vec![box_elem(month.index() as f64, &summary)])
                                    .name(month.short_name())
                                    .color(months.color_for(month)),
                            );
                        }
                    });
            });

            (by_year, by_month)
        })
    }
}

fn box_elem(x: f64, s: &BoxSummary) -> BoxElem {
    BoxElem::new(
        x,
        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
    )
    .box_width(0.6)
    .whisker_width(0.3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterConfig;
    use crate::data::model::{obs, Month, Series};

    /// Records which artifact reached which entry point.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<String>,
    }

    impl ChartRenderer for RecordingRenderer {
        type Image = usize;

        fn render_line(&mut self, cleaned: &CleanedSeries) -> usize {
            self.calls.push("line".to_string());
            cleaned.len()
        }

        fn render_bar(&mut self, pivot: &PivotMatrix) -> usize {
            self.calls.push("bar".to_string());
            pivot.rows().len()
        }

        fn render_boxes(&mut self, flat: &[AnnotatedObservation]) -> (usize, usize) {
            self.calls.push("boxes".to_string());
            (values_by_year(flat).len(), values_by_month(flat).len())
        }
    }

    fn run() -> PipelineRun {
        let series = Series::from_observations(vec![
            obs("2018-03-01", 5.0),
            obs("2018-04-01", 6.0),
            obs("2019-03-01", 7.0),
        ])
        .unwrap();
        let keep_all = FilterConfig {
            lower_quantile: 0.0,
            upper_quantile: 1.0,
        };
        PipelineRun::execute(series, &keep_all).unwrap()
    }

    #[test]
    fn test_render_chart_dispatch() {
        let run = run();
        let mut renderer = RecordingRenderer::default();

        assert_eq!(render_chart(ChartKind::Line, &run, &mut renderer), Rendered::Single(3));
        assert_eq!(render_chart(ChartKind::Bar, &run, &mut renderer), Rendered::Single(2));
        assert_eq!(render_chart(ChartKind::Box, &run, &mut renderer), Rendered::Pair(2, 2));
        assert_eq!(renderer.calls, vec!["line", "bar", "boxes"]);
    }

    #[test]
    fn test_date_axis_round_trip() {
        let date = obs("2016-05-09", 0.0).date;
        assert_eq!(date_to_x(epoch()), 0.0);
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(f64::NAN), None);
    }

    #[test]
    fn test_category_label_only_on_integers() {
        let labels = vec!["2017".to_string(), "2018".to_string()];
        assert_eq!(category_label(&labels, 1.0), "2018");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_export_file_names() {
        let names: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(names, vec!["line_plot.png", "bar_plot.png", "box_plot.png"]);
        assert_eq!(Month::January.short_name(), "Jan");
    }
}
