use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};
use panda_explorer::analysis::{BoxplotData, CorrelationMatrix, UnivariateStats};
use panda_explorer::{AnalysisResult, CellValue, Session};

use crate::color::{diverging, generate_palette, text_on};
use crate::ui::panels::column_picker;

// ---------------------------------------------------------------------------
// Analysis section (central panel)
// ---------------------------------------------------------------------------

/// Column picker for analysis plus the rendering of its result.
pub fn analysis_section(ui: &mut Ui, session: &mut Session) {
    let Some(dataset) = session.dataset() else {
        return;
    };
    let columns = dataset.table.column_names();

    ui.heading("Data Analysis & Visualization");
    ui.label("Select columns for analysis:");
    if let Some(cols) = column_picker(ui, "analysis_columns", &columns, session.analysis_columns()) {
        if let Err(e) = session.set_analysis_columns(cols) {
            log::debug!("analysis rejected: {e}");
        }
    }

    if let Some(e) = session.analysis_error() {
        ui.colored_label(Color32::from_rgb(200, 60, 60), e.to_string());
    }

    match session.analysis() {
        None => {}
        Some(AnalysisResult::Univariate {
            column,
            stats,
            boxplot,
        }) => {
            stats_summary(ui, column, stats);
            ui.strong("Visualization");
            histogram_plot(ui, column, stats);
            boxplot_plot(ui, column, boxplot);
        }
        Some(AnalysisResult::Frequencies { column, counts }) => {
            ui.label(RichText::new(format!("{column} Frequencies")).strong());
            frequency_plot(ui, counts);
        }
        Some(AnalysisResult::Correlation(matrix)) => {
            ui.label(RichText::new("Correlation Matrix").strong());
            correlation_heatmap(ui, matrix);
        }
    }
}

fn stats_summary(ui: &mut Ui, column: &str, stats: &UnivariateStats) {
    ui.label(RichText::new(format!("{column} Statistics")).strong());
    ui.label(format!("Mean: {:.2}", stats.mean));
    ui.label(format!("Median: {:.2}", stats.median));
    match stats.std_dev {
        Some(sd) => ui.label(format!("Standard Deviation: {sd:.2}")),
        None => ui.label("Standard Deviation: n/a"),
    };
    ui.label(format!(
        "Count: {}, Min: {:.2}, Max: {:.2}",
        stats.count, stats.min, stats.max
    ));
}

/// Histogram bars with the density curve scaled to counts.
fn histogram_plot(ui: &mut Ui, column: &str, stats: &UnivariateStats) {
    let h = &stats.histogram;
    let width = h.bin_width();
    let bars: Vec<Bar> = h
        .counts
        .iter()
        .zip(h.edges.windows(2))
        .map(|(&count, edge)| Bar::new((edge[0] + edge[1]) / 2.0, count as f64).width(width))
        .collect();
    let scale = stats.count as f64 * width;
    let density: Vec<[f64; 2]> = h.density.iter().map(|&[x, y]| [x, y * scale]).collect();

    Plot::new("histogram")
        .height(260.0)
        .legend(Legend::default())
        .x_axis_label(column)
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("count")
                    .color(Color32::from_rgb(100, 150, 220)),
            );
            if !density.is_empty() {
                plot_ui.line(
                    Line::new(PlotPoints::from(density))
                        .name("density")
                        .color(Color32::from_rgb(20, 60, 140))
                        .width(2.0),
                );
            }
        });
}

fn boxplot_plot(ui: &mut Ui, column: &str, data: &BoxplotData) {
    let elem = BoxElem::new(
        0.0,
        BoxSpread::new(
            data.lower_whisker,
            data.q1,
            data.median,
            data.q3,
            data.upper_whisker,
        ),
    )
    .name(column);
    let outliers: Vec<[f64; 2]> = data.outliers.iter().map(|&v| [0.0, v]).collect();

    Plot::new("boxplot")
        .height(200.0)
        .y_axis_label(column)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(column));
            if !outliers.is_empty() {
                plot_ui.points(Points::new(PlotPoints::from(outliers)).radius(3.0).name("outliers"));
            }
        });
}

fn frequency_plot(ui: &mut Ui, counts: &[(CellValue, usize)]) {
    let palette = generate_palette(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .zip(&palette)
        .enumerate()
        .map(|(i, ((value, n), color))| {
            Bar::new(i as f64, *n as f64)
                .name(value.to_string())
                .fill(*color)
        })
        .collect();

    Plot::new("frequencies")
        .height(260.0)
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    egui::Grid::new("frequency_table").striped(true).show(ui, |ui: &mut Ui| {
        for ((value, n), color) in counts.iter().zip(&palette) {
            ui.label(RichText::new(value.to_string()).color(*color));
            ui.label(n.to_string());
            ui.end_row();
        }
    });
}

/// Annotated heatmap, one coloured cell per coefficient.
fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ui.label(format!("{} complete rows used", matrix.rows_used));
    egui::Grid::new("correlation_matrix")
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for name in &matrix.columns {
                ui.strong(name.as_str());
            }
            ui.end_row();

            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.strong(name.as_str());
                for &r in row {
                    let bg = diverging(r);
                    let text = if r.is_nan() { "NaN".to_string() } else { format!("{r:.2}") };
                    ui.label(
                        RichText::new(format!(" {text} "))
                            .monospace()
                            .background_color(bg)
                            .color(text_on(bg)),
                    );
                }
                ui.end_row();
            }
        });
}
