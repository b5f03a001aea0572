//! Round-by-round picture of the surviving energy intervals.
//!
//! Every `step`-th round gets one row of horizontal segments, with vertical
//! lines at the exact eigenvalues for comparison. The backend follows the
//! output extension: `.svg` is vector, anything else is a PNG bitmap.

use crate::common::PlotConfig;
use crate::domain::BootstrapError;
use crate::region::Region;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const IMAGE_SIZE: (u32, u32) = (1280, 800);
const MARKER_RADIUS: i32 = 4;

pub fn default_plot_file_name(round: usize, key: &str) -> String {
    format!("result_N{round}_{key}.png")
}

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("failed to create plot directory '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to render plot '{}': {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl From<PlotError> for BootstrapError {
    fn from(error: PlotError) -> Self {
        BootstrapError::io_system("IO.PLOT", error.to_string())
    }
}

/// Segments of one plotted round, clipped to the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRow {
    pub round: usize,
    pub segments: Vec<(f64, f64)>,
}

/// Rows for rounds `step, 2 * step, ...` of `history`. Unbounded ends are
/// clipped to `[x_inf, x_sup]` and pieces outside the axis are dropped.
pub fn plot_rows(history: &[Region], step: usize, x_inf: f64, x_sup: f64) -> Vec<PlotRow> {
    let step = step.max(1);
    (step..=history.len())
        .step_by(step)
        .map(|round| PlotRow {
            round,
            segments: history[round - 1]
                .iter()
                .filter(|interval| interval.upper() >= x_inf && interval.lower() <= x_sup)
                .map(|interval| (interval.lower().max(x_inf), interval.upper().min(x_sup)))
                .collect(),
        })
        .collect()
}

pub fn render_energy_intervals(
    path: &Path,
    title: &str,
    history: &[Region],
    reference_energies: &[f64],
    config: &PlotConfig,
) -> Result<(), PlotError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PlotError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let rows = plot_rows(history, config.step, config.x_inf, config.x_sup);
    let is_svg = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("svg"));
    let rendered = if is_svg {
        draw(
            SVGBackend::new(path, IMAGE_SIZE).into_drawing_area(),
            title,
            &rows,
            reference_energies,
            config,
        )
    } else {
        draw(
            BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area(),
            title,
            &rows,
            reference_energies,
            config,
        )
    };
    rendered.map_err(|error| PlotError::Render {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;

    info!(path = %path.display(), rows = rows.len(), "wrote energy interval plot");
    Ok(())
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    title: &str,
    rows: &[PlotRow],
    reference_energies: &[f64],
    config: &PlotConfig,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let top = rows.len() as f64 + 1.0;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(config.x_inf..config.x_sup, 0.0..top)?;

    let row_label = |y: &f64| {
        let index = y.round();
        if (y - index).abs() > 1.0e-6 || index < 1.0 {
            return String::new();
        }
        rows.get(index as usize - 1)
            .map(|row| format!("L={}", row.round))
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("energy")
        .y_labels(rows.len() + 2)
        .y_label_formatter(&row_label)
        .draw()?;

    for &energy in reference_energies
        .iter()
        .filter(|energy| (config.x_inf..=config.x_sup).contains(*energy))
    {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(energy, 0.0), (energy, top)],
            BLACK.mix(0.35),
        )))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let y = index as f64 + 1.0;
        let color = Palette99::pick(index).to_rgba();
        chart.draw_series(row.segments.iter().map(|&(lower, upper)| {
            PathElement::new(vec![(lower, y), (upper, y)], color.stroke_width(2))
        }))?;
        chart.draw_series(row.segments.iter().flat_map(|&(lower, upper)| {
            [lower, upper]
                .into_iter()
                .map(move |x| Circle::new((x, y), MARKER_RADIUS, color.filled()))
        }))?;
    }

    root.present()?;
    Ok(())
}
