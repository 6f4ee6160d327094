//! Visualization: draw a [`TrendChart`] with plotters, to **SVG**/**PNG** files or an RGB buffer.
//!
//! - One line per ranking system, in the system's fixed color, with point markers
//! - Gaps where a system has no rank for a year (lines are split, never bridged)
//! - Rank axis reversed (rank 1 at the top) and clamped at zero
//! - Inside legend, whole-number tick labels

pub mod util;

use crate::trend::{ChartBackend, TrendChart};
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::Once;

use util::{line_segments, rank_bounds, rgb, year_bounds};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Write `chart` to `out_path`; `.svg` produces SVG, anything else PNG.
pub fn plot_trend<P: AsRef<Path>>(chart: &TrendChart, out_path: P, width: u32, height: u32) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_trend(root, chart)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_trend(root, chart)?;
    }
    Ok(())
}

/// Rasterize `chart` into a packed RGB buffer (`width * height * 3` bytes).
pub fn render_rgb(chart: &TrendChart, width: u32, height: u32) -> Result<Vec<u8>> {
    ensure_fonts_registered();
    let mut buf = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw_trend(root, chart)?;
    }
    Ok(buf)
}

fn draw_trend<DB>(root: DrawingArea<DB, Shift>, chart: &TrendChart) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;

    let (x_min, x_max) =
        year_bounds(&chart.years).ok_or_else(|| anyhow!("no trend data to plot"))?;
    let (y_low, y_high) = rank_bounds(chart.max_rank(), chart.options.y_min);
    // Range start maps to the bottom edge, so a reversed axis starts at the largest rank.
    let y_range = if chart.options.reverse_y {
        y_high..y_low
    } else {
        y_low..y_high
    };

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| {
        if x.fract().abs() < 1e-6 {
            (x.round() as i32).to_string()
        } else {
            String::new()
        }
    };
    let y_label_fmt = |v: &f64| format!("{:.0}", v.max(chart.options.y_min));
    let x_label_count = chart.years.len().clamp(2, 12);

    let mut ctx = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(chart.title.as_str(), (FontFamily::SansSerif, 20))
        .set_label_area_size(LabelAreaPosition::Left, 56)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(x_min..x_max, y_range)
        .map_err(|e| anyhow!("{:?}", e))?;

    ctx.configure_mesh()
        .x_desc(chart.options.x_title.as_str())
        .y_desc(chart.options.y_title.as_str())
        .x_labels(x_label_count)
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for line in &chart.lines {
        let color = rgb(line.color);
        let style = ShapeStyle {
            color: color.to_rgba(),
            filled: false,
            stroke_width: 2,
        };

        for segment in line_segments(&chart.years, &line.values) {
            if segment.len() > 1 {
                ctx.draw_series(LineSeries::new(segment, style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }

        let points: Vec<(f64, f64)> = chart
            .years
            .iter()
            .zip(&line.values)
            .filter_map(|(y, v)| v.map(|r| (*y as f64, r as f64)))
            .collect();
        let legend_color = color;
        ctx.draw_series(
            points
                .into_iter()
                .map(|(x, y)| Circle::new((x, y), 5, color.filled())),
        )
        .map_err(|e| anyhow!("{:?}", e))?
        .label(line.system.as_str())
        .legend(move |(x, y)| {
            EmptyElement::at((x, y))
                + PathElement::new(vec![(0, 0), (16, 0)], legend_color.stroke_width(2))
                + Circle::new((8, 0), 4, legend_color.filled())
        });
    }

    ctx.configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 13))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Chart backend that writes each chart to a file (CLI).
///
/// Without a path nothing is written and the instance is empty.
#[derive(Debug, Clone)]
pub struct FileChartBackend {
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl ChartBackend for FileChartBackend {
    type Chart = Option<PathBuf>;

    fn draw(&mut self, chart: &TrendChart) -> Result<Self::Chart> {
        match &self.path {
            Some(p) => {
                plot_trend(chart, p, self.width, self.height)?;
                Ok(Some(p.clone()))
            }
            None => Ok(None),
        }
    }

    // The file belongs to the user; releasing the instance leaves it in place.
    fn destroy(&mut self, _chart: Self::Chart) {}
}

/// A rasterized chart held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterChart {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Chart backend that rasterizes into memory.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    pub width: u32,
    pub height: u32,
}

impl ChartBackend for RasterBackend {
    type Chart = RasterChart;

    fn draw(&mut self, chart: &TrendChart) -> Result<Self::Chart> {
        Ok(RasterChart {
            width: self.width,
            height: self.height,
            rgb: render_rgb(chart, self.width, self.height)?,
        })
    }

    fn destroy(&mut self, _chart: Self::Chart) {}
}
