//! Trend chart model and the chart-instance lifecycle.
//!
//! [`build_trend_chart`] turns a [`TrendSeries`] into a declarative [`TrendChart`]:
//! the year axis is the sorted union of every system's years and each system gets
//! one line whose missing years are gaps (`None`), never zero.
//!
//! Drawing is delegated to a [`ChartBackend`]. [`ChartCanvas`] owns at most one
//! live chart instance and destroys it before drawing a replacement.

use crate::models::{PLACEHOLDER, RankingSystem, TrendSeries};
use crate::view::{Cell, Table};
use anyhow::Result;
use std::collections::BTreeSet;

/// 24-bit series color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColor(pub u8, pub u8, pub u8);

impl SeriesColor {
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Fixed color per ranking system.
pub fn system_color(system: RankingSystem) -> SeriesColor {
    match system {
        RankingSystem::Arwu => SeriesColor(0xFF, 0x63, 0x84), // #FF6384
        RankingSystem::Qs => SeriesColor(0x36, 0xA2, 0xEB),   // #36A2EB
        RankingSystem::The => SeriesColor(0x4B, 0xC0, 0xC0),  // #4BC0C0
    }
}

/// Axis configuration handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub x_title: String,
    pub y_title: String,
    /// Rank 1 at the top.
    pub reverse_y: bool,
    /// Lower bound of the rank axis; ranks never go below it.
    pub y_min: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            x_title: "Year".into(),
            y_title: "Rank".into(),
            reverse_y: true,
            y_min: 0.0,
        }
    }
}

/// One line of the chart, aligned with [`TrendChart::years`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub system: RankingSystem,
    pub color: SeriesColor,
    pub values: Vec<Option<u32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub title: String,
    pub years: Vec<i32>,
    pub lines: Vec<TrendLine>,
    pub options: ChartOptions,
}

impl TrendChart {
    pub fn line(&self, system: RankingSystem) -> Option<&TrendLine> {
        self.lines.iter().find(|l| l.system == system)
    }

    /// Largest plotted rank, if any year has one.
    pub fn max_rank(&self) -> Option<u32> {
        self.lines
            .iter()
            .flat_map(|l| l.values.iter().flatten())
            .copied()
            .max()
    }

    /// Year x system table of the plotted values.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            std::iter::once("Year".to_string())
                .chain(self.lines.iter().map(|l| l.system.to_string())),
        );
        for (i, year) in self.years.iter().enumerate() {
            let mut row = vec![Cell::text(year.to_string())];
            for line in &self.lines {
                let v = line.values.get(i).copied().flatten();
                row.push(Cell::text(
                    v.map(|r| r.to_string())
                        .unwrap_or_else(|| PLACEHOLDER.to_string()),
                ));
            }
            table.rows.push(row);
        }
        table
    }
}

/// Sorted union of the years reported by any system.
pub fn year_axis(series: &TrendSeries) -> Vec<i32> {
    let years: BTreeSet<i32> = series.values().flat_map(|by_year| by_year.keys().copied()).collect();
    years.into_iter().collect()
}

/// Build the declarative chart for one university.
pub fn build_trend_chart(university_name: &str, series: &TrendSeries) -> TrendChart {
    let years = year_axis(series);
    let lines = series
        .iter()
        .map(|(system, by_year)| TrendLine {
            system: *system,
            color: system_color(*system),
            values: years
                .iter()
                .map(|y| by_year.get(y).and_then(|p| p.rank))
                .collect(),
        })
        .collect();
    TrendChart {
        title: format!("{university_name} ranking trend"),
        years,
        lines,
        options: ChartOptions::default(),
    }
}

/// A concrete charting capability.
///
/// `draw` creates a new chart instance; `destroy` releases one. Backends never see
/// two live instances from the same [`ChartCanvas`].
pub trait ChartBackend {
    type Chart;

    fn draw(&mut self, chart: &TrendChart) -> Result<Self::Chart>;
    fn destroy(&mut self, chart: Self::Chart);
}

/// Holds the single live chart instance for one canvas.
pub struct ChartCanvas<B: ChartBackend> {
    backend: B,
    active: Option<B::Chart>,
}

impl<B: ChartBackend> ChartCanvas<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    /// Destroy the current instance (if any), then draw `chart`.
    ///
    /// On a drawing error the canvas is left empty.
    pub fn render(&mut self, chart: &TrendChart) -> Result<()> {
        self.clear();
        let instance = self.backend.draw(chart)?;
        self.active = Some(instance);
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Some(old) = self.active.take() {
            self.backend.destroy(old);
        }
    }

    pub fn active(&self) -> Option<&B::Chart> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: ChartBackend> Drop for ChartCanvas<B> {
    fn drop(&mut self) {
        self.clear();
    }
}
