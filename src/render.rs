//! Renderers: pure functions from API payloads to view [`Content`].

use crate::models::{
    CompareResponse, ComparisonRow, RankingEntry, RankingSystem, RankingYearSnapshot,
    SearchResultSet,
};
use crate::view::{Cell, Content, Flag, Message, Section, Table};

pub const FLAG_CDN: &str = "https://flagcdn.com/24x18";

/// Flag image for an entry, `None` when it carries no country code.
pub fn flag_for(entry: &RankingEntry) -> Option<Flag> {
    entry.flag_code().map(|code| Flag {
        url: format!("{FLAG_CDN}/{code}.png"),
        alt: entry.country_text(),
    })
}

/// One system column of the ranking board.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSection {
    pub system: RankingSystem,
    pub content: Option<Content>,
}

/// The three ranking columns plus the year shown in their titles.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingBoard {
    pub year: Option<i32>,
    pub sections: [RankingSection; 3],
}

impl Default for RankingBoard {
    fn default() -> Self {
        Self {
            year: None,
            sections: RankingSystem::ALL.map(|system| RankingSection {
                system,
                content: None,
            }),
        }
    }
}

impl RankingBoard {
    pub fn set_year(&mut self, year: i32) {
        self.year = Some(year);
    }

    pub fn title(&self, system: RankingSystem) -> String {
        match self.year {
            Some(y) => format!("{system} {y}"),
            None => system.to_string(),
        }
    }

    /// Drop all three bodies; front ends show a loading state until `fill`.
    pub fn clear(&mut self) {
        for section in self.sections.iter_mut() {
            section.content = None;
        }
    }

    pub fn section(&self, system: RankingSystem) -> &RankingSection {
        &self.sections[system as usize]
    }

    /// Replace all three sections from `snapshot`.
    pub fn fill(&mut self, snapshot: &RankingYearSnapshot, year: i32, unpublished_arwu_year: i32) {
        for section in self.sections.iter_mut() {
            section.content = Some(render_section(
                section.system,
                snapshot,
                year,
                unpublished_arwu_year,
            ));
        }
    }
}

/// Content of a single system column.
///
/// ARWU for the designated unpublished year gets its own notice instead of the
/// generic empty state.
pub fn render_section(
    system: RankingSystem,
    snapshot: &RankingYearSnapshot,
    year: i32,
    unpublished_arwu_year: i32,
) -> Content {
    if system == RankingSystem::Arwu && year == unpublished_arwu_year && snapshot.is_absent(system) {
        return Content::Message(Message::NotYetPublished { system, year });
    }
    match snapshot.entries(system) {
        Some(entries) if !entries.is_empty() => Content::Table(ranking_table(entries)),
        _ => Content::Message(Message::NoData),
    }
}

pub fn ranking_table(entries: &[RankingEntry]) -> Table {
    let mut table = Table::new(["Rank", "University", "Country/Region"]);
    table.rows = entries
        .iter()
        .map(|e| {
            vec![
                Cell::text(e.rank_text()),
                Cell::text(e.university_text()),
                Cell {
                    text: e.country_text(),
                    flag: flag_for(e),
                },
            ]
        })
        .collect();
    table
}

pub fn render_search(results: &SearchResultSet) -> Content {
    if results.is_empty() {
        return Content::Message(Message::NoResults);
    }
    let sections = results
        .iter()
        .map(|(system, hits)| {
            let mut table = Table::new(["Rank", "University"]);
            table.rows = hits
                .data
                .iter()
                .map(|e| vec![Cell::text(e.rank_text()), Cell::text(e.university_text())])
                .collect();
            Section {
                heading: format!("{system} ({})", hits.year),
                table,
            }
        })
        .collect();
    Content::Sections(sections)
}

/// Name shown for a compared university: ARWU, then QS, then THE, then what the user typed.
pub fn display_name<'a>(query: &'a str, row: &'a ComparisonRow) -> &'a str {
    RankingSystem::ALL
        .iter()
        .find_map(|s| row.get(s).and_then(|hit| hit.found_name()))
        .unwrap_or(query)
}

pub fn render_comparison(resp: &CompareResponse) -> Content {
    if resp.results.is_empty() {
        return Content::Message(Message::NoMatchingUniversities);
    }
    let mut table = Table::new(["University", "ARWU Rank", "QS Rank", "THE Rank"]);
    for (query, row) in &resp.results {
        let mut cells = vec![Cell::text(display_name(query, row))];
        for system in RankingSystem::ALL {
            let rank = row
                .get(&system)
                .map(|hit| hit.rank_text())
                .unwrap_or_else(|| crate::models::PLACEHOLDER.to_string());
            cells.push(Cell::text(rank));
        }
        table.rows.push(cells);
    }
    table.note = Some(format!("Source: {} ranking data", resp.year));
    Content::Table(table)
}
