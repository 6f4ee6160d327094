//! View model: the containers the front ends draw and the renderers fill.
//!
//! Nothing in here knows about egui or a terminal. A [`Panel`] is a hide/show
//! region; its body is a [`Content`] value that renderers replace wholesale.

use crate::models::RankingSystem;
use std::fmt;

/// Fixed, user-facing placeholder messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The publisher has not released this year's edition yet.
    NotYetPublished { system: RankingSystem, year: i32 },
    NoData,
    NoResults,
    NoMatchingUniversities,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::NotYetPublished { system, year } => {
                write!(f, "{system} {year} rankings have not been published yet")
            }
            Message::NoData => f.write_str("No data available"),
            Message::NoResults => f.write_str("No matching results found"),
            Message::NoMatchingUniversities => f.write_str("No matching universities found"),
        }
    }
}

/// A country flag shown next to a table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub flag: Option<Flag>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flag: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Footnote printed under the table.
    pub note: Option<String>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            note: None,
        }
    }

    pub fn ncols(&self) -> usize {
        self.headers.len()
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Plain text of one column, top to bottom.
    pub fn column(&self, idx: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.get(idx).map(|c| c.text.as_str()).unwrap_or(""))
            .collect()
    }
}

/// A headed table, one per ranking system in search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub table: Table,
}

/// Body of a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Message(Message),
    Table(Table),
    Sections(Vec<Section>),
    /// Trend result: the declarative chart plus its data table. The live chart
    /// instance itself is held by the trend panel's canvas.
    Trend {
        chart: crate::trend::TrendChart,
        table: Table,
    },
}

impl Content {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Content::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Content::Table(t) | Content::Trend { table: t, .. } => Some(t),
            _ => None,
        }
    }
}

/// Whether a panel is visible and what it shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelState {
    #[default]
    Hidden,
    Populated(Content),
}

/// What a front end should draw for a panel right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Hidden,
    /// At least one request is in flight; prior content (if any) stays visible.
    Loading,
    Populated,
}

/// A hide/show region with a header and a content body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    state: PanelState,
    in_flight: usize,
}

impl Panel {
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn content(&self) -> Option<&Content> {
        match &self.state {
            PanelState::Populated(c) => Some(c),
            PanelState::Hidden => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PanelState::Populated(_))
    }

    pub fn status(&self) -> PanelStatus {
        if self.in_flight > 0 {
            PanelStatus::Loading
        } else if self.is_visible() {
            PanelStatus::Populated
        } else {
            PanelStatus::Hidden
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Replace the body and make the panel visible. Never appends.
    pub fn show(&mut self, content: Content) {
        self.state = PanelState::Populated(content);
    }

    pub fn hide(&mut self) {
        self.state = PanelState::Hidden;
    }

    pub(crate) fn request_started(&mut self) {
        self.in_flight += 1;
    }

    pub(crate) fn request_finished(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
