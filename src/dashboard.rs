//! Controllers: user actions in, backend requests out, outcomes back into panels.
//!
//! Every action is split in two halves so that front ends can run the network
//! call wherever they like:
//!
//! 1. An action method (`initialize`, `select_year`, `submit_search`, …) validates
//!    input on the caller's thread and returns the [`Request`] to send, or `None`
//!    when nothing should be sent.
//! 2. [`Request::send`] performs the call against any [`RankingApi`].
//! 3. [`Dashboard::apply`] renders the [`Outcome`] into the matching container and
//!    may return a follow-up request (years -> rankings).
//!
//! Outcomes are applied in arrival order: the last one to arrive wins.
//! [`Dashboard::run`] chains the three steps synchronously.

use crate::api::RankingApi;
use crate::config::{MAX_COMPARE_SLOTS, MIN_COMPARE_SLOTS, Settings};
use crate::error::{ApiError, Notice};
use crate::models::{CompareResponse, RankingYearSnapshot, SearchResultSet, TrendResponse};
use crate::render::{self, RankingBoard};
use crate::state::AppState;
use crate::trend::{ChartBackend, ChartCanvas, build_trend_chart};
use crate::view::{Content, Panel};
use log::{debug, warn};

const YEARS_FAILED: &str = "Failed to load the available years, please refresh and try again";
const NO_YEARS: &str = "The ranking service has no years available";
const RANKINGS_FAILED: &str = "Failed to load ranking data, please try again later";
const SEARCH_FAILED: &str = "Search failed, please try again later";
const COMPARE_FAILED: &str = "Comparison failed, please try again later";
const TREND_FAILED: &str = "Trend analysis failed, please try again later";
const NEED_TWO: &str = "Please enter at least two universities to compare";
const NEED_NAME: &str = "Please enter a university name";
const NO_YEAR_SELECTED: &str = "Please select a year first";

/// A backend call decided on by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Years,
    Rankings { year: i32 },
    Search { query: String, year: i32 },
    Compare { universities: Vec<String>, year: i32 },
    Trend { university: String },
}

/// The result of a [`Request`], tagged with what was asked for.
#[derive(Debug)]
pub enum Outcome {
    Years(Result<Vec<i32>, ApiError>),
    Rankings {
        year: i32,
        result: Result<RankingYearSnapshot, ApiError>,
    },
    Search(Result<SearchResultSet, ApiError>),
    Compare(Result<CompareResponse, ApiError>),
    Trend(Result<TrendResponse, ApiError>),
}

impl Request {
    pub fn send<A: RankingApi + ?Sized>(&self, api: &A) -> Outcome {
        match self {
            Request::Years => Outcome::Years(api.available_years()),
            Request::Rankings { year } => Outcome::Rankings {
                year: *year,
                result: api.rankings(*year),
            },
            Request::Search { query, year } => Outcome::Search(api.search(query, *year)),
            Request::Compare { universities, year } => {
                Outcome::Compare(api.compare(universities, *year))
            }
            Request::Trend { university } => Outcome::Trend(api.trend(university)),
        }
    }
}

/// Search bar and its results panel.
#[derive(Debug, Clone, Default)]
pub struct SearchPanel {
    pub input: String,
    pub panel: Panel,
}

/// Comparison inputs and results panel.
#[derive(Debug, Clone)]
pub struct ComparePanel {
    pub inputs: Vec<String>,
    pub panel: Panel,
}

impl ComparePanel {
    fn new(slots: usize) -> Self {
        Self {
            inputs: vec![String::new(); slots.clamp(MIN_COMPARE_SLOTS, MAX_COMPARE_SLOTS)],
            panel: Panel::default(),
        }
    }

    /// Trimmed, non-empty names in input order.
    pub fn names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Trend input, results panel and the chart canvas.
pub struct TrendPanel<B: ChartBackend> {
    pub input: String,
    pub panel: Panel,
    pub canvas: ChartCanvas<B>,
}

/// The whole dashboard: state, the ranking board and the three result panels.
pub struct Dashboard<B: ChartBackend> {
    settings: Settings,
    state: AppState,
    pub board: RankingBoard,
    pub search: SearchPanel,
    pub compare: ComparePanel,
    pub trend: TrendPanel<B>,
    notice: Option<Notice>,
    years_pending: usize,
}

impl<B: ChartBackend> Dashboard<B> {
    pub fn new(settings: Settings, chart_backend: B) -> Self {
        let compare = ComparePanel::new(settings.compare_slots);
        Self {
            settings,
            state: AppState::default(),
            board: RankingBoard::default(),
            search: SearchPanel::default(),
            compare,
            trend: TrendPanel {
                input: String::new(),
                panel: Panel::default(),
                canvas: ChartCanvas::new(chart_backend),
            },
            notice: None,
            years_pending: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn current_year(&self) -> Option<i32> {
        self.state.current_year()
    }

    /// The pending notification, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Acknowledge and remove the pending notification.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// `true` while the year list or a ranking snapshot is being fetched.
    pub fn is_loading_rankings(&self) -> bool {
        self.years_pending > 0
    }

    fn notify(&mut self, notice: Notice) {
        warn!("{}", notice.message);
        self.notice = Some(notice);
    }

    fn notify_api(&mut self, err: &ApiError, fallback: &str) {
        warn!("{err}");
        self.notify(Notice::from_api(err, fallback));
    }

    // ----------------------------
    // Year selector
    // ----------------------------

    pub fn initialize(&mut self) -> Request {
        self.years_pending += 1;
        Request::Years
    }

    /// Handle a change of the year control. `value` is the control's raw value.
    pub fn select_year(&mut self, value: &str) -> Option<Request> {
        let year = match value.trim().parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                self.notify(Notice::validation(format!("Invalid year: {}", value.trim())));
                return None;
            }
        };
        if !self.state.select_year(year) {
            self.notify(Notice::validation(format!("No rankings available for {year}")));
            return None;
        }
        // The previous year's tables must not sit under the new year's titles.
        self.board.set_year(year);
        self.board.clear();
        Some(self.rankings_request(year))
    }

    fn rankings_request(&mut self, year: i32) -> Request {
        self.years_pending += 1;
        Request::Rankings { year }
    }

    // ----------------------------
    // Search
    // ----------------------------

    /// Run the search typed into the search field. A blank query hides the panel.
    pub fn submit_search(&mut self) -> Option<Request> {
        let query = self.search.input.trim().to_string();
        if query.is_empty() {
            self.search.panel.hide();
            return None;
        }
        let year = self.require_year()?;
        self.search.panel.request_started();
        Some(Request::Search { query, year })
    }

    pub fn hide_search(&mut self) {
        self.search.panel.hide();
        self.search.input.clear();
    }

    // ----------------------------
    // Comparison
    // ----------------------------

    /// Regenerate the comparison inputs. Typed values are discarded.
    pub fn set_compare_count(&mut self, count: usize) {
        let count = count.clamp(MIN_COMPARE_SLOTS, MAX_COMPARE_SLOTS);
        self.compare.inputs = vec![String::new(); count];
    }

    pub fn clear_compare_input(&mut self, index: usize) {
        if let Some(input) = self.compare.inputs.get_mut(index) {
            input.clear();
        }
    }

    pub fn submit_compare(&mut self) -> Option<Request> {
        let universities = self.compare.names();
        if universities.len() < MIN_COMPARE_SLOTS {
            self.notify(Notice::validation(NEED_TWO));
            return None;
        }
        let year = self.require_year()?;
        self.compare.panel.request_started();
        Some(Request::Compare { universities, year })
    }

    pub fn hide_compare(&mut self) {
        self.compare.panel.hide();
        self.compare.inputs.iter_mut().for_each(String::clear);
    }

    // ----------------------------
    // Trend
    // ----------------------------

    pub fn submit_trend(&mut self) -> Option<Request> {
        let university = self.trend.input.trim().to_string();
        if university.is_empty() {
            self.notify(Notice::validation(NEED_NAME));
            return None;
        }
        self.trend.panel.request_started();
        Some(Request::Trend { university })
    }

    /// Hide the trend panel and destroy its chart instance.
    pub fn hide_trend(&mut self) {
        self.trend.canvas.clear();
        self.trend.panel.hide();
    }

    fn require_year(&mut self) -> Option<i32> {
        let year = self.state.current_year();
        if year.is_none() {
            self.notify(Notice::validation(NO_YEAR_SELECTED));
        }
        year
    }

    // ----------------------------
    // Outcomes
    // ----------------------------

    /// Render an outcome. Returns a follow-up request when one is due.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Request> {
        match outcome {
            Outcome::Years(result) => {
                self.years_pending = self.years_pending.saturating_sub(1);
                self.apply_years(result)
            }
            Outcome::Rankings { year, result } => {
                self.years_pending = self.years_pending.saturating_sub(1);
                self.apply_rankings(year, result);
                None
            }
            Outcome::Search(result) => {
                self.search.panel.request_finished();
                match result {
                    Ok(results) => self.search.panel.show(render::render_search(&results)),
                    Err(e) => self.notify_api(&e, SEARCH_FAILED),
                }
                None
            }
            Outcome::Compare(result) => {
                self.compare.panel.request_finished();
                match result {
                    Ok(resp) => self.compare.panel.show(render::render_comparison(&resp)),
                    Err(e) => self.notify_api(&e, COMPARE_FAILED),
                }
                None
            }
            Outcome::Trend(result) => {
                self.trend.panel.request_finished();
                match result {
                    Ok(resp) => self.apply_trend(&resp),
                    Err(e) => self.notify_api(&e, TREND_FAILED),
                }
                None
            }
        }
    }

    fn apply_years(&mut self, result: Result<Vec<i32>, ApiError>) -> Option<Request> {
        let years = match result {
            Ok(years) => years,
            Err(e) => {
                self.notify_api(&e, YEARS_FAILED);
                return None;
            }
        };
        match self.state.set_years(years) {
            Some(year) => {
                self.board.set_year(year);
                Some(self.rankings_request(year))
            }
            None => {
                self.notify(Notice::validation(NO_YEARS));
                None
            }
        }
    }

    fn apply_rankings(&mut self, year: i32, result: Result<RankingYearSnapshot, ApiError>) {
        let snapshot = match result {
            Ok(s) => s,
            Err(e) => {
                self.notify_api(&e, RANKINGS_FAILED);
                return;
            }
        };
        if !self.state.store_snapshot(year, snapshot) {
            debug!(
                "discarding rankings for {year}; selected year is {:?}",
                self.state.current_year()
            );
            return;
        }
        if let Some(snapshot) = self.state.snapshot() {
            self.board
                .fill(snapshot, year, self.settings.unpublished_arwu_year);
        }
    }

    fn apply_trend(&mut self, resp: &TrendResponse) {
        let chart = build_trend_chart(&resp.university_name, &resp.trend_data);
        if let Err(e) = self.trend.canvas.render(&chart) {
            warn!("trend chart: {e:#}");
            self.trend.panel.hide();
            self.notify(Notice::internal(TREND_FAILED));
            return;
        }
        let table = chart.to_table();
        self.trend.panel.show(Content::Trend { chart, table });
    }

    /// Send `request` and apply its outcome, following up until nothing is left.
    pub fn run<A: RankingApi + ?Sized>(&mut self, api: &A, request: Option<Request>) {
        let mut next = request;
        while let Some(req) = next {
            next = self.apply(req.send(api));
        }
    }
}
