use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use anyhow::{Result, bail};
use unirank::models::{
    CompareResponse, ComparisonHit, ComparisonRow, RankValue, RankingEntry, RankingSystem,
    RankingYearSnapshot, SearchHits, SearchResultSet, TrendPoint, TrendResponse,
};
use unirank::trend::{ChartBackend, TrendChart};
use unirank::view::{Content, Message, PanelStatus};
use unirank::{ApiError, Dashboard, NoticeKind, Outcome, RankingApi, Request, Settings};

/// In-process backend with call counters.
#[derive(Default)]
struct FakeApi {
    years: Vec<i32>,
    snapshots: BTreeMap<i32, RankingYearSnapshot>,
    search: SearchResultSet,
    compare: Option<CompareResponse>,
    trend: Option<TrendResponse>,
    fail_years: bool,
    failing_rankings: Vec<i32>,
    fail_search: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl RankingApi for FakeApi {
    fn available_years(&self) -> Result<Vec<i32>, ApiError> {
        self.log("years".into());
        if self.fail_years {
            return Err(ApiError::Status {
                status: 503,
                message: None,
            });
        }
        Ok(self.years.clone())
    }

    fn rankings(&self, year: i32) -> Result<RankingYearSnapshot, ApiError> {
        self.log(format!("rankings {year}"));
        if self.failing_rankings.contains(&year) {
            return Err(ApiError::Status {
                status: 500,
                message: None,
            });
        }
        Ok(self.snapshots.get(&year).cloned().unwrap_or_default())
    }

    fn search(&self, query: &str, year: i32) -> Result<SearchResultSet, ApiError> {
        self.log(format!("search {query} {year}"));
        if self.fail_search {
            return Err(ApiError::Status {
                status: 500,
                message: None,
            });
        }
        Ok(self.search.clone())
    }

    fn compare(&self, universities: &[String], year: i32) -> Result<CompareResponse, ApiError> {
        self.log(format!("compare {} {year}", universities.join("|")));
        Ok(self.compare.clone().unwrap_or(CompareResponse {
            results: BTreeMap::new(),
            year,
        }))
    }

    fn trend(&self, university: &str) -> Result<TrendResponse, ApiError> {
        self.log(format!("trend {university}"));
        match &self.trend {
            Some(t) => Ok(t.clone()),
            None => Err(ApiError::Status {
                status: 404,
                message: Some("University not found".into()),
            }),
        }
    }
}

/// Chart backend that counts live instances.
#[derive(Default)]
struct CountingBackend {
    live: std::rc::Rc<Cell<i32>>,
    created: std::rc::Rc<Cell<i32>>,
    fail: bool,
}

impl ChartBackend for CountingBackend {
    type Chart = String;

    fn draw(&mut self, chart: &TrendChart) -> Result<Self::Chart> {
        if self.fail {
            bail!("canvas unavailable");
        }
        self.live.set(self.live.get() + 1);
        self.created.set(self.created.get() + 1);
        Ok(chart.title.clone())
    }

    fn destroy(&mut self, _chart: Self::Chart) {
        self.live.set(self.live.get() - 1);
    }
}

fn entry(rank: i64, name: &str, country: &str, code: &str) -> RankingEntry {
    RankingEntry {
        world_rank: Some(RankValue::Int(rank)),
        university: Some(name.into()),
        country: Some(country.into()),
        country_code: Some(code.into()),
    }
}

fn snapshot_2024() -> RankingYearSnapshot {
    RankingYearSnapshot {
        arwu: Some(vec![entry(1, "Harvard University", "United States", "US")]),
        qs: Some(vec![
            entry(1, "MIT", "United States", "US"),
            entry(2, "Imperial College London", "United Kingdom", "GB"),
        ]),
        the: Some(vec![]),
    }
}

fn api() -> FakeApi {
    FakeApi {
        years: vec![2025, 2024, 2023],
        snapshots: BTreeMap::from([
            (
                2025,
                RankingYearSnapshot {
                    arwu: None,
                    qs: Some(vec![entry(1, "MIT", "United States", "US")]),
                    the: None,
                },
            ),
            (2024, snapshot_2024()),
        ]),
        ..Default::default()
    }
}

fn dashboard() -> Dashboard<CountingBackend> {
    Dashboard::new(Settings::default(), CountingBackend::default())
}

fn started(api: &FakeApi) -> Dashboard<CountingBackend> {
    let mut d = dashboard();
    let first = d.initialize();
    d.run(api, Some(first));
    d
}

#[test]
fn startup_selects_first_year_and_loads_it() {
    let api = api();
    let d = started(&api);
    assert_eq!(api.calls(), vec!["years", "rankings 2025"]);
    assert_eq!(d.current_year(), Some(2025));
    assert_eq!(d.state().years(), &[2025, 2024, 2023]);
    assert_eq!(d.board.title(RankingSystem::Arwu), "ARWU 2025");
    assert_eq!(d.board.title(RankingSystem::The), "THE 2025");
    assert!(!d.is_loading_rankings());
}

#[test]
fn unpublished_arwu_year_gets_its_own_notice() {
    let api = api();
    let d = started(&api);
    let arwu = d.board.section(RankingSystem::Arwu).content.as_ref().unwrap();
    assert_eq!(
        arwu.as_message(),
        Some(&Message::NotYetPublished {
            system: RankingSystem::Arwu,
            year: 2025
        })
    );
    // Other absent systems use the generic empty state
    let the = d.board.section(RankingSystem::The).content.as_ref().unwrap();
    assert_eq!(the.as_message(), Some(&Message::NoData));
    let qs = d.board.section(RankingSystem::Qs).content.as_ref().unwrap();
    assert_eq!(qs.as_table().unwrap().nrows(), 1);
}

#[test]
fn year_change_rerenders_all_three_sections() {
    let api = api();
    let mut d = started(&api);
    let req = d.select_year("2024");
    assert_eq!(req, Some(Request::Rankings { year: 2024 }));
    // Titles follow the control before the data arrives, and last year's tables are gone
    assert_eq!(d.board.title(RankingSystem::Qs), "QS 2024");
    for section in &d.board.sections {
        assert!(section.content.is_none(), "{} kept stale content", section.system);
    }
    d.run(&api, req);

    let qs = d.board.section(RankingSystem::Qs).content.as_ref().unwrap();
    let table = qs.as_table().unwrap();
    assert_eq!(table.headers, vec!["Rank", "University", "Country/Region"]);
    assert_eq!(table.column(1), vec!["MIT", "Imperial College London"]);
    assert_eq!(
        table.rows[1][2].flag.as_ref().unwrap().url,
        "https://flagcdn.com/24x18/gb.png"
    );
    let the = d.board.section(RankingSystem::The).content.as_ref().unwrap();
    assert_eq!(the.as_message(), Some(&Message::NoData));
}

#[test]
fn empty_arwu_outside_designated_year_is_generic() {
    let mut api = api();
    api.snapshots.insert(2023, RankingYearSnapshot::default());
    let mut d = started(&api);
    let req = d.select_year("2023");
    d.run(&api, req);
    let arwu = d.board.section(RankingSystem::Arwu).content.as_ref().unwrap();
    assert_eq!(arwu.as_message(), Some(&Message::NoData));
}

#[test]
fn stale_rankings_are_discarded() {
    let api = api();
    let mut d = started(&api);
    let to_2024 = d.select_year("2024").unwrap();
    let to_2023 = d.select_year("2023").unwrap();
    // 2023 answers first, then the slower 2024 response arrives
    d.apply(to_2023.send(&api));
    d.apply(to_2024.send(&api));
    assert_eq!(d.state().snapshot_year(), Some(2023));
    let qs = d.board.section(RankingSystem::Qs).content.as_ref().unwrap();
    assert_eq!(qs.as_message(), Some(&Message::NoData));
    assert!(!d.is_loading_rankings());
}

#[test]
fn invalid_year_is_rejected_without_a_call() {
    let api = api();
    let mut d = started(&api);
    assert_eq!(d.select_year("1999"), None);
    assert_eq!(d.select_year("abc"), None);
    assert_eq!(d.notice().unwrap().kind, NoticeKind::Validation);
    assert_eq!(d.current_year(), Some(2025));
}

#[test]
fn years_failure_notifies_and_stops() {
    let mut api = api();
    api.fail_years = true;
    let mut d = dashboard();
    let first = d.initialize();
    assert_eq!(d.apply(first.send(&api)), None);
    assert_eq!(api.calls(), vec!["years"]);
    assert_eq!(d.current_year(), None);
    assert!(d.state().years().is_empty());
    let notice = d.take_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Http);
    assert_eq!(
        notice.message,
        "Failed to load the available years, please refresh and try again"
    );
    assert!(!d.is_loading_rankings());
}

#[test]
fn rankings_failure_notifies_and_leaves_board_empty() {
    let mut api = api();
    api.failing_rankings = vec![2024];
    let mut d = started(&api);
    let req = d.select_year("2024");
    let before = d.board.clone();
    d.run(&api, req);

    assert_eq!(api.calls(), vec!["years", "rankings 2025", "rankings 2024"]);
    let notice = d.take_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Http);
    assert_eq!(notice.message, "Failed to load ranking data, please try again later");
    assert!(!d.is_loading_rankings());
    // No 2025 tables under the 2024 titles
    assert_eq!(d.board, before);
    assert_eq!(d.board.title(RankingSystem::Arwu), "ARWU 2024");
    assert!(d.board.sections.iter().all(|s| s.content.is_none()));
    assert_eq!(d.state().snapshot_year(), None);
    assert_eq!(d.current_year(), Some(2024));
}

#[test]
fn blank_search_hides_panel_and_sends_nothing() {
    let api = api();
    let mut d = started(&api);
    d.search.panel.show(Content::Message(Message::NoResults));
    d.search.input = "   ".into();
    assert_eq!(d.submit_search(), None);
    assert!(!d.search.panel.is_visible());
    assert_eq!(api.calls().len(), 2);
    assert!(d.notice().is_none());
}

#[test]
fn search_uses_selected_year_and_renders_sections() {
    let mut api = api();
    api.search = BTreeMap::from([(
        RankingSystem::Qs,
        SearchHits {
            year: 2025,
            data: vec![entry(3, "Stanford University", "United States", "US")],
        },
    )]);
    let mut d = started(&api);
    d.search.input = " stanford ".into();
    let req = d.submit_search();
    assert_eq!(
        req,
        Some(Request::Search {
            query: "stanford".into(),
            year: 2025
        })
    );
    assert_eq!(d.search.panel.status(), PanelStatus::Loading);
    d.run(&api, req);
    assert_eq!(d.search.panel.status(), PanelStatus::Populated);
    match d.search.panel.content().unwrap() {
        Content::Sections(sections) => {
            assert_eq!(sections.len(), 1);
            assert_eq!(sections[0].heading, "QS (2025)");
            assert_eq!(sections[0].table.column(1), vec!["Stanford University"]);
        }
        other => panic!("unexpected content: {other:?}"),
    }
}

#[test]
fn empty_search_result_shows_no_results() {
    let api = api();
    let mut d = started(&api);
    d.search.input = "zzz".into();
    let req = d.submit_search();
    d.run(&api, req);
    assert_eq!(
        d.search.panel.content().and_then(Content::as_message),
        Some(&Message::NoResults)
    );
}

#[test]
fn search_failure_keeps_panel_and_notifies() {
    let mut api = api();
    api.fail_search = true;
    let mut d = started(&api);
    d.search.input = "mit".into();
    let req = d.submit_search();
    d.run(&api, req);
    assert!(!d.search.panel.is_visible());
    assert_eq!(d.search.panel.status(), PanelStatus::Hidden);
    let notice = d.take_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Http);
    assert_eq!(notice.message, "Search failed, please try again later");
    assert!(d.notice().is_none());
}

#[test]
fn hide_search_clears_input() {
    let api = api();
    let mut d = started(&api);
    d.search.input = "zzz".into();
    let req = d.submit_search();
    d.run(&api, req);
    d.hide_search();
    assert!(d.search.input.is_empty());
    assert!(!d.search.panel.is_visible());
}

#[test]
fn compare_needs_two_names() {
    let api = api();
    let mut d = started(&api);
    d.compare.inputs[0] = "MIT".into();
    d.compare.inputs[1] = "   ".into();
    assert_eq!(d.submit_compare(), None);
    assert_eq!(
        d.take_notice().unwrap().message,
        "Please enter at least two universities to compare"
    );
    assert_eq!(api.calls().len(), 2);
}

#[test]
fn compare_count_is_clamped_and_resets_inputs() {
    let mut d = dashboard();
    assert_eq!(d.compare.inputs.len(), 2);
    d.compare.inputs[0] = "MIT".into();
    d.set_compare_count(4);
    assert_eq!(d.compare.inputs, vec![String::new(); 4]);
    d.set_compare_count(9);
    assert_eq!(d.compare.inputs.len(), 5);
    d.set_compare_count(0);
    assert_eq!(d.compare.inputs.len(), 2);
}

#[test]
fn clearing_one_compare_input_keeps_the_others() {
    let mut d = dashboard();
    d.set_compare_count(3);
    d.compare.inputs[0] = "MIT".into();
    d.compare.inputs[1] = "Stanford University".into();
    d.compare.inputs[2] = "Peking University".into();
    d.clear_compare_input(1);
    assert_eq!(d.compare.inputs, vec!["MIT", "", "Peking University"]);
    // Out of range is ignored
    d.clear_compare_input(7);
    assert_eq!(d.compare.inputs, vec!["MIT", "", "Peking University"]);
    assert_eq!(d.compare.names(), vec!["MIT", "Peking University"]);
}

#[test]
fn compare_renders_display_names_and_placeholders() {
    let mut api = api();
    let mut row = ComparisonRow::new();
    row.insert(
        RankingSystem::Arwu,
        ComparisonHit {
            rank: Some(RankValue::Text("-".into())),
            name: Some("-".into()),
        },
    );
    row.insert(
        RankingSystem::Qs,
        ComparisonHit {
            rank: Some(RankValue::Int(1)),
            name: Some("Massachusetts Institute of Technology (MIT)".into()),
        },
    );
    api.compare = Some(CompareResponse {
        results: BTreeMap::from([("mit".to_string(), row), ("nowhere".to_string(), ComparisonRow::new())]),
        year: 2025,
    });
    let mut d = started(&api);
    d.compare.inputs = vec!["mit".into(), "".into(), "nowhere".into()];
    let req = d.submit_compare();
    assert_eq!(
        req,
        Some(Request::Compare {
            universities: vec!["mit".into(), "nowhere".into()],
            year: 2025
        })
    );
    d.run(&api, req);

    let table = d.compare.panel.content().and_then(Content::as_table).unwrap();
    assert_eq!(table.headers, vec!["University", "ARWU Rank", "QS Rank", "THE Rank"]);
    assert_eq!(
        table.column(0),
        vec!["Massachusetts Institute of Technology (MIT)", "nowhere"]
    );
    assert_eq!(table.rows[0][1].text, "-");
    assert_eq!(table.rows[0][2].text, "1");
    assert_eq!(table.rows[0][3].text, "-");
    assert_eq!(table.note.as_deref(), Some("Source: 2025 ranking data"));
}

#[test]
fn empty_comparison_shows_message() {
    let api = api();
    let mut d = started(&api);
    d.compare.inputs = vec!["a".into(), "b".into()];
    let req = d.submit_compare();
    d.run(&api, req);
    assert_eq!(
        d.compare.panel.content().and_then(Content::as_message),
        Some(&Message::NoMatchingUniversities)
    );
    d.hide_compare();
    assert!(d.compare.inputs.iter().all(String::is_empty));
}

fn trend_api() -> FakeApi {
    let mut api = api();
    api.trend = Some(TrendResponse {
        university_name: "Peking University".into(),
        trend_data: BTreeMap::from([
            (
                RankingSystem::Qs,
                BTreeMap::from([
                    (2020, TrendPoint { rank: Some(23) }),
                    (2022, TrendPoint { rank: Some(12) }),
                ]),
            ),
            (
                RankingSystem::The,
                BTreeMap::from([
                    (2021, TrendPoint { rank: Some(16) }),
                    (2022, TrendPoint { rank: Some(14) }),
                ]),
            ),
        ]),
    });
    api
}

#[test]
fn trend_needs_a_name() {
    let api = trend_api();
    let mut d = started(&api);
    d.trend.input = " ".into();
    assert_eq!(d.submit_trend(), None);
    assert_eq!(d.take_notice().unwrap().message, "Please enter a university name");
}

#[test]
fn trend_builds_year_union_with_gaps() {
    let api = trend_api();
    let mut d = started(&api);
    d.trend.input = "Peking".into();
    let req = d.submit_trend();
    d.run(&api, req);

    let Some(Content::Trend { chart, table }) = d.trend.panel.content() else {
        panic!("trend panel not populated");
    };
    assert_eq!(chart.title, "Peking University ranking trend");
    assert_eq!(chart.years, vec![2020, 2021, 2022]);
    assert_eq!(chart.lines.len(), 2);
    assert_eq!(
        chart.line(RankingSystem::Qs).unwrap().values,
        vec![Some(23), None, Some(12)]
    );
    assert_eq!(
        chart.line(RankingSystem::The).unwrap().values,
        vec![None, Some(16), Some(14)]
    );
    assert!(chart.line(RankingSystem::Arwu).is_none());
    assert!(chart.options.reverse_y);
    assert_eq!(chart.options.y_min, 0.0);
    assert_eq!(table.headers, vec!["Year", "QS", "THE"]);
    assert_eq!(table.rows[1][1].text, "-");
    assert_eq!(d.trend.canvas.active().map(String::as_str), Some("Peking University ranking trend"));
}

#[test]
fn rerendering_trend_keeps_one_live_chart() {
    let api = trend_api();
    let backend = CountingBackend::default();
    let live = backend.live.clone();
    let created = backend.created.clone();
    let mut d = Dashboard::new(Settings::default(), backend);
    d.trend.input = "Peking".into();
    for _ in 0..3 {
        let req = d.submit_trend();
        d.run(&api, req);
        assert_eq!(live.get(), 1);
    }
    assert_eq!(created.get(), 3);

    d.hide_trend();
    assert_eq!(live.get(), 0);
    assert!(!d.trend.canvas.is_active());
    assert!(!d.trend.panel.is_visible());
}

#[test]
fn chart_failure_hides_panel_and_notifies() {
    let api = trend_api();
    let backend = CountingBackend {
        fail: true,
        ..Default::default()
    };
    let mut d = Dashboard::new(Settings::default(), backend);
    d.trend.input = "Peking".into();
    let req = d.submit_trend();
    d.run(&api, req);
    assert!(!d.trend.panel.is_visible());
    assert_eq!(d.notice().unwrap().kind, NoticeKind::Internal);
}

#[test]
fn trend_not_found_uses_server_message() {
    let api = api();
    let mut d = started(&api);
    d.trend.input = "Nowhere".into();
    let req = d.submit_trend();
    d.run(&api, req);
    let notice = d.take_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Http);
    assert_eq!(notice.message, "University not found");
    assert!(!d.trend.panel.is_visible());
}

#[test]
fn last_result_to_arrive_wins() {
    let mut api = api();
    api.search = BTreeMap::from([(
        RankingSystem::The,
        SearchHits {
            year: 2025,
            data: vec![entry(9, "Later", "X", "xx")],
        },
    )]);
    let mut d = started(&api);
    d.search.input = "first".into();
    let _first = d.submit_search().unwrap();
    d.search.input = "second".into();
    let second = d.submit_search().unwrap();
    assert_eq!(d.search.panel.in_flight(), 2);

    let second_outcome = second.send(&api);
    let first_outcome = Outcome::Search(Ok(SearchResultSet::new()));
    d.apply(second_outcome);
    assert_eq!(d.search.panel.status(), PanelStatus::Loading);
    d.apply(first_outcome);
    assert_eq!(
        d.search.panel.content().and_then(Content::as_message),
        Some(&Message::NoResults)
    );
    assert_eq!(d.search.panel.status(), PanelStatus::Populated);
}

#[test]
fn every_year_updates_all_titles() {
    let api = api();
    let mut d = started(&api);
    for year in [2024, 2023, 2025] {
        let req = d.select_year(&year.to_string());
        d.run(&api, req);
        for system in RankingSystem::ALL {
            assert_eq!(d.board.title(system), format!("{system} {year}"));
            assert!(d.board.section(system).content.is_some());
        }
    }
}

#[test]
fn trend_axis_for_disjoint_systems() {
    let mut api = api();
    api.trend = Some(TrendResponse {
        university_name: "U".into(),
        trend_data: BTreeMap::from([
            (RankingSystem::Arwu, BTreeMap::from([(2020, TrendPoint { rank: Some(1) })])),
            (RankingSystem::Qs, BTreeMap::from([(2021, TrendPoint { rank: Some(5) })])),
        ]),
    });
    let mut d = dashboard();
    d.trend.input = "U".into();
    let req = d.submit_trend();
    d.run(&api, req);
    let Some(Content::Trend { chart, .. }) = d.trend.panel.content() else {
        panic!("trend panel not populated");
    };
    assert_eq!(chart.years, vec![2020, 2021]);
    assert_eq!(chart.line(RankingSystem::Arwu).unwrap().values, vec![Some(1), None]);
    assert_eq!(chart.line(RankingSystem::Qs).unwrap().values, vec![None, Some(5)]);
}

#[test]
fn trend_can_be_shown_again_after_hide() {
    let api = trend_api();
    let backend = CountingBackend::default();
    let live = backend.live.clone();
    let mut d = Dashboard::new(Settings::default(), backend);
    d.trend.input = "Peking".into();
    let req = d.submit_trend();
    d.run(&api, req);
    d.hide_trend();
    d.hide_trend();
    assert_eq!(live.get(), 0);

    let req = d.submit_trend();
    d.run(&api, req);
    assert_eq!(live.get(), 1);
    assert!(d.trend.panel.is_visible());

    drop(d);
    assert_eq!(live.get(), 0);
}
