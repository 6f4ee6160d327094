//! unirank
//!
//! Client-side core of a university-ranking dashboard. Talks to a ranking backend
//! serving ARWU, QS and THE tables, and turns its JSON into display-ready tables,
//! messages and trend charts. Pairs with the `unirank` CLI and the `unirank-gui`
//! desktop front end.
//!
//! ### Features
//! - Browse the rankings of any published year, three systems side by side
//! - Keyword search, multi-university comparison, per-university trend charts
//! - Export a year's rankings as CSV or JSON
//! - Render trend charts to SVG/PNG
//!
//! ### Example
//! ```no_run
//! use unirank::{Client, Dashboard, Settings};
//! use unirank::viz::FileChartBackend;
//!
//! let settings = Settings::load(None)?;
//! let api = Client::new(&settings);
//! let backend = FileChartBackend { path: Some("trend.svg".into()), width: 1000, height: 600 };
//! let mut dash = Dashboard::new(settings, backend);
//!
//! let first = dash.initialize();
//! dash.run(&api, Some(first));
//! dash.trend.input = "Harvard University".into();
//! let req = dash.submit_trend();
//! dash.run(&api, req);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod render;
pub mod state;
pub mod storage;
pub mod trend;
pub mod view;
pub mod viz;

pub use api::{Client, RankingApi};
pub use config::Settings;
pub use dashboard::{Dashboard, Outcome, Request};
pub use error::{ApiError, Notice, NoticeKind};
pub use models::{RankingSystem, RankingYearSnapshot};
