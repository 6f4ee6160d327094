//! Synchronous client for the **ranking backend** REST API.
//!
//! Five read-only endpoints are consumed:
//!
//! | Endpoint | Returns |
//! |---|---|
//! | `/api/available_years` | years, newest first |
//! | `/api/rankings/{year}` | [`RankingYearSnapshot`] |
//! | `/api/search?query=&year=` | [`SearchResultSet`] |
//! | `/api/compare?universities[]=…&year=` | [`CompareResponse`] |
//! | `/api/trend?university=` | [`TrendResponse`] |
//!
//! ### Notes
//! - Non-2xx responses carry `{"error": "…"}`; the message is kept in [`ApiError::Status`].
//! - Requests are never retried. A failure is reported once and the caller decides.
//! - There is no total timeout unless `Settings::timeout_secs` sets one.
//!
//! Typical usage:
//! ```no_run
//! # use unirank::{Client, RankingApi};
//! let client = Client::default();
//! let years = client.available_years()?;
//! let snapshot = client.rankings(years[0])?;
//! # Ok::<(), unirank::ApiError>(())
//! ```
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::{
    CompareResponse, ErrorBody, RankingYearSnapshot, SearchResultSet, TrendResponse,
};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The backend operations the controllers depend on.
///
/// [`Client`] is the HTTP implementation; tests substitute an in-process fake.
pub trait RankingApi {
    fn available_years(&self) -> Result<Vec<i32>, ApiError>;
    fn rankings(&self, year: i32) -> Result<RankingYearSnapshot, ApiError>;
    fn search(&self, query: &str, year: i32) -> Result<SearchResultSet, ApiError>;
    fn compare(&self, universities: &[String], year: i32) -> Result<CompareResponse, ApiError>;
    fn trend(&self, university: &str) -> Result<TrendResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

// Unreserved characters stay readable in query values.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn enc(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, QUERY).to_string()
}

impl Client {
    pub fn new(settings: &Settings) -> Self {
        let mut builder = HttpClient::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .redirect(Policy::limited(5))
            .user_agent(concat!("unirank/", env!("CARGO_PKG_VERSION")));
        // reqwest's blocking client defaults to 30s; `None` here means no total timeout.
        builder = builder.timeout(settings.timeout_secs.map(Duration::from_secs));
        let http = builder.build().expect("reqwest client build");
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn years_url(&self) -> String {
        format!("{}/api/available_years", self.base_url)
    }

    pub fn rankings_url(&self, year: i32) -> String {
        format!("{}/api/rankings/{}", self.base_url, year)
    }

    pub fn search_url(&self, query: &str, year: i32) -> String {
        format!(
            "{}/api/search?query={}&year={}",
            self.base_url,
            enc(query),
            year
        )
    }

    pub fn compare_url(&self, universities: &[String], year: i32) -> String {
        let list = universities
            .iter()
            .map(|u| format!("universities[]={}", enc(u)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/api/compare?{}&year={}", self.base_url, list, year)
    }

    pub fn trend_url(&self, university: &str) -> String {
        format!("{}/api/trend?university={}", self.base_url, enc(university))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?;
        decode_response(status, &body)
    }
}

/// Turn a raw response into either the expected payload or an [`ApiError`].
///
/// Non-2xx statuses never attempt to decode `T`; their body is only searched for
/// an `error` message.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|b| b.error.trim().to_string())
            .filter(|m| !m.is_empty());
        return Err(ApiError::Status { status, message });
    }
    Ok(serde_json::from_slice(body)?)
}

impl RankingApi for Client {
    fn available_years(&self) -> Result<Vec<i32>, ApiError> {
        self.get_json(&self.years_url())
    }

    fn rankings(&self, year: i32) -> Result<RankingYearSnapshot, ApiError> {
        self.get_json(&self.rankings_url(year))
    }

    fn search(&self, query: &str, year: i32) -> Result<SearchResultSet, ApiError> {
        self.get_json(&self.search_url(query, year))
    }

    fn compare(&self, universities: &[String], year: i32) -> Result<CompareResponse, ApiError> {
        self.get_json(&self.compare_url(universities, year))
    }

    fn trend(&self, university: &str) -> Result<TrendResponse, ApiError> {
        self.get_json(&self.trend_url(university))
    }
}
