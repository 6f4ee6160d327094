use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Glyph shown wherever a value is missing.
pub const PLACEHOLDER: &str = "-";

/// One of the three ranking publishers served by the backend.
///
/// Ordering follows the column order used throughout the dashboard (ARWU, QS, THE),
/// which is also the key order of the backend's JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankingSystem {
    #[serde(rename = "ARWU")]
    Arwu,
    #[serde(rename = "QS")]
    Qs,
    #[serde(rename = "THE")]
    The,
}

impl RankingSystem {
    pub const ALL: [RankingSystem; 3] = [RankingSystem::Arwu, RankingSystem::Qs, RankingSystem::The];

    pub fn as_str(self) -> &'static str {
        match self {
            RankingSystem::Arwu => "ARWU",
            RankingSystem::Qs => "QS",
            RankingSystem::The => "THE",
        }
    }
}

impl fmt::Display for RankingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARWU" => Ok(RankingSystem::Arwu),
            "QS" => Ok(RankingSystem::Qs),
            "THE" => Ok(RankingSystem::The),
            other => Err(format!("unknown ranking system: {other}")),
        }
    }
}

/// A world rank as published: either a number (`1`, `12.0`) or free text (`"151-200"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RankValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankValue::Int(n) => write!(f, "{n}"),
            // pandas hands integer columns with gaps back as floats (1.0, 2.0, …)
            RankValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{}", *x as i64),
            RankValue::Float(x) => write!(f, "{x}"),
            RankValue::Text(s) if s.trim().is_empty() => f.write_str(PLACEHOLDER),
            RankValue::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// One row of a ranking table.
///
/// Every field is optional: missing values are rendered as [`PLACEHOLDER`] instead
/// of rejecting the row. The backend serves the column names of its CSV sources;
/// the camelCase spellings are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(rename = "World_Rank", alias = "worldRank", default)]
    pub world_rank: Option<RankValue>,
    #[serde(rename = "University", alias = "university", default)]
    pub university: Option<String>,
    #[serde(rename = "Country", alias = "country", default)]
    pub country: Option<String>,
    #[serde(rename = "country_code", alias = "countryCode", default)]
    pub country_code: Option<String>,
}

impl RankingEntry {
    pub fn rank_text(&self) -> String {
        display_or_placeholder(self.world_rank.as_ref().map(|r| r.to_string()))
    }

    pub fn university_text(&self) -> String {
        display_or_placeholder(self.university.clone())
    }

    pub fn country_text(&self) -> String {
        display_or_placeholder(self.country.clone())
    }

    /// Lower-cased country code, `None` when absent or blank.
    pub fn flag_code(&self) -> Option<String> {
        self.country_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

fn display_or_placeholder(v: Option<String>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// All rankings for a single year, as returned by `/api/rankings/{year}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingYearSnapshot {
    #[serde(rename = "ARWU", default)]
    pub arwu: Option<Vec<RankingEntry>>,
    #[serde(rename = "QS", default)]
    pub qs: Option<Vec<RankingEntry>>,
    #[serde(rename = "THE", default)]
    pub the: Option<Vec<RankingEntry>>,
}

impl RankingYearSnapshot {
    pub fn entries(&self, system: RankingSystem) -> Option<&[RankingEntry]> {
        match system {
            RankingSystem::Arwu => self.arwu.as_deref(),
            RankingSystem::Qs => self.qs.as_deref(),
            RankingSystem::The => self.the.as_deref(),
        }
    }

    /// `true` when the system has no rows (null or empty list).
    pub fn is_absent(&self, system: RankingSystem) -> bool {
        self.entries(system).is_none_or(|e| e.is_empty())
    }
}

/// Matches for one ranking system in a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    pub year: i32,
    #[serde(default)]
    pub data: Vec<RankingEntry>,
}

/// Response of `/api/search`: system -> matches. Systems without matches are omitted.
pub type SearchResultSet = BTreeMap<RankingSystem, SearchHits>;

/// First match of a compared name within one ranking system.
///
/// The backend reports "not found" as `{"rank": "-", "name": "-"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonHit {
    #[serde(default)]
    pub rank: Option<RankValue>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ComparisonHit {
    /// Resolved name, `None` when missing or the placeholder.
    pub fn found_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != PLACEHOLDER)
    }

    pub fn rank_text(&self) -> String {
        display_or_placeholder(self.rank.as_ref().map(|r| r.to_string()))
    }
}

/// Per-system hits for one compared name.
pub type ComparisonRow = BTreeMap<RankingSystem, ComparisonHit>;

/// Mapping from the user-typed query string to its per-system hits.
pub type ComparisonResultSet = BTreeMap<String, ComparisonRow>;

/// Response of `/api/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub results: ComparisonResultSet,
    pub year: i32,
}

/// Rank of a university in one system and year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(default, deserialize_with = "de_trend_rank")]
    pub rank: Option<u32>,
}

/// system -> year -> rank. JSON object keys carry the year as a decimal string.
pub type TrendSeries = BTreeMap<RankingSystem, BTreeMap<i32, TrendPoint>>;

/// Response of `/api/trend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResponse {
    pub university_name: String,
    #[serde(default)]
    pub trend_data: TrendSeries,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Serde helper: accept a trend rank as a number, a numeric string, or a range
/// string such as `"151-200"` (midpoint). Anything else becomes `None`.
fn de_trend_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<RankValue>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(normalize_rank))
}

/// Collapse a published rank into a single plottable number.
///
/// Range ranks (`"151-200"`) map to their integer midpoint.
pub fn normalize_rank(value: &RankValue) -> Option<u32> {
    match value {
        RankValue::Int(n) => u32::try_from(*n).ok(),
        RankValue::Float(x) if x.is_finite() && *x >= 0.0 => Some(*x as u32),
        RankValue::Float(_) => None,
        RankValue::Text(s) => {
            let s = s.trim();
            match s.split_once('-') {
                Some((a, b)) => {
                    let start = a.trim().parse::<u32>().ok()?;
                    let end = b.trim().parse::<u32>().ok()?;
                    Some(start.checked_add(end)? / 2)
                }
                None => s.parse::<u32>().ok(),
            }
        }
    }
}
