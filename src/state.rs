//! Application state: the selected year and the snapshot that belongs to it.

use crate::models::RankingYearSnapshot;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    years: Vec<i32>,
    current_year: Option<i32>,
    snapshot: Option<(i32, RankingYearSnapshot)>,
}

impl AppState {
    /// Years offered by the backend, newest first, exactly as received.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn current_year(&self) -> Option<i32> {
        self.current_year
    }

    pub fn is_initialized(&self) -> bool {
        self.current_year.is_some()
    }

    /// Install the year list and select its first (newest) entry.
    ///
    /// Returns the selected year, or `None` for an empty list.
    pub fn set_years(&mut self, years: Vec<i32>) -> Option<i32> {
        self.years = years;
        self.snapshot = None;
        self.current_year = self.years.first().copied();
        self.current_year
    }

    /// Switch to `year`. Drops the snapshot of the previous year.
    ///
    /// Returns `false` (and changes nothing) when `year` is not an available year.
    pub fn select_year(&mut self, year: i32) -> bool {
        if !self.years.contains(&year) {
            return false;
        }
        if self.current_year != Some(year) {
            self.snapshot = None;
        }
        self.current_year = Some(year);
        true
    }

    /// Store a snapshot fetched for `year`. Snapshots for any other year than the
    /// selected one are stale and are dropped; returns whether it was kept.
    pub fn store_snapshot(&mut self, year: i32, snapshot: RankingYearSnapshot) -> bool {
        if self.current_year != Some(year) {
            return false;
        }
        self.snapshot = Some((year, snapshot));
        true
    }

    pub fn snapshot(&self) -> Option<&RankingYearSnapshot> {
        self.snapshot.as_ref().map(|(_, s)| s)
    }

    pub fn snapshot_year(&self) -> Option<i32> {
        self.snapshot.as_ref().map(|(y, _)| *y)
    }
}
