use crate::models::{RankingSystem, RankingYearSnapshot};
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported ranking row, flattened across systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub year: i32,
    pub system: RankingSystem,
    pub rank: String,
    pub university: String,
    pub country: String,
    pub country_code: String,
}

/// Flatten a snapshot into rows, systems in column order. Absent lists contribute nothing.
pub fn export_rows(snapshot: &RankingYearSnapshot, year: i32) -> Vec<ExportRow> {
    RankingSystem::ALL
        .iter()
        .flat_map(|&system| {
            snapshot
                .entries(system)
                .unwrap_or_default()
                .iter()
                .map(move |e| ExportRow {
                    year,
                    system,
                    rank: e.rank_text(),
                    university: e.university_text(),
                    country: e.country_text(),
                    country_code: e.flag_code().unwrap_or_default(),
                })
        })
        .collect()
}

/// Save rows as CSV with header.
pub fn save_csv<P: AsRef<Path>>(rows: &[ExportRow], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("year", "system", "rank", "university", "country", "country_code"))?;
    for r in rows {
        wtr.serialize((
            r.year,
            r.system.as_str(),
            &r.rank,
            &r.university,
            &r.country,
            &r.country_code,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(rows: &[ExportRow], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save by extension: `.json` is JSON, anything else CSV.
pub fn save<P: AsRef<Path>>(rows: &[ExportRow], path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => save_json(rows, path),
        _ => save_csv(rows, path),
    }
}
