//! CSV export of weight history and daily summaries.
//!
//! Files are overwritten, then flushed and synced before returning.

use crate::{DailyLogs, Result, UserProfile};
use std::fs::File;
use std::path::Path;

#[derive(Debug, serde::Serialize)]
struct WeightRow {
    date: String,
    weight: f64,
}

#[derive(Debug, serde::Serialize)]
struct DaySummaryRow {
    date: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    water_ml: u32,
    workouts: usize,
    completed_workouts: usize,
}

fn write_rows<T, I>(path: &Path, rows: I) -> Result<usize>
where
    T: serde::Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;
    Ok(count)
}

/// Write `date,weight` rows in date order
pub fn export_weight_history(profile: &UserProfile, path: &Path) -> Result<usize> {
    let count = write_rows(
        path,
        profile.weight_history.iter().map(|w| WeightRow {
            date: w.date.to_string(),
            weight: w.weight,
        }),
    )?;
    tracing::info!("Exported {} weight records to {:?}", count, path);
    Ok(count)
}

/// Write one summary row per logged day in date order
pub fn export_daily_summaries(logs: &DailyLogs, path: &Path) -> Result<usize> {
    let count = write_rows(
        path,
        logs.days.values().map(|day| {
            let totals = day.totals();
            DaySummaryRow {
                date: day.date.to_string(),
                calories: totals.calories,
                protein: totals.protein,
                carbs: totals.carbs,
                fat: totals.fat,
                water_ml: day.water_intake,
                workouts: day.workouts.len(),
                completed_workouts: day.workouts.iter().filter(|w| w.completed).count(),
            }
        }),
    )?;
    tracing::info!("Exported {} daily summaries to {:?}", count, path);
    Ok(count)
}
