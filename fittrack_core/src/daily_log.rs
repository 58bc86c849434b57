//! Per-date meal, workout and water log.
//!
//! Every mutation loads the full date map, lazily creates the day, applies
//! the change, persists the map and hands back the day's record.

use crate::store::{load_record, save_record, KeyValueStore, DAILY_LOGS_KEY};
use crate::{DailyLog, DailyLogs, MealItem, Result, WorkoutSession};
use chrono::NaiveDate;

impl DailyLogs {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(load_record(store, DAILY_LOGS_KEY)?.unwrap_or_default())
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_record(store, DAILY_LOGS_KEY, self)
    }

    /// The stored log for `date`, or an empty one
    pub fn day(&self, date: NaiveDate) -> DailyLog {
        self.days
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyLog::empty(date))
    }

    /// Mutable access, creating a zero log first if needed
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DailyLog {
        self.days
            .entry(date)
            .or_insert_with(|| DailyLog::empty(date))
    }
}

/// Apply `f` to the (lazily created) day and persist
fn modify_day<S, F>(store: &mut S, date: NaiveDate, f: F) -> Result<DailyLog>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&mut DailyLog),
{
    let mut logs = DailyLogs::load(store)?;
    let day = logs.day_mut(date);
    f(day);
    let updated = day.clone();
    logs.save(store)?;
    Ok(updated)
}

/// Apply `f` only if the day already exists; otherwise nothing is written
fn modify_existing_day<S, F>(store: &mut S, date: NaiveDate, f: F) -> Result<DailyLog>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&mut DailyLog),
{
    let mut logs = DailyLogs::load(store)?;
    let Some(day) = logs.days.get_mut(&date) else {
        tracing::debug!("No log for {}, nothing to update", date);
        return Ok(DailyLog::empty(date));
    };
    f(day);
    let updated = day.clone();
    logs.save(store)?;
    Ok(updated)
}

pub fn day<S: KeyValueStore + ?Sized>(store: &S, date: NaiveDate) -> Result<DailyLog> {
    Ok(DailyLogs::load(store)?.day(date))
}

pub fn add_meal<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    meal: MealItem,
) -> Result<DailyLog> {
    tracing::debug!("Adding meal {:?} to {}", meal.name, date);
    modify_day(store, date, |day| day.meals.push(meal))
}

pub fn remove_meal<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    meal_id: &str,
) -> Result<DailyLog> {
    modify_existing_day(store, date, |day| day.meals.retain(|m| m.id != meal_id))
}

/// Add `delta_ml` (possibly negative) to the day's water, never below zero
pub fn update_water<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    delta_ml: i64,
) -> Result<DailyLog> {
    modify_day(store, date, |day| {
        let updated = (i64::from(day.water_intake) + delta_ml).clamp(0, i64::from(u32::MAX));
        day.water_intake = updated as u32;
    })
}

pub fn add_workout<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    session: WorkoutSession,
) -> Result<DailyLog> {
    tracing::debug!("Adding workout {:?} to {}", session.name, date);
    modify_day(store, date, |day| day.workouts.push(session))
}

/// Replace the session with the same id; other sessions are untouched
pub fn update_workout<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    session: WorkoutSession,
) -> Result<DailyLog> {
    modify_existing_day(store, date, |day| {
        if let Some(existing) = day.workouts.iter_mut().find(|w| w.id == session.id) {
            *existing = session;
        }
    })
}
