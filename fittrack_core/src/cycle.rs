//! Menstrual cycle engine.
//!
//! Status, next-date prediction and calendar classification are all derived
//! from the single most recent period start (`last_period_start`) plus the
//! configured cycle and period lengths. History is kept newest first and
//! `last_period_start` always mirrors `history[0]`.

use crate::store::{load_record, save_record, KeyValueStore, CYCLE_DATA_KEY};
use crate::{
    dates, CycleData, CycleState, CycleStatus, DayClass, Error, PeriodRecord, PredictionMode,
    Result, STANDARD_CYCLE_LENGTH, STANDARD_PERIOD_LENGTH,
};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A next period this many days away (or fewer) counts as approaching
const APPROACHING_WINDOW_DAYS: i64 = 5;

/// Longest cycle accepted from settings
pub const MAX_CYCLE_LENGTH: u32 = 365;

/// User-editable cycle settings, replaced wholesale on save
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSettings {
    pub cycle_length: u32,
    pub period_length: u32,
    pub notifications_enabled: bool,
    pub prediction_mode: PredictionMode,
}

impl CycleSettings {
    /// Switch prediction mode. Standard mode forces the 28/5 lengths.
    pub fn set_mode(&mut self, mode: PredictionMode) {
        self.prediction_mode = mode;
        if mode == PredictionMode::Standard {
            self.cycle_length = STANDARD_CYCLE_LENGTH;
            self.period_length = STANDARD_PERIOD_LENGTH;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycle_length == 0 || self.period_length == 0 {
            return Err(Error::Validation(
                "cycle and period lengths must be positive".into(),
            ));
        }
        if self.cycle_length > MAX_CYCLE_LENGTH {
            return Err(Error::Validation(format!(
                "cycle length {} exceeds {} days",
                self.cycle_length, MAX_CYCLE_LENGTH
            )));
        }
        if self.period_length > self.cycle_length {
            return Err(Error::Validation(format!(
                "period length {} exceeds cycle length {}",
                self.period_length, self.cycle_length
            )));
        }
        Ok(())
    }
}

/// One month of calendar classifications, laid out Monday first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty slots before the 1st in a Monday-based week row
    pub leading_blanks: u32,
    pub days: Vec<(NaiveDate, DayClass)>,
}

impl CycleStatus {
    pub fn unknown() -> Self {
        Self {
            status: CycleState::Unknown,
            days_until_next: 0,
            next_date: None,
            is_period_now: false,
        }
    }

    /// True once the predicted start has passed
    pub fn is_overdue(&self) -> bool {
        self.next_date.is_some() && self.days_until_next < 0
    }

    /// Countdown line shown next to the status
    pub fn alert_message(&self) -> String {
        match self.days_until_next {
            0 => "Expected today!".to_string(),
            days if days < 0 => format!("{} days late!", days.abs()),
            days => format!("{} days left!", days),
        }
    }
}

impl CycleData {
    /// Load cycle data, falling back to the standard defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        match load_record(store, CYCLE_DATA_KEY)? {
            Some(data) => Ok(data),
            None => {
                tracing::info!("No cycle data found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_record(store, CYCLE_DATA_KEY, self)
    }

    /// Load, modify and save back
    pub fn update<S, F>(store: &mut S, f: F) -> Result<Self>
    where
        S: KeyValueStore + ?Sized,
        F: FnOnce(&mut CycleData) -> Result<()>,
    {
        let mut data = Self::load(store)?;
        f(&mut data)?;
        data.save(store)?;
        Ok(data)
    }

    /// Record a period start. Re-logging a known date only replaces its note,
    /// and only when `note` is non-empty.
    pub fn record_period_start(&mut self, date: NaiveDate, note: &str) {
        match self.history.iter_mut().find(|r| r.start_date == date) {
            Some(existing) => {
                if !note.is_empty() {
                    existing.note = note.to_string();
                }
            }
            None => {
                self.history.push(PeriodRecord {
                    start_date: date,
                    note: note.to_string(),
                });
                self.history.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            }
        }

        self.last_period_start = self.history.first().map(|r| r.start_date);
        tracing::debug!(
            "Logged period start {}, most recent is {:?}",
            date,
            self.last_period_start
        );
    }

    /// Overwrite the note of the record starting on `date`, empty included.
    /// Returns false when no such record exists.
    pub fn set_note(&mut self, date: NaiveDate, note: &str) -> bool {
        match self.history.iter_mut().find(|r| r.start_date == date) {
            Some(record) => {
                record.note = note.to_string();
                true
            }
            None => false,
        }
    }

    pub fn settings(&self) -> CycleSettings {
        CycleSettings {
            cycle_length: self.cycle_length,
            period_length: self.period_length,
            notifications_enabled: self.notifications_enabled,
            prediction_mode: self.prediction_mode,
        }
    }

    pub fn apply_settings(&mut self, settings: CycleSettings) {
        self.cycle_length = settings.cycle_length;
        self.period_length = settings.period_length;
        self.notifications_enabled = settings.notifications_enabled;
        self.prediction_mode = settings.prediction_mode;
    }

    /// Status as seen on `today`
    pub fn status_on(&self, today: NaiveDate) -> CycleStatus {
        let Some(last) = self.last_period_start else {
            return CycleStatus::unknown();
        };

        let (Some(next), Some(period_end)) = (
            last.checked_add_days(Days::new(u64::from(self.cycle_length))),
            last.checked_add_days(Days::new(u64::from(self.period_length))),
        ) else {
            tracing::warn!(
                "Cycle lengths {}/{} overflow the calendar",
                self.cycle_length,
                self.period_length
            );
            return CycleStatus::unknown();
        };
        let days_until_next = (next - today).num_days();
        let is_period_now = today >= last && today < period_end;

        let status = if is_period_now {
            CycleState::Active
        } else if (0..=APPROACHING_WINDOW_DAYS).contains(&days_until_next) || days_until_next < 0 {
            CycleState::Approaching
        } else {
            CycleState::Safe
        };

        CycleStatus {
            status,
            days_until_next,
            next_date: Some(next),
            is_period_now,
        }
    }

    /// Calendar overlay class of `date`: a logged period day, a predicted
    /// one, today, or nothing
    pub fn classify_day(&self, date: NaiveDate, today: NaiveDate) -> DayClass {
        let period_span = i64::from(self.period_length);

        let in_history = self.history.iter().any(|record| {
            let offset = (date - record.start_date).num_days();
            (0..period_span).contains(&offset)
        });
        if in_history {
            return DayClass::History;
        }

        if let Some(last) = self.last_period_start {
            if date > last && self.cycle_length > 0 {
                let day_in_cycle = (date - last).num_days() % i64::from(self.cycle_length);
                if (0..period_span).contains(&day_in_cycle) {
                    return DayClass::Predicted;
                }
            }
        }

        if date == today {
            DayClass::Today
        } else {
            DayClass::Neutral
        }
    }

    /// Classify every day of a month
    pub fn month_calendar(&self, year: i32, month: u32, today: NaiveDate) -> Result<MonthCalendar> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::Validation(format!("Invalid month {}-{:02}", year, month)))?;

        let leading_blanks = (first.weekday().num_days_from_sunday() + 6) % 7;
        let days = (0..dates::days_in_month(year, month))
            .map(|i| {
                let day = first + Days::new(u64::from(i));
                (day, self.classify_day(day, today))
            })
            .collect();

        Ok(MonthCalendar {
            year,
            month,
            leading_blanks,
            days,
        })
    }
}

/// Log a period start and persist
pub fn log_period_start<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    note: &str,
) -> Result<CycleData> {
    CycleData::update(store, |data| {
        data.record_period_start(date, note);
        Ok(())
    })
}

/// Replace the note of an existing record. Unknown dates leave the data
/// unchanged; it is persisted either way.
pub fn update_period_note<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    note: &str,
) -> Result<CycleData> {
    CycleData::update(store, |data| {
        if !data.set_note(date, note) {
            tracing::debug!("No period record on {}, note not changed", date);
        }
        Ok(())
    })
}

pub fn calculate_cycle_status<S: KeyValueStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> Result<CycleStatus> {
    Ok(CycleData::load(store)?.status_on(today))
}

pub fn classify_calendar_day<S: KeyValueStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<DayClass> {
    Ok(CycleData::load(store)?.classify_day(date, today))
}

/// Validate and replace the cycle settings wholesale
pub fn update_settings<S: KeyValueStore + ?Sized>(
    store: &mut S,
    settings: CycleSettings,
) -> Result<CycleData> {
    settings.validate()?;
    CycleData::update(store, |data| {
        data.apply_settings(settings);
        tracing::info!(
            "Cycle settings updated: {}/{} days, {:?} mode",
            settings.cycle_length,
            settings.period_length,
            settings.prediction_mode
        );
        Ok(())
    })
}
