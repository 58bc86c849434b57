//! Core domain types for FitTrack.
//!
//! This module defines the records persisted by the store and the values
//! derived from them:
//! - Meals, macros and the weekly nutrition plan
//! - Exercises and workout sessions
//! - Daily logs
//! - Profile and weight history
//! - Cycle data, cycle status and calendar classification
//! - Aggregate scores
//!
//! Persisted records use camelCase field names, `YYYY-MM-DD` dates and
//! epoch-millisecond timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;
use uuid::Uuid;

// ============================================================================
// Nutrition Types
// ============================================================================

/// Missing or `null` numbers read as zero (older records were written by
/// editors that stored blank inputs as `null`)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Nutritional content of a meal (kcal, grams, milligrams for minerals)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    /// g
    #[serde(default, deserialize_with = "null_as_default")]
    pub protein: f64,
    /// g
    #[serde(default, deserialize_with = "null_as_default")]
    pub carbs: f64,
    /// g
    #[serde(default, deserialize_with = "null_as_default")]
    pub fat: f64,
    /// g
    #[serde(default, deserialize_with = "null_as_default")]
    pub fiber: f64,
    /// mg
    #[serde(default, deserialize_with = "null_as_default")]
    pub potassium: f64,
    /// mg
    #[serde(default, deserialize_with = "null_as_default")]
    pub sodium: f64,
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
            potassium: self.potassium + rhs.potassium,
            sodium: self.sodium + rhs.sodium,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::default(), Add::add)
    }
}

impl<'a> Sum<&'a Macros> for Macros {
    fn sum<I: Iterator<Item = &'a Macros>>(iter: I) -> Macros {
        iter.copied().sum()
    }
}

/// A logged (or planned) meal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub id: String,
    pub name: String,
    pub macros: Macros,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl MealItem {
    pub fn new(name: impl Into<String>, macros: Macros, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            macros,
            timestamp: now,
        }
    }
}

/// Meal template applied to every day of a week
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPlan {
    pub meals: Vec<MealItem>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Workout Types
// ============================================================================

/// Exercise discipline, also the tab a session is created from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Cardio,
}

/// Variant-specific exercise fields, tagged by `type`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExerciseKind {
    Strength {
        #[serde(default, deserialize_with = "null_as_default")]
        sets: u32,
        /// Free text such as "10-12" or "Failure"
        #[serde(default, deserialize_with = "null_as_default")]
        reps: String,
        /// kg
        #[serde(default, deserialize_with = "null_as_default")]
        weight: f64,
    },
    Cardio {
        /// km
        #[serde(default, deserialize_with = "null_as_default")]
        distance: f64,
        /// minutes
        #[serde(default, deserialize_with = "null_as_default")]
        duration: f64,
        /// Free text such as "Zone 2" or "Incline 12"
        #[serde(default, deserialize_with = "null_as_default")]
        intensity: String,
    },
}

impl ExerciseKind {
    pub fn exercise_type(&self) -> ExerciseType {
        match self {
            ExerciseKind::Strength { .. } => ExerciseType::Strength,
            ExerciseKind::Cardio { .. } => ExerciseType::Cardio,
        }
    }
}

/// A single exercise inside a workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ExerciseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Session classification used by the stats engine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Hybrid,
}

impl WorkoutType {
    pub fn trains_cardio(self) -> bool {
        matches!(self, WorkoutType::Cardio | WorkoutType::Hybrid)
    }

    pub fn trains_strength(self) -> bool {
        matches!(self, WorkoutType::Strength | WorkoutType::Hybrid)
    }
}

impl From<ExerciseType> for WorkoutType {
    fn from(kind: ExerciseType) -> Self {
        match kind {
            ExerciseType::Strength => WorkoutType::Strength,
            ExerciseType::Cardio => WorkoutType::Cardio,
        }
    }
}

/// A workout session owned by a daily log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub completed: bool,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    #[serde(default)]
    pub duration_minutes: u32,
}

// ============================================================================
// Daily Log Types
// ============================================================================

/// Everything logged for one calendar date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub meals: Vec<MealItem>,
    #[serde(default)]
    pub workouts: Vec<WorkoutSession>,
    /// ml
    #[serde(default)]
    pub water_intake: u32,
}

impl DailyLog {
    /// A zero-valued log for `date`
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Vec::new(),
            workouts: Vec::new(),
            water_intake: 0,
        }
    }
}

/// All daily logs keyed by date
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct DailyLogs {
    pub days: BTreeMap<NaiveDate, DailyLog>,
}

// ============================================================================
// Profile Types
// ============================================================================

/// One body-weight measurement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightRecord {
    pub date: NaiveDate,
    pub weight: f64,
}

/// The single user's profile and goals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "StoredProfile")]
pub struct UserProfile {
    pub name: String,
    /// cm
    pub height: f64,
    pub start_weight: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub daily_calorie_goal: f64,
    /// ml
    pub daily_water_goal: f64,
    pub weight_history: Vec<WeightRecord>,
}

pub const DEFAULT_CALORIE_GOAL: f64 = 1500.0;
pub const DEFAULT_WATER_GOAL: f64 = 2500.0;

/// On-disk profile shape; goals may be missing (or zero) in older files
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    start_weight: f64,
    #[serde(default)]
    current_weight: f64,
    #[serde(default)]
    target_weight: f64,
    #[serde(default)]
    daily_calorie_goal: Option<f64>,
    #[serde(default)]
    daily_water_goal: Option<f64>,
    #[serde(default)]
    weight_history: Vec<WeightRecord>,
}

impl From<StoredProfile> for UserProfile {
    fn from(stored: StoredProfile) -> Self {
        let positive = |v: Option<f64>| v.filter(|g| *g > 0.0);
        UserProfile {
            name: stored.name,
            height: stored.height,
            start_weight: stored.start_weight,
            current_weight: stored.current_weight,
            target_weight: stored.target_weight,
            daily_calorie_goal: positive(stored.daily_calorie_goal)
                .unwrap_or(DEFAULT_CALORIE_GOAL),
            daily_water_goal: positive(stored.daily_water_goal).unwrap_or(DEFAULT_WATER_GOAL),
            weight_history: stored.weight_history,
        }
    }
}

// ============================================================================
// Cycle Types
// ============================================================================

/// A logged period start
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub note: String,
}

/// Whether cycle lengths are the 28/5 standard or user-edited
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    Standard,
    Custom,
}

pub const STANDARD_CYCLE_LENGTH: u32 = 28;
pub const STANDARD_PERIOD_LENGTH: u32 = 5;

/// Cycle configuration plus period history (most recent first)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "StoredCycleData")]
pub struct CycleData {
    pub last_period_start: Option<NaiveDate>,
    pub cycle_length: u32,
    pub period_length: u32,
    pub history: Vec<PeriodRecord>,
    pub notifications_enabled: bool,
    pub prediction_mode: PredictionMode,
}

impl Default for CycleData {
    fn default() -> Self {
        Self {
            last_period_start: None,
            cycle_length: STANDARD_CYCLE_LENGTH,
            period_length: STANDARD_PERIOD_LENGTH,
            history: Vec::new(),
            notifications_enabled: true,
            prediction_mode: PredictionMode::Standard,
        }
    }
}

/// History entries were bare date strings before notes existed
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPeriodRecord {
    Record(PeriodRecord),
    Legacy(NaiveDate),
}

impl From<StoredPeriodRecord> for PeriodRecord {
    fn from(stored: StoredPeriodRecord) -> Self {
        match stored {
            StoredPeriodRecord::Record(record) => record,
            StoredPeriodRecord::Legacy(start_date) => PeriodRecord {
                start_date,
                note: String::new(),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCycleData {
    #[serde(default)]
    last_period_start: Option<NaiveDate>,
    #[serde(default = "standard_cycle_length")]
    cycle_length: u32,
    #[serde(default = "standard_period_length")]
    period_length: u32,
    #[serde(default)]
    history: Vec<StoredPeriodRecord>,
    #[serde(default)]
    notifications_enabled: Option<bool>,
    #[serde(default)]
    prediction_mode: Option<PredictionMode>,
}

fn standard_cycle_length() -> u32 {
    STANDARD_CYCLE_LENGTH
}

fn standard_period_length() -> u32 {
    STANDARD_PERIOD_LENGTH
}

impl From<StoredCycleData> for CycleData {
    fn from(stored: StoredCycleData) -> Self {
        let prediction_mode = stored.prediction_mode.unwrap_or(
            if stored.cycle_length == STANDARD_CYCLE_LENGTH
                && stored.period_length == STANDARD_PERIOD_LENGTH
            {
                PredictionMode::Standard
            } else {
                PredictionMode::Custom
            },
        );

        CycleData {
            last_period_start: stored.last_period_start,
            cycle_length: stored.cycle_length,
            period_length: stored.period_length,
            history: stored.history.into_iter().map(PeriodRecord::from).collect(),
            notifications_enabled: stored.notifications_enabled.unwrap_or(true),
            prediction_mode,
        }
    }
}

/// Cycle phase as shown to the user. Overdue is reported as `Approaching`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    Active,
    Approaching,
    Safe,
    Unknown,
}

/// Derived cycle status for a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    pub status: CycleState,
    /// Negative when the predicted date has passed
    pub days_until_next: i64,
    pub next_date: Option<NaiveDate>,
    pub is_period_now: bool,
}

/// Calendar overlay classification of a single day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayClass {
    History,
    Predicted,
    Today,
    Neutral,
}

// ============================================================================
// Stats Types
// ============================================================================

/// Aggregate 0-100 scores over every logged day
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub nutrition_score: u32,
    pub cardio_score: u32,
    pub workout_score: u32,
    pub general_average: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_macros_sum() {
        let a = Macros {
            calories: 300.0,
            protein: 20.0,
            sodium: 100.0,
            ..Default::default()
        };
        let b = Macros {
            calories: 200.5,
            fat: 7.0,
            ..Default::default()
        };

        let total: Macros = [a, b].iter().sum();
        assert_eq!(total.calories, 500.5);
        assert_eq!(total.protein, 20.0);
        assert_eq!(total.fat, 7.0);
        assert_eq!(total.sodium, 100.0);
    }

    #[test]
    fn test_exercise_serializes_with_type_tag() {
        let exercise = Exercise {
            id: "e1".into(),
            name: "Squat".into(),
            kind: ExerciseKind::Strength {
                sets: 5,
                reps: "5".into(),
                weight: 100.0,
            },
            notes: None,
        };

        let value = serde_json::to_value(&exercise).unwrap();
        assert_eq!(value["type"], "strength");
        assert_eq!(value["sets"], 5);
        assert!(value.get("notes").is_none());

        let parsed: Exercise = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, exercise);
    }

    #[test]
    fn test_cardio_exercise_from_sparse_json() {
        let json = r#"{"id":"c1","name":"Run","type":"cardio","duration":30,"notes":"easy"}"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();

        assert_eq!(exercise.kind.exercise_type(), ExerciseType::Cardio);
        assert_eq!(
            exercise.kind,
            ExerciseKind::Cardio {
                distance: 0.0,
                duration: 30.0,
                intensity: String::new(),
            }
        );
        assert_eq!(exercise.notes.as_deref(), Some("easy"));
    }

    #[test]
    fn test_partial_and_null_fields_read_as_zero() {
        let json = r#"{"id":"m1","name":"Toast","timestamp":1709280000000,
                       "macros":{"calories":120,"protein":4,"carbs":null}}"#;
        let meal: MealItem = serde_json::from_str(json).unwrap();
        assert_eq!(meal.macros.calories, 120.0);
        assert_eq!(meal.macros.carbs, 0.0);
        assert_eq!(meal.macros.sodium, 0.0);

        let json = r#"{"id":"e1","name":"Row","type":"strength","sets":null,"reps":"8","weight":null}"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(
            exercise.kind,
            ExerciseKind::Strength {
                sets: 0,
                reps: "8".into(),
                weight: 0.0
            }
        );
    }

    #[test]
    fn test_meal_timestamp_is_epoch_millis() {
        let meal = MealItem {
            id: "m1".into(),
            name: "Oats".into(),
            macros: Macros::default(),
            timestamp: Utc.timestamp_millis_opt(1_709_280_000_123).unwrap(),
        };

        let value = serde_json::to_value(&meal).unwrap();
        assert_eq!(value["timestamp"], 1_709_280_000_123i64);
    }

    #[test]
    fn test_daily_logs_keyed_by_date_string() {
        let mut logs = DailyLogs::default();
        logs.days
            .insert(date("2024-03-01"), DailyLog::empty(date("2024-03-01")));

        let json = serde_json::to_string(&logs).unwrap();
        assert!(json.starts_with(r#"{"2024-03-01":{"date":"2024-03-01""#));
        assert!(json.contains(r#""waterIntake":0"#));

        let parsed: DailyLogs = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, logs);
    }

    #[test]
    fn test_profile_missing_goals_get_defaults() {
        let json = r#"{
            "name": "Ada", "height": 170, "startWeight": 70, "currentWeight": 68,
            "targetWeight": 65, "dailyCalorieGoal": 0,
            "weightHistory": [{"date": "2024-01-01", "weight": 70}]
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.daily_calorie_goal, DEFAULT_CALORIE_GOAL);
        assert_eq!(profile.daily_water_goal, DEFAULT_WATER_GOAL);
        assert_eq!(profile.weight_history.len(), 1);
    }

    #[test]
    fn test_cycle_data_legacy_history_upgraded() {
        let json = r#"{
            "lastPeriodStart": "2024-02-01", "cycleLength": 30, "periodLength": 4,
            "history": ["2024-02-01", "2024-01-02"]
        }"#;
        let data: CycleData = serde_json::from_str(json).unwrap();

        assert!(data.notifications_enabled);
        assert_eq!(data.prediction_mode, PredictionMode::Custom);
        assert_eq!(
            data.history,
            vec![
                PeriodRecord {
                    start_date: date("2024-02-01"),
                    note: String::new()
                },
                PeriodRecord {
                    start_date: date("2024-01-02"),
                    note: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_cycle_data_mode_inferred_standard() {
        let json = r#"{"lastPeriodStart": null, "cycleLength": 28, "periodLength": 5,
                       "history": [], "notificationsEnabled": false}"#;
        let data: CycleData = serde_json::from_str(json).unwrap();

        assert_eq!(data.prediction_mode, PredictionMode::Standard);
        assert!(!data.notifications_enabled);
    }

    #[test]
    fn test_workout_type_classification() {
        assert!(WorkoutType::Hybrid.trains_cardio());
        assert!(WorkoutType::Hybrid.trains_strength());
        assert!(!WorkoutType::Strength.trains_cardio());
        assert!(!WorkoutType::Cardio.trains_strength());
        assert_eq!(WorkoutType::from(ExerciseType::Cardio), WorkoutType::Cardio);
    }
}
