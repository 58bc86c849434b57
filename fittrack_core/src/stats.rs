//! Aggregate scoring.
//!
//! Reduces every logged day to three component scores and a weighted
//! average. Workout and cardio scores are normalized against expected
//! training frequency (strength on 60% of days, cardio on 40%), so hitting
//! that frequency already yields 100.

use crate::store::KeyValueStore;
use crate::{DailyLog, DailyLogs, Result, UserProfile, UserStats, DEFAULT_CALORIE_GOAL};

const GOAL_LOWER_RATIO: f64 = 0.85;
const GOAL_UPPER_RATIO: f64 = 1.15;
const GOAL_HALF_RATIO: f64 = 0.5;

const STRENGTH_DAY_SHARE: f64 = 0.6;
const CARDIO_DAY_SHARE: f64 = 0.4;

const NUTRITION_WEIGHT: f64 = 0.4;
const WORKOUT_WEIGHT: f64 = 0.3;
const CARDIO_WEIGHT: f64 = 0.3;

/// Points for one day's calorie intake against the goal
fn nutrition_points(calories: f64, goal: f64) -> f64 {
    if calories >= goal * GOAL_LOWER_RATIO && calories <= goal * GOAL_UPPER_RATIO {
        100.0
    } else if calories > goal * GOAL_HALF_RATIO {
        60.0
    } else if calories > 0.0 {
        30.0
    } else {
        0.0
    }
}

/// Whether the day has a completed cardio-ish and strength-ish session
fn training_flags(day: &DailyLog) -> (bool, bool) {
    day.workouts
        .iter()
        .filter(|w| w.completed)
        .fold((false, false), |(cardio, strength), w| {
            (cardio || w.kind.trains_cardio(), strength || w.kind.trains_strength())
        })
}

fn score(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() || rounded < 0.0 {
        0
    } else {
        rounded as u32
    }
}

/// Compute scores over all days in `logs`
pub fn calculate_stats(logs: &DailyLogs, profile: &UserProfile) -> UserStats {
    let active_days = logs.days.len();
    if active_days == 0 {
        return UserStats::default();
    }

    let goal = if profile.daily_calorie_goal > 0.0 {
        profile.daily_calorie_goal
    } else {
        DEFAULT_CALORIE_GOAL
    };

    let mut total_nutrition = 0.0;
    let mut total_strength = 0.0;
    let mut total_cardio = 0.0;

    for day in logs.days.values() {
        let calories: f64 = day.meals.iter().map(|m| m.macros.calories).sum();
        total_nutrition += nutrition_points(calories, goal);

        let (has_cardio, has_strength) = training_flags(day);
        if has_cardio {
            total_cardio += 100.0;
        }
        if has_strength {
            total_strength += 100.0;
        }
    }

    let days = active_days as f64;
    let nutrition_score = score(total_nutrition / days);
    let workout_score = score(total_strength / (days * STRENGTH_DAY_SHARE)).min(100);
    let cardio_score = score(total_cardio / (days * CARDIO_DAY_SHARE)).min(100);
    let general_average = score(
        f64::from(nutrition_score) * NUTRITION_WEIGHT
            + f64::from(workout_score) * WORKOUT_WEIGHT
            + f64::from(cardio_score) * CARDIO_WEIGHT,
    );

    tracing::debug!(
        "Stats over {} days: nutrition {}, workout {}, cardio {}",
        active_days,
        nutrition_score,
        workout_score,
        cardio_score
    );

    UserStats {
        nutrition_score,
        cardio_score,
        workout_score,
        general_average,
    }
}

/// Load logs and profile from the store and score them
pub fn calculate_stats_from_store<S: KeyValueStore + ?Sized>(
    store: &S,
    today: chrono::NaiveDate,
) -> Result<UserStats> {
    let logs = DailyLogs::load(store)?;
    let profile = UserProfile::load(store, today)?;
    Ok(calculate_stats(&logs, &profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dates, Macros, MealItem, WorkoutSession, WorkoutType};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        dates::parse_date(s).unwrap()
    }

    fn profile(goal: f64) -> UserProfile {
        let mut profile = UserProfile::default_for(date("2024-03-01"));
        profile.daily_calorie_goal = goal;
        profile
    }

    fn meal(calories: f64) -> MealItem {
        MealItem::new(
            "meal",
            Macros {
                calories,
                ..Default::default()
            },
            dates::now(),
        )
    }

    fn workout(kind: WorkoutType, completed: bool) -> WorkoutSession {
        WorkoutSession {
            id: uuid::Uuid::new_v4().to_string(),
            name: "w".into(),
            exercises: vec![],
            timestamp: dates::now(),
            completed,
            kind,
            duration_minutes: 30,
        }
    }

    fn logs_with(days: Vec<DailyLog>) -> DailyLogs {
        let mut logs = DailyLogs::default();
        for day in days {
            logs.days.insert(day.date, day);
        }
        logs
    }

    #[test]
    fn test_empty_logs_score_zero() {
        let stats = calculate_stats(&DailyLogs::default(), &profile(2000.0));
        assert_eq!(stats, UserStats::default());
    }

    #[test]
    fn test_single_day_on_goal_with_strength() {
        let mut day = DailyLog::empty(date("2024-03-01"));
        day.meals = vec![meal(1200.0), meal(800.0)];
        day.workouts = vec![workout(WorkoutType::Strength, true)];

        let stats = calculate_stats(&logs_with(vec![day]), &profile(2000.0));
        assert_eq!(
            stats,
            UserStats {
                nutrition_score: 100,
                cardio_score: 0,
                workout_score: 100,
                general_average: 70,
            }
        );
    }

    #[test]
    fn test_nutrition_point_buckets() {
        assert_eq!(nutrition_points(1701.0, 2000.0), 100.0);
        assert_eq!(nutrition_points(2299.0, 2000.0), 100.0);
        assert_eq!(nutrition_points(2301.0, 2000.0), 60.0);
        assert_eq!(nutrition_points(1001.0, 2000.0), 60.0);
        assert_eq!(nutrition_points(1000.0, 2000.0), 30.0);
        assert_eq!(nutrition_points(1.0, 2000.0), 30.0);
        assert_eq!(nutrition_points(0.0, 2000.0), 0.0);
    }

    #[test]
    fn test_incomplete_workouts_ignored_and_hybrid_counts_twice() {
        let mut day1 = DailyLog::empty(date("2024-03-01"));
        day1.workouts = vec![
            workout(WorkoutType::Cardio, false),
            workout(WorkoutType::Strength, false),
        ];
        let mut day2 = DailyLog::empty(date("2024-03-02"));
        day2.workouts = vec![workout(WorkoutType::Hybrid, true)];
        let day3 = DailyLog::empty(date("2024-03-03"));
        let day4 = DailyLog::empty(date("2024-03-04"));
        let day5 = DailyLog::empty(date("2024-03-05"));

        let stats = calculate_stats(
            &logs_with(vec![day1, day2, day3, day4, day5]),
            &profile(2000.0),
        );

        // 100 / (5 * 0.6) = 33.3 and 100 / (5 * 0.4) = 50
        assert_eq!(stats.workout_score, 33);
        assert_eq!(stats.cardio_score, 50);
        assert_eq!(stats.nutrition_score, 0);
        // 0 + 9.9 + 15 = 24.9
        assert_eq!(stats.general_average, 25);
    }

    #[test]
    fn test_nutrition_average_rounds() {
        let mut a = DailyLog::empty(date("2024-03-01"));
        a.meals = vec![meal(1500.0)];
        let mut b = DailyLog::empty(date("2024-03-02"));
        b.meals = vec![meal(900.0)];
        let mut c = DailyLog::empty(date("2024-03-03"));
        c.meals = vec![meal(100.0)];

        // (100 + 60 + 30) / 3 = 63.3
        let stats = calculate_stats(&logs_with(vec![a, b, c]), &profile(1500.0));
        assert_eq!(stats.nutrition_score, 63);
    }

    #[test]
    fn test_zero_goal_falls_back_to_default() {
        let mut day = DailyLog::empty(date("2024-03-01"));
        day.meals = vec![meal(1500.0)];

        let stats = calculate_stats(&logs_with(vec![day]), &profile(0.0));
        assert_eq!(stats.nutrition_score, 100);
    }

    #[test]
    fn test_stats_from_store() {
        let mut store = crate::store::MemoryStore::new();
        crate::daily_log::add_meal(&mut store, date("2024-03-01"), meal(1500.0)).unwrap();

        let stats = calculate_stats_from_store(&store, date("2024-03-01")).unwrap();
        assert_eq!(stats.nutrition_score, 100);
        assert_eq!(stats.general_average, 40);
    }
}
