//! Workout session editing.
//!
//! Sessions are edited in memory and written back through
//! [`daily_log::update_workout`], which replaces the session by id.

use crate::ai::WorkoutPlan;
use crate::daily_log;
use crate::store::KeyValueStore;
use crate::{
    DailyLog, Error, Exercise, ExerciseKind, ExerciseType, Result, WorkoutSession, WorkoutType,
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

impl Exercise {
    /// The starter exercise a new session is seeded with
    pub fn default_for(kind: ExerciseType) -> Self {
        let (name, kind) = match kind {
            ExerciseType::Strength => (
                "Bench Press",
                ExerciseKind::Strength {
                    sets: 3,
                    reps: "10".into(),
                    weight: 0.0,
                },
            ),
            ExerciseType::Cardio => (
                "Treadmill",
                ExerciseKind::Cardio {
                    distance: 5.0,
                    duration: 30.0,
                    intensity: "Speed 9.0".into(),
                },
            ),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            notes: None,
        }
    }

    /// Placeholder appended to an existing session, meant to be edited
    pub fn placeholder(kind: ExerciseType) -> Self {
        let (name, kind) = match kind {
            ExerciseType::Strength => (
                "New Movement",
                ExerciseKind::Strength {
                    sets: 3,
                    reps: "10".into(),
                    weight: 0.0,
                },
            ),
            ExerciseType::Cardio => (
                "New Activity",
                ExerciseKind::Cardio {
                    distance: 0.0,
                    duration: 20.0,
                    intensity: "Medium".into(),
                },
            ),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            notes: None,
        }
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Exercise index {} out of range (session has {})",
            index, len
        )))
    }
}

impl WorkoutSession {
    /// A new, incomplete session seeded with one default exercise
    pub fn blank(kind: ExerciseType, now: DateTime<Utc>) -> Self {
        let name = match kind {
            ExerciseType::Strength => "New Workout",
            ExerciseType::Cardio => "New Cardio",
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            exercises: vec![Exercise::default_for(kind)],
            timestamp: now,
            completed: false,
            kind: kind.into(),
            duration_minutes: 0,
        }
    }

    pub fn from_plan(plan: WorkoutPlan, kind: ExerciseType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: plan.name,
            exercises: plan.exercises,
            timestamp: now,
            completed: false,
            kind: kind.into(),
            duration_minutes: 0,
        }
    }

    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
    }

    /// The exercise discipline new exercises in this session default to
    fn exercise_type(&self) -> ExerciseType {
        match self.kind {
            WorkoutType::Cardio => ExerciseType::Cardio,
            WorkoutType::Strength | WorkoutType::Hybrid => ExerciseType::Strength,
        }
    }

    /// Append a placeholder exercise and return its id
    pub fn add_exercise(&mut self) -> String {
        let exercise = Exercise::placeholder(self.exercise_type());
        let id = exercise.id.clone();
        self.exercises.push(exercise);
        id
    }

    pub fn remove_exercise(&mut self, index: usize) -> Result<Exercise> {
        check_index(index, self.exercises.len())?;
        Ok(self.exercises.remove(index))
    }

    /// Remove at `from`, then insert at `to` in the shortened list
    pub fn move_exercise(&mut self, from: usize, to: usize) -> Result<()> {
        check_index(from, self.exercises.len())?;
        check_index(to, self.exercises.len())?;
        let exercise = self.exercises.remove(from);
        self.exercises.insert(to, exercise);
        Ok(())
    }

    pub fn update_exercise(&mut self, index: usize, exercise: Exercise) -> Result<()> {
        check_index(index, self.exercises.len())?;
        self.exercises[index] = exercise;
        Ok(())
    }
}

/// First incomplete session of `kind`, else the last one of that kind
pub fn active_session(day: &DailyLog, kind: WorkoutType) -> Option<&WorkoutSession> {
    let mut last = None;
    for session in day.workouts.iter().filter(|w| w.kind == kind) {
        if !session.completed {
            return Some(session);
        }
        last = Some(session);
    }
    last
}

/// Start a blank session of `kind` on `date`
pub fn start_workout<S: KeyValueStore + ?Sized>(
    store: &mut S,
    date: NaiveDate,
    kind: ExerciseType,
    now: DateTime<Utc>,
) -> Result<WorkoutSession> {
    let session = WorkoutSession::blank(kind, now);
    daily_log::add_workout(store, date, session.clone())?;
    tracing::info!("Started {:?} session {} on {}", kind, session.id, date);
    Ok(session)
}

/// Apply `f` to the stored session `session_id` on `date` and persist it
pub fn edit_workout<S, F>(
    store: &mut S,
    date: NaiveDate,
    session_id: &str,
    f: F,
) -> Result<WorkoutSession>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce(&mut WorkoutSession) -> Result<()>,
{
    let day = daily_log::day(store, date)?;
    let mut session = day
        .workouts
        .into_iter()
        .find(|w| w.id == session_id)
        .ok_or_else(|| {
            Error::Validation(format!("No workout '{}' on {}", session_id, date))
        })?;

    f(&mut session)?;
    daily_log::update_workout(store, date, session.clone())?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates;
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        dates::parse_date(s).unwrap()
    }

    fn names(session: &WorkoutSession) -> Vec<&str> {
        session.exercises.iter().map(|e| e.name.as_str()).collect()
    }

    fn named(name: &str) -> Exercise {
        let mut exercise = Exercise::default_for(ExerciseType::Strength);
        exercise.name = name.into();
        exercise
    }

    #[test]
    fn test_blank_strength_session() {
        let session = WorkoutSession::blank(ExerciseType::Strength, dates::now());

        assert_eq!(session.name, "New Workout");
        assert_eq!(session.kind, WorkoutType::Strength);
        assert!(!session.completed);
        assert_eq!(session.duration_minutes, 0);
        assert_eq!(session.exercises.len(), 1);
        assert_eq!(session.exercises[0].name, "Bench Press");
        assert_eq!(
            session.exercises[0].kind,
            ExerciseKind::Strength {
                sets: 3,
                reps: "10".into(),
                weight: 0.0
            }
        );
    }

    #[test]
    fn test_blank_cardio_session() {
        let session = WorkoutSession::blank(ExerciseType::Cardio, dates::now());

        assert_eq!(session.name, "New Cardio");
        assert_eq!(session.kind, WorkoutType::Cardio);
        assert_eq!(session.exercises[0].name, "Treadmill");
        assert_eq!(
            session.exercises[0].kind,
            ExerciseKind::Cardio {
                distance: 5.0,
                duration: 30.0,
                intensity: "Speed 9.0".into()
            }
        );
    }

    #[test]
    fn test_exercise_list_edits() {
        let mut session = WorkoutSession::blank(ExerciseType::Strength, dates::now());
        session.exercises = vec![named("A"), named("B"), named("C"), named("D")];

        session.move_exercise(0, 2).unwrap();
        assert_eq!(names(&session), vec!["B", "C", "A", "D"]);

        session.move_exercise(3, 0).unwrap();
        assert_eq!(names(&session), vec!["D", "B", "C", "A"]);

        let removed = session.remove_exercise(1).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(names(&session), vec!["D", "C", "A"]);

        session.update_exercise(2, named("Z")).unwrap();
        assert_eq!(names(&session), vec!["D", "C", "Z"]);

        let id = session.add_exercise();
        assert_eq!(session.exercises[3].id, id);
        assert_eq!(session.exercises[3].name, "New Movement");
        assert_eq!(
            session.exercises[3].kind,
            ExerciseKind::Strength {
                sets: 3,
                reps: "10".into(),
                weight: 0.0
            }
        );
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut session = WorkoutSession::blank(ExerciseType::Cardio, dates::now());

        assert!(matches!(session.remove_exercise(1), Err(Error::Validation(_))));
        assert!(matches!(session.move_exercise(0, 1), Err(Error::Validation(_))));
        assert!(matches!(
            session.update_exercise(5, named("X")),
            Err(Error::Validation(_))
        ));
        assert_eq!(session.exercises.len(), 1);
    }

    #[test]
    fn test_active_session_selection() {
        let now = dates::now();
        let mut day = DailyLog::empty(date("2024-03-01"));
        assert!(active_session(&day, WorkoutType::Strength).is_none());

        let mut first = WorkoutSession::blank(ExerciseType::Strength, now);
        first.completed = true;
        let second = WorkoutSession::blank(ExerciseType::Strength, now);
        let cardio = WorkoutSession::blank(ExerciseType::Cardio, now);
        day.workouts = vec![first.clone(), cardio.clone(), second.clone()];

        assert_eq!(active_session(&day, WorkoutType::Strength), Some(&second));
        assert_eq!(active_session(&day, WorkoutType::Cardio), Some(&cardio));

        day.workouts[2].completed = true;
        assert_eq!(
            active_session(&day, WorkoutType::Strength).map(|w| w.id.as_str()),
            Some(second.id.as_str())
        );
        assert!(active_session(&day, WorkoutType::Hybrid).is_none());
    }

    #[test]
    fn test_edit_workout_persists() {
        let mut store = MemoryStore::new();
        let d = date("2024-03-01");
        let session = start_workout(&mut store, d, ExerciseType::Cardio, dates::now()).unwrap();

        edit_workout(&mut store, d, &session.id, |s| {
            s.toggle_complete();
            s.add_exercise();
            Ok(())
        })
        .unwrap();

        let day = daily_log::day(&store, d).unwrap();
        assert_eq!(day.workouts.len(), 1);
        assert!(day.workouts[0].completed);
        assert_eq!(day.workouts[0].exercises.len(), 2);
        // The seed exercise keeps its template; the added one is a placeholder
        assert_eq!(day.workouts[0].exercises[0].name, "Treadmill");
        assert_eq!(day.workouts[0].exercises[1].name, "New Activity");
        assert_eq!(
            day.workouts[0].exercises[1].kind,
            ExerciseKind::Cardio {
                distance: 0.0,
                duration: 20.0,
                intensity: "Medium".into()
            }
        );
    }

    #[test]
    fn test_edit_unknown_workout_is_validation_error() {
        let mut store = MemoryStore::new();
        let result = edit_workout(&mut store, date("2024-03-01"), "missing", |_| Ok(()));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_failed_edit_writes_nothing() {
        let mut store = MemoryStore::new();
        let d = date("2024-03-01");
        let session = start_workout(&mut store, d, ExerciseType::Strength, dates::now()).unwrap();

        let result = edit_workout(&mut store, d, &session.id, |s| {
            s.toggle_complete();
            s.remove_exercise(9).map(|_| ())
        });

        assert!(result.is_err());
        assert!(!daily_log::day(&store, d).unwrap().workouts[0].completed);
    }

    #[test]
    fn test_from_plan_uses_requested_kind() {
        let plan = WorkoutPlan {
            name: "Intervals".into(),
            exercises: vec![Exercise::default_for(ExerciseType::Cardio)],
        };
        let session = WorkoutSession::from_plan(plan, ExerciseType::Cardio, dates::now());

        assert_eq!(session.name, "Intervals");
        assert_eq!(session.kind, WorkoutType::Cardio);
        assert_eq!(session.exercises.len(), 1);
        assert!(!session.completed);
    }
}
