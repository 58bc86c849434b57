//! Profile, goals and weight history.
//!
//! Weight history holds at most one record per date, sorted ascending.
//! Logging a weight upserts today's record and updates the current weight.

use crate::store::{load_record, save_record, KeyValueStore, USER_PROFILE_KEY};
use crate::{Result, UserProfile, WeightRecord, DEFAULT_CALORIE_GOAL, DEFAULT_WATER_GOAL};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body mass index bands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Partial profile edit; `None` leaves a field as is
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub height: Option<f64>,
    pub target_weight: Option<f64>,
    pub daily_calorie_goal: Option<f64>,
    pub daily_water_goal: Option<f64>,
}

impl UserProfile {
    /// Starting profile for a new user
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            name: "User".into(),
            height: 175.0,
            start_weight: 80.0,
            current_weight: 80.0,
            target_weight: 70.0,
            daily_calorie_goal: DEFAULT_CALORIE_GOAL,
            daily_water_goal: DEFAULT_WATER_GOAL,
            weight_history: vec![WeightRecord {
                date: today,
                weight: 80.0,
            }],
        }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S, today: NaiveDate) -> Result<Self> {
        match load_record(store, USER_PROFILE_KEY)? {
            Some(profile) => Ok(profile),
            None => {
                tracing::info!("No profile found, using default profile");
                Ok(Self::default_for(today))
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_record(store, USER_PROFILE_KEY, self)
    }

    /// Upsert the record for `date` and keep history sorted by date
    pub fn record_weight(&mut self, date: NaiveDate, weight: f64) {
        match self.weight_history.iter_mut().find(|w| w.date == date) {
            Some(existing) => existing.weight = weight,
            None => self.weight_history.push(WeightRecord { date, weight }),
        }
        self.weight_history.sort_by_key(|w| w.date);
        self.current_weight = weight;
    }

    pub fn apply_update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(target) = update.target_weight {
            self.target_weight = target;
        }
        if let Some(goal) = update.daily_calorie_goal {
            self.daily_calorie_goal = goal;
        }
        if let Some(goal) = update.daily_water_goal {
            self.daily_water_goal = goal;
        }
    }

    /// Body mass index from current weight; None without a height
    pub fn bmi(&self) -> Option<f64> {
        if self.height <= 0.0 {
            return None;
        }
        let meters = self.height / 100.0;
        Some(self.current_weight / (meters * meters))
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }

    /// Current minus starting weight (negative when lost)
    pub fn weight_change(&self) -> f64 {
        self.current_weight - self.start_weight
    }

    /// Current minus target weight
    pub fn remaining_to_target(&self) -> f64 {
        self.current_weight - self.target_weight
    }

    /// Percent of the start-to-target distance covered, clamped to 0-100
    pub fn goal_progress(&self) -> f64 {
        let span = self.start_weight - self.target_weight;
        if span == 0.0 {
            return 0.0;
        }
        ((self.start_weight - self.current_weight) / span * 100.0).clamp(0.0, 100.0)
    }
}

/// Log `weight` for `today`, persist and return the profile
pub fn add_weight_log<S: KeyValueStore + ?Sized>(
    store: &mut S,
    weight: f64,
    today: NaiveDate,
) -> Result<UserProfile> {
    let mut profile = UserProfile::load(store, today)?;
    profile.record_weight(today, weight);
    profile.save(store)?;
    tracing::info!("Logged weight {} for {}", weight, today);
    Ok(profile)
}

pub fn update_profile<S: KeyValueStore + ?Sized>(
    store: &mut S,
    update: ProfileUpdate,
    today: NaiveDate,
) -> Result<UserProfile> {
    let mut profile = UserProfile::load(store, today)?;
    profile.apply_update(update);
    profile.save(store)?;
    Ok(profile)
}
