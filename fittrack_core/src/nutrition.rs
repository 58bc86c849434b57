//! Daily nutrition totals and progress against targets.

use crate::{DailyLog, Macros};
use serde::Serialize;

/// g
pub const FIBER_TARGET: f64 = 30.0;
/// mg
pub const POTASSIUM_TARGET: f64 = 3500.0;
/// mg
pub const SODIUM_TARGET: f64 = 2300.0;

/// `value` as a percentage of `target`, capped at 100
pub fn progress_percent(value: f64, target: f64) -> f64 {
    if target <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    (value / target * 100.0).min(100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicronutrientProgress {
    pub fiber: f64,
    pub potassium: f64,
    pub sodium: f64,
}

impl MicronutrientProgress {
    pub fn from_totals(totals: &Macros) -> Self {
        Self {
            fiber: progress_percent(totals.fiber, FIBER_TARGET),
            potassium: progress_percent(totals.potassium, POTASSIUM_TARGET),
            sodium: progress_percent(totals.sodium, SODIUM_TARGET),
        }
    }
}

/// Totals and progress for one day
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub totals: Macros,
    pub calorie_goal: f64,
    pub micronutrients: MicronutrientProgress,
    pub water_intake: u32,
    pub water_percent: f64,
}

impl DailyLog {
    /// Sum of every meal's macros
    pub fn totals(&self) -> Macros {
        self.meals.iter().map(|m| &m.macros).sum()
    }

    pub fn water_percent(&self, goal_ml: f64) -> f64 {
        progress_percent(f64::from(self.water_intake), goal_ml)
    }

    pub fn summary(&self, calorie_goal: f64, water_goal_ml: f64) -> DaySummary {
        let totals = self.totals();
        DaySummary {
            totals,
            calorie_goal,
            micronutrients: MicronutrientProgress::from_totals(&totals),
            water_intake: self.water_intake,
            water_percent: self.water_percent(water_goal_ml),
        }
    }
}
