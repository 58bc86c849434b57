//! Weekly nutrition plan.
//!
//! The plan is a meal template independent of any date. Applying it stamps a
//! fresh copy of the template onto every day of the current Monday-Sunday
//! week, replacing whatever meals those days held. The template itself is
//! edited one meal at a time or cleared.

use crate::store::{load_record, save_record, KeyValueStore, NUTRITION_PLAN_KEY};
use crate::{dates, DailyLogs, MealItem, NutritionPlan, Result};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

impl NutritionPlan {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Self>> {
        load_record(store, NUTRITION_PLAN_KEY)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        save_record(store, NUTRITION_PLAN_KEY, self)
    }

    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            meals: Vec::new(),
            last_updated: now,
        }
    }

    pub fn add_meal(&mut self, meal: MealItem, now: DateTime<Utc>) {
        self.meals.push(meal);
        self.last_updated = now;
    }

    /// Drop the meal with `id`. Returns false, leaving the plan untouched,
    /// when no meal matches.
    pub fn remove_meal(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let before = self.meals.len();
        self.meals.retain(|m| m.id != id);
        if self.meals.len() == before {
            return false;
        }
        self.last_updated = now;
        true
    }

    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.meals.clear();
        self.last_updated = now;
    }

    /// Template meals copied for `date`, each with its own id
    pub fn meals_for(&self, date: NaiveDate, now: DateTime<Utc>) -> Vec<MealItem> {
        self.meals
            .iter()
            .enumerate()
            .map(|(idx, meal)| MealItem {
                id: format!("{}-plan-{}-{}", date, idx, Uuid::new_v4().simple()),
                name: meal.name.clone(),
                macros: meal.macros,
                timestamp: now,
            })
            .collect()
    }
}

/// Store `meals` as the plan template
pub fn save_nutrition_plan<S: KeyValueStore + ?Sized>(
    store: &mut S,
    meals: Vec<MealItem>,
    now: DateTime<Utc>,
) -> Result<NutritionPlan> {
    let plan = NutritionPlan {
        meals,
        last_updated: now,
    };
    plan.save(store)?;
    tracing::info!("Saved nutrition plan with {} meals", plan.meals.len());
    Ok(plan)
}

/// Append `meal` to the template, starting an empty plan if none exists
pub fn add_plan_meal<S: KeyValueStore + ?Sized>(
    store: &mut S,
    meal: MealItem,
    now: DateTime<Utc>,
) -> Result<NutritionPlan> {
    let mut plan = NutritionPlan::load(store)?.unwrap_or_else(|| NutritionPlan::empty(now));
    tracing::debug!("Adding {:?} to nutrition plan", meal.name);
    plan.add_meal(meal, now);
    plan.save(store)?;
    Ok(plan)
}

/// Remove a template meal by id. Nothing is written when the plan or the
/// meal does not exist.
pub fn remove_plan_meal<S: KeyValueStore + ?Sized>(
    store: &mut S,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let Some(mut plan) = NutritionPlan::load(store)? else {
        return Ok(false);
    };
    if !plan.remove_meal(id, now) {
        tracing::info!("No planned meal with id {:?}", id);
        return Ok(false);
    }
    plan.save(store)?;
    Ok(true)
}

/// Empty the template. Applying an empty plan clears the week's meals.
pub fn clear_nutrition_plan<S: KeyValueStore + ?Sized>(
    store: &mut S,
    now: DateTime<Utc>,
) -> Result<NutritionPlan> {
    let plan = NutritionPlan::empty(now);
    plan.save(store)?;
    tracing::info!("Cleared nutrition plan");
    Ok(plan)
}

/// Replace the meals of each day in the week containing `today` with the
/// plan template. Returns the dates written, or None when no plan exists.
pub fn apply_plan_to_week<S: KeyValueStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> Result<Option<[NaiveDate; 7]>> {
    let Some(plan) = NutritionPlan::load(store)? else {
        tracing::info!("No nutrition plan saved, nothing to apply");
        return Ok(None);
    };

    let mut logs = DailyLogs::load(store)?;
    let week = dates::week_dates(today);
    let now = dates::now();

    for date in week {
        logs.day_mut(date).meals = plan.meals_for(date, now);
    }

    logs.save(store)?;
    tracing::info!(
        "Applied {} planned meals to week of {}",
        plan.meals.len(),
        week[0]
    );
    Ok(Some(week))
}
