//! Meal Plan Store
//!
//! Owns the 7x3 grid under the `mealPlan` key. A missing grid is synthesized
//! empty and only written on the next mutation. Referenced recipe ids are never
//! validated here; see [`MealPlanStore::compact`].

use tracing::{debug, info, warn};

use crate::db::{LocalStorage, MEAL_PLAN_KEY};
use crate::models::{ApplyReport, Day, MealPlan, MealSlot, Recipe, WeeklySuggestion};
use crate::Result;

pub struct MealPlanStore {
    storage: LocalStorage,
    plan: MealPlan,
}

impl MealPlanStore {
    pub async fn open(storage: LocalStorage) -> Result<Self> {
        let plan = read_plan(&storage).await?;
        Ok(Self { storage, plan })
    }

    /// Re-read the persisted grid, replacing the snapshot
    pub async fn load(&mut self) -> Result<MealPlan> {
        self.plan = read_plan(&self.storage).await?;
        Ok(self.plan.clone())
    }

    pub fn plan(&self) -> &MealPlan {
        &self.plan
    }

    /// Put a copy of the recipe's id and title in the slot
    pub async fn assign(&mut self, day: Day, meal: MealSlot, recipe: &Recipe) -> Result<()> {
        self.plan.assign(day, meal, recipe);
        info!(%day, %meal, id = %recipe.id, "Meal assigned");
        self.persist().await
    }

    pub async fn clear(&mut self, day: Day, meal: MealSlot) -> Result<()> {
        self.plan.clear(day, meal);
        debug!(%day, %meal, "Meal cleared");
        self.persist().await
    }

    /// Empty all 21 slots with a single write
    pub async fn clear_all(&mut self) -> Result<()> {
        self.plan.clear_all();
        info!("Meal plan cleared");
        self.persist().await
    }

    /// Null out slots whose recipe id no longer resolves.
    ///
    /// Writes only if something changed. Returns the number of cleared slots.
    pub async fn compact(&mut self, recipes: &[Recipe]) -> Result<usize> {
        let cleared = self.plan.compact(recipes);
        if cleared > 0 {
            info!(cleared, "Removed stale meal plan references");
            self.persist().await?;
        }
        Ok(cleared)
    }

    /// Apply a parsed suggestion, writing once.
    ///
    /// Unmatched titles are skipped and reported.
    pub async fn apply_suggestion(
        &mut self,
        suggestion: &WeeklySuggestion,
        recipes: &[Recipe],
    ) -> Result<ApplyReport> {
        let report = self.plan.apply_suggestion(suggestion, recipes);
        for skipped in &report.unresolved {
            debug!(day = %skipped.day, meal = %skipped.meal, title = %skipped.title,
                "Suggested recipe not found, slot left unchanged");
        }
        info!(applied = report.applied, skipped = report.unresolved.len(), "Suggestions applied");
        self.persist().await?;
        Ok(report)
    }

    async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.plan)?;
        self.storage.set_item(MEAL_PLAN_KEY, &json).await
    }
}

async fn read_plan(storage: &LocalStorage) -> Result<MealPlan> {
    let Some(raw) = storage.get_item(MEAL_PLAN_KEY).await? else {
        return Ok(MealPlan::new());
    };

    match serde_json::from_str::<MealPlan>(&raw) {
        Ok(plan) => Ok(plan),
        Err(e) => {
            warn!("Stored meal plan could not be parsed, using an empty week: {}", e);
            Ok(MealPlan::new())
        }
    }
}
