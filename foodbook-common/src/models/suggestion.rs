//! AI weekly meal plan suggestion
//!
//! Advisory only: titles are free text proposed by a model and are resolved
//! against the Recipe Store when applied.

use serde::Serialize;
use std::collections::BTreeMap;

use super::meal_plan::{Day, MealSlot};
use crate::{Error, Result};

/// Suggested titles for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuggestedMeals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dinner: Option<String>,
}

impl SuggestedMeals {
    pub fn get(&self, meal: MealSlot) -> Option<&str> {
        match meal {
            MealSlot::Breakfast => self.breakfast.as_deref(),
            MealSlot::Lunch => self.lunch.as_deref(),
            MealSlot::Dinner => self.dinner.as_deref(),
        }
    }
}

/// Day -> suggested meals, Monday first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeeklySuggestion {
    days: BTreeMap<Day, SuggestedMeals>,
}

impl WeeklySuggestion {
    /// Build from a parsed JSON object keyed by weekday name.
    ///
    /// Day keys are matched case-insensitively; unknown keys, non-string meal
    /// values and blank titles are dropped. Titles are kept verbatim. Anything
    /// other than an object is rejected.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::InvalidInput("suggestion payload is not a JSON object".to_string())
        })?;

        let mut days = BTreeMap::new();
        for (key, meals) in object {
            let Ok(day) = key.parse::<Day>() else {
                continue;
            };
            let Some(meals) = meals.as_object() else {
                continue;
            };

            let title = |meal: MealSlot| {
                meals
                    .get(meal.as_str())
                    .and_then(|v| v.as_str())
                    .filter(|t| !t.trim().is_empty())
                    .map(str::to_string)
            };

            days.insert(
                day,
                SuggestedMeals {
                    breakfast: title(MealSlot::Breakfast),
                    lunch: title(MealSlot::Lunch),
                    dinner: title(MealSlot::Dinner),
                },
            );
        }

        Ok(Self { days })
    }

    pub fn day(&self, day: Day) -> Option<&SuggestedMeals> {
        self.days.get(&day)
    }

    pub fn get(&self, day: Day, meal: MealSlot) -> Option<&str> {
        self.day(day).and_then(|meals| meals.get(meal))
    }

    /// Every suggested (day, meal, title), day-major
    pub fn entries(&self) -> impl Iterator<Item = (Day, MealSlot, &str)> + '_ {
        self.days.iter().flat_map(|(day, meals)| {
            MealSlot::ALL
                .into_iter()
                .filter_map(move |meal| meals.get(meal).map(|title| (*day, meal, title)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}
