//! Weekly meal plan grid
//!
//! Seven days by three meal slots, always fully present. Each slot holds an
//! optional [`MealRef`], a copy of a recipe's `id` and `title` taken at
//! assignment time. The id is a lookup key only: deleting the recipe leaves the
//! slot pointing at nothing until [`MealPlan::compact`] is run.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::recipe::{string_or_number, Recipe, DEFAULT_TITLE};
use super::suggestion::WeeklySuggestion;
use crate::Error;

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Persisted key ("Monday")
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Day {
    type Err = Error;

    /// Case-insensitive; accepts full names and three-letter abbreviations
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| {
                let name = day.as_str().to_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .ok_or_else(|| Error::InvalidInput(format!("Unknown day: {}", s)))
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Persisted key ("breakfast")
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Capitalized label ("Breakfast")
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown meal: {}", s)))
    }
}

impl Serialize for MealSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Weak reference from a slot to a recipe, copied by value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRef {
    /// Recipe Store lookup key; may dangle
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MealRef {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => DEFAULT_TITLE,
        }
    }
}

/// The three slots of one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayMeals {
    pub breakfast: Option<MealRef>,
    pub lunch: Option<MealRef>,
    pub dinner: Option<MealRef>,
}

impl DayMeals {
    pub fn get(&self, slot: MealSlot) -> Option<&MealRef> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: MealSlot) -> &mut Option<MealRef> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }
}

/// One filled or empty cell, as yielded by [`MealPlan::slots`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotEntry<'a> {
    pub day: Day,
    pub meal: MealSlot,
    pub recipe: Option<&'a MealRef>,
}

/// A suggestion that named no known recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSuggestion {
    pub day: Day,
    pub meal: MealSlot,
    pub title: String,
}

/// Outcome of applying an AI suggestion to the grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: usize,
    pub unresolved: Vec<UnresolvedSuggestion>,
}

/// The 7x3 grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealPlan {
    days: [DayMeals; 7],
}

impl MealPlan {
    /// All 21 slots empty
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &DayMeals {
        &self.days[day.index()]
    }

    pub fn get(&self, day: Day, meal: MealSlot) -> Option<&MealRef> {
        self.day(day).get(meal)
    }

    pub fn set(&mut self, day: Day, meal: MealSlot, value: Option<MealRef>) {
        *self.days[day.index()].slot_mut(meal) = value;
    }

    pub fn assign(&mut self, day: Day, meal: MealSlot, recipe: &Recipe) {
        self.set(day, meal, Some(MealRef::from_recipe(recipe)));
    }

    pub fn clear(&mut self, day: Day, meal: MealSlot) {
        self.set(day, meal, None);
    }

    pub fn clear_all(&mut self) {
        self.days = Default::default();
    }

    /// Every slot in day-major order, 21 entries
    pub fn slots(&self) -> impl Iterator<Item = SlotEntry<'_>> + '_ {
        Day::ALL.into_iter().flat_map(move |day| {
            MealSlot::ALL.into_iter().map(move |meal| SlotEntry {
                day,
                meal,
                recipe: self.get(day, meal),
            })
        })
    }

    pub fn filled_count(&self) -> usize {
        self.slots().filter(|entry| entry.recipe.is_some()).count()
    }

    /// Dinner slot of each day, Monday first
    pub fn dinner_only(&self) -> Vec<(Day, Option<&MealRef>)> {
        Day::ALL
            .into_iter()
            .map(|day| (day, self.get(day, MealSlot::Dinner)))
            .collect()
    }

    /// Slots whose id does not resolve in `recipes`
    pub fn dangling<'a>(&'a self, recipes: &'a [Recipe]) -> impl Iterator<Item = SlotEntry<'a>> + 'a {
        self.slots().filter(move |entry| {
            entry
                .recipe
                .map(|r| !recipes.iter().any(|recipe| recipe.id == r.id))
                .unwrap_or(false)
        })
    }

    /// Empty every slot whose referenced recipe no longer exists.
    /// Returns the number of slots cleared.
    pub fn compact(&mut self, recipes: &[Recipe]) -> usize {
        let stale: Vec<(Day, MealSlot)> = self
            .dangling(recipes)
            .map(|entry| (entry.day, entry.meal))
            .collect();

        for (day, meal) in &stale {
            self.clear(*day, *meal);
        }
        stale.len()
    }

    /// Write each suggested title that matches a recipe into its slot.
    ///
    /// Titles match case-insensitively and otherwise exactly; the first
    /// matching recipe wins. Unmatched titles leave their slot as it was
    /// and are listed in the report.
    pub fn apply_suggestion(&mut self, suggestion: &WeeklySuggestion, recipes: &[Recipe]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (day, meal, title) in suggestion.entries() {
            match find_by_title(recipes, title) {
                Some(recipe) => {
                    self.assign(day, meal, recipe);
                    report.applied += 1;
                }
                None => report.unresolved.push(UnresolvedSuggestion {
                    day,
                    meal,
                    title: title.to_string(),
                }),
            }
        }

        report
    }
}

fn find_by_title<'a>(recipes: &'a [Recipe], title: &str) -> Option<&'a Recipe> {
    let wanted = title.to_lowercase();
    recipes.iter().find(|recipe| {
        recipe
            .title
            .as_deref()
            .map(|t| t.to_lowercase() == wanted)
            .unwrap_or(false)
    })
}

impl Serialize for MealPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for day in Day::ALL {
            map.serialize_entry(day.as_str(), self.day(day))?;
        }
        map.end()
    }
}

/// Slot as found in storage. Early builds stored a bare title string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSlot {
    Ref(MealRef),
    Title(String),
}

impl From<StoredSlot> for MealRef {
    fn from(slot: StoredSlot) -> Self {
        match slot {
            StoredSlot::Ref(r) => r,
            StoredSlot::Title(title) => MealRef {
                id: String::new(),
                title: Some(title),
            },
        }
    }
}

#[derive(Deserialize, Default)]
struct StoredDay {
    #[serde(default)]
    breakfast: Option<StoredSlot>,
    #[serde(default)]
    lunch: Option<StoredSlot>,
    #[serde(default)]
    dinner: Option<StoredSlot>,
}

impl<'de> Deserialize<'de> for MealPlan {
    /// Missing days or meals read as empty; unknown keys are ignored
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = BTreeMap::<String, Option<StoredDay>>::deserialize(deserializer)?;

        let mut plan = MealPlan::new();
        for (key, value) in stored {
            let Ok(day) = key.parse::<Day>() else {
                continue;
            };
            let stored_day = value.unwrap_or_default();
            let meals = &mut plan.days[day.index()];
            meals.breakfast = stored_day.breakfast.map(MealRef::from);
            meals.lunch = stored_day.lunch.map(MealRef::from);
            meals.dinner = stored_day.dinner.map(MealRef::from);
        }

        Ok(plan)
    }
}
