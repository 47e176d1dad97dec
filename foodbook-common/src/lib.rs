//! # FoodBook Common Library
//!
//! Shared code for the FoodBook recipe manager:
//! - Recipe and meal plan data model
//! - Local key-value storage (SQLite backed)
//! - Recipe Store, Meal Plan Store and user identity
//! - Query/view layer (search, filter, sort)
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{Day, MealPlan, MealRef, MealSlot, Recipe, WeeklySuggestion};
pub use query::{RecipeQuery, SortOrder, SourceFilter};
pub use store::{MealPlanStore, RecipeStore};
