//! Persistent stores over local storage
//!
//! Each store owns an in-memory snapshot and rewrites its whole value on every
//! mutation. Other holders of a snapshot see changes only after reloading.

pub mod identity;
pub mod meal_plan;
pub mod recipes;

pub use identity::get_or_init_user_id;
pub use meal_plan::MealPlanStore;
pub use recipes::RecipeStore;
