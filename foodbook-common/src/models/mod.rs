//! Data model: recipe records, meal plan grid and AI suggestions

pub mod meal_plan;
pub mod recipe;
pub mod suggestion;

pub use meal_plan::*;
pub use recipe::*;
pub use suggestion::*;
