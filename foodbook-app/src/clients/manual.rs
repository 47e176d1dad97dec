//! Manual recipe entry
//!
//! Builds a record locally from form text. Nothing leaves the process.

use foodbook_common::models::{CreatedAt, Servings, SOURCE_MANUAL};
use foodbook_common::{uuid_utils, Recipe};

use crate::error::{ImportError, ImportResult};

/// Form fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    pub title: String,
    pub description: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<String>,
    /// One ingredient per line
    pub ingredients: String,
    /// One step per line
    pub instructions: String,
}

impl ManualEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.title.trim().is_empty() {
            return Err(ImportError::Validation("Please enter a recipe title".to_string()));
        }
        Ok(())
    }

    /// Convert to a new record owned by `user_id`
    pub fn into_recipe(self, user_id: &str) -> ImportResult<Recipe> {
        self.validate()?;

        Ok(Recipe {
            id: uuid_utils::new_recipe_id(),
            title: Some(self.title.trim().to_string()),
            description: non_blank(self.description),
            prep_time: non_blank(self.prep_time),
            cook_time: non_blank(self.cook_time),
            servings: non_blank(self.servings).map(Servings::Text),
            ingredients: split_lines(&self.ingredients),
            instructions: split_lines(&self.instructions),
            source: Some(SOURCE_MANUAL.to_string()),
            source_url: Some(String::new()),
            thumbnail_url: Some(String::new()),
            user_id: Some(user_id.to_string()),
            created_at: Some(CreatedAt::now()),
            ..Default::default()
        })
    }
}

/// Split on newlines, trim, drop blank lines
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
