//! Recipe Store
//!
//! Owns the authoritative recipe collection under the `recipes` key. Every
//! mutation rewrites the full JSON array before returning.

use tracing::{debug, info, warn};

use crate::db::{LocalStorage, RECIPES_KEY};
use crate::models::Recipe;
use crate::{Error, Result};

pub struct RecipeStore {
    storage: LocalStorage,
    recipes: Vec<Recipe>,
}

impl RecipeStore {
    /// Open the store and load its snapshot
    pub async fn open(storage: LocalStorage) -> Result<Self> {
        let recipes = read_recipes(&storage).await?;
        debug!(count = recipes.len(), "Recipe store opened");
        Ok(Self { storage, recipes })
    }

    /// Re-read the persisted collection, replacing the snapshot.
    ///
    /// Missing or unparseable data yields an empty collection and unreadable
    /// records are dropped; parse failures are logged, not returned.
    pub async fn load_all(&mut self) -> Result<Vec<Recipe>> {
        self.recipes = read_recipes(&self.storage).await?;
        Ok(self.recipes.clone())
    }

    /// Current snapshot, insertion order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// First record with this id
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Add a record and persist.
    ///
    /// Only `id` is required. An inline `data:image` thumbnail is cleared to
    /// the empty string first. Duplicate ids are not checked.
    pub async fn append(&mut self, mut recipe: Recipe) -> Result<()> {
        if recipe.id.trim().is_empty() {
            return Err(Error::InvalidInput("recipe id is required".to_string()));
        }

        if recipe.strip_inline_thumbnail() {
            debug!(id = %recipe.id, "Dropped inline thumbnail before persisting");
        }

        info!(id = %recipe.id, title = %recipe.display_title(), "Saving recipe");
        let mut next = self.recipes.clone();
        next.push(recipe);
        self.commit(next).await
    }

    /// Set the favorite flag of the first record with this id
    pub async fn set_favorite(&mut self, id: &str, value: bool) -> Result<()> {
        let mut next = self.recipes.clone();
        let recipe = next
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("recipe {}", id)))?;

        recipe.favorite = value;
        self.commit(next).await
    }

    /// Flip the favorite flag, returning the new value
    pub async fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let current = self
            .get(id)
            .map(|r| r.favorite)
            .ok_or_else(|| Error::NotFound(format!("recipe {}", id)))?;

        self.set_favorite(id, !current).await?;
        Ok(!current)
    }

    /// Remove the first record with this id.
    ///
    /// Returns false (and writes nothing) when no record matches. Callers are
    /// expected to have confirmed the deletion with the user.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.recipes.iter().position(|r| r.id == id) else {
            debug!(id, "Delete of unknown recipe ignored");
            return Ok(false);
        };

        let mut next = self.recipes.clone();
        let removed = next.remove(index);
        self.commit(next).await?;
        info!(id = %removed.id, title = %removed.display_title(), "Deleted recipe");
        Ok(true)
    }

    /// Write `next`, then adopt it as the snapshot. A failed write leaves the
    /// snapshot as it was.
    async fn commit(&mut self, next: Vec<Recipe>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.storage.set_item(RECIPES_KEY, &json).await?;
        self.recipes = next;
        Ok(())
    }
}

/// Read the stored collection.
///
/// A value that is not a JSON array reads as empty. Inside an array, records
/// that do not fit [`Recipe`] are skipped one by one so the rest survive.
async fn read_recipes(storage: &LocalStorage) -> Result<Vec<Recipe>> {
    let Some(raw) = storage.get_item(RECIPES_KEY).await? else {
        return Ok(Vec::new());
    };

    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("Stored recipes could not be parsed, starting empty: {}", e);
            return Ok(Vec::new());
        }
    };

    let mut recipes = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Recipe>(value) {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => warn!(index, "Skipping unreadable stored recipe: {}", e),
        }
    }
    Ok(recipes)
}
