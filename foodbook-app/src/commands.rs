//! Command dispatch
//!
//! Each subcommand is one user action. Data output goes to `out`; the final
//! outcome comes back as a [`StatusMessage`]. Import and suggestion failures
//! become error statuses, while storage failures propagate as errors.

use anyhow::{Context, Result};
use foodbook_common::db::{init_database, LocalStorage};
use foodbook_common::query::{picker_candidates, recipe_count_label};
use foodbook_common::store::get_or_init_user_id;
use foodbook_common::{
    Day, MealPlanStore, MealRef, MealSlot, Recipe, RecipeQuery, RecipeStore, WeeklySuggestion,
};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::{Command, ImportCommand, ListArgs, ManualArgs, PlanCommand};
use crate::clients::extraction::load_image;
use crate::clients::{import_recipe, ExtractionClient, ExtractionRequest, ManualEntry, SuggestionClient};
use crate::config::ClientSettings;
use crate::error::ImportError;
use crate::status::StatusMessage;

/// An opened local data folder plus client settings
pub struct App {
    storage: LocalStorage,
    settings: ClientSettings,
    user_id: String,
}

impl App {
    /// Open (or create) the database under `root_folder`
    pub async fn open(root_folder: &Path, settings: ClientSettings) -> Result<Self> {
        let db_path = foodbook_common::config::database_path(root_folder);
        let pool = init_database(&db_path)
            .await
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        Self::with_storage(LocalStorage::new(pool), settings).await
    }

    pub async fn with_storage(storage: LocalStorage, settings: ClientSettings) -> Result<Self> {
        let user_id = get_or_init_user_id(&storage).await?;
        debug!(user_id = %user_id, "Using local identity");
        Ok(Self {
            storage,
            settings,
            user_id,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Run one command
    pub async fn execute<W: Write, R: BufRead>(
        &self,
        command: Command,
        out: &mut W,
        input: &mut R,
    ) -> Result<StatusMessage> {
        match command {
            Command::Import(import) => self.import(import, out).await,
            Command::List(args) => self.list(args, out).await,
            Command::Show { id } => self.show(&id, out).await,
            Command::Favorite { id, off } => self.favorite(&id, !off).await,
            Command::Delete { id, yes } => self.delete(&id, yes, out, input).await,
            Command::Plan(plan) => self.plan(plan, out, input).await,
            Command::Whoami => {
                writeln!(out, "{}", self.user_id)?;
                Ok(StatusMessage::success(format!("User id: {}", self.user_id)))
            }
            Command::Reset { yes } => {
                if !yes && !confirm("Erase all recipes, the meal plan and your user id?", out, input)? {
                    return Ok(StatusMessage::success("Nothing erased"));
                }
                self.storage.clear().await?;
                info!("Local data erased");
                Ok(StatusMessage::success("All local data erased"))
            }
        }
    }

    async fn import<W: Write>(&self, import: ImportCommand, out: &mut W) -> Result<StatusMessage> {
        let (request, loading, done) = match import {
            ImportCommand::Tiktok { url } => (
                ExtractionRequest::TikTok { url },
                Some("Extracting recipe..."),
                "Recipe extracted successfully!",
            ),
            ImportCommand::Instagram { url } => (
                ExtractionRequest::Instagram { url },
                Some("Extracting recipe..."),
                "Recipe extracted successfully!",
            ),
            ImportCommand::Website { url } => (
                ExtractionRequest::Website { url },
                Some("Extracting recipe..."),
                "Recipe extracted successfully!",
            ),
            ImportCommand::Image { path } => {
                let data_url = match load_image(&path).await {
                    Ok(data_url) => data_url,
                    Err(e) => return Ok(StatusMessage::from(&e)),
                };
                (
                    ExtractionRequest::Image { data_url },
                    Some("Reading recipe from image..."),
                    "Recipe scanned successfully!",
                )
            }
            ImportCommand::Manual(args) => (
                ExtractionRequest::Manual(manual_entry(args)),
                None,
                "Recipe saved successfully!",
            ),
        };

        if let Err(e) = request.validate() {
            return Ok(StatusMessage::from(&e));
        }

        let client = ExtractionClient::new(&self.settings.api_base_url, self.settings.request_timeout)?;
        let mut store = RecipeStore::open(self.storage.clone()).await?;

        if let Some(loading) = loading {
            writeln!(out, "{}", StatusMessage::loading(loading))?;
        }

        match import_recipe(&client, &mut store, &request, &self.user_id).await {
            Ok(recipe) => {
                writeln!(out, "{}", summary_line(&recipe))?;
                Ok(StatusMessage::success(done))
            }
            Err(ImportError::Store(e)) => Err(e.into()),
            Err(e) => {
                info!(kind = %request.kind(), "Import failed: {}", e);
                Ok(StatusMessage::from(&e))
            }
        }
    }

    async fn list<W: Write>(&self, args: ListArgs, out: &mut W) -> Result<StatusMessage> {
        let store = RecipeStore::open(self.storage.clone()).await?;
        let query = RecipeQuery::new()
            .with_search(args.search.unwrap_or_default())
            .with_source(args.source)
            .favorites_only(args.favorites)
            .with_sort(args.sort);
        let view = query.apply(store.recipes());

        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
        } else {
            writeln!(out, "{}", recipe_count_label(view.len()))?;
            for recipe in &view {
                writeln!(out, "{}", summary_line(recipe))?;
                if let Some(preview) = recipe.description_preview() {
                    writeln!(out, "    {}", preview)?;
                }
            }
        }

        if view.is_empty() {
            Ok(StatusMessage::success("No recipes found"))
        } else {
            Ok(StatusMessage::success(format!("Showing {} of {}", view.len(), store.len())))
        }
    }

    async fn show<W: Write>(&self, id: &str, out: &mut W) -> Result<StatusMessage> {
        let store = RecipeStore::open(self.storage.clone()).await?;
        let Some(recipe) = store.get(id) else {
            return Ok(not_found(id));
        };

        write_recipe(recipe, out)?;
        Ok(StatusMessage::success(recipe.display_title().to_string()))
    }

    async fn favorite(&self, id: &str, value: bool) -> Result<StatusMessage> {
        let mut store = RecipeStore::open(self.storage.clone()).await?;
        if store.get(id).is_none() {
            return Ok(not_found(id));
        }

        store.set_favorite(id, value).await?;
        Ok(StatusMessage::success(if value {
            "Added to favorites"
        } else {
            "Removed from favorites"
        }))
    }

    async fn delete<W: Write, R: BufRead>(
        &self,
        id: &str,
        yes: bool,
        out: &mut W,
        input: &mut R,
    ) -> Result<StatusMessage> {
        let mut store = RecipeStore::open(self.storage.clone()).await?;
        let Some(title) = store.get(id).map(|r| r.display_title().to_string()) else {
            return Ok(not_found(id));
        };

        if !yes && !confirm(&format!("Delete \"{}\"?", title), out, input)? {
            return Ok(StatusMessage::success("Nothing deleted"));
        }

        store.delete(id).await?;
        Ok(StatusMessage::success(format!("Deleted \"{}\"", title)))
    }

    async fn plan<W: Write, R: BufRead>(
        &self,
        command: PlanCommand,
        out: &mut W,
        input: &mut R,
    ) -> Result<StatusMessage> {
        let mut plans = MealPlanStore::open(self.storage.clone()).await?;

        match command {
            PlanCommand::Show { dinner_only } => {
                let recipes = RecipeStore::open(self.storage.clone()).await?;
                write_plan(&plans, recipes.recipes(), dinner_only, out)?;
                Ok(StatusMessage::success(format!(
                    "{} of 21 meals planned",
                    plans.plan().filled_count()
                )))
            }
            PlanCommand::Recipes { search } => {
                let recipes = RecipeStore::open(self.storage.clone()).await?;
                let candidates = picker_candidates(recipes.recipes(), search.as_deref().unwrap_or(""));
                for recipe in &candidates {
                    writeln!(out, "{}", summary_line(recipe))?;
                }
                if candidates.is_empty() {
                    Ok(StatusMessage::success("No recipes found"))
                } else {
                    Ok(StatusMessage::success(format!("{} recipes available", candidates.len())))
                }
            }
            PlanCommand::Assign { day, meal, recipe_id } => {
                let recipes = RecipeStore::open(self.storage.clone()).await?;
                let Some(recipe) = recipes.get(&recipe_id) else {
                    return Ok(not_found(&recipe_id));
                };
                plans.assign(day, meal, recipe).await?;
                Ok(StatusMessage::success(format!(
                    "Added \"{}\" to {} {}",
                    recipe.display_title(),
                    day,
                    meal.label()
                )))
            }
            PlanCommand::Clear { day, meal } => {
                plans.clear(day, meal).await?;
                Ok(StatusMessage::success(format!("Cleared {} {}", day, meal.label())))
            }
            PlanCommand::ClearAll { yes } => {
                if !yes && !confirm("Clear the entire week's meal plan?", out, input)? {
                    return Ok(StatusMessage::success("Meal plan unchanged"));
                }
                plans.clear_all().await?;
                Ok(StatusMessage::success("Meal plan cleared"))
            }
            PlanCommand::Compact => {
                let recipes = RecipeStore::open(self.storage.clone()).await?;
                let cleared = plans.compact(recipes.recipes()).await?;
                Ok(StatusMessage::success(format!(
                    "Removed {} stale meal{}",
                    cleared,
                    if cleared == 1 { "" } else { "s" }
                )))
            }
            PlanCommand::Suggest { apply } => self.suggest(&mut plans, apply, out).await,
        }
    }

    async fn suggest<W: Write>(
        &self,
        plans: &mut MealPlanStore,
        apply: bool,
        out: &mut W,
    ) -> Result<StatusMessage> {
        let recipes = RecipeStore::open(self.storage.clone()).await?;
        let titles: Vec<String> = recipes
            .recipes()
            .iter()
            .filter_map(|r| r.title.clone())
            .collect();

        let client = SuggestionClient::new(self.settings.suggestion.clone(), self.settings.request_timeout)?;
        if titles.iter().any(|t| !t.trim().is_empty()) {
            writeln!(
                out,
                "{}",
                StatusMessage::loading("Analyzing your recipes and generating suggestions...")
            )?;
        }

        let suggestion = match client.suggest(&titles).await {
            Ok(suggestion) => suggestion,
            Err(e) => return Ok(StatusMessage::from(&e)),
        };
        write_suggestion(&suggestion, out)?;

        if !apply {
            return Ok(StatusMessage::success("Run with --apply to use this plan"));
        }

        let report = plans.apply_suggestion(&suggestion, recipes.recipes()).await?;
        for skipped in &report.unresolved {
            writeln!(
                out,
                "  skipped {} {}: no recipe named \"{}\"",
                skipped.day,
                skipped.meal.label(),
                skipped.title
            )?;
        }
        Ok(StatusMessage::success(format!(
            "AI suggestions applied to your meal plan ({} meals)",
            report.applied
        )))
    }
}

fn manual_entry(args: ManualArgs) -> ManualEntry {
    ManualEntry {
        title: args.title,
        description: args.description,
        prep_time: args.prep_time,
        cook_time: args.cook_time,
        servings: args.servings,
        ingredients: args.ingredients,
        instructions: args.instructions,
    }
}

fn not_found(id: &str) -> StatusMessage {
    StatusMessage::error(format!("Recipe not found: {}", id))
}

/// Ask a yes/no question; anything but "y"/"yes" is no
pub fn confirm<W: Write, R: BufRead>(question: &str, out: &mut W, input: &mut R) -> Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn summary_line(recipe: &Recipe) -> String {
    format!(
        "{}  {}{}  [{}]",
        recipe.id,
        if recipe.favorite { "* " } else { "" },
        recipe.display_title(),
        recipe.source_label()
    )
}

fn write_recipe<W: Write>(recipe: &Recipe, out: &mut W) -> Result<()> {
    writeln!(out, "{}{}", recipe.display_title(), if recipe.favorite { "  *" } else { "" })?;
    writeln!(out, "Source: {}", recipe.source_label())?;
    if let Some(url) = recipe.source_url.as_deref().filter(|u| !u.is_empty()) {
        writeln!(out, "Link: {}", url)?;
    }
    if let Some(description) = recipe.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "\n{}", description)?;
    }

    let facts: Vec<String> = [
        recipe.prep_time.as_ref().map(|t| format!("Prep: {}", t)),
        recipe.cook_time.as_ref().map(|t| format!("Cook: {}", t)),
        recipe.servings.as_ref().map(|s| format!("Serves: {}", s)),
        recipe.difficulty.as_ref().map(|d| format!("Difficulty: {}", d)),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !facts.is_empty() {
        writeln!(out, "\n{}", facts.join(" | "))?;
    }

    if !recipe.ingredients.is_empty() {
        writeln!(out, "\nIngredients:")?;
        for ingredient in &recipe.ingredients {
            writeln!(out, "  - {}", ingredient)?;
        }
    }
    if !recipe.instructions.is_empty() {
        writeln!(out, "\nInstructions:")?;
        for (step, instruction) in recipe.instructions.iter().enumerate() {
            writeln!(out, "  {}. {}", step + 1, instruction)?;
        }
    }
    if let Some(notes) = recipe.notes.as_deref().filter(|n| !n.is_empty()) {
        writeln!(out, "\nNotes: {}", notes)?;
    }
    if !recipe.tags.is_empty() {
        writeln!(out, "\nTags: {}", recipe.tags.join(", "))?;
    }
    Ok(())
}

fn write_plan<W: Write>(
    plans: &MealPlanStore,
    recipes: &[Recipe],
    dinner_only: bool,
    out: &mut W,
) -> Result<()> {
    let plan = plans.plan();

    if dinner_only {
        for (day, slot) in plan.dinner_only() {
            writeln!(out, "{:<10} {}", day, plan_cell(slot, recipes))?;
        }
        return Ok(());
    }

    for day in Day::ALL {
        writeln!(out, "{}", day)?;
        for meal in MealSlot::ALL {
            writeln!(out, "  {:<10} {}", meal.label(), plan_cell(plan.get(day, meal), recipes))?;
        }
    }
    Ok(())
}

/// Slot text; references to deleted recipes keep their copied title
fn plan_cell(slot: Option<&MealRef>, recipes: &[Recipe]) -> String {
    match slot {
        Some(slot) if recipes.iter().any(|r| r.id == slot.id) => slot.display_title().to_string(),
        Some(slot) => format!("{} (deleted)", slot.display_title()),
        None => "-".to_string(),
    }
}

fn write_suggestion<W: Write>(suggestion: &WeeklySuggestion, out: &mut W) -> Result<()> {
    for day in Day::ALL {
        let Some(meals) = suggestion.day(day) else {
            continue;
        };
        writeln!(out, "{}", day)?;
        for meal in MealSlot::ALL {
            if let Some(title) = meals.get(meal) {
                writeln!(out, "  {:<10} {}", meal.label(), title)?;
            }
        }
    }
    Ok(())
}
