//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use foodbook_common::{Day, MealSlot, SortOrder, SourceFilter};
use std::path::PathBuf;

/// Command-line arguments for foodbook
#[derive(Parser, Debug)]
#[command(name = "foodbook")]
#[command(about = "Save recipes from videos, photos and links, and plan your week")]
#[command(version)]
pub struct Cli {
    /// Folder holding the local database
    #[arg(long, global = true, env = "FOODBOOK_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Base URL of the recipe extraction API
    #[arg(long, global = true, env = "FOODBOOK_API_URL")]
    pub api_url: Option<String>,

    /// Timeout for outbound requests, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a recipe to the collection
    #[command(subcommand)]
    Import(ImportCommand),

    /// List saved recipes
    List(ListArgs),

    /// Show one recipe in full
    Show {
        id: String,
    },

    /// Mark a recipe as favorite (or unmark with --off)
    Favorite {
        id: String,
        #[arg(long)]
        off: bool,
    },

    /// Delete a recipe
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Weekly meal plan
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Print this installation's user id
    Whoami,

    /// Erase all local data
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImportCommand {
    /// Extract a recipe from a TikTok video link
    Tiktok { url: String },
    /// Extract a recipe from an Instagram post link
    Instagram { url: String },
    /// Extract a recipe from a recipe website
    Website { url: String },
    /// Read a recipe from a photo
    Image { path: PathBuf },
    /// Type a recipe in
    Manual(ManualArgs),
}

#[derive(Args, Debug, Default)]
pub struct ManualArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub prep_time: Option<String>,
    #[arg(long)]
    pub cook_time: Option<String>,
    #[arg(long)]
    pub servings: Option<String>,
    /// One ingredient per line
    #[arg(long, default_value = "")]
    pub ingredients: String,
    /// One step per line
    #[arg(long, default_value = "")]
    pub instructions: String,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Match title, description, ingredients or tags
    #[arg(long)]
    pub search: Option<String>,

    /// all, tiktok, instagram, or an exact source name
    #[arg(long, default_value = "all")]
    pub source: SourceFilter,

    /// Only favorites
    #[arg(long)]
    pub favorites: bool,

    /// newest, oldest, name-asc or name-desc
    #[arg(long, default_value = "newest")]
    pub sort: SortOrder,

    /// Print the matching records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Print the week
    Show {
        #[arg(long)]
        dinner_only: bool,
    },
    /// Recipes available for a slot, filtered by title
    Recipes {
        #[arg(long)]
        search: Option<String>,
    },
    /// Put a recipe in a slot
    Assign {
        day: Day,
        meal: MealSlot,
        recipe_id: String,
    },
    /// Empty one slot
    Clear { day: Day, meal: MealSlot },
    /// Empty the whole week
    ClearAll {
        #[arg(long)]
        yes: bool,
    },
    /// Empty slots whose recipe was deleted
    Compact,
    /// Ask the AI service for a week plan
    Suggest {
        /// Write the suggestion into the plan
        #[arg(long)]
        apply: bool,
    },
}
