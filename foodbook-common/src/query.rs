//! Query/view layer
//!
//! Derives the displayed subset of the recipe collection. Stateless: every call
//! recomputes from the full snapshot (filter on search AND source AND
//! favorites, then sort). The result borrows from the snapshot and is read
//! only; mutations go back to the store by recipe id.

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

use crate::models::{Recipe, SOURCE_INSTAGRAM};
use crate::Error;

/// Source-category filter
///
/// `TikTok` is the catch-all bucket: it matches every recipe whose source is
/// not exactly "Instagram", including manual entries and untagged records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFilter {
    #[default]
    All,
    TikTok,
    Instagram,
    /// Exact match on `source`
    Exact(String),
}

impl SourceFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let source = recipe.source.as_deref();
        match self {
            SourceFilter::All => true,
            SourceFilter::TikTok => source != Some(SOURCE_INSTAGRAM),
            SourceFilter::Instagram => source == Some(SOURCE_INSTAGRAM),
            SourceFilter::Exact(wanted) => source == Some(wanted.as_str()),
        }
    }
}

impl FromStr for SourceFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("empty source filter".to_string()));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "all" => SourceFilter::All,
            "tiktok" => SourceFilter::TikTok,
            "instagram" => SourceFilter::Instagram,
            _ => SourceFilter::Exact(trimmed.to_string()),
        })
    }
}

/// Display order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::NameAsc => "name-asc",
            SortOrder::NameDesc => "name-desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "name-asc" => Ok(SortOrder::NameAsc),
            "name-desc" => Ok(SortOrder::NameDesc),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

/// The three filter axes plus sort order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    /// Free text; empty matches everything
    pub search: String,
    pub source: SourceFilter,
    pub favorites_only: bool,
    pub sort: SortOrder,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    pub fn favorites_only(mut self, favorites_only: bool) -> Self {
        self.favorites_only = favorites_only;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        matches_search(recipe, &self.search)
            && self.source.matches(recipe)
            && (!self.favorites_only || recipe.favorite)
    }

    /// Filter then sort
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        let mut view: Vec<&Recipe> = recipes.iter().filter(|r| self.matches(r)).collect();
        sort_view(&mut view, self.sort);
        view
    }
}

/// Case-insensitive substring match on title, description, any ingredient or
/// any tag
pub fn matches_search(recipe: &Recipe, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let hit = |text: &str| text.to_lowercase().contains(&needle);

    recipe.title.as_deref().map(hit).unwrap_or(false)
        || recipe.description.as_deref().map(hit).unwrap_or(false)
        || recipe.ingredients.iter().any(|i| hit(i))
        || recipe.tags.iter().any(|t| hit(t))
}

/// Sort a view in place.
///
/// Date orders are stable, so equal timestamps keep insertion order either
/// way. Name descending is the exact reverse of name ascending.
pub fn sort_view(view: &mut [&Recipe], order: SortOrder) {
    match order {
        SortOrder::Oldest => view.sort_by_key(|r| r.created_at_millis()),
        SortOrder::Newest => view.sort_by_key(|r| Reverse(r.created_at_millis())),
        SortOrder::NameAsc => view.sort_by(|a, b| locale_compare(a.sort_title(), b.sort_title())),
        SortOrder::NameDesc => {
            view.sort_by(|a, b| locale_compare(a.sort_title(), b.sort_title()));
            view.reverse();
        }
    }
}

/// Locale-style string ordering: case-folded comparison first, then lowercase
/// before uppercase at the first differing character, then code points.
///
/// "apple pie" < "Banana Bread" < "banana split"; "apple" < "Apple".
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded != Ordering::Equal {
        return folded;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => return ca.cmp(&cb),
            }
        }
    }
    a.cmp(b)
}

/// Recipe picker filter used when filling a meal slot: title only
pub fn picker_candidates<'a>(recipes: &'a [Recipe], search: &str) -> Vec<&'a Recipe> {
    let needle = search.trim().to_lowercase();
    recipes
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.title
                    .as_deref()
                    .map(|t| t.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}

/// "1 recipe saved" / "3 recipes saved"
pub fn recipe_count_label(count: usize) -> String {
    format!("{} recipe{} saved", count, if count == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreatedAt;

    fn recipe(id: &str, title: &str) -> Recipe {
        Recipe {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn ids(view: &[&Recipe]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_tiktok_is_catch_all() {
        let recipes = vec![
            Recipe { id: "ig".into(), source: Some("Instagram".into()), ..Default::default() },
            Recipe { id: "manual".into(), source: Some("Manual Entry".into()), ..Default::default() },
            Recipe { id: "none".into(), source: None, ..Default::default() },
        ];

        let view = RecipeQuery::new().with_source(SourceFilter::TikTok).apply(&recipes);
        let mut got = ids(&view);
        got.sort();
        assert_eq!(got, vec!["manual", "none"]);

        let view = RecipeQuery::new().with_source(SourceFilter::Instagram).apply(&recipes);
        assert_eq!(ids(&view), vec!["ig"]);
    }

    #[test]
    fn test_exact_source_filter() {
        let recipes = vec![
            Recipe { id: "1".into(), source: Some("Manual Entry".into()), ..Default::default() },
            Recipe { id: "2".into(), source: Some("manual entry".into()), ..Default::default() },
        ];
        let filter: SourceFilter = "Manual Entry".parse().unwrap();
        assert_eq!(filter, SourceFilter::Exact("Manual Entry".into()));

        let view = RecipeQuery::new().with_source(filter).apply(&recipes);
        assert_eq!(ids(&view), vec!["1"]);
    }

    #[test]
    fn test_search_hits_ingredient_only() {
        let mut target = recipe("1", "Weeknight Pasta");
        target.ingredients = vec!["2 cloves garlic".into(), "Fresh Basil".into()];
        let mut other = recipe("2", "Pancakes");
        other.description = Some("Fluffy".into());
        other.tags = vec!["breakfast".into()];
        let recipes = vec![target, other];

        let view = RecipeQuery::new().with_search("basil").apply(&recipes);
        assert_eq!(ids(&view), vec!["1"]);
    }

    #[test]
    fn test_search_fields_are_or_combined() {
        let mut by_desc = recipe("1", "One");
        by_desc.description = Some("Smoky CHIPOTLE".into());
        let mut by_tag = recipe("2", "Two");
        by_tag.tags = vec!["chipotle".into()];
        let by_title = recipe("3", "Chipotle Bowl");
        let miss = recipe("4", "Four");
        let recipes = vec![by_desc, by_tag, by_title, miss];

        let view = RecipeQuery::new()
            .with_search("Chipotle")
            .with_sort(SortOrder::Oldest)
            .apply(&recipes);
        assert_eq!(ids(&view), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_search_matches_all_including_bare_records() {
        let recipes = vec![Recipe { id: "1".into(), ..Default::default() }];
        assert_eq!(RecipeQuery::new().with_search("  ").apply(&recipes).len(), 1);
        assert_eq!(RecipeQuery::new().with_search("x").apply(&recipes).len(), 0);
    }

    #[test]
    fn test_favorites_filter_combines_with_search() {
        let mut fav = recipe("1", "Chili");
        fav.favorite = true;
        let plain = recipe("2", "Chili Dog");
        let recipes = vec![fav, plain];

        let view = RecipeQuery::new()
            .with_search("chili")
            .favorites_only(true)
            .apply(&recipes);
        assert_eq!(ids(&view), vec!["1"]);
    }

    #[test]
    fn test_name_sort_is_locale_aware_and_reversible() {
        let recipes = vec![recipe("b", "Banana Bread"), recipe("a", "apple pie")];

        let asc = RecipeQuery::new().with_sort(SortOrder::NameAsc).apply(&recipes);
        assert_eq!(ids(&asc), vec!["a", "b"]);

        let desc = RecipeQuery::new().with_sort(SortOrder::NameDesc).apply(&recipes);
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn test_name_sort_reverse_holds_with_ties_and_missing_titles() {
        let recipes = vec![
            recipe("1", "Soup"),
            Recipe { id: "2".into(), ..Default::default() },
            recipe("3", "soup"),
            recipe("4", "Soup"),
        ];

        let asc = ids(&RecipeQuery::new().with_sort(SortOrder::NameAsc).apply(&recipes));
        assert_eq!(asc, vec!["2", "3", "1", "4"]);

        let mut desc = ids(&RecipeQuery::new().with_sort(SortOrder::NameDesc).apply(&recipes));
        desc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn test_date_sort_with_unparseable_as_epoch() {
        let mut old = recipe("old", "Old");
        old.created_at = Some(CreatedAt::Text("2023-01-01T00:00:00.000Z".into()));
        let mut new = recipe("new", "New");
        new.created_at = Some(CreatedAt::Text("2024-06-01T00:00:00.000Z".into()));
        let mut bad = recipe("bad", "Bad");
        bad.created_at = Some(CreatedAt::Text("yesterday".into()));
        let missing = recipe("missing", "Missing");
        let recipes = vec![new, bad, old, missing];

        let oldest = ids(&RecipeQuery::new().with_sort(SortOrder::Oldest).apply(&recipes));
        assert_eq!(oldest, vec!["bad", "missing", "old", "new"]);

        let newest = ids(&RecipeQuery::new().with_sort(SortOrder::Newest).apply(&recipes));
        assert_eq!(newest, vec!["new", "old", "bad", "missing"]);
    }

    #[test]
    fn test_newest_keeps_insertion_order_for_equal_timestamps() {
        let stamp = || Some(CreatedAt::Millis(1_700_000_000_000));
        let mut first = recipe("first", "First");
        first.created_at = stamp();
        let mut second = recipe("second", "Second");
        second.created_at = stamp();
        let mut later = recipe("later", "Later");
        later.created_at = Some(CreatedAt::Millis(1_800_000_000_000));
        let recipes = vec![first, second, later];

        let newest = ids(&RecipeQuery::new().with_sort(SortOrder::Newest).apply(&recipes));
        assert_eq!(newest, vec!["later", "first", "second"]);

        let oldest = ids(&RecipeQuery::new().with_sort(SortOrder::Oldest).apply(&recipes));
        assert_eq!(oldest, vec!["first", "second", "later"]);
    }

    #[test]
    fn test_locale_compare() {
        assert_eq!(locale_compare("apple pie", "Banana Bread"), Ordering::Less);
        assert_eq!(locale_compare("apple", "Apple"), Ordering::Less);
        assert_eq!(locale_compare("Apple", "apple"), Ordering::Greater);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("ALL".parse::<SourceFilter>().unwrap(), SourceFilter::All);
        assert_eq!("TikTok".parse::<SourceFilter>().unwrap(), SourceFilter::TikTok);
        assert!("".parse::<SourceFilter>().is_err());
        assert_eq!("name-desc".parse::<SortOrder>().unwrap(), SortOrder::NameDesc);
        assert!("by-color".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_picker_searches_titles_only() {
        let mut with_ingredient = recipe("1", "Salad");
        with_ingredient.ingredients = vec!["tomato".into()];
        let recipes = vec![with_ingredient, recipe("2", "Tomato Soup"), Recipe::default()];

        assert_eq!(ids(&picker_candidates(&recipes, "TOMATO")), vec!["2"]);
        assert_eq!(picker_candidates(&recipes, "").len(), 3);
    }

    #[test]
    fn test_recipe_count_label() {
        assert_eq!(recipe_count_label(0), "0 recipes saved");
        assert_eq!(recipe_count_label(1), "1 recipe saved");
        assert_eq!(recipe_count_label(12), "12 recipes saved");
    }
}
