//! Recipe record
//!
//! Field names are persisted in camelCase. Reading is lenient (missing fields
//! are absent, `null` lists are empty, numeric ids become strings) and fields
//! this crate does not model are carried through untouched in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Title shown for a recipe without one
pub const DEFAULT_TITLE: &str = "Untitled Recipe";

/// Source label shown for a recipe without one
pub const DEFAULT_SOURCE: &str = "Recipe";

pub const SOURCE_TIKTOK: &str = "TikTok";
pub const SOURCE_INSTAGRAM: &str = "Instagram";
pub const SOURCE_MANUAL: &str = "Manual Entry";

/// Prefix identifying an inline image encoding
const INLINE_IMAGE_PREFIX: &str = "data:image";

const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// A persisted recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique key within the collection
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<Servings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,

    /// Steps in execution order
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Remote link only; inline encodings are cleared before persisting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub favorite: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAt>,

    /// Fields returned by the extraction service that are not modelled here
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Serving count, stored either as text ("4-6") or as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Servings {
    Count(serde_json::Number),
    Text(String),
}

impl fmt::Display for Servings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Servings::Count(n) => write!(f, "{}", n),
            Servings::Text(s) => f.write_str(s),
        }
    }
}

/// Creation timestamp, ISO-8601 text or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedAt {
    Millis(i64),
    Text(String),
}

impl CreatedAt {
    pub fn now() -> Self {
        CreatedAt::Text(crate::time::now_iso())
    }

    /// Epoch milliseconds, `None` when the text does not parse
    pub fn timestamp_millis(&self) -> Option<i64> {
        match self {
            CreatedAt::Millis(ms) => Some(*ms),
            CreatedAt::Text(text) => crate::time::parse_timestamp_millis(text),
        }
    }
}

impl Recipe {
    /// Title for display, substituting the default for a missing or blank one
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => DEFAULT_TITLE,
        }
    }

    /// Title used as a sort key: missing sorts as the empty string
    pub fn sort_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn source_label(&self) -> &str {
        match self.source.as_deref() {
            Some(source) if !source.is_empty() => source,
            _ => DEFAULT_SOURCE,
        }
    }

    /// Creation time in epoch milliseconds; missing or unparseable is epoch 0
    pub fn created_at_millis(&self) -> i64 {
        self.created_at
            .as_ref()
            .and_then(CreatedAt::timestamp_millis)
            .unwrap_or(0)
    }

    /// Whether the thumbnail is an inline image encoding rather than a link
    pub fn has_inline_thumbnail(&self) -> bool {
        self.thumbnail_url
            .as_deref()
            .map(|url| url.trim_start().starts_with(INLINE_IMAGE_PREFIX))
            .unwrap_or(false)
    }

    /// Clear an inline thumbnail to the empty string. Returns true if cleared.
    pub fn strip_inline_thumbnail(&mut self) -> bool {
        if self.has_inline_thumbnail() {
            self.thumbnail_url = Some(String::new());
            true
        } else {
            false
        }
    }

    /// First 100 characters of the description, with "..." when truncated
    pub fn description_preview(&self) -> Option<String> {
        let description = self.description.as_deref().filter(|d| !d.is_empty())?;
        if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
            let head: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            Some(format!("{}...", head))
        } else {
            Some(description.to_string())
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text or JSON number, read as text; `null` reads as empty
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
