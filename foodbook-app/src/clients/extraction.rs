//! Recipe extraction API client
//!
//! Sends a source (video link, website link or image payload) plus the user id
//! to the extraction service and turns the reply into a [`Recipe`]. Manual
//! entries are handled locally and never touch the network.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use foodbook_common::models::CreatedAt;
use foodbook_common::{uuid_utils, Recipe, RecipeStore};
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::manual::ManualEntry;
use crate::error::{ImportError, ImportResult, GENERIC_EXTRACTION_FAILURE};

const USER_AGENT: &str = concat!("foodbook/", env!("CARGO_PKG_VERSION"));

/// Where a recipe comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TikTok,
    Instagram,
    Image,
    Website,
    Manual,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::TikTok => "tiktok",
            SourceKind::Instagram => "instagram",
            SourceKind::Image => "image",
            SourceKind::Website => "website",
            SourceKind::Manual => "manual",
        }
    }

    /// Path under the API base; `None` for local-only kinds
    pub fn endpoint(&self) -> Option<&'static str> {
        match self {
            SourceKind::TikTok => Some("tiktok/auto-extract"),
            SourceKind::Instagram => Some("instagram/auto-extract"),
            SourceKind::Image => Some("image/extract"),
            SourceKind::Website => Some("website/auto-extract"),
            SourceKind::Manual => None,
        }
    }

    /// JSON field carrying the source payload
    pub fn payload_key(&self) -> Option<&'static str> {
        match self {
            SourceKind::TikTok => Some("tiktokUrl"),
            SourceKind::Instagram => Some("instagramUrl"),
            SourceKind::Image => Some("imageData"),
            SourceKind::Website => Some("websiteUrl"),
            SourceKind::Manual => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Ok(SourceKind::TikTok),
            "instagram" => Ok(SourceKind::Instagram),
            "image" => Ok(SourceKind::Image),
            "website" => Ok(SourceKind::Website),
            "manual" => Ok(SourceKind::Manual),
            other => Err(ImportError::Validation(format!("Unknown source kind: {}", other))),
        }
    }
}

/// One import request
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionRequest {
    TikTok { url: String },
    Instagram { url: String },
    Website { url: String },
    /// `data:<mime>;base64,...` payload
    Image { data_url: String },
    Manual(ManualEntry),
}

impl ExtractionRequest {
    pub fn kind(&self) -> SourceKind {
        match self {
            ExtractionRequest::TikTok { .. } => SourceKind::TikTok,
            ExtractionRequest::Instagram { .. } => SourceKind::Instagram,
            ExtractionRequest::Website { .. } => SourceKind::Website,
            ExtractionRequest::Image { .. } => SourceKind::Image,
            ExtractionRequest::Manual(_) => SourceKind::Manual,
        }
    }

    /// Reject blank input before anything is sent
    pub fn validate(&self) -> ImportResult<()> {
        let missing = match self {
            ExtractionRequest::TikTok { url } if url.trim().is_empty() => {
                "Please enter a TikTok URL"
            }
            ExtractionRequest::Instagram { url } if url.trim().is_empty() => {
                "Please enter an Instagram URL"
            }
            ExtractionRequest::Website { url } if url.trim().is_empty() => {
                "Please enter a website URL"
            }
            ExtractionRequest::Image { data_url } if data_url.trim().is_empty() => {
                "Please upload an image first"
            }
            ExtractionRequest::Manual(entry) => return entry.validate(),
            _ => return Ok(()),
        };
        Err(ImportError::Validation(missing.to_string()))
    }

    /// Request body for networked kinds
    pub fn body(&self, user_id: &str) -> Option<Value> {
        let payload = match self {
            ExtractionRequest::TikTok { url }
            | ExtractionRequest::Instagram { url }
            | ExtractionRequest::Website { url } => url.trim(),
            ExtractionRequest::Image { data_url } => data_url.as_str(),
            ExtractionRequest::Manual(_) => return None,
        };
        let key = self.kind().payload_key()?;

        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), json!(payload));
        body.insert("userId".to_string(), json!(user_id));
        Some(Value::Object(body))
    }
}

/// Extraction API client
pub struct ExtractionClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ExtractionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ImportResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ImportError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Turn a request into a recipe record.
    ///
    /// Validation runs first. The returned record always has an id, a user id
    /// and a creation time.
    pub async fn extract(&self, request: &ExtractionRequest, user_id: &str) -> ImportResult<Recipe> {
        request.validate()?;

        if let ExtractionRequest::Manual(entry) = request {
            return entry.clone().into_recipe(user_id);
        }

        let (Some(endpoint), Some(body)) = (request.kind().endpoint(), request.body(user_id)) else {
            return Err(ImportError::Validation(format!(
                "{} sources cannot be extracted remotely",
                request.kind()
            )));
        };

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(kind = %request.kind(), url = %url, "Requesting recipe extraction");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;

        let recipe = interpret_response(status.as_u16(), &text)?;
        Ok(complete_recipe(recipe, user_id))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ImportError {
        if e.is_timeout() {
            warn!("Extraction request timed out after {:?}", self.timeout);
            ImportError::Timeout(self.timeout)
        } else {
            ImportError::Network(e.to_string())
        }
    }
}

/// Extract a recipe and append it through the store.
///
/// Returns the record as persisted (inline thumbnail already cleared).
pub async fn import_recipe(
    client: &ExtractionClient,
    store: &mut RecipeStore,
    request: &ExtractionRequest,
    user_id: &str,
) -> ImportResult<Recipe> {
    let recipe = client.extract(request, user_id).await?;
    let id = recipe.id.clone();

    store.append(recipe).await?;
    info!(kind = %request.kind(), id = %id, "Recipe imported");

    store
        .get(&id)
        .cloned()
        .ok_or_else(|| ImportError::Store(foodbook_common::Error::NotFound(format!("recipe {}", id))))
}

/// Interpret an extraction reply.
///
/// Non-2xx and falsy `success` are failures carrying the server `error` text
/// when present.
pub fn interpret_response(status: u16, body: &str) -> ImportResult<Recipe> {
    let success_status = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if success_status => {
            return Err(ImportError::InvalidResponse(format!("body is not JSON: {}", e)))
        }
        Err(_) => {
            return Err(ImportError::Api {
                status,
                message: GENERIC_EXTRACTION_FAILURE.to_string(),
            })
        }
    };

    let server_error = || {
        value
            .get("error")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(GENERIC_EXTRACTION_FAILURE)
            .to_string()
    };

    if !success_status {
        return Err(ImportError::Api {
            status,
            message: server_error(),
        });
    }

    if !value.get("success").map(is_truthy).unwrap_or(false) {
        return Err(ImportError::Rejected(server_error()));
    }

    match value.get("recipe") {
        Some(recipe) if recipe.is_object() => serde_json::from_value(recipe.clone())
            .map_err(|e| ImportError::InvalidResponse(format!("malformed recipe: {}", e))),
        _ => Err(ImportError::InvalidResponse("response has no recipe".to_string())),
    }
}

/// Fill in id, owner and creation time when the service left them out
pub fn complete_recipe(mut recipe: Recipe, user_id: &str) -> Recipe {
    if recipe.id.trim().is_empty() {
        recipe.id = uuid_utils::new_recipe_id();
    }
    if recipe.user_id.as_deref().map_or(true, |u| u.trim().is_empty()) {
        recipe.user_id = Some(user_id.to_string());
    }
    if recipe.created_at.is_none() {
        recipe.created_at = Some(CreatedAt::now());
    }
    recipe
}

/// Read an image file and encode it as a data URL
pub async fn load_image(path: &Path) -> ImportResult<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ImportError::Validation(format!("Could not read image {}: {}", path.display(), e))
    })?;
    image_data_url(&bytes)
}

/// Encode image bytes as `data:<mime>;base64,...`.
///
/// The MIME type is sniffed from the content and must be `image/*`.
pub fn image_data_url(bytes: &[u8]) -> ImportResult<String> {
    if bytes.is_empty() {
        return Err(ImportError::Validation("Please upload an image first".to_string()));
    }

    let mime = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .ok_or_else(|| ImportError::Validation("Please select an image file".to_string()))?;

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    #[test]
    fn test_endpoints_and_payload_keys() {
        assert_eq!(SourceKind::TikTok.endpoint(), Some("tiktok/auto-extract"));
        assert_eq!(SourceKind::Instagram.payload_key(), Some("instagramUrl"));
        assert_eq!(SourceKind::Image.endpoint(), Some("image/extract"));
        assert_eq!(SourceKind::Website.payload_key(), Some("websiteUrl"));
        assert_eq!(SourceKind::Manual.endpoint(), None);
        assert_eq!("TikTok".parse::<SourceKind>().unwrap(), SourceKind::TikTok);
        assert!("fax".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_blank_input_fails_validation() {
        let blank = [
            ExtractionRequest::TikTok { url: "  ".into() },
            ExtractionRequest::Instagram { url: "".into() },
            ExtractionRequest::Website { url: "\n".into() },
            ExtractionRequest::Image { data_url: "".into() },
            ExtractionRequest::Manual(ManualEntry::default()),
        ];
        for request in &blank {
            assert!(request.validate().unwrap_err().is_validation(), "{:?}", request);
        }

        let ok = ExtractionRequest::TikTok { url: "https://tiktok.com/@a/video/1".into() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_body_carries_payload_and_user() {
        let request = ExtractionRequest::Instagram { url: " https://instagram.com/p/x ".into() };
        assert_eq!(
            request.body("user_1").unwrap(),
            json!({"instagramUrl": "https://instagram.com/p/x", "userId": "user_1"})
        );
        assert!(ExtractionRequest::Manual(ManualEntry::new("Soup")).body("user_1").is_none());
    }

    #[test]
    fn test_interpret_success() {
        let recipe = interpret_response(
            200,
            r#"{"success": true, "recipe": {"id": "r1", "title": "Tacos", "source": "TikTok", "calories": 500}}"#,
        )
        .unwrap();
        assert_eq!(recipe.id, "r1");
        assert_eq!(recipe.title.as_deref(), Some("Tacos"));
        assert_eq!(recipe.extra.get("calories"), Some(&json!(500)));
    }

    #[test]
    fn test_interpret_rejection_uses_server_text() {
        match interpret_response(200, r#"{"success": false, "error": "Video is private"}"#) {
            Err(ImportError::Rejected(msg)) => assert_eq!(msg, "Video is private"),
            other => panic!("unexpected: {:?}", other),
        }
        match interpret_response(200, r#"{"success": false}"#) {
            Err(ImportError::Rejected(msg)) => assert_eq!(msg, "Failed to extract recipe"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_interpret_http_failure() {
        match interpret_response(502, "<html>Bad gateway</html>") {
            Err(ImportError::Api { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "Failed to extract recipe");
            }
            other => panic!("unexpected: {:?}", other),
        }
        match interpret_response(422, r#"{"error": "Unsupported link"}"#) {
            Err(ImportError::Api { message, .. }) => assert_eq!(message, "Unsupported link"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_interpret_missing_recipe() {
        assert!(matches!(
            interpret_response(200, r#"{"success": true}"#),
            Err(ImportError::InvalidResponse(_))
        ));
        assert!(matches!(
            interpret_response(200, "not json"),
            Err(ImportError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_complete_recipe_fills_gaps() {
        let recipe = complete_recipe(Recipe::default(), "user_9");
        assert!(!recipe.id.is_empty());
        assert_eq!(recipe.user_id.as_deref(), Some("user_9"));
        assert!(recipe.created_at.is_some());

        let kept = complete_recipe(
            Recipe {
                id: "r1".into(),
                user_id: Some("user_1".into()),
                created_at: Some(CreatedAt::Millis(5)),
                ..Default::default()
            },
            "user_9",
        );
        assert_eq!(kept.id, "r1");
        assert_eq!(kept.user_id.as_deref(), Some("user_1"));
        assert_eq!(kept.created_at, Some(CreatedAt::Millis(5)));
    }

    #[test]
    fn test_image_data_url() {
        let url = image_data_url(&PNG_HEADER).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        assert!(image_data_url(b"just some text").unwrap_err().is_validation());
        assert!(image_data_url(&[]).unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_manual_extract_is_local() {
        // Unroutable base: any network use would fail
        let client = ExtractionClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut entry = ManualEntry::new("Soup");
        entry.ingredients = "water\n\nsalt".into();

        let recipe = client
            .extract(&ExtractionRequest::Manual(entry), "user_1")
            .await
            .unwrap();
        assert_eq!(recipe.ingredients, vec!["water", "salt"]);
        assert_eq!(recipe.source.as_deref(), Some("Manual Entry"));
    }
}
