//! AI meal plan suggestion client
//!
//! Sends the current recipe titles to a Messages-API style completion service
//! and parses the weekly plan it returns. The result is advisory; applying it
//! is the Meal Plan Store's job.

use foodbook_common::WeeklySuggestion;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SuggestionSettings;
use crate::error::{ImportError, ImportResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    block_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Suggestion service client
pub struct SuggestionClient {
    http_client: reqwest::Client,
    settings: SuggestionSettings,
    timeout: Duration,
}

impl SuggestionClient {
    pub fn new(settings: SuggestionSettings, timeout: Duration) -> ImportResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImportError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            timeout,
        })
    }

    /// Ask for a weekly plan built from `titles`.
    ///
    /// An empty list fails before any request. Transport, status and parse
    /// failures all come back as [`ImportError::Suggestion`] (or `Timeout`).
    pub async fn suggest(&self, titles: &[String]) -> ImportResult<WeeklySuggestion> {
        let titles: Vec<&str> = titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if titles.is_empty() {
            return Err(ImportError::Validation(
                "No recipes yet! Add some recipes to your collection first.".to_string(),
            ));
        }

        let prompt = build_prompt(&titles);
        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        debug!(endpoint = %self.settings.endpoint, recipes = titles.len(), "Requesting meal plan suggestions");

        let mut builder = self.http_client.post(&self.settings.endpoint).json(&request);
        if let Some(key) = &self.settings.api_key {
            builder = builder
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ImportError::Timeout(self.timeout)
            } else {
                ImportError::Suggestion(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Suggestion service error: {}", error_text);
            return Err(ImportError::Suggestion(format!("service returned {}", status)));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ImportError::Suggestion(format!("unreadable response: {}", e)))?;

        let text = first_text_block(&body)
            .ok_or_else(|| ImportError::Suggestion("response has no text content".to_string()))?;

        parse_suggestion(text)
    }
}

/// Prompt asking for one breakfast, lunch and dinner per day
pub fn build_prompt(titles: &[&str]) -> String {
    format!(
        "My recipe collection: {}\n\
         \n\
         Plan a balanced week of meals using ONLY recipes from that list. \
         For each day from Monday to Sunday choose a breakfast, a lunch and a dinner.\n\
         \n\
         Aim for:\n\
         - Variety: avoid repeating a recipe\n\
         - Balance: mix proteins, vegetables and carbohydrates\n\
         - Coverage: use as many different recipes as possible\n\
         \n\
         Reply with JSON only, no markdown, covering all 7 days:\n\
         {{\n  \"Monday\": {{\"breakfast\": \"Recipe Name\", \"lunch\": \"Recipe Name\", \"dinner\": \"Recipe Name\"}},\n  ...\n}}",
        titles.join(", ")
    )
}

/// Parse model output into a suggestion
pub fn parse_suggestion(text: &str) -> ImportResult<WeeklySuggestion> {
    let payload = extract_json_payload(text)
        .ok_or_else(|| ImportError::Suggestion("no JSON object in response".to_string()))?;

    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| ImportError::Suggestion(format!("invalid JSON: {}", e)))?;

    WeeklySuggestion::from_value(&value).map_err(|e| ImportError::Suggestion(e.to_string()))
}

/// Outermost `{...}` in the text, ignoring code fences and prose around it
pub fn extract_json_payload(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn first_text_block(body: &MessagesResponse) -> Option<&str> {
    body.content
        .iter()
        .filter(|block| block.block_type.as_deref().map_or(true, |t| t == "text"))
        .find_map(|block| block.text.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbook_common::{Day, MealSlot};

    #[test]
    fn test_prompt_embeds_titles() {
        let prompt = build_prompt(&["Tacos", "Pho"]);
        assert!(prompt.starts_with("My recipe collection: Tacos, Pho\n"));
        assert!(prompt.contains("ONLY"));
        assert!(prompt.contains("\"Monday\""));
    }

    #[test]
    fn test_extract_json_payload() {
        assert_eq!(extract_json_payload("```json\n{\"a\": 1}\n```"), Some("{\"a\": 1}"));
        assert_eq!(
            extract_json_payload("Here you go:\n{\"a\": {\"b\": 2}}\nEnjoy!"),
            Some("{\"a\": {\"b\": 2}}")
        );
        assert_eq!(extract_json_payload("no json here"), None);
        assert_eq!(extract_json_payload("} backwards {"), None);
    }

    #[test]
    fn test_parse_fenced_suggestion() {
        let text = "```json\n{\"Monday\": {\"breakfast\": \"Oats\", \"dinner\": \"Chili\"}}\n```";
        let suggestion = parse_suggestion(text).unwrap();
        assert_eq!(suggestion.get(Day::Monday, MealSlot::Dinner), Some("Chili"));
        assert_eq!(suggestion.get(Day::Monday, MealSlot::Lunch), None);
    }

    #[test]
    fn test_parse_garbage_is_suggestion_error() {
        assert!(matches!(parse_suggestion("Sorry, I can't."), Err(ImportError::Suggestion(_))));
        assert!(matches!(parse_suggestion("{not json}"), Err(ImportError::Suggestion(_))));
    }

    #[test]
    fn test_first_text_block_skips_other_types() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "tool_use", "id": "x"}, {"type": "text", "text": "{}"}]}"#,
        )
        .unwrap();
        assert_eq!(first_text_block(&body), Some("{}"));

        let empty: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert_eq!(first_text_block(&empty), None);
    }

    #[tokio::test]
    async fn test_empty_titles_never_sent() {
        let client = SuggestionClient::new(
            SuggestionSettings {
                endpoint: "http://127.0.0.1:9/v1/messages".to_string(),
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.suggest(&["  ".to_string()]).await.unwrap_err();
        assert!(err.is_validation());
    }
}
