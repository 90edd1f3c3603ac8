//! Data models and structures
//!
//! Defines the content parts sent to the model, the display artifacts
//! produced from its answer, and runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One atomic unit of a multi-modal prompt.
///
/// Serializes to the Gemini wire shape: `{"text": ..}` or
/// `{"inlineData": {"mimeType": .., "data": ..}}`. Variant order matters for
/// `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    InlineMedia {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload paired with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl ContentPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(text),
            ContentPart::InlineMedia { .. } => None,
        }
    }
}

/// Markdown explanation plus a literal code block, separated by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    /// Markdown source of the explanation.
    pub explanation: String,
    /// Explanation after rendering, or the source when no renderer exists.
    pub explanation_html: String,
    pub code: String,
    pub code_language_hint: String,
    /// Highlighted markup for `code`, when a highlighter is available.
    pub code_html: Option<String>,
}

/// Final display artifact of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutput {
    Code {
        code: String,
        language_hint: Option<String>,
        highlighted: Option<String>,
    },
    Markdown {
        source: String,
        html: String,
    },
    Split(SplitResult),
}

/// Presentation state of the workbench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Loading,
    Error(String),
    Success,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub key_file: Option<PathBuf>,
    pub dry_run: bool,
}

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            key_file: None,
            dry_run: false,
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!(
                    "GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let dry_run = lookup("DRY_RUN")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            model: lookup("GEMINI_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            key_file: lookup("GEMINI_WORKBENCH_KEY_FILE").map(PathBuf::from),
            dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_text_part_serialization() {
        let part = ContentPart::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hello" }));
    }

    #[test]
    fn test_inline_part_serialization() {
        let part = ContentPart::InlineMedia {
            inline_data: InlineData {
                mime_type: "image/png".to_string(),
                data: "AAEC".to_string(),
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "inlineData": { "mimeType": "image/png", "data": "AAEC" } })
        );

        let back: ContentPart = serde_json::from_value(json).unwrap();
        assert_eq!(back, part);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.key_file.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_TIMEOUT_SECS", "15"),
            ("DRY_RUN", "true"),
            ("GEMINI_WORKBENCH_KEY_FILE", "/tmp/key"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.dry_run);
        assert_eq!(config.key_file, Some(PathBuf::from("/tmp/key")));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(|name| {
            (name == "GEMINI_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
