use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::LazyLock};

/// Placeholder patterns that mark a key as not actually configured.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)YOUR_|REPLACE_ME|CHANGE_ME").unwrap());

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// An `appid` query parameter that already carries a value.
static APPID_WITH_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)appid=[^{\s]+").unwrap());

/// Candidate configuration sources, checked in fixed precedence:
/// an explicitly injected value, a value embedded in the deployed page
/// (config.local.js / meta tag), then a deployment override.
///
/// `force_public` clears the value before resolution runs, so the public
/// no-key providers are used even when a key is present.
#[derive(Debug, Clone, Default)]
pub struct KeySources {
    pub injected: Option<String>,
    pub embedded: Option<String>,
    pub fallback: Option<String>,
    pub force_public: bool,
}

impl KeySources {
    /// First non-empty candidate, or the empty string when none is set.
    pub fn resolve(&self) -> String {
        if self.force_public {
            return String::new();
        }

        [&self.injected, &self.embedded, &self.fallback]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// How a configuration value will be used to build requests. Derived from
/// the value on every use, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Nothing configured.
    Empty,
    /// A placeholder that was never replaced with a real key.
    Placeholder,
    /// An absolute http(s) URL to be used as a request template.
    Template,
    /// An opaque API key string.
    LiteralKey,
}

pub fn classify(value: &str) -> KeyClass {
    if value.is_empty() {
        return KeyClass::Empty;
    }
    // A template with an embedded appid value is usable no matter what
    // placeholder text appears elsewhere in it.
    if ABSOLUTE_URL.is_match(value) && APPID_WITH_VALUE.is_match(value) {
        return KeyClass::Template;
    }
    if PLACEHOLDER.is_match(value) {
        return KeyClass::Placeholder;
    }
    if ABSOLUTE_URL.is_match(value) {
        return KeyClass::Template;
    }
    KeyClass::LiteralKey
}

/// Key rendered safe for log output: first and last four characters.
pub fn masked(key: &str) -> String {
    match (key.get(..4), key.get(key.len().saturating_sub(4)..)) {
        _ if key.is_empty() => "(none)".to_string(),
        (Some(head), Some(tail)) if key.len() > 8 => format!("{head}...{tail}"),
        _ => key.to_string(),
    }
}

/// API key saved on disk by `skydash configure`, for runs where nothing
/// was injected on the command line and no config.local.js is around.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoredConfig {
    pub api_key: Option<String>,
}

impl StoredConfig {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: StoredConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skydash", "skydash-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_injected_value() {
        let sources = KeySources {
            injected: Some("abc123".to_string()),
            embedded: Some("embedded".to_string()),
            fallback: Some("stored".to_string()),
            force_public: false,
        };
        assert_eq!(sources.resolve(), "abc123");
    }

    #[test]
    fn resolve_skips_empty_candidates() {
        let sources = KeySources {
            injected: Some(String::new()),
            embedded: None,
            fallback: Some("stored".to_string()),
            force_public: false,
        };
        assert_eq!(sources.resolve(), "stored");
    }

    #[test]
    fn resolve_defaults_to_empty() {
        assert_eq!(KeySources::default().resolve(), "");
    }

    #[test]
    fn force_public_clears_everything() {
        let sources = KeySources {
            injected: Some("abc123".to_string()),
            force_public: true,
            ..KeySources::default()
        };
        assert_eq!(sources.resolve(), "");
    }

    #[test]
    fn classify_empty_and_literal() {
        assert_eq!(classify(""), KeyClass::Empty);
        assert_eq!(classify("abc123"), KeyClass::LiteralKey);
    }

    #[test]
    fn classify_placeholders_case_insensitive() {
        assert_eq!(classify("YOUR_OPENWEATHERMAP_API_KEY"), KeyClass::Placeholder);
        assert_eq!(classify("your_key_here"), KeyClass::Placeholder);
        assert_eq!(classify("replace_me"), KeyClass::Placeholder);
        assert_eq!(classify("please-CHANGE_ME-now"), KeyClass::Placeholder);
    }

    #[test]
    fn classify_templates() {
        assert_eq!(classify("https://proxy.example/w?lat={lat}&lon={lon}"), KeyClass::Template);
        assert_eq!(classify("HTTP://proxy.example/w"), KeyClass::Template);
    }

    #[test]
    fn embedded_appid_beats_placeholder_text() {
        // The appid value itself looks like a placeholder, but an embedded
        // credential makes the template usable as-is.
        let value = "https://proxy.example/w?appid=YOUR_KEY_REPLACE_ME";
        assert_eq!(classify(value), KeyClass::Template);
    }

    #[test]
    fn placeholder_url_without_appid_is_placeholder() {
        let value = "https://proxy.example/w?note=CHANGE_ME";
        assert_eq!(classify(value), KeyClass::Placeholder);
    }

    #[test]
    fn classify_is_idempotent() {
        for value in ["", "abc123", "YOUR_KEY", "https://proxy.example/w?appid=k"] {
            assert_eq!(classify(value), classify(value));
        }
    }

    #[test]
    fn masked_hides_the_middle() {
        assert_eq!(masked(""), "(none)");
        assert_eq!(masked("short"), "short");
        assert_eq!(masked("abcd1234efgh"), "abcd...efgh");
    }
}
