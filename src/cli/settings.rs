//! `blogchat set` / `blogchat unset` handling.

use std::fmt;

use crate::core::config::data::Config;
use crate::utils::url::validate_base_url;

pub const SETTING_KEYS: [&str; 4] = ["base-url", "randomness", "stream", "log-file"];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided value could not be parsed as a boolean.
    InvalidBoolean(String),
    /// The provided randomness is not a number between 0 and 1.
    InvalidRandomness(String),
    /// The provided base URL is not an http(s) URL.
    InvalidUrl(String),
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Available keys: {}", SETTING_KEYS.join(", "));
            }
            SettingError::InvalidBoolean(input) => {
                eprintln!("❌ Invalid boolean value: {input}");
                eprintln!("   Use 'on' or 'off' (also accepts true/false, yes/no)");
            }
            SettingError::InvalidRandomness(input) => {
                eprintln!("❌ Invalid randomness: {input}");
                eprintln!("   Use a number between 0.0 and 1.0");
            }
            SettingError::InvalidUrl(reason) => {
                eprintln!("❌ Invalid base URL: {reason}");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidBoolean(input) => write!(f, "Invalid boolean value: {input}"),
            SettingError::InvalidRandomness(input) => write!(f, "Invalid randomness: {input}"),
            SettingError::InvalidUrl(reason) => write!(f, "Invalid base URL: {reason}"),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
        }
    }
}

impl std::error::Error for SettingError {}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub(crate) fn parse_randomness(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| (0.0..=1.0).contains(value))
}

/// Applies `blogchat set <key> <args...>` to `config` and returns the message
/// to show on success.
pub fn apply_set(config: &mut Config, key: &str, args: &[String]) -> Result<String, SettingError> {
    let input = args.join(" ");
    let input = input.trim();

    match key {
        "base-url" => {
            if input.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify the URL of the blog-generation API",
                    example: "blogchat set base-url http://localhost:8000",
                });
            }
            validate_base_url(input).map_err(SettingError::InvalidUrl)?;
            config.base_url = Some(input.to_string());
            Ok(format!("✅ Set base-url to: {input}"))
        }
        "randomness" => {
            if input.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify a randomness between 0.0 and 1.0",
                    example: "blogchat set randomness 0.8",
                });
            }
            let value = parse_randomness(input)
                .ok_or_else(|| SettingError::InvalidRandomness(input.to_string()))?;
            config.randomness = Some(value);
            Ok(format!("✅ Set randomness to: {value}"))
        }
        "stream" => {
            if input.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify 'on' or 'off'",
                    example: "blogchat set stream off",
                });
            }
            let value =
                parse_bool(input).ok_or_else(|| SettingError::InvalidBoolean(input.to_string()))?;
            config.stream = Some(value);
            Ok(format!("✅ Set stream to: {}", format_bool(value)))
        }
        "log-file" => {
            if input.is_empty() {
                return Err(SettingError::MissingArgs {
                    hint: "Specify the transcript file to append to",
                    example: "blogchat set log-file ~/blogchat.md",
                });
            }
            config.log_file = Some(input.to_string());
            Ok(format!("✅ Set log-file to: {input}"))
        }
        _ => Err(SettingError::UnknownKey(key.to_string())),
    }
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "base-url" => config.base_url = None,
        "randomness" => config.randomness = None,
        "stream" => config.stream = None,
        "log-file" => config.log_file = None,
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(format!("✅ Unset {key}"))
}
