use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

pub const LANG_KEY: &str = "lang";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::It => "it",
        }
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "it" => Ok(Language::It),
            other => Err(AppError::Validation(format!(
                "unsupported language '{}' (expected en or it)",
                other
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(AppError::Validation(format!(
                "unsupported theme '{}' (expected light or dark)",
                other
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences. Loaded once at startup and handed to whatever needs
/// them; saved explicitly after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub lang: Language,
    pub theme: Theme,
}

impl Settings {
    /// Build settings from stored key/value pairs. Unknown or missing
    /// values fall back to the defaults.
    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self {
            lang: stored_or_default(&map, LANG_KEY),
            theme: stored_or_default(&map, THEME_KEY),
        }
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(LANG_KEY.into(), self.lang.to_string());
        map.insert(THEME_KEY.into(), self.theme.to_string());
        map
    }
}

fn stored_or_default<T>(map: &HashMap<String, String>, key: &str) -> T
where
    T: FromStr<Err = AppError> + Default,
{
    match map.get(key) {
        Some(value) => value.parse().unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Ignoring stored setting");
            T::default()
        }),
        None => T::default(),
    }
}
