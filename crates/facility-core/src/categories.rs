use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Rating-count floor applied when a profile does not set one.
pub const DEFAULT_MIN_RATING_COUNT: u32 = 5;

/// Categories with a curated built-in keyword list.
pub const BUILTIN_CATEGORIES: &[&str] = &["hospital", "pharmacy"];

const HOSPITAL_KEYWORDS: &[&str] = &[
    "Hospital", "Medical", "Clinic", "Center", "Health", "Urgent", "Regional", "General",
    "Children", "ER",
];

const PHARMACY_KEYWORDS: &[&str] = &[
    "Pharmacy", "Drug", "Drugs", "Drugstore", "Chemist", "Apothecary", "Rx",
];

/// Classifier tuning for one facility category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub name: String,
    /// Tokens that mark a person-like name as a real facility
    /// ("Mercy General" vs "John Smith").
    pub keywords: Vec<String>,
    #[serde(default = "default_min_rating_count")]
    pub min_rating_count: u32,
}

fn default_min_rating_count() -> u32 {
    DEFAULT_MIN_RATING_COUNT
}

impl CategoryProfile {
    /// Built-in profile for `category`.
    ///
    /// Known categories get a curated keyword list; anything else derives its
    /// keywords from the category name itself (`fire_station` -> `Fire`,
    /// `Station`).
    #[must_use]
    pub fn builtin(category: &str) -> Self {
        let keywords = match category {
            "hospital" => to_owned_list(HOSPITAL_KEYWORDS),
            "pharmacy" => to_owned_list(PHARMACY_KEYWORDS),
            other => other
                .split(['_', ' ', '-'])
                .filter(|s| !s.is_empty())
                .map(capitalize)
                .collect(),
        };
        Self {
            name: category.to_string(),
            keywords,
            min_rating_count: DEFAULT_MIN_RATING_COUNT,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryProfile>,
}

impl CategoriesFile {
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategoryProfile> {
        self.categories
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(category))
    }
}

/// Pick the profile for `category`: the file entry when present, else the
/// built-in one.
#[must_use]
pub fn resolve_profile(file: Option<&CategoriesFile>, category: &str) -> CategoryProfile {
    file.and_then(|f| f.get(category))
        .cloned()
        .unwrap_or_else(|| CategoryProfile::builtin(category))
}

/// Load and validate category profiles from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_categories(&content)
}

fn parse_categories(content: &str) -> Result<CategoriesFile, ConfigError> {
    let file: CategoriesFile =
        serde_yaml::from_str(content).map_err(ConfigError::CategoriesFileParse)?;
    validate_categories(&file)?;
    Ok(file)
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for profile in &file.categories {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        if profile.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' must list at least one keyword",
                profile.name
            )));
        }

        if !seen.insert(profile.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{}'",
                profile.name
            )));
        }
    }

    Ok(())
}

fn to_owned_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
