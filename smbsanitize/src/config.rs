use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::pipeline::Rule;

pub const DEFAULT_UGLY_CHARACTERS: &str = "\"|\\:*?<>";
pub const DEFAULT_REPLACEMENT: char = '_';
pub const DEFAULT_FOLDER_SKIPLIST: &[&str] = &[".AppleDouble"];

/// Fully resolved settings for one run. Read-only once the walk starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rules: Vec<Rule>,
    pub ugly_characters: String,
    pub replacement: char,
    pub folder_skiplist: BTreeSet<String>,
    pub file_skiplist: BTreeSet<String>,
    pub files: bool,
    pub directories: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
            ugly_characters: DEFAULT_UGLY_CHARACTERS.to_string(),
            replacement: DEFAULT_REPLACEMENT,
            folder_skiplist: DEFAULT_FOLDER_SKIPLIST
                .iter()
                .map(|name| name.to_string())
                .collect(),
            file_skiplist: BTreeSet::new(),
            files: true,
            directories: true,
            dry_run: true,
            verbose: false,
        }
    }
}

/// Settings as they appear in a config file or on the command line. An
/// absent key keeps whatever the previous layer decided.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialSettings {
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    #[serde(default)]
    pub ugly_characters: Option<String>,
    #[serde(default)]
    pub replacement: Option<String>,
    #[serde(default)]
    pub folder_skiplist: Option<Vec<String>>,
    #[serde(default)]
    pub file_skiplist: Option<Vec<String>>,
    pub files: Option<bool>,
    pub directories: Option<bool>,
    pub apply: Option<bool>,
    pub verbose: Option<bool>,
}

pub fn load_config(path: &Path) -> Result<PartialSettings> {
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let parsed = if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
    {
        serde_json::from_slice(&data).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_slice(&data).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        }
        .into()
    })
}

impl Settings {
    /// Layers `overrides` on top of `self` and validates the result.
    pub fn merge(&self, overrides: &PartialSettings) -> Result<Settings, ConfigError> {
        let mut merged = self.clone();
        if let Some(rules) = &overrides.rules {
            merged.rules = rules.clone();
        }
        if let Some(ugly) = &overrides.ugly_characters {
            merged.ugly_characters = dedup_chars(ugly);
        }
        if let Some(replacement) = &overrides.replacement {
            merged.replacement = parse_replacement(replacement)?;
        }
        if let Some(skip) = &overrides.folder_skiplist {
            merged.folder_skiplist = skip.iter().cloned().collect();
        }
        if let Some(skip) = &overrides.file_skiplist {
            merged.file_skiplist = skip.iter().cloned().collect();
        }
        if let Some(files) = overrides.files {
            merged.files = files;
        }
        if let Some(directories) = overrides.directories {
            merged.directories = directories;
        }
        if let Some(apply) = overrides.apply {
            merged.dry_run = !apply;
        }
        if let Some(verbose) = overrides.verbose {
            merged.verbose = verbose;
        }
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let replacement = self.replacement;
        if matches!(replacement, '/' | '\0') {
            return Err(ConfigError::ReplacementForbidden(replacement));
        }
        if let Some(bad) = self.ugly_characters.chars().find(|&c| matches!(c, '/' | '\0')) {
            return Err(ConfigError::UglyForbidden(bad));
        }
        if self.ugly_characters.contains(replacement) {
            return Err(ConfigError::ReplacementIsUgly(replacement));
        }
        if self.ugly_characters.is_empty() && self.rules.contains(&Rule::UglyCharacters) {
            return Err(ConfigError::EmptyUglySet);
        }
        if !self.files && !self.directories {
            return Err(ConfigError::NothingSelected);
        }
        Ok(())
    }
}

fn parse_replacement(value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(ConfigError::ReplacementLength(value.to_string())),
    }
}

fn dedup_chars(value: &str) -> String {
    let mut seen = BTreeSet::new();
    value.chars().filter(|ch| seen.insert(*ch)).collect()
}
