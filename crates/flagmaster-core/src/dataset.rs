//! TOML reference dataset loader.
//!
//! Loads country records from TOML files, ships a built-in set, and checks
//! that a set can actually be played before an engine is built on it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::QuizError;
use crate::model::{CountryRecord, Stage, MAX_LEVEL};
use crate::options::OPTION_COUNT;

/// Records a tier should hold for questions to feel varied.
pub const MIN_RECORDS_PER_TIER: usize = 10;

/// The embedded dataset source, as shipped.
pub const BUILTIN_DATASET: &str = include_str!("../data/countries.toml");

/// Intermediate TOML structure for parsing dataset files.
#[derive(Debug, Deserialize)]
struct TomlDatasetFile {
    #[serde(default)]
    countries: Vec<CountryRecord>,
}

/// The immutable set of countries a game is played from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    countries: Vec<CountryRecord>,
}

impl Dataset {
    pub fn new(countries: Vec<CountryRecord>) -> Self {
        Self { countries }
    }

    /// The embedded hundred-country set, ten per tier.
    pub fn builtin() -> Result<Self> {
        parse_dataset_str(BUILTIN_DATASET, Path::new("<builtin>"))
    }

    pub fn countries(&self) -> &[CountryRecord] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Countries whose difficulty equals `tier`, in dataset order.
    pub fn in_tier(&self, tier: u8) -> Vec<&CountryRecord> {
        self.countries
            .iter()
            .filter(|c| c.difficulty == tier)
            .collect()
    }

    /// Number of countries per difficulty tier.
    pub fn tier_counts(&self) -> BTreeMap<u8, usize> {
        let mut counts = BTreeMap::new();
        for country in &self.countries {
            *counts.entry(country.difficulty).or_insert(0) += 1;
        }
        counts
    }
}

/// Parse a single TOML file into a `Dataset`.
pub fn parse_dataset(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset file: {}", path.display()))?;

    parse_dataset_str(&content, path)
}

/// Parse a TOML string into a `Dataset` (useful for testing).
pub fn parse_dataset_str(content: &str, source_path: &Path) -> Result<Dataset> {
    let parsed: TomlDatasetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Dataset::new(parsed.countries))
}

/// A non-fatal issue found while validating a dataset.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The country name (if applicable).
    pub country: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a dataset.
///
/// Returns an error when some question could not be built at all, and
/// warnings for data that is playable but suspicious.
pub fn validate_dataset(set: &Dataset) -> Result<Vec<ValidationWarning>, QuizError> {
    for country in set.countries() {
        if !(1..=MAX_LEVEL).contains(&country.difficulty) {
            return Err(QuizError::InvalidTier {
                country: country.name.clone(),
                tier: country.difficulty,
            });
        }
    }

    let counts = set.tier_counts();
    for tier in 1..=MAX_LEVEL {
        if counts.get(&tier).copied().unwrap_or(0) == 0 {
            return Err(QuizError::EmptyTier(tier));
        }
    }

    for stage in [Stage::Name, Stage::Capital, Stage::Currency] {
        let distinct: HashSet<&str> = set.countries().iter().map(|c| c.answer_for(stage)).collect();
        if distinct.len() < OPTION_COUNT {
            return Err(QuizError::InsufficientDistractors {
                stage,
                available: distinct.len().saturating_sub(1),
            });
        }
    }

    let mut warnings = Vec::new();

    for (tier, count) in &counts {
        if *count < MIN_RECORDS_PER_TIER {
            warnings.push(ValidationWarning {
                country: None,
                message: format!(
                    "tier {tier} has {count} countries, at least {MIN_RECORDS_PER_TIER} recommended"
                ),
            });
        }
    }

    // Check for duplicate names and ISO codes
    let mut seen_names = HashSet::new();
    let mut seen_codes = HashSet::new();
    for country in set.countries() {
        if !seen_names.insert(country.name.as_str()) {
            warnings.push(ValidationWarning {
                country: Some(country.name.clone()),
                message: format!("duplicate country name: {}", country.name),
            });
        }
        if !seen_codes.insert(country.iso_code.to_lowercase()) {
            warnings.push(ValidationWarning {
                country: Some(country.name.clone()),
                message: format!("duplicate ISO code: {}", country.iso_code),
            });
        }
    }

    for country in set.countries() {
        let blank = [
            ("name", &country.name),
            ("iso_code", &country.iso_code),
            ("capital", &country.capital),
            ("currency", &country.currency),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect::<Vec<_>>();
        if !blank.is_empty() {
            warnings.push(ValidationWarning {
                country: Some(country.name.clone()),
                message: format!("blank field(s): {}", blank.join(", ")),
            });
        }
    }

    Ok(warnings)
}
