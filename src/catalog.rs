//! Catalog of known lab tests
//!
//! Each definition pairs a display name with an OCR-tolerant pattern whose
//! first capture group is the numeric value and whose optional second group
//! is the unit as printed on the report. The catalog is built once at
//! startup and handed to the matcher explicitly.

use crate::error::LabError;
use crate::range::ReferenceRange;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;

/// Built-in catalog entries: (name, pattern, unit, reference range)
const BUILTIN_TESTS: &[(&str, &str, &str, &str)] = &[
    (
        "HB ESTIMATION",
        r"HB\s+ESTIMATION\s*[:=]?\s*(\d+\.?\d*)\s*(g/dL)",
        "g/dL",
        "12.0-15.0",
    ),
    (
        "PCV (PACKED CELL VOLUME)",
        r"PCV\s*\(?PACKED\s+CELL\s+VOLUME\)?\s*[:=]?\s*(\d+\.?\d*)\s*(%)",
        "%",
        "36.0-46.0",
    ),
    (
        "RBC COUNT",
        r"RBC\s+COUNT\s*[:=]?\s*(\d+\.?\d*)\s*(million/cmm)",
        "million/cmm",
        "4.5-5.5",
    ),
    (
        "WBC COUNT",
        r"WBC\s+COUNT\s*[:=]?\s*(\d+\.?\d*)\s*(cells/cmm|/cmm)",
        "/cmm",
        "4000-11000",
    ),
    (
        "PLATELET COUNT",
        r"PLATELET\s+COUNT\s*[:=]?\s*(\d+\.?\d*)\s*(lakhs/cmm|/cmm)",
        "lakhs/cmm",
        "1.5-4.5",
    ),
];

/// A single known lab test
#[derive(Debug, Clone)]
pub struct TestDefinition {
    pub name: String,
    pub pattern: Regex,
    /// Canonical unit; when absent the unit captured from the text is used
    pub unit: Option<String>,
    pub reference_range: String,
}

impl TestDefinition {
    pub fn new(
        name: &str,
        pattern: &str,
        unit: Option<&str>,
        reference_range: &str,
    ) -> Result<Self, LabError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| LabError::CatalogError(format!("Invalid pattern for '{}': {}", name, e)))?;

        // captures_len counts the implicit whole-match group
        let groups = pattern.captures_len() - 1;
        if !(1..=2).contains(&groups) {
            return Err(LabError::CatalogError(format!(
                "Pattern for '{}' must have one or two capture groups, found {}",
                name, groups
            )));
        }

        let range = ReferenceRange::parse(reference_range).map_err(|e| {
            LabError::CatalogError(format!("Invalid reference range for '{}': {}", name, e))
        })?;
        if range.min > range.max {
            return Err(LabError::CatalogError(format!(
                "Reference range for '{}' has minimum {} above maximum {}",
                name, range.min, range.max
            )));
        }

        Ok(Self {
            name: name.to_string(),
            pattern,
            unit: unit.map(str::to_string),
            reference_range: reference_range.to_string(),
        })
    }
}

/// On-disk form of a catalog entry
#[derive(Debug, Deserialize)]
struct TestDefinitionEntry {
    name: String,
    pattern: String,
    #[serde(default)]
    unit: Option<String>,
    reference_range: String,
}

/// Ordered, read-only list of test definitions
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<TestDefinition>,
}

impl Catalog {
    pub fn new(definitions: Vec<TestDefinition>) -> Self {
        Self { definitions }
    }

    /// The catalog shipped with the server
    pub fn builtin() -> Result<Self, LabError> {
        let definitions = BUILTIN_TESTS
            .iter()
            .map(|(name, pattern, unit, range)| {
                TestDefinition::new(name, pattern, Some(*unit), range)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(definitions))
    }

    /// Parse a JSON array of `{name, pattern, unit?, reference_range}` objects
    pub fn from_json_str(json: &str) -> Result<Self, LabError> {
        let entries: Vec<TestDefinitionEntry> = serde_json::from_str(json)
            .map_err(|e| LabError::CatalogError(format!("Invalid catalog JSON: {}", e)))?;

        let definitions = entries
            .iter()
            .map(|entry| {
                TestDefinition::new(
                    &entry.name,
                    &entry.pattern,
                    entry.unit.as_deref(),
                    &entry.reference_range,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(definitions))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LabError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            LabError::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Load from `path` if given, otherwise use the built-in catalog
    pub fn load(path: Option<&Path>) -> Result<Self, LabError> {
        let catalog = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::builtin()?,
        };

        tracing::info!(
            "Loaded {} test definitions ({})",
            catalog.len(),
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        );

        Ok(catalog)
    }

    pub fn definitions(&self) -> &[TestDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
