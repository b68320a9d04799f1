//! Lab test extraction from recognized text

use crate::catalog::{Catalog, TestDefinition};
use crate::range::is_out_of_range;
use serde::Serialize;

/// A structured measurement found in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabTestResult {
    pub test_name: String,
    /// Captured verbatim to keep the report's decimal formatting
    pub test_value: String,
    pub bio_reference_range: String,
    pub test_unit: String,
    pub lab_test_out_of_range: bool,
}

/// Match every catalog definition against the full text.
///
/// Results follow catalog order. Definitions that don't match are skipped,
/// and only the first occurrence of each test is taken.
pub fn extract_lab_tests(text: &str, catalog: &Catalog) -> Vec<LabTestResult> {
    let results: Vec<LabTestResult> = catalog
        .definitions()
        .iter()
        .filter_map(|definition| match_definition(text, definition))
        .collect();

    tracing::debug!(
        "Matched {} of {} catalog tests",
        results.len(),
        catalog.len()
    );

    results
}

fn match_definition(text: &str, definition: &TestDefinition) -> Option<LabTestResult> {
    let captures = definition.pattern.captures(text)?;
    let value = captures.get(1)?.as_str().to_string();

    // Canonical unit wins over the OCR'd one
    let unit = definition
        .unit
        .clone()
        .or_else(|| captures.get(2).map(|m| m.as_str().to_string()))
        .unwrap_or_default();

    let out_of_range = is_out_of_range(&value, &definition.reference_range);

    Some(LabTestResult {
        test_name: definition.name.clone(),
        test_value: value,
        bio_reference_range: definition.reference_range.clone(),
        test_unit: unit,
        lab_test_out_of_range: out_of_range,
    })
}
