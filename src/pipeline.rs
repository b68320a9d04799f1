//! Image-to-results pipeline
//!
//! Decode, binarize, recognize, then match against the catalog. Every call
//! owns its buffers; the engine and catalog are shared read-only.

use crate::catalog::Catalog;
use crate::engine::OcrEngine;
use crate::error::LabError;
use crate::extract::{extract_lab_tests, LabTestResult};
use crate::preprocessing::Pipeline;
use std::sync::Arc;
use std::time::Instant;

pub struct LabReportProcessor {
    engine: Arc<dyn OcrEngine>,
    catalog: Arc<Catalog>,
    preprocessing: Pipeline,
}

impl LabReportProcessor {
    pub fn new(engine: Arc<dyn OcrEngine>, catalog: Arc<Catalog>) -> Self {
        Self {
            engine,
            catalog,
            preprocessing: Pipeline::new(),
        }
    }

    /// Extract lab test results from encoded image bytes.
    ///
    /// Zero matches is a successful empty list. Decode and OCR failures
    /// abort with [`LabError::ProcessingError`].
    pub fn process_lab_image(&self, image_bytes: &[u8]) -> Result<Vec<LabTestResult>, LabError> {
        let text = self.recognize_text(image_bytes)?;
        let results = extract_lab_tests(&text, &self.catalog);

        tracing::info!(
            "Identified {} lab tests using {}",
            results.len(),
            self.engine.name()
        );

        Ok(results)
    }

    fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, LabError> {
        let start = Instant::now();

        let decoded = image::load_from_memory(image_bytes)
            .map_err(|e| LabError::ProcessingError(format!("Failed to decode image: {}", e)))?;

        let preprocessed = self.preprocessing.process(decoded)?;
        let text = self.engine.recognize(&preprocessed.image)?;

        tracing::info!(
            "OCR completed in {}ms (preprocessing {}ms), text length: {}",
            start.elapsed().as_millis(),
            preprocessed.total_time_ms,
            text.len()
        );
        tracing::debug!("Recognized text: {:?}", text);

        Ok(text)
    }
}
