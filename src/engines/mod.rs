//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

use crate::config::Config;
use crate::engine::OcrEngine;
use crate::error::LabError;
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

/// Registry of available OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all compiled-in engines initialized
    pub fn new(config: &Config) -> Result<Self, LabError> {
        #[allow(unused_mut)]
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsEngine::new(config)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            engines.push(Arc::new(leptess::LeptessEngine::new(config)?));
        }

        Self::from_engines(engines, config.default_engine.as_deref())
    }

    /// Build a registry from already-initialized engines.
    ///
    /// The default is `default_engine` when given, otherwise the first engine.
    pub fn from_engines(
        engines: Vec<Arc<dyn OcrEngine>>,
        default_engine: Option<&str>,
    ) -> Result<Self, LabError> {
        let first = engines.first().ok_or_else(|| {
            LabError::InitializationError(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string()
            )
        })?;

        let default_engine = match default_engine {
            Some(name) if engines.iter().any(|e| e.name() == name) => name.to_string(),
            Some(name) => return Err(LabError::UnknownEngine(name.to_string())),
            None => first.name().to_string(),
        };

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default(&self) -> Option<Arc<dyn OcrEngine>> {
        self.get(&self.default_engine)
    }

    /// Get the default engine name
    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::GrayImage;

    /// Engine that ignores the image and returns canned text
    pub(crate) struct FixedTextEngine {
        pub name: &'static str,
        pub text: String,
    }

    impl FixedTextEngine {
        pub(crate) fn new(name: &'static str, text: &str) -> Self {
            Self {
                name,
                text: text.to_string(),
            }
        }
    }

    impl OcrEngine for FixedTextEngine {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "Returns fixed text"
        }

        fn recognize(&self, _image: &GrayImage) -> Result<String, LabError> {
            Ok(self.text.clone())
        }

        fn supported_languages(&self) -> Vec<String> {
            vec!["eng".to_string()]
        }
    }

    fn engines() -> Vec<Arc<dyn OcrEngine>> {
        vec![
            Arc::new(FixedTextEngine::new("first", "")),
            Arc::new(FixedTextEngine::new("second", "")),
        ]
    }

    #[test]
    fn test_first_engine_is_default() {
        let registry = EngineRegistry::from_engines(engines(), None).unwrap();
        assert_eq!(registry.default_name(), "first");
        assert_eq!(registry.default().unwrap().name(), "first");
    }

    #[test]
    fn test_configured_default_engine() {
        let registry = EngineRegistry::from_engines(engines(), Some("second")).unwrap();
        assert_eq!(registry.default_name(), "second");
        assert!(registry.get("first").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_unknown_default_engine_is_rejected() {
        let result = EngineRegistry::from_engines(engines(), Some("tesseract"));
        assert!(matches!(result, Err(LabError::UnknownEngine(_))));
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let result = EngineRegistry::from_engines(Vec::new(), None);
        assert!(matches!(result, Err(LabError::InitializationError(_))));
    }

    #[test]
    fn test_info_lists_engines_in_order() {
        let registry = EngineRegistry::from_engines(engines(), None).unwrap();
        let names: Vec<&str> = registry.info().iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
