use crate::matcher::{MatchWeights, CONFIDENCE_FLOOR};
use crate::types::{FALLBACK_LABEL, MIN_WINDOW_FRAMES, STEP_SIZE, WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid parameter {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parámetros del reconocedor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerParams {
    /// Frames por ventana (default: 15)
    pub window_size: usize,
    /// Avance entre ventanas (default: 10)
    pub step_size: usize,
    /// Puntaje que debe superar la mejor plantilla (default: 0.6)
    pub confidence_floor: f64,
    /// Etiqueta si no se reconoce nada (default: "HELLO").
    /// `None` o cadena vacía devuelven una lista vacía
    pub fallback_label: Option<String>,
    pub weights: MatchWeights,
}

impl Default for RecognizerParams {
    fn default() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            step_size: STEP_SIZE,
            confidence_floor: CONFIDENCE_FLOOR,
            fallback_label: Some(FALLBACK_LABEL.to_string()),
            weights: MatchWeights::default(),
        }
    }
}

impl RecognizerParams {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < MIN_WINDOW_FRAMES {
            return Err(ConfigError::Invalid {
                field: "window_size",
                reason: format!("debe ser >= {}, es {}", MIN_WINDOW_FRAMES, self.window_size),
            });
        }
        if self.step_size == 0 {
            return Err(ConfigError::Invalid {
                field: "step_size",
                reason: "debe ser >= 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ConfigError::Invalid {
                field: "confidence_floor",
                reason: format!("fuera de [0, 1]: {}", self.confidence_floor),
            });
        }
        Ok(())
    }
}
