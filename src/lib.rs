//! Reconocimiento de señas a partir de landmarks de mano.
//!
//! Flujo: ventanas deslizantes (`recognizer`) → extracción de características
//! (`feature_extractor`) → comparación contra plantillas (`matcher`, `template_db`).

pub mod config;
pub mod csv_loader;
pub mod feature_extractor;
pub mod geometry;
pub mod matcher;
pub mod recognizer;
pub mod template_db;
pub mod types;

pub use config::RecognizerParams;
pub use feature_extractor::{FeatureBundle, HandShape};
pub use matcher::{MatchOutcome, Matcher};
pub use recognizer::GestureRecognizer;
pub use template_db::{Template, TemplateDatabase};
pub use types::{Frame, HandLandmarks, HandSide, Point3};
