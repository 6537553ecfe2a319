use crate::config::{ConfigError, RecognizerParams};
use crate::feature_extractor;
use crate::matcher::{MatchOutcome, Matcher};
use crate::template_db::TemplateDatabase;
use crate::types::Frame;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Resultado de una ventana del segmentador
#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    /// Índice del primer frame de la ventana
    pub start: usize,
    pub outcome: MatchOutcome,
}

/// Reconocedor de señas: extracción + matching por ventanas deslizantes.
/// No guarda estado entre llamadas; la base se comparte en solo lectura.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    database: Arc<TemplateDatabase>,
    matcher: Matcher,
    params: RecognizerParams,
}

impl GestureRecognizer {
    pub fn new(
        database: impl Into<Arc<TemplateDatabase>>,
        params: RecognizerParams,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self {
            database: database.into(),
            matcher: Matcher::new(params.weights, params.confidence_floor),
            params,
        })
    }

    pub fn with_defaults(database: impl Into<Arc<TemplateDatabase>>) -> Self {
        let params = RecognizerParams::default();
        Self {
            database: database.into(),
            matcher: Matcher::new(params.weights, params.confidence_floor),
            params,
        }
    }

    /// Carga la base desde disco; si falta o es inválida se usa una base vacía
    pub fn from_database_path(
        path: impl AsRef<Path>,
        params: RecognizerParams,
    ) -> Result<Self, ConfigError> {
        Self::new(TemplateDatabase::load_or_empty(path), params)
    }

    pub fn database(&self) -> &TemplateDatabase {
        &self.database
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn params(&self) -> &RecognizerParams {
        &self.params
    }

    /// Mejor coincidencia de una ventana, con su puntaje
    pub fn match_window(&self, window: &[Frame]) -> MatchOutcome {
        match feature_extractor::extract(window) {
            Some(features) => self.matcher.best_match(&features, &self.database),
            None => MatchOutcome::NoMatch,
        }
    }

    /// Reconoce una ventana individual
    pub fn recognize_gesture(&self, window: &[Frame]) -> Option<String> {
        self.match_window(window).into_name()
    }

    /// Resultado de cada ventana completa, sin deduplicar.
    /// Los frames sobrantes tras la última ventana completa se descartan.
    pub fn recognize_windows(&self, frames: &[Frame]) -> Vec<WindowResult> {
        let window_size = self.params.window_size;
        if frames.len() < window_size {
            return Vec::new();
        }

        (0..=frames.len() - window_size)
            .step_by(self.params.step_size)
            .map(|start| WindowResult {
                start,
                outcome: self.match_window(&frames[start..start + window_size]),
            })
            .collect()
    }

    /// Secuencia de señas reconocidas sin repeticiones consecutivas.
    /// Si no se reconoce nada devuelve la etiqueta de respaldo (si está configurada).
    pub fn recognize_sequence(&self, frames: &[Frame]) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();

        for result in self.recognize_windows(frames) {
            debug!("[SEQ] ventana {}: {:?}", result.start, result.outcome);
            // Un NoMatch no reinicia la deduplicación
            if let Some(word) = result.outcome.into_name() {
                if words.last() != Some(&word) {
                    words.push(word);
                }
            }
        }

        if words.is_empty() {
            let fallback = self.params.fallback_label.as_ref().filter(|l| !l.is_empty());
            if let Some(fallback) = fallback {
                words.push(fallback.clone());
            }
        }

        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::fixtures::*;
    use crate::template_db::Template;

    fn full_template(name: &str, shape: &str) -> Template {
        Template::new(name)
            .with_shape(shape)
            .with_velocity(0.0)
            .with_two_hands(false)
            .with_direction("vertical_down")
            .with_smoothness(1.0)
    }

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::with_defaults(TemplateDatabase::from_templates(vec![
            full_template("OPEN", "open"),
            full_template("FIST", "fist"),
        ]))
    }

    #[test]
    fn windows_step_over_full_windows_only() {
        let rec = recognizer();
        let frames = vec![right_only(open_hand(0.5, 0.5)); 36];
        let starts: Vec<usize> = rec
            .recognize_windows(&frames)
            .iter()
            .map(|w| w.start)
            .collect();
        assert_eq!(starts, vec![0, 10, 20]);

        assert!(rec.recognize_windows(&frames[..14]).is_empty());
        assert_eq!(rec.recognize_windows(&frames[..15]).len(), 1);
    }

    #[test]
    fn short_stream_returns_fallback() {
        let rec = recognizer();
        let frames = vec![right_only(open_hand(0.5, 0.5)); 14];
        assert_eq!(rec.recognize_sequence(&frames), vec!["HELLO".to_string()]);
        assert_eq!(rec.recognize_sequence(&[]), vec!["HELLO".to_string()]);
    }

    #[test]
    fn consecutive_duplicates_are_collapsed() {
        let rec = recognizer();
        let mut frames = vec![right_only(open_hand(0.5, 0.5)); 25];
        frames.extend(vec![right_only(fist(0.5, 0.5)); 20]);
        frames.extend(vec![right_only(open_hand(0.5, 0.5)); 20]);

        let words = rec.recognize_sequence(&frames);
        assert!(words.windows(2).all(|w| w[0] != w[1]), "{words:?}");
        assert_eq!(words.first().map(String::as_str), Some("OPEN"));
        assert!(words.contains(&"FIST".to_string()));
    }

    #[test]
    fn no_match_does_not_reset_deduplication() {
        let rec = recognizer();
        let mut frames = vec![right_only(open_hand(0.5, 0.5)); 15];
        // Ventana de frames vacíos en el medio: no coincide con nada
        frames.extend(vec![Frame::default(); 25]);
        frames.extend(vec![right_only(open_hand(0.5, 0.5)); 15]);

        let outcomes: Vec<Option<String>> = rec
            .recognize_windows(&frames)
            .into_iter()
            .map(|w| w.outcome.into_name())
            .collect();
        assert!(outcomes.contains(&None));
        assert_eq!(rec.recognize_sequence(&frames), vec!["OPEN".to_string()]);
    }

    #[test]
    fn fallback_can_be_disabled() {
        let params = RecognizerParams {
            fallback_label: None,
            ..RecognizerParams::default()
        };
        let rec = GestureRecognizer::new(TemplateDatabase::empty(), params).unwrap();
        assert!(rec.recognize_sequence(&[]).is_empty());
    }

    #[test]
    fn single_window_recognition() {
        let rec = recognizer();
        let window = vec![right_only(fist(0.3, 0.3)); 15];
        assert_eq!(rec.recognize_gesture(&window).as_deref(), Some("FIST"));
        assert_eq!(rec.recognize_gesture(&window[..2]), None);
    }
}
