use crate::feature_extractor::FeatureBundle;
use crate::template_db::{Template, TemplateDatabase};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Puntaje mínimo (estricto) para aceptar una plantilla
pub const CONFIDENCE_FLOOR: f64 = 0.6;
/// Divisor de normalización para diferencias de velocidad
pub const VELOCITY_TOLERANCE: f64 = 0.5;
/// Divisor de normalización para diferencias de altura
pub const HEIGHT_TOLERANCE: f64 = 0.3;
/// Divisor de normalización para diferencias de distancia entre manos
pub const DISTANCE_TOLERANCE: f64 = 0.5;
/// Suavidad a partir de la cual se suma el sub-puntaje
pub const SMOOTHNESS_CUTOFF: f64 = 0.5;

/// Pesos de cada sub-puntaje
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub hand_shape: f64,
    pub velocity: f64,
    pub height: f64,
    pub two_hands: f64,
    pub hand_distance: f64,
    pub direction: f64,
    pub smoothness: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            hand_shape: 0.25,
            velocity: 0.15,
            height: 0.10,
            two_hands: 0.10,
            hand_distance: 0.10,
            direction: 0.15,
            smoothness: 0.05,
        }
    }
}

/// Resultado de comparar una ventana contra toda la base
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Match { name: String, score: f64 },
    NoMatch,
}

impl MatchOutcome {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Match { name, .. } => Some(name),
            Self::NoMatch => None,
        }
    }

    pub fn into_name(self) -> Option<String> {
        match self {
            Self::Match { name, .. } => Some(name),
            Self::NoMatch => None,
        }
    }
}

/// 1 − |diff| / tolerancia, acotado en 0
fn closeness(actual: f64, reference: f64, tolerance: f64) -> f64 {
    (1.0 - (actual - reference).abs() / tolerance).max(0.0)
}

#[derive(Debug, Clone)]
pub struct Matcher {
    weights: MatchWeights,
    confidence_floor: f64,
}

impl Matcher {
    pub fn new(weights: MatchWeights, confidence_floor: f64) -> Self {
        Self {
            weights,
            confidence_floor,
        }
    }

    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    /// Suma ponderada de los sub-puntajes habilitados por la plantilla.
    /// Un campo ausente en la plantilla aporta 0.
    pub fn advanced_compare(&self, features: &FeatureBundle, template: &Template) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if let Some(shape) = &template.hand_shape {
            let total = features.hand_shape_sequence.len();
            if total > 0 {
                let matching = features
                    .hand_shape_sequence
                    .iter()
                    .filter(|(_, s)| s.as_str() == shape)
                    .count();
                score += matching as f64 / total as f64 * w.hand_shape;
            }
        }

        if let Some(reference) = template.velocity {
            score +=
                closeness(features.mean_velocity(), reference, VELOCITY_TOLERANCE) * w.velocity;
        }

        if let Some(reference) = template.hand_height {
            score +=
                closeness(features.hand_height_avg, reference, HEIGHT_TOLERANCE) * w.height;
        }

        if template.two_hands == Some(features.two_hands) {
            score += w.two_hands;
        }

        if let Some(reference) = template.hand_distance {
            if features.two_hands {
                score += closeness(features.hand_distance_avg, reference, DISTANCE_TOLERANCE)
                    * w.hand_distance;
            }
        }

        if let Some(direction) = &template.movement_direction {
            if features.movement_direction.map(|d| d.as_str()) == Some(direction.as_str()) {
                score += w.direction;
            }
        }

        // El valor de referencia no se usa: solo premia movimientos suaves
        if template.movement_smoothness.is_some()
            && features.movement_smoothness > SMOOTHNESS_CUTOFF
        {
            score += w.smoothness;
        }

        score
    }

    /// Puntaje de cada plantilla, en el orden de la base
    pub fn score_all(
        &self,
        features: &FeatureBundle,
        db: &TemplateDatabase,
    ) -> Vec<(String, f64)> {
        db.iter()
            .map(|t| (t.name.clone(), self.advanced_compare(features, t)))
            .collect()
    }

    /// Mejor plantilla por puntaje estrictamente mayor; en empate gana la primera.
    /// Solo se acepta si supera el umbral de confianza.
    pub fn best_match(&self, features: &FeatureBundle, db: &TemplateDatabase) -> MatchOutcome {
        let mut best: Option<(&Template, f64)> = None;
        for template in db.iter() {
            let score = self.advanced_compare(features, template);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((template, score));
            }
        }

        match best {
            Some((template, score)) if score > self.confidence_floor => {
                debug!("[MATCH] {} ({:.3})", template.name, score);
                MatchOutcome::Match {
                    name: template.name.clone(),
                    score,
                }
            }
            Some((template, score)) => {
                debug!(
                    "[MATCH] sin coincidencia: mejor {} ({:.3}) <= {:.2}",
                    template.name, score, self.confidence_floor
                );
                MatchOutcome::NoMatch
            }
            None => MatchOutcome::NoMatch,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchWeights::default(), CONFIDENCE_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::fixtures::*;
    use crate::feature_extractor::extract;
    use crate::types::Frame;

    fn static_open_right() -> FeatureBundle {
        extract(&vec![right_only(open_hand(0.4, 0.6)); 15]).unwrap()
    }

    fn full_template(name: &str) -> Template {
        Template::new(name)
            .with_shape("open")
            .with_velocity(0.0)
            .with_height(0.55)
            .with_two_hands(false)
            .with_direction("vertical_down")
            .with_smoothness(0.9)
    }

    #[test]
    fn empty_template_scores_zero() {
        let matcher = Matcher::default();
        let features = static_open_right();
        assert_eq!(matcher.advanced_compare(&features, &Template::new("EMPTY")), 0.0);
    }

    #[test]
    fn full_agreement_sums_all_applicable_weights() {
        let matcher = Matcher::default();
        let features = static_open_right();
        let score = matcher.advanced_compare(&features, &full_template("OPEN"));
        // Sin distancia entre manos: 0.25 + 0.15 + 0.10 + 0.10 + 0.15 + 0.05
        assert!((score - 0.80).abs() < 1e-9);
    }

    #[test]
    fn score_grows_as_gates_are_satisfied() {
        let matcher = Matcher::default();
        let features = static_open_right();
        let steps = [
            Template::new("T"),
            Template::new("T").with_shape("open"),
            Template::new("T").with_shape("open").with_two_hands(false),
            Template::new("T")
                .with_shape("open")
                .with_two_hands(false)
                .with_direction("vertical_down"),
            full_template("T"),
        ];
        let scores: Vec<f64> = steps
            .iter()
            .map(|t| matcher.advanced_compare(&features, t))
            .collect();
        assert!(scores.windows(2).all(|w| w[1] >= w[0]), "{scores:?}");
    }

    #[test]
    fn shape_score_is_fraction_of_sequence() {
        let matcher = Matcher::default();
        let mut frames = vec![right_only(open_hand(0.5, 0.5)); 3];
        frames.push(right_only(fist(0.5, 0.5)));
        let features = extract(&frames).unwrap();
        let score = matcher.advanced_compare(&features, &Template::new("T").with_shape("open"));
        assert!((score - 0.75 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn closeness_scores_are_clamped() {
        let matcher = Matcher::default();
        let features = static_open_right();
        // Altura a más de 0.3 de distancia: aporta 0
        let far = Template::new("T").with_height(features.hand_height_avg + 0.5);
        assert_eq!(matcher.advanced_compare(&features, &far), 0.0);
        // A mitad de la tolerancia: mitad del peso
        let half = Template::new("T").with_height(features.hand_height_avg + 0.15);
        assert!((matcher.advanced_compare(&features, &half) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn hand_distance_only_counts_with_two_hands() {
        let matcher = Matcher::default();
        let template = Template::new("T").with_hand_distance(0.4);

        let one_hand = static_open_right();
        assert_eq!(matcher.advanced_compare(&one_hand, &template), 0.0);

        let frames: Vec<Frame> = (0..4)
            .map(|_| Frame::new(Some(fist(0.2, 0.5)), Some(fist(0.6, 0.5))))
            .collect();
        let two = extract(&frames).unwrap();
        assert!((matcher.advanced_compare(&two, &template) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn smoothness_ignores_template_value() {
        let matcher = Matcher::default();
        let features = static_open_right();
        let low = Template::new("T").with_smoothness(0.0);
        assert!((matcher.advanced_compare(&features, &low) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn best_match_requires_floor_and_prefers_first_on_tie() {
        let matcher = Matcher::default();
        let features = static_open_right();

        let db = TemplateDatabase::from_templates(vec![
            Template::new("SPARSE").with_shape("open").with_two_hands(false),
            full_template("FIRST"),
            full_template("SECOND"),
        ]);
        match matcher.best_match(&features, &db) {
            MatchOutcome::Match { name, score } => {
                assert_eq!(name, "FIRST");
                assert!(score > CONFIDENCE_FLOOR);
            }
            MatchOutcome::NoMatch => panic!("expected a match"),
        }

        let sparse_only = TemplateDatabase::from_templates(vec![Template::new("SPARSE")
            .with_shape("open")
            .with_two_hands(false)]);
        assert_eq!(matcher.best_match(&features, &sparse_only), MatchOutcome::NoMatch);
    }

    #[test]
    fn empty_database_never_matches() {
        let matcher = Matcher::default();
        let features = static_open_right();
        assert_eq!(
            matcher.best_match(&features, &TemplateDatabase::empty()),
            MatchOutcome::NoMatch
        );
        assert!(matcher.score_all(&features, &TemplateDatabase::empty()).is_empty());
    }

    #[test]
    fn score_all_keeps_database_order() {
        let matcher = Matcher::default();
        let features = static_open_right();
        let db = TemplateDatabase::from_templates(vec![
            Template::new("B").with_shape("fist"),
            Template::new("A").with_shape("open"),
        ]);
        let scores = matcher.score_all(&features, &db);
        assert_eq!(scores[0].0, "B");
        assert_eq!(scores[0].1, 0.0);
        assert_eq!(scores[1].0, "A");
        assert!((scores[1].1 - 0.25).abs() < 1e-9);
    }
}
