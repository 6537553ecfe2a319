use crate::geometry::{self, distance_2d, distance_3d};
use crate::types::{landmarks, Frame, HandLandmarks, HandSide, Point3, MIN_WINDOW_FRAMES};
use serde::Serialize;
use tracing::trace;

/// Un dedo se considera extendido si su punta está más lejos de la muñeca
/// que este factor por la distancia de su base
pub const FINGER_EXTENSION_RATIO: f64 = 1.2;

/// Pares (punta, base) de pulgar, índice, medio, anular y meñique
const FINGERS: [(usize, usize); 5] = [
    (landmarks::THUMB_TIP, landmarks::THUMB_MCP),
    (landmarks::INDEX_TIP, landmarks::INDEX_MCP),
    (landmarks::MIDDLE_TIP, landmarks::MIDDLE_MCP),
    (landmarks::RING_TIP, landmarks::RING_MCP),
    (landmarks::PINKY_TIP, landmarks::PINKY_MCP),
];

const THUMB: usize = 0;
const INDEX: usize = 1;
const MIDDLE: usize = 2;

/// Forma de la mano según los dedos extendidos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HandShape {
    #[serde(rename = "fist")]
    Fist,
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "thumbs_up")]
    ThumbsUp,
    #[serde(rename = "peace")]
    Peace,
    #[serde(rename = "L_shape")]
    LShape,
    #[serde(rename = "three")]
    Three,
    #[serde(rename = "partial")]
    Partial,
    #[serde(rename = "unknown")]
    Unknown,
}

impl HandShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::Open => "open",
            Self::Point => "point",
            Self::ThumbsUp => "thumbs_up",
            Self::Peace => "peace",
            Self::LShape => "L_shape",
            Self::Three => "three",
            Self::Partial => "partial",
            Self::Unknown => "unknown",
        }
    }
}

/// Mano dominante en la ventana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantHand {
    Left,
    Right,
    Both,
}

/// Dirección global del movimiento. El eje vertical crece hacia abajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovementDirection {
    #[serde(rename = "horizontal")]
    Horizontal,
    #[serde(rename = "horizontal_left")]
    HorizontalLeft,
    #[serde(rename = "vertical_up")]
    VerticalUp,
    #[serde(rename = "vertical_down")]
    VerticalDown,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::HorizontalLeft => "horizontal_left",
            Self::VerticalUp => "vertical_up",
            Self::VerticalDown => "vertical_down",
        }
    }

    /// Clasifica el desplazamiento entre el primer y el último punto
    pub fn from_displacement(start: &Point3, end: &Point3) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Self::Horizontal
            } else {
                Self::HorizontalLeft
            }
        } else if dy < 0.0 {
            Self::VerticalUp
        } else {
            Self::VerticalDown
        }
    }
}

/// Valor por mano
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerHand<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerHand<T> {
    fn get_mut(&mut self, side: HandSide) -> &mut T {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }
}

/// Resumen de movimiento y forma de una ventana
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureBundle {
    pub hand_trajectory: PerHand<Vec<Point3>>,
    pub hand_velocity: PerHand<f64>,
    pub hand_acceleration: PerHand<f64>,
    pub hand_orientation: PerHand<Vec<f64>>,
    pub hand_shape_sequence: Vec<(HandSide, HandShape)>,
    pub hand_height_avg: f64,
    pub hand_distance_avg: f64,
    pub two_hands: bool,
    pub dominant_hand: DominantHand,
    pub movement_direction: Option<MovementDirection>,
    pub movement_smoothness: f64,
    pub finger_extension: Vec<f64>,
}

impl FeatureBundle {
    /// Velocidad media entre ambas manos (una mano ausente cuenta como 0)
    pub fn mean_velocity(&self) -> f64 {
        (self.hand_velocity.left + self.hand_velocity.right) / 2.0
    }
}

/// Extrae el `FeatureBundle` de una ventana.
/// Devuelve `None` si la ventana tiene menos de 3 frames.
pub fn extract(frames: &[Frame]) -> Option<FeatureBundle> {
    if frames.len() < MIN_WINDOW_FRAMES {
        return None;
    }

    let mut trajectory: PerHand<Vec<Point3>> = PerHand::default();
    let mut orientations: PerHand<Vec<f64>> = PerHand::default();
    let mut shape_sequence = Vec::new();
    let mut finger_ext = Vec::new();

    for frame in frames {
        for side in [HandSide::Left, HandSide::Right] {
            // Conjuntos con menos de 21 puntos se tratan como ausentes
            let Some(hand) = frame.hand(side).filter(|h| h.is_valid()) else {
                continue;
            };
            trajectory.get_mut(side).push(geometry::center(hand));
            orientations.get_mut(side).push(geometry::orientation(hand));
            shape_sequence.push((side, detect_hand_shape_detailed(hand)));
            finger_ext.push(finger_extension(hand));
        }
    }

    let velocity = PerHand {
        left: geometry::velocity(&trajectory.left),
        right: geometry::velocity(&trajectory.right),
    };
    let acceleration = PerHand {
        left: geometry::acceleration(&trajectory.left),
        right: geometry::acceleration(&trajectory.right),
    };

    let n_left = trajectory.left.len();
    let n_right = trajectory.right.len();
    let two_hands = n_left > 0 && n_right > 0;
    let dominant_hand = match n_left.cmp(&n_right) {
        std::cmp::Ordering::Greater => DominantHand::Left,
        std::cmp::Ordering::Less => DominantHand::Right,
        std::cmp::Ordering::Equal => DominantHand::Both,
    };

    // Izquierda seguida de derecha, en ese orden
    let all_positions: Vec<Point3> = trajectory
        .left
        .iter()
        .chain(trajectory.right.iter())
        .copied()
        .collect();

    let hand_height_avg = if all_positions.is_empty() {
        0.0
    } else {
        all_positions.iter().map(|p| p.y).sum::<f64>() / all_positions.len() as f64
    };

    let hand_distance_avg = if two_hands {
        avg_hand_distance(&trajectory.left, &trajectory.right)
    } else {
        0.0
    };

    let movement_direction = match (all_positions.first(), all_positions.last()) {
        (Some(start), Some(end)) if all_positions.len() > 2 => {
            Some(MovementDirection::from_displacement(start, end))
        }
        _ => None,
    };

    let movement_smoothness = if all_positions.len() > 3 {
        geometry::jerk_smoothness(&all_positions)
    } else {
        0.0
    };

    trace!(
        "[FEATURES] {} frames, left={} right={} shapes={}",
        frames.len(),
        n_left,
        n_right,
        shape_sequence.len()
    );

    Some(FeatureBundle {
        hand_trajectory: trajectory,
        hand_velocity: velocity,
        hand_acceleration: acceleration,
        hand_orientation: orientations,
        hand_shape_sequence: shape_sequence,
        hand_height_avg,
        hand_distance_avg,
        two_hands,
        dominant_hand,
        movement_direction,
        movement_smoothness,
        finger_extension: finger_ext,
    })
}

/// Distancia media entre manos alineando por índice hasta la lista más corta
fn avg_hand_distance(left: &[Point3], right: &[Point3]) -> f64 {
    let n = left.len().min(right.len());
    if n == 0 {
        return 0.0;
    }
    left.iter()
        .zip(right)
        .map(|(l, r)| distance_3d(l, r))
        .sum::<f64>()
        / n as f64
}

/// Clasifica la forma de la mano a partir de qué dedos están extendidos
pub fn detect_hand_shape_detailed(hand: &HandLandmarks) -> HandShape {
    let Some(wrist) = hand.point(landmarks::WRIST) else {
        return HandShape::Unknown;
    };

    let mut extended = [false; 5];
    for (finger, &(tip_idx, base_idx)) in FINGERS.iter().enumerate() {
        let (Some(tip), Some(base)) = (hand.point(tip_idx), hand.point(base_idx)) else {
            return HandShape::Unknown;
        };
        let tip_dist = distance_2d(&tip, &wrist);
        let base_dist = distance_2d(&base, &wrist);
        // Estricto: justo en el umbral no cuenta como extendido
        extended[finger] = tip_dist > base_dist * FINGER_EXTENSION_RATIO;
    }

    let count = extended.iter().filter(|&&e| e).count();
    match count {
        0 => HandShape::Fist,
        5 => HandShape::Open,
        1 if extended[INDEX] => HandShape::Point,
        1 if extended[THUMB] => HandShape::ThumbsUp,
        2 if extended[INDEX] && extended[MIDDLE] => HandShape::Peace,
        2 if extended[INDEX] && extended[THUMB] => HandShape::LShape,
        3 => HandShape::Three,
        _ => HandShape::Partial,
    }
}

/// Extensión media: promedio de distancias 2D punta → muñeca (0 si inválido)
pub fn finger_extension(hand: &HandLandmarks) -> f64 {
    let Some(wrist) = hand.point(landmarks::WRIST) else {
        return 0.0;
    };
    let total: f64 = landmarks::FINGERTIPS
        .iter()
        .filter_map(|&idx| hand.point(idx))
        .map(|tip| distance_2d(&tip, &wrist))
        .sum();
    total / landmarks::FINGERTIPS.len() as f64
}
