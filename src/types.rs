use serde::{Deserialize, Serialize};

/// Número de landmarks de una mano (convención MediaPipe)
pub const NUM_LANDMARKS: usize = 21;

/// Índices anatómicos de los landmarks usados por el extractor
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_TIP: usize = 20;

    /// Puntas de los cinco dedos: pulgar, índice, medio, anular, meñique
    pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

/// Punto 3D de un landmark. `z` suele ser una profundidad relativa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ZERO: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Proyección sobre el plano x-y
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Conjunto de landmarks de una mano en un frame.
/// Solo es válido con al menos 21 puntos; si no, se trata como ausente.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks(pub Vec<Point3>);

impl HandLandmarks {
    pub fn new(points: Vec<Point3>) -> Self {
        Self(points)
    }

    pub fn is_valid(&self) -> bool {
        self.0.len() >= NUM_LANDMARKS
    }

    /// Punto en el índice dado, solo si el conjunto es válido
    pub fn point(&self, idx: usize) -> Option<Point3> {
        if self.is_valid() {
            self.0.get(idx).copied()
        } else {
            None
        }
    }

    pub fn points(&self) -> &[Point3] {
        &self.0
    }
}

/// Lado de la mano
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Frame producido por el colaborador de captura: cero, una o dos manos
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub left_hand: Option<HandLandmarks>,
    #[serde(default)]
    pub right_hand: Option<HandLandmarks>,
}

impl Frame {
    pub fn new(left_hand: Option<HandLandmarks>, right_hand: Option<HandLandmarks>) -> Self {
        Self {
            left_hand,
            right_hand,
        }
    }

    pub fn hand(&self, side: HandSide) -> Option<&HandLandmarks> {
        match side {
            HandSide::Left => self.left_hand.as_ref(),
            HandSide::Right => self.right_hand.as_ref(),
        }
    }
}

/// Constantes del segmentador
pub const WINDOW_SIZE: usize = 15;
pub const STEP_SIZE: usize = 10;
/// Mínimo de frames para extraer características
pub const MIN_WINDOW_FRAMES: usize = 3;
/// Etiqueta devuelta cuando no se reconoce ninguna seña
pub const FALLBACK_LABEL: &str = "HELLO";
