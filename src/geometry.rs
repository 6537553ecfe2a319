//! Utilidades geométricas sobre landmarks y trayectorias.
//!
//! Las distancias de forma y extensión se miden en la proyección 2D (x, y);
//! las métricas de movimiento usan la dimensión nativa de las posiciones (3D).

use crate::types::{landmarks, HandLandmarks, Point3};

/// Centro de la mano: promedio entre muñeca y base del dedo medio.
/// Devuelve el origen si el conjunto es inválido.
pub fn center(hand: &HandLandmarks) -> Point3 {
    match (hand.point(landmarks::WRIST), hand.point(landmarks::MIDDLE_MCP)) {
        (Some(wrist), Some(base)) => Point3::new(
            (wrist.x + base.x) / 2.0,
            (wrist.y + base.y) / 2.0,
            (wrist.z + base.z) / 2.0,
        ),
        _ => Point3::ZERO,
    }
}

/// Ángulo (radianes, en (-π, π]) del vector muñeca → punta del medio en el plano x-y
pub fn orientation(hand: &HandLandmarks) -> f64 {
    match (hand.point(landmarks::WRIST), hand.point(landmarks::MIDDLE_TIP)) {
        (Some(wrist), Some(tip)) => (tip.y - wrist.y).atan2(tip.x - wrist.x),
        _ => 0.0,
    }
}

/// Distancia euclídea entre dos puntos de igual dimensión
pub fn euclidean_distance(p: &[f64], q: &[f64]) -> f64 {
    p.iter()
        .zip(q)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

pub fn distance_2d(p: &Point3, q: &Point3) -> f64 {
    euclidean_distance(&p.xy(), &q.xy())
}

pub fn distance_3d(p: &Point3, q: &Point3) -> f64 {
    euclidean_distance(&p.xyz(), &q.xyz())
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Distancias entre posiciones consecutivas
fn step_distances(positions: &[Point3]) -> Vec<f64> {
    positions
        .windows(2)
        .map(|w| distance_3d(&w[1], &w[0]))
        .collect()
}

/// Velocidad media: promedio de distancias consecutivas (0 con menos de 2 puntos)
pub fn velocity(positions: &[Point3]) -> f64 {
    if positions.len() < 2 {
        return 0.0;
    }
    mean(&step_distances(positions))
}

/// Aceleración media: promedio de |Δv| entre pasos consecutivos (0 con menos de 3 puntos)
pub fn acceleration(positions: &[Point3]) -> f64 {
    if positions.len() < 3 {
        return 0.0;
    }
    let velocities = step_distances(positions);
    let accels: Vec<f64> = velocities.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    mean(&accels)
}

/// Suavidad basada en jerk: 1 / (1 + media(|Δa|)).
/// Requiere al menos 4 puntos para tener tres niveles de derivada.
pub fn jerk_smoothness(positions: &[Point3]) -> f64 {
    if positions.len() < 4 {
        return 0.0;
    }
    let velocities = step_distances(positions);
    // Con signo: el jerk se calcula sobre la aceleración sin valor absoluto
    let accels: Vec<f64> = velocities.windows(2).map(|w| w[1] - w[0]).collect();
    let jerks: Vec<f64> = accels.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    1.0 / (1.0 + mean(&jerks))
}
