use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::types::{Frame, HandLandmarks, HandSide, Point3, NUM_LANDMARKS};

/// Máximo de frames en un stream (~9 h a 30 fps); los huecos se rellenan hasta aquí
pub const MAX_FRAMES: usize = 1_000_000;

/// Landmarks de un frame, indexados por lado y número de landmark
#[derive(Default)]
struct RawFrame {
    left: BTreeMap<usize, Point3>,
    right: BTreeMap<usize, Point3>,
}

impl RawFrame {
    fn side_mut(&mut self, side: HandSide) -> &mut BTreeMap<usize, Point3> {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    fn into_frame(self) -> Frame {
        let to_hand = |points: BTreeMap<usize, Point3>| {
            if points.is_empty() {
                None
            } else {
                Some(HandLandmarks::new(points.into_values().collect()))
            }
        };
        Frame::new(to_hand(self.left), to_hand(self.right))
    }
}

/// Carga una secuencia de frames desde un CSV con formato
/// frame,hand,landmark,x,y,z (hand = left | right).
/// Los frames sin filas entre 0 y el máximo quedan sin manos.
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<Frame>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut raw: BTreeMap<usize, RawFrame> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", row, path))?;
        if record.len() < 6 {
            bail!("La fila {} no tiene 6 columnas", row);
        }

        let frame: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row))?;
        if frame >= MAX_FRAMES {
            bail!("Frame {} fuera de rango (fila {}, máximo {})", frame, row, MAX_FRAMES - 1);
        }
        let side = HandSide::parse(&record[1])
            .ok_or_else(|| anyhow!("mano '{}' inválida en fila {}", &record[1], row))?;
        let landmark: usize = record[2]
            .parse()
            .with_context(|| format!("landmark inválido en fila {}", row))?;

        if landmark >= NUM_LANDMARKS {
            bail!("Landmark {} fuera de rango (fila {})", landmark, row);
        }

        let x: f64 = record[3].parse().with_context(|| format!("x inválido en fila {}", row))?;
        let y: f64 = record[4].parse().with_context(|| format!("y inválido en fila {}", row))?;
        let z: f64 = record[5].parse().with_context(|| format!("z inválido en fila {}", row))?;

        raw.entry(frame)
            .or_default()
            .side_mut(side)
            .insert(landmark, Point3::new(x, y, z));
    }

    let (&min_frame, _) = raw
        .iter()
        .next()
        .ok_or_else(|| anyhow!("El CSV {:?} no contiene datos", path))?;
    ensure!(
        min_frame == 0,
        "El CSV debe iniciar en frame=0 (encontrado frame={})",
        min_frame
    );
    let max_frame = raw.keys().next_back().copied().unwrap_or(0);
    let total = max_frame
        .checked_add(1)
        .filter(|&n| n <= MAX_FRAMES)
        .ok_or_else(|| anyhow!("El CSV {:?} declara demasiados frames ({})", path, max_frame))?;

    let mut frames = Vec::with_capacity(total);
    for frame_idx in 0..=max_frame {
        frames.push(raw.remove(&frame_idx).map(RawFrame::into_frame).unwrap_or_default());
    }

    Ok(frames)
}

/// Exporta frames al mismo formato CSV que lee `load_frames_from_csv`
pub fn frames_to_csv(frames: &[Frame]) -> String {
    let mut csv = String::from("frame,hand,landmark,x,y,z\n");

    for (frame_idx, frame) in frames.iter().enumerate() {
        for side in [HandSide::Left, HandSide::Right] {
            if let Some(hand) = frame.hand(side) {
                for (landmark, p) in hand.points().iter().enumerate() {
                    csv.push_str(&format!(
                        "{},{},{},{},{},{}\n",
                        frame_idx,
                        side.as_str(),
                        landmark,
                        p.x,
                        p.y,
                        p.z
                    ));
                }
            }
        }
    }

    csv
}
