use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid template '{name}': {source}")]
    InvalidTemplate {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Campos tal como aparecen en el objeto `features` del JSON
#[derive(Debug, Default, Deserialize)]
struct TemplateFeatures {
    #[serde(default, alias = "shape")]
    hand_shape: Option<String>,
    /// Solo actúa como marca de presencia (incluso con `null`);
    /// el valor de referencia es `hand_movement`
    #[serde(default, deserialize_with = "present")]
    hand_velocity: Option<serde_json::Value>,
    #[serde(default)]
    hand_movement: Option<f64>,
    #[serde(default)]
    hand_height: Option<f64>,
    #[serde(default)]
    two_hands: Option<bool>,
    #[serde(default)]
    hand_distance: Option<f64>,
    #[serde(default)]
    movement_direction: Option<String>,
    #[serde(default)]
    movement_smoothness: Option<f64>,
}

/// `Some` para cualquier valor presente, también `null`
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    #[serde(default)]
    features: TemplateFeatures,
}

/// Plantilla de referencia de una seña. Cada campo presente habilita
/// el sub-puntaje correspondiente en el matcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub name: String,
    pub hand_shape: Option<String>,
    /// Velocidad de referencia (`hand_movement`, 0 si falta)
    pub velocity: Option<f64>,
    pub hand_height: Option<f64>,
    pub two_hands: Option<bool>,
    pub hand_distance: Option<f64>,
    pub movement_direction: Option<String>,
    pub movement_smoothness: Option<f64>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.hand_shape = Some(shape.into());
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.hand_height = Some(height);
        self
    }

    pub fn with_two_hands(mut self, two_hands: bool) -> Self {
        self.two_hands = Some(two_hands);
        self
    }

    pub fn with_hand_distance(mut self, distance: f64) -> Self {
        self.hand_distance = Some(distance);
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.movement_direction = Some(direction.into());
        self
    }

    pub fn with_smoothness(mut self, smoothness: f64) -> Self {
        self.movement_smoothness = Some(smoothness);
        self
    }

    fn from_features(name: String, f: TemplateFeatures) -> Self {
        let velocity = f.hand_velocity.map(|_| f.hand_movement.unwrap_or(0.0));
        Self {
            name,
            hand_shape: f.hand_shape,
            velocity,
            hand_height: f.hand_height,
            two_hands: f.two_hands,
            hand_distance: f.hand_distance,
            movement_direction: f.movement_direction,
            movement_smoothness: f.movement_smoothness,
        }
    }
}

/// Base de plantillas, en el orden en que aparecen en el archivo.
/// Solo lectura tras la carga.
#[derive(Debug, Clone, Default)]
pub struct TemplateDatabase {
    templates: Vec<Template>,
}

impl TemplateDatabase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construye la base desde una lista; un nombre repetido reemplaza al anterior
    /// conservando su posición
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut db = Self::default();
        for template in templates {
            match db.templates.iter_mut().find(|t| t.name == template.name) {
                Some(existing) => *existing = template,
                None => db.templates.push(template),
            }
        }
        db
    }

    /// Parsea el JSON `{ "<seña>": { "features": { ... } }, ... }`
    pub fn from_json_str(content: &str) -> Result<Self, DatabaseError> {
        let root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut templates = Vec::with_capacity(root.len());
        for (name, value) in root {
            let entry: TemplateEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(source) => return Err(DatabaseError::InvalidTemplate { name, source }),
            };
            templates.push(Template::from_features(name, entry.features));
        }

        Ok(Self { templates })
    }

    /// Carga estricta: cualquier fallo de IO o de formato se propaga
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Carga tolerante: si el archivo no existe o es inválido, devuelve una base vacía
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("[DB] {:?} no existe, base de plantillas vacía", path);
            return Self::empty();
        }

        match Self::load(path) {
            Ok(db) => {
                info!("[DB] {} plantillas cargadas desde {:?}", db.len(), path);
                db
            }
            Err(err) => {
                warn!("[DB] No se pudo cargar {:?}: {}. Se usa base vacía", path, err);
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Itera en orden de inserción
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}
