/*
Reconocimiento de señas desde landmarks de mano

1. Lee un stream de frames (CSV: frame,hand,landmark,x,y,z)
2. Recorre ventanas de 15 frames con paso 10
3. Compara cada ventana contra la base de plantillas (data/gestures.json)
4. Imprime la secuencia de señas reconocidas

Para ejecutar:
    RUST_LOG=signoscopio=debug ./target/release/signoscopio grabacion.csv
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use signoscopio::config::RecognizerParams;
use signoscopio::csv_loader::load_frames_from_csv;
use signoscopio::recognizer::GestureRecognizer;
use signoscopio::template_db::TemplateDatabase;

#[derive(Parser, Debug)]
#[command(name = "signoscopio", about = "Reconoce señas en un stream de landmarks")]
struct Cli {
    /// CSV con los frames (frame,hand,landmark,x,y,z)
    frames: PathBuf,

    /// Base de plantillas JSON
    #[arg(long, default_value = "data/gestures.json")]
    templates: PathBuf,

    /// Parámetros del reconocedor (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Falla si la base de plantillas no se puede leer en vez de usar una vacía
    #[arg(long)]
    strict: bool,

    /// Muestra el resultado de cada ventana
    #[arg(long)]
    windows: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signoscopio=info".into()),
        )
        .init();

    let params = match &cli.config {
        Some(path) => RecognizerParams::load(path)
            .with_context(|| format!("No se pudo leer la configuración {:?}", path))?,
        None => RecognizerParams::default(),
    };

    let database = if cli.strict {
        TemplateDatabase::load(&cli.templates)
            .with_context(|| format!("No se pudo cargar la base {:?}", cli.templates))?
    } else {
        TemplateDatabase::load_or_empty(&cli.templates)
    };
    let recognizer = GestureRecognizer::new(database, params)?;

    let frames = load_frames_from_csv(&cli.frames)?;
    info!("{} frames leídos desde {:?}", frames.len(), cli.frames);

    if cli.windows {
        for result in recognizer.recognize_windows(&frames) {
            match result.outcome {
                signoscopio::MatchOutcome::Match { name, score } => {
                    println!("  [{:>4}] {:<20} {:>6.1}%", result.start, name, score * 100.0)
                }
                signoscopio::MatchOutcome::NoMatch => println!("  [{:>4}] -", result.start),
            }
        }
    }

    let words = recognizer.recognize_sequence(&frames);
    println!("{}", words.join(" "));

    Ok(())
}
