use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use signoscopio::csv_loader::load_frames_from_csv;
use signoscopio::feature_extractor::extract;
use signoscopio::template_db::TemplateDatabase;
use signoscopio::{GestureRecognizer, MatchOutcome};

#[derive(Parser, Debug)]
#[command(name = "replay_csv", about = "Inspecciona una ventana de frames contra la base")]
struct ReplayOptions {
    /// CSV con los frames (frame,hand,landmark,x,y,z)
    csv_path: PathBuf,

    /// Base de plantillas JSON
    #[arg(long, default_value = "data/gestures.json")]
    templates: PathBuf,

    /// Primer frame de la ventana
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Imprime las características extraídas en JSON
    #[arg(long)]
    dump_features: bool,
}

fn main() -> Result<()> {
    let opts = ReplayOptions::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signoscopio=warn".into()),
        )
        .init();

    println!("Reproduciendo ventana desde {:?}", opts.csv_path);

    let frames = load_frames_from_csv(&opts.csv_path)?;
    let database = TemplateDatabase::load_or_empty(&opts.templates);
    let recognizer = GestureRecognizer::with_defaults(database);
    let window_size = recognizer.params().window_size;

    if opts.start >= frames.len() {
        bail!("start={} fuera del stream ({} frames)", opts.start, frames.len());
    }
    let end = (opts.start + window_size).min(frames.len());
    let window = &frames[opts.start..end];
    if window.len() < window_size {
        println!("Ventana recortada a {} frames", window.len());
    }

    let Some(features) = extract(window) else {
        bail!("La ventana tiene menos de 3 frames");
    };

    let mut scores = recognizer.matcher().score_all(&features, recognizer.database());
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    match recognizer.matcher().best_match(&features, recognizer.database()) {
        MatchOutcome::Match { name, score } => {
            println!("\nSeña: {} ({:.1}%)", name, score * 100.0)
        }
        MatchOutcome::NoMatch => println!(
            "\nSin coincidencia (umbral {:.0}%)",
            recognizer.matcher().confidence_floor() * 100.0
        ),
    }

    println!("\nTop-5 puntajes:");
    for (idx, (label, score)) in scores.iter().take(5).enumerate() {
        println!("  {:>2}. {:<25} {:>6.2}%", idx + 1, label, score * 100.0);
    }

    if opts.dump_features {
        let json = serde_json::to_string_pretty(&features).context("No se pudo serializar")?;
        println!("\nCaracterísticas:\n{}", json);
    }

    Ok(())
}
