//! Example: Analyze a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--json] <file>

use soundprint::{analyze_file, AnalysisConfig};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut json = false;
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        eprintln!("Usage: analyze_file [--json] <file>");
        std::process::exit(2);
    };

    let config = AnalysisConfig::default();
    let record = analyze_file(&path, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let basic = record.basic_info();
    let rhythm = record.rhythm();
    let timbre = record.timbre();
    let production = record.production();

    println!("Analysis Results: {}", path);
    println!("  Duration: {}", basic.duration_formatted);
    println!("  Tempo: {:.2} BPM ({} beats)", basic.tempo, rhythm.beat_times.len());
    println!("  Key: {} (confidence: {:.2})", basic.key_name, basic.key_confidence);
    println!(
        "  Rhythm: {} (complexity {:.3})",
        rhythm.complexity_label, rhythm.complexity
    );
    println!(
        "  Timbre: {} (harmonic ratio {:.3})",
        timbre.description, timbre.harmonic_ratio
    );
    println!(
        "  Brightness: {:.0} Hz, width: {:.0} Hz, contrast ratio: {:.3}",
        production.brightness, production.spectral_width, production.contrast_ratio
    );

    Ok(())
}
