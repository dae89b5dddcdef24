//! Example: Analyze multiple audio files in parallel, optionally clustering them
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] [--clusters K] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.
//! - Clustering runs over the files that analyzed successfully.

use rayon::prelude::*;
use soundprint::{analyze_file, cluster, AnalysisConfig, AnalysisRecord};
use std::env;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

struct ItemOut {
    path: String,
    elapsed_ms: f64,
    result: Result<AnalysisRecord, String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut clusters: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--clusters" => {
                let v = args
                    .first()
                    .ok_or("--clusters requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                clusters = Some(v);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] [--clusters K] <file1> <file2> ...\n\
                     \n\
                     --jobs N       Parallel workers (default: CPU-1)\n\
                     --json         Emit one JSON object per line (JSONL)\n\
                     --clusters K   Group the analyzed files into K clusters\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let start = Instant::now();
                let result = analyze_file(path, &config).map_err(|e| e.to_string());
                ItemOut {
                    path: path.clone(),
                    elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                    result,
                }
            })
            .collect()
    });

    for (idx, o) in outs.iter().enumerate() {
        match (&o.result, json) {
            (Ok(record), true) => println!(
                "{{\"file\":{},\"record\":{}}}",
                serde_json::to_string(&o.path)?,
                serde_json::to_string(record)?
            ),
            (Err(e), true) => println!(
                "{{\"file\":{},\"error\":{}}}",
                serde_json::to_string(&o.path)?,
                serde_json::to_string(e)?
            ),
            (Ok(record), false) => println!(
                "[{}/{}] {}: BPM={:.2} Key={} (conf={:.3}) {} time={:.2}ms",
                idx + 1,
                outs.len(),
                o.path,
                record.tempo(),
                record.basic_info().key_name,
                record.basic_info().key_confidence,
                record.timbre().description,
                o.elapsed_ms
            ),
            (Err(e), false) => println!("[{}/{}] {}: ERROR: {}", idx + 1, outs.len(), o.path, e),
        }
    }

    let ok: Vec<(&str, &AnalysisRecord)> = outs
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|r| (o.path.as_str(), r)))
        .collect();

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok.len(),
        outs.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    if let Some(k) = clusters {
        let records: Vec<AnalysisRecord> = ok.iter().map(|(_, r)| (*r).clone()).collect();
        let result = cluster(&records, k)?;

        if json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("Clusters (k={}, inertia={:.4}):", k, result.inertia);
            for summary in &result.summaries {
                println!(
                    "  #{}: {} files, mean tempo {:.1} BPM, mean centroid {:.0} Hz",
                    summary.index, summary.size, summary.mean_tempo, summary.mean_centroid
                );
                for ((path, _), _) in ok
                    .iter()
                    .zip(&result.assignments)
                    .filter(|(_, &a)| a == summary.index)
                {
                    println!("      {}", path);
                }
            }
        }
    }

    Ok(())
}
