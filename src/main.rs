use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use unit_edit_distance::export::{to_json, write_ipc};
use unit_edit_distance::token_reader::load_token_batch;
use unit_edit_distance::{batch_edit_distance_with, BatchOptions};

const USAGE: &str = "Usage: unit_edit_distance <x_tokens> <y_tokens|--self> <output.arrow|output.json> [num_threads]";

fn init_subscriber() {
    let fmt_layer = fmt::layer().with_target(true);

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args();
    args.next();
    let x_path = args.next().ok_or_else(|| format!("{} (missing x_tokens)", USAGE))?;
    let y_arg = args.next().ok_or_else(|| format!("{} (missing y_tokens)", USAGE))?;
    let output_path = args.next().ok_or_else(|| format!("{} (missing output)", USAGE))?;
    let num_threads = match args.next() {
        Some(raw) => raw.parse::<usize>().map_err(|e| format!("Invalid num_threads '{}': {}", raw, e))?,
        None => 0,
    };

    let x_tokens = load_token_batch(&x_path)?;
    let symmetric = y_arg == "--self";
    let y_tokens = if symmetric { None } else { Some(load_token_batch(&y_arg)?) };

    let x = x_tokens.as_padded()?;
    let y = match &y_tokens {
        Some(tokens) => tokens.as_padded()?,
        None => x,
    };
    let options = BatchOptions { symmetric, num_threads };
    info!("Computing {} x {} edit distances (symmetric: {}).", x.len(), y.len(), symmetric);
    let matrix = batch_edit_distance_with(&x, &y, &options)?;

    let file = File::create(&output_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", output_path, e))?;
    let mut buf_writer = BufWriter::with_capacity(128 * 1024, file);
    if output_path.ends_with(".json") {
        buf_writer.write_all(to_json(&matrix)?.as_bytes())?;
        buf_writer.flush()?;
    } else {
        write_ipc(&matrix, buf_writer)?.flush()?;
    }
    info!("Output written to '{}'.", output_path);
    Ok(())
}

fn main() {
    init_subscriber();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
