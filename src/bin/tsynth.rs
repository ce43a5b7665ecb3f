use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use tsynth::output::{write_report_json, write_series_csv};
use tsynth::{PipelineConfig, SynthError};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(error) = try_main() {
        eprintln!("tsynth failed: {error}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), SynthError> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;

    let (mut pipeline, baseline) = config.build()?;
    let report = pipeline.run(&baseline)?;

    let output_dir = args.out.unwrap_or_else(|| PathBuf::from("out"));
    fs::create_dir_all(&output_dir)?;
    write_series_csv(
        &output_dir.join("series.csv"),
        &report.series,
        Some(&baseline),
        report.mask.as_ref(),
    )?;
    write_report_json(&output_dir.join("report.json"), &report.entries)?;

    println!(
        "Applied {} of {} entries; output directory: {}",
        report.applied(),
        report.entries.len(),
        output_dir.display()
    );
    Ok(())
}

fn parse_args<I>(args: I) -> Result<Args, SynthError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let mut parsed = Args::default();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| {
                    SynthError::InvalidConfig("missing value for --config".to_string())
                })?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--out" => {
                let path = iter.next().ok_or_else(|| {
                    SynthError::InvalidConfig("missing value for --out".to_string())
                })?;
                parsed.out = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(SynthError::InvalidConfig(format!(
                    "unknown argument: {other}"
                )));
            }
        }
    }

    Ok(parsed)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, SynthError> {
    if let Some(path) = path {
        return PipelineConfig::from_json_file(path);
    }

    let cwd_config = PathBuf::from("config.json");
    if cwd_config.exists() {
        return PipelineConfig::from_json_file(&cwd_config);
    }

    Ok(PipelineConfig::default())
}

fn print_help() {
    println!("Usage: tsynth [--config path/to/config.json] [--out dir]");
    println!("If config.json exists in the current directory, it is loaded automatically.");
    println!("Otherwise the built-in demo pipeline (dummy sinusoids plus noise and anomalies) is used.");
    println!("Writes series.csv and report.json into --out (default: out). Set RUST_LOG for more detail.");
}
