//! pcmflow CLI
//!
//! Small demonstration binary: transfers audio between a file and a
//! file (or decodes to arrays and prints stream statistics), with
//! progress printed to stderr.

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use log::info;

use pcmflow::{PipelineBuilder, Result, RunOutput};

#[derive(Parser)]
#[command(name = "pcmflow-cli", version, about = "Quantum PCM transfer pipeline")]
struct Cli {
    /// Input audio file (.wav)
    input: PathBuf,

    /// Output audio file; omit to decode and print stream statistics
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    info!("pcmflow v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = PipelineBuilder::new().from_file(&cli.input).report(
        Box::new(|progress| {
            if progress > 0.0 {
                eprint!("\r{:5.1}%", progress);
            } else {
                eprintln!();
            }
        }),
        Box::new(|status| {
            if !status.is_empty() {
                eprintln!("{}", status);
            }
        }),
    );

    if let Some(output) = &cli.output {
        builder = builder.to_file(output);
    }

    let result = builder.build()?.run()?;

    match result.output() {
        RunOutput::File(path) => {
            if result.success() {
                println!("wrote {} at {} Hz", path.display(), result.sample_rate());
            } else {
                println!(
                    "transcode failed; partial output at {} ({} Hz)",
                    path.display(),
                    result.sample_rate()
                );
            }
        }
        RunOutput::Samples { left, right } => {
            let peak = left
                .iter()
                .chain(right.iter().flatten())
                .fold(0.0f32, |acc, &s| acc.max(s.abs()));
            println!(
                "decoded {} samples per channel, {} channel(s), {} Hz, peak {:.4}",
                left.len(),
                if right.is_some() { 2 } else { 1 },
                result.sample_rate(),
                peak
            );
        }
    }

    Ok(())
}
