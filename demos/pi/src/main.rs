//! Sample CLI: `pi digits [threads] [radix]` (spec.md §6), driving
//! [`apfloat_number::transcendental::pi`] (which in turn drives
//! `apfloat_parallel`'s Chudnovsky binary splitting).
//!
//! Exit codes: `0` success, `1` bad arguments, `2` an error during
//! evaluation. stdout carries only the rendered digits; progress and
//! timing go to stderr so stdout stays pipeable.

use std::process::ExitCode;
use std::time::Instant;

use apfloat_context::Context;
use apfloat_number::{transcendental, Precision};
use clap::Parser;
use tracing::{info, warn};

/// Render pi to the requested number of decimal (or radix-b) digits.
#[derive(Parser)]
#[command(name = "pi", version, about = "Render pi to a requested digit count via Chudnovsky binary splitting.")]
struct Cli {
    /// Number of significant digits to compute.
    digits: String,
    /// Worker thread budget (default 1).
    threads: Option<String>,
    /// Output radix, 2..=36 (default 10).
    radix: Option<String>,
}

fn parse_arg<T: std::str::FromStr>(raw: &str, label: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| format!("invalid {label} {raw:?}: {e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let digits: u64 = match parse_arg(&cli.digits, "digit count") {
        Ok(value) => value,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };
    let threads: usize = match cli.threads.as_deref().map(|raw| parse_arg(raw, "thread count")).transpose() {
        Ok(value) => value.unwrap_or(1).max(1),
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };
    let radix: u32 = match cli.radix.as_deref().map(|raw| parse_arg(raw, "radix")).transpose() {
        Ok(value) => value.unwrap_or(10),
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(1);
        }
    };
    if !(2..=36).contains(&radix) {
        eprintln!("radix must be within [2, 36], got {radix}");
        return ExitCode::from(1);
    }

    let ctx = Context::builder()
        .with_number_of_processors(threads)
        .with_default_radix(radix)
        .build();

    info!(digits, threads, radix, "starting chudnovsky pi evaluation");
    let start = Instant::now();
    match transcendental::pi(&ctx, Precision::Finite(digits)) {
        Ok(value) => {
            let elapsed = start.elapsed();
            info!(?elapsed, "pi evaluation complete");
            eprintln!("computed {digits} digits in {elapsed:?}");
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!(%err, "pi evaluation failed");
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
