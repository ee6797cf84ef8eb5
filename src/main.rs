//! `mhz` command-line tool: measure CPU frequency from a terminal.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use mhz::output::{self, FrequencyStyle, ReportOptions, ReportScope};
use mhz::{has_hardware_counter, preheat, FrequencyMeter, DEFAULT_SEED_COUNT};

/// Estimate effective CPU clock frequency through software timing.
#[derive(Debug, Parser)]
#[command(name = "mhz", version, about)]
struct Cli {
    /// Show the CPU frequency only (in MHz).
    #[arg(short = 'c', long = "cpu-only", conflicts_with = "tsc_only")]
    cpu_only: bool,

    /// Show the cycle-counter frequency only (in MHz).
    #[arg(short = 't', long = "tsc-only")]
    tsc_only: bool,

    /// Report integral frequencies only.
    #[arg(short = 'i', long = "integer")]
    integer: bool,

    /// Run continuously until killed.
    #[arg(short = 'l', long = "loop")]
    forever: bool,

    /// Emit each measurement as a JSON object.
    #[arg(long, conflicts_with_all = ["cpu_only", "tsc_only", "integer"])]
    json: bool,

    /// Log calibration retries and measurement faults.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Number of measurements (one line per measurement).
    #[arg(default_value_t = 1)]
    lines: u64,

    /// Pre-heat time in microseconds before the first measurement.
    #[arg(default_value_t = 0)]
    heat: u64,

    /// Initial calibration count; higher is slower but more accurate.
    /// Defaults to auto.
    count: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init().unwrap();

    if cli.tsc_only && !has_hardware_counter() {
        eprintln!("mhz: this architecture exposes no hardware cycle counter; -t is unavailable");
        return ExitCode::FAILURE;
    }

    let options = ReportOptions {
        scope: if cli.cpu_only {
            ReportScope::CpuOnly
        } else if cli.tsc_only {
            ReportScope::CounterOnly
        } else {
            ReportScope::Both
        },
        style: if cli.integer {
            FrequencyStyle::Integral
        } else {
            FrequencyStyle::Fractional
        },
    };

    if cli.heat > 0 {
        preheat::spin_for(Duration::from_micros(cli.heat));
    }

    let meter = FrequencyMeter::new();
    let mut count = match cli.count {
        Some(0) => {
            log::warn!("count must be at least 1; using default {}", DEFAULT_SEED_COUNT);
            DEFAULT_SEED_COUNT
        }
        Some(count) => count,
        None => DEFAULT_SEED_COUNT,
    };

    let mut remaining = cli.lines;
    while cli.forever || remaining > 0 {
        let measurement = meter.measure(count);
        // The calibrated count seeds the next round, amortizing
        // recalibration across the run.
        count = measurement.count;

        if cli.json {
            match output::json::to_json(&measurement) {
                Ok(json) => println!("{}", json),
                Err(err) => {
                    eprintln!("mhz: failed to serialize measurement: {}", err);
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", output::format_measurement(&measurement, &options));
        }

        remaining = remaining.saturating_sub(1);
    }

    ExitCode::SUCCESS
}
