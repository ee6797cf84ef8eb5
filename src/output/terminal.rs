//! Terminal output formatting.

use colored::Colorize;

use crate::result::{Measurement, MeasurementQuality};

/// Which estimates a report includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportScope {
    /// Full diagnostic line: count, both minima, both estimates.
    #[default]
    Both,
    /// Bare CPU frequency only.
    CpuOnly,
    /// Bare counter frequency only.
    CounterOnly,
}

/// Integral vs fractional frequency rendering.
///
/// An output-formatting choice, not a measurement difference: both styles
/// render the same computed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrequencyStyle {
    /// Three decimal places.
    #[default]
    Fractional,
    /// Rounded to a whole number of MHz (+0.5 then truncate).
    Integral,
}

/// Immutable reporting configuration, passed to the formatter at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Which estimates to include.
    pub scope: ReportScope,
    /// How to render frequencies.
    pub style: FrequencyStyle,
}

/// Format one measurement for terminal output.
///
/// The full scope renders the canonical diagnostic line:
///
/// ```text
/// count=<n> us50=<t1> us250=<t2> diff=<t2-t1> cpu_MHz=<f> tsc50=<c1> tsc250=<c2> diff=<c2-c1> rdtsc_MHz=<g>
/// ```
///
/// with the counter columns present only when a hardware counter exists.
/// Degraded rounds render `n/a` for underivable estimates and append a
/// warning line.
pub fn format_measurement(m: &Measurement, opts: &ReportOptions) -> String {
    let mut output = match opts.scope {
        ReportScope::CpuOnly => format_frequency(m.cpu_mhz, opts.style),
        ReportScope::CounterOnly => format_frequency(m.tsc_mhz, opts.style),
        ReportScope::Both => {
            let mut line = format!(
                "count={} us50={} us250={} diff={} cpu_MHz={}",
                m.count,
                m.short.wall_us,
                m.long.wall_us,
                m.wall_delta_us(),
                format_frequency(m.cpu_mhz, opts.style),
            );
            if let (Some(short_ticks), Some(long_ticks)) = (m.short.ticks, m.long.ticks) {
                line.push_str(&format!(
                    " tsc50={} tsc250={} diff={} rdtsc_MHz={}",
                    short_ticks,
                    long_ticks,
                    long_ticks.saturating_sub(short_ticks),
                    format_frequency(m.tsc_mhz, opts.style),
                ));
            }
            line
        }
    };

    if let Some(note) = quality_note(m.quality) {
        output.push('\n');
        output.push_str(&note.yellow().to_string());
    }

    output
}

/// Render a frequency in MHz, or `n/a` when the round could not derive one.
fn format_frequency(mhz: Option<f64>, style: FrequencyStyle) -> String {
    match (mhz, style) {
        (None, _) => "n/a".to_string(),
        (Some(mhz), FrequencyStyle::Fractional) => format!("{:.3}", mhz),
        (Some(mhz), FrequencyStyle::Integral) => format!("{}", (mhz + 0.5).trunc() as i64),
    }
}

fn quality_note(quality: MeasurementQuality) -> Option<&'static str> {
    match quality {
        MeasurementQuality::Calibrated => None,
        MeasurementQuality::FloorNotReached => {
            Some("warning: measurement window never reached the time floor; estimate may be noisy")
        }
        MeasurementQuality::Indistinguishable => {
            Some("warning: timer could not distinguish the two workloads; no frequency derived")
        }
    }
}
