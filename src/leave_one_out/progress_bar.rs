//! Iteration timing and optional progress display for leave-one-out runs.
//!
//! * [`IterTimer`] – per-iteration durations with an exponential moving average
//!   (`mean ← mean + α·(dt − mean)`, seeded by the first interval).
//! * [`fmt_dur`] – compact human-readable durations (`"253µs"`, `"42ms"`, `"3.14s"`).
//! * `LooProgress` – crate-internal wrapper drawing an `indicatif` bar when the `progress`
//!   feature is enabled, and doing nothing otherwise.
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Wall-clock time per leave-one-out query, smoothed with an exponential moving average.
pub struct IterTimer {
    last: Instant,
    smoothing: f64,
    mean_secs: Option<f64>,
    ticks: u64,
}

impl IterTimer {
    /// `smoothing` is the weight of the newest interval in the average.
    pub fn new(smoothing: f64) -> Self {
        IterTimer {
            last: Instant::now(),
            smoothing,
            mean_secs: None,
            ticks: 0,
        }
    }

    /// Close the current interval and fold it into the average.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now - std::mem::replace(&mut self.last, now);
        let secs = elapsed.as_secs_f64();

        self.mean_secs = Some(match self.mean_secs {
            Some(mean) => mean + self.smoothing * (secs - mean),
            None => secs,
        });
        self.ticks += 1;
        elapsed
    }

    /// Smoothed time per query, zero before the first tick.
    pub fn avg(&self) -> Duration {
        self.mean_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> u64 {
        self.ticks
    }
}

/// Short duration label for log lines and the progress bar.
pub fn fmt_dur(d: Duration) -> String {
    match d {
        d if d < Duration::from_millis(1) => format!("{}µs", d.as_micros()),
        d if d < Duration::from_secs(1) => format!("{}ms", d.as_millis()),
        d => format!("{:.2}s", d.as_secs_f64()),
    }
}

pub(crate) struct LooProgress {
    #[cfg(feature = "progress")]
    pb: ProgressBar,
}

impl LooProgress {
    #[cfg(feature = "progress")]
    pub(crate) fn new(total: usize) -> Self {
        let pb = ProgressBar::new((total as u64).max(1));
        if let Ok(style) = ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
        ) {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(200));
        Self { pb }
    }

    #[cfg(not(feature = "progress"))]
    pub(crate) fn new(_total: usize) -> Self {
        Self {}
    }

    /// One galaxy done, with timing shown in the bar message.
    #[allow(unused_variables)]
    pub(crate) fn step(&self, timer: Option<&IterTimer>) {
        #[cfg(feature = "progress")]
        {
            if let Some(t) = timer {
                self.pb.set_message(format!("avg: {}", fmt_dur(t.avg())));
            }
            self.pb.inc(1);
        }
    }

    pub(crate) fn interrupt(&self) {
        #[cfg(feature = "progress")]
        self.pb.set_message("Interrupted");
    }

    pub(crate) fn finish(self) {
        #[cfg(feature = "progress")]
        {
            self.pb.disable_steady_tick();
            self.pb.finish_and_clear();
        }
    }
}
