//! End-of-run summary

use std::fmt;
use std::time::Duration;

use crate::metrics::RunMetrics;

/// Read-only snapshot derived once after every worker has joined.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Protocol the run exercised.
    pub protocol: &'static str,
    /// Measured wall-clock duration of the run.
    pub duration: Duration,
    /// Total worker count (1 writer + `read_ratio` readers).
    pub workers: usize,
    /// Configured read ratio.
    pub read_ratio: usize,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Final counter totals.
    pub metrics: RunMetrics,
}

impl RunSummary {
    /// Reads per second over the measured duration.
    pub fn checks_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.metrics.reads_total() as f64 / secs
        } else {
            0.0
        }
    }

    /// Read/write ratio actually observed, or `None` when nothing was
    /// written.
    pub fn observed_read_ratio(&self) -> Option<f64> {
        if self.metrics.writes_ok > 0 {
            Some(self.metrics.reads_total() as f64 / self.metrics.writes_ok as f64)
        } else {
            None
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(64);
        writeln!(f, "{rule}")?;
        writeln!(f, "   {} workload complete", self.protocol)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "  Duration:        {:.1}s", self.duration.as_secs_f64())?;
        writeln!(f, "  Workers:         {}", self.workers)?;
        writeln!(
            f,
            "  Mode:            {}",
            if self.dry_run { "DRY RUN" } else { "LIVE" }
        )?;
        writeln!(f, "  Checks/sec:      {:.1}", self.checks_per_second())?;
        writeln!(f, "  Writes ok:       {}", self.metrics.writes_ok)?;
        writeln!(f, "  Writes failed:   {}", self.metrics.writes_failed)?;
        writeln!(f, "  Reads positive:  {}", self.metrics.reads_positive)?;
        writeln!(f, "  Reads negative:  {}", self.metrics.reads_negative)?;
        writeln!(f, "  Reads failed:    {}", self.metrics.reads_failed)?;
        if let Some(ratio) = self.observed_read_ratio() {
            writeln!(f, "  Read/write:      {ratio:.1}:1")?;
        }
        write!(f, "{rule}")
    }
}
