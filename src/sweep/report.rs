//! Human-readable sweep report.

use std::fmt;

use super::SweepResult;

impl fmt::Display for SweepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.dataset)?;
        writeln!(
            f,
            "{:>6}  {:>10}  {:>10}  {:>10}",
            "K", "min (%)", "avg (%)", "max (%)"
        )?;
        for stats in &self.statistics {
            writeln!(
                f,
                "{:>6}  {:>10.3}  {:>10.3}  {:>10.3}",
                stats.k, stats.min_accuracy, stats.avg_accuracy, stats.max_accuracy
            )?;
        }
        writeln!(
            f,
            "Best K-value is {} with best K-accuracy {:.3}",
            self.best_k, self.best_avg_accuracy
        )?;
        write!(f, "Time to run the experiment : {:.1} seconds", self.elapsed_secs)
    }
}
