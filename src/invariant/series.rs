// Metric series over the bins of a presence matrix
//
// A cumulative series shows how L, Λ, and w evolve as the observation window
// grows from the start of the timescale; a sliding series shows them over a
// fixed-length window that moves one bin at a time. Both are sample paths of
// the presence invariant and feed the charting collaborators directly.

use super::metrics::{PresenceMetrics, PresenceSummary, Window};
use super::query::PresenceInvariant;
use serde::{Deserialize, Serialize};

/// Metrics for the window ending at one bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Last bin included in the window
    pub bin: usize,
    pub window: Window,
    pub summary: PresenceSummary,
    pub metrics: PresenceMetrics,
}

impl PresenceInvariant<'_> {
    /// Metrics over `[ts.t0, bin_end(k))` for every bin `k`
    pub fn cumulative_series(&self) -> Vec<MetricPoint> {
        let bins = self.matrix().timescale().num_bins();
        (0..bins).map(|bin| self.point(0, bin + 1)).collect()
    }

    /// Metrics over the `window_bins` bins ending at each bin
    ///
    /// Windows near the start of the timescale are truncated to the bins
    /// available. Returns an empty series when `window_bins` is zero.
    pub fn sliding_series(&self, window_bins: usize) -> Vec<MetricPoint> {
        if window_bins == 0 {
            return Vec::new();
        }
        let bins = self.matrix().timescale().num_bins();
        (0..bins)
            .map(|bin| self.point((bin + 1).saturating_sub(window_bins), bin + 1))
            .collect()
    }

    fn point(&self, start_bin: usize, end_bin: usize) -> MetricPoint {
        let ts = self.matrix().timescale();
        let summary = self.summary_for_bins(start_bin, end_bin);
        MetricPoint {
            bin: end_bin - 1,
            window: Window {
                t0: ts.bin_start(start_bin as i64),
                t1: ts.bin_end(end_bin as i64 - 1).min(ts.t1()),
                start_bin,
                end_bin,
            },
            summary,
            metrics: PresenceMetrics::from_summary(&summary),
        }
    }
}
