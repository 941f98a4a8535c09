//! Serializable window reports
//!
//! A [`WindowReport`] bundles everything a reporting or charting tool needs
//! about one query window: the resolved bins, `(A, N, T)`, `(L, Λ, w)`, the
//! flow decomposition, whether the invariant held, and how many input
//! presences the matrix dropped.

use crate::error::Result;
use crate::invariant::{FlowDecomposition, PresenceInvariant, PresenceMetrics, PresenceSummary, Window};
use serde::{Deserialize, Serialize};

/// Metrics and counts for one window, ready for JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub window: Window,
    pub summary: PresenceSummary,
    pub metrics: PresenceMetrics,
    pub decomposition: FlowDecomposition,
    /// Whether `|L - Λ·w|` was within the tolerance used to build the report
    pub invariant_holds: bool,
    /// Rows of the matrix the window was evaluated on
    pub matrix_rows: usize,
    /// Input presences excluded from the matrix for not overlapping its timescale
    pub dropped_presences: usize,
}

impl WindowReport {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl PresenceInvariant<'_> {
    /// Build a [`WindowReport`] for `[t0, t1)`
    ///
    /// # Errors
    /// `OutOfRangeWindow` under the same rules as every other query.
    pub fn window_report(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
        tolerance: f64,
    ) -> Result<WindowReport> {
        let window = self.window(t0, t1)?;
        let summary = self.summary_for_bins(window.start_bin, window.end_bin);
        let metrics = PresenceMetrics::from_summary(&summary);
        let decomposition = self.decomposition_for_bins(window.start_bin, window.end_bin);

        let invariant_holds = metrics.satisfies_invariant(tolerance);
        if !invariant_holds {
            tracing::warn!(
                "Presence invariant violated on [{}, {}): {} (tolerance {})",
                window.t0,
                window.t1,
                metrics,
                tolerance
            );
        }

        Ok(WindowReport {
            window,
            summary,
            metrics,
            decomposition,
            invariant_holds,
            matrix_rows: self.matrix().row_count(),
            dropped_presences: self.matrix().dropped_count(),
        })
    }
}
