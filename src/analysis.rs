//! End-to-end presence analysis
//!
//! [`PresenceAnalysis`] wires the pipeline together for one run:
//!
//! ```text
//! presences ─▶ BasisTopology ─▶ closure() ─▶ PresenceMatrix ─▶ PresenceInvariant
//!                                  (optional)    (timescale)       (window queries)
//! ```
//!
//! # Example
//!
//! ```
//! use presence_calculus::analysis::PresenceAnalysis;
//! use presence_calculus::config::AnalysisConfig;
//! use presence_calculus::presence::Presence;
//!
//! # fn main() -> anyhow::Result<()> {
//! let presences = vec![
//!     Presence::from_ids("a", "queue", 0.0, 2.0)?,
//!     Presence::from_ids("a", "queue", 1.0, 3.0)?, // same stay, recorded twice
//!     Presence::from_ids("b", "queue", 2.0, 4.0)?,
//! ];
//!
//! let analysis = PresenceAnalysis::new(AnalysisConfig::new(0.0, 4.0, 1.0), presences)?;
//! assert_eq!(analysis.matrix().row_count(), 2);
//!
//! let metrics = analysis.invariant().get_presence_metrics(None, None)?;
//! assert_eq!(metrics.flow_rate, 0.5);
//! assert!(metrics.satisfies_invariant(analysis.config().tolerance));
//! # Ok(())
//! # }
//! ```

use crate::config::AnalysisConfig;
use crate::event_log::PresenceLog;
use crate::invariant::PresenceInvariant;
use crate::presence::Presence;
use crate::presence_matrix::PresenceMatrix;
use crate::report::WindowReport;
use crate::topology::BasisTopology;
use anyhow::{Context, Result};

/// One analysis run: configuration, topology, and the matrix built from it
#[derive(Debug, Clone)]
pub struct PresenceAnalysis {
    config: AnalysisConfig,
    topology: BasisTopology,
    matrix: PresenceMatrix,
    input_count: usize,
}

impl PresenceAnalysis {
    /// Build the topology and matrix for `presences`
    ///
    /// # Errors
    /// Returns error if the configuration fails validation.
    pub fn new(config: AnalysisConfig, presences: impl IntoIterator<Item = Presence>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid analysis configuration: {}", e))?;
        let timescale = config
            .timescale()
            .context("Failed to build analysis timescale")?;

        let presences: Vec<Presence> = presences.into_iter().collect();
        let input_count = presences.len();
        let topology = BasisTopology::new(presences.iter().cloned());

        let rows = if config.apply_closure {
            topology.closure()
        } else {
            presences
        };
        let matrix = PresenceMatrix::new(rows, timescale);

        tracing::debug!(
            "Presence analysis: {} inputs, {} covers, {} matrix rows, {} dropped",
            input_count,
            topology.cover_count(),
            matrix.row_count(),
            matrix.dropped_count()
        );

        Ok(Self {
            config,
            topology,
            matrix,
            input_count,
        })
    }

    /// Build an analysis from every presence recorded in `log`
    pub fn from_log(config: AnalysisConfig, log: PresenceLog) -> Result<Self> {
        Self::new(config, log.into_presences())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Topology over the raw input presences
    pub fn topology(&self) -> &BasisTopology {
        &self.topology
    }

    pub fn matrix(&self) -> &PresenceMatrix {
        &self.matrix
    }

    /// Number of presences given to [`PresenceAnalysis::new`]
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Query object over the matrix
    pub fn invariant(&self) -> PresenceInvariant<'_> {
        PresenceInvariant::new(&self.matrix)
    }

    /// Window report using the configured tolerance
    pub fn report(&self, t0: impl Into<Option<f64>>, t1: impl Into<Option<f64>>) -> Result<WindowReport> {
        self.invariant()
            .window_report(t0, t1, self.config.tolerance)
            .context("Failed to build window report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Boundary, Element};
    use crate::presence::PresenceEnd;
    use std::sync::Arc;

    fn p(element: &str, start: f64, end: impl Into<PresenceEnd>) -> Presence {
        Presence::from_ids(element, "queue", start, end).unwrap()
    }

    #[test]
    fn test_closure_applied_by_default() {
        let analysis = PresenceAnalysis::new(
            AnalysisConfig::new(0.0, 6.0, 1.0),
            vec![p("a", 0.0, 2.0), p("a", 1.5, 3.0), p("b", 4.0, 5.0)],
        )
        .unwrap();

        assert_eq!(analysis.input_count(), 3);
        assert_eq!(analysis.topology().len(), 3);
        assert_eq!(analysis.matrix().row_count(), 2);
        assert_eq!(analysis.matrix().presence(0).unwrap().end_time(), 3.0);
    }

    #[test]
    fn test_raw_keeps_input_order() {
        let analysis = PresenceAnalysis::new(
            AnalysisConfig::raw(0.0, 6.0, 1.0),
            vec![p("b", 4.0, 5.0), p("a", 0.0, 2.0), p("a", 1.5, 3.0)],
        )
        .unwrap();

        let starts: Vec<f64> = analysis
            .matrix()
            .presences()
            .iter()
            .map(Presence::start)
            .collect();
        assert_eq!(starts, vec![4.0, 0.0, 1.5]);
    }

    #[test]
    fn test_closure_changes_counts() {
        let presences = vec![p("a", 0.0, 2.0), p("a", 1.0, 3.0)];
        let closed =
            PresenceAnalysis::new(AnalysisConfig::new(0.0, 4.0, 1.0), presences.clone()).unwrap();
        let raw = PresenceAnalysis::new(AnalysisConfig::raw(0.0, 4.0, 1.0), presences).unwrap();

        assert_eq!(closed.invariant().flow_rate(None, None).unwrap(), 0.25);
        assert_eq!(raw.invariant().flow_rate(None, None).unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_config() {
        let result = PresenceAnalysis::new(AnalysisConfig::new(1.0, 0.0, 1.0), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_log() {
        let queue = Arc::new(Boundary::new("queue"));
        let a = Arc::new(Element::new("a"));
        let mut log = PresenceLog::new("sim");
        log.record_entry(&a, &queue, 1.0).unwrap();
        log.record_exit(&a, &queue, 2.0).unwrap();
        log.record_entry(&a, &queue, 2.0).unwrap();

        let analysis = PresenceAnalysis::from_log(AnalysisConfig::new(0.0, 4.0, 1.0), log).unwrap();
        // [1,2) and [2,∞) touch, so closure joins them into one open presence
        assert_eq!(analysis.matrix().row_count(), 1);
        let d = analysis.invariant().flow_decomposition(None, None).unwrap();
        assert_eq!(d.arrivals, 1);
        assert_eq!(d.ending, 1);
    }

    #[test]
    fn test_report_uses_configured_tolerance() {
        let analysis =
            PresenceAnalysis::new(AnalysisConfig::new(0.0, 6.0, 1.0), vec![p("a", 0.5, 5.5)])
                .unwrap();
        let report = analysis.report(None, None).unwrap();
        assert!(report.invariant_holds);
        assert!(analysis.report(0.0, 7.0).is_err());
    }
}
