// Window, summary, and derived metric types
//
// All rates are per bin, not per unit of wall-clock time, so the identity
// L = Λ·w holds independent of the bin width.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated query window and the bins it resolves to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Requested window start
    pub t0: f64,
    /// Requested window end
    pub t1: f64,
    /// First bin of the window
    pub start_bin: usize,
    /// One past the last bin of the window
    pub end_bin: usize,
}

impl Window {
    /// Number of bins `T`
    pub fn bins(&self) -> usize {
        self.end_bin - self.start_bin
    }

    /// `t0 >= t1`: every metric over this window is zero
    pub fn is_degenerate(&self) -> bool {
        self.t0 >= self.t1
    }
}

/// Raw window totals `(A, N, T)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceSummary {
    /// `A`: total presence mass inside the window, in bin units
    pub presence_mass: f64,
    /// `N`: presences active in at least one window bin
    pub active_presences: usize,
    /// `T`: window length in bins
    pub bins: usize,
}

impl PresenceSummary {
    pub fn empty() -> Self {
        Self {
            presence_mass: 0.0,
            active_presences: 0,
            bins: 0,
        }
    }

    /// `(A, N, T)`
    pub fn as_tuple(&self) -> (f64, usize, usize) {
        (self.presence_mass, self.active_presences, self.bins)
    }
}

/// Derived flow metrics `(L, Λ, w)`
///
/// Zero denominators resolve to `0.0`.
///
/// # Example
/// ```
/// use presence_calculus::invariant::{PresenceMetrics, PresenceSummary};
///
/// let summary = PresenceSummary { presence_mass: 6.4, active_presences: 4, bins: 6 };
/// let metrics = PresenceMetrics::from_summary(&summary);
/// assert!((metrics.flow_rate - 4.0 / 6.0).abs() < 1e-12);
/// assert!((metrics.avg_residence_time - 1.6).abs() < 1e-12);
/// assert!(metrics.satisfies_invariant(1e-9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceMetrics {
    /// `L = A / T`: average presence per bin
    pub presence_density: f64,
    /// `Λ = N / T`: active presences per bin
    pub flow_rate: f64,
    /// `w = A / N`: average residence time per presence, in bins
    pub avg_residence_time: f64,
}

impl PresenceMetrics {
    pub fn from_summary(summary: &PresenceSummary) -> Self {
        let mass = summary.presence_mass;
        let count = summary.active_presences as f64;
        let bins = summary.bins as f64;

        Self {
            presence_density: ratio(mass, bins),
            flow_rate: ratio(count, bins),
            avg_residence_time: ratio(mass, count),
        }
    }

    /// `(L, Λ, w)`
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.presence_density, self.flow_rate, self.avg_residence_time)
    }

    /// Whether `|L - Λ·w| <= tolerance`
    pub fn satisfies_invariant(&self, tolerance: f64) -> bool {
        (self.presence_density - self.flow_rate * self.avg_residence_time).abs() <= tolerance
    }
}

impl fmt::Display for PresenceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L={:.4} Λ={:.4} w={:.4}",
            self.presence_density, self.flow_rate, self.avg_residence_time
        )
    }
}

/// The four-way decomposition of the active presences `N`
///
/// `starting + arrivals == N == departures + ending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowDecomposition {
    /// Already present before the window's first bin
    pub starting: usize,
    /// Started inside the window
    pub arrivals: usize,
    /// Ended inside the window
    pub departures: usize,
    /// Still present after the window's last bin (always includes open presences)
    pub ending: usize,
}

impl FlowDecomposition {
    /// `N` counted from the start side
    pub fn active(&self) -> usize {
        self.starting + self.arrivals
    }

    /// Whether both sides of the decomposition count the same presences
    pub fn is_balanced(&self) -> bool {
        self.starting + self.arrivals == self.departures + self.ending
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
