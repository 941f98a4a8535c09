// Presence invariant: finite-window flow metrics
//
// For any window [t0, t1) over a presence matrix:
//
//   A = presence mass inside the window     (bin units)
//   N = presences active inside the window
//   T = window length in bins
//
//   L = A/T,  Λ = N/T,  w = A/N   and   L = Λ·w
//
// The identity is a finite-window form of Little's Law. It holds for every
// window, whether or not the system is in equilibrium, because it is an
// algebraic consequence of how A, N, and T are counted.

mod metrics;
mod query;
mod series;

pub use metrics::{FlowDecomposition, PresenceMetrics, PresenceSummary, Window};
pub use query::PresenceInvariant;
pub use series::MetricPoint;

#[cfg(test)]
mod tests;
