// Window queries over a presence matrix
//
// Every public entry point resolves its window once (defaults, range check,
// bin snapping) and then works on bin indices only.

use super::metrics::{FlowDecomposition, PresenceMetrics, PresenceSummary, Window};
use crate::error::{PresenceError, Result};
use crate::presence_matrix::PresenceMatrix;

/// Stateless window-query object over one presence matrix
///
/// Queries are pure functions of `(matrix, t0, t1)`. Either bound may be
/// omitted (`None`) and defaults to the matrix timescale's bound.
///
/// # Example
///
/// ```
/// use presence_calculus::invariant::PresenceInvariant;
/// use presence_calculus::presence::{Presence, PresenceEnd};
/// use presence_calculus::presence_matrix::PresenceMatrix;
/// use presence_calculus::timescale::Timescale;
///
/// let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
/// let matrix = PresenceMatrix::new(
///     vec![
///         Presence::from_ids("a", "q", 0.0, 2.0).unwrap(),
///         Presence::from_ids("b", "q", 1.5, 3.0).unwrap(),
///         Presence::from_ids("c", "q", 3.0, 4.5).unwrap(),
///         Presence::from_ids("d", "q", 4.6, PresenceEnd::Unbounded).unwrap(),
///     ],
///     ts,
/// );
/// let invariant = PresenceInvariant::new(&matrix);
///
/// assert_eq!(invariant.flow_rate(0.0, 1.0).unwrap(), 1.0);
/// assert_eq!(invariant.departure_count(None, None).unwrap(), 3);
/// assert!(invariant.flow_rate(6.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PresenceInvariant<'a> {
    matrix: &'a PresenceMatrix,
}

impl<'a> PresenceInvariant<'a> {
    pub fn new(matrix: &'a PresenceMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &'a PresenceMatrix {
        self.matrix
    }

    /// Resolve and validate a query window
    ///
    /// # Errors
    /// `OutOfRangeWindow` if either bound lies outside `[ts.t0, ts.t1]`.
    /// A window with `t0 >= t1` is valid and resolves to zero bins.
    pub fn window(&self, t0: impl Into<Option<f64>>, t1: impl Into<Option<f64>>) -> Result<Window> {
        let ts = self.matrix.timescale();
        let t0 = t0.into().unwrap_or(ts.t0());
        let t1 = t1.into().unwrap_or(ts.t1());

        if !(ts.contains(t0) && ts.contains(t1)) {
            tracing::debug!(
                "Rejecting window [{}, {}) outside timescale [{}, {}]",
                t0,
                t1,
                ts.t0(),
                ts.t1()
            );
            return Err(PresenceError::OutOfRangeWindow {
                t0,
                t1,
                timescale_t0: ts.t0(),
                timescale_t1: ts.t1(),
            });
        }

        let (start_bin, end_bin) = if t0 < t1 {
            ts.bin_slice(t0, t1)
        } else {
            ts.bin_slice(t0, t0)
        };

        Ok(Window {
            t0,
            t1,
            start_bin,
            end_bin,
        })
    }

    /// `(A, N, T)` over `[t0, t1)`
    pub fn get_presence_summary(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<PresenceSummary> {
        let window = self.window(t0, t1)?;
        Ok(self.summary_for_bins(window.start_bin, window.end_bin))
    }

    /// `(L, Λ, w)` over `[t0, t1)`
    pub fn get_presence_metrics(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<PresenceMetrics> {
        let summary = self.get_presence_summary(t0, t1)?;
        Ok(PresenceMetrics::from_summary(&summary))
    }

    /// `Λ = N / T`
    pub fn flow_rate(&self, t0: impl Into<Option<f64>>, t1: impl Into<Option<f64>>) -> Result<f64> {
        Ok(self.get_presence_metrics(t0, t1)?.flow_rate)
    }

    /// `w = A / N`
    pub fn avg_residence_time(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<f64> {
        Ok(self.get_presence_metrics(t0, t1)?.avg_residence_time)
    }

    /// `L = A / T`
    pub fn avg_presence_per_unit_time(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<f64> {
        Ok(self.get_presence_metrics(t0, t1)?.presence_density)
    }

    /// All four counts of the flow decomposition over `[t0, t1)`
    pub fn flow_decomposition(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<FlowDecomposition> {
        let window = self.window(t0, t1)?;
        Ok(self.decomposition_for_bins(window.start_bin, window.end_bin))
    }

    /// Active presences that were already present before the window
    pub fn starting_presence_count(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<usize> {
        Ok(self.flow_decomposition(t0, t1)?.starting)
    }

    /// Active presences that started inside the window
    pub fn arrival_count(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<usize> {
        Ok(self.flow_decomposition(t0, t1)?.arrivals)
    }

    /// Active presences that ended inside the window
    pub fn departure_count(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<usize> {
        Ok(self.flow_decomposition(t0, t1)?.departures)
    }

    /// Active presences still present after the window, including open ones
    pub fn ending_presence_count(
        &self,
        t0: impl Into<Option<f64>>,
        t1: impl Into<Option<f64>>,
    ) -> Result<usize> {
        Ok(self.flow_decomposition(t0, t1)?.ending)
    }

    pub(crate) fn summary_for_bins(&self, start_bin: usize, end_bin: usize) -> PresenceSummary {
        if start_bin >= end_bin {
            return PresenceSummary::empty();
        }

        let (presence_mass, active_presences) = self
            .matrix
            .maps()
            .iter()
            .filter(|map| map.intersects(start_bin, end_bin))
            .fold((0.0, 0), |(mass, count), map| {
                (mass + map.mass_in(start_bin, end_bin), count + 1)
            });

        PresenceSummary {
            presence_mass,
            active_presences,
            bins: end_bin - start_bin,
        }
    }

    pub(crate) fn decomposition_for_bins(&self, start_bin: usize, end_bin: usize) -> FlowDecomposition {
        let mut decomposition = FlowDecomposition::default();
        if start_bin >= end_bin {
            return decomposition;
        }

        let ts = self.matrix.timescale();
        for (presence, map) in self.matrix.rows() {
            if !map.intersects(start_bin, end_bin) {
                continue;
            }

            // Raw (unclipped) bins: a presence that began before t0 or runs
            // past t1 of the timescale is starting/ending, never arriving/departing.
            if ts.bin_index(presence.start()) < start_bin as i64 {
                decomposition.starting += 1;
            } else {
                decomposition.arrivals += 1;
            }

            if presence.is_open() || ts.bin_ceil(presence.end_time()) > end_bin as i64 {
                decomposition.ending += 1;
            } else {
                decomposition.departures += 1;
            }
        }

        decomposition
    }
}
