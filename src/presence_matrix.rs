//! Presence matrix: presences discretized onto a shared timescale
//!
//! Each row is one presence; each column is one bin of the timescale. A row
//! holds `1.0` in every bin the presence fully covers and the fractional
//! coverage in its first and last bin. The matrix is stored sparsely as one
//! [`PresenceMap`] per row, so row, column, point, and rectangular access are
//! all computed on demand without a dense `rows x bins` allocation.
//!
//! Presences that never overlap the timescale are dropped during construction.
//! They do not appear in [`PresenceMatrix::shape`]; compare
//! [`PresenceMatrix::dropped_count`] against the input size to detect the loss.
//!
//! # Example
//!
//! ```
//! use presence_calculus::presence::Presence;
//! use presence_calculus::presence_matrix::PresenceMatrix;
//! use presence_calculus::timescale::Timescale;
//!
//! let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
//! let presences = vec![
//!     Presence::from_ids("a", "queue", 0.0, 2.0).unwrap(),
//!     Presence::from_ids("b", "queue", 1.5, 3.0).unwrap(),
//!     Presence::from_ids("c", "queue", 8.0, 9.0).unwrap(), // outside: dropped
//! ];
//!
//! let matrix = PresenceMatrix::new(presences, ts);
//! assert_eq!(matrix.shape(), (2, 6));
//! assert_eq!(matrix.dropped_count(), 1);
//! assert_eq!(matrix.row(1).unwrap(), vec![0.0, 0.5, 1.0, 0.0, 0.0, 0.0]);
//! assert_eq!(matrix.column(1).unwrap(), vec![1.0, 0.5]);
//! ```

use crate::presence::Presence;
use crate::presence_map::PresenceMap;
use crate::timescale::Timescale;
use std::ops::Range;

/// Presences and their maps on one timescale
#[derive(Debug, Clone)]
pub struct PresenceMatrix {
    timescale: Timescale,
    presences: Vec<Presence>,
    maps: Vec<PresenceMap>,
    dropped: usize,
}

impl PresenceMatrix {
    /// Map every presence onto `timescale`, keeping those that overlap it
    ///
    /// Row order is the input order of the kept presences.
    pub fn new(presences: impl IntoIterator<Item = Presence>, timescale: Timescale) -> Self {
        let mut kept = Vec::new();
        let mut maps = Vec::new();
        let mut dropped = 0;

        for presence in presences {
            match PresenceMap::compute(&presence, &timescale) {
                Some(map) => {
                    kept.push(presence);
                    maps.push(map);
                }
                None => {
                    tracing::trace!("Dropping presence {} outside timescale", presence);
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(
                "Presence matrix dropped {} of {} presences not overlapping [{}, {})",
                dropped,
                dropped + kept.len(),
                timescale.t0(),
                timescale.t1()
            );
        }

        Self {
            timescale,
            presences: kept,
            maps,
            dropped,
        }
    }

    pub fn timescale(&self) -> &Timescale {
        &self.timescale
    }

    /// `(kept rows, bins)`
    pub fn shape(&self) -> (usize, usize) {
        (self.presences.len(), self.timescale.num_bins())
    }

    pub fn row_count(&self) -> usize {
        self.presences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presences.is_empty()
    }

    /// Number of input presences excluded because they never overlap the timescale
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn presences(&self) -> &[Presence] {
        &self.presences
    }

    pub fn presence(&self, row: usize) -> Option<&Presence> {
        self.presences.get(row)
    }

    pub fn maps(&self) -> &[PresenceMap] {
        &self.maps
    }

    pub fn map(&self, row: usize) -> Option<&PresenceMap> {
        self.maps.get(row)
    }

    /// Iterate `(presence, map)` pairs in row order
    pub fn rows(&self) -> impl Iterator<Item = (&Presence, &PresenceMap)> {
        self.presences.iter().zip(self.maps.iter())
    }

    /// Value at `(row, col)`, `None` when either index is out of range
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.timescale.num_bins() {
            return None;
        }
        self.maps.get(row).map(|m| m.value_at(col))
    }

    /// Materialized row
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        let map = self.maps.get(row)?;
        Some(
            (0..self.timescale.num_bins())
                .map(|bin| map.value_at(bin))
                .collect(),
        )
    }

    /// Sum of `row` over bins `cols`, in bin units
    pub fn row_mass(&self, row: usize, cols: Range<usize>) -> Option<f64> {
        self.maps.get(row).map(|m| m.mass_in(cols.start, cols.end))
    }

    /// Materialized column
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.timescale.num_bins() {
            return None;
        }
        Some(self.maps.iter().map(|m| m.value_at(col)).collect())
    }

    /// Column totals over all rows for bins `cols` (clamped to the timescale)
    ///
    /// Computed in `O(rows + bins)` from the stored maps using a difference
    /// array for the interior runs of `1.0`.
    pub fn column_sums(&self, cols: Range<usize>) -> Vec<f64> {
        let bins = self.timescale.num_bins();
        let mut edges = vec![0.0; bins];
        let mut interior = vec![0.0; bins + 1];

        for map in &self.maps {
            edges[map.start_bin] += map.start_value;
            if map.span() > 1 {
                edges[map.end_bin - 1] += map.end_value;
            }
            if map.span() > 2 {
                interior[map.start_bin + 1] += 1.0;
                interior[map.end_bin - 1] -= 1.0;
            }
        }

        let mut running = 0.0;
        let totals: Vec<f64> = (0..bins)
            .map(|bin| {
                running += interior[bin];
                running + edges[bin]
            })
            .collect();

        let end = cols.end.min(bins);
        let start = cols.start.min(end);
        totals[start..end].to_vec()
    }

    /// Rectangular block `rows x cols`, both ranges clamped to the shape
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Vec<Vec<f64>> {
        let row_end = rows.end.min(self.row_count());
        let col_end = cols.end.min(self.timescale.num_bins());
        let col_start = cols.start.min(col_end);

        self.maps[rows.start.min(row_end)..row_end]
            .iter()
            .map(|m| (col_start..col_end).map(|bin| m.value_at(bin)).collect())
            .collect()
    }

    /// Full dense matrix
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.slice(0..self.row_count(), 0..self.timescale.num_bins())
    }
}
