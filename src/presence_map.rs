//! Mapping of one presence onto a timescale
//!
//! A [`PresenceMap`] records which bins a presence touches and how much of
//! its first and last bin it covers. Interior bins are always fully covered,
//! so four numbers describe a whole row of the presence matrix:
//!
//! ```text
//! presence      |-----------------------|
//! bins      |  0   |  1   |  2   |  3   |  4   |
//! values      0.5    1.0    1.0    0.75
//!             ^start_value         ^end_value
//! start_bin = 0, end_bin = 4 (exclusive)
//! ```
//!
//! Presences that do not overlap the timescale, or whose overlap has zero
//! length, have no map.

use crate::presence::Presence;
use crate::timescale::Timescale;
use serde::Serialize;

/// Coverage below this fraction of a bin is treated as floating-point noise
const EDGE_EPSILON: f64 = 1e-12;

/// Bin range and fractional edge coverage of one presence on one timescale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresenceMap {
    /// First bin touched
    pub start_bin: usize,
    /// One past the last bin touched
    pub end_bin: usize,
    /// Fraction of `start_bin` covered, in `(0, 1]`
    pub start_value: f64,
    /// Fraction of `end_bin - 1` covered, in `(0, 1]`
    pub end_value: f64,
}

impl PresenceMap {
    /// Map `presence` onto `timescale`, or `None` if it has no overlap
    ///
    /// The presence is clipped to `[t0, t1)` first. A presence starting or
    /// ending exactly on a bin edge never includes the empty neighbouring bin.
    pub fn compute(presence: &Presence, timescale: &Timescale) -> Option<Self> {
        let clipped = presence.clip(timescale.t0(), timescale.t1())?;
        let start = clipped.start();
        let end = clipped.end_time();
        if end <= start {
            return None;
        }

        let mut start_bin = timescale.bin_index(start).max(0);
        let mut end_bin = timescale
            .bin_ceil(end)
            .min(timescale.num_bins() as i64);

        if end_bin - start_bin > 1
            && timescale.fractional_overlap(start, end, start_bin) <= EDGE_EPSILON
        {
            start_bin += 1;
        }
        if end_bin - start_bin > 1
            && timescale.fractional_overlap(start, end, end_bin - 1) <= EDGE_EPSILON
        {
            end_bin -= 1;
        }
        if end_bin <= start_bin {
            start_bin = timescale.containing_bin(start) as i64;
            end_bin = start_bin + 1;
        }

        let start_value = timescale.fractional_overlap(start, end, start_bin);
        if start_value <= 0.0 {
            return None;
        }
        let end_value = if end_bin - start_bin == 1 {
            start_value
        } else {
            timescale.fractional_overlap(start, end, end_bin - 1)
        };

        Some(Self {
            start_bin: start_bin as usize,
            end_bin: end_bin as usize,
            start_value,
            end_value,
        })
    }

    /// Number of bins touched
    pub fn span(&self) -> usize {
        self.end_bin - self.start_bin
    }

    pub fn covers(&self, bin: usize) -> bool {
        bin >= self.start_bin && bin < self.end_bin
    }

    /// Whether the touched range intersects bins `[lo, hi)`
    pub fn intersects(&self, lo: usize, hi: usize) -> bool {
        self.start_bin < hi && self.end_bin > lo
    }

    /// Matrix value at `bin`: edge fraction, `1.0` inside, `0.0` outside
    pub fn value_at(&self, bin: usize) -> f64 {
        if !self.covers(bin) {
            0.0
        } else if bin == self.start_bin {
            self.start_value
        } else if bin == self.end_bin - 1 {
            self.end_value
        } else {
            1.0
        }
    }

    /// Sum of values over bins `[lo, hi)` without materializing the row
    pub fn mass_in(&self, lo: usize, hi: usize) -> f64 {
        let mut lo = lo.max(self.start_bin);
        let mut hi = hi.min(self.end_bin);
        if lo >= hi {
            return 0.0;
        }

        let mut mass = 0.0;
        if lo == self.start_bin {
            mass += self.start_value;
            lo += 1;
        }
        if hi == self.end_bin && hi > lo {
            mass += self.end_value;
            hi -= 1;
        }
        mass + hi.saturating_sub(lo) as f64
    }

    /// Row sum over the whole timescale, in bin units
    pub fn total_mass(&self) -> f64 {
        self.mass_in(self.start_bin, self.end_bin)
    }
}
