//! Discretization of a continuous interval into equal-width bins
//!
//! A [`Timescale`] partitions `[t0, t1)` into `num_bins` bins of width
//! `bin_width`. Every coordinate conversion used by presence maps and window
//! queries lives here so that rounding conventions are applied in exactly one
//! place.
//!
//! # Rounding
//!
//! Bin coordinates are computed as `(t - t0) / bin_width`. Values that land
//! within `1e-9` of an integer are snapped to that integer before `floor` or
//! `ceil` is applied, so that `0.3 / 0.1 = 2.9999999999999996` does not
//! produce an off-by-one bin index for a time sitting on a bin edge.
//!
//! # Example
//!
//! ```
//! use presence_calculus::timescale::Timescale;
//!
//! let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
//! assert_eq!(ts.num_bins(), 6);
//! assert_eq!(ts.bin_index(2.5), 2);
//! assert_eq!(ts.bin_slice(0.0, 2.5), (0, 3));
//! assert_eq!(ts.fractional_overlap(0.25, 0.75, 0), 0.5);
//! ```

use crate::error::{PresenceError, Result};
use serde::Serialize;

/// Snap tolerance for bin coordinates (in bin units)
const SNAP_EPSILON: f64 = 1e-9;

/// Upper bound on `num_bins`; keeps every bin index representable as `i64`
pub const MAX_BINS: usize = u32::MAX as usize;

/// Equal-width discretization of `[t0, t1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timescale {
    t0: f64,
    t1: f64,
    bin_width: f64,
    num_bins: usize,
}

impl Timescale {
    /// Create a timescale over `[t0, t1)` with bins of `bin_width`
    ///
    /// # Errors
    /// Returns `InvalidTimescale` if any parameter is non-finite, `t1 <= t0`,
    /// `bin_width <= 0`, or the range needs more than [`MAX_BINS`] bins.
    pub fn new(t0: f64, t1: f64, bin_width: f64) -> Result<Self> {
        let invalid = |reason| PresenceError::InvalidTimescale {
            t0,
            t1,
            bin_width,
            reason,
        };

        if !(t0.is_finite() && t1.is_finite() && bin_width.is_finite()) {
            return Err(invalid("parameters must be finite"));
        }
        if t1 <= t0 {
            return Err(invalid("t1 must be greater than t0"));
        }
        if bin_width <= 0.0 {
            return Err(invalid("bin_width must be positive"));
        }

        let bins = snap((t1 - t0) / bin_width).ceil();
        if !bins.is_finite() || bins > MAX_BINS as f64 {
            return Err(invalid("too many bins"));
        }
        let num_bins = (bins as usize).max(1);

        Ok(Self {
            t0,
            t1,
            bin_width,
            num_bins,
        })
    }

    /// Start of the covered interval
    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// End of the covered interval (exclusive)
    pub fn t1(&self) -> f64 {
        self.t1
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// `ceil((t1 - t0) / bin_width)`
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Total covered duration `t1 - t0`
    pub fn duration(&self) -> f64 {
        self.t1 - self.t0
    }

    /// Whether `t` lies in `[t0, t1]`
    ///
    /// The closed upper bound matches window validation: a window may end
    /// exactly at `t1`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.t0 && t <= self.t1
    }

    /// Bin containing `t`: `floor((t - t0) / bin_width)`
    ///
    /// Not clipped: times before `t0` give negative indices and times at or
    /// after the last edge give indices `>= num_bins`. Callers clip.
    pub fn bin_index(&self, t: f64) -> i64 {
        self.scaled(t).floor() as i64
    }

    /// Exclusive upper bin for an interval ending at `t`: `ceil((t - t0) / bin_width)`
    pub fn bin_ceil(&self, t: f64) -> i64 {
        self.scaled(t).ceil() as i64
    }

    /// Start time of bin `bin`
    pub fn bin_start(&self, bin: i64) -> f64 {
        self.t0 + bin as f64 * self.bin_width
    }

    /// End time of bin `bin` (start of the next bin)
    pub fn bin_end(&self, bin: i64) -> f64 {
        self.bin_start(bin + 1)
    }

    /// Bin boundary times: exactly `num_bins + 1` entries, the last `>= t1`
    pub fn bin_edges(&self) -> Vec<f64> {
        let mut edges: Vec<f64> = (0..=self.num_bins as i64)
            .map(|i| self.bin_start(i))
            .collect();
        edges.truncate(self.num_bins + 1);
        if let Some(last) = edges.last_mut() {
            if *last < self.t1 {
                *last = self.t1;
            }
        }
        edges
    }

    /// Half-open bin range `[start_bin, end_bin)` touched by `[start, end)`
    ///
    /// The interval is clipped to `[t0, t1)` first. An interval that is empty
    /// after clipping yields an empty range `(b, b)`.
    pub fn bin_slice(&self, start: f64, end: f64) -> (usize, usize) {
        let start = start.max(self.t0);
        let end = end.min(self.t1);

        let start_bin = self.clamp_bin(self.bin_index(start));
        if end.is_nan() || end <= start {
            return (start_bin, start_bin);
        }

        let end_bin = self.clamp_bin(self.bin_ceil(end));
        if end_bin <= start_bin {
            // Both ends snapped onto one edge: fall back to the bin holding `start`
            let bin = self.containing_bin(start);
            return (bin, bin + 1);
        }
        (start_bin, end_bin)
    }

    /// Unsnapped bin holding `t`, clamped to `[0, num_bins - 1]`
    pub(crate) fn containing_bin(&self, t: f64) -> usize {
        let bin = ((t - self.t0) / self.bin_width).floor() as i64;
        bin.clamp(0, self.num_bins as i64 - 1) as usize
    }

    /// Fraction of bin `bin`'s width covered by `[start, end)`, in `[0, 1]`
    pub fn fractional_overlap(&self, start: f64, end: f64, bin: i64) -> f64 {
        let bin_start = self.bin_start(bin);
        let bin_end = self.bin_end(bin);
        let overlap = end.min(bin_end) - start.max(bin_start);
        if overlap.is_nan() || overlap <= 0.0 {
            return 0.0;
        }
        (overlap / self.bin_width).min(1.0)
    }

    fn scaled(&self, t: f64) -> f64 {
        snap((t - self.t0) / self.bin_width)
    }

    fn clamp_bin(&self, bin: i64) -> usize {
        bin.clamp(0, self.num_bins as i64) as usize
    }
}

fn snap(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        x
    }
}
