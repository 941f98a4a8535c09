//! Presence assertions
//!
//! A [`Presence`] asserts that an element occupied a boundary continuously
//! over `[start, end)`. The end may be [`PresenceEnd::Unbounded`] for a
//! presence that is still open when the data was collected.
//!
//! Presences are immutable. [`Presence::clip`] and the topology's join build
//! new values; `None` is the empty result when there is nothing to return.
//!
//! # Example
//!
//! ```
//! use presence_calculus::presence::{Presence, PresenceEnd};
//!
//! let p = Presence::from_ids("order-1", "packing", 1.5, 3.0).unwrap();
//! assert!(p.overlaps(0.0, 2.0));
//! assert_eq!(p.residence_time(0.0, 2.0), 0.5);
//!
//! let open = Presence::from_ids("order-2", "packing", 4.6, PresenceEnd::Unbounded).unwrap();
//! assert!(open.is_open());
//! assert_eq!(open.duration(), f64::INFINITY);
//! ```

use crate::entity::{Boundary, Element, Entity};
use crate::error::{PresenceError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Provenance given to presences built without an explicit source
pub const DEFAULT_PROVENANCE: &str = "observed";

/// End of a presence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceEnd {
    /// The element left the boundary at this time
    Bounded(f64),
    /// The element had not left when the data was collected
    Unbounded,
}

impl PresenceEnd {
    /// End time as a float, `+inf` when unbounded
    pub fn as_f64(&self) -> f64 {
        match self {
            PresenceEnd::Bounded(t) => *t,
            PresenceEnd::Unbounded => f64::INFINITY,
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, PresenceEnd::Bounded(_))
    }

    /// Total order on end times; `Unbounded` sorts after every bounded end
    pub fn cmp_end(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PresenceEnd::Unbounded, PresenceEnd::Unbounded) => Ordering::Equal,
            (PresenceEnd::Unbounded, PresenceEnd::Bounded(_)) => Ordering::Greater,
            (PresenceEnd::Bounded(_), PresenceEnd::Unbounded) => Ordering::Less,
            (PresenceEnd::Bounded(a), PresenceEnd::Bounded(b)) => a.total_cmp(b),
        }
    }

    /// The later of two ends
    pub fn later(self, other: Self) -> Self {
        match self.cmp_end(&other) {
            Ordering::Less => other,
            _ => self,
        }
    }
}

impl From<f64> for PresenceEnd {
    fn from(t: f64) -> Self {
        if t == f64::INFINITY {
            PresenceEnd::Unbounded
        } else {
            PresenceEnd::Bounded(t)
        }
    }
}

impl fmt::Display for PresenceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceEnd::Bounded(t) => write!(f, "{}", t),
            PresenceEnd::Unbounded => write!(f, "∞"),
        }
    }
}

/// Assertion that an element was continuously in a boundary over `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presence {
    element: Arc<Element>,
    boundary: Arc<Boundary>,
    start: f64,
    end: PresenceEnd,
    provenance: String,
}

impl Presence {
    /// Create a presence
    ///
    /// A bounded end of `+inf` is normalized to [`PresenceEnd::Unbounded`].
    ///
    /// # Errors
    /// Returns `InvalidPresence` if `start` is not finite, the end is NaN or
    /// `-inf`, or `end < start`.
    pub fn new(
        element: Arc<Element>,
        boundary: Arc<Boundary>,
        start: f64,
        end: impl Into<PresenceEnd>,
        provenance: impl Into<String>,
    ) -> Result<Self> {
        let end = match end.into() {
            PresenceEnd::Bounded(t) => PresenceEnd::from(t),
            PresenceEnd::Unbounded => PresenceEnd::Unbounded,
        };
        let invalid = |reason| PresenceError::InvalidPresence {
            start,
            end: end.as_f64(),
            reason,
        };

        if !start.is_finite() {
            return Err(invalid("start must be finite"));
        }
        if let PresenceEnd::Bounded(t) = end {
            if t.is_nan() || t == f64::NEG_INFINITY {
                return Err(invalid("end must be a time or unbounded"));
            }
            if t < start {
                return Err(invalid("end precedes start"));
            }
        }

        Ok(Self {
            element,
            boundary,
            start,
            end,
            provenance: provenance.into(),
        })
    }

    /// Create a still-open presence starting at `start`
    pub fn open(
        element: Arc<Element>,
        boundary: Arc<Boundary>,
        start: f64,
        provenance: impl Into<String>,
    ) -> Result<Self> {
        Self::new(element, boundary, start, PresenceEnd::Unbounded, provenance)
    }

    /// Create a presence from bare ids with the default provenance
    pub fn from_ids(
        element_id: &str,
        boundary_id: &str,
        start: f64,
        end: impl Into<PresenceEnd>,
    ) -> Result<Self> {
        Self::new(
            Arc::new(Element::new(element_id)),
            Arc::new(Boundary::new(boundary_id)),
            start,
            end,
            DEFAULT_PROVENANCE,
        )
    }

    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    pub fn boundary(&self) -> &Arc<Boundary> {
        &self.boundary
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> PresenceEnd {
        self.end
    }

    /// End time as a float, `+inf` for an open presence
    pub fn end_time(&self) -> f64 {
        self.end.as_f64()
    }

    /// Where this presence came from (e.g. "observed", "join")
    pub fn provenance(&self) -> &str {
        &self.provenance
    }

    pub fn is_open(&self) -> bool {
        !self.end.is_bounded()
    }

    /// `(element id, boundary id)` key of the cover this presence belongs to
    pub fn cover_key(&self) -> (&str, &str) {
        (self.element.id(), self.boundary.id())
    }

    /// Whether two presences belong to the same (element, boundary) cover
    pub fn same_cover(&self, other: &Presence) -> bool {
        self.cover_key() == other.cover_key()
    }

    /// Copy of this presence with a different provenance
    pub fn with_provenance(&self, provenance: impl Into<String>) -> Self {
        Self {
            provenance: provenance.into(),
            ..self.clone()
        }
    }

    /// Half-open overlap test against `[t0, t1)`: `end > t0 && start < t1`
    pub fn overlaps(&self, t0: f64, t1: f64) -> bool {
        self.end_time() > t0 && self.start < t1
    }

    /// This presence restricted to `[t0, t1)`, or `None` if they do not overlap
    pub fn clip(&self, t0: f64, t1: f64) -> Option<Presence> {
        if t0 >= t1 || !self.overlaps(t0, t1) {
            return None;
        }

        let end = if self.end_time() <= t1 {
            self.end
        } else {
            PresenceEnd::from(t1)
        };

        Some(Self {
            start: self.start.max(t0),
            end,
            ..self.clone()
        })
    }

    /// `end - start`, `+inf` for an open presence
    pub fn duration(&self) -> f64 {
        self.end_time() - self.start
    }

    /// Time spent inside `[t0, t1)`; `0.0` without overlap or when `t0 >= t1`
    pub fn residence_time(&self, t0: f64, t1: f64) -> f64 {
        if t0 >= t1 || !self.overlaps(t0, t1) {
            return 0.0;
        }
        self.end_time().min(t1) - self.start.max(t0)
    }

    /// Ordering used inside a cover: by start, ties broken by end
    pub fn cmp_interval(&self, other: &Presence) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.end.cmp_end(&other.end))
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}[{}, {}) ({})",
            self.element.id(),
            self.boundary.id(),
            self.start,
            self.end,
            self.provenance
        )
    }
}
