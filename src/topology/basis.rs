// Cover index, join, and closure
//
// Covers are kept sorted by (start, end) so that closure is a single linear
// sweep per cover, the same run-merging shape as RLE compression: extend the
// current run while the next item continues it, emit the run at the first gap.

use crate::entity::{Boundary, Element, Entity};
use crate::presence::Presence;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Provenance given to presences produced by joining two or more presences
pub const JOIN_PROVENANCE: &str = "join";

/// `(element id, boundary id)`
pub type CoverKey<'a> = (&'a str, &'a str);

/// Presences grouped into covers keyed by (element, boundary)
///
/// # Example
///
/// ```
/// use presence_calculus::presence::Presence;
/// use presence_calculus::topology::BasisTopology;
///
/// let topology = BasisTopology::new(vec![
///     Presence::from_ids("a", "queue", 0.0, 2.0).unwrap(),
///     Presence::from_ids("a", "queue", 2.0, 3.0).unwrap(), // touches: merged
///     Presence::from_ids("a", "queue", 5.0, 6.0).unwrap(),
///     Presence::from_ids("b", "queue", 1.0, 4.0).unwrap(), // other cover
/// ]);
///
/// let closed = topology.closure();
/// assert_eq!(closed.len(), 3);
/// assert_eq!(closed[0].start(), 0.0);
/// assert_eq!(closed[0].end_time(), 3.0);
/// assert_eq!(closed[0].provenance(), "join");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasisTopology {
    /// element id -> boundary id -> presences sorted by (start, end)
    covers: BTreeMap<String, BTreeMap<String, Vec<Presence>>>,
    len: usize,
}

impl BasisTopology {
    /// Build a topology from presences in any order
    pub fn new(presences: impl IntoIterator<Item = Presence>) -> Self {
        let mut topology = Self::default();
        for presence in presences {
            topology.cover_mut(&presence).push(presence);
            topology.len += 1;
        }
        for cover in topology
            .covers
            .values_mut()
            .flat_map(|by_boundary| by_boundary.values_mut())
        {
            cover.sort_by(Presence::cmp_interval);
        }
        topology
    }

    /// Add one presence, keeping its cover sorted
    ///
    /// Equal intervals keep insertion order.
    pub fn insert(&mut self, presence: Presence) {
        let cover = self.cover_mut(&presence);
        let index =
            cover.partition_point(|p| p.cmp_interval(&presence) != Ordering::Greater);
        cover.insert(index, presence);
        self.len += 1;
    }

    /// Total number of presences across all covers
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cover_count(&self) -> usize {
        self.covers.values().map(BTreeMap::len).sum()
    }

    /// Sorted presences of one cover, empty if the key is not registered
    pub fn get_cover(&self, element: &Element, boundary: &Boundary) -> &[Presence] {
        self.get_cover_by_ids(element.id(), boundary.id())
    }

    pub fn get_cover_by_ids(&self, element_id: &str, boundary_id: &str) -> &[Presence] {
        self.covers
            .get(element_id)
            .and_then(|by_boundary| by_boundary.get(boundary_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Covers in `(element id, boundary id)` order
    pub fn covers(&self) -> impl Iterator<Item = (CoverKey<'_>, &[Presence])> {
        self.covers.iter().flat_map(|(element, by_boundary)| {
            by_boundary
                .iter()
                .map(move |(boundary, cover)| ((element.as_str(), boundary.as_str()), cover.as_slice()))
        })
    }

    /// All presences, cover by cover
    pub fn presences(&self) -> impl Iterator<Item = &Presence> {
        self.covers().flat_map(|(_, cover)| cover.iter())
    }

    /// Merge two presences of the same cover that overlap or touch
    ///
    /// Returns a presence spanning the earliest start to the latest end with
    /// provenance `"join"`, or `None` if the presences belong to different
    /// covers or are separated by a gap. Commutative.
    pub fn join(p1: &Presence, p2: &Presence) -> Option<Presence> {
        if !p1.same_cover(p2) {
            return None;
        }

        let (first, second) = match p1.cmp_interval(p2) {
            Ordering::Greater => (p2, p1),
            _ => (p1, p2),
        };
        if first.end_time() < second.start() {
            return None;
        }

        Presence::new(
            first.element().clone(),
            first.boundary().clone(),
            first.start(),
            first.end().later(second.end()),
            JOIN_PROVENANCE,
        )
        .ok()
    }

    /// Reduce every cover to its maximal, pairwise-disjoint presences
    ///
    /// Touching presences merge. A presence that absorbed no other keeps its
    /// provenance; merged presences carry `"join"`. Output is ordered by cover
    /// key, then by start time. Applying closure to its own output changes
    /// nothing.
    pub fn closure(&self) -> Vec<Presence> {
        let mut closed = Vec::with_capacity(self.len);

        for (_, cover) in self.covers() {
            let mut presences = cover.iter();
            let Some(first) = presences.next() else {
                continue;
            };

            let mut current = first.clone();
            for next in presences {
                match Self::join(&current, next) {
                    Some(joined) => current = joined,
                    None => closed.push(std::mem::replace(&mut current, next.clone())),
                }
            }
            closed.push(current);
        }

        tracing::debug!(
            "Closure reduced {} presences in {} covers to {}",
            self.len,
            self.cover_count(),
            closed.len()
        );

        closed
    }

    /// Topology built from this topology's closure
    pub fn closed(&self) -> BasisTopology {
        BasisTopology::new(self.closure())
    }

    /// Presences in `target`'s cover that overlap `target`'s interval
    ///
    /// Uses the half-open [`Presence::overlaps`] test, so presences that only
    /// touch `target` are not returned. `target` itself is returned if it is
    /// registered and has positive length.
    pub fn find_overlapping(&self, target: &Presence) -> Vec<&Presence> {
        let (element_id, boundary_id) = target.cover_key();
        self.get_cover_by_ids(element_id, boundary_id)
            .iter()
            .filter(|p| p.overlaps(target.start(), target.end_time()))
            .collect()
    }

    fn cover_mut(&mut self, presence: &Presence) -> &mut Vec<Presence> {
        let (element_id, boundary_id) = presence.cover_key();
        self.covers
            .entry(element_id.to_string())
            .or_default()
            .entry(boundary_id.to_string())
            .or_default()
    }
}

impl FromIterator<Presence> for BasisTopology {
    fn from_iter<I: IntoIterator<Item = Presence>>(iter: I) -> Self {
        Self::new(iter)
    }
}
