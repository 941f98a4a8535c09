// Basis topology over presence covers
//
// Presences sharing an (element, boundary) key form a cover. Within a cover,
// overlapping or touching presences describe one continuous stay and can be
// joined. The closure of a topology reduces every cover to its maximal,
// pairwise-disjoint intervals, which is the canonical input for the presence
// matrix: without it, two overlapping records of the same stay would count
// the element twice in every window they share.

mod basis;

pub use basis::{BasisTopology, CoverKey, JOIN_PROVENANCE};
