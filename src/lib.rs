//! Presence Calculus - finite-window flow analysis over element presences
//!
//! This library models when elements are present within boundaries, reduces
//! overlapping records to a canonical form, discretizes presences onto a
//! binned timescale, and evaluates the finite-window form of Little's Law
//! (`L = Λ·w`) over arbitrary query windows.

pub mod analysis;
pub mod config;
pub mod entity;
pub mod error;
pub mod event_log;
pub mod invariant;
pub mod presence;
pub mod presence_map;
pub mod presence_matrix;
pub mod report;
pub mod timescale;
pub mod topology;

pub use analysis::PresenceAnalysis;
pub use entity::{Boundary, Element, Entity};
pub use error::{PresenceError, Result};
pub use invariant::{FlowDecomposition, PresenceInvariant, PresenceMetrics, PresenceSummary};
pub use presence::{Presence, PresenceEnd};
pub use presence_matrix::PresenceMatrix;
pub use timescale::Timescale;
pub use topology::BasisTopology;
