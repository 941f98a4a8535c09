//! Append-only enter/exit event log
//!
//! Simulations and observers usually emit presence as a stream of entry and
//! exit events rather than as finished intervals. A [`PresenceLog`] is owned
//! by one run: it records events in arrival order, pairs each exit with the
//! open entry for the same (element, boundary), and hands the resulting
//! presences to the analysis. Entries that never see an exit become open-ended
//! presences.
//!
//! # Example
//!
//! ```
//! use presence_calculus::entity::{Boundary, Element};
//! use presence_calculus::event_log::PresenceLog;
//! use std::sync::Arc;
//!
//! let queue = Arc::new(Boundary::new("queue"));
//! let a = Arc::new(Element::new("a"));
//! let b = Arc::new(Element::new("b"));
//!
//! let mut log = PresenceLog::new("simulation");
//! log.record_entry(&a, &queue, 0.0).unwrap();
//! log.record_entry(&b, &queue, 1.5).unwrap();
//! log.record_exit(&a, &queue, 2.0).unwrap();
//!
//! let presences = log.presences();
//! assert_eq!(presences.len(), 2);
//! assert_eq!(presences[0].end_time(), 2.0);
//! assert!(presences[1].is_open());
//! ```

use crate::entity::{Boundary, Element, Entity};
use crate::error::{PresenceError, Result};
use crate::presence::Presence;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Kind of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Entry,
    Exit,
}

/// One recorded entry or exit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceEvent {
    pub element: Arc<Element>,
    pub boundary: Arc<Boundary>,
    pub time: f64,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
struct OpenEntry {
    element: Arc<Element>,
    boundary: Arc<Boundary>,
    since: f64,
}

/// Event log for one run, producing presences from entry/exit pairs
#[derive(Debug, Clone)]
pub struct PresenceLog {
    observer: String,
    events: Vec<PresenceEvent>,
    open: BTreeMap<(String, String), OpenEntry>,
    closed: Vec<Presence>,
}

impl PresenceLog {
    /// Create an empty log; `observer` becomes the provenance of its presences
    pub fn new(observer: impl Into<String>) -> Self {
        Self {
            observer: observer.into(),
            events: Vec::new(),
            open: BTreeMap::new(),
            closed: Vec::new(),
        }
    }

    pub fn observer(&self) -> &str {
        &self.observer
    }

    /// Record `element` entering `boundary` at `time`
    ///
    /// # Errors
    /// `DuplicateEntry` if the element is already present in the boundary,
    /// `InvalidPresence` if `time` is not finite.
    pub fn record_entry(
        &mut self,
        element: &Arc<Element>,
        boundary: &Arc<Boundary>,
        time: f64,
    ) -> Result<()> {
        if !time.is_finite() {
            return Err(PresenceError::InvalidPresence {
                start: time,
                end: time,
                reason: "entry time must be finite",
            });
        }

        let key = (element.id().to_string(), boundary.id().to_string());
        if let Some(existing) = self.open.get(&key) {
            return Err(PresenceError::DuplicateEntry {
                element: key.0,
                boundary: key.1,
                time,
                open_since: existing.since,
            });
        }

        tracing::trace!("{} entered {} at {}", element.id(), boundary.id(), time);
        self.open.insert(
            key,
            OpenEntry {
                element: element.clone(),
                boundary: boundary.clone(),
                since: time,
            },
        );
        self.push_event(element, boundary, time, EventKind::Entry);
        Ok(())
    }

    /// Record `element` leaving `boundary` at `time`, closing its open entry
    ///
    /// # Errors
    /// `UnmatchedExit` if there is no open entry, `InvalidPresence` if `time`
    /// precedes the entry. The log is unchanged on error.
    pub fn record_exit(
        &mut self,
        element: &Arc<Element>,
        boundary: &Arc<Boundary>,
        time: f64,
    ) -> Result<()> {
        let key = (element.id().to_string(), boundary.id().to_string());
        let Some(entry) = self.open.get(&key) else {
            return Err(PresenceError::UnmatchedExit {
                element: key.0,
                boundary: key.1,
                time,
            });
        };

        let presence = Presence::new(
            entry.element.clone(),
            entry.boundary.clone(),
            entry.since,
            time,
            self.observer.as_str(),
        )?;

        tracing::trace!("{} left {} at {}", element.id(), boundary.id(), time);
        self.open.remove(&key);
        self.closed.push(presence);
        self.push_event(element, boundary, time, EventKind::Exit);
        Ok(())
    }

    /// All recorded events in arrival order
    pub fn events(&self) -> &[PresenceEvent] {
        &self.events
    }

    /// Number of entries still waiting for an exit
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Closed presences in exit order, then open-ended presences by key
    pub fn presences(&self) -> Vec<Presence> {
        let mut presences = self.closed.clone();
        presences.extend(self.open_presences());
        presences
    }

    /// Consume the log, returning [`PresenceLog::presences`]
    pub fn into_presences(self) -> Vec<Presence> {
        let open: Vec<Presence> = self.open_presences().collect();
        let mut presences = self.closed;
        presences.extend(open);
        presences
    }

    fn open_presences(&self) -> impl Iterator<Item = Presence> + '_ {
        self.open.values().filter_map(|entry| {
            Presence::open(
                entry.element.clone(),
                entry.boundary.clone(),
                entry.since,
                self.observer.as_str(),
            )
            .ok()
        })
    }

    fn push_event(
        &mut self,
        element: &Arc<Element>,
        boundary: &Arc<Boundary>,
        time: f64,
        kind: EventKind,
    ) {
        self.events.push(PresenceEvent {
            element: element.clone(),
            boundary: boundary.clone(),
            time,
            kind,
        });
    }
}
