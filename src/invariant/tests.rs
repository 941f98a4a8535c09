// Window query tests for the presence invariant
//
// The reference scenario is four presences on a 0..6 timescale with unit
// bins: [0,2), [1.5,3), [3,4.5), [4.6,∞).

use super::*;
use crate::error::PresenceError;
use crate::presence::{Presence, PresenceEnd};
use crate::presence_matrix::PresenceMatrix;
use crate::timescale::Timescale;

const TOLERANCE: f64 = 1e-9;

fn p(element: &str, start: f64, end: impl Into<PresenceEnd>) -> Presence {
    Presence::from_ids(element, "queue", start, end).unwrap()
}

fn scenario() -> PresenceMatrix {
    let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
    PresenceMatrix::new(
        vec![
            p("a", 0.0, 2.0),
            p("b", 1.5, 3.0),
            p("c", 3.0, 4.5),
            p("d", 4.6, PresenceEnd::Unbounded),
        ],
        ts,
    )
}

#[test]
fn test_flow_rate_reference_windows() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    assert_eq!(inv.flow_rate(0.0, 1.0).unwrap(), 1.0);
    assert!((inv.flow_rate(0.0, 2.5).unwrap() - 2.0 / 3.0).abs() < TOLERANCE);
    assert!((inv.flow_rate(0.0, 6.0).unwrap() - 4.0 / 6.0).abs() < TOLERANCE);
}

#[test]
fn test_summary_full_window() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let (mass, count, bins) = inv.get_presence_summary(0.0, 6.0).unwrap().as_tuple();
    assert!((mass - 6.4).abs() < TOLERANCE);
    assert_eq!(count, 4);
    assert_eq!(bins, 6);
}

#[test]
fn test_metrics_full_window() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let metrics = inv.get_presence_metrics(0.0, 6.0).unwrap();
    assert!((metrics.presence_density - 6.4 / 6.0).abs() < TOLERANCE);
    assert!((metrics.avg_residence_time - 1.6).abs() < TOLERANCE);
    assert!(metrics.satisfies_invariant(1e-6));

    assert!((inv.avg_presence_per_unit_time(0.0, 6.0).unwrap() - 6.4 / 6.0).abs() < TOLERANCE);
    assert!((inv.avg_residence_time(0.0, 6.0).unwrap() - 1.6).abs() < TOLERANCE);
}

#[test]
fn test_omitted_bounds_default_to_timescale() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    assert_eq!(
        inv.get_presence_summary(None, None).unwrap(),
        inv.get_presence_summary(0.0, 6.0).unwrap()
    );
    assert_eq!(
        inv.get_presence_summary(2.0, None).unwrap(),
        inv.get_presence_summary(2.0, 6.0).unwrap()
    );
    assert_eq!(
        inv.get_presence_summary(None, 3.0).unwrap(),
        inv.get_presence_summary(0.0, 3.0).unwrap()
    );
}

#[test]
fn test_starting_and_arrivals() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    assert_eq!(inv.starting_presence_count(1.0, 3.0).unwrap(), 1);
    assert_eq!(inv.arrival_count(1.0, 3.0).unwrap(), 1);
    assert_eq!(inv.starting_presence_count(0.0, 6.0).unwrap(), 0);
    assert_eq!(inv.arrival_count(0.0, 6.0).unwrap(), 4);
}

#[test]
fn test_departures_exclude_open_presence() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    assert_eq!(inv.departure_count(0.0, 6.0).unwrap(), 3);
    assert_eq!(inv.ending_presence_count(0.0, 6.0).unwrap(), 1);
}

#[test]
fn test_decomposition_middle_window() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let d = inv.flow_decomposition(2.0, 4.0).unwrap();
    assert_eq!(
        d,
        FlowDecomposition {
            starting: 1,
            arrivals: 1,
            departures: 1,
            ending: 1,
        }
    );
    assert!(d.is_balanced());
}

#[test]
fn test_decomposition_matches_flow_rate() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    for (t0, t1) in [(0.0, 1.0), (0.0, 2.5), (1.0, 3.0), (2.2, 5.7), (0.0, 6.0), (4.0, 6.0)] {
        let d = inv.flow_decomposition(t0, t1).unwrap();
        let summary = inv.get_presence_summary(t0, t1).unwrap();
        let flow_times_bins = inv.flow_rate(t0, t1).unwrap() * summary.bins as f64;

        assert_eq!(d.starting + d.arrivals, summary.active_presences);
        assert_eq!(d.departures + d.ending, summary.active_presences);
        assert!((flow_times_bins - summary.active_presences as f64).abs() < TOLERANCE);
    }
}

#[test]
fn test_presences_outside_timescale_bounds() {
    let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
    let matrix = PresenceMatrix::new(vec![p("early", -2.0, 1.0), p("late", 5.0, 10.0)], ts);
    let inv = PresenceInvariant::new(&matrix);

    let d = inv.flow_decomposition(None, None).unwrap();
    assert_eq!(d.starting, 1);
    assert_eq!(d.arrivals, 1);
    assert_eq!(d.departures, 1);
    assert_eq!(d.ending, 1);
}

#[test]
fn test_out_of_range_window() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let err = inv.flow_rate(6.0, 10.0).unwrap_err();
    assert!(matches!(err, PresenceError::OutOfRangeWindow { .. }));
    assert!(inv.get_presence_summary(-1.0, 3.0).is_err());
    assert!(inv.departure_count(None, 7.0).is_err());
    assert!(inv.flow_rate(f64::NAN, 3.0).is_err());
}

#[test]
fn test_degenerate_window_is_zero() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    for (t0, t1) in [(3.0, 3.0), (5.0, 2.0), (6.0, 6.0), (0.0, 0.0)] {
        let summary = inv.get_presence_summary(t0, t1).unwrap();
        assert_eq!(summary, PresenceSummary::empty());
        assert_eq!(inv.get_presence_metrics(t0, t1).unwrap().as_tuple(), (0.0, 0.0, 0.0));
        assert_eq!(inv.flow_decomposition(t0, t1).unwrap(), FlowDecomposition::default());
        assert!(inv.window(t0, t1).unwrap().is_degenerate());
    }
}

#[test]
fn test_narrow_window_on_bin_edge_keeps_one_bin() {
    let ts = Timescale::new(0.0, 6.0, 1.0).unwrap();
    let matrix = PresenceMatrix::new(vec![p("a", 0.0, 6.0)], ts);
    let inv = PresenceInvariant::new(&matrix);

    let window = inv.window(2.0, 2.0 + 1e-10).unwrap();
    assert!(!window.is_degenerate());
    assert_eq!((window.start_bin, window.end_bin), (2, 3));

    let summary = inv.get_presence_summary(2.0, 2.0 + 1e-10).unwrap();
    assert_eq!(summary.bins, 1);
    assert_eq!(summary.active_presences, 1);
    assert_eq!(summary.presence_mass, 1.0);
    assert_eq!(inv.get_presence_summary(6.0 - 1e-10, 6.0).unwrap().bins, 1);
}

#[test]
fn test_invariant_on_wide_bins() {
    let ts = Timescale::new(0.0, 10.0, 2.5).unwrap();
    let matrix = PresenceMatrix::new(
        vec![
            p("a", 0.3, 4.1),
            p("b", 2.0, 2.2),
            p("c", 6.0, 9.9),
            p("d", 7.5, PresenceEnd::Unbounded),
        ],
        ts,
    );
    let inv = PresenceInvariant::new(&matrix);

    for (t0, t1) in [(0.0, 10.0), (1.0, 6.0), (2.5, 7.5), (9.0, 10.0)] {
        let metrics = inv.get_presence_metrics(t0, t1).unwrap();
        assert!(metrics.satisfies_invariant(1e-6), "window [{}, {})", t0, t1);
        assert!(inv.flow_decomposition(t0, t1).unwrap().is_balanced());
    }
}

#[test]
fn test_cumulative_series() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let series = inv.cumulative_series();
    assert_eq!(series.len(), 6);

    let first = &series[0];
    assert_eq!(first.bin, 0);
    assert_eq!((first.window.start_bin, first.window.end_bin), (0, 1));
    assert_eq!(first.metrics.as_tuple(), (1.0, 1.0, 1.0));

    let last = series.last().unwrap();
    assert_eq!(last.summary, inv.get_presence_summary(None, None).unwrap());
    assert_eq!(last.window.t1, 6.0);

    for point in &series {
        assert!(point.metrics.satisfies_invariant(1e-6));
    }
}

#[test]
fn test_sliding_series() {
    let matrix = scenario();
    let inv = PresenceInvariant::new(&matrix);

    let series = inv.sliding_series(2);
    assert_eq!(series.len(), 6);
    assert_eq!((series[0].window.start_bin, series[0].window.end_bin), (0, 1));
    assert_eq!((series[3].window.start_bin, series[3].window.end_bin), (2, 4));
    assert_eq!(series[3].summary.active_presences, 2);
    assert!((series[3].summary.presence_mass - 2.0).abs() < TOLERANCE);
    assert_eq!(series[3].window.t0, 2.0);
    assert_eq!(series[3].window.t1, 4.0);

    assert!(inv.sliding_series(0).is_empty());
}
