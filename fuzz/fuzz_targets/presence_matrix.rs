#![no_main]

use libfuzzer_sys::fuzz_target;
use presence_calculus::invariant::PresenceInvariant;
use presence_calculus::presence::Presence;
use presence_calculus::presence_matrix::PresenceMatrix;
use presence_calculus::timescale::Timescale;

fuzz_target!(|data: &[u8]| {
    let floats: Vec<f64> = data
        .chunks_exact(8)
        .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
        .collect();
    let Some((&bin_width, rest)) = floats.split_first() else {
        return;
    };
    let Ok(ts) = Timescale::new(0.0, 100.0, bin_width.abs().clamp(0.01, 100.0)) else {
        return;
    };

    // Invalid presences are rejected at construction, never inside the matrix
    let presences: Vec<Presence> = rest
        .chunks_exact(2)
        .filter_map(|p| Presence::from_ids("e", "b", p[0], p[1]).ok())
        .collect();

    let matrix = PresenceMatrix::new(presences, ts);
    let inv = PresenceInvariant::new(&matrix);
    if let Ok(d) = inv.flow_decomposition(None, None) {
        let summary = inv.get_presence_summary(None, None).unwrap();
        assert_eq!(d.starting + d.arrivals, summary.active_presences);
    }
});
