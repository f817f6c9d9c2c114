// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    nothing_seen = { 0, 3000, RUN },
    halfway = { 1500, 3000, 42 },
    all_seen = { 3000, 3000, ANALYZED },
    overshoot_clamps = { 9000, 3000, ANALYZED },
    unknown_estimate = { 500, 0, RUN },
)]
fn scaling(lines_seen: u64, expected: u64, want: u8) {
    assert_eq!(scale_lines(lines_seen, expected), want);
}

#[test]
fn scaling_is_monotonic() {
    let mut last = 0;
    for seen in (0..=3000).step_by(100) {
        let pct = scale_lines(seen, 3000);
        assert!(pct >= last);
        assert!((RUN..=ANALYZED).contains(&pct));
        last = pct;
    }
}

#[test]
fn checkpoints_are_ordered() {
    let sequence = [DOWNLOADED, RUN, ANALYZED, PARSED, STORED, INDEXED, DONE];
    assert!(sequence.windows(2).all(|w| w[0] < w[1]));
}
