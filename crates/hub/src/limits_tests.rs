// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_match_the_documented_bounds() {
    let config = HubConfig::default();
    assert_eq!(config.send_buffer, 1000);
    assert_eq!(config.max_subscriptions, 10);
    assert_eq!(config.max_message_size, 16_384);
    assert_eq!(config.ping_period, Duration::from_secs(30));
    assert_eq!(config.pong_wait, Duration::from_secs(60));
    assert_eq!(config.write_wait, Duration::from_secs(10));
}

#[test]
fn default_heartbeat_invariant_holds() {
    let config = HubConfig::default();
    assert!(config.ping_period < config.pong_wait);
}

#[test]
fn normalized_clamps_inverted_heartbeat() {
    let config = HubConfig {
        ping_period: Duration::from_secs(120),
        pong_wait: Duration::from_secs(60),
        ..Default::default()
    }
    .normalized();
    assert!(config.ping_period < config.pong_wait);
}

#[test]
fn normalized_keeps_valid_heartbeat() {
    let config = HubConfig::default().normalized();
    assert_eq!(config.ping_period, Duration::from_secs(30));
}
