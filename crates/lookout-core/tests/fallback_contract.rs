//! Contract test: single-hop provider fallback
//!
//! Constraints verified:
//! - A successful primary lookup never touches the secondary provider
//! - An unreachable primary falls back to the secondary exactly once
//! - When both providers fail, the operation fails and neither history
//!   nor journal gains an entry
//! - Failures carry the name of the provider that failed last

mod common;

use common::*;
use lookout_core::error::Error;
use lookout_core::traits::{GeoRecord, GeoSource};
use lookout_core::{Tracker, TrackerConfig};
use std::sync::atomic::Ordering;
use tempfile::tempdir;

fn tracker_with(
    config: TrackerConfig,
    primary: ScriptedGeoProvider,
    secondary: ScriptedGeoProvider,
) -> Tracker {
    Tracker::new(
        config,
        vec![Box::new(primary), Box::new(secondary)],
        Box::new(EchoPhoneLookup),
    )
    .expect("tracker construction succeeds")
}

#[tokio::test]
async fn successful_primary_skips_secondary() {
    let dir = tempdir().unwrap();
    let primary = ScriptedGeoProvider::ok("primary", GeoSource::Primary);
    let secondary = ScriptedGeoProvider::ok("secondary", GeoSource::Secondary);
    let secondary_calls = secondary.counter();

    let tracker = tracker_with(test_config(dir.path()), primary, secondary);
    let record = tracker.track_ip(Some("8.8.8.8")).await.unwrap();

    assert_eq!(record.source, GeoSource::Primary);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_primary_invokes_secondary_before_failing() {
    let dir = tempdir().unwrap();
    let primary = ScriptedGeoProvider::failing("primary", GeoSource::Primary);
    let secondary = ScriptedGeoProvider::ok("secondary", GeoSource::Secondary);
    let primary_calls = primary.counter();
    let secondary_calls = secondary.counter();

    let tracker = tracker_with(test_config(dir.path()), primary, secondary);
    let record = tracker.track_ip(Some("8.8.8.8")).await.unwrap();

    assert_eq!(record.source, GeoSource::Secondary);
    assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_providers_failing_writes_nothing() {
    let dir = tempdir().unwrap();
    let primary = ScriptedGeoProvider::failing("primary", GeoSource::Primary);
    let secondary = ScriptedGeoProvider::failing("secondary", GeoSource::Secondary);

    let tracker = tracker_with(test_config(dir.path()), primary, secondary);
    let err = tracker.track_ip(Some("8.8.8.8")).await.unwrap_err();

    // The surfaced error names the provider that failed last.
    match err {
        Error::Transport { provider, .. } => assert_eq!(provider, "secondary"),
        other => panic!("expected transport error, got {:?}", other),
    }

    // No history and no journal entry may appear for a failed lookup.
    let history: Vec<GeoRecord> = tracker.ip_history().await.unwrap();
    assert!(history.is_empty());
    assert!(tracker.journal().await.unwrap().is_empty());

    // Nothing was written at all under the data root.
    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .map(|entries| entries.collect())
        .unwrap_or_default();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn successful_lookup_has_numeric_coordinates_and_known_source() {
    let dir = tempdir().unwrap();
    let primary = ScriptedGeoProvider::ok("primary", GeoSource::Primary);
    let secondary = ScriptedGeoProvider::failing("secondary", GeoSource::Secondary);

    let tracker = tracker_with(test_config(dir.path()), primary, secondary);
    let record = tracker.track_ip(None).await.unwrap();

    assert!(record.latitude.is_finite());
    assert!(record.longitude.is_finite());
    let source = serde_json::to_value(record.source).unwrap();
    assert!(source == "primary" || source == "secondary");
}

#[tokio::test]
async fn public_ip_uses_fallback_but_persists_nothing() {
    let dir = tempdir().unwrap();
    let primary = ScriptedGeoProvider::failing("primary", GeoSource::Primary);
    let secondary = ScriptedGeoProvider::ok("secondary", GeoSource::Secondary);

    let tracker = tracker_with(test_config(dir.path()), primary, secondary);
    let ip = tracker.public_ip().await.unwrap();

    assert_eq!(ip, "198.51.100.7");
    let history: Vec<GeoRecord> = tracker.ip_history().await.unwrap();
    assert!(history.is_empty());
    assert!(tracker.journal().await.unwrap().is_empty());
}
