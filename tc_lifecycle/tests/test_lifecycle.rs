/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use chrono::{DateTime, Duration, TimeZone, Utc};
use tc_common::geo::GeoPoint;
use tc_lifecycle::*;
use tc_store::*;

// run with "cargo test -p tc_lifecycle -- --nocapture"

async fn storm_with_advisory_age(store: &Store, code: &str, age_hours: i64, now: DateTime<Utc>) -> Storm {
    let storm = store.insert_storm(&NewStorm {
        code: code.to_string(),
        basin: Basin::WP,
        name: Some("TEST".to_string()),
        history_url: format!("https://upstream.example/{code}-list.txt"),
        satellite_image_url: None,
    }).await.unwrap();

    let record = AdvisoryRecord {
        issued_at_utc: now - Duration::hours(age_hours),
        position: GeoPoint::from_lon_lat_degrees(130.0, 15.0),
        vmax_kt: Some(45.0),
        mslp_hpa: Some(995.0),
        motion_bearing_deg: None,
        motion_speed_kt: None,
        line_checksum: format!("cs-{code}"),
        parser_version: "adt-list-1".to_string(),
        raw_line: None,
    };
    store.upsert_advisories(storm.id, &[record]).await.unwrap();
    store.get_storm(storm.id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_active_to_dormant() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let mut rx = events.subscribe();
    let config = LifecycleConfig::default();
    let now = Utc::now();

    let stale = storm_with_advisory_age(&store, "28W", 25, now).await;
    let fresh = storm_with_advisory_age(&store, "05E", 3, now).await;

    let transitioned = check_dormant(&store, &events, &config, now).await.unwrap();
    assert_eq!(transitioned, vec!["28W".to_string()]);

    assert_eq!(store.get_storm(stale.id).await.unwrap().unwrap().status, StormStatus::Dormant);
    assert_eq!(store.get_storm(fresh.id).await.unwrap().unwrap().status, StormStatus::Active);

    match rx.recv().await.unwrap() {
        TcEvent::StormStatusChanged { storm_code, from, to, .. } => {
            assert_eq!(storm_code, "28W");
            assert_eq!(from, StormStatus::Active);
            assert_eq!(to, StormStatus::Dormant);
        }
        other => panic!("unexpected event {other:?}"),
    }

    // repeated checks do nothing further
    assert!(check_dormant(&store, &events, &config, now).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dormant_to_archived() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let config = LifecycleConfig::default();
    let now = Utc::now();

    let storm = storm_with_advisory_age(&store, "28W", 169, now).await;
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();

    // a storm 100h stale stays dormant, 169h is past the archive threshold
    let archived = check_archive(&store, &events, &config, now).await.unwrap();
    assert_eq!(archived, vec!["28W".to_string()]);

    let storm = store.get_storm(storm.id).await.unwrap().unwrap();
    assert_eq!(storm.status, StormStatus::Archived);
    assert_eq!(storm.archival_reason.as_deref(), Some("automatic"));

    // two audit rows: dormancy and archival, the latter with the stats pack
    let audit = store.audit_entries_for(&format!("storm:{}", storm.id)).await.unwrap();
    assert_eq!(audit.len(), 2);
    let details = &audit.last().unwrap().details;
    assert_eq!(details["new_status"], "archived");
    assert_eq!(details["stats"]["advisory_count"], 1);
}

#[tokio::test]
async fn test_archive_not_yet_due() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let config = LifecycleConfig::default();
    let now = Utc::now();

    let storm = storm_with_advisory_age(&store, "28W", 100, now).await;
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();

    assert!(check_archive(&store, &events, &config, now).await.unwrap().is_empty());
    assert_eq!(store.get_storm(storm.id).await.unwrap().unwrap().status, StormStatus::Dormant);
}

#[tokio::test]
async fn test_reactivation() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let now = Utc::now();

    let storm = storm_with_advisory_age(&store, "28W", 30, now).await;
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();
    let dormant = store.get_storm(storm.id).await.unwrap().unwrap();

    assert!(reactivate(&store, &events, &dormant).await.unwrap());
    let storm = store.get_storm(storm.id).await.unwrap().unwrap();
    assert_eq!(storm.status, StormStatus::Active);

    // already-active storms are not transitioned
    assert!(!reactivate(&store, &events, &storm).await.unwrap());
}

#[tokio::test]
async fn test_archival_blocked_by_pending_alerts() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let now = Utc::now();

    let storm = storm_with_advisory_age(&store, "28W", 200, now).await;
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();
    let storm = store.get_storm(storm.id).await.unwrap().unwrap();

    store.add_alert_intent(storm.id, "zones_changed", &serde_json::json!({})).await.unwrap();
    assert!(archive_storm(&store, &events, &storm, "automatic").await.is_err());
    assert_eq!(store.get_storm(storm.id).await.unwrap().unwrap().status, StormStatus::Dormant);

    // once the external delivery layer drains the intents, archival proceeds
    store.mark_alert_intents_delivered(storm.id).await.unwrap();
    let stats = archive_storm(&store, &events, &storm, "automatic").await.unwrap();
    assert_eq!(stats.advisory_count, 1);
    assert_eq!(store.get_storm(storm.id).await.unwrap().unwrap().status, StormStatus::Archived);
}

#[tokio::test]
async fn test_archival_requires_advisories() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();

    let storm = store.insert_storm(&NewStorm {
        code: "29W".to_string(),
        basin: Basin::WP,
        name: None,
        history_url: String::new(),
        satellite_image_url: None,
    }).await.unwrap();
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();
    let storm = store.get_storm(storm.id).await.unwrap().unwrap();

    assert!(archive_storm(&store, &events, &storm, "automatic").await.is_err());
}

fn advisory_at(t: DateTime<Utc>, lon: f64, lat: f64, vmax: Option<f64>, mslp: Option<f64>) -> Advisory {
    Advisory {
        id: 0,
        storm_id: 1,
        issued_at_utc: t,
        position: GeoPoint::from_lon_lat_degrees(lon, lat),
        vmax_kt: vmax,
        mslp_hpa: mslp,
        motion_bearing_deg: None,
        motion_speed_kt: None,
        line_checksum: String::new(),
        parser_version: String::new(),
        raw_line: None,
    }
}

#[test]
fn test_archival_stats() {
    let t0 = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();

    let advisories = vec![
        // two advisories in the 00Z bin: the stronger one counts (50kt -> 0.25)
        advisory_at(t0, 130.0, 10.0, Some(40.0), Some(1000.0)),
        advisory_at(t0 + Duration::hours(1), 130.5, 10.0, Some(50.0), Some(996.0)),
        // 06Z bin below gale strength: contributes nothing
        advisory_at(t0 + Duration::hours(6), 131.0, 10.0, Some(30.0), Some(1002.0)),
        // 12Z bin at 64kt -> 0.4096
        advisory_at(t0 + Duration::hours(12), 131.5, 10.0, Some(64.0), Some(985.0)),
    ];

    let stats = compute_archival_stats(&advisories);
    assert_eq!(stats.advisory_count, 4);
    assert_eq!(stats.peak_vmax_kt, Some(64.0));
    assert_eq!(stats.min_mslp_hpa, Some(985.0));
    assert_eq!(stats.duration_hours, 12.0);
    assert!((stats.ace - (0.25 + 0.4096)).abs() < 1e-9);

    // 1.5 degrees of longitude at 10N, in three hops
    assert!((stats.track_length_km - 164.0).abs() < 3.0);
}

#[test]
fn test_archival_stats_empty_fields() {
    let t0 = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();
    let advisories = vec![advisory_at(t0, 130.0, 10.0, None, None)];

    let stats = compute_archival_stats(&advisories);
    assert_eq!(stats.peak_vmax_kt, None);
    assert_eq!(stats.min_mslp_hpa, None);
    assert_eq!(stats.ace, 0.0);
    assert_eq!(stats.track_length_km, 0.0);
    assert_eq!(stats.duration_hours, 0.0);
}
