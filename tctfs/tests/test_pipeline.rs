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

//! offline end-to-end pass over the whole pipeline: discovery fixtures through
//! observation ingest, ensemble reduction, zone generation and archival,
//! against an in-memory store.

use chrono::{Duration, TimeZone, Utc};
use tc_adeck::{compute_mean_forecast, filter_ap_members, parse_adeck_file, RadiiInference};
use tc_cimss::{parse_detail_page, parse_index_page, CimssConfig, HistoryParser};
use tc_lifecycle::archive_storm;
use tc_store::*;
use tc_zones::{CoastSegment, ZoneBuildOutcome, ZoneBuilder, ZoneBuilderConfig};

const INDEX_HTML: &str =
    r#"<a href="odt28W.html">Typhoon 28W YINXING</a>"#;

const DETAIL_HTML: &str =
    r#"<a href="28W-list.txt">History</a> <a href="28W.GIF">Image</a>"#;

const HISTORY: &str = "\
2025OCT18 034000  2.0 1004.6  30.0  2.0 2.0 2.0  NO LIMIT  OFF  OFF  OFF  OFF  -5.96 -37.81  CRVBND   N/A    N/A   14.25 -126.75  ARCHER   HIM-8 23.2\n\
2025OCT18 094000  2.5 1002.0  35.0  2.5 2.5 2.5  NO LIMIT  OFF  OFF  OFF  OFF  -6.10 -38.02  CRVBND   N/A    N/A   14.80 -127.10  ARCHER   HIM-8 23.2\n\
broken row\n";

fn adeck_fixture() -> String {
    let mut deck = String::new();
    for i in 1..=30 {
        deck.push_str(&format!(
            "WP, 28, 2025101812,   , AP{i:02},  24, 151N, 1278W,  65,  975, XX\n"
        ));
    }
    deck
}

#[tokio::test]
async fn test_offline_pipeline() {
    let store = Store::open_memory().await.unwrap();
    let events = EventBus::default();
    let config = CimssConfig::default();

    //--- discovery (S1)
    let entries = parse_index_page(INDEX_HTML);
    assert_eq!(entries.len(), 1);
    let discovered = parse_detail_page(DETAIL_HTML, &entries[0], &config).unwrap();

    let storm = store.insert_storm(&NewStorm {
        code: discovered.upstream_code.clone(),
        basin: discovered.basin,
        name: discovered.display_name.clone(),
        history_url: discovered.history_url.clone(),
        satellite_image_url: discovered.satellite_image_url.clone(),
    }).await.unwrap();

    assert_eq!(storm.code, "28W");
    assert_eq!(storm.basin, Basin::WP);
    assert_eq!(storm.name.as_deref(), Some("YINXING"));
    assert_eq!(storm.status, StormStatus::Active);

    //--- observation ingest (S2)
    let parser = HistoryParser::for_file("28W-list.txt", storm.basin);
    let report = parser.parse_file(HISTORY);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert!(!report.failure_ratio_exceeded());

    let summary = store.upsert_advisories(storm.id, &report.records).await.unwrap();
    assert_eq!(summary.inserted_ids.len(), 2);

    let storm = store.get_storm(storm.id).await.unwrap().unwrap();
    assert_eq!(storm.last_seen_utc, Utc.with_ymd_and_hms(2025, 10, 18, 9, 40, 0).unwrap());
    assert_eq!(storm.peak_vmax_kt, Some(35.0));

    //--- ensemble mean (S3)
    let members = filter_ap_members(parse_adeck_file(&adeck_fixture()).records);
    assert_eq!(members.len(), 30);
    let mean = compute_mean_forecast(&members);
    assert_eq!(mean.len(), 1);
    assert_eq!(mean[0].member_count, 30);

    store.replace_final_forecast(storm.id, &mean).await.unwrap();
    let track = store.latest_final_forecast(storm.id).await.unwrap();
    assert_eq!(track.len(), 1);
    assert_eq!(track[0].lead_hours, 24);
    assert_eq!(track[0].valid_at_utc, Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap());

    //--- zones from the persisted forecast
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 14, 0, 0).unwrap(); // 22h before valid_at -> warning
    let coast = CoastSegment::from_coords("coast", &[(-127.5, 14.9), (-127.5, 15.3)]);
    let builder = ZoneBuilder::new(ZoneBuilderConfig::default(), RadiiInference::default());

    let outcome = builder.build(storm.basin, &track, &[&coast], now).unwrap();
    let ZoneBuildOutcome::Zones(zones) = outcome else { panic!("expected zones") };
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].zone_type, ZoneType::Warning);

    store.replace_zones(storm.id, &zones).await.unwrap();
    let persisted = store.zones_for_storm(storm.id).await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].valid_to_utc - persisted[0].valid_from_utc == Duration::hours(24));

    //--- lifecycle to archival (S6, telescoped)
    store.transition_status(&storm, StormStatus::Dormant, "stale", None).await.unwrap();
    let storm = store.get_storm(storm.id).await.unwrap().unwrap();

    let stats = archive_storm(&store, &events, &storm, "automatic").await.unwrap();
    assert_eq!(stats.advisory_count, 2);
    assert_eq!(stats.peak_vmax_kt, Some(35.0));
    assert_eq!(stats.min_mslp_hpa, Some(1002.0));
    assert_eq!(stats.duration_hours, 6.0);

    let storm = store.get_storm(storm.id).await.unwrap().unwrap();
    assert_eq!(storm.status, StormStatus::Archived);

    // the audit trail records the full lifecycle
    let audit = store.audit_entries_for(&format!("storm:{}", storm.id)).await.unwrap();
    assert_eq!(audit.len(), 2);
}

#[test]
fn test_idempotent_reprocessing() {
    // property: same upstream bytes, same parsed content
    let parser = HistoryParser::for_file("28W-list.txt", Basin::WP);
    let a = parser.parse_file(HISTORY);
    let b = parser.parse_file(HISTORY);

    assert_eq!(a.records.len(), b.records.len());
    for (x, y) in a.records.iter().zip(b.records.iter()) {
        assert_eq!(x.line_checksum, y.line_checksum);
        assert_eq!(x.issued_at_utc, y.issued_at_utc);
        assert_eq!(x.position, y.position);
    }

    let mean_a = compute_mean_forecast(&filter_ap_members(parse_adeck_file(&adeck_fixture()).records));
    let mean_b = compute_mean_forecast(&filter_ap_members(parse_adeck_file(&adeck_fixture()).records));
    assert_eq!(mean_a.len(), mean_b.len());
    assert_eq!(mean_a[0].position, mean_b[0].position);
    assert_eq!(mean_a[0].vmax_kt, mean_b[0].vmax_kt);
}
