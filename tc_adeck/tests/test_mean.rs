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

use chrono::{TimeZone, Utc};
use tc_adeck::*;

// run with "cargo test -p tc_adeck -- --nocapture"

/// a full 30 member deck at one lead time, values paired symmetrically around
/// the expected mean (lat 15.1, lon -127.8, vmax 65)
fn full_ensemble_deck() -> String {
    let mut lines = String::new();
    for i in 1..=30 {
        let (lat, lon, vmax) = if i % 2 == 1 { ("148", "1280W", 55) } else { ("154", "1276W", 75) };
        lines.push_str(&format!(
            "WP, 28, 2025101812,   , AP{i:02},  24, {lat}N, {lon},  {vmax},  975, XX\n"
        ));
    }
    lines
}

#[test]
fn test_ensemble_mean_full_deck() {
    let members = filter_ap_members(parse_adeck_file(&full_ensemble_deck()).records);
    assert_eq!(members.len(), 30);

    let track = compute_mean_forecast(&members);
    assert_eq!(track.len(), 1);

    let p = &track[0];
    assert_eq!(p.issuance_time_utc, Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap());
    assert_eq!(p.lead_hours, 24);
    assert_eq!(p.valid_at_utc, Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap());
    assert_eq!(p.member_count, 30);
    assert_eq!(p.source_tag, "adecks_open");

    assert!((p.position.lat_degrees() - 15.1).abs() < 1e-9);
    assert!((p.position.lon_degrees() - (-127.8)).abs() < 1e-9);
    assert!((p.vmax_kt.unwrap() - 65.0).abs() < 1e-9);
    assert!((p.mslp_hpa.unwrap() - 975.0).abs() < 1e-9);
}

#[test]
fn test_single_member_mean_is_identity() {
    let line = "WP, 28, 2025101812,   , AP05,  36, 151N, 1278W,  63,  975, XX";
    let members = vec![parse_adeck_line(line).unwrap()];

    let track = compute_mean_forecast(&members);
    assert_eq!(track.len(), 1);

    let p = &track[0];
    assert_eq!(p.member_count, 1);
    assert_eq!(p.position.lat_degrees(), 15.1);
    assert_eq!(p.position.lon_degrees(), -127.8);
    assert_eq!(p.vmax_kt, Some(63.0));
}

#[test]
fn test_antimeridian_mean() {
    // members straddle the dateline at lead 48: 179.5E and 179.5W
    let content = "\
WP, 28, 2025101812,   , AP01,  48, 151N, 1795E,  60,  978, XX\n\
WP, 28, 2025101812,   , AP02,  48, 151N, 1795W,  64,  974, XX\n";

    let track = compute_mean_forecast(&parse_adeck_file(content).records);
    assert_eq!(track.len(), 1);

    let lon = track[0].position.lon_degrees();
    println!("antimeridian mean lon = {lon}");
    assert!(lon.abs() > 179.99, "mean longitude collapsed towards 0: {lon}");
}

#[test]
fn test_mean_longitude_rotation() {
    // away from the antimeridian the plain mean applies
    assert_eq!(mean_longitude(&[-128.0, -127.6]), Some(-127.8));
    // across it, rotation keeps the result on the dateline
    let m = mean_longitude(&[179.5, -179.5]).unwrap();
    assert!(m.abs() > 179.99);
    assert_eq!(mean_longitude(&[]), None);
}

#[test]
fn test_only_latest_issuance_contributes() {
    let content = "\
WP, 28, 2025101806,   , AP01,  24, 140N, 1290W,  50,  985, XX\n\
WP, 28, 2025101806,   , AP02,  24, 142N, 1292W,  52,  984, XX\n\
WP, 28, 2025101812,   , AP01,  24, 151N, 1278W,  60,  978, XX\n";

    let track = compute_mean_forecast(&parse_adeck_file(content).records);
    assert_eq!(track.len(), 1);
    assert_eq!(track[0].issuance_time_utc, Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap());
    assert_eq!(track[0].member_count, 1);
    assert_eq!(track[0].position.lat_degrees(), 15.1);
}

#[test]
fn test_lead_times_sorted_and_complete() {
    let mut content = String::new();
    for lead in [72, 0, 24, 48, 12] {
        content.push_str(&format!("WP, 28, 2025101812,   , AP01, {lead}, 151N, 1278W, 60, 978, XX\n"));
    }

    let track = compute_mean_forecast(&parse_adeck_file(&content).records);
    let leads: Vec<i64> = track.iter().map(|p| p.lead_hours).collect();
    assert_eq!(leads, vec![0, 12, 24, 48, 72]);

    for p in &track {
        assert_eq!((p.valid_at_utc - p.issuance_time_utc).num_hours(), p.lead_hours);
    }
}

#[test]
fn test_members_without_intensity() {
    let content = "\
WP, 28, 2025101812,   , AP01,  24, 151N, 1278W,  60,  978, XX\n\
WP, 28, 2025101812,   , AP02,  24, 153N, 1276W,   -,    -, XX\n";

    let track = compute_mean_forecast(&parse_adeck_file(content).records);
    assert_eq!(track[0].member_count, 2); // position mean over both
    assert_eq!(track[0].vmax_kt, Some(60.0)); // intensity mean over the one that has it
}

#[test]
fn test_empty_input() {
    assert!(compute_mean_forecast(&[]).is_empty());
}
