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
use tc_store::Basin;

#[test]
fn test_line_parsing() {
    let line = "WP, 28, 2025101812,   , AP07,  24, 151N, 1278W,  63,  975, XX";
    let rec = parse_adeck_line(line).unwrap();

    assert_eq!(rec.basin, "WP");
    assert_eq!(rec.storm_num, "28");
    assert_eq!(rec.issuance_time_utc, Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap());
    assert_eq!(rec.model_code, "AP07");
    assert_eq!(rec.forecast_hour, 24);
    assert_eq!(rec.position.lat_degrees(), 15.1);
    assert_eq!(rec.position.lon_degrees(), -127.8);
    assert_eq!(rec.vmax_kt, Some(63.0));
    assert_eq!(rec.mslp_hpa, Some(975.0));
}

#[test]
fn test_missing_value_markers() {
    let line = "WP, 28, 2025101812,   , AP07,  24, 151N, 1278W,  -, N/A, XX";
    let rec = parse_adeck_line(line).unwrap();
    assert!(rec.vmax_kt.is_none());
    assert!(rec.mslp_hpa.is_none());

    let line = "WP, 28, 2025101812,   , AP07,  24, 151N, 1278W, XXX, , XX";
    let rec = parse_adeck_line(line).unwrap();
    assert!(rec.vmax_kt.is_none());
    assert!(rec.mslp_hpa.is_none());
}

#[test]
fn test_malformed_lines() {
    assert!(parse_adeck_line("WP, 28, 2025101812").is_none()); // too few fields
    assert!(parse_adeck_line("WP, 28, not_a_date,  , AP07, 24, 151N, 1278W, 63, 975, XX").is_none());
    assert!(parse_adeck_line("WP, 28, 2025101812,  , AP07, 24, 151X, 1278W, 63, 975, XX").is_none()); // bad hemisphere
    assert!(parse_adeck_line("WP, 28, 2025101812,  , AP07, -6, 151N, 1278W, 63, 975, XX").is_none()); // negative lead
}

#[test]
fn test_file_tolerance() {
    let content = "\
WP, 28, 2025101812,   , AP01,  24, 151N, 1278W,  60,  978, XX\n\
# a comment line\n\
not an adeck line at all\n\
WP, 28, 2025101812,   , AP02,  24, 152N, 1279W,  70,  972, XX\n";

    let report = parse_adeck_file(content);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.errors, 1);
    assert_eq!(report.skipped, 1);
    assert!(!report.failure_ratio_exceeded());
}

#[test]
fn test_ensemble_filter() {
    assert!(is_ap_member("AP01"));
    assert!(is_ap_member("AP30"));
    assert!(!is_ap_member("AP00"));
    assert!(!is_ap_member("AP31"));
    assert!(!is_ap_member("AVNO"));
    assert!(!is_ap_member("JTWC"));
    assert!(!is_ap_member("AP7")); // not zero padded

    let content = "\
WP, 28, 2025101812,   , AP01,  24, 151N, 1278W,  60,  978, XX\n\
WP, 28, 2025101812,   , AVNO,  24, 150N, 1280W,  58,  980, XX\n\
WP, 28, 2025101812,   , AP30,  24, 152N, 1277W,  66,  974, XX\n";

    let members = filter_ap_members(parse_adeck_file(content).records);
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| is_ap_member(&m.model_code)));
}

#[test]
fn test_adeck_url() {
    let config = AdeckConfig::default();
    assert_eq!(
        config.adeck_url(Basin::WP, 28, 2025),
        format!("{}aw282025.dat", config.base_url)
    );
    assert_eq!(
        config.adeck_url(Basin::SH, 3, 2024),
        format!("{}as032024.dat", config.base_url)
    );
    assert_eq!(storm_number("28W"), Some(28));
    assert_eq!(storm_number("03S"), Some(3));
    assert_eq!(storm_number("XXX"), None);
}
