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
use geo::{Contains, Point};
use tc_adeck::RadiiInference;
use tc_common::geo::GeoPoint;
use tc_store::{Basin, ForecastPoint, QuadrantRadii, RadiiSet, ZoneType};
use tc_zones::*;

// run with "cargo test -p tc_zones -- --nocapture"

fn radii_r34(nm: f64) -> RadiiSet {
    let q = QuadrantRadii { r34_nm: Some(nm), r50_nm: None, r64_nm: None };
    RadiiSet { ne: q, se: q, sw: q, nw: q, inferred: false }
}

fn forecast_point(issuance: DateTime<Utc>, lead: i64, lon: f64, lat: f64, r34_nm: Option<f64>) -> ForecastPoint {
    ForecastPoint {
        id: 0,
        storm_id: 1,
        issuance_time_utc: issuance,
        valid_at_utc: issuance + Duration::hours(lead),
        lead_hours: lead,
        position: GeoPoint::from_lon_lat_degrees(lon, lat),
        vmax_kt: Some(70.0),
        mslp_hpa: Some(970.0),
        radii: r34_nm.map(radii_r34),
        member_count: 30,
        source_tag: "adecks_open".to_string(),
        is_final: true,
    }
}

/// track moving due north at ~15kt (the reference speed, so the forward-speed
/// TOFI shift stays negligible), with a 60nm gale radius
fn northward_track(now: DateTime<Utc>) -> Vec<ForecastPoint> {
    vec![
        forecast_point(now, 12, 130.0, 10.0, Some(60.0)),
        forecast_point(now, 36, 130.0, 16.0, Some(60.0)),
        forecast_point(now, 60, 130.0, 22.0, Some(60.0)),
    ]
}

fn near_coast_segment(name: &str, lat: f64) -> CoastSegment {
    CoastSegment::from_coords(name, &[(130.5, lat - 0.2), (130.5, lat + 0.2)])
}

#[test]
fn test_classification_scenario() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    let track = northward_track(now);

    let a = near_coast_segment("A", 10.0); // disc hits at now+12h -> warning
    let b = near_coast_segment("B", 16.0); // now+36h -> watch
    let c = near_coast_segment("C", 22.0); // now+60h -> excluded

    let builder = ZoneBuilder::new(ZoneBuilderConfig::default(), RadiiInference::default());
    let outcome = builder.build(Basin::WP, &track, &[&a, &b, &c], now).unwrap();

    let ZoneBuildOutcome::Zones(zones) = outcome else { panic!("expected zones") };
    assert_eq!(zones.len(), 2);

    let warning = zones.iter().find(|z| z.zone_type == ZoneType::Warning).unwrap();
    let watch = zones.iter().find(|z| z.zone_type == ZoneType::Watch).unwrap();

    // validity windows: warning 24h, watch 48h
    assert_eq!(warning.valid_from_utc, now);
    assert_eq!(warning.valid_to_utc - warning.valid_from_utc, Duration::hours(24));
    assert_eq!(watch.valid_to_utc - watch.valid_from_utc, Duration::hours(48));

    // the warning band covers segment A, the watch band covers B, nothing covers C
    assert!(warning.geometry.contains(&Point::new(130.5, 10.0)));
    assert!(!warning.geometry.contains(&Point::new(130.5, 16.0)));
    assert!(watch.geometry.contains(&Point::new(130.5, 16.0)));
    assert!(!warning.geometry.contains(&Point::new(130.5, 22.0)));
    assert!(!watch.geometry.contains(&Point::new(130.5, 22.0)));

    // parameters carry the tuning knobs
    assert_eq!(warning.parameters["buffer_km"], 75.0);
    assert_eq!(watch.parameters["buffer_km"], 50.0);
    assert_eq!(warning.method_version, METHOD_VERSION);
}

#[test]
fn test_missing_forecast_produces_no_zones() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    let builder = ZoneBuilder::new(ZoneBuilderConfig::default(), RadiiInference::default());
    let segment = near_coast_segment("A", 10.0);

    let outcome = builder.build(Basin::WP, &[], &[&segment], now).unwrap();
    assert!(matches!(outcome, ZoneBuildOutcome::NoForecast));
}

#[test]
fn test_far_track_yields_empty_zone_set() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    let track = northward_track(now);
    let far = CoastSegment::from_coords("far", &[(150.0, 10.0), (150.0, 11.0)]);

    let builder = ZoneBuilder::new(ZoneBuilderConfig::default(), RadiiInference::default());
    let ZoneBuildOutcome::Zones(zones) = builder.build(Basin::WP, &track, &[&far], now).unwrap() else {
        panic!("expected zone outcome")
    };
    assert!(zones.is_empty());
}

#[test]
fn test_tofi_walk_stops_at_first_hit() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    // the track passes segment A twice within range; TOFI is the earlier pass
    let track = vec![
        forecast_point(now, 12, 130.0, 10.0, Some(60.0)),
        forecast_point(now, 36, 130.0, 10.5, Some(60.0)),
    ];
    let a = near_coast_segment("A", 10.0);

    let hit = time_of_first_intersection(&a, &track, Basin::WP, &RadiiInference::default()).unwrap();
    assert_eq!(hit.forecast_index, 0);
    assert_eq!(hit.tofi_utc, now + Duration::hours(12));
    assert!(hit.distance_km <= hit.radius_km);
}

#[test]
fn test_gale_radius_inference_fallback() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    // no measured radii on the track - the 70kt intensity must produce a disc
    let track = vec![
        forecast_point(now, 12, 130.0, 10.0, None),
        forecast_point(now, 36, 130.0, 16.0, None),
    ];

    let r = gale_radius_km(&track, 0, Basin::WP, &RadiiInference::default()).unwrap();
    assert!(r > 50.0 && r < 500.0, "implausible inferred gale radius {r}");

    // weak system below gale strength yields no disc
    let mut weak = track.clone();
    weak[0].vmax_kt = Some(25.0);
    assert!(gale_radius_km(&weak, 0, Basin::WP, &RadiiInference::default()).is_none());
}

#[test]
fn test_segment_distance() {
    // segment half a degree of longitude away at the equator: ~55.7km
    let segment = CoastSegment::from_coords("s", &[(130.5, -0.5), (130.5, 0.5)]);
    let d = segment_distance_km(&segment, &GeoPoint::from_lon_lat_degrees(130.0, 0.0));
    assert!((d - 55.65).abs() < 1.0, "distance {d}");
}

#[test]
fn test_forward_speed_correction() {
    let now = Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap();
    let config = ZoneBuilderConfig::default();

    // slow storm (track barely moves): shift approaches +3h (arrives later)
    let slow = vec![
        forecast_point(now, 12, 130.0, 10.0, Some(60.0)),
        forecast_point(now, 36, 130.0, 10.1, Some(60.0)),
    ];
    let hit = TofiHit { tofi_utc: now + Duration::hours(12), forecast_index: 0, distance_km: 30.0, radius_km: 111.0 };
    let corrected = corrected_tofi(&hit, &slow, &config);
    assert!(corrected > hit.tofi_utc);
    assert!(corrected - hit.tofi_utc <= Duration::hours(3));

    // fast storm: shift is negative and clipped at -3h
    let fast = vec![
        forecast_point(now, 12, 130.0, 10.0, Some(60.0)),
        forecast_point(now, 36, 130.0, 25.0, Some(60.0)),
    ];
    let corrected = corrected_tofi(&hit, &fast, &config);
    assert!(corrected < hit.tofi_utc);
    assert!(hit.tofi_utc - corrected <= Duration::hours(3));
}

#[test]
fn test_closing_dissolves_small_gaps() {
    use geo::{Area, Coord};

    // two discs 150km apart: a 100km closing radius bridges the 50km gap
    let a = morph_disc_at(0.0, 0.0, 50_000.0);
    let b = morph_disc_at(150_000.0, 0.0, 50_000.0);
    let separate = geo::unary_union([&a, &b].into_iter());
    assert_eq!(separate.0.len(), 2);

    let closed = close_gaps(&separate, 100_000.0, 24);
    assert_eq!(closed.0.len(), 1, "closing did not merge the discs");

    // closing must not shrink the input below its original area
    assert!(closed.unsigned_area() >= separate.unsigned_area() * 0.95);

    fn morph_disc_at(x: f64, y: f64, r: f64) -> geo::Polygon<f64> {
        disc(Coord { x, y }, r, 24)
    }
}

#[test]
fn test_builtin_coast_source() {
    let source = CoastSource::builtin();
    assert!(!source.is_empty());
    assert!(!source.segments_for_basin(Basin::WP).is_empty());
    assert!(!source.segments_for_basin(Basin::SH).is_empty());

    // WP segments are not served to the Atlantic
    let al = source.segments_for_basin(Basin::AL);
    assert!(al.iter().all(|s| !s.name.starts_with("philippines")));
}
