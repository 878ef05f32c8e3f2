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
#![allow(unused)]

//! time of first intersection (TOFI): for each coast segment, the earliest
//! forecast valid time at which the storm's gale wind disc touches the
//! segment. The disc radius is the max quadrant 34kt radius, inferred from
//! intensity where the forecast carries no radii. The walk is culled in cheap
//! degree space first; the precise test runs as point-to-polyline distance in
//! a local metric projection. This sits in an O(segments x forecast points)
//! loop, so the hot path stays allocation free.

use chrono::{DateTime, Duration, Utc};
use geo::Coord;
use tracing::debug;

use tc_adeck::RadiiInference;
use tc_common::geo::{distance_km, GeoPoint, LocalTransverseMercator};
use tc_store::{Basin, ForecastPoint};

use crate::coast::CoastSegment;
use crate::ZoneBuilderConfig;

pub const KM_PER_NM: f64 = 1.852;

/// rough degrees per km at the equator, for the preliminary bbox cull only
const DEG_PER_KM: f64 = 1.0 / 111.0;

#[derive(Debug,Clone)]
pub struct TofiHit {
    pub tofi_utc: DateTime<Utc>,
    pub forecast_index: usize,
    pub distance_km: f64,
    pub radius_km: f64,
}

/// gale disc radius of a forecast point in km: measured max quadrant r34, or
/// inferred from intensity and track speed
pub fn gale_radius_km (
    track: &[ForecastPoint], idx: usize, basin: Basin, inference: &RadiiInference,
) -> Option<f64> {
    let point = &track[idx];

    let r34_nm = match point.radii.as_ref().and_then( |r| r.max_r34_nm()) {
        Some(nm) => Some( nm),
        None => {
            let vmax = point.vmax_kt?;
            let speed = track_speed_kt( track, idx);
            inference.infer( vmax, basin, speed)
                .and_then( |set| set.max_r34_nm())
        }
    };

    r34_nm.map( |nm| nm * KM_PER_NM)
}

/// forward speed at a track point in knots, from the geodesic distance to the
/// neighboring point
pub fn track_speed_kt (track: &[ForecastPoint], idx: usize) -> Option<f64> {
    let (a, b) = if idx + 1 < track.len() {
        (&track[idx], &track[idx + 1])
    } else if idx > 0 {
        (&track[idx - 1], &track[idx])
    } else {
        return None
    };

    let hours = (b.valid_at_utc - a.valid_at_utc).num_seconds() as f64 / 3600.0;
    if hours <= 0.0 { return None }

    let km_h = distance_km( &a.position, &b.position) / hours;
    Some( km_h / KM_PER_NM)
}

/// walk the forecast track in lead order and return the first intersection of
/// the gale disc with the segment
pub fn time_of_first_intersection (
    segment: &CoastSegment,
    track: &[ForecastPoint],
    basin: Basin,
    inference: &RadiiInference,
) -> Option<TofiHit> {
    for (idx, point) in track.iter().enumerate() {
        let Some(radius_km) = gale_radius_km( track, idx, basin, inference) else { continue };

        // cheap degree-space cull before any geodesy
        let margin_deg = radius_km * DEG_PER_KM * 1.5;
        if !segment.bbox_within( point.position.lon_degrees(), point.position.lat_degrees(), margin_deg) {
            continue;
        }

        let dist_km = segment_distance_km( segment, &point.position);
        if dist_km <= radius_km {
            return Some( TofiHit {
                tofi_utc: point.valid_at_utc,
                forecast_index: idx,
                distance_km: dist_km,
                radius_km,
            })
        }
    }
    None
}

/// precise distance from a point to a coastal polyline: both are projected
/// into a local transverse Mercator centered on the point and measured in
/// euclidean meters (equivalent to testing the segment against the metric
/// buffer of the point)
pub fn segment_distance_km (segment: &CoastSegment, p: &GeoPoint) -> f64 {
    let tm = LocalTransverseMercator::for_centroid_lon( p.longitude());
    let origin = tm.project( p);

    let mut min_d2 = f64::MAX;
    let mut prev: Option<Coord<f64>> = None;

    for sp in &segment.points {
        let c = tm.project( sp);
        if let Some(a) = prev {
            min_d2 = min_d2.min( point_segment_dist2( &origin, &a, &c));
        } else {
            min_d2 = min_d2.min( dist2( &origin, &c));
        }
        prev = Some( c);
    }

    min_d2.sqrt() / 1000.0
}

#[inline]
fn dist2 (a: &Coord<f64>, b: &Coord<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx*dx + dy*dy
}

#[inline]
fn point_segment_dist2 (p: &Coord<f64>, a: &Coord<f64>, b: &Coord<f64>) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx*abx + aby*aby;
    if len2 == 0.0 { return dist2( p, a) }

    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp( 0.0, 1.0);
    let proj = Coord { x: a.x + t * abx, y: a.y + t * aby };
    dist2( p, &proj)
}

/// forward-speed TOFI correction: faster storms arrive proportionally earlier.
/// shift = (1 - speed/reference) * 3h, clipped to +-3h
pub fn corrected_tofi (
    hit: &TofiHit,
    track: &[ForecastPoint],
    config: &ZoneBuilderConfig,
) -> DateTime<Utc> {
    let Some(speed) = track_speed_kt( track, hit.forecast_index) else { return hit.tofi_utc };

    let shift_hours = ((1.0 - speed / config.reference_speed_kt) * 3.0)
        .clamp( -config.max_tofi_shift_hours, config.max_tofi_shift_hours);

    hit.tofi_utc + Duration::seconds( (shift_hours * 3600.0) as i64)
}
