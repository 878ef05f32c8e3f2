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

//! reduction of the AP ensemble to the single mean track per lead time. Only
//! the most recent issuance present in the deck contributes; intensity and
//! pressure are arithmetic means over the members that carry them. Positions
//! use a longitude rotation into [0,360) when the member spread crosses the
//! antimeridian - with the small spread of a 30 member ensemble that is exact
//! enough, and it keeps the mean off the 0 meridian artifact.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use tc_common::angle::normalize_180;
use tc_common::geo::GeoPoint;
use tc_store::ForecastPointRecord;

use crate::parse::AdeckRecord;

pub const SOURCE_TAG: &str = "adecks_open";

/// reduce parsed AP member rows to mean forecast points, one per lead time of
/// the most recent issuance. Empty input reduces to an empty track.
pub fn compute_mean_forecast (members: &[AdeckRecord]) -> Vec<ForecastPointRecord> {
    let Some(latest_issuance) = members.iter().map( |m| m.issuance_time_utc).max() else {
        return Vec::new()
    };

    // lead hour -> members, ordered by lead
    let mut by_lead: BTreeMap<i64, Vec<&AdeckRecord>> = BTreeMap::new();
    for m in members {
        if m.issuance_time_utc == latest_issuance {
            by_lead.entry( m.forecast_hour).or_default().push( m);
        }
    }

    info!("reducing {} member rows at issuance {} over {} lead times",
        members.len(), latest_issuance, by_lead.len());

    by_lead.iter()
        .filter_map( |(lead, group)| mean_point( latest_issuance, *lead, group))
        .collect()
}

fn mean_point (issuance: DateTime<Utc>, lead_hours: i64, members: &[&AdeckRecord]) -> Option<ForecastPointRecord> {
    if members.is_empty() { return None }

    let lats: Vec<f64> = members.iter().map( |m| m.position.lat_degrees()).collect();
    let lons: Vec<f64> = members.iter().map( |m| m.position.lon_degrees()).collect();

    let lat = mean( &lats)?;
    let lon = mean_longitude( &lons)?;

    let vmax = mean( &members.iter().filter_map( |m| m.vmax_kt).collect::<Vec<_>>());
    let mslp = mean( &members.iter().filter_map( |m| m.mslp_hpa).collect::<Vec<_>>());

    Some( ForecastPointRecord {
        issuance_time_utc: issuance,
        valid_at_utc: issuance + Duration::hours( lead_hours),
        lead_hours,
        position: GeoPoint::from_lon_lat_degrees( lon, lat),
        vmax_kt: vmax,
        mslp_hpa: mslp,
        radii: None, // AP members carry no radii; inference happens downstream
        member_count: members.len() as i64,
        source_tag: SOURCE_TAG.to_string(),
    })
}

fn mean (values: &[f64]) -> Option<f64> {
    if values.is_empty() { return None }
    Some( values.iter().sum::<f64>() / values.len() as f64)
}

/// antimeridian-aware longitude mean: when the member spread exceeds 180deg the
/// values straddle the dateline, so rotate into [0,360), average, renormalize
pub fn mean_longitude (lons: &[f64]) -> Option<f64> {
    if lons.is_empty() { return None }

    let (min, max) = lons.iter().fold( (f64::MAX, f64::MIN), |(lo,hi), v| (lo.min(*v), hi.max(*v)));

    if max - min > 180.0 {
        let rotated: Vec<f64> = lons.iter().map( |l| if *l < 0.0 { l + 360.0 } else { *l }).collect();
        mean( &rotated).map( normalize_180)
    } else {
        mean( lons)
    }
}
