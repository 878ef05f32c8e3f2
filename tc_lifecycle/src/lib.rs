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

//! the storm lifecycle state machine: active storms fall dormant when their
//! advisory stream stalls, dormant storms reactivate on a fresh advisory or
//! get archived after a week of silence. Archival validates preconditions,
//! computes the summary statistics pack and lands with its audit row in one
//! transaction; exports and thumbnails are asynchronous consequences driven
//! by the emitted event, not part of the transition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tc_common::datetime::synoptic_bin;
use tc_common::geo::distance_km;
use tc_store::{
    Advisory, ArchivalStats, EventBus, Storm, StormStatus, Store, TcEvent,
};

mod errors;
pub use errors::*;

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct LifecycleConfig {
    /// hours without a new advisory before an active storm turns dormant
    pub dormant_hours: i64,

    /// hours without a new advisory before a dormant storm is archived
    pub archive_hours: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        LifecycleConfig { dormant_hours: 24, archive_hours: 168 }
    }
}

/// staleness reference of a storm: its newest advisory, or the time the storm
/// was first seen when no advisory ever arrived
async fn staleness_reference (store: &Store, storm: &Storm) -> Result<DateTime<Utc>> {
    Ok( store.latest_advisory( storm.id).await?
        .map( |a| a.issued_at_utc)
        .unwrap_or( storm.first_seen_utc))
}

/// mark active storms past the dormancy threshold. Returns the codes of the
/// storms transitioned.
pub async fn check_dormant (
    store: &Store, events: &EventBus, config: &LifecycleConfig, now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let threshold = now - Duration::hours( config.dormant_hours);
    let mut transitioned = Vec::new();

    for storm in store.list_storms( StormStatus::Active).await? {
        if staleness_reference( store, &storm).await? >= threshold { continue }

        let reason = format!("no advisories for {}h", config.dormant_hours);
        info!("marking storm {} dormant: {}", storm.code, reason);
        store.transition_status( &storm, StormStatus::Dormant, &reason, None).await?;

        events.publish( TcEvent::StormStatusChanged {
            storm_code: storm.code.clone(),
            from: StormStatus::Active,
            to: StormStatus::Dormant,
            reason,
        });
        transitioned.push( storm.code);
    }
    Ok( transitioned)
}

/// archive dormant storms past the archive threshold. A storm whose archival
/// is blocked (pending alert intents, no advisories) is skipped this cycle,
/// not failed - the rest of the batch proceeds.
pub async fn check_archive (
    store: &Store, events: &EventBus, config: &LifecycleConfig, now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let threshold = now - Duration::hours( config.archive_hours);
    let mut archived = Vec::new();

    for storm in store.list_storms( StormStatus::Dormant).await? {
        if staleness_reference( store, &storm).await? >= threshold { continue }

        match archive_storm( store, events, &storm, "automatic").await {
            Ok(_) => archived.push( storm.code),
            Err(e) => warn!("cannot archive storm {}: {}", storm.code, e),
        }
    }
    Ok( archived)
}

/// dormant -> active on a freshly observed advisory (called from the ingest
/// path after a successful advisory write)
pub async fn reactivate (store: &Store, events: &EventBus, storm: &Storm) -> Result<bool> {
    if storm.status != StormStatus::Dormant { return Ok( false) }

    let reason = "new advisory observed".to_string();
    info!("reactivating dormant storm {}", storm.code);
    store.transition_status( storm, StormStatus::Active, &reason, None).await?;

    events.publish( TcEvent::StormStatusChanged {
        storm_code: storm.code.clone(),
        from: StormStatus::Dormant,
        to: StormStatus::Active,
        reason,
    });
    Ok( true)
}

/// full archival workflow: validate, compute the statistics pack, transition
/// with audit in one transaction, emit the status event
pub async fn archive_storm (
    store: &Store, events: &EventBus, storm: &Storm, reason: &str,
) -> Result<ArchivalStats> {
    let advisories = store.advisories_for_storm( storm.id).await?;
    if advisories.is_empty() {
        return Err( archival_blocked( format!( "storm {} has no advisories", storm.code)))
    }

    let pending = store.count_pending_alert_intents( storm.id).await?;
    if pending > 0 {
        return Err( archival_blocked( format!( "storm {} has {} in-flight alert intents", storm.code, pending)))
    }

    let stats = compute_archival_stats( &advisories);
    store.transition_status( storm, StormStatus::Archived, reason, Some( &stats)).await?;

    let peak_category = stats.peak_vmax_kt.map( tc_store::intensity_category).unwrap_or( "n/a");
    info!("archived storm {} ({:?}): peak {:?}kt ({}), ACE {:.2}, {:.0}km track",
        storm.code, storm.name, stats.peak_vmax_kt, peak_category, stats.ace, stats.track_length_km);

    events.publish( TcEvent::StormStatusChanged {
        storm_code: storm.code.clone(),
        from: storm.status,
        to: StormStatus::Archived,
        reason: reason.to_string(),
    });
    Ok( stats)
}

/// the archival summary: peak intensity, minimum pressure, accumulated cyclone
/// energy, geodesic track length and duration. ACE sums `vmax^2 / 10^4` over
/// 6-hour synoptic bins (the strongest advisory of each bin counts) for bins
/// at or above gale strength - sub-synoptic advisory cadences would otherwise
/// overweight storms with chattier upstreams.
pub fn compute_archival_stats (advisories: &[Advisory]) -> ArchivalStats {
    let peak = advisories.iter().filter_map( |a| a.vmax_kt)
        .fold( None, |acc: Option<f64>, v| Some( acc.map_or( v, |p| p.max(v))));
    let min_mslp = advisories.iter().filter_map( |a| a.mslp_hpa)
        .fold( None, |acc: Option<f64>, v| Some( acc.map_or( v, |p| p.min(v))));

    let mut ace = 0.0;
    let mut current_bin: Option<DateTime<Utc>> = None;
    let mut bin_max: Option<f64> = None;

    // advisories arrive time-ordered from the store
    for a in advisories {
        let bin = synoptic_bin( &a.issued_at_utc);
        if current_bin != Some( bin) {
            ace += bin_ace( bin_max);
            current_bin = Some( bin);
            bin_max = None;
        }
        if let Some(v) = a.vmax_kt {
            bin_max = Some( bin_max.map_or( v, |m| m.max(v)));
        }
    }
    ace += bin_ace( bin_max);

    let track_length_km = advisories.windows(2)
        .map( |w| distance_km( &w[0].position, &w[1].position))
        .sum();

    let duration_hours = match (advisories.first(), advisories.last()) {
        (Some(first), Some(last)) => (last.issued_at_utc - first.issued_at_utc).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };

    ArchivalStats {
        peak_vmax_kt: peak,
        min_mslp_hpa: min_mslp,
        ace,
        track_length_km,
        duration_hours,
        advisory_count: advisories.len() as i64,
    }
}

fn bin_ace (bin_max: Option<f64>) -> f64 {
    match bin_max {
        Some(v) if v >= 34.0 => v * v / 10_000.0,
        _ => 0.0,
    }
}
