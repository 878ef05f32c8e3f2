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

//! tc_store owns the data model of the pipeline - storms, advisories, quadrant
//! wind radii, ensemble-mean forecast points, watch/warning zones, audit rows -
//! plus the transactional sqlite persistence behind it and the in-process event
//! bus the external collaborators (push, mail, thumbnailing) subscribe to.
//! Entities are plain values with explicit load/save; geometries are carried as
//! geo-types and translated to GeoJSON at the persistence boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use tc_common::geo::GeoPoint;

mod errors;
pub use errors::*;

mod events;
pub use events::*;

mod store;
pub use store::*;

/* #region basin & status enums *********************************************************/

/// the fixed set of reporting basins. The letter suffix of an upstream storm
/// code selects the basin (`28W` -> WP).
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Display,EnumString,Serialize,Deserialize)]
pub enum Basin {
    WP, // western Pacific
    EP, // eastern Pacific
    AL, // Atlantic
    CP, // central Pacific
    SH, // southern hemisphere
    IO, // Indian Ocean
}

impl Basin {
    /// map the trailing letter of an upstream storm code: W->WP, E->EP, S->SH,
    /// L->AL, C->CP, I|A|B->IO
    pub fn from_code_suffix (c: char) -> Option<Basin> {
        match c.to_ascii_uppercase() {
            'W' => Some(Basin::WP),
            'E' => Some(Basin::EP),
            'S' => Some(Basin::SH),
            'L' => Some(Basin::AL),
            'C' => Some(Basin::CP),
            'I' | 'A' | 'B' => Some(Basin::IO),
            _ => None,
        }
    }

    /// normalize loose upstream basin spellings ("W", "WPAC", "ATL", ..)
    pub fn normalize (s: &str) -> Option<Basin> {
        let s = s.trim().to_ascii_uppercase();
        match s.as_str() {
            "WP" | "W" | "WEST" | "WPAC" => Some(Basin::WP),
            "EP" | "E" | "EAST" | "EPAC" => Some(Basin::EP),
            "AL" | "L" | "ATL" | "ATLANTIC" => Some(Basin::AL),
            "CP" | "C" | "CPAC" => Some(Basin::CP),
            "SH" | "S" | "SOUTH" => Some(Basin::SH),
            "IO" | "I" | "A" | "B" | "INDIAN" => Some(Basin::IO),
            _ => None,
        }
    }

    /// single lowercase letter used in A-Deck filenames (`aw282025.dat`)
    pub fn adeck_letter (&self) -> char {
        match self {
            Basin::WP => 'w',
            Basin::EP => 'e',
            Basin::AL => 'l',
            Basin::CP => 'c',
            Basin::SH => 's',
            Basin::IO => 'i',
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Display,EnumString,Serialize,Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StormStatus {
    Active,
    Dormant,
    Archived,
}

impl StormStatus {
    /// the legal state machine edges (archived is terminal)
    pub fn can_transition_to (&self, to: StormStatus) -> bool {
        use StormStatus::*;
        matches!( (self, to), (Active, Dormant) | (Dormant, Active) | (Dormant, Archived))
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Display,EnumString,Serialize,Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Watch,
    Warning,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Display,EnumString,Serialize,Deserialize)]
pub enum Quadrant {
    NE,
    SE,
    SW,
    NW,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Quadrant::NE, Quadrant::SE, Quadrant::SW, Quadrant::NW];
}

/// intensity category from max sustained winds (JTWC style knots scale)
pub fn intensity_category (vmax_kt: f64) -> &'static str {
    if vmax_kt < 34.0 { "TD" }
    else if vmax_kt < 64.0 { "TS" }
    else if vmax_kt < 83.0 { "CAT1" }
    else if vmax_kt < 96.0 { "CAT2" }
    else if vmax_kt < 113.0 { "CAT3" }
    else if vmax_kt < 137.0 { "CAT4" }
    else { "CAT5" }
}

/* #endregion basin & status enums */

/* #region entities *********************************************************************/

#[derive(Debug,Clone)]
pub struct Storm {
    pub id: i64,
    /// upstream storm code, unique (e.g. "28W")
    pub code: String,
    pub basin: Basin,
    pub name: Option<String>,
    pub status: StormStatus,
    pub first_seen_utc: DateTime<Utc>,
    pub last_seen_utc: DateTime<Utc>,
    pub last_status_change_utc: DateTime<Utc>,
    pub history_url: String,
    pub satellite_image_url: Option<String>,
    /// cache of the strongest vmax seen over all ingested advisories
    pub peak_vmax_kt: Option<f64>,
    pub archived_at_utc: Option<DateTime<Utc>>,
    pub archival_reason: Option<String>,
}

#[derive(Debug,Clone)]
pub struct Advisory {
    pub id: i64,
    pub storm_id: i64,
    pub issued_at_utc: DateTime<Utc>,
    pub position: GeoPoint,
    pub vmax_kt: Option<f64>,
    pub mslp_hpa: Option<f64>,
    pub motion_bearing_deg: Option<f64>,
    pub motion_speed_kt: Option<f64>,
    /// content address of the source line - reprocessing the same upstream
    /// bytes maps to the same checksum
    pub line_checksum: String,
    pub parser_version: String,
    pub raw_line: Option<String>,
}

/// one wind threshold triple for a quadrant, nautical miles
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct QuadrantRadii {
    pub r34_nm: Option<f64>,
    pub r50_nm: Option<f64>,
    pub r64_nm: Option<f64>,
}

impl QuadrantRadii {
    /// thresholds must nest: r64 <= r50 <= r34 where all present
    pub fn is_nested (&self) -> bool {
        match (self.r34_nm, self.r50_nm, self.r64_nm) {
            (Some(r34), Some(r50), Some(r64)) => r64 <= r50 && r50 <= r34,
            (Some(r34), Some(r50), None) => r50 <= r34,
            (_, Some(r50), Some(r64)) => r64 <= r50,
            _ => true,
        }
    }
}

/// per-quadrant wind radii of an advisory or forecast point
#[derive(Debug,Clone,Copy,Default,PartialEq,Serialize,Deserialize)]
pub struct RadiiSet {
    #[serde(rename = "NE")] pub ne: QuadrantRadii,
    #[serde(rename = "SE")] pub se: QuadrantRadii,
    #[serde(rename = "SW")] pub sw: QuadrantRadii,
    #[serde(rename = "NW")] pub nw: QuadrantRadii,
    /// true if derived from intensity instead of measured
    #[serde(default)] pub inferred: bool,
}

impl RadiiSet {
    pub fn quadrant (&self, q: Quadrant) -> &QuadrantRadii {
        match q {
            Quadrant::NE => &self.ne,
            Quadrant::SE => &self.se,
            Quadrant::SW => &self.sw,
            Quadrant::NW => &self.nw,
        }
    }

    pub fn quadrant_mut (&mut self, q: Quadrant) -> &mut QuadrantRadii {
        match q {
            Quadrant::NE => &mut self.ne,
            Quadrant::SE => &mut self.se,
            Quadrant::SW => &mut self.sw,
            Quadrant::NW => &mut self.nw,
        }
    }

    /// gale wind field extent: max 34kt radius over all quadrants
    pub fn max_r34_nm (&self) -> Option<f64> {
        Quadrant::ALL.iter()
            .filter_map( |q| self.quadrant(*q).r34_nm)
            .fold( None, |acc, r| Some( acc.map_or( r, |a: f64| a.max(r))))
    }

    pub fn is_nested (&self) -> bool {
        Quadrant::ALL.iter().all( |q| self.quadrant(*q).is_nested())
    }
}

#[derive(Debug,Clone)]
pub struct ForecastPoint {
    pub id: i64,
    pub storm_id: i64,
    pub issuance_time_utc: DateTime<Utc>,
    pub valid_at_utc: DateTime<Utc>,
    pub lead_hours: i64,
    pub position: GeoPoint,
    pub vmax_kt: Option<f64>,
    pub mslp_hpa: Option<f64>,
    pub radii: Option<RadiiSet>,
    /// how many AP members contributed to this mean
    pub member_count: i64,
    pub source_tag: String,
    pub is_final: bool,
}

#[derive(Debug,Clone)]
pub struct Zone {
    pub id: i64,
    pub storm_id: i64,
    pub zone_type: ZoneType,
    pub generated_at_utc: DateTime<Utc>,
    pub valid_from_utc: DateTime<Utc>,
    pub valid_to_utc: DateTime<Utc>,
    pub geometry: MultiPolygon<f64>,
    pub method_version: String,
    /// buffer distances, thresholds and inference coefficients used - kept in
    /// data so downstream tuning does not require a code change
    pub parameters: serde_json::Value,
}

#[derive(Debug,Clone)]
pub struct AuditEntry {
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub details: serde_json::Value,
}

/// new advisory data as produced by the history parsers (no identity yet)
#[derive(Debug,Clone)]
pub struct AdvisoryRecord {
    pub issued_at_utc: DateTime<Utc>,
    pub position: GeoPoint,
    pub vmax_kt: Option<f64>,
    pub mslp_hpa: Option<f64>,
    pub motion_bearing_deg: Option<f64>,
    pub motion_speed_kt: Option<f64>,
    pub line_checksum: String,
    pub parser_version: String,
    pub raw_line: Option<String>,
}

/// new forecast point data as produced by the ensemble reduction
#[derive(Debug,Clone)]
pub struct ForecastPointRecord {
    pub issuance_time_utc: DateTime<Utc>,
    pub valid_at_utc: DateTime<Utc>,
    pub lead_hours: i64,
    pub position: GeoPoint,
    pub vmax_kt: Option<f64>,
    pub mslp_hpa: Option<f64>,
    pub radii: Option<RadiiSet>,
    pub member_count: i64,
    pub source_tag: String,
}

/// new zone data as produced by the zone builder
#[derive(Debug,Clone)]
pub struct ZoneRecord {
    pub zone_type: ZoneType,
    pub valid_from_utc: DateTime<Utc>,
    pub valid_to_utc: DateTime<Utc>,
    pub geometry: MultiPolygon<f64>,
    pub method_version: String,
    pub parameters: serde_json::Value,
}

/// summary statistics computed when a storm is archived
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct ArchivalStats {
    pub peak_vmax_kt: Option<f64>,
    pub min_mslp_hpa: Option<f64>,
    /// accumulated cyclone energy over 6h synoptic bins with vmax >= 34kt
    pub ace: f64,
    pub track_length_km: f64,
    pub duration_hours: f64,
    pub advisory_count: i64,
}

/* #endregion entities */
