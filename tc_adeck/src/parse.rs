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

//! A-Deck record parsing. One row per (storm, issuance, model, lead hour),
//! comma separated:
//!
//! `WP, 28, 2025101812,   , AP07,  24, 151N, 1278W,  63,  975, XX, ...`
//!
//! positions are integer tenths of a degree with hemisphere suffix, missing
//! numerics appear as `-`, `N/A`, `XXX` or empty. Unparseable lines accumulate
//! in the report and never abort the file.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tc_common::datetime::parse_adeck_datetime;
use tc_common::geo::GeoPoint;
use tc_common::parse::{first_number, parse_tenths_latitude, parse_tenths_longitude};

/// one parsed A-Deck forecast row
#[derive(Debug,Clone)]
pub struct AdeckRecord {
    pub basin: String,
    pub storm_num: String,
    pub issuance_time_utc: DateTime<Utc>,
    pub model_code: String,
    pub forecast_hour: i64,
    pub position: GeoPoint,
    pub vmax_kt: Option<f64>,
    pub mslp_hpa: Option<f64>,
}

#[derive(Debug,Clone,Default)]
pub struct AdeckParseReport {
    pub records: Vec<AdeckRecord>,
    pub errors: usize,
    pub skipped: usize,
}

impl AdeckParseReport {
    pub fn failure_ratio_exceeded (&self) -> bool {
        let data_lines = self.records.len() + self.errors;
        data_lines > 0 && self.errors * 2 > data_lines
    }
}

/// tolerant pass over a whole A-Deck file
pub fn parse_adeck_file (content: &str) -> AdeckParseReport {
    let mut report = AdeckParseReport::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            report.skipped += 1;
            continue;
        }

        match parse_adeck_line( line) {
            Some(rec) => report.records.push( rec),
            None => {
                debug!("A-Deck line unparseable: {}", line);
                report.errors += 1;
            }
        }
    }

    if report.errors > 0 {
        warn!("A-Deck parse skipped {} lines", report.errors);
    }
    report
}

pub fn parse_adeck_line (line: &str) -> Option<AdeckRecord> {
    let parts: Vec<&str> = line.split(',').map( |p| p.trim()).collect();
    if parts.len() < 10 { return None }

    let issuance = parse_adeck_datetime( parts[2])?;
    let forecast_hour: i64 = first_number( parts[5]).map( |v| v as i64)?;
    if forecast_hour < 0 { return None }

    let lat = parse_tenths_latitude( parts[6])?;
    let lon = parse_tenths_longitude( parts[7])?;

    Some( AdeckRecord {
        basin: parts[0].to_string(),
        storm_num: parts[1].to_string(),
        issuance_time_utc: issuance,
        model_code: parts[4].to_string(),
        forecast_hour,
        position: GeoPoint::from_lon_lat( lon, lat),
        vmax_kt: first_number( parts[8]),
        mslp_hpa: first_number( parts[9]),
    })
}

/// the in-scope ensemble is exactly AP01..AP30
pub fn is_ap_member (model_code: &str) -> bool {
    let code = model_code.trim();
    if code.len() != 4 || !code.starts_with( "AP") { return false }
    matches!( code[2..].parse::<u32>(), Ok(n) if (1..=30).contains( &n))
}

/// discard everything that is not an AP01..AP30 member
pub fn filter_ap_members (records: Vec<AdeckRecord>) -> Vec<AdeckRecord> {
    records.into_iter().filter( |r| is_ap_member( &r.model_code)).collect()
}
