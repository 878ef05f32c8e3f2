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

//! parser for the `*.2dwind.txt` companion files carrying per-timestamp
//! quadrant wind radii (four quadrants x 34/50/64 kt, nautical miles). Rows
//! use pipe separators between column groups:
//!
//! `2025OCT22 130000  18.20 131.40  75.0  -65.2 | 120 110  90 100  60  55  45  50  25  20  15  18 | 290 12`
//!
//! Parsed records are matched to the advisory closest in time; anything
//! without an advisory within the match tolerance is dropped.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tc_common::datetime::parse_adt_datetime;
use tc_common::parse::parse_radius_nm;
use tc_store::{QuadrantRadii, RadiiSet};

/// how far a radii timestamp may sit from its matched advisory
pub const MATCH_TOLERANCE_SECS: i64 = 3 * 3600;

#[derive(Debug,Clone)]
pub struct RadiiRecord {
    pub timestamp: DateTime<Utc>,
    pub radii: RadiiSet,
}

#[derive(Debug,Clone,Default)]
pub struct RadiiParseReport {
    pub records: Vec<RadiiRecord>,
    pub skipped: usize,
}

/// tolerant pass over a 2dwind file. Malformed rows are counted and skipped.
pub fn parse_wind_radii_file (content: &str) -> RadiiParseReport {
    let mut report = RadiiParseReport::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with( "Date") {
            continue;
        }

        match parse_wind_radii_line( line) {
            Some(rec) => report.records.push( rec),
            None => {
                debug!("2dwind line skipped: {}", line);
                report.skipped += 1;
            }
        }
    }

    if report.skipped > 0 {
        warn!("2dwind parse skipped {} lines", report.skipped);
    }
    report
}

pub fn parse_wind_radii_line (line: &str) -> Option<RadiiRecord> {
    let parts: Vec<&str> = line.split_whitespace().filter( |p| *p != "|").collect();
    if parts.len() < 18 { return None }

    let timestamp = parse_adt_datetime( parts[0], parts[1])?;

    // 12 radii follow the fixed leading block: R34 NE/SE/SW/NW, then R50, then R64
    let r = |i: usize| parse_radius_nm( parts[6 + i]);

    let mut radii = RadiiSet::default();
    radii.ne = QuadrantRadii { r34_nm: r(0), r50_nm: r(4), r64_nm: r(8) };
    radii.se = QuadrantRadii { r34_nm: r(1), r50_nm: r(5), r64_nm: r(9) };
    radii.sw = QuadrantRadii { r34_nm: r(2), r50_nm: r(6), r64_nm: r(10) };
    radii.nw = QuadrantRadii { r34_nm: r(3), r50_nm: r(7), r64_nm: r(11) };

    if !radii.is_nested() {
        // a non-nesting triple means column drift - drop the row rather than
        // persist inconsistent radii
        return None
    }

    Some( RadiiRecord { timestamp, radii })
}
