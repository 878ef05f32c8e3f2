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

//! per-storm history file parsing. The upstream carries two shapes of history
//! text: the free-format ADT `*-list.txt` (produced by the automated Dvorak
//! technique run, many columns, position near the line tail) and the simpler
//! columnar per-basin lists. Both go through the same tolerant line-by-line
//! driver: comments and empty lines are skipped, every line that fails to
//! parse is recorded but never aborts the file, and only an excessive failure
//! ratio escalates to a permanent parse error for the cycle.

use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use tc_common::datetime::{parse_adt_datetime, parse_compact_datetime};
use tc_common::geo::GeoPoint;
use tc_common::parse::{
    first_number, parse_latitude, parse_longitude, parse_motion_bearing, parse_motion_speed,
};
use tc_store::{AdvisoryRecord, Basin};

/* #region parse report *****************************************************************/

#[derive(Debug,Clone)]
pub struct ParseError {
    pub line_no: usize,
    pub line: String,
    pub reason: String,
}

/// outcome of one tolerant file pass
#[derive(Debug,Clone,Default)]
pub struct ParseReport {
    pub records: Vec<AdvisoryRecord>,
    pub errors: Vec<ParseError>,
    /// blank/comment/header lines that were skipped without counting as errors
    pub skipped: usize,
}

impl ParseReport {
    /// more than half of the data lines failed - escalate for this cycle
    pub fn failure_ratio_exceeded (&self) -> bool {
        let data_lines = self.records.len() + self.errors.len();
        data_lines > 0 && self.errors.len() * 2 > data_lines
    }
}

/* #endregion parse report */

/* #region adapters *********************************************************************/

/// column positions of a columnar basin history list. Upstream column layouts
/// drift between basins; keeping them as data makes a layout change a
/// one-constant change.
#[derive(Debug,Clone,Copy)]
pub struct ColumnMap {
    pub date: usize,
    pub time: usize,
    pub lat: usize,
    pub lon: usize,
    pub vmax: usize,
    pub mslp: usize,
    pub motion_dir: Option<usize>,
    pub motion_speed: Option<usize>,
    pub min_fields: usize,
}

const COLUMNS_GENERIC: ColumnMap = ColumnMap {
    date: 0, time: 1, lat: 2, lon: 3, vmax: 4, mslp: 5,
    motion_dir: Some(6), motion_speed: Some(7), min_fields: 6,
};

/// the basin-polymorphic history parser. All variants share the tolerant
/// driver and the parse primitives; the variant decides line interpretation.
#[derive(Debug,Clone,Copy)]
pub enum HistoryParser {
    /// CIMSS ADT `*-list.txt` free-format extractor
    AdtList,
    /// columnar per-basin list
    Columnar { basin: Basin, columns: ColumnMap },
}

impl HistoryParser {
    /// adapter selection by basin, for columnar history sources
    pub fn for_basin (basin: Basin) -> Self {
        // all basins currently share one layout; the map is per-basin so a
        // single upstream format change stays local
        HistoryParser::Columnar { basin, columns: COLUMNS_GENERIC }
    }

    /// adapter selection by upstream file name
    pub fn for_file (name: &str, basin: Basin) -> Self {
        if name.ends_with( "-list.txt") { HistoryParser::AdtList } else { Self::for_basin( basin) }
    }

    pub fn version (&self) -> &'static str {
        match self {
            HistoryParser::AdtList => "adt-list-1",
            HistoryParser::Columnar{..} => "columnar-1",
        }
    }

    /// tolerant whole-file pass
    pub fn parse_file (&self, content: &str) -> ParseReport {
        let mut report = ParseReport::default();

        for (i, raw) in content.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || self.is_noise( line) {
                report.skipped += 1;
                continue;
            }

            match self.parse_line( line) {
                Some(rec) => report.records.push( rec),
                None => {
                    debug!("line {} unparseable: {}", line_no, line);
                    report.errors.push( ParseError {
                        line_no,
                        line: line.to_string(),
                        reason: "line does not match expected layout".to_string(),
                    });
                }
            }
        }

        if !report.errors.is_empty() {
            warn!("history parse skipped {} of {} data lines",
                report.errors.len(), report.errors.len() + report.records.len());
        }
        report
    }

    /// non-data lines that are part of the format, not errors
    fn is_noise (&self, line: &str) -> bool {
        match self {
            HistoryParser::AdtList => {
                (line.contains( "ADT") && line.contains( "LIST"))
                    || line.contains( "=====")
                    || line.contains( "Date") || line.contains( "Time") || line.contains( "UTC")
            }
            HistoryParser::Columnar{..} => {
                line.starts_with( "Date") || line.contains( "=====")
            }
        }
    }

    pub fn parse_line (&self, line: &str) -> Option<AdvisoryRecord> {
        match self {
            HistoryParser::AdtList => parse_adt_line( line),
            HistoryParser::Columnar{ columns, .. } => parse_columnar_line( line, columns),
        }
    }
}

/// ADT data rows are free-format with a variable middle section, e.g.
///
/// `2025OCT18 034000  2.0 1004.6  30.0  2.0 2.0 2.0  NO LIMIT  OFF ... 14.25 -126.75  ARCHER   HIM-8 23.2`
///
/// date and time lead the line, pressure and intensity are columns 3 and 4,
/// and the position sits at fixed offsets from the line tail. The tail
/// indexing is inherent to the upstream product - a mismatch skips the line.
fn parse_adt_line (line: &str) -> Option<AdvisoryRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 20 { return None }

    let issued_at = parse_adt_datetime( parts[0], parts[1])?;
    let mslp = first_number( parts[3])?;
    let vmax = first_number( parts[4])?;

    let lat = parse_latitude( parts[parts.len() - 5])?;
    let lon = parse_longitude( parts[parts.len() - 4])?;

    Some( AdvisoryRecord {
        issued_at_utc: issued_at,
        position: GeoPoint::from_lon_lat( lon, lat),
        vmax_kt: Some( vmax),
        mslp_hpa: Some( mslp),
        motion_bearing_deg: None,
        motion_speed_kt: None,
        line_checksum: line_checksum( line),
        parser_version: "adt-list-1".to_string(),
        raw_line: Some( line.to_string()),
    })
}

fn parse_columnar_line (line: &str, columns: &ColumnMap) -> Option<AdvisoryRecord> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < columns.min_fields { return None }

    let issued_at = parse_compact_datetime( parts[columns.date], parts[columns.time])?;
    let lat = parse_latitude( parts[columns.lat])?;
    let lon = parse_longitude( parts[columns.lon])?;

    let vmax = parts.get( columns.vmax).and_then( |s| first_number( s));
    let mslp = parts.get( columns.mslp).and_then( |s| first_number( s));

    let motion_bearing = columns.motion_dir
        .and_then( |i| parts.get(i))
        .and_then( |s| parse_motion_bearing( s));
    let motion_speed = columns.motion_speed
        .and_then( |i| parts.get(i))
        .and_then( |s| parse_motion_speed( s));

    Some( AdvisoryRecord {
        issued_at_utc: issued_at,
        position: GeoPoint::from_lon_lat( lon, lat),
        vmax_kt: vmax,
        mslp_hpa: mslp,
        motion_bearing_deg: motion_bearing.map( |b| b.degrees()),
        motion_speed_kt: motion_speed,
        line_checksum: line_checksum( line),
        parser_version: "columnar-1".to_string(),
        raw_line: Some( line.to_string()),
    })
}

/// content address of a source line - reprocessing identical upstream bytes
/// yields identical checksums
pub fn line_checksum (line: &str) -> String {
    let mut hasher = DefaultHasher::new();
    line.trim().hash( &mut hasher);
    format!("{:016x}", hasher.finish())
}

/* #endregion adapters */
