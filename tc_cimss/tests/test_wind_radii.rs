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
use tc_cimss::*;

const WIND_FILE: &str = "\
Date      Time    Lat    Lon    Vmax  Tb | R34 (NE SE SW NW) R50 R64 | Motion\n\
2025OCT22 130000  18.20 131.40  75.0  -65.2 | 120 110  90 100  60  55  45  50  25  20  15  18 | 290 12\n\
2025OCT22 190000  18.60 130.90  80.0  -67.0 | 130 115  95 105  65  60  50  55  30  25  18  20 | 285 13\n\
2025OCT23 010000  short line |\n";

#[test]
fn test_wind_radii_parsing() {
    let report = parse_wind_radii_file(WIND_FILE);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped, 1);

    let first = &report.records[0];
    assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2025, 10, 22, 13, 0, 0).unwrap());
    assert_eq!(first.radii.ne.r34_nm, Some(120.0));
    assert_eq!(first.radii.se.r34_nm, Some(110.0));
    assert_eq!(first.radii.sw.r34_nm, Some(90.0));
    assert_eq!(first.radii.nw.r34_nm, Some(100.0));
    assert_eq!(first.radii.ne.r50_nm, Some(60.0));
    assert_eq!(first.radii.ne.r64_nm, Some(25.0));
    assert_eq!(first.radii.max_r34_nm(), Some(120.0));
    assert!(first.radii.is_nested());
    assert!(!first.radii.inferred);
}

#[test]
fn test_missing_radii_are_none() {
    // zero means "no radius at this threshold"
    let line = "2025OCT22 130000  18.20 131.40  45.0  -55.0 | 80 70  60 65   0   0   0   0   0   0   0   0 | 290 12";
    let rec = parse_wind_radii_line(line).unwrap();

    assert_eq!(rec.radii.ne.r34_nm, Some(80.0));
    assert!(rec.radii.ne.r50_nm.is_none());
    assert!(rec.radii.ne.r64_nm.is_none());
    assert!(rec.radii.is_nested());
}

#[test]
fn test_non_nesting_row_is_dropped() {
    // r64 > r34 in the NE quadrant - column drift, drop the row
    let line = "2025OCT22 130000  18.20 131.40  75.0  -65.2 | 20 110  90 100  60  55  45  50  25  20  15  18 | 290 12";
    assert!(parse_wind_radii_line(line).is_none());
}
