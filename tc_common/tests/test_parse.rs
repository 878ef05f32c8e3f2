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
use tc_common::datetime::*;
use tc_common::parse::*;

#[test]
fn test_first_number() {
    assert_eq!( first_number("65kt"), Some(65.0));
    assert_eq!( first_number(" 1004.6 "), Some(1004.6));
    assert_eq!( first_number("-5.96"), Some(-5.96));
    assert_eq!( first_number("N/A"), None);
    assert_eq!( first_number("XXX"), None);
    assert_eq!( first_number("-"), None);
    assert_eq!( first_number(""), None);
}

#[test]
fn test_latlon_forms() {
    assert_eq!( parse_latitude("14.25").unwrap().degrees(), 14.25);
    assert_eq!( parse_latitude("14.25S").unwrap().degrees(), -14.25);
    assert_eq!( parse_longitude("-126.75").unwrap().degrees(), -126.75);
    assert_eq!( parse_longitude("126.75W").unwrap().degrees(), -126.75);

    // out of range is rejected, not clamped
    assert!( parse_latitude("91.0").is_none());
    assert!( parse_longitude("181.0").is_none());
}

#[test]
fn test_adeck_tenths() {
    assert_eq!( parse_tenths_latitude("125N").unwrap().degrees(), 12.5);
    assert_eq!( parse_tenths_latitude("125S").unwrap().degrees(), -12.5);
    assert_eq!( parse_tenths_longitude("1453E").unwrap().degrees(), 145.3);
    assert_eq!( parse_tenths_longitude("1278W").unwrap().degrees(), -127.8);

    assert!( parse_tenths_latitude("125E").is_none()); // wrong hemisphere letter
    assert!( parse_tenths_latitude("N").is_none());
}

#[test]
fn test_motion() {
    assert_eq!( parse_motion_bearing("270").unwrap().degrees(), 270.0);
    assert_eq!( parse_motion_bearing("WSW").unwrap().degrees(), 247.5);
    assert_eq!( parse_motion_bearing("nnw").unwrap().degrees(), 337.5);
    assert!( parse_motion_bearing("QQQ").is_none());

    assert_eq!( parse_motion_speed("12kt"), Some(12.0));
    assert!( parse_motion_speed("N/A").is_none());
}

#[test]
fn test_storm_code_extraction() {
    assert_eq!( extract_storm_code("Typhoon 28W YINXING"), Some("28W"));
    assert_eq!( extract_storm_code("odt03S detail"), Some("03S"));
    assert_eq!( extract_storm_code("no code here"), None);
}

#[test]
fn test_compact_datetime() {
    let dt = parse_compact_datetime( "2025-10-18", "03:40").unwrap();
    assert_eq!( dt, Utc.with_ymd_and_hms( 2025, 10, 18, 3, 40, 0).unwrap());

    let dt = parse_compact_datetime( "20251018", "0340").unwrap();
    assert_eq!( dt, Utc.with_ymd_and_hms( 2025, 10, 18, 3, 40, 0).unwrap());

    assert!( parse_compact_datetime( "2025133", "0340").is_none());
}

#[test]
fn test_adt_datetime() {
    let dt = parse_adt_datetime( "2025OCT18", "034000").unwrap();
    assert_eq!( dt, Utc.with_ymd_and_hms( 2025, 10, 18, 3, 40, 0).unwrap());

    assert!( parse_adt_datetime( "2025XXX18", "034000").is_none());
    assert!( parse_adt_datetime( "2025OCT18", "0340").is_none());
}

#[test]
fn test_adeck_datetime() {
    let dt = parse_adeck_datetime( "2025101812").unwrap();
    assert_eq!( dt, Utc.with_ymd_and_hms( 2025, 10, 18, 12, 0, 0).unwrap());
}

#[test]
fn test_synoptic_bin() {
    let dt = Utc.with_ymd_and_hms( 2025, 10, 18, 14, 59, 59).unwrap();
    assert_eq!( synoptic_bin( &dt), Utc.with_ymd_and_hms( 2025, 10, 18, 12, 0, 0).unwrap());
}
