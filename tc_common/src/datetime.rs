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

//! UTC datetime helpers shared by the upstream text parsers. All upstream
//! products (index pages, history lists, A-Decks, radii files) report times
//! without zone designators that are UTC by contract.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use std::time::Duration;

// as of Rust 1.87 the min,hour,day Duration ctors are experimental and require multiple crate
// attributes so we provide our own wrappers
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }
#[inline] pub fn days (n: u64)->Duration { Duration::from_secs(n * 86400) }

/// this should be used wherever we might have to use sim clock instead of wall clock
#[inline]
pub fn utc_now()->DateTime<Utc> {
    Utc::now()
}

#[inline]
pub fn elapsed_hours_since (dt: &DateTime<Utc>) -> i64 {
    (utc_now() - *dt).num_hours()
}

pub fn hours_between (later: &DateTime<Utc>, earlier: &DateTime<Utc>) -> f64 {
    (*later - *earlier).num_seconds() as f64 / 3600.0
}

const MONTH_ABBREVS: [&str; 12] = ["JAN","FEB","MAR","APR","MAY","JUN","JUL","AUG","SEP","OCT","NOV","DEC"];

/// three letter month abbreviation (case insensitive) to 1-based month number
pub fn month_from_abbrev (s: &str) -> Option<u32> {
    let s = s.to_ascii_uppercase();
    MONTH_ABBREVS.iter().position( |m| *m == s).map( |i| (i as u32) + 1)
}

/// parse `YYYYMMDDHHMM` date/time tokens as UTC, after stripping `-`, `/` and `:` separators.
/// This accepts both pre-joined (`"202510180340"`) and split (`"2025-10-18","03:40"`) inputs.
pub fn parse_compact_datetime (date_s: &str, time_s: &str) -> Option<DateTime<Utc>> {
    let mut buf = String::with_capacity(12);
    for c in date_s.chars().chain( time_s.chars()) {
        if c != '-' && c != '/' && c != ':' { buf.push(c) }
    }
    let ndt = NaiveDateTime::parse_from_str( &buf, "%Y%m%d%H%M").ok()?;
    Some( Utc.from_utc_datetime( &ndt))
}

/// parse the `YYYYMMDDHH` issuance stamp used by A-Deck records
pub fn parse_adeck_datetime (s: &str) -> Option<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str( s.trim(), "%Y%m%d%H").ok()?;
    Some( Utc.from_utc_datetime( &ndt))
}

/// parse the ADT style date (`YYYYmonDD`, three letter month abbrev) plus `HHMMSS` time token
pub fn parse_adt_datetime (date_s: &str, time_s: &str) -> Option<DateTime<Utc>> {
    let date_s = date_s.trim();
    let time_s = time_s.trim();
    if date_s.len() != 9 || time_s.len() != 6 { return None }

    let year: i32 = date_s[0..4].parse().ok()?;
    let month = month_from_abbrev( &date_s[4..7])?;
    let day: u32 = date_s[7..9].parse().ok()?;

    let hour: u32 = time_s[0..2].parse().ok()?;
    let min: u32 = time_s[2..4].parse().ok()?;
    let sec: u32 = time_s[4..6].parse().ok()?;

    let nd = NaiveDate::from_ymd_opt( year, month, day)?;
    let nt = NaiveTime::from_hms_opt( hour, min, sec)?;
    Some( Utc.from_utc_datetime( &NaiveDateTime::new( nd, nt)))
}

/// floor a datetime to the enclosing synoptic 6h bin (00/06/12/18Z)
pub fn synoptic_bin (dt: &DateTime<Utc>) -> DateTime<Utc> {
    let h = dt.hour() - (dt.hour() % 6);
    dt.with_hour(h).unwrap()
        .with_minute(0).unwrap()
        .with_second(0).unwrap()
        .with_nanosecond(0).unwrap()
}
