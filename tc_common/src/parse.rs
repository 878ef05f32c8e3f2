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

//! tolerant text parse primitives shared by the upstream file parsers. The
//! upstream products are hand-formatted fixed-ish column text - these helpers
//! extract what is extractable and return None for anything else, so that line
//! parsers can skip-and-count instead of failing a whole file.

use lazy_static::lazy_static;
use regex::Regex;

use crate::angle::{bearing_from_compass_point, Bearing, Latitude, Longitude};

lazy_static! {
    static ref NUM_RE: Regex = Regex::new( r"[-+]?\d*\.?\d+").unwrap();
    static ref STORM_CODE_RE: Regex = Regex::new( r"\b(\d{2}[A-Z])\b").unwrap();
}

/// tokens upstream uses for "no value" in numeric fields
pub fn is_missing_marker (s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == "-" || s.eq_ignore_ascii_case("N/A") || s.eq_ignore_ascii_case("XXX")
}

/// first numeric token embedded in a string (`"65kt"` -> 65.0), None for missing markers
pub fn first_number (s: &str) -> Option<f64> {
    if is_missing_marker(s) { return None }
    NUM_RE.find(s).and_then( |m| m.as_str().parse().ok())
}

pub fn all_numbers (s: &str) -> Vec<f64> {
    NUM_RE.find_iter(s).filter_map( |m| m.as_str().parse().ok()).collect()
}

/// extract an upstream storm code such as `28W` or `03S` from surrounding text
pub fn extract_storm_code (s: &str) -> Option<&str> {
    STORM_CODE_RE.captures(s).and_then( |c| c.get(1)).map( |m| m.as_str())
}

/// parse a latitude token in decimal (`"14.25"`, `"-14.25"`) or hemisphere
/// suffixed (`"14.25S"`) form. Out-of-range values are rejected, not clamped.
pub fn parse_latitude (s: &str) -> Option<Latitude> {
    let v = first_number(s)?;
    let v = if s.to_ascii_uppercase().contains('S') { -v.abs() } else { v };
    Latitude::checked_from_degrees(v)
}

/// parse a longitude token in decimal or hemisphere suffixed (`"126.75W"`) form
pub fn parse_longitude (s: &str) -> Option<Longitude> {
    let v = first_number(s)?;
    let v = if s.to_ascii_uppercase().contains('W') { -v.abs() } else { v };
    Longitude::checked_from_degrees(v)
}

/// parse an A-Deck position token: integer tenths of a degree with hemisphere
/// suffix (`"125N"` -> 12.5, `"1453E"` -> 145.3)
pub fn parse_tenths_latitude (s: &str) -> Option<Latitude> {
    let (v, hemi) = split_tenths(s)?;
    let v = match hemi { 'N' => v, 'S' => -v, _ => return None };
    Latitude::checked_from_degrees(v)
}

pub fn parse_tenths_longitude (s: &str) -> Option<Longitude> {
    let (v, hemi) = split_tenths(s)?;
    let v = match hemi { 'E' => v, 'W' => -v, _ => return None };
    Longitude::checked_from_degrees(v)
}

fn split_tenths (s: &str) -> Option<(f64, char)> {
    let s = s.trim();
    if s.len() < 2 { return None }
    let (digits, hemi) = s.split_at( s.len() - 1);
    let hemi = hemi.chars().next()?.to_ascii_uppercase();
    let tenths: f64 = digits.parse::<u32>().ok()? as f64;
    Some( (tenths / 10.0, hemi))
}

/// motion direction: numeric bearing in degrees or one of the 16 compass points
pub fn parse_motion_bearing (s: &str) -> Option<Bearing> {
    if let Some(v) = first_number(s) {
        if (0.0..=360.0).contains(&v) { return Some( Bearing::from_degrees(v)) }
        return None
    }
    bearing_from_compass_point(s)
}

/// motion speed in knots - first numeric token, negative speeds rejected
pub fn parse_motion_speed (s: &str) -> Option<f64> {
    first_number(s).filter( |v| *v >= 0.0)
}

/// a positive radius in nautical miles - zero and negative mean "not present"
pub fn parse_radius_nm (s: &str) -> Option<f64> {
    first_number(s).filter( |v| *v > 0.0)
}

pub fn clean_whitespace (s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
