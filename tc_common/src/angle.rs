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

//! latitude/longitude/bearing angle support. Values are stored as normalized f64
//! degrees so that parsed upstream positions can be carried through the pipeline
//! without re-normalizing at every use site.

use std::fmt;
use serde::{Serialize,Deserialize};

#[inline]
pub fn normalize_90 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x <= -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

/// geodetic latitude in degrees, normalized to [-90, 90]
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(transparent)]
pub struct Latitude(f64);

impl Latitude {
    #[inline] pub fn from_degrees (deg: f64) -> Self { Latitude( normalize_90(deg)) }
    #[inline] pub fn degrees (&self) -> f64 { self.0 }
    #[inline] pub fn radians (&self) -> f64 { self.0.to_radians() }

    /// checked constructor for parsed input - rejects instead of wrapping
    pub fn checked_from_degrees (deg: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&deg) { Some(Latitude(deg)) } else { None }
    }
}

impl fmt::Display for Latitude {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.0) }
}

/// geodetic longitude in degrees, normalized to (-180, 180]
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(transparent)]
pub struct Longitude(f64);

impl Longitude {
    #[inline] pub fn from_degrees (deg: f64) -> Self { Longitude( normalize_180(deg)) }
    #[inline] pub fn degrees (&self) -> f64 { self.0 }
    #[inline] pub fn radians (&self) -> f64 { self.0.to_radians() }

    pub fn checked_from_degrees (deg: f64) -> Option<Self> {
        if (-180.0..=180.0).contains(&deg) { Some(Longitude( normalize_180(deg))) } else { None }
    }
}

impl fmt::Display for Longitude {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.0) }
}

/// compass bearing in degrees, normalized to [0, 360)
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(transparent)]
pub struct Bearing(f64);

impl Bearing {
    #[inline] pub fn from_degrees (deg: f64) -> Self { Bearing( normalize_360(deg)) }
    #[inline] pub fn degrees (&self) -> f64 { self.0 }
    #[inline] pub fn radians (&self) -> f64 { self.0.to_radians() }

    /// opposite direction (e.g. for left/right perpendiculars of a track)
    #[inline] pub fn reverse (&self) -> Self { Bearing::from_degrees( self.0 + 180.0) }
    #[inline] pub fn rotated (&self, deg: f64) -> Self { Bearing::from_degrees( self.0 + deg) }
}

impl fmt::Display for Bearing {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.0) }
}

/// the 16 point compass rose on 22.5deg increments (N=0, NNE=22.5, .. NNW=337.5)
pub const COMPASS_POINTS: [(&str, f64); 16] = [
    ("N", 0.0), ("NNE", 22.5), ("NE", 45.0), ("ENE", 67.5),
    ("E", 90.0), ("ESE", 112.5), ("SE", 135.0), ("SSE", 157.5),
    ("S", 180.0), ("SSW", 202.5), ("SW", 225.0), ("WSW", 247.5),
    ("W", 270.0), ("WNW", 292.5), ("NW", 315.0), ("NNW", 337.5),
];

/// map a cardinal direction token to a bearing, e.g. "WSW" -> 247.5
pub fn bearing_from_compass_point (s: &str) -> Option<Bearing> {
    let s = s.trim().to_ascii_uppercase();
    COMPASS_POINTS.iter()
        .find( |(name,_)| *name == s)
        .map( |(_,deg)| Bearing::from_degrees(*deg))
}
