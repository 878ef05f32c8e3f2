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

//! tc_zones computes coastal watch/warning polygons from the ensemble-mean
//! forecast track. The pipeline per storm cycle: time-of-first-intersection of
//! the gale wind disc with every coast segment, forward-speed correction,
//! classification into warning (<=24h) and watch (24-48h), metric buffering of
//! the classified segments, boolean union, morphological closing of small
//! gaps, Chaikin corner cutting and Douglas-Peucker simplification.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod errors;
pub use errors::*;

mod coast;
pub use coast::*;

mod tofi;
pub use tofi::*;

mod morph;
pub use morph::*;

mod builder;
pub use builder::*;

pub const METHOD_VERSION: &str = "tofi-1.0";

/// zone construction parameters. All distances are kilometers, all windows
/// hours; the defaults implement the published contract (warning <=24h with a
/// 75km coastal band, watch 24-48h with 50km).
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct ZoneBuilderConfig {
    pub warning_hours: f64,
    pub watch_hours: f64,

    pub warning_buffer_km: f64,
    pub watch_buffer_km: f64,

    /// morphological closing distance for dissolving small gaps
    pub closing_km: f64,

    pub chaikin_iterations: usize,

    /// Douglas-Peucker tolerance, degrees
    pub simplify_tolerance_deg: f64,

    /// climatological forward speed reference for the TOFI shift
    pub reference_speed_kt: f64,

    /// TOFI shift clip, hours
    pub max_tofi_shift_hours: f64,

    /// segment count of the wind disc approximation
    pub disc_segments: usize,
}

impl Default for ZoneBuilderConfig {
    fn default() -> Self {
        ZoneBuilderConfig {
            warning_hours: 24.0,
            watch_hours: 48.0,
            warning_buffer_km: 75.0,
            watch_buffer_km: 50.0,
            closing_km: 100.0,
            chaikin_iterations: 2,
            simplify_tolerance_deg: 0.01,
            reference_speed_kt: 15.0,
            max_tofi_shift_hours: 3.0,
            disc_segments: 24,
        }
    }
}
