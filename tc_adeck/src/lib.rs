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

//! tc_adeck handles the forecast side of the pipeline: parsing the
//! comma-separated fixed-field A-Deck records, filtering to the AP01..AP30
//! ensemble, reducing the ensemble to the single per-lead-time mean track that
//! is shown downstream, and inferring quadrant wind radii from intensity where
//! the forecast carries none.

use serde::{Deserialize, Serialize};

use tc_store::Basin;

mod errors;
pub use errors::*;

mod parse;
pub use parse::*;

mod mean;
pub use mean::*;

mod radii;
pub use radii::*;

/// upstream endpoint configuration for the open A-Deck repository
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct AdeckConfig {
    /// base URL of the A-Deck repository (with trailing slash)
    pub base_url: String,
}

impl Default for AdeckConfig {
    fn default() -> Self {
        AdeckConfig {
            base_url: "http://hurricanes.ral.ucar.edu/repository/data/adecks_open/".to_string(),
        }
    }
}

impl AdeckConfig {
    /// A-Deck file name: `a<basin_letter><NN><YYYY>.dat`, e.g. `aw282025.dat`
    pub fn adeck_url (&self, basin: Basin, storm_num: u32, year: i32) -> String {
        format!("{}a{}{:02}{}.dat", self.base_url, basin.adeck_letter(), storm_num, year)
    }
}

/// numeric part of an upstream storm code ("28W" -> 28)
pub fn storm_number (code: &str) -> Option<u32> {
    let digits: String = code.chars().filter( |c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
