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

//! tc_cimss covers the CIMSS ADT upstream: discovery of active storms from the
//! index page, the tolerant basin-polymorphic history file parsers (including
//! the free-format ADT `*-list.txt` extractor), and the `*.2dwind.txt` quadrant
//! wind radii files. Everything in this crate is a pure text-to-records
//! function - fetching and persistence are wired up by the application crate.

use serde::{Deserialize, Serialize};

mod errors;
pub use errors::*;

mod discovery;
pub use discovery::*;

mod history;
pub use history::*;

mod wind_radii;
pub use wind_radii::*;

/// upstream endpoint configuration for the CIMSS ADT site
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct CimssConfig {
    /// base URL of the ADT real-time site (with trailing slash)
    pub base_url: String,
}

impl Default for CimssConfig {
    fn default() -> Self {
        CimssConfig {
            base_url: "https://tropic.ssec.wisc.edu/real-time/adt/".to_string(),
        }
    }
}

impl CimssConfig {
    pub fn index_url (&self) -> String {
        format!("{}adt.html", self.base_url)
    }

    pub fn detail_url (&self, storm_code: &str) -> String {
        format!("{}odt{}.html", self.base_url, storm_code)
    }

    pub fn history_url (&self, storm_code: &str) -> String {
        format!("{}{}-list.txt", self.base_url, storm_code)
    }

    pub fn wind_radii_url (&self, storm_code: &str) -> String {
        format!("{}{}.2dwind.txt", self.base_url, storm_code)
    }

    /// resolve a page-relative href against the site base
    pub fn resolve (&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.base_url, href.trim_start_matches('/'))
        }
    }
}
