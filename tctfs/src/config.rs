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

//! application configuration: a RON file with serde defaults, overridable by
//! the recognized environment variables. The composition root constructs all
//! collaborators from one of these values - nothing reads configuration from
//! globals.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tc_adeck::{AdeckConfig, RadiiInference};
use tc_cimss::CimssConfig;
use tc_common::datetime::{minutes, secs};
use tc_common::net::FetcherConfig;
use tc_lifecycle::LifecycleConfig;
use tc_zones::ZoneBuilderConfig;

/// periodic job cadences, seconds
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct JobPeriods {
    pub discover_secs: u64,
    pub ingest_observations_secs: u64,
    pub ingest_radii_secs: u64,
    pub update_forecast_secs: u64,
    pub regenerate_zones_secs: u64,
    pub check_dormant_secs: u64,
    pub check_archive_secs: u64,
    pub health_secs: u64,
}

impl Default for JobPeriods {
    fn default() -> Self {
        JobPeriods {
            discover_secs: 600,
            ingest_observations_secs: 900,
            ingest_radii_secs: 900,
            update_forecast_secs: 900,
            regenerate_zones_secs: 1800,
            check_dormant_secs: 3600,
            check_archive_secs: 6 * 3600,
            health_secs: 300,
        }
    }
}

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct TctfsConfig {
    pub database_url: String,

    /// worker routines of the job runtime (0 = max(2, cpu count))
    pub worker_count: usize,

    /// concurrent requests per upstream origin
    pub rate_limit_per_origin: usize,

    /// one of debug|info|warn|error
    pub log_level: String,

    /// optional GeoJSON coastline file; the built-in simplified coastlines
    /// apply when absent
    pub coast_file: Option<PathBuf>,

    pub periods: JobPeriods,
    pub cimss: CimssConfig,
    pub adeck: AdeckConfig,
    pub lifecycle: LifecycleConfig,
    pub zones: ZoneBuilderConfig,
    pub radii_inference: RadiiInference,
}

impl Default for TctfsConfig {
    fn default() -> Self {
        TctfsConfig {
            database_url: "sqlite:tctfs.db".to_string(),
            worker_count: 0,
            rate_limit_per_origin: 1,
            log_level: "info".to_string(),
            coast_file: None,
            periods: JobPeriods::default(),
            cimss: CimssConfig::default(),
            adeck: AdeckConfig::default(),
            lifecycle: LifecycleConfig::default(),
            zones: ZoneBuilderConfig::default(),
            radii_inference: RadiiInference::default(),
        }
    }
}

impl TctfsConfig {
    /// RON file (optional) plus environment overrides
    pub fn load (path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => ron::from_str( &std::fs::read_to_string( p)?)?,
            None => TctfsConfig::default(),
        };
        config.apply_env();
        Ok( config)
    }

    /// the recognized environment variables
    pub fn apply_env (&mut self) {
        if let Ok(v) = std::env::var( "UPSTREAM_BASE_DISCOVERY") { self.cimss.base_url = with_trailing_slash( v) }
        if let Ok(v) = std::env::var( "UPSTREAM_BASE_ADECK") { self.adeck.base_url = with_trailing_slash( v) }
        if let Ok(v) = std::env::var( "DATABASE_URL") { self.database_url = v }
        if let Ok(v) = std::env::var( "WORKER_COUNT") {
            if let Ok(n) = v.parse() { self.worker_count = n }
        }
        if let Ok(v) = std::env::var( "RATE_LIMIT_PER_ORIGIN") {
            if let Ok(n) = v.parse() { self.rate_limit_per_origin = n }
        }
        if let Ok(v) = std::env::var( "DORMANT_HOURS") {
            if let Ok(n) = v.parse() { self.lifecycle.dormant_hours = n }
        }
        if let Ok(v) = std::env::var( "ARCHIVE_HOURS") {
            if let Ok(n) = v.parse() { self.lifecycle.archive_hours = n }
        }
        if let Ok(v) = std::env::var( "LOG_LEVEL") { self.log_level = v }
    }

    pub fn fetcher_config (&self) -> FetcherConfig {
        FetcherConfig {
            max_per_origin: self.rate_limit_per_origin.max(1),
            ..FetcherConfig::default()
        }
    }

    pub fn effective_worker_count (&self) -> usize {
        if self.worker_count == 0 { tc_job::default_worker_count() } else { self.worker_count }
    }
}

fn with_trailing_slash (mut s: String) -> String {
    if !s.ends_with('/') { s.push('/') }
    s
}
