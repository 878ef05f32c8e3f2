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

//! the zone build pipeline for one storm cycle: TOFI per coast segment,
//! forward-speed correction, warning/watch classification, metric buffering
//! and union, gap closing, smoothing, simplification, validity windows.

use chrono::{DateTime, Duration, Utc};
use geo::{ChaikinSmoothing, Coord, MultiPolygon, Polygon, Simplify};
use serde_json::json;
use tracing::{debug, info};

use tc_adeck::RadiiInference;
use tc_common::geo::{GeoPoint, LocalTransverseMercator};
use tc_store::{Basin, ForecastPoint, ZoneRecord, ZoneType};

use crate::coast::CoastSegment;
use crate::errors::{geometry_error, Result};
use crate::morph::{buffer_polyline, close_gaps};
use crate::tofi::{corrected_tofi, time_of_first_intersection, TofiHit};
use crate::{ZoneBuilderConfig, METHOD_VERSION};

/// what one build cycle yields. A missing forecast produces no zones and must
/// leave previously persisted zones untouched - the caller distinguishes that
/// from a legitimate (possibly empty) new zone set.
#[derive(Debug)]
pub enum ZoneBuildOutcome {
    NoForecast,
    Zones( Vec<ZoneRecord>),
}

pub struct ZoneBuilder {
    config: ZoneBuilderConfig,
    inference: RadiiInference,
}

struct ClassifiedSegment<'a> {
    segment: &'a CoastSegment,
    tofi_utc: DateTime<Utc>,
    hours_until: f64,
}

impl ZoneBuilder {
    pub fn new (config: ZoneBuilderConfig, inference: RadiiInference) -> Self {
        ZoneBuilder { config, inference }
    }

    pub fn config (&self) -> &ZoneBuilderConfig { &self.config }

    /// run the full pipeline over the current forecast track
    pub fn build (
        &self,
        basin: Basin,
        track: &[ForecastPoint],
        segments: &[&CoastSegment],
        now: DateTime<Utc>,
    ) -> Result<ZoneBuildOutcome> {
        if track.is_empty() {
            return Ok( ZoneBuildOutcome::NoForecast)
        }

        let mut warnings: Vec<ClassifiedSegment> = Vec::new();
        let mut watches: Vec<ClassifiedSegment> = Vec::new();

        for segment in segments {
            let Some(hit) = time_of_first_intersection( segment, track, basin, &self.inference) else { continue };
            let tofi = corrected_tofi( &hit, track, &self.config);
            let hours_until = (tofi - now).num_seconds() as f64 / 3600.0;

            debug!("segment {} TOFI {} ({:.1}h)", segment.name, tofi, hours_until);

            if hours_until <= self.config.warning_hours {
                warnings.push( ClassifiedSegment { segment, tofi_utc: tofi, hours_until });
            } else if hours_until <= self.config.watch_hours {
                watches.push( ClassifiedSegment { segment, tofi_utc: tofi, hours_until });
            }
        }

        info!("classified {} warning / {} watch segments of {}", warnings.len(), watches.len(), segments.len());

        let mut zones = Vec::new();
        if let Some(zone) = self.build_class( ZoneType::Warning, &warnings, now)? {
            zones.push( zone);
        }
        if let Some(zone) = self.build_class( ZoneType::Watch, &watches, now)? {
            zones.push( zone);
        }
        Ok( ZoneBuildOutcome::Zones( zones))
    }

    fn build_class (
        &self,
        zone_type: ZoneType,
        classified: &[ClassifiedSegment],
        now: DateTime<Utc>,
    ) -> Result<Option<ZoneRecord>> {
        if classified.is_empty() { return Ok( None) }

        let (buffer_km, validity_hours) = match zone_type {
            ZoneType::Warning => (self.config.warning_buffer_km, self.config.warning_hours),
            ZoneType::Watch => (self.config.watch_buffer_km, self.config.watch_hours),
        };

        // one local projection per class, centered on the classified coastline
        let all_points = classified.iter().flat_map( |c| c.segment.points.iter());
        let tm = LocalTransverseMercator::from_points( all_points)
            .ok_or_else( || geometry_error( "classified segments carry no points"))?;

        let mut pieces: Vec<Polygon<f64>> = Vec::new();
        for c in classified {
            let coords: Vec<Coord<f64>> = c.segment.points.iter().map( |p| tm.project( p)).collect();
            pieces.extend( buffer_polyline( &coords, buffer_km * 1000.0, self.config.disc_segments).0);
        }

        let unioned = geo::unary_union( pieces.iter());
        let closed = close_gaps( &unioned, self.config.closing_km * 1000.0, self.config.disc_segments);
        if closed.0.is_empty() {
            return Err( geometry_error( format!( "{zone_type} buffer union is empty")))
        }

        // back to degree space for smoothing and simplification
        let geographic = MultiPolygon( closed.0.iter().map( |p| tm.unproject_polygon( p)).collect());
        let smoothed = geographic.chaikin_smoothing( self.config.chaikin_iterations);
        let simplified = smoothed.simplify( self.config.simplify_tolerance_deg);
        if simplified.0.is_empty() {
            return Err( geometry_error( format!( "{zone_type} geometry vanished in simplification")))
        }

        let parameters = json!({
            "buffer_km": buffer_km,
            "closing_km": self.config.closing_km,
            "warning_hours": self.config.warning_hours,
            "watch_hours": self.config.watch_hours,
            "chaikin_iterations": self.config.chaikin_iterations,
            "simplify_tolerance_deg": self.config.simplify_tolerance_deg,
            "segments": classified.iter().map( |c| c.segment.name.as_str()).collect::<Vec<_>>(),
            "earliest_tofi": classified.iter().map( |c| c.tofi_utc).min(),
            "radii_inference": &self.inference,
        });

        Ok( Some( ZoneRecord {
            zone_type,
            valid_from_utc: now,
            valid_to_utc: now + Duration::seconds( (validity_hours * 3600.0) as i64),
            geometry: simplified,
            method_version: METHOD_VERSION.to_string(),
            parameters,
        }))
    }
}
