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

//! static coastline input of the zone builder. Segments come from a GeoJSON
//! file of LineString/MultiLineString features (an optional `basin` property
//! scopes a feature to one basin); without a file a small built-in set of
//! simplified coastlines keeps the builder functional.

use std::fs;
use std::path::Path;

use geo::{Coord, LineString, MultiLineString};
use geojson::{FeatureCollection, GeoJson};
use tracing::{info, warn};

use tc_common::geo::GeoPoint;
use tc_store::Basin;

use crate::errors::{coast_file_error, Result};

/// one coastal polyline plus degree-space bounds for cheap culling
#[derive(Debug,Clone)]
pub struct CoastSegment {
    pub name: String,
    pub points: Vec<GeoPoint>,
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl CoastSegment {
    pub fn new (name: impl ToString, points: Vec<GeoPoint>) -> Self {
        let (mut min_lon, mut min_lat) = (f64::MAX, f64::MAX);
        let (mut max_lon, mut max_lat) = (f64::MIN, f64::MIN);
        for p in &points {
            min_lon = min_lon.min( p.lon_degrees());
            min_lat = min_lat.min( p.lat_degrees());
            max_lon = max_lon.max( p.lon_degrees());
            max_lat = max_lat.max( p.lat_degrees());
        }
        CoastSegment { name: name.to_string(), points, min_lon, min_lat, max_lon, max_lat }
    }

    pub fn from_coords (name: impl ToString, coords: &[(f64, f64)]) -> Self {
        Self::new( name, coords.iter().map( |(lon,lat)| GeoPoint::from_lon_lat_degrees( *lon, *lat)).collect())
    }

    /// degree-space bbox check with a margin in degrees
    pub fn bbox_within (&self, lon: f64, lat: f64, margin_deg: f64) -> bool {
        lon >= self.min_lon - margin_deg && lon <= self.max_lon + margin_deg
            && lat >= self.min_lat - margin_deg && lat <= self.max_lat + margin_deg
    }
}

/// loaded coastline set, scoped per basin
#[derive(Debug,Clone,Default)]
pub struct CoastSource {
    segments: Vec<(Option<Basin>, CoastSegment)>,
}

impl CoastSource {
    /// load a GeoJSON coastline file. Features without a `basin` property apply
    /// to every basin.
    pub fn from_geojson_file (path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string( path.as_ref())?;
        let geojson: GeoJson = text.parse().map_err( |e| coast_file_error( format!("{e}")))?;

        let GeoJson::FeatureCollection( fc) = geojson else {
            return Err( coast_file_error( "coast file is not a FeatureCollection"))
        };

        let mut segments = Vec::new();
        for (i, feature) in fc.features.iter().enumerate() {
            let basin = feature.property( "basin")
                .and_then( |v| v.as_str())
                .and_then( Basin::normalize);
            let name = feature.property( "name")
                .and_then( |v| v.as_str())
                .map( |s| s.to_string())
                .unwrap_or_else( || format!("segment-{i}"));

            let Some(geometry) = &feature.geometry else { continue };
            match &geometry.value {
                geojson::Value::LineString(coords) => {
                    segments.push( (basin, segment_from_positions( &name, coords)));
                }
                geojson::Value::MultiLineString(lines) => {
                    for (j, coords) in lines.iter().enumerate() {
                        segments.push( (basin, segment_from_positions( &format!("{name}/{j}"), coords)));
                    }
                }
                _ => {
                    warn!("coast feature {} has unsupported geometry (want LineString)", name);
                }
            }
        }

        info!("loaded {} coast segments from file", segments.len());
        Ok( CoastSource { segments })
    }

    /// the built-in simplified coastlines (coarse but serviceable until a real
    /// coastline file is configured)
    pub fn builtin () -> Self {
        let mut segments = Vec::new();

        let mut add = |basin: Basin, name: &str, coords: &[(f64, f64)]| {
            segments.push( (Some(basin), CoastSegment::from_coords( name, coords)));
        };

        add( Basin::WP, "philippines-east", &[(120.0, 10.0), (125.0, 18.0), (122.0, 20.0), (120.0, 18.0)]);
        add( Basin::WP, "japan-south", &[(130.0, 30.0), (140.0, 35.0), (142.0, 40.0), (140.0, 42.0)]);
        add( Basin::WP, "china-southeast", &[(110.0, 20.0), (120.0, 25.0), (122.0, 30.0)]);
        add( Basin::EP, "mexico-west", &[(-115.0, 20.0), (-110.0, 25.0), (-105.0, 30.0)]);
        add( Basin::AL, "us-east", &[(-80.0, 25.0), (-75.0, 35.0), (-70.0, 40.0)]);
        add( Basin::AL, "caribbean-north", &[(-85.0, 15.0), (-70.0, 20.0), (-60.0, 18.0)]);
        add( Basin::SH, "australia-northwest", &[(113.0, -25.0), (117.0, -21.0), (123.0, -17.0), (129.0, -15.0)]);
        add( Basin::IO, "india-east", &[(80.0, 13.0), (84.0, 18.0), (87.0, 21.0)]);

        CoastSource { segments }
    }

    pub fn segments_for_basin (&self, basin: Basin) -> Vec<&CoastSegment> {
        self.segments.iter()
            .filter( |(b, _)| b.is_none() || *b == Some(basin))
            .map( |(_, s)| s)
            .collect()
    }

    pub fn len (&self) -> usize { self.segments.len() }
    pub fn is_empty (&self) -> bool { self.segments.is_empty() }
}

fn segment_from_positions (name: &str, coords: &[Vec<f64>]) -> CoastSegment {
    let points = coords.iter()
        .filter( |c| c.len() >= 2)
        .map( |c| GeoPoint::from_lon_lat_degrees( c[0], c[1]))
        .collect();
    CoastSegment::new( name, points)
}
