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

//! metric polygon construction in projected space. The building blocks are
//! capsules (edge rectangles with disc caps) and discs; buffering a polyline
//! is the union of its capsules, dilation of a polygon is the union with its
//! boundary buffer, erosion the difference with it, and morphological closing
//! (dissolving gaps up to d) is dilation followed by erosion. Everything here
//! runs on euclidean meter coordinates - projection in and out of degree space
//! happens at the call sites.

use geo::{unary_union, BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use crate::errors::{geometry_error, Result, TcZonesError};

/// disc approximation around a projected point
pub fn disc (center: Coord<f64>, radius_m: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(8);
    let mut coords = Vec::with_capacity( n + 1);
    for i in 0..n {
        let phi = (i as f64) * std::f64::consts::TAU / (n as f64);
        coords.push( Coord { x: center.x + radius_m * phi.cos(), y: center.y + radius_m * phi.sin() });
    }
    coords.push( coords[0]);
    Polygon::new( LineString::from( coords), vec![])
}

/// oriented rectangle spanning one edge at +-radius
fn edge_band (a: Coord<f64>, b: Coord<f64>, radius_m: f64) -> Option<Polygon<f64>> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx*dx + dy*dy).sqrt();
    if len == 0.0 { return None }

    let nx = -dy / len * radius_m;
    let ny = dx / len * radius_m;

    Some( Polygon::new( LineString::from( vec![
        Coord { x: a.x + nx, y: a.y + ny },
        Coord { x: b.x + nx, y: b.y + ny },
        Coord { x: b.x - nx, y: b.y - ny },
        Coord { x: a.x - nx, y: a.y - ny },
        Coord { x: a.x + nx, y: a.y + ny },
    ]), vec![]))
}

/// capsule pieces of a polyline: one band per edge, one disc per vertex
fn polyline_pieces (coords: &[Coord<f64>], radius_m: f64, segments: usize, out: &mut Vec<Polygon<f64>>) {
    for w in coords.windows(2) {
        if let Some(band) = edge_band( w[0], w[1], radius_m) {
            out.push( band);
        }
    }
    for c in coords {
        out.push( disc( *c, radius_m, segments));
    }
}

/// metric buffer of a projected polyline
pub fn buffer_polyline (coords: &[Coord<f64>], radius_m: f64, segments: usize) -> MultiPolygon<f64> {
    let mut pieces = Vec::new();
    polyline_pieces( coords, radius_m, segments, &mut pieces);
    unary_union( pieces.iter())
}

/// metric buffer of all rings of a multipolygon (the boundary band)
fn boundary_buffer (mp: &MultiPolygon<f64>, radius_m: f64, segments: usize) -> MultiPolygon<f64> {
    let mut pieces = Vec::new();
    for poly in &mp.0 {
        polyline_pieces( &poly.exterior().0, radius_m, segments, &mut pieces);
        for ring in poly.interiors() {
            polyline_pieces( &ring.0, radius_m, segments, &mut pieces);
        }
    }
    unary_union( pieces.iter())
}

/// Minkowski dilation by a disc of radius d
pub fn dilate (mp: &MultiPolygon<f64>, radius_m: f64, segments: usize) -> MultiPolygon<f64> {
    mp.union( &boundary_buffer( mp, radius_m, segments))
}

/// Minkowski erosion by a disc of radius d
pub fn erode (mp: &MultiPolygon<f64>, radius_m: f64, segments: usize) -> MultiPolygon<f64> {
    mp.difference( &boundary_buffer( mp, radius_m, segments))
}

/// morphological closing: gaps and inlets narrower than ~2*d dissolve
pub fn close_gaps (mp: &MultiPolygon<f64>, radius_m: f64, segments: usize) -> MultiPolygon<f64> {
    if mp.0.is_empty() { return mp.clone() }
    erode( &dilate( mp, radius_m, segments), radius_m, segments)
}
