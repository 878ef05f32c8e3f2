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

//! geodesy on the WGS84 ellipsoid surface. Following our design principles we
//! use existing crates where we can, which in this domain is mostly
//! [geo](https://docs.rs/geo/latest/geo/index.html) - it carries a port of the
//! geographiclib direct/inverse geodesic solutions. What we add here is the
//! value semantics (degree-normalized positions, unit-of-measure lengths via
//! [uom](https://docs.rs/uom/latest/uom/)), the spherical mean used by the
//! ensemble reduction, and a local transverse-Mercator projection for metric
//! polygon work. The distance primitives are allocation free - they sit inside
//! the coast-segment intersection loops of the zone builder.

use std::fmt;
use serde::{Serialize,Deserialize};

use geo::{Coord, LineString, Point, Polygon};
use geo::algorithm::line_measures::{Bearing as BearingMeasure, Destination, Distance, InterpolatePoint};
use geo::algorithm::line_measures::metric_spaces::Geodesic;

use uom::si::f64::Length;
use uom::si::length::{kilometer, meter, nautical_mile};

use crate::angle::{normalize_180, normalize_360, Bearing, Latitude, Longitude};

/// mean earth radius [m] - used by the spherical helpers (projection, mean);
/// precise distances go through the ellipsoidal geodesic below
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

#[inline] pub fn km (v: f64) -> Length { Length::new::<kilometer>(v) }
#[inline] pub fn nm (v: f64) -> Length { Length::new::<nautical_mile>(v) }
#[inline] pub fn meters (v: f64) -> Length { Length::new::<meter>(v) }

/* #region GeoPoint *********************************************************************/

#[derive(Serialize,Deserialize)]
struct LonLat { lon: f64, lat: f64 }

/// a wrapper for geo::Point that guarantees normalized geodetic degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(from = "LonLat", into = "LonLat")]
pub struct GeoPoint(Point);

impl GeoPoint {
    pub fn from_lon_lat (lon: Longitude, lat: Latitude) -> Self {
        GeoPoint( Point::new( lon.degrees(), lat.degrees()))
    }

    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( normalize_180(lon), lat.clamp(-90.0, 90.0)))
    }

    pub fn longitude (&self) -> Longitude { Longitude::from_degrees( self.0.x()) }
    pub fn latitude (&self) -> Latitude { Latitude::from_degrees( self.0.y()) }

    #[inline] pub fn lon_degrees (&self) -> f64 { self.0.x() }
    #[inline] pub fn lat_degrees (&self) -> f64 { self.0.y() }

    pub fn point (&self) -> &Point { &self.0 }
    pub fn into_point (self) -> Point { self.0 }
}

impl From<LonLat> for GeoPoint {
    fn from (v: LonLat) -> Self { GeoPoint::from_lon_lat_degrees( v.lon, v.lat) }
}
impl From<GeoPoint> for LonLat {
    fn from (p: GeoPoint) -> Self { LonLat { lon: p.lon_degrees(), lat: p.lat_degrees() } }
}
impl From<Point> for GeoPoint {
    fn from (p: Point) -> Self { GeoPoint::from_lon_lat_degrees( p.x(), p.y()) }
}

impl fmt::Display for GeoPoint {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.0.x(), self.0.y())
    }
}

/* #endregion GeoPoint */

/* #region geodesic primitives **********************************************************/

/// ellipsoidal (inverse geodesic) distance between two points
pub fn distance (p1: &GeoPoint, p2: &GeoPoint) -> Length {
    meters( Geodesic.distance( *p1.point(), *p2.point()))
}

/// same as [`distance`] but plain kilometers, for the hot loops
#[inline]
pub fn distance_km (p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    Geodesic.distance( *p1.point(), *p2.point()) / 1000.0
}

/// initial bearing of the geodesic from p1 to p2
pub fn bearing (p1: &GeoPoint, p2: &GeoPoint) -> Bearing {
    Bearing::from_degrees( normalize_360( Geodesic.bearing( *p1.point(), *p2.point())))
}

/// solve the direct geodesic problem: start point, initial bearing, distance
pub fn destination (p: &GeoPoint, brg: Bearing, dist: Length) -> GeoPoint {
    Geodesic.destination( *p.point(), brg.degrees(), dist.get::<meter>()).into()
}

/// point at fraction f in [0,1] along the geodesic from p1 to p2
pub fn interpolate (p1: &GeoPoint, p2: &GeoPoint, f: f64) -> GeoPoint {
    Geodesic.point_at_ratio_between( *p1.point(), *p2.point(), f.clamp(0.0, 1.0)).into()
}

/// mean position via Cartesian sum on the unit sphere. This is stable across
/// the antimeridian and near the poles, which a componentwise degree mean is not.
pub fn spherical_mean (points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() { return None }

    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for p in points {
        let phi = p.latitude().radians();
        let lam = p.longitude().radians();
        x += phi.cos() * lam.cos();
        y += phi.cos() * lam.sin();
        z += phi.sin();
    }
    let n = points.len() as f64;
    let (x, y, z) = (x/n, y/n, z/n);

    let hyp = (x*x + y*y).sqrt();
    if hyp == 0.0 && z == 0.0 { return None } // antipodal degenerate case

    let lat = z.atan2( hyp).to_degrees();
    let lon = y.atan2( x).to_degrees();
    Some( GeoPoint::from_lon_lat_degrees( lon, lat))
}

/* #endregion geodesic primitives */

/* #region local projection *************************************************************/

/// a local (spherical) transverse-Mercator projection with its central meridian
/// chosen from the area of interest. Distortion stays negligible for the few
/// hundred km of a watch/warning zone, which lets the polygon algebra run in
/// plain euclidean meters.
#[derive(Debug,Clone,Copy)]
pub struct LocalTransverseMercator {
    lon0: f64, // central meridian [rad]
}

impl LocalTransverseMercator {
    pub fn for_centroid_lon (lon: Longitude) -> Self {
        LocalTransverseMercator { lon0: lon.radians() }
    }

    pub fn from_points<'a> (points: impl Iterator<Item=&'a GeoPoint>) -> Option<Self> {
        spherical_mean( &points.cloned().collect::<Vec<_>>())
            .map( |c| Self::for_centroid_lon( c.longitude()))
    }

    /// forward projection to (x,y) meters
    #[inline]
    pub fn project (&self, p: &GeoPoint) -> Coord<f64> {
        let phi = p.latitude().radians();
        let lam = p.longitude().radians() - self.lon0;

        let b = phi.cos() * lam.sin();
        // clamp to keep atanh finite if a caller hands us a point 90deg off meridian
        let b = b.clamp( -0.999_999_999, 0.999_999_999);

        Coord {
            x: MEAN_EARTH_RADIUS_M * b.atanh(),
            y: MEAN_EARTH_RADIUS_M * phi.tan().atan2( lam.cos()),
        }
    }

    /// inverse projection back to geodetic degrees
    #[inline]
    pub fn unproject (&self, c: &Coord<f64>) -> GeoPoint {
        let xr = c.x / MEAN_EARTH_RADIUS_M;
        let yr = c.y / MEAN_EARTH_RADIUS_M;

        let lat = (yr.sin() / xr.cosh()).asin().to_degrees();
        let lon = (self.lon0 + xr.sinh().atan2( yr.cos())).to_degrees();
        GeoPoint::from_lon_lat_degrees( lon, lat)
    }

    pub fn project_ring (&self, points: &[GeoPoint]) -> LineString<f64> {
        LineString::from( points.iter().map( |p| self.project(p)).collect::<Vec<_>>())
    }

    pub fn unproject_polygon (&self, poly: &Polygon<f64>) -> Polygon<f64> {
        let ext = LineString::from(
            poly.exterior().coords().map( |c| { let p = self.unproject(c); Coord{ x: p.lon_degrees(), y: p.lat_degrees() } }).collect::<Vec<_>>());
        let ints = poly.interiors().iter().map( |r| LineString::from(
            r.coords().map( |c| { let p = self.unproject(c); Coord{ x: p.lon_degrees(), y: p.lat_degrees() } }).collect::<Vec<_>>())).collect();
        Polygon::new( ext, ints)
    }
}

/* #endregion local projection */

/// circle approximation around a center, built from direct geodesic solutions
/// so it stays metric at any latitude
pub fn geodesic_disc (center: &GeoPoint, radius: Length, segments: usize) -> Polygon<f64> {
    let n = segments.max(8);
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(n + 1);

    for i in 0..n {
        let brg = Bearing::from_degrees( (i as f64) * 360.0 / (n as f64));
        let p = destination( center, brg, radius);
        coords.push( Coord { x: p.lon_degrees(), y: p.lat_degrees() });
    }
    coords.push( coords[0]);

    Polygon::new( LineString::from( coords), vec![])
}
