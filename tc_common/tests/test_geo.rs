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

use tc_common::angle::{Bearing, Latitude, Longitude};
use tc_common::geo::*;
use uom::si::length::kilometer;

// run with "cargo test -p tc_common test_distance -- --nocapture"

#[test]
fn test_distance_and_bearing() {
    // Manila to Taipei, reference value from the geographiclib inverse solution
    let manila = GeoPoint::from_lon_lat_degrees( 120.98, 14.60);
    let taipei = GeoPoint::from_lon_lat_degrees( 121.56, 25.03);

    let d = distance( &manila, &taipei).get::<kilometer>();
    println!("Manila-Taipei distance: {d} km");
    assert!( (d - 1156.0).abs() < 10.0);

    let b = bearing( &manila, &taipei).degrees();
    assert!( b > 0.0 && b < 10.0); // nearly due north
}

#[test]
fn test_destination_roundtrip() {
    let p = GeoPoint::from_lon_lat_degrees( -126.75, 14.25);
    let q = destination( &p, Bearing::from_degrees( 47.0), km( 250.0));
    let back = distance_km( &p, &q);
    assert!( (back - 250.0).abs() < 0.1);

    let b = bearing( &p, &q).degrees();
    assert!( (b - 47.0).abs() < 0.5);
}

#[test]
fn test_interpolate_midpoint() {
    let p1 = GeoPoint::from_lon_lat_degrees( 130.0, 10.0);
    let p2 = GeoPoint::from_lon_lat_degrees( 132.0, 12.0);
    let mid = interpolate( &p1, &p2, 0.5);

    let d1 = distance_km( &p1, &mid);
    let d2 = distance_km( &mid, &p2);
    assert!( (d1 - d2).abs() < 0.05);
}

#[test]
fn test_spherical_mean_antimeridian() {
    let points = vec![
        GeoPoint::from_lon_lat_degrees( 179.5, 10.0),
        GeoPoint::from_lon_lat_degrees( -179.5, 10.0),
    ];
    let m = spherical_mean( &points).unwrap();
    println!("antimeridian mean: {m}");

    // the mean sits on the 180 meridian, not at lon 0
    assert!( m.lon_degrees().abs() > 179.9);
    assert!( (m.lat_degrees() - 10.0).abs() < 0.01);
}

#[test]
fn test_spherical_mean_single() {
    let p = GeoPoint::from_lon_lat_degrees( -127.8, 15.1);
    let m = spherical_mean( &[p]).unwrap();
    assert!( (m.lon_degrees() - p.lon_degrees()).abs() < 1e-9);
    assert!( (m.lat_degrees() - p.lat_degrees()).abs() < 1e-9);
}

#[test]
fn test_local_projection_roundtrip() {
    let tm = LocalTransverseMercator::for_centroid_lon( Longitude::from_degrees( 125.0));

    let p = GeoPoint::from_lon_lat_degrees( 126.3, 13.7);
    let c = tm.project( &p);
    let q = tm.unproject( &c);

    assert!( (p.lon_degrees() - q.lon_degrees()).abs() < 1e-9);
    assert!( (p.lat_degrees() - q.lat_degrees()).abs() < 1e-9);
}

#[test]
fn test_local_projection_metric() {
    // 1 degree of latitude on the central meridian is ~111.2 km in projected y
    let tm = LocalTransverseMercator::for_centroid_lon( Longitude::from_degrees( 125.0));
    let p1 = tm.project( &GeoPoint::from_lon_lat_degrees( 125.0, 14.0));
    let p2 = tm.project( &GeoPoint::from_lon_lat_degrees( 125.0, 15.0));

    let dy = (p2.y - p1.y).abs();
    assert!( (dy - 111_195.0).abs() < 100.0);
}

#[test]
fn test_geodesic_disc() {
    use geo::algorithm::CoordsIter;

    let center = GeoPoint::from_lon_lat_degrees( 128.0, 18.0);
    let disc = geodesic_disc( &center, km( 100.0), 32);

    for c in disc.exterior().coords_iter() {
        let p = GeoPoint::from_lon_lat_degrees( c.x, c.y);
        let d = distance_km( &center, &p);
        assert!( (d - 100.0).abs() < 0.5);
    }
}
