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

//! tc_common holds the domain-agnostic building blocks of the tropical cyclone
//! pipeline crates: angle/position newtypes, UTC datetime helpers, WGS84 geodesy,
//! a validator-caching conditional HTTP fetcher and tolerant text parse primitives.

pub mod angle;
pub mod datetime;
pub mod geo;
pub mod net;
pub mod parse;

// syntactic sugar - this is just more readable
#[inline] pub fn sin(x:f64) -> f64 { x.sin() }
#[inline] pub fn cos(x:f64) -> f64 { x.cos() }
#[inline] pub fn tan(x:f64) -> f64 { x.tan() }
#[inline] pub fn asin(x:f64) -> f64 { x.asin() }
#[inline] pub fn atan2(y:f64,x:f64) -> f64 { y.atan2(x) }
#[inline] pub fn atanh(x:f64) -> f64 { x.atanh() }
#[inline] pub fn sqrt(x:f64) -> f64 { x.sqrt() }
#[inline] pub fn pow2(x:f64) -> f64 { x*x }

// a global fn that can be used with serde(skip_serializing_if="tc_common::is_none")
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }
