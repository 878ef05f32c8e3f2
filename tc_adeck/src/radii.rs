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

//! wind radii inference for forecast points that carry none. Uses a per-basin
//! empirical power law `R = a * vmax^b + c` per threshold, with a forward-speed
//! quadrant asymmetry (right-front enhanced, left-rear reduced, motion assumed
//! along the track axis). The coefficients are hand-tuned starting values, not
//! a calibration - they are carried as data and echoed into the zone
//! parameters so downstream tuning does not require a code change. Inferred
//! sets are flagged so consumers can distinguish them from measured radii.

use serde::{Deserialize, Serialize};

use tc_store::{Basin, QuadrantRadii, Quadrant, RadiiSet};

/// `R = a * vmax^b + c`, nautical miles
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct PowerLaw {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PowerLaw {
    pub fn radius_nm (&self, vmax_kt: f64) -> f64 {
        (self.a * vmax_kt.powf( self.b) + self.c).max( 0.0)
    }
}

/// per-basin coefficient triple for the 34/50/64 kt thresholds
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct BasinCoefficients {
    pub r34: PowerLaw,
    pub r50: PowerLaw,
    pub r64: PowerLaw,
}

/// the inference configuration: coefficients plus asymmetry shape
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct RadiiInference {
    pub wp: BasinCoefficients,
    pub ep: BasinCoefficients,
    pub al: BasinCoefficients,
    pub sh: BasinCoefficients,
    pub io: BasinCoefficients,

    /// forward speed normalization (kt) and cap of the asymmetry factor
    pub speed_norm_kt: f64,
    pub speed_factor_cap: f64,
}

impl Default for RadiiInference {
    fn default() -> Self {
        RadiiInference {
            wp: BasinCoefficients {
                r34: PowerLaw { a: 0.45, b: 1.2, c: 20.0 },
                r50: PowerLaw { a: 0.30, b: 1.3, c: 10.0 },
                r64: PowerLaw { a: 0.20, b: 1.4, c: 5.0 },
            },
            ep: BasinCoefficients {
                r34: PowerLaw { a: 0.40, b: 1.25, c: 25.0 },
                r50: PowerLaw { a: 0.28, b: 1.35, c: 12.0 },
                r64: PowerLaw { a: 0.18, b: 1.45, c: 6.0 },
            },
            al: BasinCoefficients {
                r34: PowerLaw { a: 0.38, b: 1.28, c: 28.0 },
                r50: PowerLaw { a: 0.26, b: 1.38, c: 14.0 },
                r64: PowerLaw { a: 0.17, b: 1.48, c: 7.0 },
            },
            sh: BasinCoefficients {
                r34: PowerLaw { a: 0.42, b: 1.22, c: 22.0 },
                r50: PowerLaw { a: 0.29, b: 1.32, c: 11.0 },
                r64: PowerLaw { a: 0.19, b: 1.42, c: 5.0 },
            },
            io: BasinCoefficients {
                r34: PowerLaw { a: 0.43, b: 1.23, c: 23.0 },
                r50: PowerLaw { a: 0.29, b: 1.33, c: 11.0 },
                r64: PowerLaw { a: 0.19, b: 1.43, c: 5.0 },
            },
            speed_norm_kt: 20.0,
            speed_factor_cap: 1.5,
        }
    }
}

impl RadiiInference {
    pub fn for_basin (&self, basin: Basin) -> &BasinCoefficients {
        match basin {
            Basin::WP => &self.wp,
            Basin::EP => &self.ep,
            Basin::AL => &self.al,
            Basin::CP => &self.wp, // central Pacific shares the WP curves
            Basin::SH => &self.sh,
            Basin::IO => &self.io,
        }
    }

    /// derive a quadrant radii set from intensity. Returns None below gale
    /// strength. Thresholds above the intensity stay empty, and the power law
    /// output is re-nested after the asymmetry multipliers so the invariant
    /// r64 <= r50 <= r34 holds for every quadrant.
    pub fn infer (&self, vmax_kt: f64, basin: Basin, forward_speed_kt: Option<f64>) -> Option<RadiiSet> {
        if vmax_kt < 34.0 { return None }

        let coeffs = self.for_basin( basin);
        let base = QuadrantRadii {
            r34_nm: Some( coeffs.r34.radius_nm( vmax_kt)),
            r50_nm: (vmax_kt >= 50.0).then( || coeffs.r50.radius_nm( vmax_kt)),
            r64_nm: (vmax_kt >= 64.0).then( || coeffs.r64.radius_nm( vmax_kt)),
        };

        let factor = forward_speed_kt
            .filter( |s| *s > 0.0)
            .map( |s| (s / self.speed_norm_kt).min( self.speed_factor_cap))
            .unwrap_or( 0.0);

        let mut set = RadiiSet::default();
        set.inferred = true;
        for (q, mult) in quadrant_multipliers( factor) {
            *set.quadrant_mut( q) = nested( scale( &base, mult));
        }
        Some( set)
    }
}

/// motion-axis asymmetry: right-front enhanced, left-rear reduced
fn quadrant_multipliers (speed_factor: f64) -> [(Quadrant, f64); 4] {
    [
        (Quadrant::NE, 1.0 + 0.3 * speed_factor),
        (Quadrant::NW, 1.0 + 0.1 * speed_factor),
        (Quadrant::SE, 1.0 - 0.1 * speed_factor),
        (Quadrant::SW, 1.0 - 0.2 * speed_factor),
    ]
}

fn scale (base: &QuadrantRadii, mult: f64) -> QuadrantRadii {
    QuadrantRadii {
        r34_nm: base.r34_nm.map( |r| r * mult),
        r50_nm: base.r50_nm.map( |r| r * mult),
        r64_nm: base.r64_nm.map( |r| r * mult),
    }
}

/// clamp thresholds into nesting order (the hand-tuned curves can cross at
/// high intensities)
fn nested (q: QuadrantRadii) -> QuadrantRadii {
    let r34 = q.r34_nm;
    let r50 = match (q.r50_nm, r34) {
        (Some(r50), Some(r34)) => Some( r50.min( r34)),
        (r50, _) => r50,
    };
    let r64 = match (q.r64_nm, r50) {
        (Some(r64), Some(r50)) => Some( r64.min( r50)),
        (r64, _) => r64,
    };
    QuadrantRadii { r34_nm: r34, r50_nm: r50, r64_nm: r64 }
}
