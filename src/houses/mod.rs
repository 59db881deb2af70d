/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! House cusp computation under Placidus, Koch and Whole-Sign, plus the
//! body-to-house assignment.
//!
//! Placidus intermediate cusps are refined by the canonical fixed-point
//! iteration on the cusp's own semi-arc. Near the polar circles the semi-arc
//! equation has no solution; the wheel then degrades to Whole-Sign cusps and
//! the result carries `polar_degeneracy`.

use core::fmt;
use std::str::FromStr;

use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::errors::ChartError;
use crate::math::angles::between_0_360;
use crate::natal::ZodiacSign;

/// Iteration ceiling for the Placidus semi-arc refinement.
const MAX_REFINE_ITERS: usize = 64;
/// Convergence tolerance on the cusp right ascension, degrees.
const REFINE_TOL_DEG: f64 = 1e-9;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Placidus,
    Koch,
    WholeSign,
}

impl FromStr for HouseSystem {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "placidus" => Ok(HouseSystem::Placidus),
            "koch" => Ok(HouseSystem::Koch),
            "whole_sign" | "whole-sign" | "wholesign" => Ok(HouseSystem::WholeSign),
            other => Err(ChartError::UnknownHouseSystem {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HouseSystem::Placidus => "placidus",
            HouseSystem::Koch => "koch",
            HouseSystem::WholeSign => "whole_sign",
        };
        write!(f, "{name}")
    }
}

/// One house cusp.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cusp {
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub degree_in_sign: f64,
}

impl Cusp {
    fn at(longitude: f64) -> Self {
        let lon = between_0_360(longitude);
        let (sign, degree_in_sign) = ZodiacSign::from_longitude(lon);
        Self {
            longitude: lon,
            sign,
            degree_in_sign,
        }
    }
}

/// The twelve cusps of a computed wheel.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseCusps {
    pub system: HouseSystem,
    /// Cusps of houses 1..=12, in house order.
    pub cusps: [Cusp; 12],
    /// Set when the requested system diverged at this latitude and the
    /// Whole-Sign cusps were substituted.
    #[serde(default)]
    pub polar_degeneracy: bool,
}

impl HouseCusps {
    /// Cusp of the 1-based house number.
    pub fn cusp(&self, house: u8) -> &Cusp {
        &self.cusps[(house - 1) as usize]
    }

    /// House containing this ecliptic longitude. Houses are closed-open: a
    /// body exactly on a cusp belongs to the house that cusp begins.
    pub fn house_of(&self, longitude: f64) -> u8 {
        let lon = between_0_360(longitude);
        for i in 0..12 {
            let start = self.cusps[i].longitude;
            let end = self.cusps[(i + 1) % 12].longitude;
            let span = between_0_360(end - start);
            if span <= 0.0 {
                continue;
            }
            if between_0_360(lon - start) < span {
                return (i + 1) as u8;
            }
        }
        // Wheels are verified well-ordered at construction; rounding at a
        // cusp boundary can only land in the last house.
        12
    }

    /// True when each forward arc is positive and the arcs close the circle.
    fn is_well_ordered(&self) -> bool {
        let mut total = 0.0;
        for i in 0..12 {
            let span =
                between_0_360(self.cusps[(i + 1) % 12].longitude - self.cusps[i].longitude);
            if span <= 0.0 {
                return false;
            }
            total += span;
        }
        (total - 360.0).abs() < 1e-6
    }
}

/// Ecliptic longitude rising on the eastern horizon.
///
/// `atan2(sin oa, cos oa cos eps - tan lat sin eps)` where `oa = RAMC + 90`
/// is the oblique ascension of the horizon; the two-argument arctangent folds
/// in the quadrant correction for a negative denominator. At the equator with
/// RAMC 0 this puts the ascendant at 90 degrees, a quarter turn ahead of the
/// culminating equinox.
pub fn ascendant_longitude(ramc_deg: f64, obliquity_deg: f64, latitude_deg: f64) -> f64 {
    let oa = (ramc_deg + 90.0).to_radians();
    let eps = obliquity_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let denom = oa.cos() * eps.cos() - lat.tan() * eps.sin();
    between_0_360(oa.sin().atan2(denom).to_degrees())
}

/// Right ascension of an ecliptic point (latitude zero).
fn ecliptic_to_ra(longitude_deg: f64, obliquity_deg: f64) -> f64 {
    let lam = longitude_deg.to_radians();
    let eps = obliquity_deg.to_radians();
    between_0_360((lam.sin() * eps.cos()).atan2(lam.cos()).to_degrees())
}

/// Ecliptic longitude of the point of the ecliptic at this right ascension.
fn ra_to_ecliptic(ra_deg: f64, obliquity_deg: f64) -> f64 {
    let ra = ra_deg.to_radians();
    let eps = obliquity_deg.to_radians();
    between_0_360(ra.sin().atan2(ra.cos() * eps.cos()).to_degrees())
}

/// Declination of the ecliptic point at this right ascension.
fn declination_at_ra(ra_deg: f64, obliquity_deg: f64) -> f64 {
    let lam = ra_to_ecliptic(ra_deg, obliquity_deg).to_radians();
    let eps = obliquity_deg.to_radians();
    (eps.sin() * lam.sin()).asin().to_degrees()
}

/// Semi-diurnal arc of a point at this declination, or None past the polar
/// circle where the point never rises or never sets.
fn semi_diurnal_arc(declination_deg: f64, latitude_deg: f64) -> Option<f64> {
    let x = latitude_deg.to_radians().tan() * declination_deg.to_radians().tan();
    if x.abs() > 1.0 || !x.is_finite() {
        return None;
    }
    Some(90.0 + x.asin().to_degrees())
}

/// Solves the Placidus time-division condition `RA = RAMC + offset + frac * DSA(RA)`
/// by fixed-point iteration from the semi-arc trisection initializer.
fn placidus_cusp(
    init_ra: f64,
    ra_mc: f64,
    frac: f64,
    offset: f64,
    obliquity_deg: f64,
    latitude_deg: f64,
) -> Option<f64> {
    let mut ra = between_0_360(init_ra);
    for _ in 0..MAX_REFINE_ITERS {
        let dec = declination_at_ra(ra, obliquity_deg);
        let dsa = semi_diurnal_arc(dec, latitude_deg)?;
        let next = between_0_360(ra_mc + offset + frac * dsa);
        if (next - ra).abs() < REFINE_TOL_DEG {
            ra = next;
            break;
        }
        ra = next;
    }
    Some(ra_to_ecliptic(ra, obliquity_deg))
}

fn build(system: HouseSystem, longitudes: [f64; 12], polar_degeneracy: bool) -> HouseCusps {
    let mut cusps = [Cusp::at(0.0); 12];
    for (i, lon) in longitudes.iter().enumerate() {
        cusps[i] = Cusp::at(*lon);
    }
    HouseCusps {
        system,
        cusps,
        polar_degeneracy,
    }
}

fn whole_sign_longitudes(asc_sign: ZodiacSign) -> [f64; 12] {
    let mut lons = [0.0; 12];
    let s = asc_sign.index() as i32;
    for (i, lon) in lons.iter_mut().enumerate() {
        let house = i as i32 + 1;
        let sign_index = ((s + house - 2).rem_euclid(12)) + 1;
        *lon = ((sign_index - 1) * 30) as f64;
    }
    lons
}

fn placidus_longitudes(ramc: f64, obliquity: f64, latitude: f64) -> Option<[f64; 12]> {
    let asc = ascendant_longitude(ramc, obliquity, latitude);
    let mc = between_0_360(ramc);

    let ra_mc = mc;
    let ra_asc = ecliptic_to_ra(asc, obliquity);

    let mut diurnal = between_0_360(ra_asc - ra_mc);
    if diurnal > 180.0 {
        diurnal = 360.0 - diurnal;
    }
    let nocturnal = 180.0 - diurnal;

    // Trisect the semi-arcs for the initial right ascensions, then refine
    // each against its own semi-arc.
    let h11 = placidus_cusp(
        ra_mc + diurnal / 3.0,
        ra_mc,
        1.0 / 3.0,
        0.0,
        obliquity,
        latitude,
    )?;
    let h12 = placidus_cusp(
        ra_mc + 2.0 * diurnal / 3.0,
        ra_mc,
        2.0 / 3.0,
        0.0,
        obliquity,
        latitude,
    )?;
    let h2 = placidus_cusp(
        ra_asc + nocturnal / 3.0,
        ra_mc,
        2.0 / 3.0,
        60.0,
        obliquity,
        latitude,
    )?;
    let h3 = placidus_cusp(
        ra_asc + 2.0 * nocturnal / 3.0,
        ra_mc,
        1.0 / 3.0,
        120.0,
        obliquity,
        latitude,
    )?;

    Some([
        asc,
        h2,
        h3,
        between_0_360(mc + 180.0),
        between_0_360(h11 + 180.0),
        between_0_360(h12 + 180.0),
        between_0_360(asc + 180.0),
        between_0_360(h2 + 180.0),
        between_0_360(h3 + 180.0),
        mc,
        h11,
        h12,
    ])
}

fn koch_longitudes(ramc: f64, obliquity: f64, latitude: f64) -> [f64; 12] {
    let asc = ascendant_longitude(ramc, obliquity, latitude);
    let mc = between_0_360(ramc);

    // Each quadrant cusp is the ascendant of a meridian advanced by a third
    // of a quadrant; the remaining cusps are antipodes of the computed four.
    let at = |offset: f64| ascendant_longitude(between_0_360(ramc + offset), obliquity, latitude);

    let h11 = at(-60.0);
    let h12 = at(-30.0);
    let h2 = at(30.0);
    let h3 = at(60.0);

    [
        asc,
        h2,
        h3,
        between_0_360(mc + 180.0),
        between_0_360(h11 + 180.0),
        between_0_360(h12 + 180.0),
        between_0_360(asc + 180.0),
        between_0_360(h2 + 180.0),
        between_0_360(h3 + 180.0),
        mc,
        h11,
        h12,
    ]
}

/// Computes the twelve cusps for the requested system.
///
/// Placidus and Koch wheels that diverge (polar latitudes) or come out
/// unordered are replaced by the Whole-Sign wheel with `polar_degeneracy`
/// set; the computation never fails.
pub fn compute(
    system: HouseSystem,
    ramc_deg: f64,
    obliquity_deg: f64,
    latitude_deg: f64,
) -> HouseCusps {
    let asc = ascendant_longitude(ramc_deg, obliquity_deg, latitude_deg);
    let (asc_sign, _) = ZodiacSign::from_longitude(asc);

    let fallback = |sys: HouseSystem| {
        warn!(
            "{sys} cusps degenerate at latitude {latitude_deg:.2}, substituting whole-sign cusps"
        );
        build(sys, whole_sign_longitudes(asc_sign), true)
    };

    match system {
        HouseSystem::WholeSign => build(system, whole_sign_longitudes(asc_sign), false),
        HouseSystem::Placidus => {
            match placidus_longitudes(ramc_deg, obliquity_deg, latitude_deg) {
                Some(lons) if lons.iter().all(|l| l.is_finite()) => {
                    let wheel = build(system, lons, false);
                    if wheel.is_well_ordered() {
                        wheel
                    } else {
                        fallback(system)
                    }
                }
                _ => fallback(system),
            }
        }
        HouseSystem::Koch => {
            let lons = koch_longitudes(ramc_deg, obliquity_deg, latitude_deg);
            if lons.iter().all(|l| l.is_finite()) {
                let wheel = build(system, lons, false);
                if wheel.is_well_ordered() {
                    wheel
                } else {
                    fallback(system)
                }
            } else {
                fallback(system)
            }
        }
    }
}

#[cfg(test)]
mod houses_ut {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const EPS: f64 = 23.4392911;

    #[test]
    fn ascendant_quadrants() {
        // At the equator with RAMC 0 the ascendant is 90 degrees ahead of the MC.
        let asc = ascendant_longitude(0.0, EPS, 0.0);
        assert_relative_eq!(asc, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn whole_sign_from_leo() {
        // ASC in Leo: houses start at 120, 150, ..., wrapping through 0.
        let wheel = build(
            HouseSystem::WholeSign,
            whole_sign_longitudes(ZodiacSign::Leo),
            false,
        );
        let expected = [
            120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0, 0.0, 30.0, 60.0, 90.0,
        ];
        for (i, want) in expected.iter().enumerate() {
            assert_relative_eq!(wheel.cusps[i].longitude, *want);
            assert_relative_eq!(wheel.cusps[i].degree_in_sign, 0.0);
        }
    }

    #[rstest]
    #[case(HouseSystem::Placidus)]
    #[case(HouseSystem::Koch)]
    #[case(HouseSystem::WholeSign)]
    fn axes_oppose(#[case] system: HouseSystem) {
        let wheel = compute(system, 330.0, EPS, 40.0);
        assert!(!wheel.polar_degeneracy);

        let c1 = wheel.cusp(1).longitude;
        let c7 = wheel.cusp(7).longitude;
        assert_relative_eq!(between_0_360(c1 + 180.0), c7, epsilon = 1e-9);

        let c4 = wheel.cusp(4).longitude;
        let c10 = wheel.cusp(10).longitude;
        assert_relative_eq!(between_0_360(c4 + 180.0), c10, epsilon = 1e-9);
    }

    #[rstest]
    #[case(HouseSystem::Placidus)]
    #[case(HouseSystem::Koch)]
    fn wheels_are_ordered(#[case] system: HouseSystem) {
        for ramc in [15.0, 100.0, 200.0, 330.0] {
            for lat in [-50.0, -33.8688, 0.0, 38.5, 51.4769] {
                let wheel = compute(system, ramc, EPS, lat);
                assert!(
                    wheel.is_well_ordered(),
                    "{system} unordered at ramc {ramc}, lat {lat}"
                );
                assert!(!wheel.polar_degeneracy);
            }
        }
    }

    #[test]
    fn placidus_matches_the_angles() {
        let ramc = 330.0;
        let lat = 40.0;
        let wheel = compute(HouseSystem::Placidus, ramc, EPS, lat);
        assert_relative_eq!(wheel.cusp(10).longitude, ramc, epsilon = 1e-9);
        assert_relative_eq!(
            wheel.cusp(1).longitude,
            ascendant_longitude(ramc, EPS, lat),
            epsilon = 1e-9
        );
    }

    #[test]
    fn polar_latitudes_fall_back_to_whole_sign() {
        let wheel = compute(HouseSystem::Placidus, 100.0, EPS, 89.0);
        assert!(wheel.polar_degeneracy);
        assert_eq!(wheel.system, HouseSystem::Placidus);
        for cusp in &wheel.cusps {
            assert_relative_eq!(cusp.degree_in_sign, 0.0);
        }
        assert!(wheel.is_well_ordered());
    }

    #[test]
    fn assignment_is_closed_open() {
        let wheel = build(
            HouseSystem::WholeSign,
            whole_sign_longitudes(ZodiacSign::Leo),
            false,
        );
        // Exactly on the cusp of house 1.
        assert_eq!(wheel.house_of(120.0), 1);
        // Just before it wraps to house 12.
        assert_eq!(wheel.house_of(119.9999), 12);
        // Inside the wrap-through-zero house.
        assert_eq!(wheel.house_of(350.0), 8);
        assert_eq!(wheel.house_of(5.0), 9);
    }

    #[test]
    fn every_longitude_is_assigned_once() {
        let wheel = compute(HouseSystem::Placidus, 200.0, EPS, -33.8688);
        for step in 0..360 {
            let lon = step as f64 + 0.25;
            let house = wheel.house_of(lon);
            assert!((1..=12).contains(&house));
        }
    }

    #[test]
    fn unknown_system_name_is_rejected() {
        assert!("placidus".parse::<HouseSystem>().is_ok());
        assert!("Koch".parse::<HouseSystem>().is_ok());
        assert!("whole_sign".parse::<HouseSystem>().is_ok());
        assert!("campanus".parse::<HouseSystem>().is_err());
    }
}
