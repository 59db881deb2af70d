/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Time and frame services: sidereal time, obliquity, precession to the
//! equator/ecliptic of date, and the topocentric observer position.
//!
//! Sidereal time uses the IAU-82 GMST polynomial plus a two-term equation of
//! the equinoxes; precession is the IAU-76 zeta/z/theta model. Both are
//! documented approximations, accurate to well under an arcsecond over the
//! DE440s span, which is far below natal-chart orb tolerances.

use hifitime::Epoch;
use log::warn;

use crate::constants::{wgs84, DAYS_PER_CENTURY, J2000_JDE, J2000_MEAN_OBLIQUITY_DEG};
use crate::math::angles::between_0_360;
use crate::math::{Matrix3, Vector3};
use crate::natal::Location;

use serde_derive::{Deserialize, Serialize};

const ARCSEC_PER_DEG: f64 = 3_600.0;

/// Ecliptic-of-date spherical coordinates, degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EclipticCoords {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

/// Equatorial-of-date spherical coordinates, degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoords {
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
}

/// Terrestrial Time seconds of this UTC instant; hifitime carries the
/// leap-second table, so the conversion never goes stale here.
pub fn utc_to_tt_seconds(epoch: Epoch) -> f64 {
    epoch.to_tt_seconds()
}

/// Julian centuries of Terrestrial Time since J2000.0.
pub fn tt_centuries(epoch: Epoch) -> f64 {
    (epoch.to_jde_tt_days() - J2000_JDE) / DAYS_PER_CENTURY
}

/// Greenwich Mean Sidereal Time in hours, IAU-82 polynomial on UT1 ~ UTC.
pub fn gmst_hours(epoch: Epoch) -> f64 {
    let jd_ut = epoch.to_jde_utc_days();
    let d = jd_ut - J2000_JDE;
    let t = d / DAYS_PER_CENTURY;

    let theta_deg = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;

    between_0_360(theta_deg) / 15.0
}

/// Equation of the equinoxes in degrees: nutation in longitude times cos(obliquity),
/// restricted to the two dominant nutation terms.
fn equation_of_equinoxes_deg(epoch: Epoch) -> f64 {
    let t = tt_centuries(epoch);

    let omega = (125.044_52 - 1_934.136_261 * t).to_radians();
    let l_sun = (280.466_5 + 36_000.769_8 * t).to_radians();

    let dpsi_arcsec = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin();

    dpsi_arcsec / ARCSEC_PER_DEG * mean_obliquity_deg(epoch).to_radians().cos()
}

/// Greenwich Apparent Sidereal Time in hours.
pub fn gast_hours(epoch: Epoch) -> f64 {
    (gmst_hours(epoch) + equation_of_equinoxes_deg(epoch) / 15.0).rem_euclid(24.0)
}

/// Right ascension of the meridian for an observer at this east longitude, degrees.
pub fn ramc_deg(epoch: Epoch, longitude_east_deg: f64) -> f64 {
    between_0_360(gast_hours(epoch) * 15.0 + longitude_east_deg)
}

/// Mean obliquity of the ecliptic of date in degrees (IAU-80 polynomial).
///
/// Falls back to the J2000 mean value with a warning if the epoch cannot be
/// expressed in Julian centuries, rather than failing the computation.
pub fn mean_obliquity_deg(epoch: Epoch) -> f64 {
    let t = tt_centuries(epoch);
    if !t.is_finite() {
        warn!("obliquity of date unavailable, falling back to the J2000 mean value");
        return J2000_MEAN_OBLIQUITY_DEG;
    }

    (84_381.448 - 46.815_0 * t - 0.000_59 * t * t + 0.001_813 * t * t * t) / ARCSEC_PER_DEG
}

/// Frame rotation about the X axis by `angle_rad` (coordinate transformation convention).
fn rot1(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Frame rotation about the Y axis by `angle_rad`.
fn rot2(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Frame rotation about the Z axis by `angle_rad`.
fn rot3(angle_rad: f64) -> Matrix3 {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// IAU-76 precession rotation taking J2000 (ICRS-aligned) equatorial vectors
/// to the mean equator and equinox of date.
pub fn precession_rotation(epoch: Epoch) -> Matrix3 {
    let t = tt_centuries(epoch);

    let zeta = (2_306.218_1 * t + 0.301_88 * t * t + 0.017_998 * t * t * t) / ARCSEC_PER_DEG;
    let z = (2_306.218_1 * t + 1.094_68 * t * t + 0.018_203 * t * t * t) / ARCSEC_PER_DEG;
    let theta = (2_004.310_9 * t - 0.426_65 * t * t - 0.041_833 * t * t * t) / ARCSEC_PER_DEG;

    rot3(-z.to_radians()) * rot2(theta.to_radians()) * rot3(-zeta.to_radians())
}

/// Rotates an equator-of-date vector into the ecliptic-of-date frame.
pub fn equatorial_to_ecliptic(v_eq: &Vector3, epoch: Epoch) -> Vector3 {
    rot1(mean_obliquity_deg(epoch).to_radians()) * v_eq
}

/// Precesses an ICRS/J2000 vector to the mean equator of date.
pub fn icrs_to_equatorial_of_date(v_icrs: &Vector3, epoch: Epoch) -> Vector3 {
    precession_rotation(epoch) * v_icrs
}

/// Full chain: ICRS/J2000 vector to ecliptic-of-date spherical coordinates.
pub fn icrs_to_ecliptic_of_date(v_icrs: &Vector3, epoch: Epoch) -> EclipticCoords {
    let v_eq = icrs_to_equatorial_of_date(v_icrs, epoch);
    let v_ecl = equatorial_to_ecliptic(&v_eq, epoch);
    ecliptic_coords(&v_ecl)
}

/// Spherical ecliptic coordinates of a rectangular ecliptic vector.
pub fn ecliptic_coords(v_ecl: &Vector3) -> EclipticCoords {
    EclipticCoords {
        longitude_deg: between_0_360(v_ecl.y.atan2(v_ecl.x).to_degrees()),
        latitude_deg: v_ecl.z.atan2((v_ecl.x * v_ecl.x + v_ecl.y * v_ecl.y).sqrt()).to_degrees(),
    }
}

/// Spherical equatorial coordinates of a rectangular equatorial vector.
pub fn equatorial_coords(v_eq: &Vector3) -> EquatorialCoords {
    EquatorialCoords {
        right_ascension_deg: between_0_360(v_eq.y.atan2(v_eq.x).to_degrees()),
        declination_deg: v_eq.z.atan2((v_eq.x * v_eq.x + v_eq.y * v_eq.y).sqrt()).to_degrees(),
    }
}

/// Geocentric position of a geodetic observer in the equator-of-date frame, km.
///
/// WGS-84 ellipsoid; the X axis points to the equinox of date so the observer
/// longitude enters through the local apparent sidereal time.
pub fn observer_position_km(epoch: Epoch, location: Location) -> Vector3 {
    let phi = location.latitude_deg.to_radians();
    let lst = (gast_hours(epoch) * 15.0 + location.longitude_deg).to_radians();

    let one_minus_f = 1.0 - wgs84::FLATTENING;
    let c = 1.0 / (phi.cos().powi(2) + (one_minus_f * phi.sin()).powi(2)).sqrt();
    let s = one_minus_f * one_minus_f * c;

    let a = wgs84::SEMI_MAJOR_AXIS_KM;
    Vector3::new(
        a * c * phi.cos() * lst.cos(),
        a * c * phi.cos() * lst.sin(),
        a * s * phi.sin(),
    )
}

#[cfg(test)]
mod frames_ut {
    use super::*;
    use approx::assert_relative_eq;
    use hifitime::Epoch;

    #[test]
    fn gmst_at_j2000_noon() {
        // Canonical value: 18h 41m 50.548s at 2000-01-01 12:00 UT.
        let epoch = Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0);
        assert_relative_eq!(gmst_hours(epoch), 18.697_374_558, epsilon = 1e-4);
    }

    #[test]
    fn obliquity_at_j2000() {
        let epoch = Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0);
        assert_relative_eq!(mean_obliquity_deg(epoch), 23.439_291_1, epsilon = 1e-6);
    }

    #[test]
    fn obliquity_decreases_with_time() {
        let e2000 = Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0);
        let e2050 = Epoch::from_gregorian_utc_hms(2050, 1, 1, 12, 0, 0);
        assert!(mean_obliquity_deg(e2050) < mean_obliquity_deg(e2000));
    }

    #[test]
    fn ramc_wraps_with_longitude() {
        let epoch = Epoch::from_gregorian_utc_hms(2000, 3, 20, 12, 0, 0);
        let at_greenwich = ramc_deg(epoch, 0.0);
        let east = ramc_deg(epoch, 30.0);
        assert_relative_eq!(between_0_360(at_greenwich + 30.0), east, epsilon = 1e-9);
    }

    #[test]
    fn precession_is_near_identity_at_j2000() {
        let epoch = Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0);
        let rot = precession_rotation(epoch);
        let v = Vector3::new(1.0, 0.0, 0.0);
        let rotated = rot * v;
        assert_relative_eq!(rotated.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ecliptic_pole_maps_to_90_latitude() {
        let epoch = Epoch::from_gregorian_utc_hms(2010, 6, 1, 0, 0, 0);
        let eps = mean_obliquity_deg(epoch).to_radians();
        // North celestial pole, expressed in the equatorial frame of date.
        let pole_eq = Vector3::new(0.0, 0.0, 1.0);
        let ecl = equatorial_to_ecliptic(&pole_eq, epoch);
        let coords = ecliptic_coords(&ecl);
        assert_relative_eq!(coords.latitude_deg, 90.0 - eps.to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn observer_is_on_the_ellipsoid() {
        let epoch = Epoch::from_gregorian_utc_hms(2000, 1, 1, 12, 0, 0);
        let equator = observer_position_km(
            epoch,
            Location {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
            },
        );
        assert_relative_eq!(equator.norm(), wgs84::SEMI_MAJOR_AXIS_KM, epsilon = 1e-6);

        let pole = observer_position_km(
            epoch,
            Location {
                latitude_deg: 90.0,
                longitude_deg: 0.0,
            },
        );
        let polar_radius = wgs84::SEMI_MAJOR_AXIS_KM * (1.0 - wgs84::FLATTENING);
        assert_relative_eq!(pole.norm(), polar_radius, epsilon = 1e-6);
    }
}
