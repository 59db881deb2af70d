/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The natal calculator: apparent topocentric body states for a birth instant
//! and location, plus the derived points (nodes, angles, Part of Fortune).

pub mod body;
pub mod state;

pub use body::{Body, PHYSICAL_BODIES};
pub use state::{BodyState, Element, LunarPhase, Modality, MoonPhase, ZodiacSign, ZODIAC_SIGNS};

use hifitime::{Epoch, Unit};
use indexmap::IndexMap;
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::ephemeris::Ephemeris;
use crate::errors::{ChartError, ChartResult, EphemerisSnafu};
use crate::frames;
use crate::houses::ascendant_longitude;
use crate::math::angles::between_0_360;
use crate::math::Vector3;
use snafu::ResultExt;

/// Geodetic coordinates of the observer. Altitude is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Geodetic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Longitude in degrees, east positive.
    pub longitude_deg: f64,
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> ChartResult<Self> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(ChartError::LatitudeRange {
                value: latitude_deg,
            });
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(ChartError::LongitudeRange {
                value: longitude_deg,
            });
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
        })
    }
}

/// Computed states of every charted body, in canonical body order.
pub type BodyStates = IndexMap<Body, BodyState>;

/// Topocentric apparent coordinates of one body at one instant.
struct ApparentCoords {
    longitude: f64,
    latitude: f64,
    right_ascension: f64,
    declination: f64,
}

fn apparent_coords(
    eph: &Ephemeris,
    body: Body,
    epoch: Epoch,
    location: Location,
) -> Result<ApparentCoords, crate::ephemeris::EphemerisError> {
    let (pos_km, _) = eph.geocentric_state_km(body, epoch)?;

    let eq_of_date = frames::icrs_to_equatorial_of_date(&pos_km, epoch);
    let topocentric = eq_of_date - frames::observer_position_km(epoch, location);

    let equatorial = frames::equatorial_coords(&topocentric);
    let ecliptic =
        frames::ecliptic_coords(&frames::equatorial_to_ecliptic(&topocentric, epoch));

    Ok(ApparentCoords {
        longitude: ecliptic.longitude_deg,
        latitude: ecliptic.latitude_deg,
        right_ascension: equatorial.right_ascension_deg,
        declination: equatorial.declination_deg,
    })
}

/// Apparent topocentric longitude of one body, as the return finders sample it.
pub(crate) fn apparent_longitude(
    eph: &Ephemeris,
    body: Body,
    epoch: Epoch,
    location: Location,
) -> Result<f64, crate::ephemeris::EphemerisError> {
    Ok(apparent_coords(eph, body, epoch, location)?.longitude)
}

/// Finite-difference rate across the 0/360 seam: the pair is brought into the
/// same branch before dividing by the interval.
fn wrap_aware_rate(before_deg: f64, after_deg: f64, interval_days: f64) -> f64 {
    let mut diff = after_deg - before_deg;
    if diff.abs() > 180.0 {
        if diff > 0.0 {
            diff -= 360.0;
        } else {
            diff += 360.0;
        }
    }
    diff / interval_days
}

/// Membership of `x` in the forward arc from `start` to `end` (modulo 360).
fn in_forward_arc(start: f64, end: f64, x: f64) -> bool {
    between_0_360(x - start) < between_0_360(end - start)
}

/// Computes the full body-state table for a birth instant at a location:
/// the ten physical bodies, then the lunar nodes, Ascendant, Midheaven and
/// Part of Fortune, all in canonical order.
pub fn body_states(eph: &Ephemeris, epoch: Epoch, location: Location) -> ChartResult<BodyStates> {
    let mut states = BodyStates::new();

    let before_epoch = epoch - Unit::Day * 1;
    let after_epoch = epoch + Unit::Day * 1;

    for body in PHYSICAL_BODIES {
        let now = apparent_coords(eph, body, epoch, location).context(EphemerisSnafu {
            action: "computing natal positions",
        })?;
        let before =
            apparent_coords(eph, body, before_epoch, location).context(EphemerisSnafu {
                action: "computing natal positions",
            })?;
        let after = apparent_coords(eph, body, after_epoch, location).context(EphemerisSnafu {
            action: "computing natal positions",
        })?;

        let daily_motion = wrap_aware_rate(before.longitude, after.longitude, 2.0);
        let declination_motion = (after.declination - before.declination) / 2.0;

        // The Sun is never flagged retrograde by convention.
        let retrograde = body != Body::Sun && daily_motion < 0.0;

        let (sign, degree_in_sign) = ZodiacSign::from_longitude(now.longitude);

        states.insert(
            body,
            BodyState {
                longitude: now.longitude,
                latitude: now.latitude,
                declination: now.declination,
                right_ascension: now.right_ascension,
                daily_motion,
                declination_motion,
                retrograde,
                sign,
                degree_in_sign,
                estimated: false,
                is_composite: false,
            },
        );
    }

    let ramc = frames::ramc_deg(epoch, location.longitude_deg);
    let obliquity = frames::mean_obliquity_deg(epoch);

    let (north_node, estimated) = north_node_longitude(eph, epoch);
    states.insert(
        Body::NorthNode,
        derived_state(north_node, obliquity, estimated, true),
    );
    states.insert(
        Body::SouthNode,
        derived_state(
            between_0_360(north_node + 180.0),
            obliquity,
            estimated,
            true,
        ),
    );

    let asc = ascendant_longitude(ramc, obliquity, location.latitude_deg);
    states.insert(Body::Ascendant, derived_state(asc, obliquity, false, false));

    // The Midheaven is the RAMC read as an ecliptic longitude.
    states.insert(
        Body::Midheaven,
        derived_state(ramc, obliquity, false, false),
    );

    let sun_lon = states[&Body::Sun].longitude;
    let moon_lon = states[&Body::Moon].longitude;
    let fortune = part_of_fortune(asc, ramc, sun_lon, moon_lon);
    states.insert(
        Body::PartOfFortune,
        derived_state(fortune, obliquity, false, false),
    );

    Ok(states)
}

/// A derived point lies on the ecliptic, so its equatorial coordinates follow
/// exactly from the longitude and the obliquity.
fn derived_state(longitude: f64, obliquity_deg: f64, estimated: bool, retrograde: bool) -> BodyState {
    let lon = between_0_360(longitude);
    let eps = obliquity_deg.to_radians();
    let lam = lon.to_radians();

    let declination = (eps.sin() * lam.sin()).asin().to_degrees();
    let right_ascension = between_0_360(lam.sin().atan2(lam.cos() / eps.cos()).to_degrees());

    let (sign, degree_in_sign) = ZodiacSign::from_longitude(lon);
    BodyState {
        longitude: lon,
        latitude: 0.0,
        declination,
        right_ascension,
        daily_motion: 0.0,
        declination_motion: 0.0,
        retrograde,
        sign,
        degree_in_sign,
        estimated,
        is_composite: false,
    }
}

/// True lunar node: the ascending intersection of the Moon's orbital plane
/// with the ecliptic of date, disambiguated toward the Sun.
///
/// Returns the longitude and whether it is an estimated placeholder (the
/// chart is never failed over a degenerate node vector).
fn north_node_longitude(eph: &Ephemeris, epoch: Epoch) -> (f64, bool) {
    let moon = eph.geocentric_state_km(Body::Moon, epoch);
    let sun = eph.geocentric_state_km(Body::Sun, epoch);

    let ((moon_pos, moon_vel), (sun_pos, _)) = match (moon, sun) {
        (Ok(m), Ok(s)) => (m, s),
        _ => {
            warn!("lunar node could not be computed, recording an estimated placeholder");
            return (0.0, true);
        }
    };

    let to_ecliptic = |v: &Vector3| {
        frames::equatorial_to_ecliptic(&frames::icrs_to_equatorial_of_date(v, epoch), epoch)
    };

    let r = to_ecliptic(&moon_pos);
    let v = to_ecliptic(&moon_vel);

    // Orbital plane normal, then its intersection with the ecliptic plane z=0.
    let normal = r.cross(&v);
    let mut line = Vector3::new(normal.y, -normal.x, 0.0);

    if line.norm() < 1e-12 {
        warn!("lunar node vector is degenerate, recording an estimated placeholder");
        return (0.0, true);
    }
    line.normalize_mut();

    // Two intersections exist; the ascending node is the one toward the Sun.
    let sun_dir = to_ecliptic(&sun_pos).normalize();
    if line.dot(&sun_dir) < 0.0 {
        line = -line;
    }

    (between_0_360(line.y.atan2(line.x).to_degrees()), false)
}

/// Part of Fortune: `ASC + Moon - Sun` for daytime births, `ASC + Sun - Moon`
/// for nighttime ones. Daytime means the Sun sits in the MC->ASC arc or in
/// the IC->DSC arc, both walked forward with wrap-around.
pub fn part_of_fortune(asc: f64, mc: f64, sun_longitude: f64, moon_longitude: f64) -> f64 {
    let ic = between_0_360(mc + 180.0);
    let dsc = between_0_360(asc + 180.0);

    let is_daytime = in_forward_arc(mc, asc, sun_longitude)
        || in_forward_arc(ic, dsc, sun_longitude);

    if is_daytime {
        between_0_360(asc + moon_longitude - sun_longitude)
    } else {
        between_0_360(asc + sun_longitude - moon_longitude)
    }
}

/// Lunar phase from a computed body table; requires the Sun and the Moon.
pub fn lunar_phase(states: &BodyStates) -> Option<LunarPhase> {
    let sun = states.get(&Body::Sun)?;
    let moon = states.get(&Body::Moon)?;
    Some(LunarPhase::from_longitudes(sun.longitude, moon.longitude))
}

#[cfg(test)]
mod natal_ut {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn location_bounds() {
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(-91.0, 0.0).is_err());
        assert!(Location::new(0.0, 181.0).is_err());
        assert!(Location::new(0.0, -181.0).is_err());
        assert!(Location::new(90.0, 180.0).is_ok());
    }

    #[test]
    fn rates_across_the_seam() {
        // Eastward motion through 0 Aries: 359 -> 1 is +2 degrees over the window.
        assert_relative_eq!(wrap_aware_rate(359.0, 1.0, 2.0), 1.0);
        // Retrograde motion through 0 Aries: 1 -> 359 is -2 degrees.
        assert_relative_eq!(wrap_aware_rate(1.0, 359.0, 2.0), -1.0);
        // No seam crossing.
        assert_relative_eq!(wrap_aware_rate(10.0, 12.0, 2.0), 1.0);
    }

    #[test]
    fn fortune_day_night_reversal() {
        // ASC 0, MC 270: the MC->ASC arc is [270, 360).
        let day = part_of_fortune(0.0, 270.0, 280.0, 100.0);
        assert_relative_eq!(day, between_0_360(0.0 + 100.0 - 280.0));

        // Sun at 200 is in neither arc ([270,360) nor [90,180)), so nighttime.
        let night = part_of_fortune(0.0, 270.0, 200.0, 100.0);
        assert_relative_eq!(night, between_0_360(0.0 + 200.0 - 100.0));
    }

    #[test]
    fn fortune_arcs_wrap() {
        // ASC 30, MC 350: MC->ASC arc crosses the seam, [350, 30).
        let day = part_of_fortune(30.0, 350.0, 10.0, 250.0);
        assert_relative_eq!(day, between_0_360(30.0 + 250.0 - 10.0));
    }

    #[test]
    fn derived_points_sit_on_the_ecliptic() {
        let state = derived_state(90.0, 23.44, false, false);
        // At 90 degrees longitude the declination peaks at the obliquity.
        assert_relative_eq!(state.declination, 23.44, epsilon = 1e-9);
        assert_relative_eq!(state.right_ascension, 90.0, epsilon = 1e-9);
        assert_eq!(state.sign, ZodiacSign::Cancer);

        let vernal = derived_state(0.0, 23.44, false, false);
        assert_relative_eq!(vernal.declination, 0.0, epsilon = 1e-12);
        assert_relative_eq!(vernal.right_ascension, 0.0, epsilon = 1e-12);
    }
}
