/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Time-varying products derived from a natal chart: transits, secondary
//! progressions, and solar/lunar returns.
//!
//! The return finders bisect the signed modular longitude difference inside a
//! bracket around the expected date. A failed search never raises: the
//! bracket midpoint comes back flagged `estimated`.

use hifitime::{Epoch, Unit};
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::aspects::{
    self, Aspect, AspectKind, AspectNature, AspectOptions, EXACT_ORB_DEG,
};
use crate::chart::{Chart, ChartId};
use crate::constants::TROPICAL_YEAR_DAYS;
use crate::ephemeris::Ephemeris;
use crate::errors::ChartResult;
use crate::frames;
use crate::houses::{self, HouseCusps};
use crate::math::angles::{between_pm_180, separation};
use crate::natal::{self, Body, BodyState, BodyStates, Location};

/// Hard ceiling on the bisection loops.
const MAX_SEARCH_ITERS: usize = 64;
/// Return instants resolve to about a minute.
const SOLAR_TOL_DAYS: f64 = 1.0 / 1_440.0;

/// Transit orb schedule, tighter than natal, in detection order.
const TRANSIT_ORBS: [(AspectKind, f64); 7] = [
    (AspectKind::Conjunction, 8.0),
    (AspectKind::Opposition, 6.0),
    (AspectKind::Square, 6.0),
    (AspectKind::Trine, 6.0),
    (AspectKind::Sextile, 4.0),
    (AspectKind::Quincunx, 4.0),
    (AspectKind::SemiSextile, 2.0),
];

/// Return-to-natal orb schedule, between transit and natal tightness.
const RETURN_ORBS: [(AspectKind, f64); 5] = [
    (AspectKind::Conjunction, 7.0),
    (AspectKind::Opposition, 7.0),
    (AspectKind::Square, 5.0),
    (AspectKind::Trine, 5.0),
    (AspectKind::Sextile, 3.0),
];

/// A transiting body aspecting a natal point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitAspect {
    pub transit_body: Body,
    pub natal_body: Body,
    pub kind: AspectKind,
    /// Folded separation of the pair, degrees.
    pub angle: f64,
    pub orb: f64,
    pub nature: AspectNature,
    pub applying: bool,
    pub exact: bool,
    pub separating: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitReport {
    pub chart_id: ChartId,
    pub epoch: Epoch,
    pub positions: BodyStates,
    pub aspects: Vec<TransitAspect>,
}

/// Conjunctions take their color from the bodies involved; the other kinds
/// have a fixed nature.
fn transit_nature(kind: AspectKind, transit_body: Body, natal_body: Body) -> AspectNature {
    match kind {
        AspectKind::Trine | AspectKind::Sextile => AspectNature::Harmonious,
        AspectKind::Opposition | AspectKind::Square | AspectKind::Quincunx => {
            AspectNature::Challenging
        }
        AspectKind::Conjunction => {
            if transit_body.is_malefic() || natal_body.is_malefic() {
                AspectNature::Challenging
            } else if transit_body.is_benefic() || natal_body.is_benefic() {
                AspectNature::Harmonious
            } else {
                AspectNature::Neutral
            }
        }
        _ => AspectNature::Neutral,
    }
}

/// Transits of the current sky against the natal chart, observed from the
/// natal location. Only transit-to-natal pairs are emitted.
pub fn transits(eph: &Ephemeris, chart: &Chart, epoch: Epoch) -> ChartResult<TransitReport> {
    let positions = natal::body_states(eph, epoch, chart.location)?;

    let mut aspects = Vec::new();
    for (t_body, t_state) in &positions {
        for (n_body, n_state) in &chart.bodies {
            let delta = separation(t_state.longitude, n_state.longitude);

            for (kind, orb) in TRANSIT_ORBS {
                let deviation = (delta - kind.target_angle()).abs();
                if deviation > orb {
                    continue;
                }

                // The natal point is frozen: only the transiting motion counts.
                let frozen = BodyState {
                    daily_motion: 0.0,
                    ..*n_state
                };
                let (applying, separating) =
                    aspects::longitude_flags(t_state, &frozen, delta, kind.target_angle());

                aspects.push(TransitAspect {
                    transit_body: *t_body,
                    natal_body: *n_body,
                    kind,
                    angle: delta,
                    orb: deviation,
                    nature: transit_nature(kind, *t_body, *n_body),
                    applying,
                    exact: deviation < EXACT_ORB_DEG,
                    separating,
                });
                break;
            }
        }
    }

    // Exact hits first, then applying, then separating; tightest orb wins
    // inside each class.
    aspects.sort_by(|x, y| {
        let class = |a: &TransitAspect| {
            if a.exact {
                0
            } else if a.applying {
                1
            } else {
                2
            }
        };
        class(x).cmp(&class(y)).then(x.orb.total_cmp(&y.orb))
    });

    Ok(TransitReport {
        chart_id: chart.id,
        epoch,
        positions,
        aspects,
    })
}

/// A progressed body aspecting a natal point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressedAspect {
    pub progressed_body: Body,
    pub natal_body: Body,
    pub kind: AspectKind,
    pub exact_angle: f64,
    pub orb: f64,
    pub nature: AspectNature,
    pub strength: f64,
    pub applying: bool,
    pub exact: bool,
    pub separating: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionReport {
    pub chart_id: ChartId,
    pub target_epoch: Epoch,
    pub progressed_epoch: Epoch,
    pub years_progressed: f64,
    pub positions: BodyStates,
    pub aspects: Vec<ProgressedAspect>,
}

/// Secondary progressions: a day of ephemeris motion for each year of life.
/// Whole progression days are added to the birth instant, preserving the
/// birth clock time, and the progressed sky is read against the natal chart
/// (major aspects only, cross-set).
pub fn secondary_progressions(
    eph: &Ephemeris,
    chart: &Chart,
    target_epoch: Epoch,
) -> ChartResult<ProgressionReport> {
    let days_elapsed = (target_epoch - chart.epoch).to_unit(Unit::Day);
    let progression_days = (days_elapsed / TROPICAL_YEAR_DAYS).trunc();
    let progressed_epoch = chart.epoch + Unit::Day * progression_days;

    let positions = natal::body_states(eph, progressed_epoch, chart.location)?;

    let mut aspects = Vec::new();
    for (p_body, p_state) in &positions {
        for (n_body, n_state) in &chart.bodies {
            let delta = separation(p_state.longitude, n_state.longitude);

            for kind in AspectKind::MAJOR {
                let orb = kind.base_orb()
                    + (p_body.orb_modifier() + n_body.orb_modifier()) / 2.0;
                let deviation = (delta - kind.target_angle()).abs();
                if deviation > orb {
                    continue;
                }

                let frozen = BodyState {
                    daily_motion: 0.0,
                    ..*n_state
                };
                let (applying, separating) =
                    aspects::longitude_flags(p_state, &frozen, delta, kind.target_angle());

                let base = kind.base_strength();
                aspects.push(ProgressedAspect {
                    progressed_body: *p_body,
                    natal_body: *n_body,
                    kind,
                    exact_angle: kind.target_angle(),
                    orb: deviation,
                    nature: kind.nature(),
                    strength: (base * (1.0 - deviation / orb)).clamp(0.0, base),
                    applying,
                    exact: deviation < EXACT_ORB_DEG,
                    separating,
                });
                break;
            }
        }
    }

    aspects.sort_by(|x, y| y.strength.total_cmp(&x.strength));

    Ok(ProgressionReport {
        chart_id: chart.id,
        target_epoch,
        progressed_epoch,
        years_progressed: days_elapsed / TROPICAL_YEAR_DAYS,
        positions,
        aspects,
    })
}

/// A return-chart body aspecting a natal point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnAspect {
    pub return_body: Body,
    pub natal_body: Body,
    pub kind: AspectKind,
    pub angle: f64,
    pub orb: f64,
    pub nature: AspectNature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarReturnReport {
    pub chart_id: ChartId,
    pub year: i32,
    pub return_epoch: Epoch,
    /// Set when the finder missed and the bracket midpoint was used.
    pub estimated: bool,
    pub positions: BodyStates,
    pub houses: HouseCusps,
    pub aspects: Vec<Aspect>,
    pub return_natal_aspects: Vec<ReturnAspect>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LunarReturnReport {
    pub chart_id: ChartId,
    pub return_epoch: Epoch,
    pub estimated: bool,
    pub positions: BodyStates,
    pub houses: HouseCusps,
    pub aspects: Vec<Aspect>,
}

/// Signed modular difference between a body's longitude at `epoch` and a
/// natal longitude, in (-180, 180].
fn longitude_gap(
    eph: &Ephemeris,
    body: Body,
    epoch: Epoch,
    location: Location,
    natal_longitude: f64,
) -> ChartResult<f64> {
    let lon = natal::apparent_longitude(eph, body, epoch, location).map_err(|source| {
        crate::errors::ChartError::Ephemeris {
            action: "sampling a return search",
            source: Box::new(source),
        }
    })?;
    Ok(between_pm_180(lon - natal_longitude))
}

/// Bisects a sign-changing bracket down to the tolerance. The bracket is
/// assumed to hold exactly one zero crossing.
fn bisect_return(
    eph: &Ephemeris,
    body: Body,
    location: Location,
    natal_longitude: f64,
    mut lo: Epoch,
    mut hi: Epoch,
    mut gap_lo: f64,
) -> ChartResult<Epoch> {
    for _ in 0..MAX_SEARCH_ITERS {
        if (hi - lo).to_unit(Unit::Day) < SOLAR_TOL_DAYS {
            break;
        }
        let mid = lo + (hi - lo) * 0.5;
        let gap_mid = longitude_gap(eph, body, mid, location, natal_longitude)?;
        if gap_lo * gap_mid <= 0.0 {
            hi = mid;
        } else {
            lo = mid;
            gap_lo = gap_mid;
        }
    }
    Ok(lo + (hi - lo) * 0.5)
}

/// Finds the instant the Sun returns to its natal longitude in the requested
/// year, then reads a full natal-style chart there (natal location).
pub fn solar_return(eph: &Ephemeris, chart: &Chart, year: i32) -> ChartResult<SolarReturnReport> {
    let natal_sun = chart.bodies[&Body::Sun].longitude;
    let (_, birth_month, birth_day, ..) = chart.epoch.to_gregorian_utc();

    // Aim at the birthday anniversary, clamped away from month ends.
    let estimate = Epoch::from_gregorian_utc(year, birth_month, birth_day.min(28), 12, 0, 0, 0);

    let mut found = None;
    let mut estimated = false;
    for half_width_days in [7.0, 30.0] {
        let lo = estimate - Unit::Day * half_width_days;
        let hi = estimate + Unit::Day * half_width_days;
        let gap_lo = longitude_gap(eph, Body::Sun, lo, chart.location, natal_sun)?;
        let gap_hi = longitude_gap(eph, Body::Sun, hi, chart.location, natal_sun)?;

        if gap_lo * gap_hi <= 0.0 {
            found = Some(bisect_return(
                eph,
                Body::Sun,
                chart.location,
                natal_sun,
                lo,
                hi,
                gap_lo,
            )?);
            break;
        }
    }

    let return_epoch = match found {
        Some(epoch) => epoch,
        None => {
            warn!("solar return for {year} not bracketed, returning the estimate");
            estimated = true;
            estimate
        }
    };

    let (positions, houses, aspects) = chart_at(eph, chart, return_epoch)?;
    let return_natal_aspects = return_to_natal(&positions, &chart.bodies);

    Ok(SolarReturnReport {
        chart_id: chart.id,
        year,
        return_epoch,
        estimated,
        positions,
        houses,
        aspects,
        return_natal_aspects,
    })
}

/// Finds the Moon's return to its natal longitude around the reference date.
/// The Moon laps the zodiac in 27.3 days, so the -3..+30 day window holds
/// exactly one crossing; hourly sampling brackets it, with a coarser retry.
pub fn lunar_return(
    eph: &Ephemeris,
    chart: &Chart,
    reference: Epoch,
) -> ChartResult<LunarReturnReport> {
    let natal_moon = chart.bodies[&Body::Moon].longitude;
    let window_start = reference - Unit::Day * 3.0;
    let window_end = reference + Unit::Day * 30.0;

    let mut bracket = None;
    for step_hours in [1.0, 2.0] {
        let mut lo = window_start;
        let mut gap_lo = longitude_gap(eph, Body::Moon, lo, chart.location, natal_moon)?;

        while lo < window_end {
            let hi = lo + Unit::Hour * step_hours;
            let gap_hi = longitude_gap(eph, Body::Moon, hi, chart.location, natal_moon)?;

            // A sign change near +-180 is the seam, not a crossing.
            if gap_lo * gap_hi <= 0.0 && gap_lo.abs() < 90.0 && gap_hi.abs() < 90.0 {
                bracket = Some((lo, hi, gap_lo));
                break;
            }
            lo = hi;
            gap_lo = gap_hi;
        }

        if bracket.is_some() {
            break;
        }
    }

    let (return_epoch, estimated) = match bracket {
        Some((lo, hi, gap_lo)) => (
            bisect_return(eph, Body::Moon, chart.location, natal_moon, lo, hi, gap_lo)?,
            false,
        ),
        None => {
            warn!("lunar return not bracketed around {reference}, returning the window midpoint");
            (window_start + (window_end - window_start) * 0.5, true)
        }
    };

    let (positions, houses, aspects) = chart_at(eph, chart, return_epoch)?;

    Ok(LunarReturnReport {
        chart_id: chart.id,
        return_epoch,
        estimated,
        positions,
        houses,
        aspects,
    })
}

/// Natal-style positions, houses and aspects at an arbitrary instant, using
/// the chart's location and house system.
fn chart_at(
    eph: &Ephemeris,
    chart: &Chart,
    epoch: Epoch,
) -> ChartResult<(BodyStates, HouseCusps, Vec<Aspect>)> {
    let positions = natal::body_states(eph, epoch, chart.location)?;
    let wheel = houses::compute(
        chart.house_system,
        frames::ramc_deg(epoch, chart.location.longitude_deg),
        frames::mean_obliquity_deg(epoch),
        chart.location.latitude_deg,
    );
    let aspects = aspects::detect(&positions, &AspectOptions::default());
    Ok((positions, wheel, aspects))
}

/// Major aspects from a return chart onto the natal chart, medium orbs,
/// sorted by ascending orb.
fn return_to_natal(positions: &BodyStates, natal: &BodyStates) -> Vec<ReturnAspect> {
    let mut aspects = Vec::new();
    for (r_body, r_state) in positions {
        for (n_body, n_state) in natal {
            let delta = separation(r_state.longitude, n_state.longitude);
            for (kind, orb) in RETURN_ORBS {
                let deviation = (delta - kind.target_angle()).abs();
                if deviation > orb {
                    continue;
                }
                aspects.push(ReturnAspect {
                    return_body: *r_body,
                    natal_body: *n_body,
                    kind,
                    angle: delta,
                    orb: deviation,
                    nature: transit_nature(kind, *r_body, *n_body),
                });
                break;
            }
        }
    }

    aspects.sort_by(|x, y| x.orb.total_cmp(&y.orb));
    aspects
}
