/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Aspect detection between body tables: natal pairs, synastry across two
//! charts, midpoint and harmonic variants, and the aspect grid.
//!
//! Each unordered pair yields at most one aspect: candidate kinds are tried
//! majors first, then minors, then declination aspects, and the first match
//! wins.

pub mod compatibility;

use core::fmt;

use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

use crate::math::angles::{between_0_360, separation, shorter_arc_midpoint};
use crate::natal::{Body, BodyState, BodyStates};

/// Pairs with a slower relative motion than this are stationary: neither
/// applying nor separating.
const STATIONARY_SPEED_DEG_DAY: f64 = 0.01;
/// Stationary band for declination motion.
const STATIONARY_DECLINATION_DEG_DAY: f64 = 0.001;
/// An aspect tighter than this orb is exact.
pub const EXACT_ORB_DEG: f64 = 0.1;
/// Base orb for midpoint hits, deliberately tight.
const MIDPOINT_ORB_DEG: f64 = 1.0;
/// Minor aspects only get 70% of the adjusted orb.
const MINOR_ORB_SCALE: f64 = 0.7;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectNature {
    Harmonious,
    Challenging,
    Neutral,
    Mystical,
    Spiritual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
    Quincunx,
    SemiSextile,
    SemiSquare,
    Sesquiquadrate,
    Quintile,
    BiQuintile,
    Septile,
    Novile,
    Parallel,
    ContraParallel,
}

impl AspectKind {
    pub const MAJOR: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Trine,
        AspectKind::Square,
        AspectKind::Sextile,
    ];

    pub const MINOR: [AspectKind; 8] = [
        AspectKind::Quincunx,
        AspectKind::SemiSextile,
        AspectKind::SemiSquare,
        AspectKind::Sesquiquadrate,
        AspectKind::Quintile,
        AspectKind::BiQuintile,
        AspectKind::Septile,
        AspectKind::Novile,
    ];

    pub const DECLINATION: [AspectKind; 2] = [AspectKind::Parallel, AspectKind::ContraParallel];

    /// The angle this aspect forms, in degrees.
    pub const fn target_angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Trine => 120.0,
            AspectKind::Square => 90.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::SemiSextile => 30.0,
            AspectKind::SemiSquare => 45.0,
            AspectKind::Sesquiquadrate => 135.0,
            AspectKind::Quintile => 72.0,
            AspectKind::BiQuintile => 144.0,
            AspectKind::Septile => 51.4,
            AspectKind::Novile => 40.0,
            AspectKind::Parallel => 0.0,
            AspectKind::ContraParallel => 180.0,
        }
    }

    pub const fn base_orb(self) -> f64 {
        match self {
            AspectKind::Conjunction | AspectKind::Opposition => 10.0,
            AspectKind::Trine | AspectKind::Square => 8.0,
            AspectKind::Sextile => 6.0,
            AspectKind::Quincunx => 5.0,
            AspectKind::SemiSextile | AspectKind::SemiSquare | AspectKind::Sesquiquadrate => 3.0,
            AspectKind::Quintile | AspectKind::BiQuintile => 2.0,
            AspectKind::Septile | AspectKind::Novile => 1.5,
            AspectKind::Parallel | AspectKind::ContraParallel => 1.0,
        }
    }

    pub const fn nature(self) -> AspectNature {
        match self {
            AspectKind::Conjunction => AspectNature::Neutral,
            AspectKind::Opposition => AspectNature::Challenging,
            AspectKind::Trine => AspectNature::Harmonious,
            AspectKind::Square => AspectNature::Challenging,
            AspectKind::Sextile => AspectNature::Harmonious,
            AspectKind::Quincunx => AspectNature::Challenging,
            AspectKind::SemiSextile => AspectNature::Neutral,
            AspectKind::SemiSquare => AspectNature::Challenging,
            AspectKind::Sesquiquadrate => AspectNature::Challenging,
            AspectKind::Quintile => AspectNature::Harmonious,
            AspectKind::BiQuintile => AspectNature::Harmonious,
            AspectKind::Septile => AspectNature::Mystical,
            AspectKind::Novile => AspectNature::Spiritual,
            AspectKind::Parallel => AspectNature::Neutral,
            AspectKind::ContraParallel => AspectNature::Challenging,
        }
    }

    pub const fn base_strength(self) -> f64 {
        match self {
            AspectKind::Conjunction => 1.0,
            AspectKind::Opposition => 0.9,
            AspectKind::Trine => 0.8,
            AspectKind::Square => 0.7,
            AspectKind::Sextile => 0.6,
            AspectKind::Quincunx => 0.4,
            AspectKind::SemiSextile
            | AspectKind::SemiSquare
            | AspectKind::Sesquiquadrate => 0.3,
            AspectKind::Quintile | AspectKind::BiQuintile => 0.2,
            AspectKind::Septile | AspectKind::Novile => 0.1,
            AspectKind::Parallel | AspectKind::ContraParallel => 0.3,
        }
    }

    pub const fn is_minor(self) -> bool {
        matches!(
            self,
            AspectKind::Quincunx
                | AspectKind::SemiSextile
                | AspectKind::SemiSquare
                | AspectKind::Sesquiquadrate
                | AspectKind::Quintile
                | AspectKind::BiQuintile
                | AspectKind::Septile
                | AspectKind::Novile
        )
    }

    pub const fn is_declination(self) -> bool {
        matches!(self, AspectKind::Parallel | AspectKind::ContraParallel)
    }

    pub const fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Opposition => "opposition",
            AspectKind::Trine => "trine",
            AspectKind::Square => "square",
            AspectKind::Sextile => "sextile",
            AspectKind::Quincunx => "quincunx",
            AspectKind::SemiSextile => "semi_sextile",
            AspectKind::SemiSquare => "semi_square",
            AspectKind::Sesquiquadrate => "sesquiquadrate",
            AspectKind::Quintile => "quintile",
            AspectKind::BiQuintile => "bi_quintile",
            AspectKind::Septile => "septile",
            AspectKind::Novile => "novile",
            AspectKind::Parallel => "parallel",
            AspectKind::ContraParallel => "contra_parallel",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A detected aspect between two bodies of the same table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub body_a: Body,
    pub body_b: Body,
    pub kind: AspectKind,
    /// The angle the aspect forms (0, 60, 90, ...).
    pub exact_angle: f64,
    /// Deviation from the exact angle, degrees.
    pub orb: f64,
    pub nature: AspectNature,
    /// In [0, 1]; the base strength of the kind shrinks linearly with the orb.
    pub strength: f64,
    pub applying: bool,
    pub exact: bool,
    pub separating: bool,
}

/// Detection policy: custom orb overrides and which kind families to try.
#[derive(Clone, Debug)]
pub struct AspectOptions {
    pub custom_orbs: Option<IndexMap<AspectKind, f64>>,
    pub include_minor: bool,
    pub include_declination: bool,
}

impl Default for AspectOptions {
    fn default() -> Self {
        Self {
            custom_orbs: None,
            include_minor: true,
            include_declination: false,
        }
    }
}

impl AspectOptions {
    fn orb_for(&self, kind: AspectKind) -> f64 {
        self.custom_orbs
            .as_ref()
            .and_then(|orbs| orbs.get(&kind).copied())
            .unwrap_or_else(|| kind.base_orb())
    }

    fn candidate_kinds(&self) -> Vec<AspectKind> {
        let mut kinds = AspectKind::MAJOR.to_vec();
        if self.include_minor {
            kinds.extend(AspectKind::MINOR);
        }
        if self.include_declination {
            kinds.extend(AspectKind::DECLINATION);
        }
        kinds
    }
}

/// Orb widened (or narrowed) by the mean of the two body modifiers, then
/// scaled down for minor aspects.
fn effective_orb(kind: AspectKind, base: f64, a: Body, b: Body) -> f64 {
    let adjusted = base + (a.orb_modifier() + b.orb_modifier()) / 2.0;
    if kind.is_minor() {
        adjusted * MINOR_ORB_SCALE
    } else {
        adjusted
    }
}

fn strength_of(kind: AspectKind, deviation: f64, orb: f64) -> f64 {
    let base = kind.base_strength();
    if orb <= f64::EPSILON {
        // A zero-width orb only ever matches dead on.
        return base;
    }
    (base * (1.0 - deviation / orb)).clamp(0.0, base)
}

/// Applying/separating flags from the signed relative longitude motion.
///
/// The folded separation shrinks or grows depending on which side of the
/// circle the pair sits on; an aspect is applying when the deviation from its
/// exact angle is shrinking under the current motion.
pub(crate) fn longitude_flags(
    sa: &BodyState,
    sb: &BodyState,
    delta: f64,
    target: f64,
) -> (bool, bool) {
    let relative_speed = sa.daily_motion - sb.daily_motion;
    if relative_speed.abs() < STATIONARY_SPEED_DEG_DAY {
        return (false, false);
    }

    let actual = between_0_360(sa.longitude - sb.longitude);
    let delta_rate = if actual <= 180.0 {
        relative_speed
    } else {
        -relative_speed
    };

    let deviation = delta - target;
    let applying = deviation.signum() * delta_rate < 0.0;
    (applying, !applying)
}

/// Applying/separating for declination aspects from the declination rates.
fn declination_flags(sa: &BodyState, sb: &BodyState) -> (bool, bool) {
    // Rate of each |declination|, then of their gap.
    let diff_rate = sa.declination.signum() * sa.declination_motion
        - sb.declination.signum() * sb.declination_motion;
    if diff_rate.abs() < STATIONARY_DECLINATION_DEG_DAY {
        return (false, false);
    }

    let diff = sa.declination.abs() - sb.declination.abs();
    let applying = diff.signum() * diff_rate < 0.0;
    (applying, !applying)
}

fn match_ecliptic(
    kind: AspectKind,
    a: Body,
    sa: &BodyState,
    b: Body,
    sb: &BodyState,
    base_orb: f64,
) -> Option<Aspect> {
    let target = kind.target_angle();
    let orb = effective_orb(kind, base_orb, a, b);
    let delta = separation(sa.longitude, sb.longitude);
    let deviation = (delta - target).abs();
    if deviation > orb {
        return None;
    }

    let (applying, separating) = longitude_flags(sa, sb, delta, target);
    Some(Aspect {
        body_a: a,
        body_b: b,
        kind,
        exact_angle: target,
        orb: deviation,
        nature: kind.nature(),
        strength: strength_of(kind, deviation, orb),
        applying,
        exact: deviation < EXACT_ORB_DEG,
        separating,
    })
}

fn match_declination(
    kind: AspectKind,
    a: Body,
    sa: &BodyState,
    b: Body,
    sb: &BodyState,
    orb: f64,
) -> Option<Aspect> {
    // A zero declination sits on neither side and matches nothing.
    let product = sa.declination * sb.declination;
    let side_ok = if kind == AspectKind::Parallel {
        product > 0.0
    } else {
        product < 0.0
    };
    if !side_ok {
        return None;
    }

    let deviation = (sa.declination.abs() - sb.declination.abs()).abs();
    if deviation > orb {
        return None;
    }

    let (applying, separating) = declination_flags(sa, sb);
    Some(Aspect {
        body_a: a,
        body_b: b,
        kind,
        exact_angle: kind.target_angle(),
        orb: deviation,
        nature: kind.nature(),
        strength: strength_of(kind, deviation, orb),
        applying,
        exact: deviation < EXACT_ORB_DEG,
        separating,
    })
}

/// Detects aspects across every unordered pair of the table, one aspect per
/// pair at most, strongest first.
pub fn detect(states: &BodyStates, options: &AspectOptions) -> Vec<Aspect> {
    let kinds = options.candidate_kinds();
    let entries: Vec<(Body, &BodyState)> = states.iter().map(|(b, s)| (*b, s)).collect();

    let mut aspects = Vec::new();
    for i in 0..entries.len() {
        for j in i + 1..entries.len() {
            let (a, sa) = entries[i];
            let (b, sb) = entries[j];

            for &kind in &kinds {
                let matched = if kind.is_declination() {
                    match_declination(kind, a, sa, b, sb, options.orb_for(kind))
                } else {
                    match_ecliptic(kind, a, sa, b, sb, options.orb_for(kind))
                };
                if let Some(aspect) = matched {
                    aspects.push(aspect);
                    break;
                }
            }
        }
    }

    aspects.sort_by(|x, y| y.strength.total_cmp(&x.strength));
    aspects
}

/// The symmetric aspect grid; self-cells are None and the mirrored cell swaps
/// the body order.
pub fn grid(
    states: &BodyStates,
    options: &AspectOptions,
) -> IndexMap<Body, IndexMap<Body, Option<Aspect>>> {
    let mut grid: IndexMap<Body, IndexMap<Body, Option<Aspect>>> = IndexMap::new();
    for a in states.keys() {
        let mut row = IndexMap::new();
        for b in states.keys() {
            row.insert(*b, None);
        }
        grid.insert(*a, row);
    }

    for aspect in detect(states, options) {
        let mut mirrored = aspect;
        mirrored.body_a = aspect.body_b;
        mirrored.body_b = aspect.body_a;

        if let Some(row) = grid.get_mut(&aspect.body_a) {
            row.insert(aspect.body_b, Some(aspect));
        }
        if let Some(row) = grid.get_mut(&aspect.body_b) {
            row.insert(aspect.body_a, Some(mirrored));
        }
    }

    grid
}

/// An aspect between a body of one chart and a body of another.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynastryAspect {
    pub chart1_body: Body,
    pub chart2_body: Body,
    pub kind: AspectKind,
    pub exact_angle: f64,
    pub orb: f64,
    pub nature: AspectNature,
    pub strength: f64,
}

/// Cross-chart aspects over every ordered pair: the same body on each side is
/// a meaningful pairing. Charts are static, so no applying/separating flags.
pub fn synastry(
    chart1: &BodyStates,
    chart2: &BodyStates,
    custom_orbs: Option<&IndexMap<AspectKind, f64>>,
) -> Vec<SynastryAspect> {
    let mut kinds = AspectKind::MAJOR.to_vec();
    kinds.extend(AspectKind::MINOR);

    let orb_for = |kind: AspectKind| {
        custom_orbs
            .and_then(|orbs| orbs.get(&kind).copied())
            .unwrap_or_else(|| kind.base_orb())
    };

    let mut aspects = Vec::new();
    for (a, sa) in chart1 {
        for (b, sb) in chart2 {
            let delta = separation(sa.longitude, sb.longitude);
            for &kind in &kinds {
                let target = kind.target_angle();
                let orb = effective_orb(kind, orb_for(kind), *a, *b);
                let deviation = (delta - target).abs();
                if deviation <= orb {
                    aspects.push(SynastryAspect {
                        chart1_body: *a,
                        chart2_body: *b,
                        kind,
                        exact_angle: target,
                        orb: deviation,
                        nature: kind.nature(),
                        strength: strength_of(kind, deviation, orb),
                    });
                    break;
                }
            }
        }
    }

    aspects.sort_by(|x, y| y.strength.total_cmp(&x.strength));
    aspects
}

/// An aspect from a pair midpoint to a third body.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidpointAspect {
    pub midpoint_of: (Body, Body),
    pub midpoint_longitude: f64,
    pub body: Body,
    pub kind: AspectKind,
    pub exact_angle: f64,
    pub orb: f64,
    pub nature: AspectNature,
    pub strength: f64,
}

/// Shorter-arc midpoints of every unordered pair checked against every third
/// body, hard aspects only, with a tight orb. Midpoints are secondary, so
/// their strength is scaled down.
pub fn midpoint_aspects(
    states: &BodyStates,
    custom_orbs: Option<&IndexMap<AspectKind, f64>>,
) -> Vec<MidpointAspect> {
    const MIDPOINT_KINDS: [AspectKind; 3] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Square,
    ];
    const MIDPOINT_STRENGTH_SCALE: f64 = 0.8;

    let entries: Vec<(Body, &BodyState)> = states.iter().map(|(b, s)| (*b, s)).collect();

    let mut aspects = Vec::new();
    for i in 0..entries.len() {
        for j in i + 1..entries.len() {
            let (p, sp) = entries[i];
            let (q, sq) = entries[j];
            let midpoint = shorter_arc_midpoint(sp.longitude, sq.longitude);

            for (r, sr) in &entries {
                if *r == p || *r == q {
                    continue;
                }
                let delta = separation(midpoint, sr.longitude);
                for kind in MIDPOINT_KINDS {
                    let orb = custom_orbs
                        .and_then(|orbs| orbs.get(&kind).copied())
                        .unwrap_or(MIDPOINT_ORB_DEG);
                    let deviation = (delta - kind.target_angle()).abs();
                    if deviation <= orb {
                        aspects.push(MidpointAspect {
                            midpoint_of: (p, q),
                            midpoint_longitude: midpoint,
                            body: *r,
                            kind,
                            exact_angle: kind.target_angle(),
                            orb: deviation,
                            nature: kind.nature(),
                            strength: kind.base_strength() * MIDPOINT_STRENGTH_SCALE,
                        });
                        break;
                    }
                }
            }
        }
    }

    aspects.sort_by(|x, y| y.strength.total_cmp(&x.strength));
    aspects
}

/// An aspect on the multiples of `360 / harmonic`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonicAspect {
    pub body_a: Body,
    pub body_b: Body,
    pub harmonic: u32,
    /// The fundamental angle of the harmonic, `360 / harmonic`.
    pub harmonic_angle: f64,
    /// The nearest exact multiple the pair sits on.
    pub closest_angle: f64,
    pub orb: f64,
    pub strength: f64,
    /// The named kind when the harmonic has one (5, 7, 9).
    pub kind: Option<AspectKind>,
}

/// Aspects of an integer harmonic: the pair separation folded to the nearest
/// multiple of `360 / harmonic` must sit within the supplied orb.
pub fn harmonic_aspects(states: &BodyStates, harmonic: u32, orb: f64) -> Vec<HarmonicAspect> {
    const HARMONIC_BASE_STRENGTH: f64 = 0.3;

    let harmonic_angle = 360.0 / f64::from(harmonic.max(1));
    let entries: Vec<(Body, &BodyState)> = states.iter().map(|(b, s)| (*b, s)).collect();

    let mut aspects = Vec::new();
    for i in 0..entries.len() {
        for j in i + 1..entries.len() {
            let (a, sa) = entries[i];
            let (b, sb) = entries[j];

            let angle_diff = (sa.longitude - sb.longitude).abs().rem_euclid(360.0);
            let mut harmonic_diff = angle_diff.rem_euclid(harmonic_angle);
            if harmonic_diff > harmonic_angle / 2.0 {
                harmonic_diff = harmonic_angle - harmonic_diff;
            }

            if harmonic_diff <= orb {
                let closest_angle =
                    between_0_360((angle_diff / harmonic_angle).round() * harmonic_angle);
                let kind = match (harmonic, closest_angle as u32) {
                    (5, 144) => Some(AspectKind::BiQuintile),
                    (5, _) => Some(AspectKind::Quintile),
                    (7, _) => Some(AspectKind::Septile),
                    (9, _) => Some(AspectKind::Novile),
                    _ => None,
                };

                aspects.push(HarmonicAspect {
                    body_a: a,
                    body_b: b,
                    harmonic,
                    harmonic_angle,
                    closest_angle,
                    orb: harmonic_diff,
                    strength: HARMONIC_BASE_STRENGTH * (1.0 - harmonic_diff / orb),
                    kind,
                });
            }
        }
    }

    aspects.sort_by(|x, y| y.strength.total_cmp(&x.strength));
    aspects
}

#[cfg(test)]
mod aspects_ut {
    use super::*;
    use crate::natal::BodyStates;

    fn table(entries: &[(Body, f64)]) -> BodyStates {
        let mut states = BodyStates::new();
        for (body, lon) in entries {
            states.insert(*body, BodyState::from_longitude(*lon));
        }
        states
    }

    #[test]
    fn exact_opposition_is_stationary() {
        let states = table(&[(Body::Sun, 10.0), (Body::Moon, 190.0)]);
        let aspects = detect(&states, &AspectOptions::default());

        assert_eq!(aspects.len(), 1);
        let aspect = &aspects[0];
        assert_eq!(aspect.kind, AspectKind::Opposition);
        assert_eq!(aspect.orb, 0.0);
        assert!(aspect.exact);
        assert!(!aspect.applying);
        assert!(!aspect.separating);
    }

    #[test]
    fn one_aspect_per_pair() {
        // 150.2 from a sun/moon pair matches quincunx but sits inside no
        // major orb; only one record may come out.
        let states = table(&[(Body::Sun, 0.0), (Body::Moon, 150.2)]);
        let aspects = detect(&states, &AspectOptions::default());
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, AspectKind::Quincunx);
    }

    #[test]
    fn majors_win_over_minors() {
        // 171 degrees is within the widened opposition orb for sun/moon, and
        // would also be nothing else; the major must be reported.
        let states = table(&[(Body::Sun, 0.0), (Body::Moon, 171.0)]);
        let aspects = detect(&states, &AspectOptions::default());
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, AspectKind::Opposition);
    }

    #[test]
    fn orb_modifiers_widen_the_luminaries() {
        // 9 degrees off a trine: base orb 8 rejects it, but sun+moon widen
        // the orb to 10.
        let states = table(&[(Body::Sun, 0.0), (Body::Moon, 129.0)]);
        let aspects = detect(&states, &AspectOptions::default());
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, AspectKind::Trine);

        // The same deviation between two narrow-orb outer planets misses.
        let states = table(&[(Body::Uranus, 0.0), (Body::Pluto, 129.0)]);
        let aspects = detect(&states, &AspectOptions::default());
        assert!(aspects.iter().all(|a| a.kind != AspectKind::Trine));
    }

    #[test]
    fn applying_follows_relative_motion() {
        let mut states = BodyStates::new();
        // Moon at 100 closing a trine onto the Sun at 350: separation 110
        // and growing toward 120 at +13 deg/day.
        states.insert(
            Body::Sun,
            BodyState::from_longitude(350.0).with_daily_motion(1.0),
        );
        states.insert(
            Body::Moon,
            BodyState::from_longitude(100.0).with_daily_motion(13.2),
        );

        let aspects = detect(&states, &AspectOptions::default());
        let trine = aspects
            .iter()
            .find(|a| a.kind == AspectKind::Trine)
            .expect("trine expected");
        assert!(trine.applying);
        assert!(!trine.separating);
    }

    #[test]
    fn separating_after_the_pass() {
        let mut states = BodyStates::new();
        // Moon past the trine: separation 130 still growing.
        states.insert(
            Body::Sun,
            BodyState::from_longitude(350.0).with_daily_motion(1.0),
        );
        states.insert(
            Body::Moon,
            BodyState::from_longitude(120.0).with_daily_motion(13.2),
        );

        let aspects = detect(&states, &AspectOptions::default());
        let trine = aspects
            .iter()
            .find(|a| a.kind == AspectKind::Trine)
            .expect("trine expected");
        assert!(!trine.applying);
        assert!(trine.separating);
    }

    #[test]
    fn declination_aspects_only_when_enabled() {
        let mut states = BodyStates::new();
        let mut a = BodyState::from_longitude(0.0);
        a.declination = 12.0;
        // 75 degrees apart: no ecliptic aspect, so the pair is free for a
        // declination match.
        let mut b = BodyState::from_longitude(75.0);
        b.declination = 12.4;
        states.insert(Body::Venus, a);
        states.insert(Body::Mars, b);

        assert!(detect(&states, &AspectOptions::default()).is_empty());

        let opts = AspectOptions {
            include_declination: true,
            ..Default::default()
        };
        let aspects = detect(&states, &opts);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, AspectKind::Parallel);
        assert!((aspects[0].orb - 0.4).abs() < 1e-12);

        // Opposite declination signs make it a contra-parallel instead.
        states.get_mut(&Body::Mars).unwrap().declination = -12.4;
        let aspects = detect(&states, &opts);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, AspectKind::ContraParallel);
        assert_eq!(aspects[0].exact_angle, 180.0);
    }

    #[test]
    fn grid_is_symmetric() {
        let states = table(&[
            (Body::Sun, 0.0),
            (Body::Moon, 120.0),
            (Body::Mercury, 200.0),
        ]);
        let grid = grid(&states, &AspectOptions::default());

        for a in states.keys() {
            assert!(grid[a][a].is_none());
            for b in states.keys() {
                match (&grid[a][b], &grid[b][a]) {
                    (Some(x), Some(y)) => {
                        assert_eq!(x.kind, y.kind);
                        assert_eq!(x.orb, y.orb);
                        assert_eq!(x.strength, y.strength);
                        assert_eq!(x.body_a, y.body_b);
                        assert_eq!(x.body_b, y.body_a);
                    }
                    (None, None) => {}
                    _ => panic!("grid must be symmetric"),
                }
            }
        }
    }

    #[test]
    fn synastry_pairs_are_ordered() {
        let chart1 = table(&[(Body::Sun, 0.0)]);
        let chart2 = table(&[(Body::Sun, 120.0)]);
        let aspects = synastry(&chart1, &chart2, None);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].chart1_body, Body::Sun);
        assert_eq!(aspects[0].chart2_body, Body::Sun);
        assert_eq!(aspects[0].kind, AspectKind::Trine);
    }

    #[test]
    fn midpoints_use_the_shorter_arc() {
        // Sun 350, Moon 10: midpoint 0. Mars at 90 squares it.
        let states = table(&[
            (Body::Sun, 350.0),
            (Body::Moon, 10.0),
            (Body::Mars, 90.5),
        ]);
        let aspects = midpoint_aspects(&states, None);
        let hit = aspects
            .iter()
            .find(|m| m.midpoint_of == (Body::Sun, Body::Moon) && m.body == Body::Mars)
            .expect("midpoint square expected");
        assert_eq!(hit.kind, AspectKind::Square);
        assert!((hit.midpoint_longitude - 0.0).abs() < 1e-9);
        assert!((hit.orb - 0.5).abs() < 1e-9);
        assert!((hit.strength - 0.7 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn harmonics_fold_to_the_nearest_multiple() {
        let states = table(&[(Body::Sun, 0.0), (Body::Moon, 51.3)]);
        let aspects = harmonic_aspects(&states, 7, 1.0);
        assert_eq!(aspects.len(), 1);
        let h = &aspects[0];
        assert_eq!(h.kind, Some(AspectKind::Septile));
        assert!((h.harmonic_angle - 360.0 / 7.0).abs() < 1e-12);
        assert!(h.orb <= 1.0);

        // Way off any multiple of 360/7.
        let states = table(&[(Body::Sun, 0.0), (Body::Moon, 25.0)]);
        assert!(harmonic_aspects(&states, 7, 1.0).is_empty());
    }
}
