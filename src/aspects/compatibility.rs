/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Weighted compatibility scoring over a synastry aspect list.
//!
//! Every aspect feeds the total and the harmony/challenge accumulators by
//! nature; luminary and relationship pairs carry extra weight (Sun-Moon x3,
//! Venus-Mars x2, Mercury x1.5). Scores normalize against an upper bound
//! derived from the aspect count.

use core::fmt;

use serde_derive::{Deserialize, Serialize};

use super::{AspectNature, SynastryAspect};
use crate::natal::Body;

/// Base points per aspect: strength in [0, 1] scaled to [0, 10].
const POINTS_PER_ASPECT: f64 = 10.0;
/// Upper bound per aspect used to normalize the total score.
const TOTAL_BOUND_PER_ASPECT: f64 = POINTS_PER_ASPECT * 2.0;
/// Upper bound per aspect for the per-body sub-scores.
const BODY_BOUND_PER_ASPECT: f64 = POINTS_PER_ASPECT * 3.0 / 5.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityRating {
    Excellent,
    VeryGood,
    Good,
    Moderate,
    InterestingDynamics,
    Challenging,
    Difficult,
    /// Not enough aspects to score.
    Undetermined,
}

impl CompatibilityRating {
    fn from_total(total: f64) -> Self {
        if total >= 80.0 {
            CompatibilityRating::Excellent
        } else if total >= 70.0 {
            CompatibilityRating::VeryGood
        } else if total >= 60.0 {
            CompatibilityRating::Good
        } else if total >= 50.0 {
            CompatibilityRating::Moderate
        } else if total >= 40.0 {
            CompatibilityRating::InterestingDynamics
        } else if total >= 30.0 {
            CompatibilityRating::Challenging
        } else {
            CompatibilityRating::Difficult
        }
    }
}

impl fmt::Display for CompatibilityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CompatibilityRating::Excellent => "excellent compatibility",
            CompatibilityRating::VeryGood => "very good compatibility",
            CompatibilityRating::Good => "good compatibility",
            CompatibilityRating::Moderate => "moderate compatibility",
            CompatibilityRating::InterestingDynamics => {
                "compatibility with interesting dynamics"
            }
            CompatibilityRating::Challenging => "challenging compatibility",
            CompatibilityRating::Difficult => "difficult compatibility",
            CompatibilityRating::Undetermined => "undetermined (not enough aspects)",
        };
        write!(f, "{text}")
    }
}

/// The computed compatibility record: normalized scores in [0, 100], per-body
/// sub-scores, counters and the rating band with its lopsidedness note.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub total_score: f64,
    pub harmony_score: f64,
    pub challenge_score: f64,
    pub sun_score: f64,
    pub moon_score: f64,
    pub venus_score: f64,
    pub mars_score: f64,
    pub mercury_score: f64,
    pub total_aspects: usize,
    pub harmonious_aspects: usize,
    pub challenging_aspects: usize,
    pub rating: CompatibilityRating,
    pub summary: String,
}

fn involves(aspect: &SynastryAspect, body: Body) -> bool {
    aspect.chart1_body == body || aspect.chart2_body == body
}

fn is_pair(aspect: &SynastryAspect, a: Body, b: Body) -> bool {
    (aspect.chart1_body == a && aspect.chart2_body == b)
        || (aspect.chart1_body == b && aspect.chart2_body == a)
}

/// Scores a synastry aspect list.
pub fn score(aspects: &[SynastryAspect]) -> CompatibilityScore {
    if aspects.is_empty() {
        return CompatibilityScore {
            total_score: 50.0,
            harmony_score: 50.0,
            challenge_score: 50.0,
            sun_score: 0.0,
            moon_score: 0.0,
            venus_score: 0.0,
            mars_score: 0.0,
            mercury_score: 0.0,
            total_aspects: 0,
            harmonious_aspects: 0,
            challenging_aspects: 0,
            rating: CompatibilityRating::Undetermined,
            summary: CompatibilityRating::Undetermined.to_string(),
        };
    }

    let mut total = 0.0;
    let mut harmony = 0.0;
    let mut challenge = 0.0;
    let mut harmonious_aspects = 0;
    let mut challenging_aspects = 0;

    let mut sun = 0.0;
    let mut moon = 0.0;
    let mut venus = 0.0;
    let mut mars = 0.0;
    let mut mercury = 0.0;

    for aspect in aspects {
        let points = aspect.strength * POINTS_PER_ASPECT;

        match aspect.nature {
            AspectNature::Harmonious => {
                harmony += points;
                harmonious_aspects += 1;
                // Harmony still seeds some friction, and friction some growth.
                challenge += points * 0.2;
            }
            AspectNature::Challenging => {
                challenge += points;
                challenging_aspects += 1;
                harmony += points * 0.2;
            }
            _ => {
                harmony += points * 0.5;
                challenge += points * 0.5;
            }
        }

        total += points;

        if is_pair(aspect, Body::Sun, Body::Moon) {
            // The luminaries carry the core of the relationship.
            sun += points * 3.0;
            moon += points * 3.0;
            if aspect.nature == AspectNature::Harmonious {
                total += points * 2.0;
            }
        } else if is_pair(aspect, Body::Venus, Body::Mars) {
            venus += points * 2.0;
            mars += points * 2.0;
            if aspect.nature == AspectNature::Harmonious {
                total += points * 1.5;
            }
        } else if involves(aspect, Body::Mercury) {
            mercury += points * 1.5;
        }

        if involves(aspect, Body::Sun) {
            sun += points;
        }
        if involves(aspect, Body::Moon) {
            moon += points;
        }
        if involves(aspect, Body::Venus) {
            venus += points;
        }
        if involves(aspect, Body::Mars) {
            mars += points;
        }
        if involves(aspect, Body::Mercury) {
            mercury += points;
        }
    }

    let count = aspects.len() as f64;
    let total_bound = count * TOTAL_BOUND_PER_ASPECT;
    let body_bound = count * BODY_BOUND_PER_ASPECT;

    let total_score = (total / total_bound * 100.0).min(100.0);
    let harmony_score = (harmony / total_bound * 100.0 * 2.0).min(100.0);
    let challenge_score = (challenge / total_bound * 100.0 * 2.0).min(100.0);

    let normalize_body = |v: f64| (v / body_bound * 100.0).min(100.0);

    let rating = CompatibilityRating::from_total(total_score);
    let mut summary = rating.to_string();
    if harmony_score > 75.0 && challenge_score < 30.0 {
        summary.push_str(" (very harmonious, but few growth opportunities)");
    } else if harmony_score < 30.0 && challenge_score > 75.0 {
        summary.push_str(" (intensely challenging, with high growth potential)");
    } else if harmony_score > 60.0 && challenge_score > 60.0 {
        summary.push_str(" (both harmonious and dynamic, well balanced)");
    }

    CompatibilityScore {
        total_score,
        harmony_score,
        challenge_score,
        sun_score: normalize_body(sun),
        moon_score: normalize_body(moon),
        venus_score: normalize_body(venus),
        mars_score: normalize_body(mars),
        mercury_score: normalize_body(mercury),
        total_aspects: aspects.len(),
        harmonious_aspects,
        challenging_aspects,
        rating,
        summary,
    }
}

#[cfg(test)]
mod compatibility_ut {
    use super::*;
    use crate::aspects::synastry;
    use crate::natal::{Body, BodyState, BodyStates};

    fn chart(entries: &[(Body, f64)]) -> BodyStates {
        let mut states = BodyStates::new();
        for (body, lon) in entries {
            states.insert(*body, BodyState::from_longitude(*lon));
        }
        states
    }

    #[test]
    fn empty_synastry_is_undetermined() {
        let result = score(&[]);
        assert_eq!(result.rating, CompatibilityRating::Undetermined);
        assert_eq!(result.total_score, 50.0);
        assert_eq!(result.total_aspects, 0);
    }

    #[test]
    fn double_trine_scores_well() {
        // Suns and Moons in exact mutual trines.
        let a = chart(&[(Body::Sun, 0.0), (Body::Moon, 240.0)]);
        let b = chart(&[(Body::Sun, 120.0), (Body::Moon, 0.0)]);

        let aspects = synastry(&a, &b, None);
        let result = score(&aspects);

        assert!(result.total_score >= 60.0, "total {}", result.total_score);
        assert!(result.harmony_score > result.challenge_score);
        assert!(matches!(
            result.rating,
            CompatibilityRating::Good
                | CompatibilityRating::VeryGood
                | CompatibilityRating::Excellent
        ));
        assert!(result.sun_score > 0.0);
        assert!(result.moon_score > 0.0);
    }

    #[test]
    fn luminary_pairs_outweigh_the_rest() {
        let sun_moon = vec![SynastryAspect {
            chart1_body: Body::Sun,
            chart2_body: Body::Moon,
            kind: crate::aspects::AspectKind::Trine,
            exact_angle: 120.0,
            orb: 0.0,
            nature: AspectNature::Harmonious,
            strength: 0.8,
        }];
        let outer = vec![SynastryAspect {
            chart1_body: Body::Saturn,
            chart2_body: Body::Pluto,
            kind: crate::aspects::AspectKind::Trine,
            exact_angle: 120.0,
            orb: 0.0,
            nature: AspectNature::Harmonious,
            strength: 0.8,
        }];

        let with_luminaries = score(&sun_moon);
        let without = score(&outer);
        assert!(with_luminaries.total_score > without.total_score);
        assert!(with_luminaries.sun_score > 0.0);
        assert_eq!(without.sun_score, 0.0);
    }

    #[test]
    fn challenging_aspects_push_the_challenge_score() {
        let squares: Vec<SynastryAspect> = [
            (Body::Mars, Body::Saturn),
            (Body::Sun, Body::Saturn),
            (Body::Moon, Body::Pluto),
        ]
        .iter()
        .map(|(a, b)| SynastryAspect {
            chart1_body: *a,
            chart2_body: *b,
            kind: crate::aspects::AspectKind::Square,
            exact_angle: 90.0,
            orb: 0.0,
            nature: AspectNature::Challenging,
            strength: 0.7,
        })
        .collect();

        let result = score(&squares);
        assert!(result.challenge_score > result.harmony_score);
        assert_eq!(result.challenging_aspects, 3);
        assert_eq!(result.harmonious_aspects, 0);
    }
}
