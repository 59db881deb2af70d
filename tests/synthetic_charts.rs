/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Properties that hold on synthetic body tables, no ephemeris required.

use approx::assert_relative_eq;

use astrocore::aspects::{
    self, compatibility, AspectKind, AspectOptions,
};
use astrocore::composite;
use astrocore::houses::{self, HouseSystem};
use astrocore::math::angles::between_0_360;
use astrocore::natal::{Body, BodyState, BodyStates, ZodiacSign};

fn table(entries: &[(Body, f64)]) -> BodyStates {
    let mut states = BodyStates::new();
    for (body, lon) in entries {
        states.insert(*body, BodyState::from_longitude(*lon));
    }
    states
}

#[test]
fn exact_opposition_with_zero_motion() {
    let _ = pretty_env_logger::try_init();
    // Two bodies at 10 and 190 with zero daily motion: exactly one aspect,
    // an exact opposition, neither applying nor separating.
    let states = table(&[(Body::Sun, 10.0), (Body::Moon, 190.0)]);
    let aspects = aspects::detect(&states, &AspectOptions::default());

    assert_eq!(aspects.len(), 1);
    let aspect = &aspects[0];
    assert_eq!(aspect.kind, AspectKind::Opposition);
    assert_eq!(aspect.orb, 0.0);
    assert!(aspect.exact);
    assert!(!aspect.applying);
    assert!(!aspect.separating);
}

#[test]
fn aspect_records_are_unique_and_symmetric() {
    let _ = pretty_env_logger::try_init();
    let states = table(&[
        (Body::Sun, 0.0),
        (Body::Moon, 120.0),
        (Body::Mercury, 60.0),
        (Body::Venus, 180.5),
        (Body::Mars, 240.0),
    ]);

    let aspects = aspects::detect(&states, &AspectOptions::default());

    // No two records share the same unordered pair, and the canonical order
    // puts the earlier body first.
    let mut pairs = std::collections::HashSet::new();
    for aspect in &aspects {
        assert!(aspect.body_a < aspect.body_b);
        assert!(pairs.insert((aspect.body_a, aspect.body_b)));

        // Flag discipline: exact implies a sub-0.1 orb, and only exact
        // aspects could ever carry both motion flags.
        if aspect.exact {
            assert!(aspect.orb < 0.1);
        }
        assert!(!(aspect.applying && aspect.separating) || aspect.exact);
    }

    // The grid mirrors every record with swapped bodies and equal metrics.
    let grid = aspects::grid(&states, &AspectOptions::default());
    for aspect in &aspects {
        let forward = grid[&aspect.body_a][&aspect.body_b].expect("cell must be filled");
        let mirrored = grid[&aspect.body_b][&aspect.body_a].expect("mirror must be filled");
        assert_eq!(forward.kind, mirrored.kind);
        assert_eq!(forward.orb, mirrored.orb);
        assert_eq!(forward.nature, mirrored.nature);
        assert_eq!(forward.strength, mirrored.strength);
    }
}

#[test]
fn mutual_trines_rate_as_a_good_match() {
    let _ = pretty_env_logger::try_init();
    // Suns a trine apart, Moons a trine apart.
    let a = table(&[(Body::Sun, 0.0), (Body::Moon, 240.0)]);
    let b = table(&[(Body::Sun, 120.0), (Body::Moon, 0.0)]);

    let synastry = aspects::synastry(&a, &b, None);
    let scores = compatibility::score(&synastry);

    assert!(scores.total_score >= 60.0);
    assert!(scores.harmony_score > scores.challenge_score);
    assert!(matches!(
        scores.rating,
        compatibility::CompatibilityRating::Good
            | compatibility::CompatibilityRating::VeryGood
            | compatibility::CompatibilityRating::Excellent
    ));
}

#[test]
fn whole_sign_cusps_for_a_leo_ascendant() {
    let _ = pretty_env_logger::try_init();
    // RAMC 30 at latitude 40 rises in Leo.
    let wheel = houses::compute(HouseSystem::WholeSign, 30.0, 23.4392911, 40.0);
    assert_eq!(wheel.cusp(1).sign, ZodiacSign::Leo);

    let expected = [
        120.0, 150.0, 180.0, 210.0, 240.0, 270.0, 300.0, 330.0, 0.0, 30.0, 60.0, 90.0,
    ];
    for house in 1..=12u8 {
        let cusp = wheel.cusp(house);
        assert_relative_eq!(cusp.longitude, expected[(house - 1) as usize]);
        assert_relative_eq!(cusp.degree_in_sign, 0.0);
    }
}

#[test]
fn sign_cusp_boundary_stays_in_the_sign() {
    let _ = pretty_env_logger::try_init();
    let (sign, degree) = ZodiacSign::from_longitude(29.9999);
    assert_eq!(sign, ZodiacSign::Aries);
    assert!(degree < 30.0);

    let state = BodyState::from_longitude(29.9999);
    assert_eq!(state.sign, ZodiacSign::Aries);
}

#[test]
fn composite_midpoints_commute() {
    let _ = pretty_env_logger::try_init();
    let a = table(&[
        (Body::Sun, 312.0),
        (Body::Moon, 44.7),
        (Body::Mercury, 299.1),
        (Body::Venus, 10.0),
    ]);
    let b = table(&[
        (Body::Sun, 128.6),
        (Body::Moon, 200.0),
        (Body::Mercury, 330.4),
        (Body::Venus, 185.0),
    ]);

    let ab = composite::composite_positions(&a, &b);
    let ba = composite::composite_positions(&b, &a);

    for (body, state) in &ab {
        assert_relative_eq!(state.longitude, ba[body].longitude, epsilon = 1e-12);
        assert!(state.is_composite);
        // Midpoints sit on the shorter arc: never farther than 90 degrees
        // from either parent.
        let to_a = between_0_360(state.longitude - a[body].longitude).min(
            between_0_360(a[body].longitude - state.longitude),
        );
        assert!(to_a <= 90.0 + 1e-9);
    }
}

#[test]
fn stationary_pairs_carry_no_motion_flags() {
    let _ = pretty_env_logger::try_init();
    // Relative speed under the stationary band.
    let mut states = BodyStates::new();
    states.insert(
        Body::Jupiter,
        BodyState::from_longitude(0.0).with_daily_motion(0.080),
    );
    states.insert(
        Body::Saturn,
        BodyState::from_longitude(119.5).with_daily_motion(0.075),
    );

    let aspects = aspects::detect(&states, &AspectOptions::default());
    let trine = aspects
        .iter()
        .find(|a| a.kind == AspectKind::Trine)
        .expect("trine expected");
    assert!(!trine.applying);
    assert!(!trine.separating);
    assert!(!trine.exact);
}

#[test]
fn harmonic_grid_matches_named_kinds() {
    let _ = pretty_env_logger::try_init();
    let states = table(&[
        (Body::Sun, 0.0),
        (Body::Moon, 72.1),
        (Body::Venus, 40.0),
    ]);

    let fifth = aspects::harmonic_aspects(&states, 5, 1.0);
    assert!(fifth
        .iter()
        .any(|h| h.kind == Some(AspectKind::Quintile)
            && h.body_a == Body::Sun
            && h.body_b == Body::Moon));

    let ninth = aspects::harmonic_aspects(&states, 9, 1.0);
    assert!(ninth
        .iter()
        .any(|h| h.kind == Some(AspectKind::Novile)
            && h.body_a == Body::Sun
            && h.body_b == Body::Venus));
}
