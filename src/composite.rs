/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Composite charts: a synthetic chart whose body longitudes are the
//! shorter-arc midpoints of two natal charts.

use crate::aspects::{self, Aspect, AspectOptions};
use crate::math::angles::shorter_arc_midpoint;
use crate::natal::{BodyState, BodyStates};

/// Midpoint body table of the bodies present in both charts, tagged
/// `is_composite`. Midpoints carry no motion, so the composite table is
/// static.
pub fn composite_positions(chart1: &BodyStates, chart2: &BodyStates) -> BodyStates {
    let mut positions = BodyStates::new();

    for (body, state1) in chart1 {
        let Some(state2) = chart2.get(body) else {
            continue;
        };

        let midpoint = shorter_arc_midpoint(state1.longitude, state2.longitude);
        let mut state = BodyState::from_longitude(midpoint);
        state.is_composite = true;
        positions.insert(*body, state);
    }

    positions
}

/// Aspects within the composite table, natal orb policy.
pub fn composite_aspects(positions: &BodyStates) -> Vec<Aspect> {
    aspects::detect(positions, &AspectOptions::default())
}

#[cfg(test)]
mod composite_ut {
    use super::*;
    use crate::natal::Body;
    use approx::assert_relative_eq;

    fn chart(entries: &[(Body, f64)]) -> BodyStates {
        let mut states = BodyStates::new();
        for (body, lon) in entries {
            states.insert(*body, BodyState::from_longitude(*lon));
        }
        states
    }

    #[test]
    fn midpoints_are_shorter_arc() {
        let a = chart(&[(Body::Sun, 350.0), (Body::Moon, 90.0)]);
        let b = chart(&[(Body::Sun, 30.0), (Body::Moon, 110.0)]);

        let composite = composite_positions(&a, &b);
        assert_relative_eq!(composite[&Body::Sun].longitude, 10.0);
        assert_relative_eq!(composite[&Body::Moon].longitude, 100.0);
        assert!(composite[&Body::Sun].is_composite);
    }

    #[test]
    fn composite_is_symmetric() {
        let a = chart(&[
            (Body::Sun, 12.5),
            (Body::Moon, 210.0),
            (Body::Venus, 341.2),
        ]);
        let b = chart(&[
            (Body::Sun, 98.0),
            (Body::Moon, 165.4),
            (Body::Venus, 77.9),
        ]);

        let ab = composite_positions(&a, &b);
        let ba = composite_positions(&b, &a);
        for (body, state) in &ab {
            assert_relative_eq!(state.longitude, ba[body].longitude, epsilon = 1e-12);
        }
    }

    #[test]
    fn only_common_bodies_appear() {
        let a = chart(&[(Body::Sun, 10.0), (Body::Mercury, 40.0)]);
        let b = chart(&[(Body::Sun, 20.0)]);

        let composite = composite_positions(&a, &b);
        assert_eq!(composite.len(), 1);
        assert!(composite.contains_key(&Body::Sun));
    }

    #[test]
    fn composite_aspects_use_natal_policy() {
        // Composite Sun and Moon land 120 apart: an exact trine.
        let a = chart(&[(Body::Sun, 0.0), (Body::Moon, 110.0)]);
        let b = chart(&[(Body::Sun, 20.0), (Body::Moon, 150.0)]);

        let composite = composite_positions(&a, &b);
        let aspects = composite_aspects(&composite);
        assert_eq!(aspects.len(), 1);
        assert_eq!(aspects[0].kind, crate::aspects::AspectKind::Trine);
        assert!(aspects[0].exact);
    }
}
