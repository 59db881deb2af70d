/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use core::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::constants::naif_ids;
use crate::NaifId;

/// A charted body: the ten physical bodies followed by the derived points.
///
/// The declaration order is the canonical ordering used for aspect pairs and
/// for serialized tables.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    NorthNode,
    SouthNode,
    Ascendant,
    Midheaven,
    PartOfFortune,
}

/// The ten bodies evaluated against the ephemeris, in canonical order.
pub const PHYSICAL_BODIES: [Body; 10] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
];

impl Body {
    /// NAIF target for the physical bodies; derived points have none.
    /// The inner planets resolve to their barycenters, matching what the
    /// DE-series short files carry.
    pub const fn naif_id(self) -> Option<NaifId> {
        match self {
            Body::Sun => Some(naif_ids::SUN),
            Body::Moon => Some(naif_ids::MOON),
            Body::Mercury => Some(naif_ids::MERCURY_BARYCENTER),
            Body::Venus => Some(naif_ids::VENUS_BARYCENTER),
            Body::Mars => Some(naif_ids::MARS_BARYCENTER),
            Body::Jupiter => Some(naif_ids::JUPITER_BARYCENTER),
            Body::Saturn => Some(naif_ids::SATURN_BARYCENTER),
            Body::Uranus => Some(naif_ids::URANUS_BARYCENTER),
            Body::Neptune => Some(naif_ids::NEPTUNE_BARYCENTER),
            Body::Pluto => Some(naif_ids::PLUTO_BARYCENTER),
            _ => None,
        }
    }

    /// Lowercase name, also the serialization key.
    pub const fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
            Body::NorthNode => "north_node",
            Body::SouthNode => "south_node",
            Body::Ascendant => "ascendant",
            Body::Midheaven => "midheaven",
            Body::PartOfFortune => "part_of_fortune",
        }
    }

    /// Per-body adjustment added to the base orb when this body takes part in an aspect.
    pub const fn orb_modifier(self) -> f64 {
        match self {
            Body::Sun | Body::Moon => 2.0,
            Body::Mercury | Body::Venus | Body::Mars => 0.0,
            Body::Jupiter | Body::Saturn => 1.0,
            Body::Uranus | Body::Neptune | Body::Pluto => -0.5,
            Body::NorthNode | Body::SouthNode => -1.0,
            Body::Ascendant | Body::Midheaven => 1.0,
            Body::PartOfFortune => -0.5,
        }
    }

    /// Traditional malefics, used to color transiting conjunctions.
    pub const fn is_malefic(self) -> bool {
        matches!(self, Body::Mars | Body::Saturn | Body::Uranus | Body::Pluto)
    }

    /// Traditional benefics, used to color transiting conjunctions.
    pub const fn is_benefic(self) -> bool {
        matches!(self, Body::Venus | Body::Jupiter)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod body_ut {
    use super::*;

    #[test]
    fn canonical_order_is_declaration_order() {
        assert!(Body::Sun < Body::Moon);
        assert!(Body::Pluto < Body::NorthNode);
        assert!(Body::Ascendant < Body::PartOfFortune);
    }

    #[test]
    fn derived_points_have_no_target() {
        for body in PHYSICAL_BODIES {
            assert!(body.naif_id().is_some());
        }
        assert!(Body::Ascendant.naif_id().is_none());
        assert!(Body::NorthNode.naif_id().is_none());
    }

    #[test]
    fn serialized_names_are_lowercase() {
        let json = serde_json::to_string(&Body::PartOfFortune).unwrap();
        assert_eq!(json, "\"part_of_fortune\"");
    }
}
