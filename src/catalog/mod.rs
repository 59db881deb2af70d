/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Read-only catalog of astrological reference records with multilingual
//! names. The computation core resolves stable identifiers against this
//! store when persisting chart relations; a missing row is a logged skip,
//! never a failure.

use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

use crate::aspects::AspectKind;
use crate::natal::{Body, Element, Modality, ZodiacSign, PHYSICAL_BODIES, ZODIAC_SIGNS};

/// Identifier of an astrological system. Only the tropical Western system is
/// seeded; other systems are schema-compatible placeholders.
pub type SystemId = u32;

/// The default astrological system.
pub const WESTERN_TROPICAL: SystemId = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub name: String,
    pub description: String,
}

/// Per-language strings with the `requested -> default -> any` fallback chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSet {
    entries: IndexMap<String, Translation>,
}

impl TranslationSet {
    pub fn with(mut self, language: &str, name: &str, description: &str) -> Self {
        self.entries.insert(
            language.to_string(),
            Translation {
                name: name.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    /// Resolution is a pure function of the table: the requested language,
    /// then the default, then whatever the table holds first.
    pub fn resolve(&self, requested: &str, default: &str) -> Option<&Translation> {
        self.entries
            .get(requested)
            .or_else(|| self.entries.get(default))
            .or_else(|| self.entries.values().next())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: SystemId,
    pub translations: TranslationSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignRecord {
    pub sign: ZodiacSign,
    pub index: u8,
    pub symbol: String,
    pub element: Element,
    pub modality: Modality,
    pub translations: TranslationSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetRecord {
    pub body: Body,
    pub translations: TranslationSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspectRecord {
    pub kind: AspectKind,
    pub angle: f64,
    pub translations: TranslationSet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseRecord {
    pub number: u8,
    pub translations: TranslationSet,
}

/// The read-only reference store, keyed the way persistence looks things up.
#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
    default_language: String,
    systems: IndexMap<SystemId, SystemRecord>,
    signs: IndexMap<(SystemId, u8), SignRecord>,
    planets: IndexMap<(SystemId, Body), PlanetRecord>,
    aspects: IndexMap<(SystemId, AspectKind), AspectRecord>,
    houses: IndexMap<u8, HouseRecord>,
}

impl CatalogStore {
    /// Seeds the tropical Western system with English records.
    pub fn western() -> Self {
        let mut store = Self {
            default_language: "en".to_string(),
            ..Default::default()
        };

        store.systems.insert(
            WESTERN_TROPICAL,
            SystemRecord {
                id: WESTERN_TROPICAL,
                translations: TranslationSet::default().with(
                    "en",
                    "Western Astrology",
                    "Classical tropical Western astrology",
                ),
            },
        );

        for sign in ZODIAC_SIGNS {
            store.signs.insert(
                (WESTERN_TROPICAL, sign.index()),
                SignRecord {
                    sign,
                    index: sign.index(),
                    symbol: sign.symbol().to_string(),
                    element: sign.element(),
                    modality: sign.modality(),
                    translations: TranslationSet::default().with("en", &sign.to_string(), ""),
                },
            );
        }

        for body in PHYSICAL_BODIES {
            store.planets.insert(
                (WESTERN_TROPICAL, body),
                PlanetRecord {
                    body,
                    translations: TranslationSet::default().with("en", body.name(), ""),
                },
            );
        }

        for kind in AspectKind::MAJOR
            .into_iter()
            .chain(AspectKind::MINOR)
            .chain(AspectKind::DECLINATION)
        {
            store.aspects.insert(
                (WESTERN_TROPICAL, kind),
                AspectRecord {
                    kind,
                    angle: kind.target_angle(),
                    translations: TranslationSet::default().with("en", kind.name(), ""),
                },
            );
        }

        for number in 1..=12u8 {
            store.houses.insert(
                number,
                HouseRecord {
                    number,
                    translations: TranslationSet::default().with(
                        "en",
                        &format!("House {number}"),
                        "",
                    ),
                },
            );
        }

        store
    }

    /// Changes the default language of the fallback chain.
    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn system(&self, id: SystemId) -> Option<&SystemRecord> {
        self.systems.get(&id)
    }

    pub fn sign(&self, system: SystemId, index: u8) -> Option<&SignRecord> {
        self.signs.get(&(system, index))
    }

    pub fn planet(&self, system: SystemId, body: Body) -> Option<&PlanetRecord> {
        self.planets.get(&(system, body))
    }

    pub fn aspect(&self, system: SystemId, kind: AspectKind) -> Option<&AspectRecord> {
        self.aspects.get(&(system, kind))
    }

    /// Aspect record by its exact angle, the way older catalog rows are keyed.
    /// When two kinds share an angle, detection order wins.
    pub fn aspect_by_angle(&self, system: SystemId, angle_deg: f64) -> Option<&AspectRecord> {
        self.aspects
            .iter()
            .find(|((sys, _), record)| {
                *sys == system && (record.angle - angle_deg).abs() < 1e-6
            })
            .map(|(_, record)| record)
    }

    pub fn house(&self, number: u8) -> Option<&HouseRecord> {
        self.houses.get(&number)
    }

    /// Resolves a translation set in the requested language with the standard
    /// fallback chain.
    pub fn translate<'a>(
        &self,
        set: &'a TranslationSet,
        language: &str,
    ) -> Option<&'a Translation> {
        set.resolve(language, &self.default_language)
    }
}

#[cfg(test)]
mod catalog_ut {
    use super::*;

    #[test]
    fn western_seed_is_complete() {
        let store = CatalogStore::western();
        assert!(store.system(WESTERN_TROPICAL).is_some());
        assert!(store.system(99).is_none());

        for index in 1..=12 {
            assert!(store.sign(WESTERN_TROPICAL, index).is_some());
        }
        assert!(store.sign(WESTERN_TROPICAL, 13).is_none());

        for body in PHYSICAL_BODIES {
            assert!(store.planet(WESTERN_TROPICAL, body).is_some());
        }
        for number in 1..=12 {
            assert!(store.house(number).is_some());
        }
        assert!(store.aspect(WESTERN_TROPICAL, AspectKind::Trine).is_some());
    }

    #[test]
    fn translation_fallback_chain() {
        let set = TranslationSet::default()
            .with("en", "Sun", "the luminary")
            .with("tr", "Gunes", "isik veren");

        // Requested language wins.
        assert_eq!(set.resolve("tr", "en").unwrap().name, "Gunes");
        // Unknown requested language falls back to the default.
        assert_eq!(set.resolve("de", "en").unwrap().name, "Sun");
        // Unknown default falls back to any entry.
        assert_eq!(set.resolve("de", "fr").unwrap().name, "Sun");

        let empty = TranslationSet::default();
        assert!(empty.resolve("en", "en").is_none());
    }

    #[test]
    fn aspect_lookup_by_angle() {
        let store = CatalogStore::western();
        let trine = store.aspect_by_angle(WESTERN_TROPICAL, 120.0).unwrap();
        assert_eq!(trine.kind, AspectKind::Trine);
        assert!(store.aspect_by_angle(WESTERN_TROPICAL, 33.3).is_none());
    }
}
