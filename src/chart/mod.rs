/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The chart facade: one entry point that runs the natal, house and aspect
//! calculators, derives the lunar phase, and materializes an immutable chart
//! record addressable by an opaque identity.

use core::fmt;

use hifitime::Epoch;
use log::warn;
use serde_derive::{Deserialize, Serialize};

use crate::aspects::{self, Aspect, AspectKind, AspectOptions, SynastryAspect};
use crate::aspects::compatibility::{self, CompatibilityScore};
use crate::catalog::{CatalogStore, SystemId, WESTERN_TROPICAL};
use crate::composite;
use crate::ephemeris::Ephemeris;
use crate::errors::{ChartError, ChartResult};
use crate::frames;
use crate::houses::{self, HouseCusps, HouseSystem};
use crate::natal::{self, Body, BodyStates, Location, LunarPhase, ZodiacSign};

/// Opaque chart identity, derived from the CRC32 of the canonical serialized
/// record: the same inputs against the same ephemeris yield the same id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartId(pub u32);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{:08x}", self.0)
    }
}

/// Anomalies that degraded a computation without failing it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartWarnings {
    /// The requested house system diverged and Whole-Sign cusps were used.
    #[serde(default)]
    pub polar_degeneracy: bool,
    /// The lunar nodes are best-effort placeholders.
    #[serde(default)]
    pub estimated_nodes: bool,
}

/// Inputs to a chart generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartInput {
    /// Owning user reference, metadata only.
    pub user: Option<String>,
    pub name: String,
    /// Birth instant, UTC.
    pub epoch: Epoch,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub place: String,
    pub system: SystemId,
    pub house_system: HouseSystem,
}

impl ChartInput {
    pub fn new(name: &str, epoch: Epoch, latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            user: None,
            name: name.to_string(),
            epoch,
            latitude_deg,
            longitude_deg,
            place: String::new(),
            system: WESTERN_TROPICAL,
            house_system: HouseSystem::default(),
        }
    }
}

/// The serialized computation record, the persisted blob of a chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub planet_positions: BodyStates,
    pub houses: HouseCusps,
    pub aspects: Vec<Aspect>,
    pub lunar_phase: LunarPhase,
}

impl ChartData {
    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string(self).map_err(|e| ChartError::Serialization { err: e.to_string() })
    }

    pub fn from_json(blob: &str) -> ChartResult<Self> {
        serde_json::from_str(blob).map_err(|e| ChartError::Serialization { err: e.to_string() })
    }
}

/// A generated natal chart. Immutable once generated; it owns its computed
/// tables by value and its children reference it only through [`ChartId`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: ChartId,
    pub user: Option<String>,
    pub name: String,
    pub epoch: Epoch,
    pub location: Location,
    pub place: String,
    pub system: SystemId,
    pub house_system: HouseSystem,
    pub bodies: BodyStates,
    pub houses: HouseCusps,
    pub aspects: Vec<Aspect>,
    pub lunar_phase: LunarPhase,
    pub ascendant_sign: ZodiacSign,
    pub midheaven_sign: ZodiacSign,
    pub warnings: ChartWarnings,
}

impl Chart {
    /// Generates the full chart: body states, cusps, aspects, lunar phase.
    ///
    /// The astrological system must exist in the catalog (the default is the
    /// tropical Western system); coordinates are validated up front.
    pub fn generate(
        eph: &Ephemeris,
        catalog: &CatalogStore,
        input: ChartInput,
    ) -> ChartResult<Chart> {
        let location = Location::new(input.latitude_deg, input.longitude_deg)?;

        if catalog.system(input.system).is_none() {
            return Err(ChartError::UnknownSystem { id: input.system });
        }

        let bodies = natal::body_states(eph, input.epoch, location)?;

        let ramc = frames::ramc_deg(input.epoch, location.longitude_deg);
        let obliquity = frames::mean_obliquity_deg(input.epoch);
        let houses = houses::compute(
            input.house_system,
            ramc,
            obliquity,
            location.latitude_deg,
        );

        let aspects = aspects::detect(&bodies, &AspectOptions::default());

        let lunar_phase = LunarPhase::from_longitudes(
            bodies[&Body::Sun].longitude,
            bodies[&Body::Moon].longitude,
        );

        let ascendant_sign = bodies[&Body::Ascendant].sign;
        let midheaven_sign = bodies[&Body::Midheaven].sign;

        let warnings = ChartWarnings {
            polar_degeneracy: houses.polar_degeneracy,
            estimated_nodes: bodies[&Body::NorthNode].estimated,
        };

        let data = ChartData {
            planet_positions: bodies.clone(),
            houses,
            aspects: aspects.clone(),
            lunar_phase,
        };

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(data.to_json()?.as_bytes());
        hasher.update(
            format!(
                "{}|{}|{}|{}|{}",
                input.epoch, location.latitude_deg, location.longitude_deg, input.system,
                input.house_system
            )
            .as_bytes(),
        );
        let id = ChartId(hasher.finalize());

        Ok(Chart {
            id,
            user: input.user,
            name: input.name,
            epoch: input.epoch,
            location,
            place: input.place,
            system: input.system,
            house_system: input.house_system,
            bodies,
            houses,
            aspects,
            lunar_phase,
            ascendant_sign,
            midheaven_sign,
            warnings,
        })
    }

    /// The persisted computation record.
    pub fn data(&self) -> ChartData {
        ChartData {
            planet_positions: self.bodies.clone(),
            houses: self.houses,
            aspects: self.aspects.clone(),
            lunar_phase: self.lunar_phase,
        }
    }

    /// Serializes the computation record as the self-describing blob.
    pub fn to_blob(&self) -> ChartResult<String> {
        self.data().to_json()
    }

    /// House number of each charted body, in canonical order.
    pub fn house_assignments(&self) -> Vec<(Body, u8)> {
        self.bodies
            .iter()
            .map(|(body, state)| (*body, self.houses.house_of(state.longitude)))
            .collect()
    }

    /// Catalog-linked relation rows for persistence. A missing catalog row
    /// skips only that relation and logs the miss; the numeric chart data is
    /// unaffected.
    pub fn relations(&self, catalog: &CatalogStore) -> ChartRelations {
        let mut relations = ChartRelations::default();

        for (body, state) in &self.bodies {
            // Derived points carry no planet row; their numeric data stays in
            // the blob, only the catalog-linked relations are skipped.
            if catalog.planet(self.system, *body).is_none() {
                warn!(
                    "catalog miss: planet {body} in system {}, skipping relations",
                    self.system
                );
                continue;
            }

            match catalog.sign(self.system, state.sign.index()) {
                Some(sign) => relations.planets_in_signs.push(PlanetInSignRow {
                    chart: self.id,
                    body: *body,
                    sign_index: sign.index,
                    degree: state.degree_in_sign,
                    retrograde: state.retrograde,
                }),
                None => warn!(
                    "catalog miss: sign {} in system {}, skipping relation",
                    state.sign, self.system
                ),
            }

            match catalog.house(self.houses.house_of(state.longitude)) {
                Some(house) => relations.planets_in_houses.push(PlanetInHouseRow {
                    chart: self.id,
                    body: *body,
                    house: house.number,
                    longitude: state.longitude,
                }),
                None => warn!("catalog miss: house for {body}, skipping relation"),
            }
        }

        for aspect in &self.aspects {
            match catalog.aspect(self.system, aspect.kind) {
                Some(record) => relations.aspect_links.push(AspectRow {
                    chart: self.id,
                    body_a: aspect.body_a,
                    body_b: aspect.body_b,
                    kind: record.kind,
                    orb: aspect.orb,
                    applying: aspect.applying,
                    exact: aspect.exact,
                    separating: aspect.separating,
                }),
                None => warn!(
                    "catalog miss: aspect {} in system {}, skipping relation",
                    aspect.kind, self.system
                ),
            }
        }

        relations
    }
}

/// Persistable relation rows. Children carry the chart identity, never a
/// pointer back into the chart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRelations {
    pub planets_in_signs: Vec<PlanetInSignRow>,
    pub planets_in_houses: Vec<PlanetInHouseRow>,
    pub aspect_links: Vec<AspectRow>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetInSignRow {
    pub chart: ChartId,
    pub body: Body,
    pub sign_index: u8,
    pub degree: f64,
    pub retrograde: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetInHouseRow {
    pub chart: ChartId,
    pub body: Body,
    pub house: u8,
    pub longitude: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspectRow {
    pub chart: ChartId,
    pub body_a: Body,
    pub body_b: Body,
    pub kind: AspectKind,
    pub orb: f64,
    pub applying: bool,
    pub exact: bool,
    pub separating: bool,
}

/// Two-chart compatibility: synastry aspects, weighted scores, and the
/// composite midpoint chart with its own aspects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub chart1_id: ChartId,
    pub chart2_id: ChartId,
    pub scores: CompatibilityScore,
    pub synastry_aspects: Vec<SynastryAspect>,
    pub composite_positions: BodyStates,
    pub composite_aspects: Vec<Aspect>,
}

/// Builds the full compatibility report for two generated charts.
pub fn compatibility(chart1: &Chart, chart2: &Chart) -> CompatibilityReport {
    let synastry_aspects = aspects::synastry(&chart1.bodies, &chart2.bodies, None);
    let scores = compatibility::score(&synastry_aspects);

    let composite_positions = composite::composite_positions(&chart1.bodies, &chart2.bodies);
    let composite_aspects = composite::composite_aspects(&composite_positions);

    CompatibilityReport {
        chart1_id: chart1.id,
        chart2_id: chart2.id,
        scores,
        synastry_aspects,
        composite_positions,
        composite_aspects,
    }
}
