/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use hifitime::Epoch;
use log::info;
use snafu::prelude::*;

use crate::constants::{naif_ids, AU_KM, SECONDS_PER_DAY};
use crate::errors::{ChartResult, EphemerisSnafu};
use crate::math::interpolation::InterpolationError;
use crate::math::Vector3;
use crate::naif::daf::datatypes::Type2ChebyshevSet;
use crate::naif::daf::{DAFError, DafDataType, NAIFDataSet, NAIFSummaryRecord};
use crate::naif::SPK;
use crate::natal::Body;
use crate::NaifId;

#[cfg(feature = "fetch")]
mod fetch;

/// How many parent hops a target may be away from the solar system barycenter.
/// The DE chains are at most two deep (body -> barycenter -> SSB).
const MAX_CHAIN_DEPTH: usize = 8;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub))]
pub enum EphemerisError {
    /// Somehow you've entered code that should not be reachable, please file a bug.
    Unreachable,
    #[snafu(display("when {action} caused {source}"))]
    SPK {
        action: &'static str,
        #[snafu(backtrace)]
        source: DAFError,
    },
    #[snafu(display("during an ephemeris interpolation {source}"))]
    EphemInterpolation {
        #[snafu(backtrace)]
        source: InterpolationError,
    },
    #[snafu(display("{body:?} is a derived point, not an ephemeris target"))]
    DerivedBody { body: Body },
    #[snafu(display("chain from {id} to the solar system barycenter exceeds {depth} hops"))]
    ChainTooDeep { id: NaifId, depth: usize },
}

/// A loaded DE-series planetary ephemeris.
///
/// The provider is immutable after load and cheap to clone (the file image is
/// reference counted), so it can be shared freely across threads. Loading the
/// same file twice yields an identical provider.
#[derive(Clone)]
pub struct Ephemeris {
    spk: SPK,
    path: String,
}

impl Ephemeris {
    /// Loads the SPK file at the provided path.
    pub fn load(path: &str) -> ChartResult<Self> {
        let spk = SPK::load(path)
            .map_err(|source| EphemerisError::SPK {
                action: "loading ephemeris file",
                source,
            })
            .context(EphemerisSnafu {
                action: "initializing provider",
            })?;

        info!("loaded DAF/SPK ephemeris from {path}");

        Ok(Self {
            spk,
            path: path.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// CRC32 of the loaded file image.
    pub fn crc32(&self) -> u32 {
        self.spk.crc32()
    }

    /// Returns the ET epoch span over which every loaded segment has data.
    pub fn coverage(&self) -> Result<(Epoch, Epoch), EphemerisError> {
        let summaries = self.spk.data_summaries().map_err(|source| {
            EphemerisError::SPK {
                action: "reading summaries for coverage",
                source,
            }
        })?;

        let mut iter = summaries.iter();
        let first = iter.next().ok_or(EphemerisError::SPK {
            action: "reading summaries for coverage",
            source: DAFError::NoDAFLoaded { kind: "SPK" },
        })?;

        let mut start = first.start_epoch();
        let mut end = first.end_epoch();
        for summary in iter {
            if summary.start_epoch() > start {
                start = summary.start_epoch();
            }
            if summary.end_epoch() < end {
                end = summary.end_epoch();
            }
        }
        Ok((start, end))
    }

    /// Evaluates the segment for this target at this epoch, returning the state
    /// with respect to the segment center and the center's NAIF ID.
    fn eval_segment(
        &self,
        id: NaifId,
        epoch: Epoch,
    ) -> Result<(Vector3, Vector3, NaifId), EphemerisError> {
        let (summary, idx) = self
            .spk
            .summary_from_id_at_epoch(id, epoch)
            .map_err(|source| EphemerisError::SPK {
                action: "searching for SPK summary",
                source,
            })?;

        let center = summary.center_id;

        match summary.data_type()? {
            DafDataType::Type2ChebyshevTriplet => {
                let data = self
                    .spk
                    .nth_data::<Type2ChebyshevSet>(idx)
                    .map_err(|source| EphemerisError::SPK {
                        action: "fetching data for interpolation",
                        source,
                    })?;
                let (pos_km, vel_km_s) = data
                    .evaluate(epoch, summary)
                    .context(EphemInterpolationSnafu)?;
                Ok((pos_km, vel_km_s, center))
            }
            dtype => Err(EphemerisError::SPK {
                action: "evaluating segment",
                source: DAFError::UnsupportedDatatype {
                    dtype,
                    kind: "SPK computations",
                },
            }),
        }
    }

    /// State of the target with respect to the solar system barycenter, in km and km/s (J2000 frame).
    pub fn state_wrt_ssb(
        &self,
        id: NaifId,
        epoch: Epoch,
    ) -> Result<(Vector3, Vector3), EphemerisError> {
        let mut pos_km = Vector3::zeros();
        let mut vel_km_s = Vector3::zeros();
        let mut current = id;

        for _ in 0..MAX_CHAIN_DEPTH {
            if current == naif_ids::SOLAR_SYSTEM_BARYCENTER {
                return Ok((pos_km, vel_km_s));
            }
            let (p, v, center) = self.eval_segment(current, epoch)?;
            pos_km += p;
            vel_km_s += v;
            current = center;
        }

        Err(EphemerisError::ChainTooDeep {
            id,
            depth: MAX_CHAIN_DEPTH,
        })
    }

    /// Geocentric state of the provided body in km and km/s, J2000 (ICRS-aligned) frame.
    pub fn geocentric_state_km(
        &self,
        body: Body,
        epoch: Epoch,
    ) -> Result<(Vector3, Vector3), EphemerisError> {
        let id = body.naif_id().ok_or(EphemerisError::DerivedBody { body })?;

        let (earth_pos, earth_vel) = self.state_wrt_ssb(naif_ids::EARTH, epoch)?;
        let (body_pos, body_vel) = self.state_wrt_ssb(id, epoch)?;

        Ok((body_pos - earth_pos, body_vel - earth_vel))
    }

    /// Geocentric position and velocity of the provided body in AU and AU/day.
    pub fn position_velocity(
        &self,
        body: Body,
        epoch: Epoch,
    ) -> Result<(Vector3, Vector3), EphemerisError> {
        let (pos_km, vel_km_s) = self.geocentric_state_km(body, epoch)?;
        Ok((
            pos_km / AU_KM,
            vel_km_s * (SECONDS_PER_DAY / AU_KM),
        ))
    }
}

impl std::fmt::Debug for Ephemeris {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ephemeris({}, crc32 {:x})", self.path, self.spk.crc32_checksum)
    }
}
