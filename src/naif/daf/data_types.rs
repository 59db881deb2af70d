/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use core::fmt;

use super::DAFError;

/// SPK segment data types, as declared in the segment summaries.
///
/// The DE-series planetary ephemerides only carry Type 2 segments; the other
/// discriminants exist so an unexpected file reports what it actually holds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum DataType {
    Type1ModifiedDifferenceArray = 1,
    Type2ChebyshevTriplet = 2,
    Type3ChebyshevSextuplet = 3,
    Type5DiscreteStates = 5,
    Type8LagrangeEqualStep = 8,
    Type9LagrangeUnequalStep = 9,
    Type12HermiteEqualStep = 12,
    Type13HermiteUnequalStep = 13,
    Type14ChebyshevUnequalStep = 14,
    Type21ExtendedModifiedDifferenceArray = 21,
}

impl TryFrom<i32> for DataType {
    type Error = DAFError;

    fn try_from(id: i32) -> Result<DataType, Self::Error> {
        match id {
            1 => Ok(DataType::Type1ModifiedDifferenceArray),
            2 => Ok(DataType::Type2ChebyshevTriplet),
            3 => Ok(DataType::Type3ChebyshevSextuplet),
            5 => Ok(DataType::Type5DiscreteStates),
            8 => Ok(DataType::Type8LagrangeEqualStep),
            9 => Ok(DataType::Type9LagrangeUnequalStep),
            12 => Ok(DataType::Type12HermiteEqualStep),
            13 => Ok(DataType::Type13HermiteUnequalStep),
            14 => Ok(DataType::Type14ChebyshevUnequalStep),
            21 => Ok(DataType::Type21ExtendedModifiedDifferenceArray),
            _ => Err(DAFError::Datatype {
                id,
                kind: "unknown data type",
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DataType::Type1ModifiedDifferenceArray => "Modified differences",
                DataType::Type2ChebyshevTriplet => "Chebyshev Triplet",
                DataType::Type3ChebyshevSextuplet => "Chebyshev Sextuplet",
                DataType::Type5DiscreteStates => "Discrete States",
                DataType::Type8LagrangeEqualStep => "Lagrange EqualStep",
                DataType::Type9LagrangeUnequalStep => "Lagrange UnequalStep",
                DataType::Type12HermiteEqualStep => "Hermite Equal Step",
                DataType::Type13HermiteUnequalStep => "Hermite Unequal Step",
                DataType::Type14ChebyshevUnequalStep => "Chebyshev UnequalStep",
                DataType::Type21ExtendedModifiedDifferenceArray =>
                    "Extended Modified Difference Array",
            }
        )
    }
}

#[cfg(test)]
mod ut_datatype {
    use super::*;

    #[test]
    fn try_from_round_trip() {
        assert_eq!(
            DataType::try_from(2).unwrap(),
            DataType::Type2ChebyshevTriplet
        );
        assert_eq!(
            DataType::try_from(13).unwrap(),
            DataType::Type13HermiteUnequalStep
        );
        assert!(DataType::try_from(0).is_err());
        assert!(DataType::try_from(22).is_err());
    }
}
