#![doc = include_str!("../README.md")]
/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate hifitime;
extern crate log;

pub mod aspects;
pub mod catalog;
pub mod chart;
pub mod composite;
pub mod constants;
pub mod ephemeris;
pub mod errors;
pub mod frames;
pub mod houses;
pub mod math;
pub mod naif;
pub mod natal;
pub mod timeforms;

/// Re-export of hifitime
pub mod time {
    pub use core::str::FromStr;
    pub use hifitime::*;
}

pub mod prelude {
    pub use crate::aspects::{Aspect, AspectKind, AspectNature};
    pub use crate::chart::{Chart, ChartId, ChartInput};
    pub use crate::ephemeris::Ephemeris;
    pub use crate::errors::{ChartError, InputOutputError};
    pub use crate::houses::{HouseCusps, HouseSystem};
    pub use crate::natal::{Body, BodyState, Location, ZodiacSign};
    pub use crate::time::*;
    pub use std::fs::File;
}

/// Defines the number of bytes in a double (prevents magic numbers)
pub(crate) const DBL_SIZE: usize = 8;

/// NAIF integer identifier of an ephemeris target or center.
pub type NaifId = i32;

/// Memory maps a file and **copies** the data on the heap prior to returning a pointer to this heap data.
#[macro_export]
macro_rules! file2heap {
    ($filename:tt) => {
        match File::open($filename) {
            Err(e) => Err(InputOutputError::IOError { kind: e.kind() }),
            Ok(file) => unsafe {
                use bytes::Bytes;
                use memmap2::MmapOptions;
                match MmapOptions::new().map(&file) {
                    Err(_) => Err(InputOutputError::IOUnknownError),
                    Ok(mmap) => {
                        let bytes = Bytes::copy_from_slice(&mmap);
                        Ok(bytes)
                    }
                }
            },
        }
    };
}
