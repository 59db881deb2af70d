/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fs::{create_dir_all, File};
use std::io;
use std::path::Path;

use log::info;

use crate::errors::{ChartError, ChartResult, InputOutputError};

use super::Ephemeris;

/// Short-precision DE440 ephemeris, 1849-2150, about 32 MB.
const DE440S_URL: &str =
    "https://naif.jpl.nasa.gov/pub/naif/generic_kernels/spk/planets/de440s.bsp";
const DE440S_FILENAME: &str = "de440s.bsp";

impl Ephemeris {
    /// Loads `de440s.bsp` from the provided data directory, downloading it
    /// from the NAIF archive first if it is not there yet.
    pub fn load_or_fetch(data_dir: &str) -> ChartResult<Self> {
        let path = Path::new(data_dir).join(DE440S_FILENAME);
        if !path.exists() {
            info!("downloading {DE440S_URL} into {data_dir}");
            fetch_to(data_dir, &path)?;
        }

        let path_str = path.to_string_lossy();
        Self::load(&path_str)
    }
}

fn fetch_to(data_dir: &str, path: &Path) -> ChartResult<()> {
    let as_loading_err = |e: io::Error| ChartError::Loading {
        path: path.to_string_lossy().to_string(),
        source: InputOutputError::IOError { kind: e.kind() },
    };

    create_dir_all(data_dir).map_err(as_loading_err)?;

    let resp = ureq::get(DE440S_URL)
        .call()
        .map_err(|_| ChartError::Loading {
            path: DE440S_URL.to_string(),
            source: InputOutputError::IOUnknownError,
        })?;

    let mut reader = resp.into_reader();
    let mut file = File::create(path).map_err(as_loading_err)?;
    io::copy(&mut reader, &mut file).map_err(as_loading_err)?;

    info!("ephemeris stored at {}", path.display());
    Ok(())
}
