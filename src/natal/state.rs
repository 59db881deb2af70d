/*
 * Astrocore
 * Copyright (C) 2024-onward Astrocore contributors
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use core::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::math::angles::between_0_360;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

/// The twelve tropical signs, indexed 1..=12 from Aries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

pub const ZODIAC_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    /// 1-based index, Aries = 1.
    pub const fn index(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_index(index: u8) -> Option<Self> {
        if (1..=12).contains(&index) {
            Some(ZODIAC_SIGNS[(index - 1) as usize])
        } else {
            None
        }
    }

    /// Sign containing this ecliptic longitude, with the degree inside the sign.
    pub fn from_longitude(longitude_deg: f64) -> (Self, f64) {
        let lon = between_0_360(longitude_deg);
        let idx = (lon / 30.0) as usize % 12;
        (ZODIAC_SIGNS[idx], lon % 30.0)
    }

    /// Longitude at which this sign begins.
    pub fn start_longitude(self) -> f64 {
        f64::from(self as u8) * 30.0
    }

    pub const fn element(self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }

    pub const fn modality(self) -> Modality {
        match self {
            ZodiacSign::Aries | ZodiacSign::Cancer | ZodiacSign::Libra | ZodiacSign::Capricorn => {
                Modality::Cardinal
            }
            ZodiacSign::Taurus | ZodiacSign::Leo | ZodiacSign::Scorpio | ZodiacSign::Aquarius => {
                Modality::Fixed
            }
            ZodiacSign::Gemini
            | ZodiacSign::Virgo
            | ZodiacSign::Sagittarius
            | ZodiacSign::Pisces => Modality::Mutable,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "\u{2648}",
            ZodiacSign::Taurus => "\u{2649}",
            ZodiacSign::Gemini => "\u{264a}",
            ZodiacSign::Cancer => "\u{264b}",
            ZodiacSign::Leo => "\u{264c}",
            ZodiacSign::Virgo => "\u{264d}",
            ZodiacSign::Libra => "\u{264e}",
            ZodiacSign::Scorpio => "\u{264f}",
            ZodiacSign::Sagittarius => "\u{2650}",
            ZodiacSign::Capricorn => "\u{2651}",
            ZodiacSign::Aquarius => "\u{2652}",
            ZodiacSign::Pisces => "\u{2653}",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        };
        write!(f, "{name}")
    }
}

/// Full computed state of a charted body at an instant.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Apparent ecliptic-of-date longitude in [0, 360).
    pub longitude: f64,
    /// Ecliptic latitude, degrees.
    pub latitude: f64,
    /// Declination, degrees.
    pub declination: f64,
    /// Right ascension, degrees.
    pub right_ascension: f64,
    /// Signed longitude rate in degrees per day; negative when retrograde.
    pub daily_motion: f64,
    /// Signed declination rate in degrees per day.
    pub declination_motion: f64,
    pub retrograde: bool,
    pub sign: ZodiacSign,
    /// Degree inside the sign, in [0, 30).
    pub degree_in_sign: f64,
    /// Set when the value is a best-effort placeholder (e.g. a degenerate node).
    #[serde(default)]
    pub estimated: bool,
    /// Set on midpoint-chart entries.
    #[serde(default)]
    pub is_composite: bool,
}

impl BodyState {
    /// A state carrying only a longitude, for synthetic and midpoint tables.
    pub fn from_longitude(longitude_deg: f64) -> Self {
        let lon = between_0_360(longitude_deg);
        let (sign, degree_in_sign) = ZodiacSign::from_longitude(lon);
        Self {
            longitude: lon,
            latitude: 0.0,
            declination: 0.0,
            right_ascension: 0.0,
            daily_motion: 0.0,
            declination_motion: 0.0,
            retrograde: false,
            sign,
            degree_in_sign,
            estimated: false,
            is_composite: false,
        }
    }

    pub fn with_daily_motion(mut self, motion: f64) -> Self {
        self.daily_motion = motion;
        self.retrograde = motion < 0.0;
        self
    }
}

/// The eight named lunar phases.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Phase for a Moon-minus-Sun elongation in [0, 360).
    pub fn from_angle(angle_deg: f64) -> Self {
        match between_0_360(angle_deg) {
            a if a < 45.0 => MoonPhase::NewMoon,
            a if a < 90.0 => MoonPhase::WaxingCrescent,
            a if a < 135.0 => MoonPhase::FirstQuarter,
            a if a < 180.0 => MoonPhase::WaxingGibbous,
            a if a < 225.0 => MoonPhase::FullMoon,
            a if a < 270.0 => MoonPhase::WaningGibbous,
            a if a < 315.0 => MoonPhase::LastQuarter,
            _ => MoonPhase::WaningCrescent,
        }
    }
}

/// Moon-Sun elongation classified into a named phase with a continuous fraction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LunarPhase {
    /// Moon longitude minus Sun longitude, in [0, 360).
    pub angle: f64,
    /// 0 at new moon, 100 at full moon, back to 0 as the cycle closes.
    pub percent: f64,
    pub phase: MoonPhase,
    pub waxing: bool,
    pub waning: bool,
}

impl LunarPhase {
    pub fn from_longitudes(sun_longitude: f64, moon_longitude: f64) -> Self {
        let angle = between_0_360(moon_longitude - sun_longitude);
        let percent = if angle <= 180.0 {
            angle / 180.0 * 100.0
        } else {
            (360.0 - angle) / 180.0 * 100.0
        };
        Self {
            angle,
            percent,
            phase: MoonPhase::from_angle(angle),
            waxing: angle <= 180.0,
            waning: angle > 180.0,
        }
    }
}

#[cfg(test)]
mod state_ut {
    use super::*;

    #[test]
    fn sign_from_longitude() {
        assert_eq!(
            ZodiacSign::from_longitude(0.0),
            (ZodiacSign::Aries, 0.0)
        );
        let (sign, deg) = ZodiacSign::from_longitude(29.9999);
        assert_eq!(sign, ZodiacSign::Aries);
        assert!(deg < 30.0);
        assert_eq!(ZodiacSign::from_longitude(30.0).0, ZodiacSign::Taurus);
        assert_eq!(ZodiacSign::from_longitude(359.999).0, ZodiacSign::Pisces);
        assert_eq!(ZodiacSign::from_longitude(-10.0).0, ZodiacSign::Pisces);
    }

    #[test]
    fn sign_indices_are_one_based() {
        assert_eq!(ZodiacSign::Aries.index(), 1);
        assert_eq!(ZodiacSign::Pisces.index(), 12);
        assert_eq!(ZodiacSign::from_index(5), Some(ZodiacSign::Leo));
        assert_eq!(ZodiacSign::from_index(0), None);
        assert_eq!(ZodiacSign::from_index(13), None);
    }

    #[test]
    fn elements_and_modalities() {
        assert_eq!(ZodiacSign::Leo.element(), Element::Fire);
        assert_eq!(ZodiacSign::Leo.modality(), Modality::Fixed);
        assert_eq!(ZodiacSign::Capricorn.element(), Element::Earth);
        assert_eq!(ZodiacSign::Capricorn.modality(), Modality::Cardinal);
        assert_eq!(ZodiacSign::Pisces.modality(), Modality::Mutable);
    }

    #[test]
    fn lunar_phase_bins() {
        let full = LunarPhase::from_longitudes(10.0, 190.0);
        assert_eq!(full.phase, MoonPhase::FullMoon);
        assert!((full.percent - 100.0).abs() < 1e-12);

        let new = LunarPhase::from_longitudes(100.0, 100.0);
        assert_eq!(new.phase, MoonPhase::NewMoon);
        assert!(new.percent.abs() < 1e-12);
        assert!(new.waxing);

        let waning = LunarPhase::from_longitudes(0.0, 300.0);
        assert_eq!(waning.phase, MoonPhase::LastQuarter);
        assert!(waning.waning);
    }
}
