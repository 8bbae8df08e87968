use std::fmt;
use std::str::FromStr;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::PlotError;

const SET2: [(u8, u8, u8); 8] = [
    (0x66, 0xc2, 0xa5),
    (0xfc, 0x8d, 0x62),
    (0x8d, 0xa0, 0xcb),
    (0xe7, 0x8a, 0xc3),
    (0xa6, 0xd8, 0x54),
    (0xff, 0xd9, 0x2f),
    (0xe5, 0xc4, 0x94),
    (0xb3, 0xb3, 0xb3),
];

const SPECTRAL: [(u8, u8, u8); 11] = [
    (0x9e, 0x01, 0x42),
    (0xd5, 0x3e, 0x4f),
    (0xf4, 0x6d, 0x43),
    (0xfd, 0xae, 0x61),
    (0xfe, 0xe0, 0x8b),
    (0xff, 0xff, 0xbf),
    (0xe6, 0xf5, 0x98),
    (0xab, 0xdd, 0xa4),
    (0x66, 0xc2, 0xa5),
    (0x32, 0x88, 0xbd),
    (0x5e, 0x4f, 0xa2),
];

const REDS: [(u8, u8, u8); 9] = [
    (0xff, 0xf5, 0xf0),
    (0xfe, 0xe0, 0xd2),
    (0xfc, 0xbb, 0xa1),
    (0xfc, 0x92, 0x72),
    (0xfb, 0x6a, 0x4a),
    (0xef, 0x3b, 0x2c),
    (0xcb, 0x18, 0x1d),
    (0xa5, 0x0f, 0x15),
    (0x67, 0x00, 0x0d),
];

/// Named colour palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    Set2,
    Spectral,
    Reds,
}

fn interpolate(stops: &[(u8, u8, u8)], t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (stops.len() - 1) as f64;
    let lo = (pos.floor() as usize).min(stops.len() - 1);
    let hi = (lo + 1).min(stops.len() - 1);
    let frac = pos - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (stops[lo], stops[hi]);
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

impl Palette {
    /// Colour of the `i`-th of `n` categories.
    ///
    /// Qualitative palettes cycle; continuous ones are sampled at evenly
    /// spaced interior points.
    pub fn color(&self, i: usize, n: usize) -> RGBColor {
        match self {
            Palette::Set2 => {
                let (r, g, b) = SET2[i % SET2.len()];
                RGBColor(r, g, b)
            }
            Palette::Spectral | Palette::Reds => {
                let t = (i + 1) as f64 / (n.max(1) + 1) as f64;
                self.at(t)
            }
        }
    }

    /// Continuous colour at `t` in `[0, 1]`.
    pub fn at(&self, t: f64) -> RGBColor {
        match self {
            Palette::Set2 => interpolate(&SET2, t),
            Palette::Spectral => interpolate(&SPECTRAL, t),
            Palette::Reds => interpolate(&REDS, t),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Set2 => "Set2",
            Palette::Spectral => "Spectral",
            Palette::Reds => "Reds",
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Set2" => Ok(Palette::Set2),
            "Spectral" => Ok(Palette::Spectral),
            "Reds" => Ok(Palette::Reds),
            other => Err(PlotError::UnknownPalette(other.to_string())),
        }
    }
}
