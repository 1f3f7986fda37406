//! Ink vocabulary: the closed set of tint colors and the blend modes the
//! compositor understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tint applied to a signature placement.
///
/// `Black` keeps the source artwork untouched; every other value recolors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    #[default]
    Black,
    Blue,
    Red,
    Green,
}

impl InkColor {
    /// All selectable colors, in palette order.
    pub const ALL: [InkColor; 4] = [
        InkColor::Black,
        InkColor::Blue,
        InkColor::Red,
        InkColor::Green,
    ];

    /// RGB value of the tint.
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::Blue => [18, 62, 182],
            Self::Red => [196, 30, 40],
            Self::Green => [22, 128, 56],
        }
    }

    /// True when the source image must be recolored.
    pub fn needs_recolor(&self) -> bool {
        !matches!(self, Self::Black)
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::Blue => write!(f, "blue"),
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
        }
    }
}

impl FromStr for InkColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "blue" => Ok(Self::Blue),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            _ => Err(format!("Unknown ink color: {}", s)),
        }
    }
}

/// How stamped artwork is combined with the page underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Plain source-over compositing.
    #[default]
    Normal,
    /// Multiply, which darkens like ink soaking into paper.
    Multiply,
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Multiply => write!(f, "multiply"),
        }
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "source-over" => Ok(Self::Normal),
            "multiply" => Ok(Self::Multiply),
            _ => Err(format!("Unknown blend mode: {}", s)),
        }
    }
}
