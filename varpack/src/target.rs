use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::host::SceneNode;

/// Encoding requested from the host for the primary rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Raster,
    Vector,
}

impl OutputFormat {
    /// Tag used in archive names and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Raster => "Raster",
            OutputFormat::Vector => "Vector",
        }
    }

    /// Token appended to every file name, e.g. `ICON32_PNG.png`.
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Raster => "PNG",
            OutputFormat::Vector => "SVG",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Raster => "png",
            OutputFormat::Vector => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown output format `{0}` (expected raster or vector)")]
pub struct ParseFormatError(String);

impl FromStr for OutputFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raster" | "png" => Ok(OutputFormat::Raster),
            "vector" | "svg" => Ok(OutputFormat::Vector),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Which rendering of a target a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The target at 1× in the current output format.
    Primary,
    /// A 4× raster rendering of a 32 px target, exported as size 128.
    Upscaled128,
}

/// Size label a target must carry to get an upscaled companion.
pub const UPSCALE_SOURCE_SIZE: &str = "32";
/// Size label written for the upscaled companion.
pub const UPSCALED_SIZE: &str = "128";
/// Scale factor from 32 to 128.
pub const UPSCALE_FACTOR: f32 = 4.0;
/// Size label omitted from file names unless asked for.
pub const IMPLICIT_SIZE: &str = "24";

/// User-adjustable export preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub include_size_24: bool,
    #[serde(rename = "upscaleTo128")]
    pub upscale_128: bool,
    pub output_format: OutputFormat,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            include_size_24: false,
            upscale_128: true,
            output_format: OutputFormat::Raster,
        }
    }
}

/// One exportable unit, derived from a selected node.
#[derive(Debug, Clone)]
pub struct Target<N: SceneNode> {
    /// Rendering handle. For instances this is the instance itself.
    pub node: N,
    /// Identity used for deduplication and cache keys.
    pub key: N::Id,
    pub base_name: String,
    pub size: String,
    pub path_segments: Vec<String>,
}

impl<N: SceneNode> Target<N> {
    /// Whether this target gets an additional 128 px rendering.
    pub fn wants_upscale(&self, prefs: &Preferences) -> bool {
        prefs.output_format == OutputFormat::Raster
            && prefs.upscale_128
            && self.size == UPSCALE_SOURCE_SIZE
    }
}
