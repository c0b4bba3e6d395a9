//! Render modes and render results

use std::fmt;
use std::str::FromStr;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::RLError;

/// How an environment should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Return the frame as an `(height, width, channels)` pixel buffer
    RgbArray,
    /// Show the frame in a viewer owned by the environment
    Human,
}

impl RenderMode {
    /// Name used in configuration files
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RgbArray => "rgb_array",
            Self::Human => "human",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = RLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rgb_array" => Ok(Self::RgbArray),
            "human" => Ok(Self::Human),
            other => Err(RLError::UnsupportedRenderMode(other.to_string())),
        }
    }
}

/// Result of a render call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutput {
    /// Pixel buffer, `(height, width, channels)`
    RgbArray(Array3<u8>),
    /// Whether the viewer is still open after drawing
    Human(bool),
}

impl RenderOutput {
    /// Pixel buffer, if this was an `rgb_array` render
    #[must_use]
    pub fn into_rgb_array(self) -> Option<Array3<u8>> {
        match self {
            Self::RgbArray(frame) => Some(frame),
            Self::Human(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_mode() {
        assert_eq!("rgb_array".parse::<RenderMode>().unwrap(), RenderMode::RgbArray);
        assert_eq!("human".parse::<RenderMode>().unwrap(), RenderMode::Human);
        assert!(matches!(
            "ansi".parse::<RenderMode>(),
            Err(RLError::UnsupportedRenderMode(mode)) if mode == "ansi"
        ));
        assert_eq!(RenderMode::Human.to_string(), "human");
    }
}
