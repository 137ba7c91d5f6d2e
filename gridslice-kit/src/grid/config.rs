//! Renderer configuration.

use serde::{Deserialize, Serialize};

use super::error::{GridError, GridResult};
use super::node::SCOPE_SEPARATOR;

/// Tunables of a [`Renderer`](super::Renderer).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Separator between a node id's scope name and the rest of the id
    pub scope_separator: char,

    /// Map frame width when the map props carry none
    pub map_width: String,

    /// Map frame height when the map props carry none
    pub map_height: String,

    /// Text shown on every map marker
    pub marker_text: String,

    /// Icon shown on every map marker
    pub marker_icon: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            scope_separator: SCOPE_SEPARATOR,
            map_width: "100%".to_string(),
            map_height: "400px".to_string(),
            marker_text: "My Marker".to_string(),
            marker_icon: "healthicons:geo-location-outline-24px".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        if config.map_width.trim().is_empty() || config.map_height.trim().is_empty() {
            return Err(GridError::InvalidConfig(
                "map frame dimensions must not be empty".to_string(),
            ));
        }
        Ok(config)
    }
}
