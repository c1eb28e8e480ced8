//! Process parameters consumed by every writer in [`crate::emitter`].

use crate::error::Result;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Velocities, signal name and tool description for one generated program.
///
/// Any field missing from a JSON document takes its [`Default`] value, so a
/// config file only needs to name what differs from the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessParams {
    /// TCP velocity (mm/s) while working.
    pub process_speed: f64,

    /// TCP velocity (mm/s) for lead-in moves.
    pub approach_speed: f64,

    /// TCP velocity (mm/s) for transit and departure moves.
    pub traverse_speed: f64,

    /// Digital output that switches the process tool.
    pub output_name: String,

    /// The tool mounted on the flange.
    pub tool: ToolData,

    /// Grinding controller settings. `None` selects plain linear moves and
    /// suppresses the start/end activation codes.
    pub activation: Option<ActivationParams>,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            process_speed: 50.0,
            approach_speed: 200.0,
            traverse_speed: 500.0,
            output_name: "doProcess".to_string(),
            tool: ToolData::default(),
            activation: None,
        }
    }
}

impl ProcessParams {
    /// Parses parameters from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_activation(mut self, activation: ActivationParams) -> Self {
        self.activation = Some(activation);
        self
    }
}

/// Which configured velocity a free (non-process) move runs at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedSource {
    Approach,
    Traverse,
}

/// Tool frame and load, rendered as the controller's `tooldata` record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolData {
    /// TCP offset from the flange, in mm.
    pub translation: Vec3,

    /// TCP orientation relative to the flange.
    pub rotation: Quat,

    /// Tool mass in kg. The controller rejects a zero mass.
    pub mass: f32,

    /// Centre of gravity relative to the flange, in mm.
    pub center_of_gravity: Vec3,
}

impl Default for ToolData {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            mass: 1.0,
            center_of_gravity: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

/// Settings for a grinding controller that needs explicit tool activation at the
/// start and end of the working portion of the program.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationParams {
    /// Spindle speed in rpm.
    pub spindle_speed: f64,
    /// Contact force in N.
    pub force: f64,
    /// Force in N applied while sliding along the surface.
    pub slide_force: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params = ProcessParams::from_json(r#"{ "output_name": "DO1", "process_speed": 20 }"#)
            .unwrap();
        assert_eq!(params.output_name, "DO1");
        assert_eq!(params.process_speed, 20.0);
        assert_eq!(params.traverse_speed, ProcessParams::default().traverse_speed);
        assert_eq!(params.tool, ToolData::default());
        assert!(params.activation.is_none());
    }

    #[test]
    fn json_activation_block() {
        let params = ProcessParams::from_json(
            r#"{ "activation": { "spindle_speed": 3000, "force": 25, "slide_force": 5 } }"#,
        )
        .unwrap();
        let activation = params.activation.unwrap();
        assert_eq!(activation.spindle_speed, 3000.0);
        assert_eq!(activation.slide_force, 5.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ProcessParams::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::EmitError::Config(_)));
    }
}
