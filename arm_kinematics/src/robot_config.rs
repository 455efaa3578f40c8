//! Robot configuration module for 6-axis desktop arms
//!
//! Link geometry and solver tolerances are explicit, injectable data so the
//! same solver can drive differently-dimensioned arms of the same joint
//! topology. Configurations can be built from presets or loaded from JSON
//! calibration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::KinematicsError;

/// Known arm models
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RobotModel {
    /// BLinx 6-axis desktop arm (firmware v4.3 geometry)
    #[default]
    BlinxArm,
    /// Geometry supplied by calibration data rather than a preset
    Custom,
}

/// Fixed link dimensions, all in the base frame's length unit (mm for presets)
///
/// Joint layout, base to tool:
/// - J1 rotates about the vertical base axis; J2 sits `base_height` above the
///   base and `shoulder_offset` out from its axis
/// - J2 → J3: `upper_arm`
/// - J3 → wrist centre (J4/J5/J6 axes intersection): `forearm`
/// - wrist centre → flange along the tool z-axis: `tool_length`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LinkGeometry {
    pub base_height: f64,
    pub shoulder_offset: f64,
    pub upper_arm: f64,
    pub forearm: f64,
    pub tool_length: f64,
}

impl LinkGeometry {
    /// BLinx arm link dimensions
    ///
    /// - Base height (d1): 153.5 mm
    /// - Shoulder offset (a1): 24.0 mm
    /// - Upper arm (a2): 160.72 mm
    /// - Forearm (d4): 220.5 mm
    /// - Tool length (d6): 79.29 mm
    pub fn blinx_arm() -> Self {
        Self {
            base_height: 153.5,
            shoulder_offset: 24.0,
            upper_arm: 160.72,
            forearm: 220.5,
            tool_length: 79.29,
        }
    }

    /// Longest distance from the shoulder (J2) to the wrist centre.
    pub fn max_wrist_reach(&self) -> f64 {
        self.upper_arm + self.forearm
    }

    /// Shortest distance from the shoulder (J2) to the wrist centre.
    pub fn min_wrist_reach(&self) -> f64 {
        (self.upper_arm - self.forearm).abs()
    }
}

impl Default for LinkGeometry {
    fn default() -> Self {
        Self::blinx_arm()
    }
}

/// Numerical tolerances used by the solver
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Smallest |det| accepted when inverting a transform
    pub singularity_epsilon: f64,
    /// Distance of `ry` from ±90° at which the Euler decomposition switches
    /// to its gimbal-lock branch (radians)
    pub gimbal_tolerance: f64,
    /// Overshoot of an `acos`/`sqrt` argument past its domain that is still
    /// clamped rather than reported as unreachable
    pub domain_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singularity_epsilon: 1e-6,
            gimbal_tolerance: 1e-4,
            domain_tolerance: 1e-9,
        }
    }
}

/// Robot configuration: model, link geometry and solver tolerances
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RobotConfig {
    /// Robot model
    pub model: RobotModel,

    pub geometry: LinkGeometry,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl RobotConfig {
    /// Create configuration for the BLinx desktop arm
    pub fn blinx_arm() -> Self {
        Self {
            model: RobotModel::BlinxArm,
            geometry: LinkGeometry::blinx_arm(),
            solver: SolverConfig::default(),
        }
    }

    /// Create a configuration from calibrated link dimensions
    pub fn custom(geometry: LinkGeometry) -> Self {
        Self {
            model: RobotModel::Custom,
            geometry,
            solver: SolverConfig::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, KinematicsError> {
        let config: RobotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KinematicsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| KinematicsError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), model = ?config.model, "loaded robot configuration");
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, KinematicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), KinematicsError> {
        let g = &self.geometry;
        let lengths = [
            ("base_height", g.base_height),
            ("shoulder_offset", g.shoulder_offset),
            ("tool_length", g.tool_length),
        ];
        for (name, value) in lengths {
            if !value.is_finite() {
                return Err(KinematicsError::InvalidConfig(format!("{} must be finite.", name)));
            }
        }
        for (name, value) in [("upper_arm", g.upper_arm), ("forearm", g.forearm)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KinematicsError::InvalidConfig(format!(
                    "{} must be a positive length.",
                    name
                )));
            }
        }

        let s = &self.solver;
        for (name, value) in [
            ("singularity_epsilon", s.singularity_epsilon),
            ("gimbal_tolerance", s.gimbal_tolerance),
            ("domain_tolerance", s.domain_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KinematicsError::InvalidConfig(format!(
                    "{} must be greater than 0.",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::blinx_arm()
    }
}
