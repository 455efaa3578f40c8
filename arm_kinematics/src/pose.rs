//! Cartesian poses and Euler-angle orientation conversions.
//!
//! Orientation is stored as Euler angles `(rx, ry, rz)` in radians, composed
//! as `R = Rz(rz) · Ry(ry) · Rx(rx)`.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::matrix::{self, Matrix4, Rotation3};

/// Six joint angles in radians, joint 1 (base) to joint 6 (tool flange).
pub type JointVector = [f64; 6];

/// End-effector pose in the base frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "Rx")]
    pub rx: f64,
    #[serde(rename = "Ry")]
    pub ry: f64,
    #[serde(rename = "Rz")]
    pub rz: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, rx: f64, ry: f64, rz: f64) -> Self {
        Self { x, y, z, rx, ry, rz }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Same pose with the orientation expressed in degrees, for display.
    pub fn to_degrees(&self) -> Self {
        Self {
            rx: self.rx.to_degrees(),
            ry: self.ry.to_degrees(),
            rz: self.rz.to_degrees(),
            ..*self
        }
    }

    /// Inverse of [`Pose::to_degrees`].
    pub fn from_degrees(pose: &Pose) -> Self {
        Self {
            rx: pose.rx.to_radians(),
            ry: pose.ry.to_radians(),
            rz: pose.rz.to_radians(),
            ..*pose
        }
    }

    /// Homogeneous transform for this pose.
    pub fn to_transform(&self) -> Matrix4 {
        let r = euler_to_rotation_matrix(self.rx, self.ry, self.rz);
        matrix::from_rotation_translation(&r, &self.position())
    }

    /// Decompose a homogeneous transform into a pose.
    ///
    /// `gimbal_tolerance` is how close `ry` has to be to ±90° before the
    /// degenerate decomposition is used.
    pub fn from_transform(t: &Matrix4, gimbal_tolerance: f64) -> Self {
        let [x, y, z] = matrix::translation(t);
        let [rx, ry, rz] = rotation_matrix_to_euler(&matrix::rotation(t), gimbal_tolerance);
        Self { x, y, z, rx, ry, rz }
    }
}

/// Convert Euler angles to a rotation matrix: `R = Rz(rz) · Ry(ry) · Rx(rx)`.
pub fn euler_to_rotation_matrix(rx: f64, ry: f64, rz: f64) -> Rotation3 {
    let (sx, cx) = rx.sin_cos();
    let (sy, cy) = ry.sin_cos();
    let (sz, cz) = rz.sin_cos();

    [
        [cz * cy, cz * sy * sx - sz * cx, cz * sy * cx + sz * sx],
        [sz * cy, sz * sy * sx + cz * cx, sz * sy * cx - cz * sx],
        [-sy, cy * sx, cy * cx],
    ]
}

/// Extract Euler angles `[rx, ry, rz]` from a rotation matrix.
///
/// When `ry` lands within `gimbal_tolerance` of ±90° the decomposition is
/// degenerate: `ry` snaps to exactly ±π/2, `rz` is forced to `0.0` and `rx`
/// is read from the first two rows of column 1. Downstream consumers rely on
/// this exact convention.
pub fn rotation_matrix_to_euler(r: &Rotation3, gimbal_tolerance: f64) -> [f64; 3] {
    let ry = (-r[2][0]).atan2((r[0][0] * r[0][0] + r[1][0] * r[1][0]).sqrt());

    if (ry - FRAC_PI_2).abs() <= gimbal_tolerance {
        return [r[1][1].atan2(r[0][1]), FRAC_PI_2, 0.0];
    }

    if (ry + FRAC_PI_2).abs() <= gimbal_tolerance {
        return [(-r[1][1]).atan2(r[0][1]), -FRAC_PI_2, 0.0];
    }

    let cy = ry.cos();
    let rx = (r[2][1] / cy).atan2(r[2][2] / cy);
    let rz = (r[1][0] / cy).atan2(r[0][0] / cy);
    [rx, ry, rz]
}
