//! Conversions between the solver's types and nalgebra geometric types.
//!
//! Enable with the `nalgebra-support` feature:
//!
//! ```toml
//! [dependencies]
//! arm_kinematics = { version = "0.1", features = ["nalgebra-support"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use arm_kinematics::{ArmKinematics, Pose};
//! use nalgebra::Isometry3;
//!
//! let kin = ArmKinematics::default();
//! let tool: Isometry3<f64> = kin.forward_kinematics(&[0.0; 6]).into();
//! let joints = kin.inverse_kinematics_isometry(&tool, &[0.0; 6])?;
//! ```
//!
//! # Notes
//!
//! - `Rx, Ry, Rz` map to nalgebra's roll, pitch, yaw; both compose as
//!   `Rz · Ry · Rx`
//! - Converting back to [`Pose`] uses the default gimbal tolerance

use nalgebra::{Isometry3, Matrix3, Rotation3, Translation3, UnitQuaternion};

use crate::errors::KinematicsError;
use crate::kinematics::ArmKinematics;
use crate::matrix::{self, Matrix4};
use crate::pose::{JointVector, Pose};
use crate::robot_config::SolverConfig;

/// Convert a row-major homogeneous transform into an isometry.
///
/// The rotation block is taken as-is and must already be orthonormal, which
/// every transform produced by the solver is.
pub fn matrix_to_isometry(t: &Matrix4) -> Isometry3<f64> {
    let r = matrix::rotation(t);
    let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_fn(|i, j| r[i][j]));
    let [x, y, z] = matrix::translation(t);
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_rotation_matrix(&rotation),
    )
}

/// Convert an isometry into a row-major homogeneous transform.
pub fn isometry_to_matrix(iso: &Isometry3<f64>) -> Matrix4 {
    let h = iso.to_homogeneous();
    std::array::from_fn(|i| std::array::from_fn(|j| h[(i, j)]))
}

/// Convert Pose to nalgebra Isometry3.
impl From<Pose> for Isometry3<f64> {
    fn from(pose: Pose) -> Self {
        let translation = Translation3::new(pose.x, pose.y, pose.z);
        let rotation = UnitQuaternion::from_euler_angles(pose.rx, pose.ry, pose.rz);
        Isometry3::from_parts(translation, rotation)
    }
}

impl From<&Pose> for Isometry3<f64> {
    fn from(pose: &Pose) -> Self {
        (*pose).into()
    }
}

/// Convert nalgebra Isometry3 to Pose, going through the solver's own Euler
/// decomposition so the gimbal-lock convention matches forward kinematics.
impl From<Isometry3<f64>> for Pose {
    fn from(iso: Isometry3<f64>) -> Self {
        Pose::from_transform(
            &isometry_to_matrix(&iso),
            SolverConfig::default().gimbal_tolerance,
        )
    }
}

impl ArmKinematics {
    /// Forward kinematics returning the tool frame as an isometry.
    pub fn forward_isometry(&self, joints: &JointVector) -> Isometry3<f64> {
        matrix_to_isometry(&self.forward_transform(joints))
    }

    /// Inverse kinematics for a target given as an isometry.
    pub fn inverse_kinematics_isometry(
        &self,
        target: &Isometry3<f64>,
        reference: &JointVector,
    ) -> Result<JointVector, KinematicsError> {
        self.inverse_kinematics_transform(&isometry_to_matrix(target), reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_to_isometry_matches_transform() {
        let pose = Pose::new(120.0, -40.0, 210.0, 2.5, -0.4, 0.9);
        let iso: Isometry3<f64> = pose.into();
        let expected = pose.to_transform();
        let actual = isometry_to_matrix(&iso);
        for i in 0..4 {
            for j in 0..4 {
                assert!((expected[i][j] - actual[i][j]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_roundtrip_conversion() {
        let original = Pose::new(123.456, -78.9, 34.5, 0.7, 0.3, -1.2);
        let iso: Isometry3<f64> = original.into();
        let converted: Pose = iso.into();
        for (a, b) in original.to_array().iter().zip(converted.to_array().iter()) {
            assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_isometry_ik_roundtrip() {
        let kin = ArmKinematics::default();
        let joints = [0.2, -0.3, 0.4, 0.5, -0.6, 0.7];
        let tool = kin.forward_isometry(&joints);
        let solved = kin.inverse_kinematics_isometry(&tool, &joints).unwrap();
        for (a, b) in joints.iter().zip(solved.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }
}
