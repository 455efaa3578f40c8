// Library exports for the 6-axis arm kinematics solver

pub mod errors;
pub mod kinematics;
pub mod matrix;
pub mod pose;
pub mod robot_config;
#[cfg(feature = "nalgebra-support")]
pub mod transforms;

pub use errors::KinematicsError;
pub use kinematics::{joint_distance, select_nearest, unwrap_toward, wrap_angle, ArmKinematics, Branch};
pub use matrix::{Matrix4, Rotation3};
pub use pose::{JointVector, Pose};
pub use robot_config::{LinkGeometry, RobotConfig, RobotModel, SolverConfig};

/// Forward kinematics for `config`'s geometry: joint angles to tool pose.
pub fn forward_kinematics(config: &RobotConfig, joints: &JointVector) -> Pose {
    ArmKinematics::from_config(config.clone()).forward_kinematics(joints)
}

/// Inverse kinematics for `config`'s geometry, choosing every joint's branch
/// nearest to `reference`.
pub fn inverse_kinematics(
    config: &RobotConfig,
    target: &Pose,
    reference: &JointVector,
) -> Result<JointVector, KinematicsError> {
    ArmKinematics::from_config(config.clone()).inverse_kinematics(target, reference)
}
