// Closed-form kinematics for the BLinx-style 6R desktop arm
//
// Joints 1-3 place the wrist centre, joints 4-6 form a spherical wrist. IK
// solves the position sub-chain geometrically from the wrist centre and then
// reads the wrist angles off the residual transform T3^6 = (T0^3)^-1 · T0^6.
// Every joint has two algebraic branches; the one nearest the caller's
// reference joints wins so consecutive solutions stay continuous.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::errors::KinematicsError;
use crate::matrix::{self, Matrix4};
use crate::pose::{JointVector, Pose};
use crate::robot_config::RobotConfig;

const THREE_HALF_PI: f64 = 3.0 * FRAC_PI_2;

/// Which of a joint's two algebraic solutions was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    First,
    Second,
}

/// Forward and inverse kinematics for one arm geometry
#[derive(Debug, Clone, Default)]
pub struct ArmKinematics {
    config: RobotConfig,
}

impl ArmKinematics {
    /// Create kinematics from a robot configuration
    pub fn from_config(config: RobotConfig) -> Self {
        Self { config }
    }

    /// Get the robot configuration
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    // ============================================================================
    // Per-joint transforms
    // ============================================================================

    /// Homogeneous transform contributed by joint `index` (0-based) at angle `theta`.
    ///
    /// Each joint rotates about its own axis; the fixed rows/columns encode the
    /// link twists and the translations come from the link geometry.
    ///
    /// # Panics
    /// Panics if `index > 5`.
    pub(crate) fn joint_transform(&self, index: usize, theta: f64) -> Matrix4 {
        let g = &self.config.geometry;
        let (s, c) = theta.sin_cos();

        match index {
            // Base yaw, lifts to the shoulder and offsets it radially
            0 => [
                [c, 0.0, -s, g.shoulder_offset * c],
                [s, 0.0, c, g.shoulder_offset * s],
                [0.0, -1.0, 0.0, g.base_height],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // Shoulder, carries the upper arm
            1 => [
                [s, c, 0.0, g.upper_arm * s],
                [-c, s, 0.0, -g.upper_arm * c],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // Elbow
            2 => [
                [c, 0.0, -s, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, -1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // Forearm roll, carries the forearm out to the wrist centre
            3 => [
                [c, 0.0, s, 0.0],
                [s, 0.0, -c, 0.0],
                [0.0, 1.0, 0.0, g.forearm],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // Wrist pitch
            4 => [
                [-s, 0.0, -c, 0.0],
                [c, 0.0, -s, 0.0],
                [0.0, -1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // Flange roll, out along the tool axis
            5 => [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, g.tool_length],
                [0.0, 0.0, 0.0, 1.0],
            ],
            _ => panic!("joint index {} out of range for a 6-axis arm", index),
        }
    }

    /// All six per-joint transforms for a joint vector, base to tool.
    pub fn joint_transforms(&self, joints: &JointVector) -> [Matrix4; 6] {
        std::array::from_fn(|i| self.joint_transform(i, joints[i]))
    }

    /// Transform from the base frame to frame 3 (end of the position sub-chain).
    /// IMPORTANT: must match the first three factors of the FK chain exactly.
    pub fn transform_0_to_3(&self, j1: f64, j2: f64, j3: f64) -> Matrix4 {
        matrix::compose(&[
            self.joint_transform(0, j1),
            self.joint_transform(1, j2),
            self.joint_transform(2, j3),
        ])
    }

    // ============================================================================
    // Forward Kinematics
    // ============================================================================

    /// Base-to-tool homogeneous transform T0^6 = T0^1 · T1^2 · ... · T5^6.
    pub fn forward_transform(&self, joints: &JointVector) -> Matrix4 {
        matrix::compose(&self.joint_transforms(joints))
    }

    /// Forward kinematics: calculate the tool pose from joint angles
    ///
    /// # Arguments
    /// * `joints` - Joint angles in radians [j1, j2, j3, j4, j5, j6]
    ///
    /// # Returns
    /// * Tool position in the geometry's length unit and orientation as
    ///   `Rz · Ry · Rx` Euler angles in radians
    pub fn forward_kinematics(&self, joints: &JointVector) -> Pose {
        let t06 = self.forward_transform(joints);
        Pose::from_transform(&t06, self.config.solver.gimbal_tolerance)
    }

    // ============================================================================
    // Inverse Kinematics
    // ============================================================================

    /// Wrist centre of a target transform: the tool position backed off by the
    /// tool length along the tool's approach (z) axis.
    pub fn wrist_center(&self, t06: &Matrix4) -> [f64; 3] {
        let d6 = self.config.geometry.tool_length;
        [
            t06[0][3] - d6 * t06[0][2],
            t06[1][3] - d6 * t06[1][2],
            t06[2][3] - d6 * t06[2][2],
        ]
    }

    /// Inverse kinematics: calculate joint angles that reach `target`
    ///
    /// # Arguments
    /// * `target` - Desired tool pose (position + Rx/Ry/Rz in radians)
    /// * `reference` - Current/previous joint configuration; every joint takes
    ///   the algebraic branch nearest to it
    ///
    /// # Returns
    /// * Joint angles in radians, each expressed in the 2π-equivalent
    ///   representation nearest its reference
    /// * `SingularMatrix` if the joints 1-3 sub-chain cannot be inverted,
    ///   `UnreachablePose` if the wrist centre is out of reach
    pub fn inverse_kinematics(
        &self,
        target: &Pose,
        reference: &JointVector,
    ) -> Result<JointVector, KinematicsError> {
        self.inverse_kinematics_transform(&target.to_transform(), reference)
    }

    /// Inverse kinematics for a target given as a full homogeneous transform.
    pub fn inverse_kinematics_transform(
        &self,
        t06: &Matrix4,
        reference: &JointVector,
    ) -> Result<JointVector, KinematicsError> {
        let [px, py, pz] = self.wrist_center(t06);

        let (j1, j1_branch) = select_nearest([py.atan2(px), (-py).atan2(-px)], reference[0]);
        let (j3, j3_branch) = self.solve_elbow(j1, &[px, py, pz], reference[2])?;
        let (j2, j2_branch) = self.solve_shoulder(j3, pz, reference[1]);

        // Residual transform the wrist has to realise
        let t03 = self.transform_0_to_3(j1, j2, j3);
        let t03_inv = matrix::invert(&t03, self.config.solver.singularity_epsilon)?;
        let t36 = matrix::multiply(&t03_inv, t06);

        let (j4, j5, j6, wrist_branch) = Self::solve_wrist(&t36, reference);

        tracing::debug!(
            ?j1_branch,
            ?j2_branch,
            ?j3_branch,
            ?wrist_branch,
            joints = ?[j1, j2, j3, j4, j5, j6],
            "inverse kinematics solved"
        );

        Ok([j1, j2, j3, j4, j5, j6])
    }

    /// Joint 3 from the shoulder-to-wrist-centre distance (law of cosines).
    fn solve_elbow(
        &self,
        j1: f64,
        wrist: &[f64; 3],
        reference: f64,
    ) -> Result<(f64, Branch), KinematicsError> {
        let g = &self.config.geometry;
        let (s1, c1) = j1.sin_cos();

        let dx = wrist[0] - g.shoulder_offset * c1;
        let dy = wrist[1] - g.shoulder_offset * s1;
        let dz = wrist[2] - g.base_height;
        let reach_sq = dx * dx + dy * dy + dz * dz;

        let a2 = g.upper_arm;
        let d4 = g.forearm;
        let cos_elbow = (a2 * a2 + d4 * d4 - reach_sq) / (2.0 * a2 * d4);

        if cos_elbow.abs() > 1.0 + self.config.solver.domain_tolerance {
            let reason = format!(
                "wrist centre is {:.3} from the shoulder, reachable range is [{:.3}, {:.3}]",
                reach_sq.sqrt(),
                g.min_wrist_reach(),
                g.max_wrist_reach()
            );
            tracing::warn!(%reason, "inverse kinematics failed");
            return Err(KinematicsError::UnreachablePose { reason });
        }

        let elbow = cos_elbow.clamp(-1.0, 1.0).acos();
        Ok(select_nearest(
            [FRAC_PI_2 - elbow, -(THREE_HALF_PI - elbow)],
            reference,
        ))
    }

    /// Joint 2 from joint 3 and the wrist-centre height above the shoulder.
    ///
    /// Once the elbow is solved, `along² + across²` is the squared shoulder to
    /// wrist distance, so the radicand is the horizontal part of that distance
    /// and only rounding can push it below zero.
    fn solve_shoulder(&self, j3: f64, wrist_z: f64, reference: f64) -> (f64, Branch) {
        let g = &self.config.geometry;
        let (s3, c3) = j3.sin_cos();
        let dz = wrist_z - g.base_height;

        // Shoulder-to-wrist vector expressed in the upper-arm plane
        let along = g.upper_arm - g.forearm * s3;
        let across = g.forearm * c3;
        let radicand = along * along + across * across - dz * dz;

        let phi = (-across).atan2(along);
        let psi = radicand.max(0.0).sqrt().atan2(dz);
        select_nearest([phi + psi, phi - psi], reference)
    }

    /// Joints 4-6 from the residual rotation T3^6.
    ///
    /// Only joint 5 is disambiguated against the reference; joints 4 and 6
    /// follow from whichever joint-5 branch was chosen.
    fn solve_wrist(t36: &Matrix4, reference: &JointVector) -> (f64, f64, f64, Branch) {
        let c5 = t36[2][2].clamp(-1.0, 1.0);
        let tau = (1.0 - c5 * c5).max(0.0).sqrt().atan2(-c5);

        let (j5, branch) = select_nearest([FRAC_PI_2 - tau, -(THREE_HALF_PI - tau)], reference[4]);

        let (j4, j6) = match branch {
            Branch::First => (
                (-t36[1][2]).atan2(-t36[0][2]),
                (-t36[2][1]).atan2(t36[2][0]),
            ),
            Branch::Second => (
                t36[1][2].atan2(t36[0][2]),
                t36[2][1].atan2(-t36[2][0]),
            ),
        };

        (
            unwrap_toward(j4, reference[3]),
            j5,
            unwrap_toward(j6, reference[5]),
            branch,
        )
    }
}

// ============================================================================
// Branch selection helpers
// ============================================================================

/// Wrap an angle into `[-π, π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Express `angle` in its 2π-equivalent representation nearest `reference`.
pub fn unwrap_toward(angle: f64, reference: f64) -> f64 {
    reference + wrap_angle(angle - reference)
}

/// Pick the candidate angularly nearest to `reference`.
///
/// Both candidates are first unwrapped toward the reference; the returned
/// angle is the unwrapped value. An exact tie goes to the first candidate.
pub fn select_nearest(candidates: [f64; 2], reference: f64) -> (f64, Branch) {
    let first = unwrap_toward(candidates[0], reference);
    let second = unwrap_toward(candidates[1], reference);

    if (first - reference).abs() <= (second - reference).abs() {
        (first, Branch::First)
    } else {
        (second, Branch::Second)
    }
}

/// Euclidean distance between two joint vectors, measured per joint on the circle.
pub fn joint_distance(a: &JointVector, b: &JointVector) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| wrap_angle(x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
