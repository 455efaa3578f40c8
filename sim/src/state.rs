use arm_kinematics::{
    joint_distance, ArmKinematics, JointVector, KinematicsError, Pose, RobotConfig,
};

/// Home configuration: arm upright with the wrist pitched 30°, which keeps
/// joint 5 clear of its singularity so jogging starts well-conditioned.
pub const HOME_JOINTS: JointVector = [0.0, 0.0, 0.0, 0.0, 0.523_598_775_598_298_8, 0.0];

// Simulated arm state
#[derive(Clone, Debug)]
pub struct ArmState {
    joints: JointVector,
    pose: Pose,
    kinematics: ArmKinematics,
}

impl ArmState {
    pub fn new(config: RobotConfig) -> Self {
        let kinematics = ArmKinematics::from_config(config);
        let pose = kinematics.forward_kinematics(&HOME_JOINTS);
        Self {
            joints: HOME_JOINTS,
            pose,
            kinematics,
        }
    }

    pub fn joints(&self) -> JointVector {
        self.joints
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn kinematics(&self) -> &ArmKinematics {
        &self.kinematics
    }

    /// Jump straight to a joint configuration.
    pub fn move_to_joints(&mut self, joints: JointVector) -> Pose {
        self.joints = joints;
        self.pose = self.kinematics.forward_kinematics(&joints);
        self.pose
    }

    /// Translate the tool by `delta` keeping its orientation. The current
    /// joints are the IK reference, so repeated small jogs stay on the same
    /// branch. On failure the state is left untouched.
    pub fn move_linear_relative(&mut self, delta: [f64; 3]) -> Result<JointVector, KinematicsError> {
        let mut target = self.pose;
        target.x += delta[0];
        target.y += delta[1];
        target.z += delta[2];

        let joints = self.kinematics.inverse_kinematics(&target, &self.joints)?;
        tracing::debug!(
            jump = joint_distance(&joints, &self.joints),
            ?delta,
            "linear relative move"
        );

        self.joints = joints;
        // Re-derive the pose from the joints so rounding never accumulates
        self.pose = self.kinematics.forward_kinematics(&joints);
        Ok(joints)
    }
}

impl Default for ArmState {
    fn default() -> Self {
        Self::new(RobotConfig::default())
    }
}
