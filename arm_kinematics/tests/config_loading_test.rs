/// Loading arm geometry from calibration files
use arm_kinematics::{ArmKinematics, KinematicsError, RobotConfig, RobotModel};

fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("arm_kinematics_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_calibrated_geometry() {
    let path = write_temp(
        "calibrated",
        r#"{
            "model": "Custom",
            "geometry": {
                "base_height": 150.0,
                "shoulder_offset": 25.0,
                "upper_arm": 162.0,
                "forearm": 218.0,
                "tool_length": 80.0
            },
            "solver": {
                "singularity_epsilon": 1e-8,
                "gimbal_tolerance": 1e-4,
                "domain_tolerance": 1e-9
            }
        }"#,
    );

    let config = RobotConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.model, RobotModel::Custom);
    assert_eq!(config.solver.singularity_epsilon, 1e-8);

    let kin = ArmKinematics::from_config(config);
    let pose = kin.forward_kinematics(&[0.0; 6]);
    // Zero pose: shoulder offset + forearm forward, base + upper arm - tool up
    assert!((pose.x - 243.0).abs() < 1e-9);
    assert!((pose.z - 232.0).abs() < 1e-9);
}

#[test]
fn test_invalid_geometry_is_rejected() {
    let path = write_temp(
        "invalid",
        r#"{
            "model": "BlinxArm",
            "geometry": {
                "base_height": 153.5,
                "shoulder_offset": 24.0,
                "upper_arm": -160.72,
                "forearm": 220.5,
                "tool_length": 79.29
            }
        }"#,
    );

    let result = RobotConfig::from_file(&path);
    std::fs::remove_file(&path).ok();

    assert_eq!(
        result.unwrap_err(),
        KinematicsError::InvalidConfig("upper_arm must be a positive length.".to_string())
    );
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let err = RobotConfig::from_json_str(r#"{"model": "BlinxArm", "geometry": 5}"#).unwrap_err();
    assert!(matches!(err, KinematicsError::ConfigParse(_)), "{:?}", err);
}
