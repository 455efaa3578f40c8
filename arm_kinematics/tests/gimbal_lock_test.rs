/// Euler decomposition behaviour when the middle rotation reaches ±90°
use std::f64::consts::FRAC_PI_2;

use arm_kinematics::ArmKinematics;

#[test]
fn test_positive_gimbal_lock_branch() {
    let kin = ArmKinematics::default();
    let pose = kin.forward_kinematics(&[0.0, 0.0, 0.0, 0.0, FRAC_PI_2, 0.0]);

    println!("FK: {:?}", pose);

    assert_eq!(pose.ry, FRAC_PI_2);
    assert_eq!(pose.rz, 0.0);

    // rx is read off column 1 of the rotation block
    let t = kin.forward_transform(&[0.0, 0.0, 0.0, 0.0, FRAC_PI_2, 0.0]);
    assert!((pose.rx - t[1][1].atan2(t[0][1])).abs() < 1e-12);
    assert!((pose.rx + FRAC_PI_2).abs() < 1e-9, "Rx = {}", pose.rx);

    // Position is unaffected by the orientation branch
    assert!((pose.x - 165.21).abs() < 1e-9);
    assert!((pose.z - 314.22).abs() < 1e-9);
}

#[test]
fn test_negative_gimbal_lock_branch() {
    let kin = ArmKinematics::default();
    let pose = kin.forward_kinematics(&[0.0, 0.0, 0.0, 0.0, -FRAC_PI_2, 0.0]);

    assert_eq!(pose.ry, -FRAC_PI_2);
    assert_eq!(pose.rz, 0.0);

    let t = kin.forward_transform(&[0.0, 0.0, 0.0, 0.0, -FRAC_PI_2, 0.0]);
    assert!((pose.rx - (-t[1][1]).atan2(t[0][1])).abs() < 1e-12);
    assert!((pose.rx - FRAC_PI_2).abs() < 1e-9, "Rx = {}", pose.rx);
}

#[test]
fn test_near_gimbal_lock_uses_general_branch() {
    // Just outside the tolerance the general decomposition applies
    let kin = ArmKinematics::default();
    let pose = kin.forward_kinematics(&[0.0, 0.0, 0.0, 0.0, FRAC_PI_2 - 0.01, 0.0]);
    assert!(pose.ry < FRAC_PI_2 - 1e-4);
    assert!((pose.ry - (FRAC_PI_2 - 0.01)).abs() < 1e-9);
}
