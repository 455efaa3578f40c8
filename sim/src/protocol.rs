//! Newline-delimited JSON request handling for the simulated arm.
//!
//! Every request names a `"Command"`; every response echoes it together with
//! an `"ErrorID"` (`0` on success) and, on failure, an `"Error"` message.

use arm_kinematics::{JointVector, KinematicsError, Pose};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::state::ArmState;

pub const ERROR_NONE: u32 = 0;
pub const ERROR_BAD_REQUEST: u32 = 1;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

impl RequestError {
    pub fn error_id(&self) -> u32 {
        match self {
            RequestError::BadRequest(_) => ERROR_BAD_REQUEST,
            RequestError::Kinematics(e) => e.error_id(),
        }
    }
}

/// Cartesian offset for `LinearRelative`. Omitted axes do not move.
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
struct Delta {
    #[serde(rename = "X", default)]
    x: f64,
    #[serde(rename = "Y", default)]
    y: f64,
    #[serde(rename = "Z", default)]
    z: f64,
}

/// Handle a single decoded request against the arm state.
pub fn handle_request(state: &mut ArmState, request: &Value) -> Value {
    let command = request["Command"].as_str().unwrap_or_default();

    let result = match command {
        "ForwardKinematics" => parse_joints(&request["Joints"]).map(|joints| {
            json!({ "Pose": state.kinematics().forward_kinematics(&joints) })
        }),
        "InverseKinematics" => inverse_kinematics(state, request),
        "ReadJointAngles" => Ok(json!({ "Joints": state.joints() })),
        "ReadCartesianPosition" => Ok(json!({ "Pose": state.pose() })),
        "JointMotion" => parse_joints(&request["Joints"]).map(|joints| {
            json!({ "Pose": state.move_to_joints(joints) })
        }),
        "LinearRelative" => linear_relative(state, request),
        "GetConfig" => Ok(json!({ "Config": state.kinematics().config() })),
        "" => Err(RequestError::BadRequest("missing Command".to_string())),
        other => Err(RequestError::BadRequest(format!("unknown command {}", other))),
    };

    match result {
        Ok(mut body) => {
            body["Command"] = json!(command);
            body["ErrorID"] = json!(ERROR_NONE);
            body
        }
        Err(e) => {
            tracing::warn!(command, error = %e, "request failed");
            json!({
                "Command": command,
                "ErrorID": e.error_id(),
                "Error": e.to_string(),
            })
        }
    }
}

fn inverse_kinematics(state: &ArmState, request: &Value) -> Result<Value, RequestError> {
    let target = parse_pose(&request["Pose"])?;
    let reference = match request.get("Reference") {
        Some(value) => parse_joints(value)?,
        None => state.joints(),
    };
    let joints = state.kinematics().inverse_kinematics(&target, &reference)?;
    Ok(json!({ "Joints": joints }))
}

fn linear_relative(state: &mut ArmState, request: &Value) -> Result<Value, RequestError> {
    let delta = parse_delta(request.get("Delta"))?;
    let joints = state.move_linear_relative([delta.x, delta.y, delta.z])?;
    Ok(json!({ "Joints": joints, "Pose": state.pose() }))
}

fn parse_joints(value: &Value) -> Result<JointVector, RequestError> {
    serde_json::from_value(value.clone())
        .map_err(|e| RequestError::BadRequest(format!("Joints must be 6 numbers: {}", e)))
}

fn parse_delta(value: Option<&Value>) -> Result<Delta, RequestError> {
    match value {
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .map_err(|e| RequestError::BadRequest(format!("invalid Delta: {}", e))),
        Some(_) => Err(RequestError::BadRequest(
            "Delta must be an object with X, Y, Z".to_string(),
        )),
        None => Err(RequestError::BadRequest("missing Delta".to_string())),
    }
}

fn parse_pose(value: &Value) -> Result<Pose, RequestError> {
    serde_json::from_value(value.clone())
        .map_err(|e| RequestError::BadRequest(format!("invalid Pose: {}", e)))
}
