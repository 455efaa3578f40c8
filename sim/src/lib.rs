// Library exports for the simulated arm kinematics service

pub mod protocol;
pub mod server;
pub mod state;

pub use protocol::{handle_request, RequestError};
pub use server::{serve, start_server, DEFAULT_PORT};
pub use state::ArmState;
