use std::error::Error;

use arm_kinematics::RobotConfig;
use sim::{start_server, DEFAULT_PORT};

// Usage: sim [CONFIG.json] [PORT]
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => RobotConfig::from_file(&path)?,
        None => RobotConfig::default(),
    };
    let port = match args.next() {
        Some(port) => port.parse::<u16>()?,
        None => DEFAULT_PORT,
    };

    start_server(port, config).await?;
    Ok(())
}
