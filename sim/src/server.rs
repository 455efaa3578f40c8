use std::error::Error;
use std::sync::Arc;

use arm_kinematics::RobotConfig;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::protocol::{handle_request, ERROR_BAD_REQUEST};
use crate::state::ArmState;

pub const DEFAULT_PORT: u16 = 16001;

/// Longest request line a client may send before the pending bytes are dropped.
pub const MAX_LINE_LEN: usize = 64 * 1024;

fn bad_request(message: String) -> serde_json::Value {
    json!({
        "Command": "",
        "ErrorID": ERROR_BAD_REQUEST,
        "Error": message,
    })
}

async fn handle_client(
    mut socket: TcpStream,
    arm_state: Arc<Mutex<ArmState>>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut buffer = vec![0; 1024];
    let mut temp_buffer = Vec::new();
    // Set after an overlong line until its terminating newline shows up
    let mut discarding = false;

    loop {
        let n = match socket.read(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!("Failed to read from socket: {}", e);
                return Err(Box::new(e));
            }
        };

        if n == 0 {
            break;
        }

        temp_buffer.extend_from_slice(&buffer[..n]);

        if discarding {
            match temp_buffer.iter().position(|&x| x == b'\n') {
                Some(pos) => {
                    temp_buffer.drain(..=pos);
                    discarding = false;
                }
                None => {
                    temp_buffer.clear();
                    continue;
                }
            }
        }

        while let Some(pos) = temp_buffer.iter().position(|&x| x == b'\n') {
            let request: Vec<u8> = temp_buffer.drain(..=pos).collect();
            let request_str = String::from_utf8_lossy(&request[..request.len() - 1]);
            let request_str = request_str.trim();
            if request_str.is_empty() {
                continue;
            }

            let response_json = match serde_json::from_str::<serde_json::Value>(request_str) {
                Ok(request_json) => {
                    let mut state = arm_state.lock().await;
                    handle_request(&mut state, &request_json)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse JSON: {}", e);
                    bad_request(format!("malformed JSON: {}", e))
                }
            };

            let response = serde_json::to_string(&response_json)? + "\r\n";
            socket.write_all(response.as_bytes()).await?;
        }

        if temp_buffer.len() > MAX_LINE_LEN {
            tracing::warn!(pending = temp_buffer.len(), "request line too long, dropping it");
            temp_buffer.clear();
            discarding = true;

            let response_json = bad_request(format!("request line exceeds {} bytes", MAX_LINE_LEN));
            let response = serde_json::to_string(&response_json)? + "\r\n";
            socket.write_all(response.as_bytes()).await?;
        }
    }

    Ok(())
}

/// Accept clients on `listener` forever. All connections share one arm.
pub async fn serve(
    listener: TcpListener,
    arm_state: Arc<Mutex<ArmState>>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        tracing::info!(%addr, "client connected");

        let arm_state = Arc::clone(&arm_state);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, arm_state).await {
                tracing::error!("Error handling client {}: {:?}", addr, e);
            }
            tracing::info!(%addr, "client disconnected");
        });
    }
}

pub async fn start_server(port: u16, config: RobotConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Arm simulator listening on {} ({:?})", addr, config.model);

    serve(listener, Arc::new(Mutex::new(ArmState::new(config)))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};

    #[tokio::test]
    async fn test_tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(Mutex::new(ArmState::default()))));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        // Two requests in one write exercise the line splitting
        writer
            .write_all(
                b"{\"Command\":\"ReadJointAngles\"}\n{\"Command\":\"JointMotion\",\"Joints\":[0,0,0,0,0,0]}\n",
            )
            .await
            .unwrap();

        let first: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["Command"], "ReadJointAngles");
        assert_eq!(first["ErrorID"], 0);

        let second: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["Command"], "JointMotion");
        assert!((second["Pose"]["X"].as_f64().unwrap() - 244.5).abs() < 1e-9);

        writer.write_all(b"not json\r\n").await.unwrap();
        let third: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(third["ErrorID"], ERROR_BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlong_line_is_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(Mutex::new(ArmState::default()))));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer.write_all(&vec![b'a'; MAX_LINE_LEN + 4096]).await.unwrap();
        let rejected: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(rejected["ErrorID"], ERROR_BAD_REQUEST);

        // The tail of the dropped line is skipped, the next request is served
        writer
            .write_all(b"aaaa\n{\"Command\":\"ReadJointAngles\"}\n")
            .await
            .unwrap();
        let next: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(next["Command"], "ReadJointAngles");
        assert_eq!(next["ErrorID"], 0);
    }
}
