//! Fly from a live Leap Motion service.
//!
//! Connects to the tracking service WebSocket, enables gesture reporting and
//! feeds every frame to a pilot thread that logs the commands it would send
//! to the drone.
//!
//! Usage: RUST_LOG=info cargo run --example leap_ws [ws://host:6437/v6.json]

use handpilot::{protocol, Dispatcher, LoggingSink, PilotConfig, PilotThread};
use tungstenite::Message;

fn main() {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| protocol::DEFAULT_URL.to_string());

    let dispatcher = match Dispatcher::new(PilotConfig::from_env(), LoggingSink::new()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to create pilot: {}", e);
            std::process::exit(1);
        }
    };
    let pilot = match PilotThread::start(dispatcher) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to start pilot thread: {}", e);
            std::process::exit(1);
        }
    };

    let (mut socket, _) = match tungstenite::connect(url.as_str()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", url, e);
            std::process::exit(1);
        }
    };
    eprintln!("Connected to {}", url);

    for msg in [
        protocol::enable_gestures_message(true),
        protocol::background_message(true),
    ] {
        if let Err(e) = socket.send(Message::Text(msg)) {
            eprintln!("Failed to configure service: {}", e);
            std::process::exit(1);
        }
    }

    loop {
        let text = match socket.read() {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                eprintln!("Service closed the connection");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                eprintln!("WebSocket error: {}", e);
                break;
            }
        };

        match protocol::decode_message(&text) {
            Ok(Some(frame)) => {
                if let Err(e) = pilot.submit(frame) {
                    eprintln!("Pilot stopped: {}", e);
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Skipping message: {}", e),
        }

        while let Some(report) = pilot.try_recv() {
            if let Err(e) = report.outcome {
                eprintln!("Frame {} rejected: {}", report.frame_id, e);
            }
        }
    }

    pilot.stop();
}
