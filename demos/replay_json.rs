//! Replay recorded tracking-service messages and print the resulting commands.
//!
//! Reads one service JSON message per line from stdin and writes one JSON
//! object per dispatched command to stdout:
//!
//! {"frame":1042,"state":"FLYING","command":"move","axis":"vertical","direction":"positive","speed":0.2}
//!
//! Tuning comes from HANDPILOT_* environment variables.
//!
//! Usage: cargo run --example replay_json < capture.jsonl

use handpilot::{protocol, Dispatcher, PilotConfig, RecordingSink};
use std::io::{self, BufRead, Write};

fn main() {
    env_logger::init();

    let config = PilotConfig::from_env();
    let mut pilot = match Dispatcher::new(config, RecordingSink::new()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create pilot: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut frames: u64 = 0;
    let mut rejected: u64 = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let frame = match protocol::decode_message(&line) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                rejected += 1;
                eprintln!("Skipping message: {}", e);
                continue;
            }
        };
        frames += 1;
        let frame_id = frame.id;

        match pilot.on_frame(frame) {
            Ok(commands) => {
                for cmd in &commands {
                    let mut value = serde_json::to_value(cmd).unwrap_or_default();
                    if let Some(obj) = value.as_object_mut() {
                        obj.insert("frame".into(), frame_id.into());
                        obj.insert("state".into(), pilot.state().as_str().into());
                    }
                    let _ = writeln!(out, "{}", value);
                }
                let _ = out.flush();
            }
            Err(e) => {
                rejected += 1;
                eprintln!("Frame {} rejected: {}", frame_id, e);
            }
        }
        pilot.sink_mut().drain();
    }

    eprintln!(
        "Replayed {} frames ({} rejected), final state {}",
        frames,
        rejected,
        pilot.state().as_str()
    );
}
