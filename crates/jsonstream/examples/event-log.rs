//! Typed event log: write a few events, then replay them.
//!
//! Run with:
//!   cargo run -p jsonstream --example event-log

use serde::{Deserialize, Serialize};

use jsonstream::{AccessMode, JsonStream};

#[derive(Debug, Serialize, Deserialize)]
struct Event {
    seq: u32,
    kind: String,
    detail: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("jsonstream-event-log-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("events.jsonstream");

    let log = JsonStream::open(&path, AccessMode::WriteOnly)?;
    for (seq, kind) in ["started", "tick", "stopped"].into_iter().enumerate() {
        log.write_object(&Event {
            seq: seq as u32,
            kind: kind.to_string(),
            detail: (kind == "tick").then(|| "heartbeat".to_string()),
        })?;
    }
    log.close()?;

    let replay = JsonStream::open(&path, AccessMode::ReadOnly)?;
    while let Some(event) = replay.read_object::<Event>()? {
        eprintln!("replayed {event:?}");
    }
    replay.close()?;

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
