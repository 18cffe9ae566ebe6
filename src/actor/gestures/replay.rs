//! Replaying recorded gesture streams.
//!
//! A recording is newline-delimited JSON, one [`Record`] per line. Blank
//! lines and lines starting with `#` are skipped.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Event, Sender};

/// Time left for running transitions after the last record before the actor
/// is stopped.
pub const SETTLE_TIME: Duration = Duration::from_secs(1);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Delay before this event, relative to the previous one.
    #[serde(default)]
    pub after_ms: u64,
    pub event: Event,
}

pub fn parse(buf: &str) -> anyhow::Result<Vec<Record>> {
    let mut records = Vec::new();
    for (index, line) in buf.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid record", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn read(path: &Path) -> anyhow::Result<Vec<Record>> {
    let buf = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse(&buf).with_context(|| format!("parsing {}", path.display()))
}

/// Sends `records` to the actor with their delays, then stops it once
/// pending transitions had time to finish. A recording that ends in `stop`
/// is sent as is.
pub async fn feed(records: Vec<Record>, events: Sender) {
    let mut stopped = false;
    for record in records {
        if record.after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(record.after_ms)).await;
        }
        trace!(event = ?record.event, "replaying");
        stopped = record.event == Event::Stop;
        events.send(record.event);
        if stopped {
            break;
        }
    }
    if !stopped {
        tokio::time::sleep(SETTLE_TIME).await;
        debug!("replay finished");
        events.send(Event::Stop);
    }
}
