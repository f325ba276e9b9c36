//! Probing media sources for duration and native dimensions.
//!
//! Inspectors may block on slow metadata (network sources, cold caches), so
//! resolution runs the inspector off-thread and waits a bounded interval.
//! When nothing usable comes back in time the documented fallbacks apply
//! and the timeline keeps working; the unknown duration is never surfaced.

use clipline_core::{CliplineError, Result, FALLBACK_DURATION_SECS};
use clipline_timeline::SourceRef;
use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Surface dimensions assumed when a source's metadata is unavailable.
pub const FALLBACK_WIDTH: u32 = 1280;
pub const FALLBACK_HEIGHT: u32 = 720;

/// How long metadata resolution may block before falling back.
pub const PROBE_WAIT: Duration = Duration::from_secs(3);

/// Metadata for one media source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

impl MediaInfo {
    pub fn fallback() -> Self {
        Self {
            duration: FALLBACK_DURATION_SECS,
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
        }
    }
}

/// Resolves source references into metadata. Decoding backends implement
/// this; the editor only ever sees [`MediaInfo`].
pub trait MediaInspector: Send + Sync {
    fn inspect(&self, source: &SourceRef) -> Result<MediaInfo>;
}

/// Inspector over a fixed table of sources, for scripted sessions.
#[derive(Debug, Clone, Default)]
pub struct FixedInspector {
    entries: HashMap<String, MediaInfo>,
}

impl FixedInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, info: MediaInfo) -> &mut Self {
        self.entries.insert(key.into(), info);
        self
    }
}

impl MediaInspector for FixedInspector {
    fn inspect(&self, source: &SourceRef) -> Result<MediaInfo> {
        self.entries
            .get(source.as_str())
            .copied()
            .ok_or_else(|| CliplineError::DurationUnknown(source.to_string()))
    }
}

/// Resolve metadata with a bounded wait, substituting fallbacks on failure
/// or timeout. This never errors; appends must not stall on bad media.
pub fn resolve_media_info(
    inspector: Arc<dyn MediaInspector>,
    source: &SourceRef,
    wait: Duration,
) -> MediaInfo {
    let (sender, receiver) = bounded(1);
    let probe_source = source.clone();
    std::thread::spawn(move || {
        let _ = sender.send(inspector.inspect(&probe_source));
    });
    match receiver.recv_timeout(wait) {
        Ok(Ok(info)) => {
            debug!(source = %source, duration = info.duration, "probe resolved");
            info
        }
        Ok(Err(error)) => {
            warn!(source = %source, %error, "probe failed, using fallbacks");
            MediaInfo::fallback()
        }
        Err(_) => {
            warn!(source = %source, wait_ms = wait.as_millis() as u64, "probe timed out, using fallbacks");
            MediaInfo::fallback()
        }
    }
}
