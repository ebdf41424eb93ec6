//! Snapshot caches for time-bounded regeneration
//!
//! A rendered page is reused until its revalidation window has elapsed.
//! The server keeps snapshots in memory; `generate` keeps a manifest on disk
//! recording when each route was last written.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::RwLock;

/// Cache directory, relative to the site directory
pub const CACHE_DIR: &str = ".spacetraveling-cache";

/// Manifest file name inside `CACHE_DIR`
const MANIFEST_FILE: &str = "manifest.json";

/// Whether a snapshot `elapsed` old may still be served.
/// Without a window a snapshot never expires.
pub fn within_window(elapsed: Duration, revalidate: Option<Duration>) -> bool {
    match revalidate {
        Some(window) => elapsed < window,
        None => true,
    }
}

/// A rendered page kept for reuse
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: Arc<str>,
    pub generated_at: Instant,
    pub revalidate: Option<Duration>,
}

impl Snapshot {
    pub fn new(html: impl Into<Arc<str>>, generated_at: Instant, revalidate: Option<Duration>) -> Self {
        Self {
            html: html.into(),
            generated_at,
            revalidate,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        within_window(now.saturating_duration_since(self.generated_at), self.revalidate)
    }
}

/// In-memory snapshots keyed by route
#[derive(Debug, Default)]
pub struct RevalidationCache {
    entries: RwLock<HashMap<String, Snapshot>>,
}

impl RevalidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot of `route` if it is still inside its window
    pub async fn get_fresh(&self, route: &str, now: Instant) -> Option<Snapshot> {
        let entries = self.entries.read().await;
        entries.get(route).filter(|s| s.is_fresh(now)).cloned()
    }

    /// The last snapshot of `route`, fresh or not
    pub async fn get(&self, route: &str) -> Option<Snapshot> {
        self.entries.read().await.get(route).cloned()
    }

    pub async fn insert(&self, route: &str, snapshot: Snapshot) {
        self.entries.write().await.insert(route.to_string(), snapshot);
    }

    pub async fn remove(&self, route: &str) {
        self.entries.write().await.remove(route);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// A route written by `generate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteEntry {
    /// Generation time (unix seconds)
    pub generated_at: u64,
    /// Revalidation window in seconds
    pub revalidate: Option<u64>,
    /// Output path relative to the public dir
    pub output_path: String,
}

/// On-disk record of generated routes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// Version of the manifest format
    pub version: u32,
    /// Entries keyed by route
    pub routes: HashMap<String, RouteEntry>,
}

impl Manifest {
    /// Current manifest format version
    const VERSION: u32 = 1;

    /// Create an empty manifest with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Load the manifest from disk, or start an empty one
    pub fn load(base_dir: &Path) -> Self {
        let path = base_dir.join(CACHE_DIR).join(MANIFEST_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(manifest) = serde_json::from_str::<Manifest>(&content) {
                if manifest.version == Self::VERSION {
                    return manifest;
                }
                tracing::info!("Manifest version mismatch, regenerating everything");
            }
        }
        Self::new()
    }

    /// Save the manifest to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(CACHE_DIR);
        fs::create_dir_all(&cache_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_dir.join(MANIFEST_FILE), content)?;
        Ok(())
    }

    /// Whether `route` was generated recently enough to skip, given that
    /// `public_dir` still holds its output.
    ///
    /// The shorter of the recorded window and `window` applies.
    pub fn is_fresh(
        &self,
        route: &str,
        now: u64,
        public_dir: &Path,
        window: Option<Duration>,
    ) -> bool {
        let Some(entry) = self.routes.get(route) else {
            return false;
        };
        if !public_dir.join(&entry.output_path).exists() {
            return false;
        }
        let elapsed = Duration::from_secs(now.saturating_sub(entry.generated_at));
        let recorded = entry.revalidate.map(Duration::from_secs);
        let window = match (recorded, window) {
            (Some(recorded), Some(current)) => Some(recorded.min(current)),
            (recorded, current) => recorded.or(current),
        };
        within_window(elapsed, window)
    }

    pub fn record(&mut self, route: &str, entry: RouteEntry) {
        self.routes.insert(route.to_string(), entry);
    }

    /// Forget routes that are no longer generated
    pub fn retain_routes(&mut self, keep: &[String]) {
        self.routes.retain(|route, _| keep.contains(route));
    }
}

/// Current time as unix seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
