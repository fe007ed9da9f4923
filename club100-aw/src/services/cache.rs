//! Persistent download cache
//!
//! Full-length downloads are kept on disk keyed by the source's video id
//! (`<id>.full.m4a`) and survive process restarts. Concurrent tasks may race
//! on the same key: both miss, both download, both write. The writes carry
//! the same content, so the race is tolerated rather than locked away.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// File-backed cache of full-length downloads
#[derive(Debug, Clone)]
pub struct MediaCache {
    dir: PathBuf,
    ttl: Duration,
}

impl MediaCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    fn entry_path(&self, video_id: &str) -> PathBuf {
        self.dir.join(format!("{video_id}.full.m4a"))
    }

    /// Path of a cached full download, if present
    pub fn lookup(&self, video_id: &str) -> Option<PathBuf> {
        let path = self.entry_path(video_id);
        path.exists().then_some(path)
    }

    /// Copy a cached entry to a local working path
    pub fn copy_to(&self, video_id: &str, dest: &Path) -> std::io::Result<bool> {
        match self.lookup(video_id) {
            Some(cached) => {
                std::fs::copy(&cached, dest)?;
                debug!(video_id, "Cache hit");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write-through a freshly downloaded full file
    pub fn store(&self, video_id: &str, source: &Path) -> std::io::Result<()> {
        std::fs::copy(source, self.entry_path(video_id))?;
        debug!(video_id, "Cached full download");
        Ok(())
    }

    /// Remove entries older than the TTL; returns how many were removed.
    ///
    /// Driven by the background sweeper task, and directly by tests.
    pub fn sweep_expired(&self) -> std::io::Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("m4a") {
                continue;
            }
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.elapsed().ok());
            if let Some(age) = age {
                if age >= self.ttl {
                    match std::fs::remove_file(&path) {
                        Ok(()) => removed += 1,
                        Err(e) => warn!(path = %path.display(), error = %e, "Failed to evict cache entry"),
                    }
                }
            }
        }
        Ok(removed)
    }

    /// Delete every entry regardless of age
    pub fn clear(&self) -> std::io::Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_in(dir: &Path, ttl: Duration) -> MediaCache {
        MediaCache::new(dir, ttl)
    }

    #[test]
    fn store_then_lookup_and_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path(), Duration::from_secs(3600));

        let source = tmp.path().join("download.m4a");
        std::fs::write(&source, b"audio").unwrap();

        assert!(cache.lookup("dQw4w9WgXcQ").is_none());
        cache.store("dQw4w9WgXcQ", &source).unwrap();
        assert!(cache.lookup("dQw4w9WgXcQ").is_some());

        let dest = tmp.path().join("copy.m4a");
        assert!(cache.copy_to("dQw4w9WgXcQ", &dest).unwrap());
        assert_eq!(std::fs::read(&dest).unwrap(), b"audio");
        assert!(!cache.copy_to("unknown-id00", &tmp.path().join("x")).unwrap());
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("seed.m4a");
        std::fs::write(&source, b"audio").unwrap();

        // Generous TTL keeps everything
        let fresh = cache_in(tmp.path(), Duration::from_secs(3600));
        fresh.store("keepkeep000", &source).unwrap();
        assert_eq!(fresh.sweep_expired().unwrap(), 0);
        assert!(fresh.lookup("keepkeep000").is_some());

        // Zero TTL treats every entry as expired
        let expired = cache_in(tmp.path(), Duration::ZERO);
        assert!(expired.sweep_expired().unwrap() >= 1);
        assert!(expired.lookup("keepkeep000").is_none());
    }

    #[test]
    fn clear_wipes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = cache_in(tmp.path(), Duration::from_secs(3600));
        let source = tmp.path().join("seed.bin");
        std::fs::write(&source, b"audio").unwrap();
        cache.store("aaaaaaaaaaa", &source).unwrap();
        cache.store("bbbbbbbbbbb", &source).unwrap();

        let removed = cache.clear().unwrap();
        assert!(removed >= 2);
        assert!(cache.lookup("aaaaaaaaaaa").is_none());
    }
}
