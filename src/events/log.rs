//! Bounded event history backing the log panel

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::constants::DEFAULT_LOG_CAPACITY;
use crate::events::AppEvent;

/// Most recent events, newest first, evicting the oldest past `capacity`
#[derive(Clone, Debug)]
pub struct EventLog {
    events: VecDeque<AppEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EventLog {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: AppEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_back();
        }
        self.events.push_front(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events newest first
    pub fn iter(&self) -> impl Iterator<Item = &AppEvent> {
        self.events.iter()
    }

    /// Distinct scopes present in the log, sorted
    pub fn scopes(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.scope.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Events newest first, restricted to `scope` when given
    pub fn filtered(&self, scope: Option<&str>) -> Vec<AppEvent> {
        self.events
            .iter()
            .filter(|e| scope.map_or(true, |s| e.scope.as_deref() == Some(s)))
            .cloned()
            .collect()
    }

    /// Pretty-printed JSON array in display order
    pub fn export_json(&self) -> Result<String> {
        let events: Vec<&AppEvent> = self.events.iter().collect();
        serde_json::to_string_pretty(&events).context("Failed to serialize event log")
    }

    /// Write the export next to other downloads and return its path
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        self.export_to_dir_at(dir, Utc::now())
    }

    pub fn export_to_dir_at(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        let content = self.export_json()?;
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let path = dir.join(export_file_name(now));
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), events = self.len(), "Exported event log");
        Ok(path)
    }
}

/// `event-log-<ISO8601>.json` with `-` for the time separators, which
/// Windows does not allow as `:` in file names
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("event-log-{}.json", now.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}
