use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{domain::GuildId, guilds::GuildStore};

/// One entry in a guild's event log. Immutable after append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: String,
}

/// Append-only log of textual events, one ordered sequence per guild.
///
/// Entries are ordered by insertion and never evicted, so a long-lived
/// process grows without bound. Appends to a guild the [`GuildStore`] does
/// not know are silent no-ops.
pub struct EventLog {
    guilds: Arc<GuildStore>,
    logs: Mutex<HashMap<GuildId, Vec<EventLogEntry>>>,
}

impl EventLog {
    pub fn new(guilds: Arc<GuildStore>) -> Self {
        Self {
            guilds,
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Append an event for a known guild; no-op for unknown guilds.
    pub async fn append(&self, guild: GuildId, event: impl Into<String>) {
        self.append_at(guild, event, Utc::now()).await;
    }

    pub async fn append_at(&self, guild: GuildId, event: impl Into<String>, now: DateTime<Utc>) {
        if !self.guilds.contains(guild).await {
            return;
        }

        let mut logs = self.logs.lock().await;
        logs.entry(guild).or_default().push(EventLogEntry {
            timestamp: now,
            event: event.into(),
        });
    }

    /// Materialize an empty sequence for a guild. Called when a guild is
    /// first registered; an existing sequence is left untouched.
    pub async fn ensure_log(&self, guild: GuildId) {
        let mut logs = self.logs.lock().await;
        logs.entry(guild).or_default();
    }

    /// Full sequence for a guild, oldest first. Empty for unknown guilds.
    pub async fn list(&self, guild: GuildId) -> Vec<EventLogEntry> {
        self.logs.lock().await.get(&guild).cloned().unwrap_or_default()
    }
}
