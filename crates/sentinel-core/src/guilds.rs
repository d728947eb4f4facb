use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ChannelId, GuildId};

/// Per-guild configuration record.
///
/// Every record carries all four fields; an unset channel ref means the guild
/// has not been through setup yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildConfig {
    pub logging_enabled: bool,
    pub security_channel: Option<ChannelId>,
    pub server_log_channel: Option<ChannelId>,
    pub message_log_channel: Option<ChannelId>,
}

/// Channel refs produced by the setup flow. The channels are created by the
/// platform adapter before the core is invoked; the core only records them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProvisionedChannels {
    pub security: ChannelId,
    pub server_log: ChannelId,
    pub message_log: ChannelId,
}

/// Registry of the guilds the bot serves.
///
/// Records are created on first contact and never deleted in-process.
#[derive(Default)]
pub struct GuildStore {
    records: Mutex<HashMap<GuildId, GuildConfig>>,
}

impl GuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a guild on first contact, with `settings` or the default
    /// record. Idempotent: an existing record is left untouched.
    pub async fn ensure(&self, guild: GuildId, settings: Option<GuildConfig>) {
        let mut records = self.records.lock().await;
        records
            .entry(guild)
            .or_insert_with(|| settings.unwrap_or_default());
    }

    /// Replace the guild's record after channel provisioning. Acts as an
    /// upsert: no precondition on prior registration.
    pub async fn apply_setup(&self, guild: GuildId, channels: ProvisionedChannels) {
        let mut records = self.records.lock().await;
        records.insert(
            guild,
            GuildConfig {
                logging_enabled: true,
                security_channel: Some(channels.security),
                server_log_channel: Some(channels.server_log),
                message_log_channel: Some(channels.message_log),
            },
        );
    }

    pub async fn get(&self, guild: GuildId) -> Option<GuildConfig> {
        self.records.lock().await.get(&guild).cloned()
    }

    pub async fn contains(&self, guild: GuildId) -> bool {
        self.records.lock().await.contains_key(&guild)
    }

    pub async fn count(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Sum the supplied per-guild member counts for guilds known to this
    /// store. The counts themselves are owned by the gateway collaborator.
    pub async fn total_members(&self, counts: &HashMap<GuildId, u64>) -> u64 {
        let records = self.records.lock().await;
        counts
            .iter()
            .filter(|(guild, _)| records.contains_key(guild))
            .map(|(_, n)| *n)
            .sum()
    }
}
