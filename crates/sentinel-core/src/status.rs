use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::GuildId;

/// Live per-guild member counts, fed by the gateway collaborator.
///
/// These counts are adapter data, not store data: the platform adapter seeds
/// them on startup enumeration and the dispatcher bumps them on member-join
/// events. They exist only to back the status report's user count.
#[derive(Default)]
pub struct Census {
    counts: Mutex<HashMap<GuildId, u64>>,
}

impl Census {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_join(&self, guild: GuildId) {
        let mut counts = self.counts.lock().await;
        *counts.entry(guild).or_insert(0) += 1;
    }

    /// Seed or correct a guild's member count (startup-enumeration seam).
    pub async fn set_count(&self, guild: GuildId, count: u64) {
        self.counts.lock().await.insert(guild, count);
    }

    pub async fn counts(&self) -> HashMap<GuildId, u64> {
        self.counts.lock().await.clone()
    }
}

/// Payload of the internal status command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: &'static str,
    pub tenant_count: usize,
    pub user_count: u64,
    pub uptime_seconds: i64,
}

/// Query-only read model behind the internal status endpoint.
pub struct StatusGateway {
    started_at: Option<DateTime<Utc>>,
}

impl StatusGateway {
    pub fn new(started_at: Option<DateTime<Utc>>) -> Self {
        Self { started_at }
    }

    /// Assemble the status report. Uptime is measured from process start and
    /// reported as 0 when the start time is unknown or in the future.
    pub fn report(&self, tenant_count: usize, user_count: u64, now: DateTime<Utc>) -> StatusReport {
        let uptime_seconds = self
            .started_at
            .map(|started| (now - started).num_seconds().max(0))
            .unwrap_or(0);

        StatusReport {
            status: "ok",
            tenant_count,
            user_count,
            uptime_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn census_tracks_joins_and_seeds() {
        let census = Census::new();
        census.set_count(GuildId(1), 10).await;
        census.record_join(GuildId(1)).await;
        census.record_join(GuildId(2)).await;

        let counts = census.counts().await;
        assert_eq!(counts.get(&GuildId(1)), Some(&11));
        assert_eq!(counts.get(&GuildId(2)), Some(&1));
    }

    #[test]
    fn report_measures_uptime_from_start() {
        let gw = StatusGateway::new(Some(at("2026-01-01T00:00:00Z")));
        let report = gw.report(3, 150, at("2026-01-01T00:02:05Z"));

        assert_eq!(report.status, "ok");
        assert_eq!(report.tenant_count, 3);
        assert_eq!(report.user_count, 150);
        assert_eq!(report.uptime_seconds, 125);
    }

    #[test]
    fn report_without_start_time_has_zero_uptime() {
        let gw = StatusGateway::new(None);
        assert_eq!(gw.report(0, 0, Utc::now()).uptime_seconds, 0);
    }

    #[test]
    fn report_clamps_future_start_time_to_zero() {
        let gw = StatusGateway::new(Some(at("2026-01-02T00:00:00Z")));
        let report = gw.report(0, 0, at("2026-01-01T00:00:00Z"));
        assert_eq!(report.uptime_seconds, 0);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let gw = StatusGateway::new(Some(at("2026-01-01T00:00:00Z")));
        let report = gw.report(2, 40, at("2026-01-01T00:00:30Z"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "ok",
                "tenantCount": 2,
                "userCount": 40,
                "uptimeSeconds": 30,
            })
        );
    }
}
