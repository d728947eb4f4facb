use std::sync::Arc;

use crate::{
    domain::{GuildId, UserId},
    events::EventLog,
    guilds::{GuildStore, ProvisionedChannels},
    links::{LinkDirectory, LinkRecord},
    Result,
};

/// Outcome of a successful create-url command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedLink {
    pub code: String,
    /// Full short URL, present when a public base domain is configured.
    pub short_url: Option<String>,
}

/// One listed link, enriched with its full short URL when available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedLink {
    pub code: String,
    pub short_url: Option<String>,
    pub record: LinkRecord,
}

/// One page of the link directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPage {
    pub page: usize,
    pub max_page: usize,
    pub links: Vec<ListedLink>,
}

/// Stateless orchestration over the stores, one method per supported command.
///
/// Policy stays in the stores (ownership checks) or in the dispatcher
/// (administrator gating); this layer only composes and shapes payloads.
/// Display formatting belongs to the platform adapters.
pub struct CommandService {
    guilds: Arc<GuildStore>,
    events: Arc<EventLog>,
    links: Arc<LinkDirectory>,
    /// Public base domain for rendered short URLs, e.g. `s.example.app`.
    public_base: Option<String>,
}

impl CommandService {
    pub fn new(
        guilds: Arc<GuildStore>,
        events: Arc<EventLog>,
        links: Arc<LinkDirectory>,
        public_base: Option<String>,
    ) -> Self {
        Self {
            guilds,
            events,
            links,
            public_base,
        }
    }

    pub async fn create_url(
        &self,
        caller: UserId,
        url: &str,
        alias: Option<&str>,
    ) -> Result<CreatedLink> {
        let code = self.links.create(url, caller, alias).await?;
        let short_url = self.short_url(&code);
        Ok(CreatedLink { code, short_url })
    }

    pub async fn delete_url(
        &self,
        caller: UserId,
        code: &str,
        caller_is_privileged: bool,
    ) -> Result<()> {
        self.links.delete(code, caller, caller_is_privileged).await
    }

    /// One page of registered links. An empty directory is an empty page,
    /// not an error; beyond that, paging errors pass through.
    pub async fn list_urls(&self, page: usize) -> Result<LinkPage> {
        if self.links.is_empty().await {
            return Ok(LinkPage {
                page,
                max_page: 1,
                links: Vec::new(),
            });
        }

        let entries = self.links.list_page(page).await?;
        let max_page = LinkDirectory::max_page_for(self.links.len().await);
        let links = entries
            .into_iter()
            .map(|(code, record)| ListedLink {
                short_url: self.short_url(&code),
                code,
                record,
            })
            .collect();

        Ok(LinkPage {
            page,
            max_page,
            links,
        })
    }

    /// Record the channel refs provisioned for a guild. The channels were
    /// created by the platform adapter; administrator privilege was checked
    /// by the dispatcher.
    pub async fn setup_guild(&self, guild: GuildId, channels: ProvisionedChannels) {
        self.guilds.apply_setup(guild, channels).await;
    }

    pub async fn record_member_join(&self, guild: GuildId, member_name: &str) {
        self.events
            .append(guild, format!("Member joined: {member_name}"))
            .await;
    }

    pub async fn record_tenant_join(&self, guild: GuildId) {
        self.guilds.ensure(guild, None).await;
        self.events.ensure_log(guild).await;
    }

    fn short_url(&self, code: &str) -> Option<String> {
        self.public_base
            .as_deref()
            .map(|base| format!("https://{base}/u/{code}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ChannelId, errors::Error};

    fn service(public_base: Option<&str>) -> CommandService {
        let guilds = Arc::new(GuildStore::new());
        let events = Arc::new(EventLog::new(guilds.clone()));
        let links = Arc::new(LinkDirectory::new());
        CommandService::new(guilds, events, links, public_base.map(str::to_string))
    }

    #[tokio::test]
    async fn create_url_renders_full_short_url_when_domain_is_set() {
        let svc = service(Some("s.example.app"));

        let created = svc.create_url(UserId(1), "http://a.com", None).await.unwrap();
        assert_eq!(created.code, "1");
        assert_eq!(
            created.short_url.as_deref(),
            Some("https://s.example.app/u/1")
        );
    }

    #[tokio::test]
    async fn create_url_without_domain_carries_bare_code() {
        let svc = service(None);

        let created = svc
            .create_url(UserId(1), "https://a.com", Some("home"))
            .await
            .unwrap();
        assert_eq!(created.code, "home");
        assert_eq!(created.short_url, None);
    }

    #[tokio::test]
    async fn list_urls_on_empty_directory_is_an_empty_page() {
        let svc = service(None);

        let page = svc.list_urls(1).await.unwrap();
        assert!(page.links.is_empty());
        assert_eq!(page.max_page, 1);
    }

    #[tokio::test]
    async fn list_urls_passes_paging_errors_through() {
        let svc = service(None);
        svc.create_url(UserId(1), "http://a.com", None).await.unwrap();

        let err = svc.list_urls(5).await.unwrap_err();
        assert_eq!(err, Error::InvalidPage { max_page: 1 });
    }

    #[tokio::test]
    async fn list_urls_returns_entries_in_creation_order() {
        let svc = service(Some("s.example.app"));
        svc.create_url(UserId(1), "http://a.com", None).await.unwrap();
        svc.create_url(UserId(1), "http://b.com", Some("home"))
            .await
            .unwrap();

        let page = svc.list_urls(1).await.unwrap();
        let codes: Vec<_> = page.links.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "home"]);
        assert_eq!(
            page.links[1].short_url.as_deref(),
            Some("https://s.example.app/u/home")
        );
    }

    #[tokio::test]
    async fn setup_guild_records_the_provisioned_channels() {
        let svc = service(None);
        svc.setup_guild(
            GuildId(1),
            ProvisionedChannels {
                security: ChannelId(10),
                server_log: ChannelId(11),
                message_log: ChannelId(12),
            },
        )
        .await;

        let record = svc.guilds.get(GuildId(1)).await.unwrap();
        assert!(record.logging_enabled);
        assert_eq!(record.security_channel, Some(ChannelId(10)));
    }

    #[tokio::test]
    async fn member_join_is_logged_for_known_guilds_only() {
        let svc = service(None);
        svc.record_tenant_join(GuildId(1)).await;

        svc.record_member_join(GuildId(1), "alice").await;
        svc.record_member_join(GuildId(2), "bob").await;

        let entries = svc.events.list(GuildId(1)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "Member joined: alice");
        assert!(svc.events.list(GuildId(2)).await.is_empty());
    }

    #[tokio::test]
    async fn tenant_join_registers_guild_and_log() {
        let svc = service(None);
        svc.record_tenant_join(GuildId(7)).await;

        assert!(svc.guilds.contains(GuildId(7)).await);
        assert!(svc.events.list(GuildId(7)).await.is_empty());

        // Idempotent across reconnect-style repeats.
        svc.record_tenant_join(GuildId(7)).await;
        assert_eq!(svc.guilds.count().await, 1);
    }
}
