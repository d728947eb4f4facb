use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    commands::{CommandService, LinkPage},
    domain::{GuildId, UserId},
    errors::Error,
    guilds::ProvisionedChannels,
    status::Census,
    Result,
};

/// Events and command invocations delivered by the chat platform adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayEvent {
    TenantJoined {
        guild: GuildId,
    },
    MemberJoined {
        guild: GuildId,
        member_name: String,
    },
    CreateUrl {
        guild: GuildId,
        caller: UserId,
        url: String,
        alias: Option<String>,
    },
    DeleteUrl {
        guild: GuildId,
        caller: UserId,
        code: String,
        caller_is_privileged: bool,
    },
    ListUrls {
        page: usize,
    },
    SetupGuild {
        guild: GuildId,
        channels: ProvisionedChannels,
        caller_is_privileged: bool,
    },
}

/// Typed outcomes the platform adapter renders into replies. The core never
/// formats display strings; these carry raw data only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    Welcome {
        guild: GuildId,
        member_name: String,
    },
    UrlCreated {
        code: String,
        short_url: Option<String>,
    },
    UrlDeleted {
        code: String,
    },
    UrlList(LinkPage),
    SetupComplete {
        guild: GuildId,
        channels: ProvisionedChannels,
    },
    CommandFailed {
        error: Error,
    },
}

/// Cross-platform reply port.
///
/// The binary ships a tracing-backed sink; a chat adapter would deliver each
/// reply to the channel the triggering event came from.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, reply: CommandReply) -> Result<()>;
}

/// Routes gateway events into the command service and replies through the
/// sink. Command errors become [`CommandReply::CommandFailed`]; nothing
/// propagates out of the dispatch loop.
pub struct Dispatcher {
    commands: Arc<CommandService>,
    census: Arc<Census>,
    sink: Arc<dyn ReplySink>,
}

impl Dispatcher {
    pub fn new(commands: Arc<CommandService>, census: Arc<Census>, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            commands,
            census,
            sink,
        }
    }

    pub async fn dispatch(&self, event: GatewayEvent) -> Result<()> {
        let reply = self.handle(event).await;
        match reply {
            Some(reply) => self.sink.deliver(reply).await,
            None => Ok(()),
        }
    }

    async fn handle(&self, event: GatewayEvent) -> Option<CommandReply> {
        match event {
            GatewayEvent::TenantJoined { guild } => {
                self.commands.record_tenant_join(guild).await;
                info!(guild = guild.0, "tenant joined");
                None
            }
            GatewayEvent::MemberJoined { guild, member_name } => {
                self.commands.record_member_join(guild, &member_name).await;
                self.census.record_join(guild).await;
                Some(CommandReply::Welcome { guild, member_name })
            }
            GatewayEvent::CreateUrl {
                caller, url, alias, ..
            } => Some(
                match self.commands.create_url(caller, &url, alias.as_deref()).await {
                    Ok(created) => CommandReply::UrlCreated {
                        code: created.code,
                        short_url: created.short_url,
                    },
                    Err(error) => CommandReply::CommandFailed { error },
                },
            ),
            GatewayEvent::DeleteUrl {
                caller,
                code,
                caller_is_privileged,
                ..
            } => Some(
                match self
                    .commands
                    .delete_url(caller, &code, caller_is_privileged)
                    .await
                {
                    Ok(()) => CommandReply::UrlDeleted { code },
                    Err(error) => CommandReply::CommandFailed { error },
                },
            ),
            GatewayEvent::ListUrls { page } => Some(match self.commands.list_urls(page).await {
                Ok(page) => CommandReply::UrlList(page),
                Err(error) => CommandReply::CommandFailed { error },
            }),
            GatewayEvent::SetupGuild {
                guild,
                channels,
                caller_is_privileged,
            } => {
                // Administrator gating lives here, before any store is touched.
                if !caller_is_privileged {
                    return Some(CommandReply::CommandFailed {
                        error: Error::Forbidden,
                    });
                }
                self.commands.setup_guild(guild, channels).await;
                Some(CommandReply::SetupComplete { guild, channels })
            }
        }
    }
}

/// Unbounded channel plus a consumer task draining it through a dispatcher.
///
/// The sending half is the seam where a chat platform adapter plugs in. The
/// task ends once every sender is dropped and the queue is drained; delivery
/// failures are logged and do not stop the loop.
pub struct EventPipeline;

impl EventPipeline {
    pub fn spawn(
        dispatcher: Dispatcher,
    ) -> (
        mpsc::UnboundedSender<GatewayEvent>,
        tokio::task::JoinHandle<()>,
    ) {
        let (tx, mut rx) = mpsc::unbounded_channel::<GatewayEvent>();

        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(error) = dispatcher.dispatch(event).await {
                    warn!(%error, "reply delivery failed");
                }
            }
        });

        (tx, task)
    }
}
