use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{domain::UserId, errors::Error, Result};

pub const PAGE_SIZE: usize = 5;

/// One registered short link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    pub target_url: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub usage_count: u64,
}

/// Directory of short code -> link record, shared across all guilds.
///
/// Backed by an insertion-ordered sequence of pairs so that paging walks
/// records in creation order and an overwrite keeps the original position.
///
/// Two quirks are deliberate, inherited behavior:
/// - auto codes derive from the current directory size, not a monotonic
///   counter, so a number freed by deletion can be handed out again;
/// - creating under an existing code (alias reuse or such a collision)
///   overwrites the old record in place.
#[derive(Default)]
pub struct LinkDirectory {
    entries: Mutex<Vec<(String, LinkRecord)>>,
}

impl LinkDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link under `alias`, or under the next auto code.
    pub async fn create(
        &self,
        target_url: &str,
        owner: UserId,
        alias: Option<&str>,
    ) -> Result<String> {
        self.create_at(target_url, owner, alias, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        target_url: &str,
        owner: UserId,
        alias: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if !target_url.starts_with("http://") && !target_url.starts_with("https://") {
            return Err(Error::InvalidScheme);
        }

        let mut entries = self.entries.lock().await;
        let code = match alias {
            Some(alias) => alias.to_string(),
            None => (entries.len() + 1).to_string(),
        };
        let record = LinkRecord {
            target_url: target_url.to_string(),
            owner,
            created_at: now,
            usage_count: 0,
        };

        match entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => *existing = record,
            None => entries.push((code.clone(), record)),
        }

        Ok(code)
    }

    /// Remove a link. Only the owner or a privileged requester may delete.
    pub async fn delete(
        &self,
        code: &str,
        requester: UserId,
        requester_is_privileged: bool,
    ) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let Some(idx) = entries.iter().position(|(c, _)| c == code) else {
            return Err(Error::NotFound(code.to_string()));
        };

        if entries[idx].1.owner != requester && !requester_is_privileged {
            return Err(Error::Forbidden);
        }

        entries.remove(idx);
        Ok(())
    }

    /// One 1-indexed page of `PAGE_SIZE` entries, in insertion order.
    ///
    /// `max_page` is `len / PAGE_SIZE + 1`, which admits one empty page past
    /// the end when `len` is an exact multiple of `PAGE_SIZE` (inherited).
    pub async fn list_page(&self, page: usize) -> Result<Vec<(String, LinkRecord)>> {
        let entries = self.entries.lock().await;
        let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
        let slice: Vec<_> = entries.iter().skip(start).take(PAGE_SIZE).cloned().collect();

        if page == 0 || slice.is_empty() {
            return Err(Error::InvalidPage {
                max_page: Self::max_page_for(entries.len()),
            });
        }

        Ok(slice)
    }

    pub fn max_page_for(len: usize) -> usize {
        len / PAGE_SIZE + 1
    }

    pub async fn resolve(&self, code: &str) -> Option<LinkRecord> {
        let entries = self.entries.lock().await;
        entries.iter().find(|(c, _)| c == code).map(|(_, r)| r.clone())
    }

    /// Bump the usage counter. No-op for unknown codes.
    pub async fn increment_usage(&self, code: &str) {
        let mut entries = self.entries.lock().await;
        if let Some((_, record)) = entries.iter_mut().find(|(c, _)| c == code) {
            record.usage_count += 1;
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
