use chrono::{DateTime, Utc};
use lyceum_core::authorization::{AccessDecision, CampusId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// One authorization decision taken by the permission middleware.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub principal: String,
    pub permission: String,
    pub campus: Option<CampusId>,
    pub allowed: bool,
    pub reason: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditFilter {
    pub principal: Option<String>,
    pub permission: Option<String>,
    pub allowed: Option<bool>,
    /// Maximum number of entries, newest first
    pub limit: Option<usize>,
}

impl AuditFilter {
    fn matches(&self, entry: &AuditEntry) -> bool {
        self.principal
            .as_deref()
            .is_none_or(|p| entry.principal == p)
            && self
                .permission
                .as_deref()
                .is_none_or(|p| entry.permission == p)
            && self.allowed.is_none_or(|a| entry.allowed == a)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuditStatistics {
    pub total: usize,
    pub allowed: usize,
    pub denied: usize,
    pub by_permission: BTreeMap<String, usize>,
    pub oldest: Option<DateTime<Utc>>,
}

/// Bounded in-memory log of authorization decisions. The oldest entries
/// are dropped once `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    max_entries: usize,
}

impl AuditLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    pub async fn record(
        &self,
        principal: &str,
        permission: &str,
        campus: Option<CampusId>,
        decision: &AccessDecision,
        path: Option<&str>,
    ) -> AuditEntry {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            principal: principal.to_string(),
            permission: permission.to_string(),
            campus,
            allowed: decision.is_allowed(),
            reason: decision.reason(),
            path: path.map(str::to_string),
        };

        if entry.allowed {
            info!(
                principal,
                permission,
                campus = ?campus,
                "Access granted: {}",
                entry.reason
            );
        } else {
            warn!(
                principal,
                permission,
                campus = ?campus,
                "Access denied: {}",
                entry.reason
            );
        }

        if self.max_entries > 0 {
            let mut entries = self.entries.write().await;
            while entries.len() >= self.max_entries {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        entry
    }

    /// Matching entries, newest first
    pub async fn list(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub async fn statistics(&self) -> AuditStatistics {
        let entries = self.entries.read().await;
        let mut stats = AuditStatistics {
            total: entries.len(),
            oldest: entries.front().map(|e| e.timestamp),
            ..Default::default()
        };
        for entry in entries.iter() {
            if entry.allowed {
                stats.allowed += 1;
            } else {
                stats.denied += 1;
            }
            *stats
                .by_permission
                .entry(entry.permission.clone())
                .or_default() += 1;
        }
        stats
    }

    /// Drop entries older than `before`, returning how many were removed
    pub async fn purge_before(&self, before: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.retain(|e| e.timestamp >= before);
        let purged = count - entries.len();
        info!("Purged {} audit entries older than {}", purged, before);
        purged
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted() -> AccessDecision {
        AccessDecision::Granted {
            role: "editor".to_string(),
            campus: None,
        }
    }

    #[tokio::test]
    async fn test_ring_drops_oldest_entries() {
        let log = AuditLog::new(2);
        log.record("a@example.org", "news.view", None, &granted(), None)
            .await;
        log.record("b@example.org", "news.view", None, &granted(), None)
            .await;
        log.record("c@example.org", "news.edit", None, &AccessDecision::Denied, None)
            .await;

        let entries = log.list(&AuditFilter::default()).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].principal, "c@example.org");
        assert_eq!(entries[1].principal, "b@example.org");
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_nothing() {
        let log = AuditLog::new(0);
        let entry = log
            .record("a@example.org", "news.view", None, &granted(), None)
            .await;
        assert!(entry.allowed);
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_filter_and_statistics() {
        let log = AuditLog::new(100);
        log.record("a@example.org", "news.view", None, &granted(), Some("/x"))
            .await;
        log.record("a@example.org", "news.edit", None, &AccessDecision::Denied, None)
            .await;
        log.record("b@example.org", "news.edit", None, &AccessDecision::Denied, None)
            .await;

        let denied = log
            .list(&AuditFilter {
                allowed: Some(false),
                ..Default::default()
            })
            .await;
        assert_eq!(denied.len(), 2);

        let alice = log
            .list(&AuditFilter {
                principal: Some("a@example.org".to_string()),
                limit: Some(1),
                ..Default::default()
            })
            .await;
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].permission, "news.edit");

        let stats = log.statistics().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.allowed, 1);
        assert_eq!(stats.denied, 2);
        assert_eq!(stats.by_permission["news.edit"], 2);
        assert!(stats.oldest.is_some());
    }

    #[tokio::test]
    async fn test_purge_before() {
        let log = AuditLog::new(100);
        log.record("a@example.org", "news.view", None, &granted(), None)
            .await;
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(log.purge_before(cutoff).await, 1);
        assert_eq!(log.len().await, 0);
        assert_eq!(log.purge_before(cutoff).await, 0);
    }
}
