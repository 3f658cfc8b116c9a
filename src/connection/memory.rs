use super::{CollectionBackend, ListScope};
use crate::core::{Identity, PortalError, Record, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Backend operation, used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct CallCounters {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

impl CallCounters {
    fn slot(&self, op: BackendOp) -> &AtomicUsize {
        match op {
            BackendOp::List => &self.list,
            BackendOp::Create => &self.create,
            BackendOp::Update => &self.update,
            BackendOp::Delete => &self.delete,
        }
    }
}

#[derive(Debug)]
struct MemoryState {
    records: Vec<Record>,
    next_id: i64,
    failing: HashSet<BackendOp>,
}

/// In-process collection resource
///
/// Behaves like the REST services: it appends created records, assigns
/// integer identities, and answers lists in insertion order. Clones share
/// the same storage.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    identity_field: String,
    owner_field: Option<String>,
    update_field: Option<String>,
    state: Arc<RwLock<MemoryState>>,
    calls: Arc<CallCounters>,
}

impl MemoryCollection {
    pub fn new(identity_field: &str, update_field: &str) -> Self {
        Self {
            update_field: Some(update_field.to_string()),
            ..Self::read_only(identity_field)
        }
    }

    /// Collection whose records cannot be updated in place.
    pub fn read_only(identity_field: &str) -> Self {
        Self {
            identity_field: identity_field.to_string(),
            owner_field: None,
            update_field: None,
            state: Arc::new(RwLock::new(MemoryState {
                records: Vec::new(),
                next_id: 1,
                failing: HashSet::new(),
            })),
            calls: Arc::new(CallCounters::default()),
        }
    }

    /// Field compared against [`ListScope::Owner`].
    pub fn with_owner_field(mut self, field: &str) -> Self {
        self.owner_field = Some(field.to_string());
        self
    }

    /// Stores a record as-is, assigning an identity if it has none.
    pub async fn seed(&self, mut record: Record) -> Identity {
        let mut state = self.state.write().await;
        let identity = match record.identity(&self.identity_field) {
            Some(identity) => {
                if let Identity::Int(n) = identity {
                    state.next_id = state.next_id.max(n + 1);
                }
                identity
            }
            None => {
                let identity = Identity::Int(state.next_id);
                state.next_id += 1;
                record.set(self.identity_field.clone(), identity.to_json());
                identity
            }
        };
        state.records.push(record);
        identity
    }

    /// Makes every call of `op` fail with a 500 until cleared.
    pub async fn set_failing(&self, op: BackendOp, failing: bool) {
        let mut state = self.state.write().await;
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    pub fn calls(&self, op: BackendOp) -> usize {
        self.calls.slot(op).load(Ordering::SeqCst)
    }

    pub async fn records(&self) -> Vec<Record> {
        self.state.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    fn record_call(&self, op: BackendOp) {
        self.calls.slot(op).fetch_add(1, Ordering::SeqCst);
    }

    fn check_failing(state: &MemoryState, op: BackendOp) -> Result<()> {
        if state.failing.contains(&op) {
            return Err(PortalError::Network {
                status: 500,
                body: format!("injected {:?} failure", op),
            });
        }
        Ok(())
    }

    fn not_found(identity: &Identity) -> PortalError {
        PortalError::Network {
            status: 404,
            body: format!("record {} not found", identity),
        }
    }
}

#[async_trait]
impl CollectionBackend for MemoryCollection {
    async fn list(&self, scope: &ListScope) -> Result<Vec<Record>> {
        self.record_call(BackendOp::List);
        let state = self.state.read().await;
        Self::check_failing(&state, BackendOp::List)?;

        let rows = match (scope, &self.owner_field) {
            (ListScope::Owner(owner), Some(field)) => state
                .records
                .iter()
                .filter(|record| record.text(field) == *owner)
                .cloned()
                .collect(),
            _ => state.records.clone(),
        };
        Ok(rows)
    }

    async fn create(&self, mut body: Record) -> Result<Record> {
        self.record_call(BackendOp::Create);
        let mut state = self.state.write().await;
        Self::check_failing(&state, BackendOp::Create)?;

        let identity = Identity::Int(state.next_id);
        state.next_id += 1;
        body.set(self.identity_field.clone(), identity.to_json());
        state.records.push(body.clone());
        Ok(body)
    }

    async fn update(&self, identity: &Identity, value: Value) -> Result<()> {
        self.record_call(BackendOp::Update);
        let mut state = self.state.write().await;
        Self::check_failing(&state, BackendOp::Update)?;
        let Some(field) = &self.update_field else {
            return Err(PortalError::Network {
                status: 405,
                body: "collection does not accept updates".to_string(),
            });
        };

        let record = state
            .records
            .iter_mut()
            .find(|record| record.identity(&self.identity_field).as_ref() == Some(identity))
            .ok_or_else(|| Self::not_found(identity))?;
        record.set(field.clone(), value);
        Ok(())
    }

    async fn delete(&self, identity: &Identity) -> Result<()> {
        self.record_call(BackendOp::Delete);
        let mut state = self.state.write().await;
        Self::check_failing(&state, BackendOp::Delete)?;

        let before = state.records.len();
        let identity_field = self.identity_field.clone();
        state
            .records
            .retain(|record| record.identity(&identity_field).as_ref() != Some(identity));
        if state.records.len() == before {
            return Err(Self::not_found(identity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let backend = MemoryCollection::new("id", "status");
        let created = backend
            .create(Record::new().with("status", "OPEN"))
            .await
            .unwrap();

        assert_eq!(created.identity("id"), Some(Identity::Int(1)));
        assert_eq!(backend.len().await, 1);
        assert_eq!(backend.calls(BackendOp::Create), 1);
    }

    #[tokio::test]
    async fn test_owner_scope_filters() {
        let backend = MemoryCollection::read_only("visitorId").with_owner_field("userId");
        backend.seed(Record::new().with("userId", "7")).await;
        backend.seed(Record::new().with("userId", "8")).await;

        let mine = backend.list(&ListScope::Owner("7".into())).await.unwrap();
        assert_eq!(mine.len(), 1);
        let all = backend.list(&ListScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_read_only_rejects_updates() {
        let backend = MemoryCollection::read_only("visitorId");
        let id = backend.seed(Record::new().with("purpose", "Delivery")).await;

        let err = backend.update(&id, json!("Party")).await.unwrap_err();
        assert_eq!(err.status(), Some(405));
        assert_eq!(backend.records().await[0].text("purpose"), "Delivery");
    }

    #[tokio::test]
    async fn test_injected_failure_and_missing_delete() {
        let backend = MemoryCollection::new("id", "status");
        let id = backend.seed(Record::new().with("status", "OPEN")).await;

        backend.set_failing(BackendOp::Update, true).await;
        let err = backend.update(&id, json!("CLOSED")).await.unwrap_err();
        assert_eq!(err.status(), Some(500));

        backend.delete(&id).await.unwrap();
        let err = backend.delete(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(backend.calls(BackendOp::Delete), 2);
    }
}
