pub mod auth;
pub mod config;
pub mod http;
pub mod memory;

use crate::core::{Identity, Record, Result};
use async_trait::async_trait;
use serde_json::Value;

pub use auth::{GateDecision, Role, Session, SessionGate, SIGN_IN_ROUTE};
pub use config::PortalConfig;
pub use http::HttpCollection;
pub use memory::MemoryCollection;

/// Which slice of a collection a list call fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Every record (`/all`), used by admin screens.
    All,
    /// Records owned by one user (`/user/{owner}`).
    Owner(String),
}

/// Remote REST collection resource
///
/// One implementation talks HTTP, another keeps records in process. The
/// controller only ever sees this trait.
#[async_trait]
pub trait CollectionBackend: Send + Sync + 'static {
    /// Fetches the full collection in server order.
    async fn list(&self, scope: &ListScope) -> Result<Vec<Record>>;

    /// Creates a record and returns it as stored, server identity included.
    async fn create(&self, body: Record) -> Result<Record>;

    /// Replaces the single mutable field of the record with `identity`.
    async fn update(&self, identity: &Identity, value: Value) -> Result<()>;

    async fn delete(&self, identity: &Identity) -> Result<()>;
}

/// Path templates of one REST collection resource, relative to its base URL.
///
/// `{owner}` and `{id}` are substituted at call time, percent-encoded as a
/// single path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub list_all: String,
    pub list_owner: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl Endpoints {
    pub fn new() -> Self {
        Self {
            list_all: "/all".to_string(),
            list_owner: "/user/{owner}".to_string(),
            create: "/create".to_string(),
            update: "/update".to_string(),
            delete: "/delete/{id}".to_string(),
        }
    }

    /// Set the create path (`/raise`, `/signUp`, ...)
    pub fn create(mut self, path: &str) -> Self {
        self.create = path.to_string();
        self
    }

    pub fn list_all(mut self, path: &str) -> Self {
        self.list_all = path.to_string();
        self
    }

    pub fn list_owner(mut self, path: &str) -> Self {
        self.list_owner = path.to_string();
        self
    }

    pub fn update(mut self, path: &str) -> Self {
        self.update = path.to_string();
        self
    }

    pub fn delete(mut self, path: &str) -> Self {
        self.delete = path.to_string();
        self
    }

    pub fn list_path(&self, scope: &ListScope) -> String {
        match scope {
            ListScope::All => self.list_all.clone(),
            ListScope::Owner(owner) => self.list_owner.replace("{owner}", &path_segment(owner)),
        }
    }

    pub fn delete_path(&self, identity: &Identity) -> String {
        self.delete.replace("{id}", &path_segment(&identity.to_string()))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new()
    }
}

pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Body keys of an update call, e.g. `{"requestId": 1, "newStatus": "CLOSED"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateShape {
    pub identity_key: String,
    pub value_key: String,
}

impl UpdateShape {
    pub fn new(identity_key: &str, value_key: &str) -> Self {
        Self {
            identity_key: identity_key.to_string(),
            value_key: value_key.to_string(),
        }
    }

    pub fn body(&self, identity: &Identity, value: Value) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.identity_key.clone(), identity.to_json());
        body.insert(self.value_key.clone(), value);
        Value::Object(body)
    }
}

impl Default for UpdateShape {
    fn default() -> Self {
        Self::new("id", "newValue")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_substitution() {
        let endpoints = Endpoints::new().create("/raise");

        assert_eq!(endpoints.list_path(&ListScope::All), "/all");
        assert_eq!(
            endpoints.list_path(&ListScope::Owner("42".into())),
            "/user/42"
        );
        assert_eq!(endpoints.delete_path(&Identity::Int(9)), "/delete/9");
        assert_eq!(endpoints.create, "/raise");
    }

    #[test]
    fn test_substituted_segments_are_encoded() {
        let endpoints = Endpoints::new();

        assert_eq!(
            endpoints.list_path(&ListScope::Owner("../all?x=1".into())),
            "/user/..%2Fall%3Fx%3D1"
        );
        assert_eq!(
            endpoints.delete_path(&Identity::Text("a b/c".into())),
            "/delete/a%20b%2Fc"
        );
    }

    #[test]
    fn test_update_shape_body() {
        let shape = UpdateShape::new("requestId", "newStatus");
        let body = shape.body(&Identity::Int(1), json!("CLOSED"));
        assert_eq!(body, json!({"requestId": 1, "newStatus": "CLOSED"}));
    }
}
