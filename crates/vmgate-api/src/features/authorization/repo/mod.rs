use crate::shared::error::ApiResult;
use async_trait::async_trait;
use ring::digest::{digest, SHA256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Named set of privilege identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub privileges: HashSet<String>,
}

impl Role {
    pub fn new<I, S>(name: impl Into<String>, privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            privileges: privileges.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub userid: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
    pub role: String,
}

pub fn hash_password(password: &str) -> String {
    hex::encode(digest(&SHA256, password.as_bytes()).as_ref())
}

#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn upsert_role(&self, role: Role) -> ApiResult<()>;
    async fn get_role(&self, name: &str) -> ApiResult<Option<Role>>;
    async fn upsert_user(&self, user: UserRecord) -> ApiResult<()>;
    async fn get_user(&self, userid: &str) -> ApiResult<Option<UserRecord>>;
}

#[derive(Clone, Default)]
pub struct InMemoryIdentityRepository {
    roles: Arc<RwLock<HashMap<String, Role>>>,
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn upsert_role(&self, role: Role) -> ApiResult<()> {
        let mut roles = self.roles.write().await;
        roles.insert(role.name.clone(), role);
        Ok(())
    }

    async fn get_role(&self, name: &str) -> ApiResult<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(name).cloned())
    }

    async fn upsert_user(&self, user: UserRecord) -> ApiResult<()> {
        let mut users = self.users.write().await;
        users.insert(user.userid.clone(), user);
        Ok(())
    }

    async fn get_user(&self, userid: &str) -> ApiResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(userid).cloned())
    }
}
