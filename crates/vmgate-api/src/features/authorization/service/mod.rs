use crate::features::authorization::repo::{hash_password, IdentityRepository};
use crate::shared::error::{ApiError, ApiResult};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use vmgate_core::InstanceAction;

/// Grants every privilege.
pub const WILDCARD_PRIVILEGE: &str = "*";

/// Where a privilege applies; carried for logging and future per-scope rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeScope {
    Collection,
    Resource,
    Subcollection,
}

/// Identifier a caller must hold to perform an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Privilege {
    pub identifier: String,
    pub scope: PrivilegeScope,
}

impl Privilege {
    pub fn instance_action(action: InstanceAction, scope: PrivilegeScope) -> Self {
        Self {
            identifier: format!("instance_{}", action.name()),
            scope,
        }
    }

    pub fn list_instances() -> Self {
        Self {
            identifier: "instance_show_list".to_string(),
            scope: PrivilegeScope::Collection,
        }
    }

    pub fn show_instance() -> Self {
        Self {
            identifier: "instance_show".to_string(),
            scope: PrivilegeScope::Resource,
        }
    }

    pub fn show_load_balancers() -> Self {
        Self::subcollection("load_balancers", "show")
    }

    pub fn edit_custom_attributes() -> Self {
        Self::subcollection("custom_attributes", "edit")
    }

    pub fn delete_custom_attributes() -> Self {
        Self::subcollection("custom_attributes", "delete")
    }

    fn subcollection(name: &str, verb: &str) -> Self {
        Self {
            identifier: format!("instance_{}_{}", name, verb),
            scope: PrivilegeScope::Subcollection,
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// Authenticated identity of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub userid: String,
    pub role: String,
    pub privileges: HashSet<String>,
}

impl Caller {
    pub fn new<I, S>(userid: impl Into<String>, role: impl Into<String>, privileges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            userid: userid.into(),
            role: role.into(),
            privileges: privileges.into_iter().map(Into::into).collect(),
        }
    }

    pub fn holds(&self, identifier: &str) -> bool {
        self.privileges.contains(WILDCARD_PRIVILEGE) || self.privileges.contains(identifier)
    }
}

/// Capability check injected into controllers.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: &Caller, privilege: &Privilege) -> ApiResult<()>;
}

/// Allows a privilege when the caller's role grants its identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAuthorizer;

impl Authorizer for RoleAuthorizer {
    fn authorize(&self, caller: &Caller, privilege: &Privilege) -> ApiResult<()> {
        if caller.holds(&privilege.identifier) {
            return Ok(());
        }

        warn!(
            userid = %caller.userid,
            role = %caller.role,
            privilege = %privilege,
            scope = ?privilege.scope,
            "Authorization denied"
        );
        Err(ApiError::PermissionDenied(format!(
            "Use of the {} feature is forbidden",
            privilege.identifier
        )))
    }
}

/// Resolves credentials to a [`Caller`].
pub struct AuthenticationService {
    repo: Arc<dyn IdentityRepository>,
}

impl AuthenticationService {
    pub fn new(repo: Arc<dyn IdentityRepository>) -> Self {
        Self { repo }
    }

    pub async fn authenticate(&self, userid: &str, password: &str) -> ApiResult<Caller> {
        let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

        let user = self.repo.get_user(userid).await?.ok_or_else(|| {
            debug!(%userid, "Unknown user");
            invalid()
        })?;

        if user.password_sha256 != hash_password(password) {
            debug!(%userid, "Password mismatch");
            return Err(invalid());
        }

        let privileges = self
            .repo
            .get_role(&user.role)
            .await?
            .map(|role| role.privileges)
            .unwrap_or_default();

        Ok(Caller {
            userid: user.userid,
            role: user.role,
            privileges,
        })
    }
}
