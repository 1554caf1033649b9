//! Fixture loading for the in-memory stores.

use crate::features::authorization::repo::{hash_password, Role, UserRecord};
use crate::features::authorization::service::WILDCARD_PRIVILEGE;
use crate::server::Stores;
use crate::shared::error::ApiError;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use vmgate_core::{
    CustomAttribute, Instance, InstanceKind, LoadBalancer, LoadBalancerListener, LoadBalancerPool,
    LoadBalancerPoolMember,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("User {userid} must carry either password or password_sha256")]
    MissingPassword { userid: String },

    #[error("Failed to store seed data: {0}")]
    Storage(#[from] ApiError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub roles: Vec<SeedRole>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub instances: Vec<SeedInstance>,
    #[serde(default)]
    pub load_balancers: Vec<SeedLoadBalancer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRole {
    pub name: String,
    #[serde(default)]
    pub privileges: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub userid: String,
    pub role: String,
    /// Plain password, hashed on load. Convenient for local fixtures.
    pub password: Option<String>,
    pub password_sha256: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedInstance {
    pub id: u64,
    pub name: String,
    pub vendor: Option<String>,
    #[serde(default)]
    pub kind: InstanceKind,
    pub raw_power_state: Option<String>,
    pub ems_id: Option<u64>,
    pub zone: Option<String>,
    pub host: Option<String>,
    #[serde(default)]
    pub custom_attributes: Vec<SeedCustomAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedCustomAttribute {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub value: String,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedLoadBalancer {
    pub id: u64,
    pub name: String,
    pub ems_ref: Option<String>,
    #[serde(default)]
    pub listeners: Vec<SeedListener>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedListener {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub pools: Vec<SeedPool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedPool {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub members: Vec<LoadBalancerPoolMember>,
}

/// Counts of what a seed run stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub instances: usize,
    pub custom_attributes: usize,
    pub load_balancers: usize,
}

impl SeedData {
    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Single `admin` user holding every privilege.
    pub fn admin(password: &str) -> Self {
        Self {
            roles: vec![SeedRole {
                name: "super_administrator".to_string(),
                privileges: vec![WILDCARD_PRIVILEGE.to_string()],
            }],
            users: vec![SeedUser {
                userid: "admin".to_string(),
                role: "super_administrator".to_string(),
                password: Some(password.to_string()),
                password_sha256: None,
            }],
            ..Self::default()
        }
    }

    pub async fn apply(&self, stores: &Stores) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for role in &self.roles {
            stores
                .identities
                .upsert_role(Role::new(role.name.clone(), role.privileges.iter().cloned()))
                .await?;
        }

        for user in &self.users {
            let password_sha256 = match (&user.password_sha256, &user.password) {
                (Some(digest), _) => digest.to_ascii_lowercase(),
                (None, Some(password)) => hash_password(password),
                (None, None) => {
                    return Err(SeedError::MissingPassword {
                        userid: user.userid.clone(),
                    })
                }
            };
            stores
                .identities
                .upsert_user(UserRecord {
                    userid: user.userid.clone(),
                    password_sha256,
                    role: user.role.clone(),
                })
                .await?;
            summary.users += 1;
        }

        for seed in &self.instances {
            let mut instance = Instance::new(seed.id, seed.name.clone()).with_kind(seed.kind);
            if let Some(vendor) = &seed.vendor {
                instance.vendor = vendor.clone();
            }
            if let Some(raw) = &seed.raw_power_state {
                instance.raw_power_state = raw.clone();
            }
            instance.ems_id = seed.ems_id;
            instance.zone = seed.zone.clone();
            instance.host = seed.host.clone();
            stores.instances.upsert(instance).await?;
            summary.instances += 1;

            for attribute in &seed.custom_attributes {
                let mut restored = CustomAttribute::new(
                    attribute.id,
                    seed.id,
                    attribute.name.clone(),
                    attribute.value.clone(),
                );
                if let Some(section) = &attribute.section {
                    restored = restored.with_section(section.clone());
                }
                stores.custom_attributes.restore(restored).await?;
                summary.custom_attributes += 1;
            }
        }

        for lb in &self.load_balancers {
            stores
                .load_balancers
                .upsert_load_balancer(LoadBalancer {
                    id: lb.id,
                    name: lb.name.clone(),
                    ems_ref: lb.ems_ref.clone(),
                })
                .await?;
            summary.load_balancers += 1;

            for listener in &lb.listeners {
                stores
                    .load_balancers
                    .upsert_listener(LoadBalancerListener {
                        id: listener.id,
                        name: listener.name.clone(),
                        load_balancer_id: lb.id,
                        pool_ids: listener.pools.iter().map(|p| p.id).collect(),
                    })
                    .await?;

                for pool in &listener.pools {
                    stores
                        .load_balancers
                        .upsert_pool(LoadBalancerPool {
                            id: pool.id,
                            name: pool.name.clone(),
                            member_ids: pool.members.iter().map(|m| m.id).collect(),
                        })
                        .await?;
                    for member in &pool.members {
                        stores.load_balancers.upsert_member(member.clone()).await?;
                    }
                }
            }
        }

        info!(
            users = summary.users,
            instances = summary.instances,
            custom_attributes = summary.custom_attributes,
            load_balancers = summary.load_balancers,
            "Seed data loaded"
        );
        Ok(summary)
    }
}
