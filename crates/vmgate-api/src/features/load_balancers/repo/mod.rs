use crate::shared::error::ApiResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use vmgate_core::{LoadBalancer, LoadBalancerListener, LoadBalancerPool, LoadBalancerPoolMember};

/// Read-mostly store of the load balancer topology.
#[async_trait]
pub trait LoadBalancerRepository: Send + Sync {
    async fn upsert_load_balancer(&self, load_balancer: LoadBalancer) -> ApiResult<()>;
    async fn upsert_listener(&self, listener: LoadBalancerListener) -> ApiResult<()>;
    async fn upsert_pool(&self, pool: LoadBalancerPool) -> ApiResult<()>;
    async fn upsert_member(&self, member: LoadBalancerPoolMember) -> ApiResult<()>;

    /// Load balancers reachable from an instance through
    /// member → pool → listener, ordered by id without duplicates
    async fn for_instance(&self, instance_id: u64) -> ApiResult<Vec<LoadBalancer>>;
}

#[derive(Default)]
struct Topology {
    load_balancers: BTreeMap<u64, LoadBalancer>,
    listeners: BTreeMap<u64, LoadBalancerListener>,
    pools: BTreeMap<u64, LoadBalancerPool>,
    members: BTreeMap<u64, LoadBalancerPoolMember>,
}

#[derive(Clone, Default)]
pub struct InMemoryLoadBalancerRepository {
    topology: Arc<RwLock<Topology>>,
}

impl InMemoryLoadBalancerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoadBalancerRepository for InMemoryLoadBalancerRepository {
    async fn upsert_load_balancer(&self, load_balancer: LoadBalancer) -> ApiResult<()> {
        let mut topology = self.topology.write().await;
        topology
            .load_balancers
            .insert(load_balancer.id, load_balancer);
        Ok(())
    }

    async fn upsert_listener(&self, listener: LoadBalancerListener) -> ApiResult<()> {
        let mut topology = self.topology.write().await;
        topology.listeners.insert(listener.id, listener);
        Ok(())
    }

    async fn upsert_pool(&self, pool: LoadBalancerPool) -> ApiResult<()> {
        let mut topology = self.topology.write().await;
        topology.pools.insert(pool.id, pool);
        Ok(())
    }

    async fn upsert_member(&self, member: LoadBalancerPoolMember) -> ApiResult<()> {
        let mut topology = self.topology.write().await;
        topology.members.insert(member.id, member);
        Ok(())
    }

    async fn for_instance(&self, instance_id: u64) -> ApiResult<Vec<LoadBalancer>> {
        let topology = self.topology.read().await;

        let member_ids: HashSet<u64> = topology
            .members
            .values()
            .filter(|m| m.instance_id == instance_id)
            .map(|m| m.id)
            .collect();
        let pool_ids: HashSet<u64> = topology
            .pools
            .values()
            .filter(|p| p.member_ids.iter().any(|id| member_ids.contains(id)))
            .map(|p| p.id)
            .collect();
        let load_balancer_ids: HashSet<u64> = topology
            .listeners
            .values()
            .filter(|l| l.pool_ids.iter().any(|id| pool_ids.contains(id)))
            .map(|l| l.load_balancer_id)
            .collect();

        Ok(topology
            .load_balancers
            .values()
            .filter(|lb| load_balancer_ids.contains(&lb.id))
            .cloned()
            .collect())
    }
}
