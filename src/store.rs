//! Collaborators a session reads from and writes to
//!
//! The traits are what the session needs; `SledStore` is a reference
//! implementation keeping orders, invitations and requirements as CBOR in
//! a sled database.
use super::order::{FieldValue, Order, Section};
use super::requirements::{Invitation, Requirements};
use sled::Batch;
use std::sync::Arc;
use tracing::debug;

pub trait OrderStore {
    fn find(&self, order_id: &str) -> anyhow::Result<Option<Order>>;
    fn update(&self, order: &Order) -> anyhow::Result<()>;
}

pub trait RequirementsProvider {
    fn find_invitation(&self, invite_id: &str) -> anyhow::Result<Option<Invitation>>;
    fn find_requirements(&self, invite_id: &str) -> anyhow::Result<Option<Requirements>>;
}

/// Re-orders the entries of an order's sections in place
pub trait ResourceSorter {
    fn sort(&self, order: &mut Order);
}

/// Leaves entries in the order they were added
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionOrder;

impl ResourceSorter for InsertionOrder {
    fn sort(&self, _: &mut Order) {}
}

/// Most recent first by a date field; entries without the date go last
#[derive(Debug, Clone)]
pub struct ByDateDescending {
    field: String,
}

impl ByDateDescending {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

impl ResourceSorter for ByDateDescending {
    fn sort(&self, order: &mut Order) {
        for (_, section) in order.sections_mut() {
            if let Section::Many(entries) = section {
                entries.sort_by_key(|e| {
                    std::cmp::Reverse(e.get(&self.field).and_then(FieldValue::as_date))
                });
            }
        }
    }
}

const ORDERS: &str = "order/";
const INVITATIONS: &str = "invitation/";
const REQUIREMENTS: &str = "requirements/";

fn key(prefix: &str, id: &str) -> Vec<u8> {
    format!("{prefix}{id}").into_bytes()
}

pub struct SledStore {
    instance: Arc<sled::Db>,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    fn get<T>(&self, key: &[u8]) -> anyhow::Result<Option<T>>
    where
        T: for<'b> minicbor::Decode<'b, ()>,
    {
        match self.instance.get(key)? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store an order together with its invitation and requirements
    pub fn seed(
        &self,
        order: &Order,
        invitation: &Invitation,
        requirements: &Requirements,
    ) -> anyhow::Result<()> {
        let mut batch = Batch::default();
        batch.insert(key(ORDERS, order.order_id()), minicbor::to_vec(order)?);
        batch.insert(
            key(INVITATIONS, &invitation.invite_id),
            minicbor::to_vec(invitation)?,
        );
        batch.insert(
            key(REQUIREMENTS, requirements.invitation_id()),
            minicbor::to_vec(requirements)?,
        );
        self.instance.apply_batch(batch)?;

        debug!(order_id = order.order_id(), "seeded order");
        Ok(())
    }

    pub fn put_requirements(&self, requirements: &Requirements) -> anyhow::Result<()> {
        self.instance.insert(
            key(REQUIREMENTS, requirements.invitation_id()),
            minicbor::to_vec(requirements)?,
        )?;
        Ok(())
    }

    pub fn remove_requirements(&self, invite_id: &str) -> anyhow::Result<()> {
        self.instance.remove(key(REQUIREMENTS, invite_id))?;
        Ok(())
    }
}

impl OrderStore for SledStore {
    fn find(&self, order_id: &str) -> anyhow::Result<Option<Order>> {
        self.get(&key(ORDERS, order_id))
    }

    fn update(&self, order: &Order) -> anyhow::Result<()> {
        let key = key(ORDERS, order.order_id());
        if !self.instance.contains_key(&key)? {
            anyhow::bail!("Order {} does not exist", order.order_id());
        }
        self.instance.insert(key, minicbor::to_vec(order)?)?;

        debug!(order_id = order.order_id(), "order updated");
        Ok(())
    }
}

impl RequirementsProvider for SledStore {
    fn find_invitation(&self, invite_id: &str) -> anyhow::Result<Option<Invitation>> {
        self.get(&key(INVITATIONS, invite_id))
    }

    fn find_requirements(&self, invite_id: &str) -> anyhow::Result<Option<Requirements>> {
        self.get(&key(REQUIREMENTS, invite_id))
    }
}
