//! Process-local `MemberDirectory` whose entitlements are set explicitly.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{MemberDirectory, MemberDirectoryError};
use crate::domain::{Entitlements, UserId};

/// In-memory implementation of the `MemberDirectory` port.
///
/// Members never registered resolve to [`Entitlements::STANDARD`].
#[derive(Debug, Default)]
pub struct InMemoryMemberDirectory {
    members: RwLock<HashMap<UserId, Entitlements>>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with the given members.
    pub fn seeded(members: impl IntoIterator<Item = (UserId, Entitlements)>) -> Self {
        Self {
            members: RwLock::new(members.into_iter().collect()),
        }
    }

    pub async fn set_entitlements(&self, user_id: UserId, entitlements: Entitlements) {
        self.members.write().await.insert(user_id, entitlements);
    }

    /// Grant or revoke premium, keeping admin rights as they were.
    pub async fn set_premium(&self, user_id: UserId, has_premium: bool) {
        let mut members = self.members.write().await;
        members.entry(user_id).or_default().has_premium = has_premium;
    }

    pub async fn set_admin(&self, user_id: UserId, is_admin: bool) {
        let mut members = self.members.write().await;
        members.entry(user_id).or_default().is_admin = is_admin;
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn entitlements(&self, user_id: &UserId) -> Result<Entitlements, MemberDirectoryError> {
        Ok(self
            .members
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or(Entitlements::STANDARD))
    }
}
