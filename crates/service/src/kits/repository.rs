use async_trait::async_trait;
use models::{Kit, OwnerId};

use crate::errors::KitStoreError;
use crate::storage::KitStore;

/// Trait abstraction over kit storage, as seen by command and menu handlers.
/// Implementations can be file-backed, database-backed, or in-memory fakes.
#[async_trait]
pub trait KitRepository: Send + Sync {
    async fn get_owner_kits(&self, owner: &OwnerId) -> Vec<Kit>;
    async fn get_kit(&self, owner: &OwnerId, name: &str) -> Option<Kit>;
    async fn has_kit(&self, owner: &OwnerId, name: &str) -> bool;
    async fn save_kit(&self, owner: OwnerId, kit: Kit) -> Result<(), KitStoreError>;
    async fn delete_kit(&self, owner: &OwnerId, name: &str) -> Result<bool, KitStoreError>;
}

#[async_trait]
impl KitRepository for KitStore {
    async fn get_owner_kits(&self, owner: &OwnerId) -> Vec<Kit> { self.get_owner_kits(owner).await }
    async fn get_kit(&self, owner: &OwnerId, name: &str) -> Option<Kit> { self.get_kit(owner, name).await }
    async fn has_kit(&self, owner: &OwnerId, name: &str) -> bool { self.has_kit(owner, name).await }
    async fn save_kit(&self, owner: OwnerId, kit: Kit) -> Result<(), KitStoreError> { self.save_kit(owner, kit).await }
    async fn delete_kit(&self, owner: &OwnerId, name: &str) -> Result<bool, KitStoreError> { self.delete_kit(owner, name).await }
}
