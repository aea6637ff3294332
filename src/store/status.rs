//! Status-check storage trait.

use async_trait::async_trait;

use crate::api::StatusCheck;

use super::error::StorageResult;

/// Insert-one / list-recent storage for [`StatusCheck`] records.
///
/// Records are never updated or deleted through this interface.
#[async_trait]
pub trait StatusCheckStore: Send + Sync {
    async fn insert(&self, check: &StatusCheck) -> StorageResult<()>;

    /// The most recent `limit` records, oldest first.
    async fn list_recent(&self, limit: usize) -> StorageResult<Vec<StatusCheck>>;
}
