use async_trait::async_trait;
use modkit::RequestCtx;

use crate::contract::model::{Account, AccountId};
use crate::domain::error::DomainError;

/// Durable account storage. Every call is bounded by the request context.
#[async_trait]
pub trait AccountsRepository: Send + Sync {
    /// Read-only existence probe.
    async fn exists(&self, ctx: &RequestCtx, id: &AccountId) -> Result<bool, DomainError>;

    /// Existence-checked transactional insert.
    ///
    /// Fails with `DuplicateIdentity` when the key is taken, whether the probe
    /// or the storage constraint notices it.
    async fn insert(&self, ctx: &RequestCtx, account: &Account) -> Result<(), DomainError>;

    /// Exactly one record for `id`; `NotFound` for none, `Integrity` for several.
    async fn find(&self, ctx: &RequestCtx, id: &AccountId) -> Result<Account, DomainError>;
}
