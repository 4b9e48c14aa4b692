use std::future::Future;

use async_trait::async_trait;
use modkit::RequestCtx;
use modkit_db::is_unique_violation;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::{debug, warn};

use crate::contract::model::{Account, AccountId};
use crate::domain::error::DomainError;
use crate::domain::repo::AccountsRepository;
use crate::infra::storage::entity::{Column, Entity};
use crate::infra::storage::mapper;

/// SeaORM-backed repository; works on SQLite and PostgreSQL alike.
#[derive(Clone)]
pub struct SeaOrmAccountsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmAccountsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Open a transaction and write `account` into it without committing.
    ///
    /// Any failure rolls the transaction back before returning.
    pub async fn stage_insert(
        &self,
        ctx: &RequestCtx,
        account: &Account,
    ) -> Result<PendingInsert, DomainError> {
        let txn = ctx
            .run(self.conn.begin())
            .await?
            .map_err(DomainError::insert_failed)?;

        let am = mapper::contract_to_active_model(account);
        let written = ctx
            .run(Entity::insert(am).exec_without_returning(&txn))
            .await;

        match written {
            Ok(Ok(_)) => Ok(PendingInsert {
                txn,
                id: account.id.clone(),
            }),
            Ok(Err(e)) => {
                rollback(txn).await;
                if is_unique_violation(&e) {
                    debug!(account_id = %account.id, "insert hit the unique constraint");
                    Err(DomainError::DuplicateIdentity {
                        id: account.id.clone(),
                    })
                } else {
                    Err(DomainError::insert_failed(e))
                }
            }
            Err(ctx_err) => {
                rollback(txn).await;
                Err(ctx_err.into())
            }
        }
    }
}

/// A written but uncommitted insert.
pub struct PendingInsert {
    txn: DatabaseTransaction,
    id: AccountId,
}

impl PendingInsert {
    /// Commit unless the context is already done; otherwise roll back.
    ///
    /// The commit itself is bounded by the context too. A commit abandoned
    /// mid-flight drops the transaction, which rolls it back.
    pub async fn commit(self, ctx: &RequestCtx) -> Result<(), DomainError> {
        if let Err(e) = ctx.check() {
            warn!(account_id = %self.id, error = %e, "context ended before commit, rolling back");
            rollback(self.txn).await;
            return Err(e.into());
        }
        bounded_commit(ctx, &self.id, self.txn.commit()).await
    }

    pub async fn rollback(self) {
        rollback(self.txn).await;
    }
}

async fn bounded_commit<F>(ctx: &RequestCtx, id: &AccountId, commit: F) -> Result<(), DomainError>
where
    F: Future<Output = Result<(), DbErr>>,
{
    match ctx.run(commit).await {
        Ok(done) => done.map_err(DomainError::insert_failed),
        Err(e) => {
            warn!(account_id = %id, error = %e, "commit did not finish in time");
            Err(e.into())
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        warn!(error = %e, "transaction rollback failed");
    }
}

#[async_trait]
impl AccountsRepository for SeaOrmAccountsRepository {
    async fn exists(&self, ctx: &RequestCtx, id: &AccountId) -> Result<bool, DomainError> {
        let count = ctx
            .run(
                Entity::find()
                    .filter(Column::IdentityKey.eq(id.as_str()))
                    .count(&self.conn),
            )
            .await?
            .map_err(DomainError::repository)?;
        Ok(count > 0)
    }

    async fn insert(&self, ctx: &RequestCtx, account: &Account) -> Result<(), DomainError> {
        if self.exists(ctx, &account.id).await? {
            return Err(DomainError::DuplicateIdentity {
                id: account.id.clone(),
            });
        }
        self.stage_insert(ctx, account).await?.commit(ctx).await
    }

    async fn find(&self, ctx: &RequestCtx, id: &AccountId) -> Result<Account, DomainError> {
        let mut rows = ctx
            .run(
                Entity::find()
                    .filter(Column::IdentityKey.eq(id.as_str()))
                    .limit(2)
                    .all(&self.conn),
            )
            .await?
            .map_err(DomainError::repository)?;

        match rows.len() {
            0 => Err(DomainError::NotFound { id: id.clone() }),
            1 => mapper::entity_to_contract(rows.remove(0)),
            n => Err(DomainError::Integrity(format!(
                "{n} rows stored for identity key '{id}'"
            ))),
        }
    }
}
