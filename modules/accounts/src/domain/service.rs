use std::sync::Arc;

use modkit::RequestCtx;
use tracing::{info, instrument};

use crate::contract::model::{Account, AccountId, AccountView, NewAccount};
use crate::domain::age::age_on;
use crate::domain::error::DomainError;
use crate::domain::ports::Clock;
use crate::domain::repo::AccountsRepository;

/// Account use cases. Stateless apart from its ports; shared across requests.
pub struct Service {
    repo: Arc<dyn AccountsRepository>,
    clock: Arc<dyn Clock>,
}

impl Service {
    pub fn new(repo: Arc<dyn AccountsRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    #[instrument(
        name = "accounts.service.create_account",
        skip(self, ctx, new_account),
        fields(account_id = %id)
    )]
    pub async fn create_account(
        &self,
        ctx: &RequestCtx,
        id: AccountId,
        new_account: NewAccount,
    ) -> Result<AccountView, DomainError> {
        let today = self.clock.today();
        if new_account.birthdate > today {
            return Err(DomainError::validation(
                "birthdate",
                "birthdate must not be in the future",
            ));
        }

        let account = new_account.into_account(id);
        self.repo.insert(ctx, &account).await?;
        info!("account created");

        Ok(Self::view(account, today))
    }

    /// Current date according to the service clock.
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    #[instrument(
        name = "accounts.service.get_account",
        skip(self, ctx),
        fields(account_id = %id)
    )]
    pub async fn get_account(
        &self,
        ctx: &RequestCtx,
        id: &AccountId,
    ) -> Result<AccountView, DomainError> {
        let account = self.repo.find(ctx, id).await?;
        Ok(Self::view(account, self.clock.today()))
    }

    fn view(account: Account, today: chrono::NaiveDate) -> AccountView {
        let age = age_on(account.birthdate, today);
        AccountView { account, age }
    }
}
