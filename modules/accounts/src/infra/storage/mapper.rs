use sea_orm::ActiveValue::Set;

use crate::contract::model::{Account, AccountId};
use crate::domain::error::DomainError;
use crate::infra::storage::entity::{ActiveModel, Model as AccountEntity};

pub fn entity_to_contract(entity: AccountEntity) -> Result<Account, DomainError> {
    let id = AccountId::parse(&entity.identity_key).map_err(|e| {
        DomainError::Integrity(format!(
            "stored identity key {:?} is invalid: {e}",
            entity.identity_key
        ))
    })?;
    Ok(Account {
        id,
        firstname: entity.firstname,
        surname: entity.surname,
        patronymic: entity.patronymic,
        gender: entity.gender,
        birthdate: entity.birthdate,
    })
}

pub fn contract_to_active_model(account: &Account) -> ActiveModel {
    ActiveModel {
        identity_key: Set(account.id.as_str().to_string()),
        firstname: Set(account.firstname.clone()),
        surname: Set(account.surname.clone()),
        patronymic: Set(account.patronymic.clone()),
        gender: Set(account.gender.clone()),
        birthdate: Set(account.birthdate),
    }
}
