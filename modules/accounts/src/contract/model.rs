use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Opaque identity key of an account (a UUID, a phone number, ...).
///
/// Always taken from the verified credential, never from a request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountIdError {
    #[error("identity key is empty")]
    Empty,
    #[error("identity key is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("identity key contains invalid character {0:?}")]
    InvalidChar(char),
}

impl AccountId {
    pub const MAX_LEN: usize = 128;

    pub fn parse(raw: &str) -> Result<Self, AccountIdError> {
        if raw.is_empty() {
            return Err(AccountIdError::Empty);
        }
        let len = raw.chars().count();
        if len > Self::MAX_LEN {
            return Err(AccountIdError::TooLong {
                len,
                max: Self::MAX_LEN,
            });
        }
        if let Some(c) = raw.chars().find(|c| !is_key_char(*c)) {
            return Err(AccountIdError::InvalidChar(c));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '@')
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stored account record. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub firstname: String,
    pub surname: String,
    pub patronymic: Option<String>,
    pub gender: String,
    pub birthdate: NaiveDate,
}

/// Validated input for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub firstname: String,
    pub surname: String,
    pub patronymic: Option<String>,
    pub gender: String,
    pub birthdate: NaiveDate,
}

impl NewAccount {
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            firstname: self.firstname,
            surname: self.surname,
            patronymic: self.patronymic,
            gender: self.gender,
            birthdate: self.birthdate,
        }
    }
}

/// An account together with its age as of the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub account: Account,
    pub age: u32,
}
