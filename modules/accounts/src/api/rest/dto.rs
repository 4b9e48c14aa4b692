use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::contract::model::{AccountView, NewAccount};
use crate::domain::error::FieldViolation;

/// Order in which violations are reported.
const FIELD_ORDER: [&str; 5] = ["firstname", "surname", "patronymic", "gender", "birthdate"];

const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

pub const BIRTHDATE_IN_FUTURE: &str = "birthdate must not be in the future";

/// Body of `POST /api/v1/account/create-account`.
///
/// Every field is optional at the serde level so that missing fields surface
/// as validation messages rather than as a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateAccountReq {
    #[validate(
        required(message = "firstname is required"),
        length(min = 1, max = 100, message = "firstname must be between 1 and 100 characters")
    )]
    pub firstname: Option<String>,

    #[validate(
        required(message = "surname is required"),
        length(min = 1, max = 100, message = "surname must be between 1 and 100 characters")
    )]
    pub surname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "patronymic must be at most 100 characters"))]
    pub patronymic: Option<String>,

    #[validate(
        required(message = "gender is required"),
        length(equal = 1, message = "gender must be exactly one character")
    )]
    pub gender: Option<String>,

    #[validate(
        required(message = "birthdate is required"),
        custom(function = "validate_birthdate")
    )]
    pub birthdate: Option<String>,
}

fn parse_birthdate(value: &str) -> Option<NaiveDate> {
    let b = value.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(value, BIRTHDATE_FORMAT).ok()
}

fn validate_birthdate(value: &str) -> Result<(), ValidationError> {
    if parse_birthdate(value).is_some() {
        return Ok(());
    }
    let mut err = ValidationError::new("birthdate_format");
    err.message = Some("birthdate must be a valid date in YYYY-MM-DD format".into());
    Err(err)
}

impl CreateAccountReq {
    /// Run every field check and report all violations in field order.
    ///
    /// `today` bounds the birthdate; it comes from the service clock.
    pub fn violations(&self, today: NaiveDate) -> Vec<FieldViolation> {
        let mut out = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => {
                let by_field = errors.field_errors();
                FIELD_ORDER
                    .iter()
                    .filter_map(|field| by_field.get(*field).map(|errs| (*field, errs)))
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let message = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("{field} is invalid"));
                            FieldViolation::new(field, message)
                        })
                    })
                    .collect()
            }
        };

        // birthdate is last in FIELD_ORDER, so appending keeps the order.
        let future = self
            .birthdate
            .as_deref()
            .and_then(parse_birthdate)
            .is_some_and(|b| b > today);
        if future {
            out.push(FieldViolation::new("birthdate", BIRTHDATE_IN_FUTURE));
        }
        out
    }

    /// Validate and convert into the domain input.
    pub fn into_new_account(self, today: NaiveDate) -> Result<NewAccount, Vec<FieldViolation>> {
        let violations = self.violations(today);
        if !violations.is_empty() {
            return Err(violations);
        }

        let birthdate = self.birthdate.as_deref().and_then(parse_birthdate);
        match (self.firstname, self.surname, self.gender, birthdate) {
            (Some(firstname), Some(surname), Some(gender), Some(birthdate)) => Ok(NewAccount {
                firstname,
                surname,
                patronymic: self.patronymic,
                gender,
                birthdate,
            }),
            _ => Err(vec![FieldViolation::new(
                "birthdate",
                "birthdate must be a valid date in YYYY-MM-DD format",
            )]),
        }
    }
}

/// Account as returned by the API, with the derived age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDto {
    pub firstname: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    pub gender: String,
    pub birthdate: NaiveDate,
    pub age: u32,
}

impl From<AccountView> for AccountDto {
    fn from(view: AccountView) -> Self {
        let a = view.account;
        Self {
            firstname: a.firstname,
            surname: a.surname,
            patronymic: a.patronymic,
            gender: a.gender,
            birthdate: a.birthdate,
            age: view.age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(v: serde_json::Value) -> CreateAccountReq {
        serde_json::from_value(v).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn fields(v: &[FieldViolation]) -> Vec<&'static str> {
        v.iter().map(|f| f.field).collect()
    }

    #[test]
    fn complete_request_converts() {
        let new = req(json!({
            "firstname": "Jane",
            "surname": "Doe",
            "gender": "F",
            "birthdate": "1990-01-01"
        }))
        .into_new_account(today())
        .unwrap();
        assert_eq!(new.firstname, "Jane");
        assert_eq!(new.patronymic, None);
        assert_eq!(new.birthdate, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    }

    #[test]
    fn all_missing_fields_are_reported_in_order() {
        let v = req(json!({ "surname": "Doe" })).violations(today());
        assert_eq!(fields(&v), vec!["firstname", "gender", "birthdate"]);
        assert_eq!(v[0].message, "firstname is required");
        assert_eq!(v[1].message, "gender is required");
        assert_eq!(v[2].message, "birthdate is required");
    }

    #[test]
    fn length_bounds() {
        let v = req(json!({
            "firstname": "",
            "surname": "x".repeat(101),
            "patronymic": "p".repeat(101),
            "gender": "FM",
            "birthdate": "1990-01-01"
        }))
        .violations(today());
        assert_eq!(
            fields(&v),
            vec!["firstname", "surname", "patronymic", "gender"]
        );
        assert_eq!(v[0].message, "firstname must be between 1 and 100 characters");
    }

    #[test]
    fn gender_counts_characters_not_bytes() {
        let v = req(json!({
            "firstname": "Анна",
            "surname": "Иванова",
            "gender": "Ж",
            "birthdate": "1990-01-01"
        }))
        .violations(today());
        assert!(v.is_empty(), "{v:?}");
    }

    #[test]
    fn birthdate_must_be_strict_calendar_date() {
        for bad in ["1990-1-1", "1990-02-30", "01.01.1990", "1990-01-01T00:00:00", ""] {
            let v = req(json!({
                "firstname": "Jane",
                "surname": "Doe",
                "gender": "F",
                "birthdate": bad
            }))
            .violations(today());
            assert_eq!(fields(&v), vec!["birthdate"], "{bad:?}");
            assert_eq!(
                v[0].message,
                "birthdate must be a valid date in YYYY-MM-DD format"
            );
        }
    }

    #[test]
    fn future_birthdate_is_reported_with_the_other_fields() {
        let v = req(json!({ "surname": "Doe", "birthdate": "2030-01-01" })).violations(today());
        assert_eq!(fields(&v), vec!["firstname", "gender", "birthdate"]);
        assert_eq!(v[2].message, BIRTHDATE_IN_FUTURE);
    }

    #[test]
    fn birthdate_today_is_accepted() {
        let v = req(json!({
            "firstname": "Jane",
            "surname": "Doe",
            "gender": "F",
            "birthdate": "2024-06-01"
        }))
        .violations(today());
        assert!(v.is_empty(), "{v:?}");
    }

    #[test]
    fn dto_omits_absent_patronymic() {
        let dto = AccountDto {
            firstname: "Jane".into(),
            surname: "Doe".into(),
            patronymic: None,
            gender: "F".into(),
            birthdate: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            age: 34,
        };
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({
                "firstname": "Jane",
                "surname": "Doe",
                "gender": "F",
                "birthdate": "1990-01-01",
                "age": 34
            })
        );
    }
}
