#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use accounts::domain::ports::FixedClock;
use accounts::{AccountsConfig, AccountsModule, Migrator};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::NaiveDate;
use jsonwebtoken::{encode, EncodingKey, Header};
use modkit_auth::{JwtSettings, JwtVerifier, TokenVerifier};
use modkit_db::{ConnectOpts, DbHandle};
use serde_json::{json, Value};

pub const SECRET: &str = "accounts-test-secret";

pub async fn memory_db() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();
    db.migrate::<Migrator>().await.unwrap();
    db
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn verifier() -> Arc<dyn TokenVerifier> {
    Arc::new(
        JwtVerifier::new(&JwtSettings {
            secret: SECRET.to_string(),
            issuer: None,
            audience: None,
            leeway_secs: 0,
        })
        .unwrap(),
    )
}

pub fn token_for(subject: &str) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 600;
    encode(
        &Header::default(),
        &json!({ "sub": subject, "exp": exp }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Router over a fresh in-memory database with "today" pinned to 2024-06-01.
pub async fn app() -> (Router, DbHandle) {
    let db = memory_db().await;
    let config = AccountsConfig {
        request_timeout: Duration::from_secs(5),
    };
    let module = AccountsModule::with_clock(db.sea(), config, Arc::new(FixedClock(today())));
    (module.router(verifier()), db)
}

pub fn post_json(uri: &str, token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(body.into()).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().uri(uri);
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn jane() -> Value {
    json!({
        "firstname": "Jane",
        "surname": "Doe",
        "gender": "F",
        "birthdate": "1990-01-01"
    })
}
