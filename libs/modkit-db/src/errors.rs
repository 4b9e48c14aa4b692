use sea_orm::{DbErr, SqlErr};

/// True when `err` reports a violated UNIQUE / PRIMARY KEY constraint.
///
/// Works for both SQLite (extended codes 2067 / 1555) and PostgreSQL (23505)
/// since SeaORM normalizes them into [`SqlErr::UniqueConstraintViolation`].
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectOpts, DbHandle};
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn duplicate_primary_key_is_a_unique_violation() {
        let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
            .await
            .unwrap();
        let conn = db.sea();
        conn.execute_unprepared("CREATE TABLE k (id TEXT PRIMARY KEY NOT NULL)")
            .await
            .unwrap();
        conn.execute_unprepared("INSERT INTO k (id) VALUES ('a')")
            .await
            .unwrap();

        let err = conn
            .execute_unprepared("INSERT INTO k (id) VALUES ('a')")
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err), "got {err:?}");
    }

    #[test]
    fn plain_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::Custom("boom".into())));
        assert!(!is_unique_violation(&DbErr::RecordNotFound("x".into())));
    }
}
