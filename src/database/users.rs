use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::columns::enum_column;
use super::Table;
use crate::domain::User;

pub struct UsersTable;

impl Table for UsersTable {
    type Record = User;

    const NAME: &'static str = "users";

    fn list(conn: &Connection) -> Result<Vec<User>> {
        let sql = "SELECT id, first_name, last_name, username, password_hash, role, status, created_at FROM users ORDER BY created_at ASC";

        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], parse_user_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list users")?;

        Ok(rows)
    }

    fn upsert(conn: &Connection, user: &User) -> Result<()> {
        // ON CONFLICT(id) rather than OR REPLACE, so a clashing username still fails
        let sql = "INSERT INTO users (id, first_name, last_name, username, password_hash, role, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET first_name = excluded.first_name, last_name = excluded.last_name, username = excluded.username, password_hash = excluded.password_hash, role = excluded.role, status = excluded.status, created_at = excluded.created_at";

        conn.execute(
            sql,
            params![
                user.id,
                user.first_name,
                user.last_name,
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.status.as_str(),
                user.created_at,
            ],
        )
        .with_context(|| format!("Failed to upsert user {}", user.username))?;

        Ok(())
    }
}

/// True when `err` comes from the case-insensitive unique index on `username`
pub fn is_username_conflict(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(failure, Some(message)))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation && message.contains("users.username")
        )
    })
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
        password_hash: row.get(4)?,
        role: enum_column(row, 5)?,
        status: enum_column(row, 6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::ensure_schema;
    use crate::domain::{ApprovalStatus, Role};
    use chrono::Utc;

    fn user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Scout,
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_username_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        UsersTable::upsert(&conn, &user("u1", "ana.souza")).unwrap();
        let duplicate = UsersTable::upsert(&conn, &user("u2", "Ana.Souza"));

        assert!(is_username_conflict(&duplicate.unwrap_err()));
        let users = UsersTable::list(&conn).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Scout);
    }

    #[test]
    fn test_other_failures_are_not_username_conflicts() {
        let conn = Connection::open_in_memory().unwrap();

        // no schema, so the table is missing
        let err = UsersTable::upsert(&conn, &user("u1", "ana.souza")).unwrap_err();

        assert!(!is_username_conflict(&err));
    }
}
