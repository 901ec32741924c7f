//! Users, accounts and control-number prefixes.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::utils::{get_enum, get_id};
use crate::{
    control_number::validate_prefix_code,
    error::{ApprovalError, DatabaseResultExt, Result},
    models::{Account, PrefixConfig, Role, User},
};

const INSERT_USER_SQL: &str = "INSERT INTO users (name, role, created_at) VALUES (?1, ?2, ?3)";
const SELECT_USER_SQL: &str = "SELECT id, name, role FROM users WHERE id = ?1";
const SELECT_USERS_SQL: &str = "SELECT id, name, role FROM users ORDER BY id";
const SELECT_USERS_BY_ROLE_SQL: &str = "SELECT id, name, role FROM users WHERE role = ?1 ORDER BY id";

const INSERT_ACCOUNT_SQL: &str = "INSERT INTO accounts (code, name) VALUES (?1, ?2)";
const SELECT_ACCOUNT_SQL: &str = "SELECT id, code, name FROM accounts WHERE id = ?1";
const CHECK_ACCOUNT_CODE_SQL: &str = "SELECT EXISTS(SELECT 1 FROM accounts WHERE code = ?1)";
const SELECT_ACCOUNTS_SQL: &str = "SELECT id, code, name FROM accounts ORDER BY code";

const INSERT_PREFIX_SQL: &str =
    "INSERT INTO control_number_prefixes (code, description, active) VALUES (?1, ?2, 1)";
const SELECT_PREFIX_SQL: &str =
    "SELECT code, description, active FROM control_number_prefixes WHERE code = ?1";
const SELECT_PREFIXES_SQL: &str =
    "SELECT code, description, active FROM control_number_prefixes ORDER BY code";
const UPDATE_PREFIX_ACTIVE_SQL: &str =
    "UPDATE control_number_prefixes SET active = ?1 WHERE code = ?2";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: get_id(row, 0)?,
        name: row.get(1)?,
        role: get_enum(row, 2)?,
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: get_id(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
    })
}

fn prefix_from_row(row: &Row<'_>) -> rusqlite::Result<PrefixConfig> {
    Ok(PrefixConfig {
        code: row.get(0)?,
        description: row.get(1)?,
        active: row.get(2)?,
    })
}

pub(crate) fn find_user(conn: &Connection, id: u64) -> Result<Option<User>> {
    conn.query_row(SELECT_USER_SQL, params![id as i64], user_from_row)
        .optional()
        .db_context("Failed to query user")
}

pub(crate) fn find_account(conn: &Connection, id: u64) -> Result<Option<Account>> {
    conn.query_row(SELECT_ACCOUNT_SQL, params![id as i64], account_from_row)
        .optional()
        .db_context("Failed to query account")
}

pub(crate) fn find_prefix(conn: &Connection, code: &str) -> Result<Option<PrefixConfig>> {
    conn.query_row(SELECT_PREFIX_SQL, params![code], prefix_from_row)
        .optional()
        .db_context("Failed to query prefix")
}

fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApprovalError::validation(field).with_reason(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl super::Database {
    /// Registers a user with a role.
    pub fn create_user(&mut self, name: &str, role: Role) -> Result<User> {
        let name = require_text("name", name)?;
        let now = Timestamp::now().to_string();

        self.connection
            .execute(INSERT_USER_SQL, params![&name, role.as_str(), &now])
            .db_context("Failed to insert user")?;

        Ok(User {
            id: self.connection.last_insert_rowid() as u64,
            name,
            role,
        })
    }

    /// Retrieves a user by ID.
    pub fn get_user(&self, id: u64) -> Result<Option<User>> {
        find_user(&self.connection, id)
    }

    /// Lists users, optionally only those holding `role`.
    pub fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        let (sql, role_param) = match role {
            Some(role) => (SELECT_USERS_BY_ROLE_SQL, Some(role.as_str())),
            None => (SELECT_USERS_SQL, None),
        };
        let mut stmt = self
            .connection
            .prepare(sql)
            .db_context("Failed to prepare query")?;

        let rows = match role_param {
            Some(role) => stmt.query_map(params![role], user_from_row),
            None => stmt.query_map([], user_from_row),
        }
        .db_context("Failed to query users")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse user row")
    }

    /// Registers an account; codes are unique.
    pub fn create_account(&mut self, code: &str, name: &str) -> Result<Account> {
        let code = require_text("code", code)?;
        let name = require_text("name", name)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let taken: bool = tx
            .query_row(CHECK_ACCOUNT_CODE_SQL, params![&code], |row| row.get(0))
            .db_context("Failed to check account code")?;
        if taken {
            return Err(ApprovalError::validation("code")
                .with_reason(format!("Account code '{code}' already exists")));
        }

        tx.execute(INSERT_ACCOUNT_SQL, params![&code, &name])
            .db_context("Failed to insert account")?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(Account { id, code, name })
    }

    /// Retrieves an account by ID.
    pub fn get_account(&self, id: u64) -> Result<Option<Account>> {
        find_account(&self.connection, id)
    }

    /// Lists accounts ordered by code.
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ACCOUNTS_SQL)
            .db_context("Failed to prepare query")?;
        let rows = stmt
            .query_map([], account_from_row)
            .db_context("Failed to query accounts")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse account row")
    }

    /// Configures a new, active control-number prefix.
    pub fn create_prefix(&mut self, code: &str, description: Option<&str>) -> Result<PrefixConfig> {
        validate_prefix_code(code)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        if find_prefix(&tx, code)?.is_some() {
            return Err(ApprovalError::validation("prefix")
                .with_reason(format!("Prefix '{code}' already exists")));
        }
        tx.execute(INSERT_PREFIX_SQL, params![code, description])
            .db_context("Failed to insert prefix")?;

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(PrefixConfig {
            code: code.to_string(),
            description: description.map(String::from),
            active: true,
        })
    }

    /// Retrieves a prefix by code.
    pub fn get_prefix(&self, code: &str) -> Result<Option<PrefixConfig>> {
        find_prefix(&self.connection, code)
    }

    /// Lists prefixes ordered by code.
    pub fn list_prefixes(&self) -> Result<Vec<PrefixConfig>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PREFIXES_SQL)
            .db_context("Failed to prepare query")?;
        let rows = stmt
            .query_map([], prefix_from_row)
            .db_context("Failed to query prefixes")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to parse prefix row")
    }

    /// Enables or disables a prefix. Existing control numbers are unaffected.
    pub fn set_prefix_active(&mut self, code: &str, active: bool) -> Result<PrefixConfig> {
        let updated = self
            .connection
            .execute(UPDATE_PREFIX_ACTIVE_SQL, params![active, code])
            .db_context("Failed to update prefix")?;
        if updated == 0 {
            return Err(ApprovalError::not_found("Prefix", code));
        }
        find_prefix(&self.connection, code)?.ok_or_else(|| ApprovalError::not_found("Prefix", code))
    }
}
