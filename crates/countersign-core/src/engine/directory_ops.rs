//! User, account and prefix operations for the Engine.

use super::Engine;
use crate::{
    error::{ApprovalError, Result},
    models::{Account, PrefixConfig, Role, User},
    params::{CreateAccount, CreatePrefix, CreateUser, Id},
};

impl Engine {
    /// Registers a user.
    ///
    /// # Errors
    ///
    /// * `ApprovalError::Validation` - empty name or unknown role
    pub async fn create_user(&self, params: &CreateUser) -> Result<User> {
        let role = params
            .role
            .parse::<Role>()
            .map_err(|e| ApprovalError::validation("role").with_reason(e))?;
        let name = params.name.clone();
        self.with_database(move |db| db.create_user(&name, role))
            .await
    }

    /// Retrieves a user by ID.
    pub async fn get_user(&self, params: &Id) -> Result<Option<User>> {
        let id = params.id;
        self.with_database(move |db| db.get_user(id)).await
    }

    /// Lists users, optionally only holders of `role`.
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        self.with_database(move |db| db.list_users(role)).await
    }

    /// Registers an account for line items to reference.
    pub async fn create_account(&self, params: &CreateAccount) -> Result<Account> {
        let code = params.code.clone();
        let name = params.name.clone();
        self.with_database(move |db| db.create_account(&code, &name))
            .await
    }

    /// Lists accounts ordered by code.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.with_database(|db| db.list_accounts()).await
    }

    /// Configures an active control-number prefix. The code is upper-cased.
    pub async fn create_prefix(&self, params: &CreatePrefix) -> Result<PrefixConfig> {
        let code = params.code.trim().to_uppercase();
        let description = params.description.clone().filter(|d| !d.trim().is_empty());
        self.with_database(move |db| db.create_prefix(&code, description.as_deref()))
            .await
    }

    /// Lists prefixes ordered by code.
    pub async fn list_prefixes(&self) -> Result<Vec<PrefixConfig>> {
        self.with_database(|db| db.list_prefixes()).await
    }

    /// Activates or deactivates a prefix. Deactivated prefixes keep their
    /// issued numbers but cannot be used for new documents.
    pub async fn set_prefix_active(&self, code: &str, active: bool) -> Result<PrefixConfig> {
        let code = code.trim().to_uppercase();
        self.with_database(move |db| db.set_prefix_active(&code, active))
            .await
    }
}
