//! User data access

use devteam_core::{DevteamError, Result, Value};

use crate::database::Database;
use crate::entity::User;

/// Finds the mail of a user.
const SQL_FIND_MAIL_BY_ID: &str = "SELECT mail FROM users WHERE id = $1";

/// Finds a user by id.
const SQL_FIND_BY_ID: &str = "SELECT id, mail FROM users WHERE id = $1";

/// Data access for [`User`] records
pub struct UserDao<'a> {
    db: &'a Database,
}

impl<'a> UserDao<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Mail address of a user
    pub async fn mail_of(&self, id: i32) -> Result<String> {
        let result = self
            .db
            .query(SQL_FIND_MAIL_BY_ID, &[Value::Int32(id)])
            .await
            .map_err(|e| DevteamError::Dao(format!("loading mail of user {}: {}", id, e)))?;

        result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevteamError::NotFound(format!("user {}", id)))
    }

    /// Load a user by id
    pub async fn by_id(&self, id: i32) -> Result<User> {
        let result = self
            .db
            .query(SQL_FIND_BY_ID, &[Value::Int32(id)])
            .await
            .map_err(|e| DevteamError::Dao(format!("loading user {}: {}", id, e)))?;

        let row = result
            .first()
            .ok_or_else(|| DevteamError::NotFound(format!("user {}", id)))?;

        let mail = row
            .get_by_name("mail")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevteamError::Dao("user row without mail".into()))?;

        Ok(User { id, mail })
    }
}
