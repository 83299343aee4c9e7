//! Specification data access

use std::str::FromStr;

use devteam_core::{DevteamError, Result, Row, Value};

use crate::database::Database;
use crate::entity::{SpecStatus, Specification};

/// Finds the name of a specification by id.
const SQL_FIND_NAME_BY_ID: &str = "SELECT name FROM specifications WHERE id = $1";

/// Finds the status of a specification by id.
const SQL_FIND_STATUS_BY_ID: &str = "SELECT status FROM specifications WHERE id = $1";

/// Finds all specifications of one customer, newest first.
const SQL_FIND_BY_USER_ID: &str =
    "SELECT id, user_id, name, status FROM specifications WHERE user_id = $1 ORDER BY id DESC";

/// Finds all waiting specifications together with the customer mail.
const SQL_FIND_WAITING: &str = "SELECT s.id, s.user_id, s.name, s.status, u.mail \
     FROM specifications AS s \
     INNER JOIN users AS u ON s.user_id = u.id \
     WHERE s.status = $1 ORDER BY s.id ASC";

/// Updates the status of a specification.
const SQL_SET_STATUS: &str = "UPDATE specifications SET status = $1 WHERE id = $2";

/// Saves a new customer specification.
const SQL_INSERT: &str =
    "INSERT INTO specifications (user_id, name, status) VALUES ($1, $2, $3)";

/// Finds the most recent specification id of one customer.
const SQL_FIND_LAST_ID_BY_USER: &str =
    "SELECT MAX(id) AS id FROM specifications WHERE user_id = $1";

/// Finds the customer who created a specification.
const SQL_FIND_AUTHOR_BY_ID: &str = "SELECT user_id FROM specifications WHERE id = $1";

/// Data access for [`Specification`] records
pub struct SpecificationDao<'a> {
    db: &'a Database,
}

impl<'a> SpecificationDao<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Name of the specification with the given id
    pub async fn name_of(&self, id: i32) -> Result<String> {
        let result = self
            .db
            .query(SQL_FIND_NAME_BY_ID, &[Value::Int32(id)])
            .await
            .map_err(|e| DevteamError::Dao(format!("loading name of specification {}: {}", id, e)))?;

        let name = result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DevteamError::NotFound(format!("specification {}", id)))?;

        tracing::debug!(specification = id, "loaded specification name");
        Ok(name)
    }

    /// Status of the specification with the given id
    pub async fn status_of(&self, id: i32) -> Result<SpecStatus> {
        let result = self
            .db
            .query(SQL_FIND_STATUS_BY_ID, &[Value::Int32(id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("loading status of specification {}: {}", id, e))
            })?;

        let raw = result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_str)
            .ok_or_else(|| DevteamError::NotFound(format!("specification {}", id)))?;

        SpecStatus::from_str(raw)
    }

    /// All specifications of one customer, newest first, with job counts
    pub async fn by_user(&self, user_id: i32) -> Result<Vec<Specification>> {
        let result = self
            .db
            .query(SQL_FIND_BY_USER_ID, &[Value::Int32(user_id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("loading specifications of user {}: {}", user_id, e))
            })?;

        let mut specifications = Vec::with_capacity(result.row_count());
        for row in &result.rows {
            let mut spec = spec_from_row(row)?;
            spec.jobs = self.db.jobs().count_for_specification(spec.id).await?;
            specifications.push(spec);
        }

        tracing::debug!(user = user_id, count = specifications.len(), "loaded user specifications");
        Ok(specifications)
    }

    /// The staff queue: all waiting specifications with customer mail
    pub async fn waiting(&self) -> Result<Vec<Specification>> {
        let status = Value::String(SpecStatus::Waiting.as_str().to_string());
        let result = self
            .db
            .query(SQL_FIND_WAITING, &[status])
            .await
            .map_err(|e| DevteamError::Dao(format!("loading waiting specifications: {}", e)))?;

        let mut specifications = Vec::with_capacity(result.row_count());
        for row in &result.rows {
            let mut spec = spec_from_row(row)?;
            spec.customer_mail = row
                .get_by_name("mail")
                .and_then(Value::as_str)
                .map(str::to_string);
            spec.jobs = self.db.jobs().count_for_specification(spec.id).await?;
            specifications.push(spec);
        }

        tracing::debug!(count = specifications.len(), "loaded waiting specifications");
        Ok(specifications)
    }

    /// Save a new specification for a customer; returns the new id.
    ///
    /// The status always starts as `waiting`.
    pub async fn insert(&self, user_id: i32, name: &str) -> Result<i32> {
        self.db
            .execute(
                SQL_INSERT,
                &[
                    Value::Int32(user_id),
                    Value::String(name.to_string()),
                    Value::String(SpecStatus::Waiting.as_str().to_string()),
                ],
            )
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("saving specification for user {}: {}", user_id, e))
            })?;

        tracing::info!(user = user_id, "saved new specification");
        self.last_id_for(user_id).await
    }

    /// Most recent specification id created by a customer
    pub async fn last_id_for(&self, user_id: i32) -> Result<i32> {
        let result = self
            .db
            .query(SQL_FIND_LAST_ID_BY_USER, &[Value::Int32(user_id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("loading last specification id of user {}: {}", user_id, e))
            })?;

        result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_i32)
            .ok_or_else(|| {
                DevteamError::NotFound(format!("no specifications for user {}", user_id))
            })
    }

    /// Move a specification to the given status
    pub async fn set_status(&self, id: i32, status: SpecStatus) -> Result<()> {
        let result = self
            .db
            .execute(
                SQL_SET_STATUS,
                &[
                    Value::String(status.as_str().to_string()),
                    Value::Int32(id),
                ],
            )
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("setting status of specification {}: {}", id, e))
            })?;

        if result.affected_rows == 0 {
            return Err(DevteamError::NotFound(format!("specification {}", id)));
        }

        tracing::info!(specification = id, status = %status, "specification status updated");
        Ok(())
    }

    /// Id of the customer who created the specification
    pub async fn author_of(&self, id: i32) -> Result<i32> {
        let result = self
            .db
            .query(SQL_FIND_AUTHOR_BY_ID, &[Value::Int32(id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!("loading author of specification {}: {}", id, e))
            })?;

        result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_i32)
            .ok_or_else(|| DevteamError::NotFound(format!("specification {}", id)))
    }
}

/// Map one result row onto a `Specification` (jobs/mail filled by callers)
fn spec_from_row(row: &Row) -> Result<Specification> {
    let id = row
        .get_by_name("id")
        .and_then(Value::as_i32)
        .ok_or_else(|| DevteamError::Dao("specification row without id".into()))?;
    let user_id = row
        .get_by_name("user_id")
        .and_then(Value::as_i32)
        .ok_or_else(|| DevteamError::Dao("specification row without user_id".into()))?;
    let name = row
        .get_by_name("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DevteamError::Dao("specification row without name".into()))?;
    let status = row
        .get_by_name("status")
        .and_then(Value::as_str)
        .map(SpecStatus::from_str)
        .transpose()?
        .ok_or_else(|| DevteamError::Dao("specification row without status".into()))?;

    Ok(Specification {
        id,
        user_id,
        name,
        status,
        jobs: 0,
        customer_mail: None,
    })
}
