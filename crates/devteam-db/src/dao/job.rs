//! Job data access

use devteam_core::{DevteamError, Result, Value};

use crate::database::Database;
use crate::entity::Job;

/// Counts jobs attached to a specification.
const SQL_COUNT_BY_SPECIFICATION: &str =
    "SELECT COUNT(*) FROM jobs WHERE specification_id = $1";

/// Finds all jobs of a specification.
const SQL_FIND_BY_SPECIFICATION: &str =
    "SELECT id, specification_id, name FROM jobs WHERE specification_id = $1 ORDER BY id ASC";

/// Data access for [`Job`] records
pub struct JobDao<'a> {
    db: &'a Database,
}

impl<'a> JobDao<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Number of jobs in a specification
    pub async fn count_for_specification(&self, specification_id: i32) -> Result<i64> {
        let result = self
            .db
            .query(SQL_COUNT_BY_SPECIFICATION, &[Value::Int32(specification_id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!(
                    "counting jobs of specification {}: {}",
                    specification_id, e
                ))
            })?;

        Ok(result
            .first()
            .and_then(|row| row.get(0))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// All jobs of a specification, oldest first
    pub async fn for_specification(&self, specification_id: i32) -> Result<Vec<Job>> {
        let result = self
            .db
            .query(SQL_FIND_BY_SPECIFICATION, &[Value::Int32(specification_id)])
            .await
            .map_err(|e| {
                DevteamError::Dao(format!(
                    "loading jobs of specification {}: {}",
                    specification_id, e
                ))
            })?;

        result
            .rows
            .iter()
            .map(|row| {
                let id = row
                    .get_by_name("id")
                    .and_then(Value::as_i32)
                    .ok_or_else(|| DevteamError::Dao("job row without id".into()))?;
                let name = row
                    .get_by_name("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| DevteamError::Dao("job row without name".into()))?;
                Ok(Job {
                    id,
                    specification_id,
                    name,
                })
            })
            .collect()
    }
}
