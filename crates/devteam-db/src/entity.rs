//! Domain entities

use devteam_core::DevteamError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
    /// Submitted by a customer, not yet picked up by staff
    #[default]
    Waiting,
    /// Being worked on
    Active,
    /// Completed
    Done,
}

impl SpecStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecStatus::Waiting => "waiting",
            SpecStatus::Active => "active",
            SpecStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpecStatus {
    type Err = DevteamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(SpecStatus::Waiting),
            "active" => Ok(SpecStatus::Active),
            "done" => Ok(SpecStatus::Done),
            other => Err(DevteamError::Dao(format!(
                "unknown specification status: {}",
                other
            ))),
        }
    }
}

/// A work request submitted by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub status: SpecStatus,
    /// Number of jobs attached to this specification
    pub jobs: i64,
    /// Customer mail, filled for the staff queue view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_mail: Option<String>,
}

/// A unit of work inside a specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i32,
    pub specification_id: i32,
    pub name: String,
}

/// A registered user (customer or staff)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub mail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trip() {
        for status in [SpecStatus::Waiting, SpecStatus::Active, SpecStatus::Done] {
            assert_eq!(SpecStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(SpecStatus::from_str("archived").is_err());
        assert_eq!(SpecStatus::default(), SpecStatus::Waiting);
    }
}
