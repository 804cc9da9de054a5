//! Tenant and membership records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lendbook_store::{Record, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tenant {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Tenant {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// A user's role within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Whether the role may manage other members.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            _ => Err(DomainError::UnknownValue {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// Links a user to a tenant with a role.
///
/// Rows are addressed by id, so the `users_tenants` table needs an `id`
/// primary key alongside `user_id` and `tenant_id`. Rows without one fail to
/// decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub id: RecordId,
    pub user_id: String,
    pub tenant_id: RecordId,
    pub role: Role,
}

impl Record for Membership {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("guest".parse::<Role>().is_err());
        assert!(Role::Admin.can_manage());
        assert!(!Role::Member.can_manage());
    }

    #[test]
    fn test_membership_row_requires_id() {
        let result = serde_json::from_value::<Membership>(json!({
            "user_id": "u-1",
            "tenant_id": "t-1",
            "role": "owner"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_membership_row() {
        let membership: Membership = serde_json::from_value(json!({
            "id": "m-1",
            "user_id": "u-1",
            "tenant_id": "t-1",
            "role": "owner"
        }))
        .unwrap();
        assert_eq!(membership.role, Role::Owner);
        assert_eq!(membership.tenant_id, RecordId::new("t-1"));
    }
}
