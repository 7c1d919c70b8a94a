//! Marketplace roles.

use serde::{Deserialize, Serialize};

/// Actor role. Every user account carries exactly one.
///
/// Wire and storage format: snake_case string (`"admin"`, `"wholesaler"`,
/// `"retailer"`, `"consumer"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Wholesaler,
    Retailer,
    Consumer,
}

impl Role {
    /// Parse from the stored string value. Returns `None` for unknown values.
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "admin" => Some(Self::Admin),
            "wholesaler" => Some(Self::Wholesaler),
            "retailer" => Some(Self::Retailer),
            "consumer" => Some(Self::Consumer),
            _ => None,
        }
    }

    /// Stored string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Wholesaler => "wholesaler",
            Self::Retailer => "retailer",
            Self::Consumer => "consumer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles a user may request an upgrade to. Admin is never requestable and
/// consumer is the floor, so only the two trading roles remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedRole {
    Wholesaler,
    Retailer,
}

impl RequestedRole {
    pub fn from_str_value(v: &str) -> Option<Self> {
        match v {
            "wholesaler" => Some(Self::Wholesaler),
            "retailer" => Some(Self::Retailer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wholesaler => "wholesaler",
            Self::Retailer => "retailer",
        }
    }

    /// The role granted when a request for this upgrade is approved.
    pub fn granted_role(self) -> Role {
        match self {
            Self::Wholesaler => Role::Wholesaler,
            Self::Retailer => Role::Retailer,
        }
    }
}
