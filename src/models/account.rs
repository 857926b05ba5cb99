use serde::{Deserialize, Serialize};

/// Account role. Stored in the database as a one-character code
/// (`"0"` = admin, anything else = regular).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Regular,
}

impl Role {
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Admin => "0",
            Self::Regular => "1",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Self {
        if code == "0" { Self::Admin } else { Self::Regular }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Account status. Stored as `"A"` / `"I"` / `"B"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    Blocked,
}

impl AccountStatus {
    #[must_use]
    pub const fn as_code(self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::Inactive => "I",
            Self::Blocked => "B",
        }
    }

    /// Parses a status code. Unknown codes are rejected rather than
    /// defaulted so a corrupt row never silently re-activates an account.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Active),
            "I" => Some(Self::Inactive),
            "B" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Full account record as the domain layer sees it. The password hash
/// stays inside the auth flow and is never serialized.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    pub failed_attempts: i32,
    pub access_count: i32,
}

/// Public view of an account, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub access_count: i32,
}

impl From<&Account> for Profile {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            role: account.role,
            access_count: account.access_count,
        }
    }
}
