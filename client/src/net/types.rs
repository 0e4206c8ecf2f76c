//! Wire DTOs for the hosted auth service and the `profiles` table.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON so responses decode directly. Only
//! the fields routing depends on are typed; unknown fields are ignored.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Authenticated identity reported by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider user id (UUID string). Also the primary key of `profiles`.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token bundle returned by sign-in, code exchange, verification and refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry in seconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Lifetime in seconds; only used to derive `expires_at` when it is missing.
    #[serde(default, skip_serializing)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

impl AuthSession {
    /// Fill `expires_at` from `expires_in` relative to `now_secs`.
    #[must_use]
    pub fn with_expiry_from(mut self, now_secs: i64) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now_secs + secs);
        }
        self
    }

    /// Whether the access token expires within `margin_secs` of `now_secs`.
    /// Sessions without a known expiry never count as expiring.
    #[must_use]
    pub fn expires_within(&self, now_secs: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at - now_secs <= margin_secs)
    }
}

/// Onboarding path a profile follows after sign-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RegistrationFlow {
    Inaugural,
    Enrollment,
    Admin,
    /// Any value the client does not recognize, kept verbatim.
    Other(String),
    /// Missing, empty or `null` on the wire.
    #[default]
    Unset,
}

impl RegistrationFlow {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "inaugural" => Self::Inaugural,
            "enrollment" => Self::Enrollment,
            "admin" => Self::Admin,
            "" => Self::Unset,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inaugural => "inaugural",
            Self::Enrollment => "enrollment",
            Self::Admin => "admin",
            Self::Other(raw) => raw,
            Self::Unset => "",
        }
    }

    #[must_use]
    pub fn is_inaugural(&self) -> bool {
        matches!(self, Self::Inaugural)
    }
}

impl Serialize for RegistrationFlow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RegistrationFlow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Unset, Self::parse))
    }
}

/// Row of the `profiles` table that controls post-login routing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Same value as the owning [`AuthUser::id`].
    pub id: String,
    #[serde(default)]
    pub registration_flow: RegistrationFlow,
    #[serde(default, deserialize_with = "deserialize_bool_or_null")]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub full_name: Option<String>,
}

fn deserialize_bool_or_null<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
