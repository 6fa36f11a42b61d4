use super::user_id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope under which interaction records are stored. Authenticated sessions
/// get a per-user namespace so switching accounts never reads another user's
/// state; anonymous browsing falls back to a shared global namespace.
///
/// The storage key is rendered here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    User(UserId),
    Global,
}

impl Namespace {
    pub fn for_user(user: Option<UserId>) -> Self {
        match user {
            Some(id) => Namespace::User(id),
            None => Namespace::Global,
        }
    }

    pub fn storage_key(&self) -> String {
        match self {
            Namespace::User(id) => format!("user:{}", id.as_str()),
            Namespace::Global => "global".to_string(),
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Namespace::Global)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}
