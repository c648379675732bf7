//! User allow-list and the permission gate in front of account-affecting commands
//!
//! The allow-list arrives in several shapes (YAML list, JSON-array string,
//! comma-separated string) and is normalized once, at deserialization, into
//! a canonical identifier set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::future::Future;

/// Rejection from the permission gate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user '{user}' is not permitted to run this command")]
pub struct AccessDenied {
    pub user: String,
}

/// Canonical set of permitted user identifiers
///
/// An empty list permits everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    users: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            users: users
                .into_iter()
                .map(|u| u.as_ref().trim().to_string())
                .filter(|u| !u.is_empty())
                .collect(),
        }
    }

    /// Parse the string forms: a JSON array, or a comma-separated list
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        if value.starts_with('[') {
            let entries: Vec<UserEntry> = serde_json::from_str(value).map_err(|e| {
                anyhow::anyhow!("allowedUsers must be a JSON array (e.g. [\"123\", \"456\"]): {}", e)
            })?;
            return Ok(Self::new(entries.into_iter().map(UserEntry::into_string)));
        }

        Ok(Self::new(value.split(',')))
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    /// Whether `user` may run gated commands
    pub fn permits(&self, user: &str) -> bool {
        self.users.is_empty() || self.users.contains(user.trim())
    }
}

/// Run `op` only when `user` is permitted
///
/// `op` is not polled at all when access is denied.
pub async fn guarded<F, T>(allow: &AllowList, user: &str, op: F) -> Result<T, AccessDenied>
where
    F: Future<Output = T>,
{
    if !allow.permits(user) {
        tracing::warn!("Denied gated command for user {}", user);
        return Err(AccessDenied {
            user: user.to_string(),
        });
    }
    Ok(op.await)
}

// Identifiers may be written as numbers in YAML/JSON
#[derive(Deserialize)]
#[serde(untagged)]
enum UserEntry {
    Text(String),
    Number(i64),
}

impl UserEntry {
    fn into_string(self) -> String {
        match self {
            UserEntry::Text(s) => s,
            UserEntry::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAllowList {
    List(Vec<UserEntry>),
    Text(String),
}

impl<'de> Deserialize<'de> for AllowList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawAllowList>::deserialize(deserializer)? {
            None => Ok(AllowList::default()),
            Some(RawAllowList::List(entries)) => Ok(AllowList::new(
                entries.into_iter().map(UserEntry::into_string),
            )),
            Some(RawAllowList::Text(text)) => {
                AllowList::parse(&text).map_err(serde::de::Error::custom)
            }
        }
    }
}

impl Serialize for AllowList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.users.iter())
    }
}
