use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier of the account an avatar slot belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    pub fn new() -> Self {
        OwnerId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        OwnerId(id)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(OwnerId)
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// The account as seen by the avatar service: its id and display name.
///
/// Authentication happens upstream; this is whatever the session layer resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
}

impl Owner {
    pub fn new(id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Fallback initials shown while the avatar image is loading or absent.
    ///
    /// First letter of the first word plus first letter of the last word, uppercased.
    pub fn initials(&self) -> String {
        let words: Vec<&str> = self.name.split_whitespace().collect();
        match words.as_slice() {
            [] => String::new(),
            [only] => only.chars().take(1).flat_map(char::to_uppercase).collect(),
            [first, .., last] => first
                .chars()
                .take(1)
                .chain(last.chars().take(1))
                .flat_map(char::to_uppercase)
                .collect(),
        }
    }
}
