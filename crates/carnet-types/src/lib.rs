pub mod api;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Known class groups. Class conversations are materialized for exactly this
/// catalog; a student's `class_level` is expected to be one of these strings.
pub const CLASS_LEVELS: &[&str] = &[
    "Seconde groupe 1",
    "Seconde groupe 2",
    "1ere groupe 1",
    "1ere groupe 2",
    "Terminale groupe 1",
    "Terminale groupe 2",
];

// -- JWT Claims --

/// Claims carried by the bearer token the external auth service issues.
/// Canonical definition lives here so the API middleware, the server and the
/// seed binary all agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

// -- Closed enums --
//
// Roles and kinds are stored as lowercase strings in SQLite and on the wire,
// but dispatch in code is always an exhaustive match.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Parent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized role `{0}`")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// Two-party conversation keyed by an unordered pair of user ids.
    Direct,
    /// Scoped to everyone sharing a class_level; no stored participants.
    Class,
    /// Reserved. Behaves like `Direct` (two stored participants).
    Group,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationKind::Direct => "direct",
            ConversationKind::Class => "class",
            ConversationKind::Group => "group",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized conversation kind `{0}`")]
pub struct ParseConversationKindError(String);

impl FromStr for ConversationKind {
    type Err = ParseConversationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(ConversationKind::Direct),
            "class" => Ok(ConversationKind::Class),
            "group" => Ok(ConversationKind::Group),
            other => Err(ParseConversationKindError(other.to_string())),
        }
    }
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    Audio,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::File => "file",
            MessageKind::Audio => "audio",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized message kind `{0}`")]
pub struct ParseMessageKindError(String);

impl FromStr for MessageKind {
    type Err = ParseMessageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "file" => Ok(MessageKind::File),
            "audio" => Ok(MessageKind::Audio),
            other => Err(ParseMessageKindError(other.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
