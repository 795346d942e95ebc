//! Domain objects decoded from API responses.
//!
//! These are plain data holders. The communication layer fills them from the
//! JSON bodies the server returns; nothing here talks to the network.

use serde::{Deserialize, Serialize};

/// A user account, as returned by `auth/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-side identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub firstname: String,
    /// Last name.
    #[serde(default)]
    pub lastname: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Whether this user wrote the given message.
    pub fn is_sender(&self, message: &Message) -> bool {
        message.src.as_ref().is_some_and(|src| src.id == self.id)
    }

    /// "Firstname Lastname", trimmed when either half is missing.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Work in progress.
    #[default]
    OnGoing,
    /// Finished and kept for reference.
    Archived,
    /// Removed by its owner.
    Deleted,
}

impl ProjectStatus {
    /// Wire representation used in request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnGoing => "ON_GOING",
            Self::Archived => "ARCHIVED",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ON_GOING" | "ONGOING" => Ok(Self::OnGoing),
            "ARCHIVED" => Ok(Self::Archived),
            "DELETED" => Ok(Self::Deleted),
            other => Err(format!("unknown project status: {other}")),
        }
    }
}

/// A project the user takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Server-side identifier.
    pub id: i64,
    /// Project name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Deadline as epoch seconds (0 when unset).
    #[serde(default)]
    pub deadline: i64,
    /// Lifecycle state.
    #[serde(default)]
    pub status: ProjectStatus,
}

/// A task inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-side identifier.
    pub id: i64,
    /// Task name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Owning project id.
    #[serde(default)]
    pub project: i64,
    /// Start as epoch seconds.
    #[serde(default)]
    pub date_start: i64,
    /// End as epoch seconds.
    #[serde(default)]
    pub date_end: i64,
}

/// A booked slot of time on a task, optionally in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Server-side identifier.
    pub id: i64,
    /// Start as epoch seconds.
    pub start: i64,
    /// End as epoch seconds.
    pub end: i64,
    /// Task the slot is booked for.
    #[serde(default)]
    pub task: i64,
    /// Room the slot takes place in, if any.
    #[serde(default)]
    pub room: Option<i64>,
}

/// Where a message lives: a project's board or a user's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageResource {
    /// Project discussion board.
    Project,
    /// Direct messages to a user.
    User,
}

impl MessageResource {
    /// Wire representation used in request payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for MessageResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageResource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "user" => Ok(Self::User),
            other => Err(format!("unknown message resource: {other}")),
        }
    }
}

/// A message on a project board or in a user inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-side identifier.
    pub id: i64,
    /// Message body. Newlines are preserved.
    pub content: String,
    /// Author, when the server includes it.
    #[serde(default)]
    pub src: Option<User>,
    /// Send time as epoch seconds.
    #[serde(default)]
    pub date: i64,
}

/// A person that can be assigned to tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanResource {
    /// Server-side identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub firstname: String,
    /// Last name.
    #[serde(default)]
    pub lastname: String,
    /// Role within the organisation.
    #[serde(default)]
    pub role: String,
}
