//! Operation kinds and their HTTP routing.

/// HTTP verb used to issue a communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    /// Payload sent as the query string.
    Get,
    /// Payload sent as a form-encoded body.
    Post,
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Closed set of API operations a builder can select.
///
/// Each kind maps to exactly one path, one verb and one response decoding
/// rule. `Default` is the unset sentinel of a fresh builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommunicationType {
    /// No operation selected yet.
    #[default]
    Default,
    /// Log in with username and password.
    Login,
    /// Verify that the current access token is still accepted.
    CheckConnection,
    /// Trade the renew token for a fresh token pair.
    UpdateConnection,
    /// Projects visible to the user.
    ListProjects,
    /// Create a project.
    CreateProject,
    /// Tasks of one project.
    ListTasks,
    /// Time slots of a resource within a window.
    ListTimeSlots,
    /// Book a time slot.
    AddTimeSlot,
    /// One page of messages of a project or user.
    ListMessages,
    /// Post a message.
    SendMessage,
    /// One human resource by id.
    GetHumanResource,
    /// The logged-in user's profile.
    GetUserInfo,
}

impl CommunicationType {
    /// API path relative to the server base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Login => "auth/connect",
            Self::CheckConnection | Self::GetUserInfo => "auth/verify",
            Self::UpdateConnection => "auth/renew",
            Self::ListProjects => "project/list",
            Self::CreateProject => "project/create",
            Self::ListTasks => "task/list",
            Self::ListTimeSlots => "timeslot/list",
            Self::AddTimeSlot => "timeslot/create",
            Self::ListMessages => "message/list",
            Self::SendMessage => "message/create",
            Self::GetHumanResource => "resource/h/get",
        }
    }

    /// HTTP verb the operation is issued with.
    pub fn verb(self) -> HttpVerb {
        match self {
            Self::Login
            | Self::UpdateConnection
            | Self::CreateProject
            | Self::AddTimeSlot
            | Self::SendMessage => HttpVerb::Post,
            Self::Default
            | Self::CheckConnection
            | Self::ListProjects
            | Self::ListTasks
            | Self::ListTimeSlots
            | Self::ListMessages
            | Self::GetHumanResource
            | Self::GetUserInfo => HttpVerb::Get,
        }
    }

    /// Whether the payload carries a session token.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::Default | Self::Login)
    }

    /// Whether a successful response rewrites the session tokens.
    pub fn updates_session(self) -> bool {
        matches!(self, Self::Login | Self::UpdateConnection)
    }
}
