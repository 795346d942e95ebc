//! Response decoding and the result type callers read.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::kind::CommunicationType;
use super::session::{TokenPair, TokenResponse};
use super::status::HtmlCode;
use crate::model::{HumanResource, Message, Project, Task, TimeSlot, User};

/// Decoded body of a successful communication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseData {
    /// No domain payload: non-OK status or a status-only operation.
    #[default]
    None,
    /// Tokens from a login or renew.
    Tokens(TokenPair),
    /// The logged-in user.
    User(User),
    /// A single human resource.
    HumanResource(HumanResource),
    /// Projects in server order.
    Projects(Vec<Project>),
    /// Tasks in server order.
    Tasks(Vec<Task>),
    /// Time slots in server order.
    TimeSlots(Vec<TimeSlot>),
    /// Messages in server order.
    Messages(Vec<Message>),
}

/// Outcome of one communication. Written once, then read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationResult {
    /// Mapped HTTP status.
    pub status: HtmlCode,
    /// Decoded payload; always `None` unless `status` is OK.
    pub data: ResponseData,
}

impl CommunicationResult {
    /// A status without payload.
    pub fn status_only(status: HtmlCode) -> Self {
        Self {
            status,
            data: ResponseData::None,
        }
    }

    /// Whether the server answered 200 and the body decoded.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Projects, if this was a successful project listing.
    pub fn projects(&self) -> Option<&[Project]> {
        match &self.data {
            ResponseData::Projects(projects) => Some(projects),
            _ => None,
        }
    }

    /// Tasks, if this was a successful task listing.
    pub fn tasks(&self) -> Option<&[Task]> {
        match &self.data {
            ResponseData::Tasks(tasks) => Some(tasks),
            _ => None,
        }
    }

    /// Time slots, if this was a successful time slot listing.
    pub fn time_slots(&self) -> Option<&[TimeSlot]> {
        match &self.data {
            ResponseData::TimeSlots(slots) => Some(slots),
            _ => None,
        }
    }

    /// Messages, if this was a successful message listing.
    pub fn messages(&self) -> Option<&[Message]> {
        match &self.data {
            ResponseData::Messages(messages) => Some(messages),
            _ => None,
        }
    }

    /// User, if this was a successful user info request.
    pub fn user(&self) -> Option<&User> {
        match &self.data {
            ResponseData::User(user) => Some(user),
            _ => None,
        }
    }

    /// Human resource, if this was a successful lookup.
    pub fn human_resource(&self) -> Option<&HumanResource> {
        match &self.data {
            ResponseData::HumanResource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Token pair, if this was a successful login or renew.
    pub fn tokens(&self) -> Option<&TokenPair> {
        match &self.data {
            ResponseData::Tokens(pair) => Some(pair),
            _ => None,
        }
    }
}

/// What a 200 body decodes into, before session side effects.
#[derive(Debug)]
pub(crate) enum Decoded {
    Data(ResponseData),
    Tokens(TokenResponse),
}

/// Decodes a 200 body according to the operation kind.
///
/// Status-only operations ignore the body entirely.
pub(crate) fn decode_body(kind: CommunicationType, body: &str) -> Result<Decoded> {
    if kind.updates_session() {
        return parse::<TokenResponse>(body)
            .context("invalid token response")
            .map(Decoded::Tokens);
    }
    let data = match kind {
        CommunicationType::Default
        | CommunicationType::Login
        | CommunicationType::UpdateConnection
        | CommunicationType::CheckConnection
        | CommunicationType::CreateProject
        | CommunicationType::AddTimeSlot
        | CommunicationType::SendMessage => ResponseData::None,
        CommunicationType::GetUserInfo => ResponseData::User(parse(body)?),
        CommunicationType::GetHumanResource => ResponseData::HumanResource(parse(body)?),
        CommunicationType::ListProjects => ResponseData::Projects(parse_list(body)?),
        CommunicationType::ListTasks => ResponseData::Tasks(parse_list(body)?),
        CommunicationType::ListTimeSlots => ResponseData::TimeSlots(parse_list(body)?),
        CommunicationType::ListMessages => ResponseData::Messages(parse_list(body)?),
    };
    Ok(Decoded::Data(data))
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).context("invalid response body")
}

/// Decodes a list that is either a JSON array or an object keyed by
/// position (`{"0": .., "1": ..}`), keeping server order.
fn parse_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let value: Value = parse(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let mut keyed = map
                .into_iter()
                .map(|(key, item)| {
                    key.parse::<u64>()
                        .map(|position| (position, item))
                        .with_context(|| format!("non-positional key {key:?} in list object"))
                })
                .collect::<Result<Vec<_>>>()?;
            keyed.sort_by_key(|(position, _)| *position);
            keyed.into_iter().map(|(_, item)| item).collect()
        }
        Value::Null => Vec::new(),
        other => bail!("expected a list, got {other}"),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).context("invalid list item"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(kind: CommunicationType, body: &str) -> ResponseData {
        match decode_body(kind, body).unwrap() {
            Decoded::Data(data) => data,
            Decoded::Tokens(_) => panic!("unexpected tokens"),
        }
    }

    #[test]
    fn test_project_list_from_array() {
        let body = r#"[{"id":1,"name":"A"},{"id":2,"name":"B"}]"#;
        let ResponseData::Projects(projects) = data(CommunicationType::ListProjects, body) else {
            panic!("expected projects");
        };
        assert_eq!(projects.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_message_list_from_positional_object_keeps_server_order() {
        let body = r#"{
            "10": {"id": 30, "content": "third"},
            "2": {"id": 20, "content": "second"},
            "0": {"id": 10, "content": "first"}
        }"#;
        let ResponseData::Messages(messages) = data(CommunicationType::ListMessages, body) else {
            panic!("expected messages");
        };
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_null_list_is_empty() {
        assert_eq!(
            data(CommunicationType::ListTasks, "null"),
            ResponseData::Tasks(Vec::new())
        );
    }

    #[test]
    fn test_status_only_kinds_ignore_body() {
        assert_eq!(data(CommunicationType::CreateProject, "not json"), ResponseData::None);
        assert_eq!(data(CommunicationType::CheckConnection, ""), ResponseData::None);
    }

    #[test]
    fn test_login_decodes_tokens() {
        let body = r#"{"accessToken":"a","renewToken":"r"}"#;
        let Decoded::Tokens(tokens) = decode_body(CommunicationType::Login, body).unwrap() else {
            panic!("expected tokens");
        };
        assert_eq!(tokens.access_token, "a");
    }

    #[test]
    fn test_malformed_bodies_are_errors() {
        assert!(decode_body(CommunicationType::ListProjects, "{oops").is_err());
        assert!(decode_body(CommunicationType::ListProjects, r#"{"first": {}}"#).is_err());
        assert!(decode_body(CommunicationType::ListProjects, "42").is_err());
        assert!(decode_body(CommunicationType::GetUserInfo, r#"{"name":"x"}"#).is_err());
        assert!(decode_body(CommunicationType::Login, "{}").is_err());
    }

    #[test]
    fn test_decode_errors_carry_context() {
        let err = decode_body(CommunicationType::ListTasks, r#"[{"id": "x"}]"#).unwrap_err();
        assert!(format!("{err:#}").contains("invalid list item"));

        let err = decode_body(CommunicationType::ListTasks, r#"{"a": {}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("non-positional key"));

        let err = decode_body(CommunicationType::UpdateConnection, "[]").unwrap_err();
        assert!(format!("{err:#}").contains("invalid token response"));
    }

    #[test]
    fn test_session_kinds_always_decode_tokens() {
        let body = r#"{"accessToken":"a2"}"#;
        for kind in [CommunicationType::Login, CommunicationType::UpdateConnection] {
            assert!(matches!(decode_body(kind, body).unwrap(), Decoded::Tokens(_)));
        }
    }

    #[test]
    fn test_result_accessors() {
        let result = CommunicationResult {
            status: HtmlCode::Ok,
            data: ResponseData::Tasks(Vec::new()),
        };
        assert!(result.is_ok());
        assert_eq!(result.tasks().map(<[Task]>::len), Some(0));
        assert!(result.projects().is_none());
        assert!(CommunicationResult::status_only(HtmlCode::NotFound).user().is_none());
    }
}
