//! Fluent construction of communications.
//!
//! Each operation method selects the operation, its path and its payload;
//! the flag methods choose how the built unit runs. `build()` copies the
//! current state out into a new [`Communication`], so one builder can be
//! kept around and built again (a message panel refreshing the same list,
//! for instance). Builders are not reset by `build()`.
//!
//! ```no_run
//! use clientprojet::Communication;
//!
//! let login = Communication::builder()
//!     .connect("alice", "secret")
//!     .start_now()
//!     .sleep_until_finished()
//!     .build();
//! assert!(login.result().is_ok());
//!
//! let projects = Communication::builder().get_project_list().start_now().build();
//! let projects = projects.result();
//! ```

use std::collections::BTreeMap;

use super::client::ApiClient;
use super::descriptor::{ExecutionFlags, RequestDescriptor};
use super::executor::Communication;
use super::kind::CommunicationType;
use super::temporal::Temporal;
use crate::model::{MessageResource, ProjectStatus};

/// Owner of the time slots to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOwner {
    /// A human resource (usually the logged-in user); sent as `hresource`.
    Human(i64),
    /// Any other resource (room, equipment); sent as `other`.
    Other(i64),
}

impl SlotOwner {
    fn payload_entry(self) -> (&'static str, i64) {
        match self {
            Self::Human(id) => ("hresource", id),
            Self::Other(id) => ("other", id),
        }
    }
}

/// Builder of [`Communication`]s.
#[derive(Debug, Clone)]
pub struct CommunicationBuilder {
    client: ApiClient,
    kind: CommunicationType,
    payload: BTreeMap<String, String>,
    flags: ExecutionFlags,
}

impl CommunicationBuilder {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            client,
            kind: CommunicationType::Default,
            payload: BTreeMap::new(),
            flags: ExecutionFlags::default(),
        }
    }

    // ========================================================================
    // Execution flags
    // ========================================================================

    /// Start the communication as soon as it is built.
    pub fn start_now(&mut self) -> &mut Self {
        self.flags.start_now = true;
        self
    }

    /// Run on the calling thread and return only once the result is in.
    pub fn sleep_until_finished(&mut self) -> &mut Self {
        self.flags.sleep_until_finished = true;
        self
    }

    /// Let the communication run even if its worker pool shuts down first.
    pub fn keep_alive(&mut self) -> &mut Self {
        self.flags.keep_alive = true;
        self
    }

    /// Flags the next built unit will carry.
    pub fn flags(&self) -> ExecutionFlags {
        self.flags
    }

    /// Builds the communication from the current state.
    ///
    /// Starts it immediately when [`start_now`](Self::start_now) was set,
    /// blocking here too when [`sleep_until_finished`](Self::sleep_until_finished)
    /// was set as well.
    pub fn build(&self) -> Communication {
        debug_assert!(
            self.kind != CommunicationType::Default,
            "CommunicationBuilder::build called before selecting an operation"
        );
        log::debug!("Building {:?} with flags {:?}", self.kind, self.flags);
        Communication::new(self.client.clone(), self.descriptor(), self.flags)
    }

    /// Copy of the descriptor the next `build()` would produce.
    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(self.kind, self.payload.clone())
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Log in with a username and password.
    pub fn connect(&mut self, username: &str, password: &str) -> &mut Self {
        self.select(CommunicationType::Login);
        self.put("username", username);
        self.put("passwd", password);
        self
    }

    /// Check that the current access token is still accepted.
    pub fn check_connection(&mut self) -> &mut Self {
        self.select(CommunicationType::CheckConnection);
        self.put_access_token();
        self
    }

    /// Trade the renew token for a new token pair.
    pub fn update_connection(&mut self) -> &mut Self {
        self.select(CommunicationType::UpdateConnection);
        let renew_token = self.client.session().current_renew_token();
        self.put("token", renew_token);
        self
    }

    /// List the projects of the logged-in user.
    pub fn get_project_list(&mut self) -> &mut Self {
        self.select(CommunicationType::ListProjects);
        self.put_access_token();
        self
    }

    /// Create a project.
    pub fn create_project(
        &mut self,
        name: &str,
        description: &str,
        deadline: impl Into<Temporal>,
        status: ProjectStatus,
    ) -> &mut Self {
        self.select(CommunicationType::CreateProject);
        self.put_access_token();
        self.put("name", name);
        self.put("description", description);
        self.put("deadline", deadline.into().to_epoch_seconds());
        self.put("status", status);
        self
    }

    /// List the tasks of a project.
    pub fn get_task_list(&mut self, project: i64) -> &mut Self {
        self.select(CommunicationType::ListTasks);
        self.put_access_token();
        self.put("project", project);
        self
    }

    /// List the time slots of a resource between `from` and `to`.
    pub fn get_user_time_slot_list(
        &mut self,
        from: impl Into<Temporal>,
        to: impl Into<Temporal>,
        owner: SlotOwner,
    ) -> &mut Self {
        self.select(CommunicationType::ListTimeSlots);
        self.put_access_token();
        self.put("from", from.into().to_epoch_seconds());
        self.put("to", to.into().to_epoch_seconds());
        let (key, id) = owner.payload_entry();
        self.put(key, id);
        self
    }

    /// Book a time slot on a task in a room.
    pub fn add_time_slot(
        &mut self,
        start: impl Into<Temporal>,
        end: impl Into<Temporal>,
        task: i64,
        room: i64,
    ) -> &mut Self {
        self.select(CommunicationType::AddTimeSlot);
        self.put_access_token();
        self.put("start", start.into().to_epoch_seconds());
        self.put("end", end.into().to_epoch_seconds());
        self.put("task", task);
        self.put("room", room);
        self
    }

    /// Fetch one page of messages of a project or user.
    pub fn get_message_list(&mut self, origin: MessageResource, id: i64, page: u32) -> &mut Self {
        self.select(CommunicationType::ListMessages);
        self.put_access_token();
        self.put("origin", origin);
        self.put("id", id);
        self.put("page", page);
        self
    }

    /// Post a message to a project board or a user.
    pub fn send_message(&mut self, content: &str, destination: MessageResource, id: i64) -> &mut Self {
        self.select(CommunicationType::SendMessage);
        self.put_access_token();
        self.put("content", content);
        self.put("destination", destination);
        self.put("id", id);
        self
    }

    /// Fetch the logged-in user's profile.
    pub fn get_user_infos(&mut self) -> &mut Self {
        self.select(CommunicationType::GetUserInfo);
        self.put_access_token();
        self
    }

    /// Fetch one human resource.
    pub fn get_human_resource(&mut self, id: i64) -> &mut Self {
        self.select(CommunicationType::GetHumanResource);
        self.put_access_token();
        self.put("id", id);
        self
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Switches operation; keys of the previous one do not carry over.
    fn select(&mut self, kind: CommunicationType) {
        if self.kind != CommunicationType::Default && self.kind != kind {
            log::debug!("Builder switches from {:?} to {:?}", self.kind, kind);
        }
        self.kind = kind;
        self.payload.clear();
    }

    fn put_access_token(&mut self) {
        let token = self.client.session().current_access_token();
        self.put("token", token);
    }

    fn put(&mut self, key: &str, value: impl ToString) {
        self.payload.insert(key.to_string(), value.to_string());
    }
}
