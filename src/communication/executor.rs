//! Running a built communication and resolving its result.
//!
//! A [`Communication`] is one unit: a copied-out descriptor, its execution
//! flags and a one-shot latch. Starting it either performs the HTTP round
//! trip on the calling thread (`sleep_until_finished`) or queues it on the
//! client's worker pool. Either way the result is published exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::builder::CommunicationBuilder;
use super::client::ApiClient;
use super::descriptor::{ExecutionFlags, RequestDescriptor};
use super::dispatcher::Dispatchable;
use super::kind::HttpVerb;
use super::latch::CompletionLatch;
use super::response::{decode_body, CommunicationResult, Decoded, ResponseData};
use super::status::HtmlCode;

/// Shared state of one unit; the handle and the worker both point at it.
struct Unit {
    id: Uuid,
    descriptor: RequestDescriptor,
    flags: ExecutionFlags,
    client: ApiClient,
    started: AtomicBool,
    latch: CompletionLatch,
}

impl Dispatchable for Unit {
    fn run(&self) {
        let result = perform(&self.client, &self.descriptor, self.id);
        if !self.latch.complete(result) {
            log::warn!("[{}] result published twice, keeping the first", self.id);
        }
    }

    fn abandon(&self) {
        log::debug!("[{}] {:?} abandoned before dispatch", self.id, self.descriptor.kind());
        self.latch
            .complete(CommunicationResult::status_only(HtmlCode::CustomDefaultError));
    }

    fn keep_alive(&self) -> bool {
        self.flags.keep_alive
    }
}

/// Handle to one built communication.
///
/// Cloning the handle does not duplicate the request; clones observe the
/// same result.
#[derive(Clone)]
pub struct Communication {
    unit: Arc<Unit>,
}

impl std::fmt::Debug for Communication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communication")
            .field("id", &self.unit.id)
            .field("kind", &self.unit.descriptor.kind())
            .field("flags", &self.unit.flags)
            .field("started", &self.is_started())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}

impl Communication {
    /// Starts a builder on the process-wide [`ApiClient::global`].
    pub fn builder() -> CommunicationBuilder {
        ApiClient::global().builder()
    }

    /// Wraps a descriptor; starts it right away when `start_now` is set.
    pub(crate) fn new(
        client: ApiClient,
        descriptor: RequestDescriptor,
        flags: ExecutionFlags,
    ) -> Self {
        let communication = Self {
            unit: Arc::new(Unit {
                id: Uuid::new_v4(),
                descriptor,
                flags,
                client,
                started: AtomicBool::new(false),
                latch: CompletionLatch::new(),
            }),
        };
        if flags.start_now {
            communication.start();
            debug_assert!(!flags.is_blocking() || communication.is_finished());
        }
        communication
    }

    /// Issues the request.
    ///
    /// With `sleep_until_finished` the call runs here and returns once the
    /// result is available; otherwise it is queued on the worker pool.
    /// Returns false (and does nothing) if the unit was already started.
    pub fn start(&self) -> bool {
        if self.unit.started.swap(true, Ordering::SeqCst) {
            log::debug!("[{}] start() called on a started communication", self.unit.id);
            return false;
        }

        log::debug!(
            "[{}] starting {:?} ({})",
            self.unit.id,
            self.unit.descriptor.kind(),
            if self.unit.flags.sleep_until_finished {
                "blocking"
            } else {
                "background"
            }
        );

        if self.unit.flags.sleep_until_finished {
            self.unit.run();
        } else {
            let job: Arc<dyn Dispatchable> = Arc::clone(&self.unit) as Arc<dyn Dispatchable>;
            self.unit.client.dispatcher().submit(job);
        }
        true
    }

    /// Blocks until the result is available.
    ///
    /// Never returns for a unit that is not started; use
    /// [`result_timeout`](Self::result_timeout) when that is possible.
    pub fn result(&self) -> CommunicationResult {
        self.unit.latch.wait()
    }

    /// Waits at most `timeout` for the result.
    pub fn result_timeout(&self, timeout: Duration) -> Option<CommunicationResult> {
        self.unit.latch.wait_timeout(timeout)
    }

    /// The result if already available, without waiting.
    pub fn try_result(&self) -> Option<CommunicationResult> {
        self.result_timeout(Duration::ZERO)
    }

    /// Whether [`start`](Self::start) has run.
    pub fn is_started(&self) -> bool {
        self.unit.started.load(Ordering::SeqCst)
    }

    /// Whether the result has been published.
    pub fn is_finished(&self) -> bool {
        self.unit.latch.is_complete()
    }

    /// The request this unit sends.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.unit.descriptor
    }

    /// Execution flags the unit was built with.
    pub fn flags(&self) -> ExecutionFlags {
        self.unit.flags
    }

    /// Identifier used in log lines for this unit.
    pub fn id(&self) -> Uuid {
        self.unit.id
    }
}

/// Performs one HTTP round trip and decodes it. Never fails: every problem
/// becomes a status.
fn perform(client: &ApiClient, descriptor: &RequestDescriptor, id: Uuid) -> CommunicationResult {
    if !descriptor.is_set() {
        log::warn!("[{id}] communication built without an operation, not sending");
        return CommunicationResult::status_only(HtmlCode::CustomDefaultError);
    }

    if descriptor.kind().requires_auth() && descriptor.get("token").is_some_and(str::is_empty) {
        log::debug!("[{id}] {:?} sent without a session token", descriptor.kind());
    }

    let url = client.url_for(descriptor.path());
    let request = match descriptor.verb() {
        HttpVerb::Get => client.http().get(&url).query(descriptor.payload()),
        HttpVerb::Post => client.http().post(&url).form(descriptor.payload()),
    };

    let response = match request.send() {
        Ok(response) => response,
        Err(e) => {
            // Refused, DNS, timeout: all reported as the client-side timeout
            log::warn!("[{id}] {} {url} failed: {e}", descriptor.verb());
            return CommunicationResult::status_only(HtmlCode::CustomTimeout);
        }
    };

    let status = HtmlCode::from(response.status());
    log::debug!("[{id}] {} {url} -> {}", descriptor.verb(), response.status());
    if !status.is_ok() {
        return CommunicationResult::status_only(status);
    }

    let body = match response.text() {
        Ok(body) => body,
        Err(e) => {
            log::warn!("[{id}] failed to read response body: {e}");
            let status = if e.is_timeout() {
                HtmlCode::CustomTimeout
            } else {
                HtmlCode::CustomDefaultError
            };
            return CommunicationResult::status_only(status);
        }
    };

    match decode_body(descriptor.kind(), &body) {
        Ok(Decoded::Data(data)) => CommunicationResult { status, data },
        Ok(Decoded::Tokens(tokens)) => CommunicationResult {
            status,
            data: ResponseData::Tokens(client.session().store(tokens)),
        },
        Err(e) => {
            log::warn!("[{id}] {:?} response not decodable: {e:#}", descriptor.kind());
            CommunicationResult::status_only(HtmlCode::CustomDefaultError)
        }
    }
}
