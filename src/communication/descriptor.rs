//! The immutable description of one API call.

use std::collections::BTreeMap;

use super::kind::{CommunicationType, HttpVerb};

/// Operation, path and payload of a single request.
///
/// Produced by [`CommunicationBuilder::build`](super::CommunicationBuilder::build)
/// as an owned copy, so reusing the builder afterwards cannot alter it.
/// The payload is a `BTreeMap` so the wire encoding is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDescriptor {
    kind: CommunicationType,
    path: &'static str,
    payload: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub(crate) fn new(kind: CommunicationType, payload: BTreeMap<String, String>) -> Self {
        Self {
            kind,
            path: kind.path(),
            payload,
        }
    }

    /// Selected operation.
    pub fn kind(&self) -> CommunicationType {
        self.kind
    }

    /// Path relative to the server base URL.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// HTTP verb of the operation.
    pub fn verb(&self) -> HttpVerb {
        self.kind.verb()
    }

    /// Request fields in key order.
    pub fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    /// One payload field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// False for the unset sentinel.
    pub fn is_set(&self) -> bool {
        self.kind != CommunicationType::Default
    }
}

/// When and how a built communication runs.
///
/// All false by default: the unit stays inert until started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionFlags {
    /// Start as soon as the unit is built.
    pub start_now: bool,
    /// Run on the caller thread when started and return once done.
    pub sleep_until_finished: bool,
    /// Keep running through dispatcher shutdown instead of being dropped
    /// from the queue.
    pub keep_alive: bool,
}

impl ExecutionFlags {
    /// Whether `build()` itself performs the call before returning.
    pub fn is_blocking(self) -> bool {
        self.start_now && self.sleep_until_finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptor_is_unset() {
        let descriptor = RequestDescriptor::default();
        assert!(!descriptor.is_set());
        assert_eq!(descriptor.path(), "");
        assert!(descriptor.payload().is_empty());
    }

    #[test]
    fn test_path_follows_kind() {
        let mut payload = BTreeMap::new();
        payload.insert("token".to_string(), "abc".to_string());
        let descriptor = RequestDescriptor::new(CommunicationType::ListProjects, payload);
        assert!(descriptor.is_set());
        assert_eq!(descriptor.path(), "project/list");
        assert_eq!(descriptor.verb(), HttpVerb::Get);
        assert_eq!(descriptor.get("token"), Some("abc"));
        assert_eq!(descriptor.get("missing"), None);
    }

    #[test]
    fn test_default_flags_are_inert() {
        let flags = ExecutionFlags::default();
        assert!(!flags.start_now);
        assert!(!flags.sleep_until_finished);
        assert!(!flags.keep_alive);
        assert!(!flags.is_blocking());

        // sleep_until_finished alone does not make a unit blocking
        let flags = ExecutionFlags {
            sleep_until_finished: true,
            ..ExecutionFlags::default()
        };
        assert!(!flags.is_blocking());
    }
}
