//! Listener double that records every callback it receives.

use std::sync::{Mutex, PoisonError};

use crate::errors::LifecycleError;
use crate::listener::{LifecycleListener, ListenerError};
use crate::phase::Phase;
use crate::properties::Properties;

/// Callbacks observed by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    LoadProperties,
    DoStart,
    Started,
    Stopping,
    DoStop,
    Stopped,
    Aborting,
    Exception { phase: Phase, message: String },
    SignalUsr2,
}

/// Listener whose responses are fixed up front.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ListenerEvent>>,
    properties: Option<Properties>,
    fail_properties: bool,
    refuse_start: bool,
    refuse_stop: bool,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(mut self, entries: &[(&str, &str)]) -> Self {
        self.properties = Some(
            entries
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        );
        self
    }

    pub fn failing_properties(mut self) -> Self {
        self.fail_properties = true;
        self
    }

    pub fn refusing_start(mut self) -> Self {
        self.refuse_start = true;
        self
    }

    pub fn refusing_stop(mut self) -> Self {
        self.refuse_stop = true;
        self
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, event: &ListenerEvent) -> usize {
        self.events().iter().filter(|seen| *seen == event).count()
    }

    pub fn exceptions(&self) -> Vec<(Phase, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ListenerEvent::Exception { phase, message } => Some((phase, message)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: ListenerEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl LifecycleListener for RecordingListener {
    fn load_properties(&self) -> Result<Option<Properties>, ListenerError> {
        self.record(ListenerEvent::LoadProperties);
        if self.fail_properties {
            return Err("property source unavailable".into());
        }
        Ok(self.properties.clone())
    }

    fn do_start(&self) -> Result<bool, ListenerError> {
        self.record(ListenerEvent::DoStart);
        Ok(!self.refuse_start)
    }

    fn do_stop(&self) -> Result<bool, ListenerError> {
        self.record(ListenerEvent::DoStop);
        Ok(!self.refuse_stop)
    }

    fn started(&self) {
        self.record(ListenerEvent::Started);
    }

    fn stopping(&self) {
        self.record(ListenerEvent::Stopping);
    }

    fn stopped(&self) {
        self.record(ListenerEvent::Stopped);
    }

    fn aborting(&self) {
        self.record(ListenerEvent::Aborting);
    }

    fn exception(&self, phase: Phase, error: &LifecycleError) {
        self.record(ListenerEvent::Exception {
            phase,
            message: error.to_string(),
        });
    }

    fn signal_usr2(&self) {
        self.record(ListenerEvent::SignalUsr2);
    }
}
