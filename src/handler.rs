//! Hook Message Handler
//!
//! Turns one runner message into one reply by running the registered hooks
//! for its event against the transaction(s) it carries.

use {
    crate::{
        error::{HookError, HookResult},
        hooks::HookRegistry,
        logging,
        protocol::{HookEvent, HookPayload, RawHookMessage},
        session::HookContext,
    },
    std::{sync::Arc, time::Instant},
    tracing::{debug, error},
};

#[derive(Clone)]
pub struct HookHandler {
    registry: Arc<HookRegistry>,
}

impl HookHandler {
    pub fn new(registry: HookRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Run the hooks of `event` against `payload`.
    ///
    /// A payload whose shape does not match the event (a single transaction
    /// for `beforeAll`, a list for `beforeEach`) is left untouched.
    pub fn dispatch(&self, event: HookEvent, payload: &mut HookPayload, context: &mut HookContext) {
        let started = Instant::now();
        match (event, &mut *payload) {
            (HookEvent::BeforeAll, HookPayload::Batch(transactions)) => {
                self.registry.run_before_all(transactions, context)
            }
            (HookEvent::AfterAll, HookPayload::Batch(transactions)) => {
                self.registry.run_after_all(transactions, context)
            }
            (HookEvent::BeforeEach, HookPayload::Single(transaction)) => {
                self.registry.run_before_each(transaction, context)
            }
            (HookEvent::BeforeEachValidation, HookPayload::Single(transaction)) => {
                self.registry.run_before_each_validation(transaction, context)
            }
            (HookEvent::AfterEach, HookPayload::Single(transaction)) => {
                self.registry.run_after_each(transaction, context)
            }
            (event, _) => {
                debug!(hook_event = %event, "Payload shape does not match event, skipping hooks");
                return;
            }
        }
        logging::log_event_dispatched(event.as_str(), payload.len(), started.elapsed());
    }

    /// Handle one raw message and produce the serialized reply.
    ///
    /// Unknown events and payloads that fail to parse are echoed back
    /// unchanged so the runner never waits on a reply. Only a message that is
    /// not valid JSON at all yields an error, since it has no `uuid` to
    /// answer to.
    pub fn handle_frame(&self, frame: &[u8], context: &mut HookContext) -> HookResult<Vec<u8>> {
        logging::log_message_received(frame.len());

        let raw = RawHookMessage::from_slice(frame)?;
        let _span = logging::message_span(&raw.event, &raw.uuid).entered();

        let Some(event) = raw.event_kind() else {
            logging::log_unknown_event(&raw.event);
            return raw.echo();
        };

        match raw.parse_payload(event) {
            Ok(mut payload) => {
                self.dispatch(event, &mut payload, context);
                raw.reply(&payload)
            }
            Err(err @ HookError::InvalidPayload { .. }) => {
                error!(
                    error = %err,
                    uuid = %raw.uuid,
                    event = "invalid_payload",
                    "Echoing payload without running hooks"
                );
                raw.echo()
            }
            Err(err) => Err(err),
        }
    }
}
