//! The four session-carrying filters.
//!
//! Every filter is a no-op when its trigger condition is not met: no designated
//! header, no XML content type, no session captured yet.

use {
    crate::{
        hooks::TransactionHook,
        logging,
        normalize::normalize_xml_body,
        session::HookContext,
        transaction::{Transaction, COOKIE, SET_COOKIE},
    },
};

/// Stores the `set-cookie` value of the real response in the session.
///
/// Registered as an `after` hook for the designated initialize transaction.
/// A response without `set-cookie` leaves the previously captured value alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCapture;

impl TransactionHook for SessionCapture {
    fn run(&self, transaction: &mut Transaction, context: &mut HookContext) {
        let Some(real) = transaction.real() else {
            logging::log_capture_skipped(transaction.name(), "no real response");
            return;
        };
        match real.headers.get(SET_COOKIE) {
            Some(cookie) => {
                logging::log_session_captured(&context.connection_id, transaction.name(), cookie);
                context.session.capture(cookie.clone());
            }
            None => logging::log_capture_skipped(transaction.name(), "no set-cookie header"),
        }
    }
}

/// Sets the `Cookie` request header to the captured session value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionInjection;

impl TransactionHook for SessionInjection {
    fn run(&self, transaction: &mut Transaction, context: &mut HookContext) {
        if let Some(cookie) = context.session.cookie() {
            transaction.request.headers.insert(COOKIE, cookie.clone());
            logging::log_cookie_injected(transaction.name());
        }
    }
}

/// Strips whitespace from the fixture body of XML responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectedBodyNormalizer;

impl TransactionHook for ExpectedBodyNormalizer {
    fn run(&self, transaction: &mut Transaction, _context: &mut HookContext) {
        if let Some(expected) = transaction.expected_mut() {
            if normalize_xml_body(&expected.headers, &mut expected.body) {
                logging::log_body_normalized(transaction.name(), "expected");
            }
        }
    }
}

/// Strips whitespace from the received body of XML responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealBodyNormalizer;

impl TransactionHook for RealBodyNormalizer {
    fn run(&self, transaction: &mut Transaction, _context: &mut HookContext) {
        if let Some(real) = transaction.real_mut() {
            if normalize_xml_body(&real.headers, &mut real.body) {
                logging::log_body_normalized(transaction.name(), "real");
            }
        }
    }
}
