//! Request dispatcher. Validates an envelope, routes it to its handler and
//! maps the outcome to a response, or to nothing for notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::batch;
use crate::codec::{self, Frame};
use crate::envelope::{Reply, Request, Response, JSONRPC_VERSION};
use crate::error::ErrorObject;
use crate::handler::{CallContext, Params};
use crate::registry::MethodRegistry;

/// Check the envelope members the dispatcher owns. First failure wins.
pub fn validate_request(request: &Request) -> Result<(), ErrorObject> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(ErrorObject::invalid_request(format!(
            "jsonrpc field must be \"{JSONRPC_VERSION}\""
        )));
    }

    if request.method.is_empty() {
        return Err(ErrorObject::invalid_request("method is required"));
    }

    Ok(())
}

/// Stateless dispatcher over a shared, read-only registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Dispatch one decoded envelope. Returns `None` for notifications,
    /// whatever the handler produced.
    pub fn dispatch(&self, request: &Request) -> Option<Response> {
        let outcome = self.evaluate(request);

        let Some(id) = &request.id else {
            tracing::debug!(
                method = %request.method,
                ok = outcome.is_ok(),
                "notification handled, response suppressed"
            );
            return None;
        };

        let response = match outcome {
            Ok(result) => {
                tracing::debug!(method = %request.method, %id, "request handled");
                Response::success(id.clone(), result)
            }
            Err(error) => {
                tracing::debug!(method = %request.method, %id, code = error.code, "request failed");
                Response::error(id.clone(), error)
            }
        };
        Some(response)
    }

    fn evaluate(&self, request: &Request) -> Result<Value, ErrorObject> {
        validate_request(request)?;

        let handler = self
            .registry
            .lookup(&request.method)
            .ok_or_else(ErrorObject::method_not_found)?;

        let ctx = CallContext {
            method: &request.method,
            id: request.id.as_ref(),
        };
        let params = Params::new(request.params.as_deref());

        match catch_unwind(AssertUnwindSafe(|| handler.call(&ctx, params))) {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(method = %request.method, "handler panicked");
                Err(ErrorObject::internal_error())
            }
        }
    }

    /// Decode and dispatch a whole inbound payload, single or batch.
    pub fn handle(&self, payload: &[u8]) -> Reply {
        match codec::split(payload) {
            Err(rejection) => Reply::Rejected(rejection),
            Ok(frame) => self.handle_frame(frame),
        }
    }

    /// Dispatch an already classified payload.
    pub fn handle_frame(&self, frame: Frame<'_>) -> Reply {
        match frame {
            Frame::Single(text) => match codec::decode_request(text) {
                Err(rejection) => Reply::Rejected(rejection),
                Ok(request) => self
                    .dispatch(&request)
                    .map_or(Reply::NoContent, Reply::Single),
            },
            Frame::Batch(elements) => {
                batch::execute(self, &elements).map_or(Reply::NoContent, Reply::Batch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerResult;
    use crate::id::RequestId;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counted(_ctx: &CallContext<'_>, _params: Params<'_>) -> HandlerResult {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Ok(json!("ok"))
    }

    fn explode(_ctx: &CallContext<'_>, _params: Params<'_>) -> HandlerResult {
        panic!("boom")
    }

    fn echo_id(ctx: &CallContext<'_>, _params: Params<'_>) -> HandlerResult {
        Ok(json!(ctx.id.map(|id| id.to_string())))
    }

    fn dispatcher() -> Dispatcher {
        let registry = MethodRegistry::builder()
            .register("counted", counted)
            .unwrap()
            .register("explode", explode)
            .unwrap()
            .register("echo_id", echo_id)
            .unwrap()
            .build();
        Dispatcher::new(Arc::new(registry))
    }

    fn request(text: &str) -> Request {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_version_checked_first() {
        let resp = dispatcher()
            .dispatch(&request(r#"{"jsonrpc":"1.0","method":"","id":1}"#))
            .unwrap();
        let err = resp.error_object().unwrap();
        assert_eq!(err.code, -32600);
        assert_eq!(err.message, "jsonrpc field must be \"2.0\"");
    }

    #[test]
    fn test_missing_method() {
        let resp = dispatcher()
            .dispatch(&request(r#"{"jsonrpc":"2.0","id":"a"}"#))
            .unwrap();
        assert_eq!(resp.error_object().unwrap().message, "method is required");
        assert_eq!(resp.id, RequestId::String("a".into()));
    }

    #[test]
    fn test_notification_still_runs_handler() {
        let before = CALLS.load(Ordering::SeqCst);
        let resp = dispatcher().dispatch(&request(r#"{"jsonrpc":"2.0","method":"counted"}"#));
        assert!(resp.is_none());
        assert!(CALLS.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn test_notification_errors_suppressed() {
        let d = dispatcher();
        assert!(d.dispatch(&request(r#"{"jsonrpc":"2.0","method":"nope"}"#)).is_none());
        assert!(d.dispatch(&request(r#"{"jsonrpc":"1.0","method":"counted"}"#)).is_none());
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let resp = dispatcher()
            .dispatch(&request(r#"{"jsonrpc":"2.0","method":"explode","id":4}"#))
            .unwrap();
        assert_eq!(resp.error_object().unwrap().code, -32603);
        assert_eq!(resp.id, RequestId::Number(4));
    }

    #[test]
    fn test_handler_sees_context() {
        let resp = dispatcher()
            .dispatch(&request(r#"{"jsonrpc":"2.0","method":"echo_id","id":"req-7"}"#))
            .unwrap();
        assert_eq!(resp.result(), Some(&json!("req-7")));
    }

    #[test]
    fn test_explicit_null_id_gets_response() {
        let resp = dispatcher()
            .dispatch(&request(r#"{"jsonrpc":"2.0","method":"counted","id":null}"#))
            .unwrap();
        assert_eq!(resp.id, RequestId::Null);
        assert_eq!(resp.result(), Some(&json!("ok")));
    }

    #[test]
    fn test_handle_rejects_garbage() {
        match dispatcher().handle(b"not json") {
            Reply::Rejected(resp) => assert_eq!(resp.error_object().unwrap().code, -32700),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_single_notification_is_no_content() {
        let reply = dispatcher().handle(br#"{"jsonrpc":"2.0","method":"counted"}"#);
        assert!(reply.is_no_content());
    }
}
