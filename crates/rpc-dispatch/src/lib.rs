//! rpc-dispatch: JSON-RPC 2.0 dispatch core: envelope codec, immutable
//! method registry, id normalization, notification suppression and batch
//! isolation.

pub mod batch;
pub mod codec;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod id;
pub mod registry;

pub use codec::{decode_request, split, Frame};
pub use dispatcher::{validate_request, Dispatcher};
pub use envelope::{Outcome, Reply, Request, Response, JSONRPC_VERSION};
pub use error::{error_codes, ErrorKind, ErrorObject, RegistryError};
pub use handler::{
    null_as_default, number_value, CallContext, HandlerResult, MethodHandler, Params,
};
pub use id::RequestId;
pub use registry::{MethodRegistry, MethodRegistryBuilder};
