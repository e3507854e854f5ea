//! Runtime adapters and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod poller;

pub use api::{handle, handle_json, ApiError, ApiRequest, ApiResponse, CompleteServiceRequest};
#[cfg(feature = "tokio-runtime")]
pub use poller::{AlertPoller, AlertSink};
