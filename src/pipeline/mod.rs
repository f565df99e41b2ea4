//! Outbound calls to the identity service and the closed failure taxonomy
//! every caller has to handle.

mod transport;
pub use self::transport::{Endpoint, Method, Request, Response, Transport};

pub mod http;
pub use self::http::HttpTransport;

mod classify;
pub use self::classify::{classify, Failure, FailureKind, Outcome};

mod pipeline;
pub use self::pipeline::{Credentials, LoginGrant, ProtectedResource, RequestPipeline};
