mod middleware;
mod public;
mod session;

pub use middleware::METRIC_HTTP_REQUEST_MS;
pub use public::{HttpState, build_router};
pub use session::{SESSION_COOKIE, VisitorSession};
