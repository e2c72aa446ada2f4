pub mod request_id;
pub mod session;

pub use request_id::{RequestId, RequestIdExt, RequestIdMiddleware};
pub use session::{AuthContextExt, SessionMiddleware};
