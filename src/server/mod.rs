//! Status server.

mod internal;

pub use internal::{route, run_status_server, serve, StatusState, TOKEN_HEADER};
