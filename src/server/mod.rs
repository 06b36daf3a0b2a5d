//! HTTP front end: coroutine server glue around the route table.

mod http_server;
mod request;
mod response;
mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::write_response;
pub use service::AppService;
