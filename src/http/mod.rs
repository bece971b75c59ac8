//! HTTP surface: routes and error mapping

pub mod routes;

pub use routes::build_router;
