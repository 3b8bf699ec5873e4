pub mod docs;
pub mod handlers;
pub mod routes;
pub mod types;
