//! HTTP layer of the inkpost blog platform: router, handlers, app state,
//! and the admin session table.

pub mod auth;
pub mod handlers;
pub mod routes;
pub mod state;
