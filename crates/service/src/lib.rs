//! Business operations of the storefront and field-service desk.
//! - Free async functions over a `sea_orm` connection, one module per area.
//! - Entities and field validation live in the `models` crate.
//! - Every failure is a `ServiceError` whose message is safe to show to clients.

pub mod errors;
pub mod workflow;
pub mod auth;
pub mod users;
pub mod addresses;
pub mod catalog;
pub mod orders;
pub mod service_requests;
pub mod job_sheets;
pub mod ratings;
pub mod technician;
pub mod admin;
#[cfg(test)]
pub mod test_support;
