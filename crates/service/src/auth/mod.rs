//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, password login, token refresh and Google account linking live
//! here; the HTTP layer only maps inputs and errors.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod tokens;

pub use service::AuthService;
