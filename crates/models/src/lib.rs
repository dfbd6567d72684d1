pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod amc_free_category;
pub mod address;
pub mod product_category;
pub mod product;
pub mod product_image;
pub mod product_specification;
pub mod order;
pub mod order_item;
pub mod service_category;
pub mod service_issue;
pub mod service_request;
pub mod technician_rating;
pub mod job_sheet;
pub mod job_sheet_material;

pub use job_sheet::ApprovalStatus;
pub use order::OrderStatus;
pub use service_request::ServiceStatus;
pub use user::UserRole;

#[cfg(test)]
mod tests;
