pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiResult, Problem};
pub use routes::{ApiDoc, router};
