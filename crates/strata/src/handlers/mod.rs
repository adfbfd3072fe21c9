pub mod error;
pub mod health;
pub mod render;
pub mod static_files;

pub use error::AppError;
