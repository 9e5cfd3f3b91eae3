//! Client side of the dashboard's REST surface.

pub mod batch;
pub mod client;
pub mod error;
pub mod params;
pub mod types;

pub use batch::{delete_sequential, BatchDeleteError};
pub use client::ResourceClient;
pub use error::ApiError;
pub use params::QueryParams;
