//! Purchase module - generation jobs, delivery and their HTTP surface.
//!
//! - `models` - request, manifest and delivery types
//! - `jobs` - in-memory job board polled by clients
//! - `handlers` - purchase, status and delivery endpoints

pub mod handlers;
pub mod jobs;
pub mod models;
