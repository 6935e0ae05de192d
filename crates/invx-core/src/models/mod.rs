//! Data models.

pub mod block;
pub mod config;
pub mod invoice;
