//! Domain event publication for the experimentation management service
//!
//! After a project settings, experiment or segmenter change commits, the
//! management service hands the new snapshot to a [`messagequeue::MessageQueueService`],
//! which encodes it as a protobuf envelope and publishes it for the treatment
//! service to consume.

pub mod config;
pub mod error;
pub mod messagequeue;
pub mod models;
pub mod proto;

pub use error::{AppError, Result};
