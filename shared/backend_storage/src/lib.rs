//! Backend storage services for the todo API
//!
//! This crate provides the persistence adapters used by the backend:
//! the `DynamoDB` todo table and the S3 attachments bucket.

pub mod attachment;
pub mod todo;

#[cfg(feature = "test-utils")]
pub mod memory;
