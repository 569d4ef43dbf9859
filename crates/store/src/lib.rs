//! Object-storage facade for Glint media uploads.
//!
//! This crate owns the bucket that hosts binary assets (post images)
//! referenced by the Glint social backend. It covers the full lifecycle:
//!
//! - `upload` - write a file and get back its public URL
//! - `delete` - remove a previously uploaded object by key
//! - `ensure_bucket` - provision the bucket with a public-read policy
//!   before any write
//!
//! HTTP wiring, request validation, and process bootstrap belong to the
//! embedding service; this crate exposes only the storage component and
//! its configuration.

mod client;
mod config;
mod error;
mod service;

pub use client::{ClientError, S3StorageClient, StorageClient};
pub use config::StoreConfig;
pub use error::StoreError;
pub use service::{ObjectStore, UploadRequest, UploadedObject};
