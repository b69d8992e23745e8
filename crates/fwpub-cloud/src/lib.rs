//! Cloud service clients for fwpub.
//!
//! The object store and the document store are black boxes with a handful
//! of known operations. This crate wraps them behind two traits so the
//! publishing and record-keeping chains never see HTTP:
//!
//! - [`ObjectStorage`] -- buckets, uploads, public-read ACLs
//!   ([`GcsClient`], [`InMemoryObjectStorage`])
//! - [`DocumentStore`] -- merge-upserts of keyed documents
//!   ([`FirestoreClient`], [`InMemoryDocumentStore`])
//!
//! # Credentials
//!
//! [`discover_credentials`] walks an ordered list of candidate service
//! account files; the first existing file wins, otherwise ambient
//! credentials are used. [`token_provider`] turns the result into a
//! [`TokenProvider`]. Tokens are fetched lazily on first use, so a missing
//! or broken credential surfaces as a failed request, not a failed
//! constructor.
//!
//! # Design Rules
//!
//! 1. Documents are only ever written with merge semantics: fields not in
//!    the update are preserved.
//! 2. Clients never retry; the caller's fallback chain decides what happens
//!    next.
//! 3. Every error carries the service's own message text.

pub mod auth;
pub mod credentials;
pub mod document;
pub mod error;
pub mod firestore;
pub mod gcs;
pub mod memory;
pub mod storage;

pub use auth::{
    token_provider, AmbientTokenProvider, ServiceAccountTokenProvider, StaticToken, TokenProvider,
    CLOUD_PLATFORM_SCOPE,
};
pub use credentials::{discover_credentials, CredentialSource, ServiceAccountKey};
pub use document::{Document, DocumentStore};
pub use error::{CloudError, CloudResult};
pub use firestore::{FirestoreClient, FirestoreConfig};
pub use gcs::{GcsClient, GcsConfig};
pub use memory::{InMemoryDocumentStore, InMemoryObjectStorage, StorageOp};
pub use storage::{public_url, ObjectStorage};
