//! Massif storage for merklelog.
//!
//! A log is stored as a sequence of fixed-capacity blobs ("massifs"), one
//! per `2^(height-1)` leaves. This crate provides:
//! - The massif blob format: start record, ancestor peak stack, log nodes
//! - Index math mapping MMR positions to massifs
//! - Readers for a local mirror, HTTP blob storage, and memory
//! - The signed root envelope that seals each massif
//! - A builder that produces massifs and seals from an in-memory log
//!
//! ## Quick Start
//!
//! ```rust
//! use merklelog_canonical::TenantId;
//! use merklelog_massifs::{LogOptions, MassifContext, MassifLogBuilder, MassifReader, MemoryMassifStore};
//! use p256::ecdsa::SigningKey;
//! use std::time::Duration;
//!
//! let tenant = TenantId::parse("tenant/6ea5cd00-c711-3649-6914-7b125928bbb4")?;
//! let key = SigningKey::from_slice(&[0x11; 32])?;
//!
//! let mut log = MassifLogBuilder::new(LogOptions::default())?;
//! log.append([1u8; 32], 1)?;
//! log.append([2u8; 32], 2)?;
//!
//! let store = MemoryMassifStore::new();
//! log.publish(&store, &tenant, &key, "example", 0)?;
//!
//! let blob = store.get_massif(&tenant, 0, Duration::from_secs(30))?;
//! let massif = MassifContext::from_bytes(&blob)?;
//! assert_eq!(massif.range_end(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Builds massifs and seals from an in-memory log.
pub mod builder;
/// Decoded massifs and ranges of massifs.
pub mod context;
/// Error types for massif, storage and seal operations.
pub mod errors;
/// Massif index arithmetic.
pub mod index;
/// Storage readers.
pub mod reader;
/// Signed root envelopes.
pub mod seal;
/// Massif start record.
pub mod start;

pub use builder::{LogOptions, MassifLogBuilder};
pub use context::{MassifContext, MassifRange};
pub use errors::{MassifError, SealError, StorageError};
pub use index::{
    leaves_per_massif, massif_first_index, massif_index_from_mmr_index, peak_stack_len,
    DEFAULT_MASSIF_HEIGHT,
};
pub use reader::{
    massif_path, seal_path, DirMassifReader, HttpMassifReader, MassifReader, MemoryMassifStore,
    ReaderConfig, DEFAULT_CONTAINER,
};
pub use seal::{MmrState, ProtectedHeader, SignedRootEnvelope, ALG_ES256};
pub use start::{MassifStart, LOG_VERSION_0, START_SIZE, VALUE_BYTES};
