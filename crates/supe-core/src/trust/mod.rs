//! Integrity and authenticity checks for externally supplied preset packs

pub mod hasher;
pub mod signature;

pub use hasher::{digests_match, hash_file, sha256_hex, verify_sha256};
pub use signature::{SignatureOptions, SignatureProvider, VerifiedInfo};
