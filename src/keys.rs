//! Public key sources
//!
//! The key exchange sends the local public key verbatim. Where that key
//! comes from is up to the caller; generating key pairs and guarding the
//! private half happen outside this crate.

use std::path::PathBuf;

use crate::error::{ProcessingError, Result};

/// Supplies the local PEM-encoded public key
///
/// Called once per handshake. Implementations must not hand out the
/// private key.
pub trait PublicKeySource {
    fn public_key_pem(&self) -> Result<String>;
}

/// Reads the public key from a stored PEM file
#[derive(Debug, Clone)]
pub struct PemFileKeySource {
    path: PathBuf,
}

impl PemFileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PublicKeySource for PemFileKeySource {
    fn public_key_pem(&self) -> Result<String> {
        let pem = std::fs::read_to_string(&self.path).map_err(|e| {
            ProcessingError::KeyMaterial(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        non_empty(pem)
    }
}

/// In-memory public key
#[derive(Debug, Clone)]
pub struct StaticKeySource(String);

impl StaticKeySource {
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }
}

impl PublicKeySource for StaticKeySource {
    fn public_key_pem(&self) -> Result<String> {
        non_empty(self.0.clone())
    }
}

fn non_empty(pem: String) -> Result<String> {
    if pem.trim().is_empty() {
        return Err(ProcessingError::KeyMaterial("public key is empty".to_string()));
    }
    Ok(pem)
}
