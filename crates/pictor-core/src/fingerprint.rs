//! Content fingerprints for cache staleness checks.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 digest of a payload's content.
///
/// Equality of fingerprints is the cache-validity criterion: a stored
/// rendezvous result is reusable only while the current input hashes
/// to the same digest. Collision resistance well beyond what pixel
/// change detection needs, but the hash is cheap and unambiguous.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprints a byte payload.
    #[must_use]
    pub fn of(payload: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(payload).into())
    }

    /// Finalizes an incremental hasher into a fingerprint.
    #[must_use]
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Eight hex chars identify a digest in logs without flooding them.
        write!(f, "Fingerprint({:.8})", hex::encode(self.0))
    }
}
