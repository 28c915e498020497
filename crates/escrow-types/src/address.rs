//! Account addresses and signing identities.
//!
//! A wallet address is the raw ed25519 public key (32 bytes). Derived
//! addresses (see [`crate::derivation`]) share the same 32-byte space but are
//! guaranteed to lie off the ed25519 curve, so no private key exists for them.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte account address.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Build an address from raw bytes. Usable in `const` context.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes in hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Whether these bytes decode to a point on the ed25519 curve.
    ///
    /// Wallet addresses are always on-curve; derived addresses never are.
    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }

    /// Verify an ed25519 signature made by the key behind this address.
    ///
    /// Returns `false` for off-curve addresses, which cannot sign.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        VerifyingKey::from_bytes(&self.0)
            .is_ok_and(|key| key.verify_strict(message, signature).is_ok())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// An ed25519 signing identity. Its public key is its [`Address`].
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Build a keypair from a 32-byte secret seed.
    #[must_use]
    pub fn from_seed(secret: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(secret),
        }
    }

    /// The address (public key) of this keypair.
    #[must_use]
    pub fn address(&self) -> Address {
        Address(self.signing.verifying_key().to_bytes())
    }

    /// Sign an arbitrary message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Random keypairs for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Keypair {
    /// A fresh keypair from a random secret.
    #[must_use]
    pub fn new_unique() -> Self {
        Self::from_seed(&rand::random::<[u8; 32]>())
    }
}
