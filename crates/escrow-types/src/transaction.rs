//! Instructions, messages and signed transactions.
//!
//! A transaction is an ordered list of instructions plus one ed25519
//! signature per required signer. The ledger executes the instructions as a
//! single all-or-nothing unit.

use std::fmt;

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, EscrowError, Keypair, Result};

/// Domain separator prefixed to every signing payload.
const SIGNING_DOMAIN: &[u8] = b"escrow:tx:v1:";

/// Transaction id: SHA-256 of the signing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    /// First four bytes in hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// One account reference inside an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    /// The key behind `address` must sign the transaction.
    pub is_signer: bool,
    /// The instruction may mutate this account.
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference.
    #[must_use]
    pub fn new(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    #[must_use]
    pub fn new_readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// A call into one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub instructions: Vec<Instruction>,
    /// Caller-chosen value that makes otherwise identical messages distinct.
    pub nonce: u64,
}

impl Message {
    #[must_use]
    pub fn new(instructions: Vec<Instruction>, nonce: u64) -> Self {
        Self {
            instructions,
            nonce,
        }
    }

    /// Every address marked as signer, in order of first appearance.
    #[must_use]
    pub fn signers(&self) -> Vec<Address> {
        let mut signers: Vec<Address> = Vec::new();
        for meta in self.instructions.iter().flat_map(|ix| ix.accounts.iter()) {
            if meta.is_signer && !signers.contains(&meta.address) {
                signers.push(meta.address);
            }
        }
        signers
    }

    /// Canonical signing payload.
    ///
    /// Format: `"escrow:tx:v1:" || nonce || count || (program_id || n_accounts || (address || signer || writable)* || data_len || data)*`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(256);
        payload.extend_from_slice(SIGNING_DOMAIN);
        payload.extend_from_slice(&self.nonce.to_le_bytes());
        payload.extend_from_slice(&(self.instructions.len() as u64).to_le_bytes());
        for ix in &self.instructions {
            payload.extend_from_slice(ix.program_id.as_bytes());
            payload.extend_from_slice(&(ix.accounts.len() as u64).to_le_bytes());
            for meta in &ix.accounts {
                payload.extend_from_slice(meta.address.as_bytes());
                payload.push(u8::from(meta.is_signer));
                payload.push(u8::from(meta.is_writable));
            }
            payload.extend_from_slice(&(ix.data.len() as u64).to_le_bytes());
            payload.extend_from_slice(&ix.data);
        }
        payload
    }
}

/// A message plus the signatures that authorize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub message: Message,
    pub signatures: Vec<(Address, Signature)>,
}

impl Transaction {
    /// Sign `message` with every keypair in `signers`.
    #[must_use]
    pub fn new_signed(message: Message, signers: &[&Keypair]) -> Self {
        let payload = message.signing_payload();
        let signatures = signers
            .iter()
            .map(|kp| (kp.address(), kp.sign(&payload)))
            .collect();
        Self {
            message,
            signatures,
        }
    }

    /// Build, sign and wrap a list of instructions in one step.
    #[must_use]
    pub fn from_instructions(instructions: Vec<Instruction>, nonce: u64, signers: &[&Keypair]) -> Self {
        Self::new_signed(Message::new(instructions, nonce), signers)
    }

    /// Check that every required signer produced a valid signature.
    ///
    /// # Errors
    /// - `MissingRequiredSignature` if a signer account has no signature
    /// - `SignatureInvalid` if a signature does not verify
    pub fn verify_signatures(&self) -> Result<()> {
        let payload = self.message.signing_payload();
        for signer in self.message.signers() {
            let (_, signature) = self
                .signatures
                .iter()
                .find(|(addr, _)| *addr == signer)
                .ok_or(EscrowError::MissingRequiredSignature(signer))?;
            if !signer.verify(&payload, signature) {
                return Err(EscrowError::SignatureInvalid(signer));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> TxId {
        TxId(Sha256::digest(self.message.signing_payload()).into())
    }

    /// Hex form of [`Self::id`] for logs and errors.
    #[must_use]
    pub fn id_hex(&self) -> String {
        self.id().to_string()
    }
}
