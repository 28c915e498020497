//! Constraint validation.
//!
//! Every handler states its account requirements as a list of
//! [`Constraint`]s and runs them through [`validate`] before touching any
//! state. Constraints are checked in order and the first failure aborts the
//! instruction.
//!
//! For take and refund the order is fixed:
//!
//! ```text
//! load record → signer → has-one maker → has-one mints → seeds → vault holding
//! ```

use escrow_ledger::InvokeContext;
use escrow_types::{
    Address, EscrowError, EscrowRecord, Result,
    derivation::{escrow_address_with_bump, holding_address},
};

/// One account requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The address signed the transaction.
    Signer(Address),
    /// A stored record field equals the supplied account.
    HasOne {
        field: &'static str,
        stored: Address,
        supplied: Address,
    },
    /// `(maker, seed, bump)` re-derives the supplied record address.
    Seeds {
        maker: Address,
        seed: u64,
        bump: u8,
        supplied: Address,
    },
    /// The supplied account is the canonical holding account of
    /// `(owner, mint)`, and holds `mint` for `owner` if it exists.
    Holding {
        supplied: Address,
        owner: Address,
        mint: Address,
    },
    /// The address is a mint.
    Mint(Address),
    /// The account is writable in this instruction.
    Writable(Address),
}

impl Constraint {
    /// Evaluate against the current context.
    pub fn check(&self, ctx: &InvokeContext<'_>) -> Result<()> {
        match self {
            Self::Signer(address) => {
                if ctx.is_signer(address) {
                    Ok(())
                } else {
                    Err(EscrowError::MissingRequiredSignature(*address))
                }
            }
            Self::HasOne {
                field,
                stored,
                supplied,
            } => {
                if stored == supplied {
                    Ok(())
                } else if *field == "maker" {
                    Err(EscrowError::MakerMismatch {
                        expected: *stored,
                        actual: *supplied,
                    })
                } else {
                    Err(EscrowError::MintMismatch {
                        field: (*field).to_string(),
                        expected: *stored,
                        actual: *supplied,
                    })
                }
            }
            Self::Seeds {
                maker,
                seed,
                bump,
                supplied,
            } => match escrow_address_with_bump(maker, *seed, *bump, &ctx.program_id()) {
                Ok(derived) if derived == *supplied => Ok(()),
                Ok(derived) => Err(EscrowError::SeedsMismatch {
                    expected: derived.to_string(),
                    actual: *supplied,
                }),
                // An on-curve candidate can never be a record address.
                Err(err) => Err(EscrowError::SeedsMismatch {
                    expected: err.to_string(),
                    actual: *supplied,
                }),
            },
            Self::Holding {
                supplied,
                owner,
                mint,
            } => {
                let (expected, _) = holding_address(owner, mint)?;
                if expected != *supplied {
                    return Err(EscrowError::HoldingAddressMismatch {
                        expected,
                        actual: *supplied,
                    });
                }
                if ctx.exists(supplied) {
                    let token = ctx.token_account(supplied)?;
                    if token.mint != *mint {
                        return Err(EscrowError::MintMismatch {
                            field: "holding".into(),
                            expected: *mint,
                            actual: token.mint,
                        });
                    }
                    if token.owner != *owner {
                        return Err(EscrowError::TokenOwnerMismatch {
                            account: *supplied,
                            expected: *owner,
                            actual: token.owner,
                        });
                    }
                }
                Ok(())
            }
            Self::Mint(address) => ctx.mint(address).map(|_| ()),
            Self::Writable(address) => {
                if ctx.is_writable(address) {
                    Ok(())
                } else {
                    Err(EscrowError::AccountNotWritable(*address))
                }
            }
        }
    }
}

/// Check every constraint in order, stopping at the first failure.
pub fn validate(ctx: &InvokeContext<'_>, constraints: &[Constraint]) -> Result<()> {
    for constraint in constraints {
        if let Err(err) = constraint.check(ctx) {
            tracing::warn!(constraint = ?constraint, error = %err, "constraint violated");
            return Err(err);
        }
    }
    Ok(())
}

/// Load the escrow record at `address`.
///
/// # Errors
/// - `AccountNotFound` if nothing lives there (never created, or closed)
/// - `InvalidAccountOwner` if the account belongs to another program
/// - `InvalidAccountData` if the bytes are not an escrow record
pub fn load_record(ctx: &InvokeContext<'_>, address: &Address) -> Result<EscrowRecord> {
    let data = ctx.program_data(address)?;
    EscrowRecord::unpack(address, data)
}
