//! Shared fixture for the escrow integration tests.
//!
//! A [`Harness`] owns a ledger with the escrow program registered, two
//! funded parties and two 6-decimal mints. The maker starts with a mint A
//! holding account and the taker with a mint B holding account; the other
//! two holding accounts do not exist until a take creates them.

#![allow(dead_code)]

use escrow_ledger::Ledger;
use escrow_program::{EscrowProgram, ID, find_escrow_address, find_vault_address, instruction};
use escrow_types::{
    Address, Instruction, Keypair, LedgerConfig, Result, Transaction, TxReceipt,
    derivation::holding_address,
};

pub const LAMPORTS: u64 = 10_000_000_000;
pub const MAKER_A: u64 = 50_000_000;
pub const TAKER_B: u64 = 20_000_000;
pub const DECIMALS: u8 = 6;

/// Who signs a harness transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Maker,
    Taker,
}

pub struct Harness {
    pub ledger: Ledger,
    pub maker: Keypair,
    pub taker: Keypair,
    pub mint_a: Address,
    pub mint_b: Address,
    nonce: u64,
}

/// Route program logs to the test writer. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Canonical holding account of `(owner, mint)`.
pub fn ata(owner: &Address, mint: &Address) -> Address {
    holding_address(owner, mint).unwrap().0
}

impl Harness {
    pub fn new() -> Self {
        Self::with_balances(MAKER_A, TAKER_B)
    }

    pub fn with_balances(maker_a: u64, taker_b: u64) -> Self {
        init_tracing();
        let mut ledger = Ledger::new(LedgerConfig::default()).unwrap();
        ledger.register_program(Box::new(EscrowProgram)).unwrap();

        let maker = Keypair::new_unique();
        let taker = Keypair::new_unique();
        let mint_a = Keypair::new_unique().address();
        let mint_b = Keypair::new_unique().address();
        let authority = Keypair::new_unique().address();

        ledger.airdrop(&maker.address(), LAMPORTS).unwrap();
        ledger.airdrop(&taker.address(), LAMPORTS).unwrap();
        ledger.create_mint(&mint_a, &authority, DECIMALS).unwrap();
        ledger.create_mint(&mint_b, &authority, DECIMALS).unwrap();

        let maker_ata_a = ledger.create_holding_account(&maker.address(), &mint_a).unwrap();
        ledger.mint_to(&mint_a, &maker_ata_a, maker_a).unwrap();
        let taker_ata_b = ledger.create_holding_account(&taker.address(), &mint_b).unwrap();
        ledger.mint_to(&mint_b, &taker_ata_b, taker_b).unwrap();

        Self {
            ledger,
            maker,
            taker,
            mint_a,
            mint_b,
            nonce: 0,
        }
    }

    // --- addresses ---

    pub fn escrow(&self, seed: u64) -> Address {
        find_escrow_address(&self.maker.address(), seed).unwrap().0
    }

    pub fn vault(&self, seed: u64) -> Address {
        find_vault_address(&self.escrow(seed), &self.mint_a).unwrap()
    }

    pub fn maker_ata_a(&self) -> Address {
        ata(&self.maker.address(), &self.mint_a)
    }

    pub fn maker_ata_b(&self) -> Address {
        ata(&self.maker.address(), &self.mint_b)
    }

    pub fn taker_ata_a(&self) -> Address {
        ata(&self.taker.address(), &self.mint_a)
    }

    pub fn taker_ata_b(&self) -> Address {
        ata(&self.taker.address(), &self.mint_b)
    }

    pub fn balance(&self, holding: &Address) -> u64 {
        self.ledger.token_balance(holding)
    }

    // --- instructions ---

    pub fn make_ix(&self, seed: u64, deposit: u64, receive: u64) -> Instruction {
        instruction::make(
            &ID,
            &self.maker.address(),
            &self.mint_a,
            &self.mint_b,
            seed,
            deposit,
            receive,
        )
        .unwrap()
    }

    pub fn take_ix(&self, seed: u64) -> Instruction {
        instruction::take(
            &ID,
            &self.maker.address(),
            &self.taker.address(),
            &self.mint_a,
            &self.mint_b,
            seed,
        )
        .unwrap()
    }

    pub fn refund_ix(&self, seed: u64) -> Instruction {
        instruction::refund(&ID, &self.maker.address(), &self.mint_a, &self.mint_b, seed).unwrap()
    }

    // --- submission ---

    fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    /// Sign `instructions` as `parties` with a fresh nonce.
    pub fn sign(&mut self, instructions: Vec<Instruction>, parties: &[Party]) -> Transaction {
        let nonce = self.next_nonce();
        let keys: Vec<&Keypair> = parties
            .iter()
            .map(|p| match p {
                Party::Maker => &self.maker,
                Party::Taker => &self.taker,
            })
            .collect();
        Transaction::from_instructions(instructions, nonce, &keys)
    }

    pub fn submit(&mut self, instructions: Vec<Instruction>, parties: &[Party]) -> Result<TxReceipt> {
        let tx = self.sign(instructions, parties);
        self.ledger.process_transaction(&tx)
    }

    /// Submit signed by keypairs outside the harness.
    pub fn submit_with(
        &mut self,
        instructions: Vec<Instruction>,
        signers: &[&Keypair],
    ) -> Result<TxReceipt> {
        let nonce = self.next_nonce();
        let tx = Transaction::from_instructions(instructions, nonce, signers);
        self.ledger.process_transaction(&tx)
    }

    pub fn make(&mut self, seed: u64, deposit: u64, receive: u64) -> Result<TxReceipt> {
        let ix = self.make_ix(seed, deposit, receive);
        self.submit(vec![ix], &[Party::Maker])
    }

    pub fn take(&mut self, seed: u64) -> Result<TxReceipt> {
        let ix = self.take_ix(seed);
        self.submit(vec![ix], &[Party::Taker])
    }

    pub fn refund(&mut self, seed: u64) -> Result<TxReceipt> {
        let ix = self.refund_ix(seed);
        self.submit(vec![ix], &[Party::Maker])
    }
}
