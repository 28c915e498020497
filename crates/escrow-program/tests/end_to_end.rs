//! End-to-end escrow lifecycles.
//!
//! Each test drives signed transactions through the ledger the way a client
//! would: make an offer, then either take it or refund it, and checks token
//! balances, storage deposits, receipts and supply conservation afterwards.

mod common;

use common::{Harness, MAKER_A, Party, TAKER_B, ata};
use escrow_program::{ID, escrow_state, fetch_escrow, instruction, open_escrows};
use escrow_types::{EscrowRecord, EscrowState, TokenAccount, TxReceipt};
use rust_decimal::Decimal;

const DEPOSIT: u64 = 10_000_000;
const RECEIVE: u64 = 5_000_000;

#[test]
fn make_then_refund_restores_maker() {
    let mut h = Harness::new();
    let lamports_before = h.ledger.lamports(&h.maker.address());

    h.make(1, DEPOSIT, RECEIVE).expect("make should succeed");
    assert_eq!(h.balance(&h.maker_ata_a()), MAKER_A - DEPOSIT);
    assert_eq!(h.balance(&h.vault(1)), DEPOSIT, "vault holds the deposit");

    let record_rent = h.ledger.rent().minimum_balance(EscrowRecord::LEN);
    let vault_rent = h.ledger.rent().minimum_balance(TokenAccount::LEN);
    assert_eq!(
        h.ledger.lamports(&h.maker.address()),
        lamports_before - record_rent - vault_rent,
        "maker pays both storage deposits"
    );

    let receipt = h.refund(1).expect("refund should succeed");
    assert_eq!(h.balance(&h.maker_ata_a()), MAKER_A, "deposit returned in full");
    assert_eq!(
        h.ledger.lamports(&h.maker.address()),
        lamports_before,
        "storage deposits returned to maker"
    );
    assert!(receipt.closed_account(&h.escrow(1)));
    assert!(receipt.closed_account(&h.vault(1)));
    assert!(!h.ledger.exists(&h.escrow(1)));
    assert!(!h.ledger.exists(&h.vault(1)));
    assert_eq!(escrow_state(&h.ledger, &h.escrow(1)), Some(EscrowState::Closed));
    h.ledger.verify_supply().unwrap();
}

#[test]
fn make_then_take_swaps_balances() {
    let mut h = Harness::new();
    let maker_lamports = h.ledger.lamports(&h.maker.address());
    let taker_lamports = h.ledger.lamports(&h.taker.address());

    h.make(7, DEPOSIT, RECEIVE).unwrap();
    assert!(!h.ledger.exists(&h.taker_ata_a()));
    assert!(!h.ledger.exists(&h.maker_ata_b()));

    let receipt = h.take(7).expect("take should succeed");

    assert_eq!(h.balance(&h.maker_ata_a()), MAKER_A - DEPOSIT);
    assert_eq!(h.balance(&h.maker_ata_b()), RECEIVE, "maker received mint B");
    assert_eq!(h.balance(&h.taker_ata_a()), DEPOSIT, "taker received the vault");
    assert_eq!(h.balance(&h.taker_ata_b()), TAKER_B - RECEIVE);

    assert!(receipt.created_account(&h.taker_ata_a()));
    assert!(receipt.created_account(&h.maker_ata_b()));
    assert!(receipt.closed_account(&h.escrow(7)));
    assert!(receipt.closed_account(&h.vault(7)));

    let holding_rent = h.ledger.rent().minimum_balance(TokenAccount::LEN);
    assert_eq!(holding_rent, 2_039_280);
    assert_eq!(
        h.ledger.lamports(&h.maker.address()),
        maker_lamports,
        "record and vault deposits go back to the maker"
    );
    assert_eq!(
        h.ledger.lamports(&h.taker.address()),
        taker_lamports - 2 * holding_rent,
        "taker pays for the holding accounts it needed"
    );
    h.ledger.verify_supply().unwrap();
}

#[test]
fn take_reuses_existing_holding_accounts() {
    let mut h = Harness::new();
    let taker_ata_a = h
        .ledger
        .create_holding_account(&h.taker.address(), &h.mint_a)
        .unwrap();
    let maker_ata_b = h
        .ledger
        .create_holding_account(&h.maker.address(), &h.mint_b)
        .unwrap();
    let taker_lamports = h.ledger.lamports(&h.taker.address());

    h.make(1, DEPOSIT, RECEIVE).unwrap();
    let receipt = h.take(1).unwrap();

    assert!(receipt.created.is_empty(), "nothing new to allocate");
    assert_eq!(h.ledger.lamports(&h.taker.address()), taker_lamports);
    assert_eq!(h.balance(&taker_ata_a), DEPOSIT);
    assert_eq!(h.balance(&maker_ata_b), RECEIVE);
}

#[test]
fn same_mint_swap() {
    let mut h = Harness::new();
    let mint = h.mint_a;
    let taker_ata = h.ledger.create_holding_account(&h.taker.address(), &mint).unwrap();
    h.ledger.mint_to(&mint, &taker_ata, TAKER_B).unwrap();
    let maker_ata = h.maker_ata_a();

    let make = instruction::make(&ID, &h.maker.address(), &mint, &mint, 3, DEPOSIT, RECEIVE).unwrap();
    h.submit(vec![make], &[Party::Maker]).unwrap();
    let take = instruction::take(&ID, &h.maker.address(), &h.taker.address(), &mint, &mint, 3).unwrap();
    h.submit(vec![take], &[Party::Taker]).unwrap();

    assert_eq!(h.balance(&maker_ata), MAKER_A - DEPOSIT + RECEIVE);
    assert_eq!(h.balance(&taker_ata), TAKER_B - RECEIVE + DEPOSIT);
    h.ledger.verify_supply().unwrap();
}

#[test]
fn same_mint_refund_restores_maker() {
    let mut h = Harness::new();
    let mint = h.mint_a;
    let maker_ata = h.maker_ata_a();
    let lamports = h.ledger.lamports(&h.maker.address());

    let make = instruction::make(&ID, &h.maker.address(), &mint, &mint, 3, DEPOSIT, RECEIVE).unwrap();
    h.submit(vec![make], &[Party::Maker]).unwrap();
    assert_eq!(h.balance(&maker_ata), MAKER_A - DEPOSIT);

    let refund = instruction::refund(&ID, &h.maker.address(), &mint, &mint, 3).unwrap();
    h.submit(vec![refund], &[Party::Maker]).unwrap();

    assert_eq!(h.balance(&maker_ata), MAKER_A);
    assert_eq!(h.ledger.lamports(&h.maker.address()), lamports);
    assert_eq!(escrow_state(&h.ledger, &h.escrow(3)), Some(EscrowState::Closed));
    h.ledger.verify_supply().unwrap();
}

#[test]
fn free_offer_needs_no_payment() {
    let mut h = Harness::new();
    let taker_b = h.balance(&h.taker_ata_b());

    h.make(4, DEPOSIT, 0).expect("an offer asking nothing is well-formed");
    assert_eq!(fetch_escrow(&h.ledger, &h.escrow(4)).unwrap().receive, 0);
    h.take(4).unwrap();

    assert_eq!(h.balance(&h.taker_ata_a()), DEPOSIT);
    assert_eq!(h.balance(&h.taker_ata_b()), taker_b);
    assert_eq!(h.balance(&h.maker_ata_b()), 0);
    h.ledger.verify_supply().unwrap();
}

#[test]
fn seeds_give_independent_escrows() {
    let mut h = Harness::new();
    h.make(1, DEPOSIT, RECEIVE).unwrap();
    h.make(2, 2 * DEPOSIT, RECEIVE).unwrap();
    assert_ne!(h.escrow(1), h.escrow(2));
    assert_ne!(h.vault(1), h.vault(2));
    assert_eq!(open_escrows(&h.ledger).len(), 2);

    h.take(2).unwrap();
    assert_eq!(escrow_state(&h.ledger, &h.escrow(1)), Some(EscrowState::Active));
    assert_eq!(escrow_state(&h.ledger, &h.escrow(2)), Some(EscrowState::Closed));
    assert_eq!(h.balance(&h.vault(1)), DEPOSIT, "other escrow untouched");

    h.refund(1).unwrap();
    assert!(open_escrows(&h.ledger).is_empty());
    assert_eq!(h.balance(&h.maker_ata_a()), MAKER_A - 2 * DEPOSIT);
    assert_eq!(h.balance(&h.taker_ata_a()), 2 * DEPOSIT);
}

#[test]
fn record_stores_offer_terms() {
    let mut h = Harness::new();
    h.make(42, DEPOSIT, RECEIVE).unwrap();

    let record = fetch_escrow(&h.ledger, &h.escrow(42)).unwrap();
    assert_eq!(record.seed, 42);
    assert_eq!(record.maker, h.maker.address());
    assert_eq!(record.mint_a, h.mint_a);
    assert_eq!(record.mint_b, h.mint_b);
    assert_eq!(record.receive, RECEIVE);

    let vault = h.ledger.token_account(&h.vault(42)).unwrap();
    assert_eq!(vault.owner, h.escrow(42), "vault is controlled by the record address");
    assert_eq!(vault.mint, h.mint_a);
    assert_eq!(h.vault(42), ata(&h.escrow(42), &h.mint_a));
}

#[test]
fn receipts_record_each_step() {
    let mut h = Harness::new();
    let version = h.ledger.version();

    let made = h.make(5, DEPOSIT, RECEIVE).unwrap();
    let taken = h.take(5).unwrap();

    assert_eq!(made.version, version + 1);
    assert_eq!(taken.version, version + 2);
    assert_eq!(h.ledger.receipts().len(), 2);
    assert!(made.logs.iter().any(|l| l.starts_with("Instruction: Make seed=5")));
    assert!(taken.logs.iter().any(|l| l.starts_with("Instruction: Take seed=5")));
    assert!(made.created_account(&h.escrow(5)));
    assert!(made.touched.contains(&h.maker_ata_a()));
    assert_eq!(h.ledger.closed_at(&h.escrow(5)), Some(taken.version));

    let json = serde_json::to_string(&taken).unwrap();
    let back: TxReceipt = serde_json::from_str(&json).unwrap();
    assert_eq!(back, taken);
}

#[test]
fn ui_amounts_follow_mint_decimals() {
    let mut h = Harness::new();
    h.make(1, DEPOSIT, RECEIVE).unwrap();

    let mint_a = h.ledger.mint(&h.mint_a).unwrap();
    let mint_b = h.ledger.mint(&h.mint_b).unwrap();
    assert_eq!(mint_a.ui_amount(h.balance(&h.vault(1))), Decimal::new(10, 0));
    assert_eq!(mint_b.ui_amount(RECEIVE), Decimal::new(5, 0));
    assert_eq!(mint_a.ui_amount(1), Decimal::new(1, 6));
}

#[test]
fn supply_conserved_across_many_swaps() {
    let mut h = Harness::new();
    for seed in 0..5u64 {
        h.make(seed, 1_000_000 + seed, 500_000).unwrap();
        h.ledger.verify_supply().unwrap();
    }
    for seed in 0..5u64 {
        if seed % 2 == 0 {
            h.take(seed).unwrap();
        } else {
            h.refund(seed).unwrap();
        }
        h.ledger.verify_supply().unwrap();
    }
    assert!(open_escrows(&h.ledger).is_empty());
    assert_eq!(h.balance(&h.maker_ata_b()), 3 * 500_000);
    assert_eq!(
        h.balance(&h.taker_ata_a()),
        1_000_000 + 1_000_002 + 1_000_004
    );
    assert_eq!(
        h.balance(&h.maker_ata_a()) + h.balance(&h.taker_ata_a()),
        MAKER_A,
        "mint A never leaves the two parties"
    );
}
