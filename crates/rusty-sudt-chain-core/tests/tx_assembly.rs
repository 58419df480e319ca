mod common;

use ckb_types::core::{Capacity, TransactionView};
use ckb_types::{packed, prelude::*};

use common::{capacity_cell, lock_script, sudt_config, udt_cell, MockChain};
use rusty_sudt_chain_core::{
    udt_amount_from_bytes, NetworkEnv, PortError, TxAssembler, CKB, DEFAULT_FEE_RATE,
    ISSUE_CELL_CAPACITY_CKB, UDT_DATA_LEN,
};

fn assembler<'a>(chain: &'a MockChain) -> TxAssembler<'a, MockChain> {
    TxAssembler::for_env(chain, NetworkEnv::Devnet, DEFAULT_FEE_RATE)
}

fn inputs_capacity(chain: &MockChain, tx: &TransactionView) -> u64 {
    tx.inputs()
        .into_iter()
        .map(|input| {
            chain
                .cell_by_out_point(&input.previous_output())
                .expect("input refers to a known mock cell")
                .capacity()
        })
        .sum()
}

fn outputs_capacity(tx: &TransactionView) -> u64 {
    tx.outputs_capacity().unwrap().as_u64()
}

fn has_cell_dep(tx: &TransactionView, dep: &packed::CellDep) -> bool {
    tx.cell_deps()
        .into_iter()
        .any(|d| d.as_slice() == dep.as_slice())
}

#[test]
fn issue_builds_owner_mode_token_cell() {
    let owner = lock_script(1);
    let mut chain = MockChain::default();
    chain.capacity_cells.push(capacity_cell(1, 500, owner.clone()));
    let sudt = sudt_config();

    let asm = assembler(&chain);
    let tx = asm.build_issue(owner.clone(), &sudt, 1_000_000).expect("issue tx");

    let issued = tx.outputs().get(0).unwrap();
    let issued_capacity: u64 = issued.capacity().unpack();
    assert_eq!(issued_capacity, ISSUE_CELL_CAPACITY_CKB * CKB);
    assert_eq!(issued.lock().as_slice(), owner.as_slice());

    let type_script = issued.type_().to_opt().expect("sUDT type script");
    assert_eq!(
        type_script.args().raw_data().as_ref(),
        owner.calc_script_hash().as_slice()
    );

    let data = tx.outputs_data().get(0).unwrap();
    assert_eq!(udt_amount_from_bytes(&data.raw_data()), Some(1_000_000));

    assert!(has_cell_dep(&tx, &sudt.cell_dep().unwrap()));
    assert!(has_cell_dep(&tx, &NetworkEnv::Devnet.sighash_cell_dep()));
    assert!(!tx.inputs().is_empty());
}

#[test]
fn issue_balances_capacity_with_exact_fee_through_change() {
    let owner = lock_script(1);
    let mut chain = MockChain::default();
    chain.capacity_cells.push(capacity_cell(1, 150, owner.clone()));
    chain.capacity_cells.push(capacity_cell(2, 400, owner.clone()));

    let asm = assembler(&chain);
    let tx = asm.build_issue(owner.clone(), &sudt_config(), 5).expect("issue tx");

    let in_cap = inputs_capacity(&chain, &tx);
    let out_cap = outputs_capacity(&tx);
    let fee = in_cap - out_cap;
    assert_eq!(fee, asm.min_fee(&tx));

    // Change goes back to the issuer as a plain cell.
    let change = tx.outputs().get(tx.outputs().len() - 1).unwrap();
    assert_eq!(change.lock().as_slice(), owner.as_slice());
    assert!(change.type_().to_opt().is_none());
}

#[test]
fn issue_without_live_capacity_fails() {
    let owner = lock_script(1);
    let chain = MockChain::default();

    let err = assembler(&chain)
        .build_issue(owner, &sudt_config(), 5)
        .expect_err("no cells to spend");
    assert!(matches!(err, PortError::InsufficientFunds(_)));
}

#[test]
fn tight_surplus_is_left_to_the_fee() {
    let owner = lock_script(1);
    let mut chain = MockChain::default();
    // Barely above the 200 CKB issue cell: not enough room for a change cell.
    chain
        .capacity_cells
        .push(capacity_cell(1, ISSUE_CELL_CAPACITY_CKB + 1, owner.clone()));

    let asm = assembler(&chain);
    let tx = asm.build_issue(owner.clone(), &sudt_config(), 5).expect("issue tx");

    assert_eq!(tx.outputs().len(), 1);
    let in_cap = inputs_capacity(&chain, &tx);
    let out_cap = outputs_capacity(&tx);
    assert!(in_cap - out_cap >= asm.min_fee(&tx));
}

#[test]
fn transfer_splits_token_change_back_to_sender() {
    let owner = lock_script(1);
    let recipient = lock_script(2);
    let sudt = sudt_config();
    let owner_args = owner.calc_script_hash();
    let udt_type = sudt.type_script(owner_args.as_slice()).unwrap();

    let mut chain = MockChain::default();
    chain
        .udt_cells
        .push(udt_cell(1, 144, owner.clone(), udt_type.clone(), 300));
    chain.capacity_cells.push(capacity_cell(2, 600, owner.clone()));

    let asm = assembler(&chain);
    let tx = asm
        .build_transfer(owner.clone(), recipient.clone(), &sudt, owner_args.as_slice(), 100)
        .expect("transfer tx");

    let to_recipient = tx.outputs().get(0).unwrap();
    assert_eq!(to_recipient.lock().as_slice(), recipient.as_slice());
    let data = tx.outputs_data().get(0).unwrap();
    assert_eq!(udt_amount_from_bytes(&data.raw_data()), Some(100));
    // Recipient cell sits at its minimal occupied capacity.
    let occupied = to_recipient
        .occupied_capacity(Capacity::bytes(UDT_DATA_LEN).unwrap())
        .unwrap()
        .as_u64();
    let recipient_capacity: u64 = to_recipient.capacity().unpack();
    assert_eq!(recipient_capacity, occupied);

    let token_change = tx.outputs().get(1).unwrap();
    assert_eq!(token_change.lock().as_slice(), owner.as_slice());
    assert!(token_change.type_().to_opt().is_some());
    let change_data = tx.outputs_data().get(1).unwrap();
    assert_eq!(udt_amount_from_bytes(&change_data.raw_data()), Some(200));

    assert!(has_cell_dep(&tx, &sudt.cell_dep().unwrap()));
    assert!(has_cell_dep(&tx, &NetworkEnv::Devnet.sighash_cell_dep()));

    let in_cap = inputs_capacity(&chain, &tx);
    let out_cap = outputs_capacity(&tx);
    assert!(in_cap - out_cap >= asm.min_fee(&tx));
}

#[test]
fn transfer_of_the_whole_balance_adds_no_token_change() {
    let owner = lock_script(1);
    let recipient = lock_script(2);
    let sudt = sudt_config();
    let owner_args = owner.calc_script_hash();
    let udt_type = sudt.type_script(owner_args.as_slice()).unwrap();

    let mut chain = MockChain::default();
    chain
        .udt_cells
        .push(udt_cell(1, 144, owner.clone(), udt_type.clone(), 250));
    chain.capacity_cells.push(capacity_cell(2, 600, owner.clone()));

    let tx = assembler(&chain)
        .build_transfer(owner.clone(), recipient, &sudt, owner_args.as_slice(), 250)
        .expect("transfer tx");

    let token_outputs = tx
        .outputs()
        .into_iter()
        .filter(|o| o.type_().to_opt().is_some())
        .count();
    assert_eq!(token_outputs, 1);
}

#[test]
fn transfer_beyond_balance_is_rejected() {
    let owner = lock_script(1);
    let recipient = lock_script(2);
    let sudt = sudt_config();
    let owner_args = owner.calc_script_hash();
    let udt_type = sudt.type_script(owner_args.as_slice()).unwrap();

    let mut chain = MockChain::default();
    chain
        .udt_cells
        .push(udt_cell(1, 144, owner.clone(), udt_type.clone(), 50));
    chain.capacity_cells.push(capacity_cell(2, 600, owner.clone()));

    let err = assembler(&chain)
        .build_transfer(owner.clone(), recipient, &sudt, owner_args.as_slice(), 100)
        .expect_err("not enough tokens");
    assert!(matches!(err, PortError::InsufficientFunds(_)));
}

#[test]
fn zero_transfer_is_rejected_up_front() {
    let owner = lock_script(1);
    let recipient = lock_script(2);
    let owner_args = owner.calc_script_hash();
    let chain = MockChain::default();

    let err = assembler(&chain)
        .build_transfer(owner, recipient, &sudt_config(), owner_args.as_slice(), 0)
        .expect_err("zero amount");
    assert!(matches!(err, PortError::Validation(_)));
}

#[test]
fn deploy_sizes_the_code_cell_from_the_binary() {
    let owner = lock_script(1);
    let mut chain = MockChain::default();
    chain.capacity_cells.push(capacity_cell(1, 5_000, owner.clone()));

    let binary = vec![0xA5u8; 1_000];
    let tx = assembler(&chain)
        .build_deploy(owner, &binary)
        .expect("deploy tx");

    let code_cell = tx.outputs().get(0).unwrap();
    let code_capacity: u64 = code_cell.capacity().unpack();
    assert_eq!(
        code_capacity,
        Capacity::bytes(binary.len() + 61 + 65).unwrap().as_u64()
    );
    // The burn lock: all-zero code hash, empty args.
    assert_eq!(code_cell.lock().code_hash().as_slice(), [0u8; 32]);
    assert!(code_cell.lock().args().is_empty());

    let data = tx.outputs_data().get(0).unwrap();
    assert_eq!(data.raw_data().as_ref(), binary.as_slice());
}
