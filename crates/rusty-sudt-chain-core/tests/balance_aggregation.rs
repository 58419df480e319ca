mod common;

use ckb_types::bytes::Bytes;
use ckb_types::prelude::*;

use common::{lock_script, sudt_config, udt_cell, MockChain};
use rusty_sudt_chain_core::{collect_udt_balance, LiveCell};

#[test]
fn empty_result_set_sums_to_zero() {
    let chain = MockChain::default();
    let owner = lock_script(1);
    let udt_type = sudt_config()
        .type_script(owner.calc_script_hash().as_slice())
        .unwrap();

    let total = collect_udt_balance(&chain, owner, udt_type).expect("balance");
    assert_eq!(total, 0);
}

#[test]
fn sums_exactly_across_cursor_pages() {
    let owner = lock_script(1);
    let udt_type = sudt_config()
        .type_script(owner.calc_script_hash().as_slice())
        .unwrap();

    // More cells than one internal page so the cursor is exercised.
    let mut chain = MockChain::default();
    let mut expected: u128 = 0;
    for i in 0..70u8 {
        let amount = u128::from(i) * 7 + 1;
        expected += amount;
        chain
            .udt_cells
            .push(udt_cell(i, 144, owner.clone(), udt_type.clone(), amount));
    }

    let total = collect_udt_balance(&chain, owner, udt_type).expect("balance");
    assert_eq!(total, expected);
}

#[test]
fn cells_with_short_data_are_skipped() {
    let owner = lock_script(2);
    let udt_type = sudt_config()
        .type_script(owner.calc_script_hash().as_slice())
        .unwrap();

    let mut chain = MockChain::default();
    chain
        .udt_cells
        .push(udt_cell(1, 144, owner.clone(), udt_type.clone(), 500));
    let mut truncated = udt_cell(2, 144, owner.clone(), udt_type.clone(), 0);
    truncated.data = Bytes::from(vec![0u8; 8]);
    chain.udt_cells.push(truncated);
    chain
        .udt_cells
        .push(udt_cell(3, 144, owner.clone(), udt_type.clone(), 42));

    let total = collect_udt_balance(&chain, owner, udt_type).expect("balance");
    assert_eq!(total, 542);
}

#[test]
fn ignores_cells_under_other_locks() {
    let owner = lock_script(3);
    let stranger = lock_script(4);
    let udt_type = sudt_config()
        .type_script(owner.calc_script_hash().as_slice())
        .unwrap();

    let mut chain = MockChain::default();
    chain
        .udt_cells
        .push(udt_cell(1, 144, owner.clone(), udt_type.clone(), 100));
    chain
        .udt_cells
        .push(udt_cell(2, 144, stranger, udt_type.clone(), 900));

    let total = collect_udt_balance(&chain, owner, udt_type).expect("balance");
    assert_eq!(total, 100);
}

#[test]
fn trailing_data_beyond_the_amount_is_ignored() {
    let owner = lock_script(5);
    let udt_type = sudt_config()
        .type_script(owner.calc_script_hash().as_slice())
        .unwrap();

    let mut chain = MockChain::default();
    let mut cell: LiveCell = udt_cell(1, 150, owner.clone(), udt_type.clone(), 77);
    let mut data = cell.data.to_vec();
    data.extend_from_slice(b"extra");
    cell.data = Bytes::from(data);
    chain.udt_cells.push(cell);

    let total = collect_udt_balance(&chain, owner, udt_type).expect("balance");
    assert_eq!(total, 77);
}
