//! Straight-line transaction assembly for the three wallet flows.
//!
//! Each builder returns an unsigned `TransactionView`; the caller signs,
//! broadcasts and hands the hash to the confirmation poller. Input
//! selection is a greedy scan over indexer pages, good enough for a demo
//! wallet; fee completion recomputes the serialized size after the change
//! output is attached.

use ckb_types::bytes::Bytes;
use ckb_types::core::{Capacity, ScriptHashType, TransactionBuilder, TransactionView};
use ckb_types::{packed, prelude::*};

use crate::domain::{
    udt_amount_from_bytes, udt_amount_to_bytes, NetworkEnv, ScriptConfig, CKB,
    DEPLOY_CAPACITY_OVERHEAD_CKB, ISSUE_CELL_CAPACITY_CKB, UDT_DATA_LEN,
};
use crate::ports::{CellQuery, ChainRpcPort, LiveCell, PortError};

const PAGE_SIZE: u32 = 32;

/// Secp256k1 witness placeholder: a zero-filled 65-byte lock field, so fee
/// estimation sees the final witness size.
const SIGNATURE_PLACEHOLDER_LEN: usize = 65;

pub struct TxAssembler<'a, C: ChainRpcPort + ?Sized> {
    client: &'a C,
    lock_dep: packed::CellDep,
    fee_rate: u64,
}

impl<'a, C: ChainRpcPort + ?Sized> TxAssembler<'a, C> {
    pub fn new(client: &'a C, lock_dep: packed::CellDep, fee_rate: u64) -> Self {
        Self {
            client,
            lock_dep,
            fee_rate,
        }
    }

    pub fn for_env(client: &'a C, env: NetworkEnv, fee_rate: u64) -> Self {
        Self::new(client, env.sighash_cell_dep(), fee_rate)
    }

    /// Issue `amount` tokens to the signer itself. The sUDT args are the
    /// owner's lock script hash, which is what makes this an owner-mode
    /// issuance the contract will accept.
    pub fn build_issue(
        &self,
        signer_lock: packed::Script,
        sudt: &ScriptConfig,
        amount: u128,
    ) -> Result<TransactionView, PortError> {
        let owner_args = signer_lock.calc_script_hash();
        let udt_type = sudt
            .type_script(owner_args.as_slice())
            .map_err(PortError::Validation)?;

        let output = packed::CellOutput::new_builder()
            .capacity(Capacity::shannons(ISSUE_CELL_CAPACITY_CKB * CKB).pack())
            .lock(signer_lock.clone())
            .type_(Some(udt_type).pack())
            .build();
        let data = Bytes::from(udt_amount_to_bytes(amount).to_vec());

        let draft = TransactionBuilder::default()
            .output(output)
            .output_data(data.pack())
            .cell_dep(sudt.cell_dep().map_err(PortError::Validation)?)
            .build();
        self.complete_by_capacity(draft, signer_lock, Vec::new())
    }

    /// Transfer `amount` tokens of the sUDT identified by `owner_args` from
    /// the signer to `recipient_lock`, returning any token surplus to the
    /// signer as a change cell.
    pub fn build_transfer(
        &self,
        signer_lock: packed::Script,
        recipient_lock: packed::Script,
        sudt: &ScriptConfig,
        owner_args: &[u8],
        amount: u128,
    ) -> Result<TransactionView, PortError> {
        if amount == 0 {
            return Err(PortError::Validation("transfer amount must be non-zero".into()));
        }
        let udt_type = sudt
            .type_script(owner_args)
            .map_err(PortError::Validation)?;

        let (token_cells, token_in) =
            self.collect_udt_inputs(signer_lock.clone(), udt_type.clone(), amount)?;

        let mut builder = TransactionBuilder::default()
            .output(udt_output(recipient_lock, udt_type.clone())?)
            .output_data(Bytes::from(udt_amount_to_bytes(amount).to_vec()).pack());

        let surplus = token_in - amount;
        if surplus > 0 {
            builder = builder
                .output(udt_output(signer_lock.clone(), udt_type)?)
                .output_data(Bytes::from(udt_amount_to_bytes(surplus).to_vec()).pack());
        }

        let draft = builder
            .cell_dep(sudt.cell_dep().map_err(PortError::Validation)?)
            .build();
        self.complete_by_capacity(draft, signer_lock, token_cells)
    }

    /// Upload a contract binary as cell data under the unspendable all-zero
    /// lock. Capacity covers the binary plus the fixed cell overhead.
    pub fn build_deploy(
        &self,
        signer_lock: packed::Script,
        binary: &[u8],
    ) -> Result<TransactionView, PortError> {
        let capacity =
            Capacity::bytes(binary.len() + DEPLOY_CAPACITY_OVERHEAD_CKB as usize)
                .map_err(capacity_error)?;
        let burn_lock = packed::Script::new_builder()
            .code_hash(packed::Byte32::default())
            .hash_type(ScriptHashType::Type.into())
            .build();
        let output = packed::CellOutput::new_builder()
            .capacity(capacity.pack())
            .lock(burn_lock)
            .build();

        let draft = TransactionBuilder::default()
            .output(output)
            .output_data(Bytes::from(binary.to_vec()).pack())
            .build();
        self.complete_by_capacity(draft, signer_lock, Vec::new())
    }

    /// Minimal fee for the serialized transaction at this assembler's rate.
    pub fn min_fee(&self, tx: &TransactionView) -> u64 {
        let size = tx.data().serialized_size_in_block() as u64;
        (size * self.fee_rate).div_ceil(1000)
    }

    fn collect_udt_inputs(
        &self,
        lock: packed::Script,
        udt_type: packed::Script,
        amount: u128,
    ) -> Result<(Vec<LiveCell>, u128), PortError> {
        let query = CellQuery::udt_cells(lock, udt_type);
        let mut cells = Vec::new();
        let mut token_in: u128 = 0;
        let mut cursor: Option<Vec<u8>> = None;

        'scan: loop {
            let page = self.client.find_cells(&query, cursor.as_deref(), PAGE_SIZE)?;
            if page.cells.is_empty() {
                break;
            }
            for cell in page.cells {
                let Some(cell_amount) = udt_amount_from_bytes(&cell.data) else {
                    continue;
                };
                token_in = token_in.saturating_add(cell_amount);
                cells.push(cell);
                if token_in >= amount {
                    break 'scan;
                }
            }
            match page.last_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        if token_in < amount {
            return Err(PortError::InsufficientFunds(format!(
                "sUDT balance {token_in} below transfer amount {amount}"
            )));
        }
        Ok((cells, token_in))
    }

    /// Fill in inputs by capacity and attach the fee, adding a change cell
    /// back to `change_lock` whenever the surplus can hold one.
    fn complete_by_capacity(
        &self,
        draft: TransactionView,
        change_lock: packed::Script,
        seed_cells: Vec<LiveCell>,
    ) -> Result<TransactionView, PortError> {
        let outputs_capacity = draft
            .outputs_capacity()
            .map_err(capacity_error)?
            .as_u64();

        let mut cells = seed_cells;
        let mut inputs_capacity: u64 = cells.iter().map(LiveCell::capacity).sum();
        if let Some(done) =
            self.try_finalize(&draft, &cells, inputs_capacity, outputs_capacity, &change_lock)?
        {
            return Ok(done);
        }

        let query = CellQuery::capacity_cells(change_lock.clone());
        let mut cursor: Option<Vec<u8>> = None;
        loop {
            let page = self.client.find_cells(&query, cursor.as_deref(), PAGE_SIZE)?;
            if page.cells.is_empty() {
                break;
            }
            for cell in page.cells {
                inputs_capacity = inputs_capacity.saturating_add(cell.capacity());
                cells.push(cell);
                if let Some(done) = self.try_finalize(
                    &draft,
                    &cells,
                    inputs_capacity,
                    outputs_capacity,
                    &change_lock,
                )? {
                    return Ok(done);
                }
            }
            match page.last_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Err(PortError::InsufficientFunds(format!(
            "live capacity {inputs_capacity} cannot cover outputs {outputs_capacity} plus fee"
        )))
    }

    fn try_finalize(
        &self,
        draft: &TransactionView,
        cells: &[LiveCell],
        inputs_capacity: u64,
        outputs_capacity: u64,
        change_lock: &packed::Script,
    ) -> Result<Option<TransactionView>, PortError> {
        if cells.is_empty() {
            return Ok(None);
        }

        let change_min = packed::CellOutput::new_builder()
            .lock(change_lock.clone())
            .build()
            .occupied_capacity(Capacity::zero())
            .map_err(capacity_error)?
            .as_u64();

        // Prefer returning the surplus as change.
        let sized = self.attach_inputs(draft, cells, Some((change_lock.clone(), change_min)));
        let fee_with_change = self.min_fee(&sized);
        if inputs_capacity >= outputs_capacity + fee_with_change + change_min {
            let change_capacity = inputs_capacity - outputs_capacity - fee_with_change;
            return Ok(Some(self.attach_inputs(
                draft,
                cells,
                Some((change_lock.clone(), change_capacity)),
            )));
        }

        // Otherwise the surplus, if any, is left to the fee.
        let no_change = self.attach_inputs(draft, cells, None);
        let fee = self.min_fee(&no_change);
        if inputs_capacity >= outputs_capacity + fee {
            return Ok(Some(no_change));
        }
        Ok(None)
    }

    fn attach_inputs(
        &self,
        draft: &TransactionView,
        cells: &[LiveCell],
        change: Option<(packed::Script, u64)>,
    ) -> TransactionView {
        let mut builder = draft
            .as_advanced_builder()
            .cell_dep(self.lock_dep.clone());
        for cell in cells {
            builder = builder.input(packed::CellInput::new(cell.out_point.clone(), 0));
        }
        if let Some((lock, capacity)) = change {
            builder = builder
                .output(
                    packed::CellOutput::new_builder()
                        .capacity(Capacity::shannons(capacity).pack())
                        .lock(lock)
                        .build(),
                )
                .output_data(Bytes::new().pack());
        }

        let mut witnesses = Vec::with_capacity(cells.len());
        witnesses.push(placeholder_witness().as_bytes().pack());
        for _ in 1..cells.len() {
            witnesses.push(Bytes::new().pack());
        }
        builder.set_witnesses(witnesses).build()
    }
}

/// Token cell at its minimal occupied capacity.
fn udt_output(
    lock: packed::Script,
    udt_type: packed::Script,
) -> Result<packed::CellOutput, PortError> {
    let proto = packed::CellOutput::new_builder()
        .lock(lock)
        .type_(Some(udt_type).pack())
        .build();
    let occupied = proto
        .occupied_capacity(Capacity::bytes(UDT_DATA_LEN).map_err(capacity_error)?)
        .map_err(capacity_error)?;
    Ok(proto.as_builder().capacity(occupied.pack()).build())
}

fn placeholder_witness() -> packed::WitnessArgs {
    packed::WitnessArgs::new_builder()
        .lock(Some(Bytes::from(vec![0u8; SIGNATURE_PLACEHOLDER_LEN])).pack())
        .build()
}

fn capacity_error(e: impl std::fmt::Display) -> PortError {
    PortError::Validation(format!("capacity overflow: {e}"))
}
