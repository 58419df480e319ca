//! Balance aggregation: a linear scan over indexer pages.

use ckb_types::packed;

use crate::domain::udt_amount_from_bytes;
use crate::ports::{CellQuery, ChainRpcPort, PortError};

const PAGE_SIZE: u32 = 64;

/// Sum the sUDT balance held by `lock` for the given token type script.
///
/// Iterates every matching live cell through the indexer cursor, decoding
/// each cell's first 16 data bytes as a little-endian amount. An empty
/// result set yields zero; cells with short data are skipped.
pub fn collect_udt_balance<C>(
    client: &C,
    lock: packed::Script,
    udt_type: packed::Script,
) -> Result<u128, PortError>
where
    C: ChainRpcPort + ?Sized,
{
    let query = CellQuery::udt_cells(lock, udt_type);
    let mut total: u128 = 0;
    let mut cursor: Option<Vec<u8>> = None;

    loop {
        let page = client.find_cells(&query, cursor.as_deref(), PAGE_SIZE)?;
        if page.cells.is_empty() {
            break;
        }
        for cell in &page.cells {
            if let Some(amount) = udt_amount_from_bytes(&cell.data) {
                total = total.saturating_add(amount);
            }
        }
        match page.last_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(total)
}
