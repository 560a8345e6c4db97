//! Run planning: which instruments go into which batch.

use market::types::Instrument;

/// Sorts instruments by symbol, drops repeated symbols and splits the list
/// into consecutive batches of at most `batch_size`.
///
/// Order is deterministic so two runs over the same listing evaluate
/// instruments in the same sequence.
pub fn plan_batches(mut instruments: Vec<Instrument>, batch_size: usize) -> Vec<Vec<Instrument>> {
    instruments.sort_by(|a, b| a.full_symbol.cmp(&b.full_symbol));
    instruments.dedup_by(|a, b| a.full_symbol == b.full_symbol);

    instruments
        .chunks(batch_size.max(1))
        .map(<[Instrument]>::to_vec)
        .collect()
}
