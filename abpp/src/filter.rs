use super::*;

/// Drop proteins that have no usable measurement in the probe group
///
/// For every row the missing probe cells are counted, and the row is kept
/// only if that count is strictly less than the number of probe columns.
/// Row order is preserved, so applying the filter twice changes nothing.
pub fn filter_rows_with_any_probe_signal(table: &Table, schema: &Schema) -> Result<Table> {
    let abundance = select_abundance_columns(table, schema)?;
    let probe = schema.select_probe(&abundance)?;
    let n = probe.columns.len();

    let mask = (0..table.len())
        .map(|i| {
            let missing = probe
                .columns
                .iter()
                .filter(|c| !is_observed(c.values[i]))
                .count();
            missing < n
        })
        .collect::<Vec<bool>>();

    let filtered = table.retain_rows(&mask)?;
    let dropped = table.len() - filtered.len();
    if dropped > 0 {
        debug!(
            "{}: dropped {} of {} proteins with no probe signal",
            table.path,
            dropped,
            table.len()
        );
    }
    Ok(filtered)
}
