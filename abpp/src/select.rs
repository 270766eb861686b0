use super::*;

/// Return the sub-table of abundance columns, i.e. the columns whose
/// header starts with the schema's abundance prefix
pub fn select_abundance_columns(table: &Table, schema: &Schema) -> Result<Table> {
    let abundance = table.select_columns(|h| schema.is_abundance(h));
    if abundance.columns.is_empty() {
        return Err(Error::Schema(format!(
            "no column of {} starts with '{}' ({} columns checked)",
            table.path,
            schema.abundance_prefix,
            table.columns.len()
        )));
    }
    Ok(abundance)
}

/// Return the columns whose header contains `marker`
pub fn select_group(abundance: &Table, marker: &str) -> Result<Table> {
    let group = abundance.select_columns(|h| h.contains(marker));
    if group.columns.is_empty() {
        return Err(Error::Schema(format!(
            "group marker '{}' matched no abundance columns in {}",
            marker, abundance.path
        )));
    }
    Ok(group)
}
