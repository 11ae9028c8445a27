use crate::error::{PipelineError, Result};
use crate::types::TradeMappingEntry;
use crate::util::clean_cell;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Wide inspection export: one row per unit audit, one column per
/// checklist point. Cells are `None` where the export left them empty.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    index: HashMap<String, usize>,
}

/// Borrowed view of a single export row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawInspectionRow<'a> {
    table: &'a RawTable,
    index: usize,
}

impl<'a> RawInspectionRow<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.get(self.index, column)
    }
}

impl RawTable {
    /// Build a table, rejecting rows whose width differs from the header.
    ///
    /// Repeated header names get a `.1`, `.2`, ... suffix so every column
    /// stays addressable; the column parser strips that suffix again. A
    /// generated name that is already taken gets suffixed again (`C.1.1`).
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        let expected = headers.len();
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(PipelineError::InvalidShape {
                row: row + 1,
                expected,
                found: cells.len(),
            });
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut unique = Vec::with_capacity(headers.len());
        for mut name in headers {
            let mut n = seen.get(&name).copied().unwrap_or(0);
            while n > 0 {
                seen.insert(name.clone(), n + 1);
                name = format!("{}.{}", name, n);
                n = seen.get(&name).copied().unwrap_or(0);
            }
            seen.insert(name.clone(), 1);
            unique.push(name);
        }
        let index = unique
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        Ok(Self {
            headers: unique,
            rows,
            index,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = *self.index.get(column)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// True when the column exists and at least one row has a value in it.
    pub fn column_has_values(&self, column: &str) -> bool {
        self.first_value(column).is_some()
    }

    /// First non-null value of a column, top to bottom.
    pub fn first_value(&self, column: &str) -> Option<&str> {
        (0..self.rows.len()).find_map(|r| self.get(r, column))
    }

    pub fn row(&self, index: usize) -> RawInspectionRow<'_> {
        RawInspectionRow { table: self, index }
    }

    pub fn rows(&self) -> impl Iterator<Item = RawInspectionRow<'_>> {
        (0..self.rows.len()).map(move |i| self.row(i))
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub renamed_columns: usize,
}

pub fn load_inspection_export<P: AsRef<Path>>(path: P) -> Result<(RawTable, LoadReport)> {
    let file = std::fs::File::open(path)?;
    read_inspection_export(file)
}

pub fn read_inspection_export<R: io::Read>(reader: R) -> Result<(RawTable, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.to_string()
        })
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(clean_cell).collect::<Vec<_>>());
    }

    let total_columns = headers.len();
    let table = RawTable::new(headers.clone(), rows)?;
    let renamed_columns = table
        .headers()
        .iter()
        .zip(headers.iter())
        .filter(|(a, b)| a != b)
        .count();
    if renamed_columns > 0 {
        log::debug!("Renamed {} duplicate column headers", renamed_columns);
    }
    let report = LoadReport {
        total_rows: table.len(),
        total_columns,
        renamed_columns,
    };
    Ok((table, report))
}

pub fn load_trade_mapping<P: AsRef<Path>>(path: P) -> Result<Vec<TradeMappingEntry>> {
    let file = std::fs::File::open(path)?;
    read_trade_mapping(file)
}

/// Read `Room,Component,Trade` rows. Rows missing a room or component
/// cannot be joined on and are skipped.
pub fn read_trade_mapping<R: io::Read>(reader: R) -> Result<Vec<TradeMappingEntry>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.deserialize::<TradeMappingEntry>() {
        let entry = result?;
        if entry.room.is_empty() || entry.component.is_empty() {
            skipped += 1;
            continue;
        }
        entries.push(entry);
    }
    if skipped > 0 {
        log::warn!("Skipped {} trade mapping rows without room or component", skipped);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_export_maps_empty_cells_to_none() {
        let csv = "auditName,Pre-Settlement Inspection_Kitchen_Sink\n2024-01-01/101/Tower,\n";
        let (table, report) = read_inspection_export(csv.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 1);
        assert_eq!(table.get(0, "auditName"), Some("2024-01-01/101/Tower"));
        assert_eq!(table.get(0, "Pre-Settlement Inspection_Kitchen_Sink"), None);
    }

    #[test]
    fn test_duplicate_headers_get_index_suffix() {
        let csv = "A_B_C,A_B_C,A_B_C\nx,y,z\n";
        let (table, report) = read_inspection_export(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["A_B_C", "A_B_C.1", "A_B_C.2"]);
        assert_eq!(report.renamed_columns, 2);
        assert_eq!(table.get(0, "A_B_C.2"), Some("z"));
    }

    #[test]
    fn test_suffix_clash_keeps_every_column() {
        let csv = "A_B_C,A_B_C,A_B_C.1\nx,y,z\n";
        let (table, report) = read_inspection_export(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["A_B_C", "A_B_C.1", "A_B_C.1.1"]);
        assert_eq!(report.renamed_columns, 2);
        assert_eq!(table.get(0, "A_B_C.1"), Some("y"));
        assert_eq!(table.get(0, "A_B_C.1.1"), Some("z"));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let csv = "a,b\n1,2\n3\n";
        let err = read_inspection_export(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidShape { row: 2, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_first_value_skips_nulls() {
        let table = RawTable::new(
            vec!["Region".into()],
            vec![vec![None], vec![Some("VIC".into())]],
        )
        .unwrap();
        assert!(table.column_has_values("Region"));
        assert_eq!(table.first_value("Region"), Some("VIC"));
        assert!(!table.column_has_values("Missing"));
    }

    #[test]
    fn test_read_trade_mapping_trims_and_skips_incomplete_rows() {
        let csv = "Room,Component,Trade\n Kitchen , Sink ,Plumbing\n,Tiles,Tiling\n";
        let entries = read_trade_mapping(csv.as_bytes()).unwrap();
        assert_eq!(entries, vec![TradeMappingEntry::new("Kitchen", "Sink", "Plumbing")]);
    }
}
