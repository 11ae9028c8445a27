// Wide export → long-form inspection candidates
//
// Export columns are named `<Section>_<Room>_<Component>[.<n>]`. This module
// works out which unit each row belongs to, which columns are checklist
// points, and turns every (row, checklist column) pair into one candidate.
use crate::loader::{RawInspectionRow, RawTable};
use crate::util::{contains_any, non_blank};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

static DUPLICATE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.\d+)+$").expect("duplicate suffix pattern"));

/// Column names and delimiters of the export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub section_prefix: String,
    pub notes_suffix: String,
    pub column_delimiter: char,
    pub audit_delimiter: char,
    /// Used only when no column carries the section prefix
    pub discovery_keywords: Vec<String>,
    /// Tried in order; the first one holding any value wins
    pub lot_number_columns: Vec<String>,
    pub audit_name_column: String,
    pub unit_type_column: String,
    pub townhouse_type_column: String,
    pub apartment_type_column: String,
    pub location_column: String,
    pub area_column: String,
    pub region_column: String,
    /// Configuration columns that look like checklist points
    pub metadata_rooms: Vec<String>,
    pub metadata_components: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            section_prefix: "Pre-Settlement Inspection_".to_string(),
            notes_suffix: "_notes".to_string(),
            column_delimiter: '_',
            audit_delimiter: '/',
            discovery_keywords: owned(&["inspection", "check", "item", "defect", "issue", "status"]),
            lot_number_columns: owned(&["Lot Details_Lot Number", "Title Page_Lot number"]),
            audit_name_column: "auditName".to_string(),
            unit_type_column: "Pre-Settlement Inspection_Unit Type".to_string(),
            townhouse_type_column: "Pre-Settlement Inspection_Townhouse Type".to_string(),
            apartment_type_column: "Pre-Settlement Inspection_Apartment Type".to_string(),
            location_column: "Title Page_Site conducted_Location".to_string(),
            area_column: "Title Page_Site conducted_Area".to_string(),
            region_column: "Title Page_Site conducted_Region".to_string(),
            metadata_rooms: owned(&["Unit Type", "Building Type", "Townhouse Type", "Apartment Type"]),
            metadata_components: owned(&["Room Type"]),
        }
    }
}

/// Where a row's unit identifier came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
    LotColumn(String),
    AuditName,
    RowNumber,
}

/// Which discovery tier found the checklist columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryTier {
    Prefix,
    Keyword,
    NoneFound,
}

/// Result of splitting a checklist column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPath {
    Parsed { room: String, component: String },
    NeedsFallback,
}

/// One (unit, checklist column) observation before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionCandidate {
    pub unit: String,
    pub unit_type: String,
    pub room: String,
    pub component: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedInspection {
    pub candidates: Vec<InspectionCandidate>,
    pub unit_source: UnitSource,
    pub discovery: DiscoveryTier,
    pub inspection_columns: usize,
    pub excluded_metadata: usize,
}

/// Stand-in identifier derived from the audit name. Stable within a run
/// and across runs of the same export, but not a real lot number.
fn placeholder_unit(audit_name: &str) -> String {
    let digest = Sha256::digest(audit_name.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    format!("Unit_{:06}", u64::from_be_bytes(bytes) % 1_000_000)
}

/// `date/unit/building`: the middle segment is the unit when it is short
/// and contains a digit.
pub fn unit_from_audit_name(audit_name: &str, delimiter: char) -> Option<String> {
    let parts: Vec<&str> = audit_name.split(delimiter).collect();
    if parts.len() < 3 {
        return None;
    }
    let candidate = parts[1].trim();
    if !candidate.is_empty()
        && candidate.chars().count() <= 6
        && candidate.chars().any(|c| c.is_ascii_digit())
    {
        Some(candidate.to_string())
    } else {
        None
    }
}

fn fallback_unit(row: &RawInspectionRow<'_>, cfg: &ColumnConfig) -> String {
    match non_blank(row.get(&cfg.audit_name_column)) {
        Some(audit) => unit_from_audit_name(audit, cfg.audit_delimiter)
            .unwrap_or_else(|| placeholder_unit(audit)),
        None => format!("Unit_{}", row.index() + 1),
    }
}

/// One non-empty unit identifier per row.
pub fn resolve_units(table: &RawTable, cfg: &ColumnConfig) -> (Vec<String>, UnitSource) {
    let lot_column = cfg
        .lot_number_columns
        .iter()
        .find(|c| table.column_has_values(c));

    let source = match lot_column {
        Some(col) => UnitSource::LotColumn(col.clone()),
        None if table.has_column(&cfg.audit_name_column) => UnitSource::AuditName,
        None => UnitSource::RowNumber,
    };

    let mut fallbacks = 0usize;
    let units: Vec<String> = table
        .rows()
        .map(|row| {
            let lot = lot_column.and_then(|col| non_blank(row.get(col)));
            match lot {
                Some(lot) => lot.to_string(),
                None => {
                    fallbacks += 1;
                    fallback_unit(&row, cfg)
                }
            }
        })
        .collect();

    match &source {
        UnitSource::LotColumn(col) => {
            log::debug!("Unit identifiers taken from '{}'", col);
            if fallbacks > 0 {
                log::warn!("{} rows had no lot number and were named from the audit", fallbacks);
            }
        }
        UnitSource::AuditName => log::warn!("No lot number column; units inferred from audit names"),
        UnitSource::RowNumber => log::warn!("No unit columns at all; units numbered by row"),
    }
    (units, source)
}

/// `"<subtype> Townhouse"`, `"<subtype> Apartment"`, the raw marker, or
/// `"Unknown Type"`.
pub fn derive_unit_type(row: &RawInspectionRow<'_>, cfg: &ColumnConfig) -> String {
    let unit_type = non_blank(row.get(&cfg.unit_type_column));
    let townhouse = non_blank(row.get(&cfg.townhouse_type_column));
    let apartment = non_blank(row.get(&cfg.apartment_type_column));

    match unit_type {
        Some(t) if t.eq_ignore_ascii_case("townhouse") => match townhouse {
            Some(sub) => format!("{} Townhouse", sub),
            None => "Townhouse".to_string(),
        },
        Some(t) if t.eq_ignore_ascii_case("apartment") => match apartment {
            Some(sub) => format!("{} Apartment", sub),
            None => "Apartment".to_string(),
        },
        Some(t) => t.to_string(),
        None => "Unknown Type".to_string(),
    }
}

/// Prefix scan first, keyword scan when the prefix finds nothing.
pub fn discover_inspection_columns(
    headers: &[String],
    cfg: &ColumnConfig,
) -> (Vec<String>, DiscoveryTier) {
    let by_prefix: Vec<String> = headers
        .iter()
        .filter(|h| h.starts_with(&cfg.section_prefix) && !h.ends_with(&cfg.notes_suffix))
        .cloned()
        .collect();
    if !by_prefix.is_empty() {
        return (by_prefix, DiscoveryTier::Prefix);
    }

    let by_keyword: Vec<String> = headers
        .iter()
        .filter(|h| contains_any(&h.to_lowercase(), &cfg.discovery_keywords))
        .cloned()
        .collect();
    if by_keyword.is_empty() {
        (by_keyword, DiscoveryTier::NoneFound)
    } else {
        (by_keyword, DiscoveryTier::Keyword)
    }
}

/// Split `<Section>_<Room>_<Component>[.<n>]` into room and component.
/// Anything past the third segment is folded away: the component is the
/// last delimiter-separated piece.
pub fn parse_column_name(name: &str, cfg: &ColumnConfig) -> ColumnPath {
    let parts: Vec<&str> = name.splitn(3, cfg.column_delimiter).collect();
    if parts.len() < 3 {
        return ColumnPath::NeedsFallback;
    }
    let component = DUPLICATE_SUFFIX.replace(parts[2], "");
    let component = component
        .rsplit(cfg.column_delimiter)
        .next()
        .unwrap_or_default();
    ColumnPath::Parsed {
        room: parts[1].to_string(),
        component: component.to_string(),
    }
}

/// Room and component for a column, with the `General` fallback applied.
pub fn room_and_component(name: &str, cfg: &ColumnConfig) -> (String, String) {
    match parse_column_name(name, cfg) {
        ColumnPath::Parsed { room, component } => (room, component),
        ColumnPath::NeedsFallback => (
            "General".to_string(),
            name.strip_prefix(cfg.section_prefix.as_str())
                .unwrap_or(name)
                .to_string(),
        ),
    }
}

/// Configuration columns such as `<Section>_Unit Type` or
/// `<Section>_<Room>_Room Type` are not inspection points.
pub fn is_metadata_column(name: &str, cfg: &ColumnConfig) -> bool {
    match parse_column_name(name, cfg) {
        ColumnPath::Parsed { room, component } => {
            cfg.metadata_rooms.contains(&room) || cfg.metadata_components.contains(&component)
        }
        ColumnPath::NeedsFallback => {
            let rest = name.strip_prefix(cfg.section_prefix.as_str()).unwrap_or(name);
            cfg.metadata_rooms.iter().any(|m| m == rest)
                || cfg.metadata_components.iter().any(|m| m == rest)
        }
    }
}

/// Reshape the wide table into candidates, column by column, and drop the
/// metadata columns that are not inspection points.
pub fn melt(table: &RawTable, cfg: &ColumnConfig) -> ParsedInspection {
    let (units, unit_source) = resolve_units(table, cfg);
    let unit_types: Vec<String> = table.rows().map(|row| derive_unit_type(&row, cfg)).collect();

    let (columns, discovery) = discover_inspection_columns(table.headers(), cfg);
    match discovery {
        DiscoveryTier::Prefix => log::debug!("{} checklist columns found by prefix", columns.len()),
        DiscoveryTier::Keyword => {
            log::warn!(
                "No '{}' columns; {} columns matched by keyword",
                cfg.section_prefix,
                columns.len()
            )
        }
        DiscoveryTier::NoneFound => log::warn!("No checklist columns found"),
    }

    let mut candidates = Vec::with_capacity(columns.len() * table.len());
    let mut excluded_metadata = 0usize;
    for column in &columns {
        if is_metadata_column(column, cfg) {
            excluded_metadata += table.len();
            continue;
        }
        let (room, component) = room_and_component(column, cfg);
        for row in table.rows() {
            candidates.push(InspectionCandidate {
                unit: units[row.index()].clone(),
                unit_type: unit_types[row.index()].clone(),
                room: room.clone(),
                component: component.clone(),
                value: row.get(column).map(str::to_string),
            });
        }
    }

    ParsedInspection {
        candidates,
        unit_source,
        discovery,
        inspection_columns: columns.len(),
        excluded_metadata,
    }
}
