use crate::columns::ColumnConfig;
use crate::loader::RawTable;
use crate::types::BuildingDefaults;
use crate::util::non_blank;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingInfo {
    pub name: String,
    pub address: String,
    pub inspection_date: String,
}

/// Split an audit name of the form `date/unit/building`. Fewer than three
/// segments means the name is not in that format.
pub fn parse_audit_name(audit_name: &str, delimiter: char) -> Option<(Option<&str>, Option<&str>)> {
    let parts: Vec<&str> = audit_name.split(delimiter).collect();
    if parts.len() < 3 {
        return None;
    }
    Some((non_blank(Some(parts[0])), non_blank(Some(parts[2]))))
}

/// Join the non-empty address parts with commas.
pub fn assemble_address(parts: &[Option<&str>], default: &str) -> String {
    let present: Vec<&str> = parts.iter().filter_map(|p| non_blank(*p)).collect();
    if present.is_empty() {
        default.to_string()
    } else {
        present.join(", ")
    }
}

pub fn extract_building_info(
    table: &RawTable,
    cfg: &ColumnConfig,
    defaults: &BuildingDefaults,
) -> BuildingInfo {
    let parsed = table
        .first_value(&cfg.audit_name_column)
        .and_then(|audit| parse_audit_name(audit, cfg.audit_delimiter));
    let (date, name) = match parsed {
        Some(parts) => parts,
        None => {
            log::debug!("Audit name missing or malformed; using building defaults");
            (None, None)
        }
    };

    let address = assemble_address(
        &[
            table.first_value(&cfg.location_column),
            table.first_value(&cfg.area_column),
            table.first_value(&cfg.region_column),
        ],
        &defaults.address,
    );

    BuildingInfo {
        name: name.unwrap_or(defaults.name.as_str()).to_string(),
        address,
        inspection_date: date.unwrap_or(defaults.date.as_str()).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defaults() -> BuildingDefaults {
        BuildingDefaults {
            name: "Fallback Tower".into(),
            address: "1 Fallback St".into(),
            date: "2000-01-01".into(),
        }
    }

    fn table(headers: &[&str], row: &[Option<&str>]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            vec![row.iter().map(|c| c.map(str::to_string)).collect()],
        )
        .unwrap()
    }

    #[test]
    fn test_building_from_audit_name() {
        let t = table(
            &[
                "auditName",
                "Title Page_Site conducted_Location",
                "Title Page_Site conducted_Area",
                "Title Page_Site conducted_Region",
            ],
            &[
                Some("2024-06-03 / 104 / Harbour View "),
                Some("12 Quay St"),
                None,
                Some("VIC"),
            ],
        );
        let info = extract_building_info(&t, &ColumnConfig::default(), &defaults());
        assert_eq!(
            info,
            BuildingInfo {
                name: "Harbour View".into(),
                address: "12 Quay St, VIC".into(),
                inspection_date: "2024-06-03".into(),
            }
        );
    }

    #[test]
    fn test_malformed_audit_name_uses_defaults() {
        let t = table(&["auditName"], &[Some("just a name")]);
        let info = extract_building_info(&t, &ColumnConfig::default(), &defaults());
        assert_eq!(info.name, "Fallback Tower");
        assert_eq!(info.inspection_date, "2000-01-01");
        assert_eq!(info.address, "1 Fallback St");
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let t = RawTable::default();
        let info = extract_building_info(&t, &ColumnConfig::default(), &defaults());
        assert_eq!(info.name, "Fallback Tower");
        assert_eq!(info.address, "1 Fallback St");
    }

    #[test]
    fn test_empty_building_segment_falls_back() {
        assert_eq!(
            parse_audit_name("2024-01-01/5/ ", '/'),
            Some((Some("2024-01-01"), None))
        );
    }
}
