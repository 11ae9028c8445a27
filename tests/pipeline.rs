use chrono::{Duration, NaiveDate, NaiveDateTime};
use inspection_pipeline::output::write_csv_to;
use inspection_pipeline::schedule::ScheduleOffsets;
use inspection_pipeline::trades::{default_trade_mapping, UNKNOWN_TRADE};
use inspection_pipeline::types::{PlannedWorkRow, TradeMappingEntry};
use inspection_pipeline::{
    process_at, AreaType, BuildingDefaults, Metrics, Pipeline, PipelineConfig, RawTable,
    StatusClass, TradeMapping, Urgency, UserPriorityConfig,
};
use pretty_assertions::assert_eq;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn table(headers: &[&str], rows: &[Vec<&str>]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn empty_export_gives_zeroed_metrics_and_shaped_tables() {
    let raw = table(
        &[
            "auditName",
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Kitchen_Sink",
        ],
        &[],
    );
    let defaults = BuildingDefaults::default();
    let out = process_at(
        &raw,
        &default_trade_mapping(),
        &defaults,
        &UserPriorityConfig::new(),
        now(),
    );

    assert!(out.items.is_empty());
    assert!(out.common_area_items.is_empty());
    assert_eq!(
        out.metrics,
        Metrics {
            building_name: defaults.name.clone(),
            address: defaults.address.clone(),
            inspection_date: defaults.date.clone(),
            ..Metrics::default()
        }
    );

    let mut buf = Vec::new();
    write_csv_to(&mut buf, &out.metrics.urgent_defects_table).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "Unit,Room,Component,Trade,PlannedCompletion\n"
    );
}

#[test]
fn ten_units_bucket_every_unit() {
    let mut headers = vec!["Lot Details_Lot Number".to_string()];
    for k in 1..=20 {
        headers.push(format!("Pre-Settlement Inspection_Bedroom_Item {}", k));
    }
    let defect_counts = [1usize, 5, 20, 0, 0, 0, 0, 0, 0, 0];
    let rows: Vec<Vec<Option<String>>> = defect_counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            let mut row = vec![Some(format!("{}", 101 + i))];
            row.extend((0..20).map(|k| Some(if k < n { "✗" } else { "✓" }.to_string())));
            row
        })
        .collect();
    let raw = RawTable::new(headers, rows).unwrap();

    let out = process_at(
        &raw,
        &default_trade_mapping(),
        &BuildingDefaults::default(),
        &UserPriorityConfig::new(),
        now(),
    );
    let m = &out.metrics;
    assert_eq!(m.total_units, 10);
    assert_eq!(m.total_defects, 26);
    assert_eq!(
        (m.ready_units, m.minor_work_units, m.major_work_units, m.extensive_work_units),
        (8, 1, 0, 1)
    );
    assert!((m.ready_pct - 80.0).abs() < 1e-9);
    assert_eq!(m.summary_unit[0].unit, "103");
    assert_eq!(m.summary_unit[0].defect_count, 20);
}

#[test]
fn unmapped_pairs_resolve_to_unknown_trade() {
    let raw = table(
        &[
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Balcony_Railing",
            "Pre-Settlement Inspection_Kitchen_Sink",
        ],
        &[vec!["201", "✗", "✗"]],
    );
    let mapping = TradeMapping::from_entries(vec![TradeMappingEntry::new(
        "Kitchen", "Sink", "Plumbing",
    )]);
    let out = process_at(
        &raw,
        &mapping,
        &BuildingDefaults::default(),
        &UserPriorityConfig::new(),
        now(),
    );

    let railing = out.items.iter().find(|i| i.component == "Railing").unwrap();
    assert_eq!(railing.trade, UNKNOWN_TRADE);
    let sink = out.items.iter().find(|i| i.component == "Sink").unwrap();
    assert_eq!(sink.trade, "Plumbing");
    assert_eq!(out.report.unmapped_items, 1);
    assert!(out
        .metrics
        .summary_trade
        .iter()
        .any(|t| t.trade == UNKNOWN_TRADE && t.defect_count == 1));
}

#[test]
fn area_partition_is_total() {
    let raw = table(
        &[
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Lobby_Intercom",
            "Pre-Settlement Inspection_Kitchen_Sink",
            "Pre-Settlement Inspection_Bathroom_Mirror",
        ],
        &[
            vec!["301", "✗", "✓", "✗"],
            vec!["Common", "✗", "✗", "n/a"],
        ],
    );
    let out = process_at(
        &raw,
        &default_trade_mapping(),
        &BuildingDefaults::default(),
        &UserPriorityConfig::new(),
        now(),
    );
    let apartments = out
        .items
        .iter()
        .filter(|i| i.area_type == AreaType::Apartment)
        .count();
    assert_eq!(apartments + out.common_area_items.len(), out.items.len());
    assert_eq!(out.common_area_items.len(), 4);
    assert_eq!(out.metrics.total_units, 1);
    assert_eq!(out.metrics.total_inspections, apartments);
    assert_eq!(out.metrics.common_total_defects, 4);
}

#[test]
fn not_applicable_cells_count_as_defects() {
    let raw = table(
        &["Lot Details_Lot Number", "Pre-Settlement Inspection_Kitchen_Sink"],
        &[vec!["601", "N/A"]],
    );
    let out = process_at(
        &raw,
        &default_trade_mapping(),
        &BuildingDefaults::default(),
        &UserPriorityConfig::new(),
        now(),
    );
    assert_eq!(out.items[0].status_class, StatusClass::NotOk);
    assert_eq!(out.metrics.total_defects, 1);
    assert_eq!(out.metrics.summary_unit[0].unit, "601");
}

#[test]
fn planned_windows_do_not_overlap() {
    let raw = table(
        &[
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Bathroom_Mirror",
            "Pre-Settlement Inspection_Bedroom_Wardrobe",
            "Pre-Settlement Inspection_Entry_Door Lock",
        ],
        &[vec!["401", "✗", "✗", "✗"], vec!["402", "✗", "✗", "✓"]],
    );
    let config = PipelineConfig {
        schedule: ScheduleOffsets {
            urgent: 2,
            high_priority: 7,
            normal: 21,
        },
        ..PipelineConfig::default()
    };
    let priorities = UserPriorityConfig::new().with("Security Systems", true);
    let out = Pipeline::new(&config).run(&raw, &default_trade_mapping(), &priorities, now());
    let m = &out.metrics;

    let near: &[PlannedWorkRow] = &m.planned_work_2weeks_table;
    let far: &[PlannedWorkRow] = &m.planned_work_month_table;
    assert_eq!(near.len(), 3);
    assert_eq!(far.len(), 2);
    for row in near {
        assert!(far.iter().all(|f| f.planned_completion != row.planned_completion));
    }
    assert!(far
        .iter()
        .all(|f| f.urgency == Urgency::Normal && f.planned_completion == now() + Duration::days(21)));
    assert_eq!(m.urgent_defects, 1);
    assert_eq!(m.urgent_defects_table[0].unit, "401");
}

#[test]
fn priority_category_is_checked_before_component_default() {
    let raw = table(
        &[
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Bathroom_Mirror",
        ],
        &[vec!["501", "✗"]],
    );
    let mapping = default_trade_mapping();
    let defaults = BuildingDefaults::default();

    let electrical = UserPriorityConfig::new().with("Electrical Safety", true);
    let out = process_at(&raw, &mapping, &defaults, &electrical, now());
    assert_eq!(out.items[0].urgency, Urgency::HighPriority);

    let plumbing = UserPriorityConfig::new().with("Water/Plumbing", true);
    let out = process_at(&raw, &mapping, &defaults, &plumbing, now());
    assert_eq!(out.items[0].urgency, Urgency::Urgent);
    assert_eq!(out.items[0].planned_completion, now() + Duration::days(2));
}
