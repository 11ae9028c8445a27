use crate::building::BuildingInfo;
use crate::types::{
    AreaType, ComponentDetailRow, Metrics, NormalizedItem, PlannedWorkRow, RoomComponentCount,
    RoomCount, TradeCount, UnitCount, UnitDefectRow, UnitTradeCount, Urgency, UrgentDefectRow,
};
use crate::util::percentage;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Upper bounds (inclusive) on a unit's defect count for each readiness
/// bucket. Anything above `major` is extensive work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessThresholds {
    pub ready: usize,
    pub minor: usize,
    pub major: usize,
}

impl Default for ReadinessThresholds {
    fn default() -> Self {
        Self {
            ready: 2,
            minor: 7,
            major: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    Ready,
    MinorWork,
    MajorWork,
    ExtensiveWork,
}

impl ReadinessThresholds {
    pub fn bucket(&self, defects: usize) -> Readiness {
        if defects <= self.ready {
            Readiness::Ready
        } else if defects <= self.minor {
            Readiness::MinorWork
        } else if defects <= self.major {
            Readiness::MajorWork
        } else {
            Readiness::ExtensiveWork
        }
    }
}

/// Planned-work horizons in days from the run's anchor time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningWindows {
    pub near_days: i64,
    pub far_days: i64,
}

impl Default for PlanningWindows {
    fn default() -> Self {
        Self {
            near_days: 14,
            far_days: 30,
        }
    }
}

/// Split items into (apartment, common area).
pub fn partition_by_area(items: &[NormalizedItem]) -> (Vec<&NormalizedItem>, Vec<&NormalizedItem>) {
    items
        .iter()
        .partition(|item| item.area_type == AreaType::Apartment)
}

/// Group counts sorted by count descending, then key ascending.
fn count_by<'a, F>(items: &[&'a NormalizedItem], key: F) -> Vec<(&'a str, usize)>
where
    F: Fn(&'a NormalizedItem) -> &'a str,
{
    let mut map: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *map.entry(key(*item)).or_default() += 1;
    }
    let mut counts: Vec<(&str, usize)> = map.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
}

fn trade_counts(defects: &[&NormalizedItem]) -> Vec<TradeCount> {
    count_by(defects, |i| i.trade.as_str())
        .into_iter()
        .map(|(trade, defect_count)| TradeCount {
            trade: trade.to_string(),
            defect_count,
        })
        .collect()
}

fn room_counts(defects: &[&NormalizedItem]) -> Vec<RoomCount> {
    count_by(defects, |i| i.room.as_str())
        .into_iter()
        .map(|(room, defect_count)| RoomCount {
            room: room.to_string(),
            defect_count,
        })
        .collect()
}

fn unit_counts(defects: &[&NormalizedItem]) -> Vec<UnitCount> {
    count_by(defects, |i| i.unit.as_str())
        .into_iter()
        .map(|(unit, defect_count)| UnitCount {
            unit: unit.to_string(),
            defect_count,
        })
        .collect()
}

fn unit_trade_counts(defects: &[&NormalizedItem]) -> Vec<UnitTradeCount> {
    let mut map: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for d in defects {
        *map.entry((d.unit.as_str(), d.trade.as_str())).or_default() += 1;
    }
    map.into_iter()
        .map(|((unit, trade), defect_count)| UnitTradeCount {
            unit: unit.to_string(),
            trade: trade.to_string(),
            defect_count,
        })
        .collect()
}

fn room_component_counts(defects: &[&NormalizedItem]) -> Vec<RoomComponentCount> {
    let mut map: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for d in defects {
        *map.entry((d.room.as_str(), d.component.as_str())).or_default() += 1;
    }
    let mut rows: Vec<RoomComponentCount> = map
        .into_iter()
        .map(|((room, component), defect_count)| RoomComponentCount {
            room: room.to_string(),
            component: component.to_string(),
            defect_count,
        })
        .collect();
    // stable sort keeps the (room, component) order among equal counts
    rows.sort_by(|a, b| b.defect_count.cmp(&a.defect_count));
    rows
}

fn component_details(defects: &[&NormalizedItem]) -> Vec<ComponentDetailRow> {
    let mut map: BTreeMap<(&str, &str, &str), BTreeSet<&str>> = BTreeMap::new();
    for d in defects {
        map.entry((d.trade.as_str(), d.room.as_str(), d.component.as_str()))
            .or_default()
            .insert(d.unit.as_str());
    }
    map.into_iter()
        .map(|((trade, room, component), units)| ComponentDetailRow {
            trade: trade.to_string(),
            room: room.to_string(),
            component: component.to_string(),
            units_with_defects: units.into_iter().collect::<Vec<_>>().join(", "),
        })
        .collect()
}

fn urgent_rows(defects: &[&NormalizedItem]) -> Vec<UrgentDefectRow> {
    defects
        .iter()
        .filter(|d| d.urgency == Urgency::Urgent)
        .map(|d| UrgentDefectRow {
            unit: d.unit.clone(),
            room: d.room.clone(),
            component: d.component.clone(),
            trade: d.trade.clone(),
            planned_completion: d.planned_completion,
        })
        .collect()
}

fn planned_rows<P>(defects: &[&NormalizedItem], in_window: P) -> Vec<PlannedWorkRow>
where
    P: Fn(NaiveDateTime) -> bool,
{
    defects
        .iter()
        .filter(|d| in_window(d.planned_completion))
        .map(|d| PlannedWorkRow {
            unit: d.unit.clone(),
            room: d.room.clone(),
            component: d.component.clone(),
            trade: d.trade.clone(),
            urgency: d.urgency,
            planned_completion: d.planned_completion,
        })
        .collect()
}

/// Turns classified items into the metrics snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    pub now: NaiveDateTime,
    pub readiness: ReadinessThresholds,
    pub windows: PlanningWindows,
}

impl Aggregator {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            readiness: ReadinessThresholds::default(),
            windows: PlanningWindows::default(),
        }
    }

    pub fn compute(&self, items: &[NormalizedItem], building: &BuildingInfo) -> Metrics {
        let (apartments, common) = partition_by_area(items);
        let defects: Vec<&NormalizedItem> =
            apartments.iter().copied().filter(|i| i.is_defect()).collect();
        let common_defects: Vec<&NormalizedItem> =
            common.iter().copied().filter(|i| i.is_defect()).collect();

        // every apartment unit is bucketed, including units with no defects
        let mut per_unit: HashMap<&str, usize> = HashMap::new();
        for d in &defects {
            *per_unit.entry(d.unit.as_str()).or_default() += 1;
        }
        let all_units: BTreeSet<&str> = apartments.iter().map(|i| i.unit.as_str()).collect();
        let mut buckets: HashMap<Readiness, usize> = HashMap::new();
        for unit in &all_units {
            let n = per_unit.get(unit).copied().unwrap_or(0);
            *buckets.entry(self.readiness.bucket(n)).or_default() += 1;
        }
        let bucket = |r: Readiness| buckets.get(&r).copied().unwrap_or(0);
        let total_units = all_units.len();
        let ready_units = bucket(Readiness::Ready);
        let minor_work_units = bucket(Readiness::MinorWork);
        let major_work_units = bucket(Readiness::MajorWork);
        let extensive_work_units = bucket(Readiness::ExtensiveWork);

        let unit_types: BTreeSet<&str> = apartments.iter().map(|i| i.unit_type.as_str()).collect();

        let near = self.now + Duration::days(self.windows.near_days);
        let far = self.now + Duration::days(self.windows.far_days);
        let planned_work_2weeks_table = planned_rows(&defects, |p| p <= near);
        let planned_work_month_table = planned_rows(&defects, |p| p > near && p <= far);

        let urgent_defects_table = urgent_rows(&defects);
        let common_urgent_defects_table = urgent_rows(&common_defects);
        let common_rooms: BTreeSet<&str> = common.iter().map(|i| i.room.as_str()).collect();

        Metrics {
            building_name: building.name.clone(),
            address: building.address.clone(),
            inspection_date: building.inspection_date.clone(),
            unit_types_str: unit_types.into_iter().collect::<Vec<_>>().join(", "),

            total_units,
            total_inspections: apartments.len(),
            total_defects: defects.len(),
            defect_rate: percentage(defects.len(), apartments.len()),
            avg_defects_per_unit: defects.len() as f64 / total_units.max(1) as f64,

            ready_units,
            minor_work_units,
            major_work_units,
            extensive_work_units,
            ready_pct: percentage(ready_units, total_units),
            minor_pct: percentage(minor_work_units, total_units),
            major_pct: percentage(major_work_units, total_units),
            extensive_pct: percentage(extensive_work_units, total_units),

            urgent_defects: urgent_defects_table.len(),
            high_priority_defects: defects
                .iter()
                .filter(|d| d.urgency == Urgency::HighPriority)
                .count(),
            planned_work_2weeks: planned_work_2weeks_table.len(),
            planned_work_month: planned_work_month_table.len(),

            common_total_defects: common_defects.len(),
            common_urgent_defects: common_urgent_defects_table.len(),
            common_areas_count: common_rooms.len(),

            summary_trade: trade_counts(&defects),
            summary_unit: unit_counts(&defects),
            summary_room: room_counts(&defects),
            summary_unit_trade: unit_trade_counts(&defects),
            summary_room_comp: room_component_counts(&defects),
            urgent_defects_table,
            planned_work_2weeks_table,
            planned_work_month_table,
            component_details_summary: component_details(&defects),

            common_summary_trade: trade_counts(&common_defects),
            common_summary_room: room_counts(&common_defects),
            common_urgent_defects_table,
        }
    }
}

/// Open defects of one unit, most urgent and soonest first. The unit is
/// matched trimmed and case-insensitively.
pub fn lookup_unit_defects(items: &[NormalizedItem], unit: &str) -> Vec<UnitDefectRow> {
    let wanted = unit.trim().to_lowercase();
    let mut hits: Vec<&NormalizedItem> = items
        .iter()
        .filter(|i| i.is_defect() && i.unit.trim().to_lowercase() == wanted)
        .collect();
    hits.sort_by(|a, b| {
        a.urgency
            .rank()
            .cmp(&b.urgency.rank())
            .then_with(|| a.planned_completion.cmp(&b.planned_completion))
    });
    hits.into_iter()
        .map(|i| UnitDefectRow {
            room: i.room.clone(),
            component: i.component.clone(),
            trade: i.trade.clone(),
            urgency: i.urgency,
            planned_completion: i.planned_completion.format("%Y-%m-%d").to_string(),
        })
        .collect()
}
