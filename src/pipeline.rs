// One pipeline run: raw export + trade mapping → items and metrics
//
// A run never fails on content. Row-shape problems are rejected when the
// `RawTable` is built, so by the time a table reaches `Pipeline::run`
// every remaining oddity has a fallback.
use crate::building::extract_building_info;
use crate::classify::Classifier;
use crate::columns::{melt, DiscoveryTier, UnitSource};
use crate::config::PipelineConfig;
use crate::loader::RawTable;
use crate::metrics::Aggregator;
use crate::schedule::CompletionScheduler;
use crate::trades::{TradeMapping, UNKNOWN_TRADE};
use crate::types::{AreaType, BuildingDefaults, Metrics, NormalizedItem, UserPriorityConfig};
use chrono::{Local, NaiveDateTime};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows: usize,
    pub inspection_columns: usize,
    pub discovery: DiscoveryTier,
    pub unit_source: UnitSource,
    pub excluded_metadata: usize,
    pub unmapped_items: usize,
}

#[derive(Debug, Clone)]
pub struct ProcessedInspection {
    pub items: Vec<NormalizedItem>,
    pub metrics: Metrics,
    pub common_area_items: Vec<NormalizedItem>,
    pub report: RunReport,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    classifier: Classifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            classifier: Classifier::new(config.rules.clone()),
        }
    }

    /// Run with every planned completion anchored at `now`.
    pub fn run(
        &self,
        raw: &RawTable,
        mapping: &TradeMapping,
        priorities: &UserPriorityConfig,
        now: NaiveDateTime,
    ) -> ProcessedInspection {
        let cfg = self.config;
        let parsed = melt(raw, &cfg.columns);
        let urgency_rules = self.classifier.urgency_rules(priorities);
        let scheduler = CompletionScheduler::new(now, cfg.schedule);

        let mut unmapped_items = 0usize;
        let items: Vec<NormalizedItem> = parsed
            .candidates
            .into_iter()
            .map(|c| {
                let area_type = self.classifier.area_type(&c.room, &c.unit);
                let status_class = self.classifier.status(c.value.as_deref());
                let trade = mapping.resolve(&c.room, &c.component);
                if trade == UNKNOWN_TRADE {
                    unmapped_items += 1;
                }
                let urgency =
                    urgency_rules.evaluate(c.value.as_deref(), &c.component, &c.room, trade);
                NormalizedItem {
                    trade: trade.to_string(),
                    planned_completion: scheduler.planned_completion(urgency),
                    unit: c.unit,
                    unit_type: c.unit_type,
                    room: c.room,
                    component: c.component,
                    status_class,
                    urgency,
                    area_type,
                }
            })
            .collect();

        let building = extract_building_info(raw, &cfg.columns, &cfg.building);
        let aggregator = Aggregator {
            now,
            readiness: cfg.readiness,
            windows: cfg.windows,
        };
        let metrics = aggregator.compute(&items, &building);
        let common_area_items: Vec<NormalizedItem> = items
            .iter()
            .filter(|i| i.area_type == AreaType::CommonArea)
            .cloned()
            .collect();

        if unmapped_items > 0 {
            log::warn!("{} items have no trade mapping", unmapped_items);
        }
        log::info!(
            "Processed {} rows into {} items: {} apartment defects across {} units, {} common-area defects",
            raw.len(),
            items.len(),
            metrics.total_defects,
            metrics.total_units,
            metrics.common_total_defects
        );

        ProcessedInspection {
            items,
            metrics,
            common_area_items,
            report: RunReport {
                rows: raw.len(),
                inspection_columns: parsed.inspection_columns,
                discovery: parsed.discovery,
                unit_source: parsed.unit_source,
                excluded_metadata: parsed.excluded_metadata,
                unmapped_items,
            },
        }
    }
}

/// Process with default settings, the given building fallbacks, and the
/// current local time as anchor.
pub fn process(
    raw: &RawTable,
    mapping: &TradeMapping,
    building: &BuildingDefaults,
    priorities: &UserPriorityConfig,
) -> ProcessedInspection {
    process_at(raw, mapping, building, priorities, Local::now().naive_local())
}

pub fn process_at(
    raw: &RawTable,
    mapping: &TradeMapping,
    building: &BuildingDefaults,
    priorities: &UserPriorityConfig,
    now: NaiveDateTime,
) -> ProcessedInspection {
    let config = PipelineConfig {
        building: building.clone(),
        ..PipelineConfig::default()
    };
    Pipeline::new(&config).run(raw, mapping, priorities, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trades::default_trade_mapping;
    use crate::types::{StatusClass, Urgency};
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn raw() -> RawTable {
        let headers = [
            "auditName",
            "Lot Details_Lot Number",
            "Pre-Settlement Inspection_Bathroom_Mirror",
            "Pre-Settlement Inspection_Kitchen_Sink",
            "Pre-Settlement Inspection_Lobby_Intercom",
        ];
        let rows = [
            ["2024-03-01/101/Tower", "101", "✗", "✓", "x"],
            ["2024-03-01/102/Tower", "102", "✓", "", "✓"],
        ];
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
    fn test_items_are_classified_and_resolved() {
        let out = process_at(
            &raw(),
            &default_trade_mapping(),
            &BuildingDefaults::default(),
            &UserPriorityConfig::new(),
            now(),
        );
        assert_eq!(out.items.len(), 6);
        let mirror = &out.items[0];
        assert_eq!(mirror.unit, "101");
        assert_eq!(mirror.trade, "Glazing");
        assert_eq!(mirror.status_class, StatusClass::NotOk);
        assert_eq!(mirror.urgency, Urgency::HighPriority);
        assert_eq!(mirror.planned_completion, now() + Duration::days(7));

        let sink_102 = &out.items[3];
        assert_eq!(sink_102.status_class, StatusClass::Blank);
        assert_eq!(sink_102.trade, UNKNOWN_TRADE);
        assert_eq!(sink_102.urgency, Urgency::Normal);

        assert_eq!(out.common_area_items.len(), 2);
        assert!(out
            .common_area_items
            .iter()
            .all(|i| i.area_type == AreaType::CommonArea));
        assert_eq!(out.metrics.building_name, "Tower");
        assert_eq!(out.metrics.common_total_defects, 1);
        assert_eq!(out.report.unmapped_items, 4);
    }

    #[test]
    fn test_priorities_flow_into_urgency() {
        let priorities = UserPriorityConfig::new().with("Security Systems", true);
        let out = process_at(
            &raw(),
            &default_trade_mapping(),
            &BuildingDefaults::default(),
            &priorities,
            now(),
        );
        let intercom = out
            .items
            .iter()
            .find(|i| i.unit == "101" && i.component == "Intercom")
            .unwrap();
        assert_eq!(intercom.urgency, Urgency::Urgent);
        assert_eq!(out.metrics.common_urgent_defects, 1);
    }
}
