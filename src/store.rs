// Persistence seam
//
// The pipeline only needs to load and save its trade mapping and to save
// (and later reload) the result of a run. `FileStore` keeps those as
// plain files in one directory.
use crate::error::Result;
use crate::loader::read_trade_mapping;
use crate::output::{write_csv, write_json};
use crate::trades::{default_trade_mapping, TradeMapping};
use crate::types::{Metrics, NormalizedItem};
use std::path::{Path, PathBuf};

pub const TRADE_MAPPING_FILE: &str = "trade_mapping.csv";
pub const ITEMS_FILE: &str = "inspection_items.csv";
pub const METRICS_FILE: &str = "metrics.json";

/// A previously saved run.
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub items: Vec<NormalizedItem>,
    pub metrics: Metrics,
}

pub trait InspectionStore {
    fn load_trade_mapping(&self) -> Result<TradeMapping>;
    fn save_trade_mapping(&self, mapping: &TradeMapping) -> Result<()>;
    fn save_run(&self, items: &[NormalizedItem], metrics: &Metrics) -> Result<()>;
    fn load_run(&self) -> Result<Option<StoredRun>>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl InspectionStore for FileStore {
    /// Falls back to the built-in mapping until one has been saved.
    fn load_trade_mapping(&self) -> Result<TradeMapping> {
        let path = self.path(TRADE_MAPPING_FILE);
        if !path.exists() {
            log::info!("No saved trade mapping, using the default mapping");
            return Ok(default_trade_mapping());
        }
        let file = std::fs::File::open(&path)?;
        let mapping = TradeMapping::from_entries(read_trade_mapping(file)?);
        log::debug!("Loaded {} trade mapping entries", mapping.len());
        Ok(mapping)
    }

    fn save_trade_mapping(&self, mapping: &TradeMapping) -> Result<()> {
        write_csv(self.path(TRADE_MAPPING_FILE), mapping.entries())
    }

    fn save_run(&self, items: &[NormalizedItem], metrics: &Metrics) -> Result<()> {
        write_csv(self.path(ITEMS_FILE), items)?;
        write_json(self.path(METRICS_FILE), metrics)?;
        log::info!("Saved {} items to {}", items.len(), self.dir.display());
        Ok(())
    }

    fn load_run(&self) -> Result<Option<StoredRun>> {
        let items_path = self.path(ITEMS_FILE);
        let metrics_path = self.path(METRICS_FILE);
        if !items_path.exists() || !metrics_path.exists() {
            return Ok(None);
        }
        let mut rdr = csv::Reader::from_path(&items_path)?;
        let items = rdr
            .deserialize::<NormalizedItem>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let metrics: Metrics = serde_json::from_str(&std::fs::read_to_string(&metrics_path)?)?;
        Ok(Some(StoredRun { items, metrics }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AreaType, StatusClass, TradeMappingEntry, Urgency};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_mapping_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let mapping = store.load_trade_mapping().unwrap();
        assert_eq!(mapping.len(), default_trade_mapping().len());
        assert!(store.load_run().unwrap().is_none());
    }

    #[test]
    fn test_edited_mapping_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let mapping = TradeMapping::from_entries(vec![
            TradeMappingEntry::new("Balcony", "Railing", "Metalwork"),
            TradeMappingEntry::new("Kitchen", "Sink", "Plumbing"),
        ]);
        store.save_trade_mapping(&mapping).unwrap();
        let loaded = store.load_trade_mapping().unwrap();
        assert_eq!(loaded.entries(), mapping.entries());
        assert_eq!(loaded.resolve("Balcony", "Railing"), "Metalwork");
    }

    #[test]
    fn test_saved_run_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("runs")).unwrap();
        let item = NormalizedItem {
            unit: "101".into(),
            unit_type: "2 Bed Apartment".into(),
            room: "Bathroom".into(),
            component: "Mirror".into(),
            status_class: StatusClass::NotOk,
            trade: "Glazing".into(),
            urgency: Urgency::HighPriority,
            planned_completion: NaiveDate::from_ymd_opt(2024, 3, 8)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            area_type: AreaType::Apartment,
        };
        let metrics = Metrics {
            building_name: "Tower".into(),
            total_units: 1,
            total_defects: 1,
            ..Metrics::default()
        };
        store.save_run(&[item.clone()], &metrics).unwrap();
        let run = store.load_run().unwrap().unwrap();
        assert_eq!(run.items, vec![item]);
        assert_eq!(run.metrics, metrics);
    }
}
