use chrono::NaiveDateTime;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

/// Outcome of a single checklist cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Not OK")]
    NotOk,
    #[serde(rename = "Blank")]
    Blank,
    /// Never produced by the classifier; accepted when reading saved items.
    #[serde(rename = "N/A")]
    Na,
}

impl StatusClass {
    pub fn is_defect(self) -> bool {
        self == StatusClass::NotOk
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Ok => write!(f, "OK"),
            StatusClass::NotOk => write!(f, "Not OK"),
            StatusClass::Blank => write!(f, "Blank"),
            StatusClass::Na => write!(f, "N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaType {
    #[serde(rename = "Apartment")]
    Apartment,
    #[serde(rename = "Common Area")]
    CommonArea,
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaType::Apartment => write!(f, "Apartment"),
            AreaType::CommonArea => write!(f, "Common Area"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "High Priority")]
    HighPriority,
    #[serde(rename = "Urgent")]
    Urgent,
}

impl Urgency {
    /// Sort rank used by unit lookups: most pressing first.
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Urgent => 1,
            Urgency::HighPriority => 2,
            Urgency::Normal => 3,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Normal => write!(f, "Normal"),
            Urgency::HighPriority => write!(f, "High Priority"),
            Urgency::Urgent => write!(f, "Urgent"),
        }
    }
}

pub fn display_datetime(d: &NaiveDateTime) -> String {
    d.format("%Y-%m-%d %H:%M").to_string()
}

/// One room/component observation for one unit, after classification and
/// trade resolution. The serialized column set is what exports and the
/// store rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct NormalizedItem {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "UnitType")]
    #[tabled(rename = "UnitType")]
    pub unit_type: String,
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "StatusClass")]
    #[tabled(rename = "StatusClass")]
    pub status_class: StatusClass,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "Urgency")]
    #[tabled(rename = "Urgency")]
    pub urgency: Urgency,
    #[serde(rename = "PlannedCompletion")]
    #[tabled(rename = "PlannedCompletion", display_with = "display_datetime")]
    pub planned_completion: NaiveDateTime,
    #[serde(rename = "AreaType")]
    #[tabled(rename = "AreaType")]
    pub area_type: AreaType,
}

impl NormalizedItem {
    pub fn is_defect(&self) -> bool {
        self.status_class.is_defect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct TradeMappingEntry {
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
}

impl TradeMappingEntry {
    pub fn new(room: &str, component: &str, trade: &str) -> Self {
        Self {
            room: room.to_string(),
            component: component.to_string(),
            trade: trade.to_string(),
        }
    }
}

/// Values used when the export itself does not say which building it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingDefaults {
    pub name: String,
    pub address: String,
    pub date: String,
}

impl Default for BuildingDefaults {
    fn default() -> Self {
        Self {
            name: "Unknown Building".to_string(),
            address: "Address Not Available".to_string(),
            date: "Unknown Date".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityFlag {
    pub category: String,
    pub enabled: bool,
}

/// Caller-ordered priority flags. Order decides which category wins when
/// more than one would match an item.
///
/// Serialized as a JSON object (`{"Fire Safety": true, ...}`) whose key order
/// is kept; a list of `{category, enabled}` objects is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPriorityConfig {
    flags: Vec<PriorityFlag>,
}

impl Serialize for UserPriorityConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.flags.len()))?;
        for f in &self.flags {
            map.serialize_entry(&f.category, &f.enabled)?;
        }
        map.end()
    }
}

struct PriorityVisitor;

impl<'de> Visitor<'de> for PriorityVisitor {
    type Value = UserPriorityConfig;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category names to booleans")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut config = UserPriorityConfig::new();
        while let Some((category, enabled)) = access.next_entry::<String, bool>()? {
            config.set(&category, enabled);
        }
        Ok(config)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut config = UserPriorityConfig::new();
        while let Some(flag) = access.next_element::<PriorityFlag>()? {
            config.set(&flag.category, flag.enabled);
        }
        Ok(config)
    }
}

impl<'de> Deserialize<'de> for UserPriorityConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriorityVisitor)
    }
}

impl UserPriorityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, keeping the position of an existing category.
    pub fn set(&mut self, category: &str, enabled: bool) {
        match self.flags.iter_mut().find(|f| f.category == category) {
            Some(flag) => flag.enabled = enabled,
            None => self.flags.push(PriorityFlag {
                category: category.to_string(),
                enabled,
            }),
        }
    }

    pub fn with(mut self, category: &str, enabled: bool) -> Self {
        self.set(category, enabled);
        self
    }

    pub fn is_enabled(&self, category: &str) -> bool {
        self.flags
            .iter()
            .any(|f| f.enabled && f.category == category)
    }

    pub fn enabled_categories(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|f| f.enabled)
            .map(|f| f.category.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct TradeCount {
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "DefectCount")]
    #[tabled(rename = "DefectCount")]
    pub defect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct UnitCount {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "DefectCount")]
    #[tabled(rename = "DefectCount")]
    pub defect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct RoomCount {
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "DefectCount")]
    #[tabled(rename = "DefectCount")]
    pub defect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct UnitTradeCount {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "DefectCount")]
    #[tabled(rename = "DefectCount")]
    pub defect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct RoomComponentCount {
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "DefectCount")]
    #[tabled(rename = "DefectCount")]
    pub defect_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct UrgentDefectRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "PlannedCompletion")]
    #[tabled(rename = "PlannedCompletion", display_with = "display_datetime")]
    pub planned_completion: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct PlannedWorkRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "Urgency")]
    #[tabled(rename = "Urgency")]
    pub urgency: Urgency,
    #[serde(rename = "PlannedCompletion")]
    #[tabled(rename = "PlannedCompletion", display_with = "display_datetime")]
    pub planned_completion: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct ComponentDetailRow {
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "Units with Defects")]
    #[tabled(rename = "Units with Defects")]
    pub units_with_defects: String,
}

/// Row of a single-unit defect lookup; the date is pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct UnitDefectRow {
    #[serde(rename = "Room")]
    #[tabled(rename = "Room")]
    pub room: String,
    #[serde(rename = "Component")]
    #[tabled(rename = "Component")]
    pub component: String,
    #[serde(rename = "Trade")]
    #[tabled(rename = "Trade")]
    pub trade: String,
    #[serde(rename = "Urgency")]
    #[tabled(rename = "Urgency")]
    pub urgency: Urgency,
    #[serde(rename = "PlannedCompletion")]
    #[tabled(rename = "PlannedCompletion")]
    pub planned_completion: String,
}

/// Snapshot of everything reports and dashboards read. Apartment figures
/// and common-area counters are kept apart; every table is present even
/// when it has no rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub building_name: String,
    pub address: String,
    pub inspection_date: String,
    pub unit_types_str: String,

    pub total_units: usize,
    pub total_inspections: usize,
    pub total_defects: usize,
    pub defect_rate: f64,
    pub avg_defects_per_unit: f64,

    pub ready_units: usize,
    pub minor_work_units: usize,
    pub major_work_units: usize,
    pub extensive_work_units: usize,
    pub ready_pct: f64,
    pub minor_pct: f64,
    pub major_pct: f64,
    pub extensive_pct: f64,

    pub urgent_defects: usize,
    pub high_priority_defects: usize,
    pub planned_work_2weeks: usize,
    pub planned_work_month: usize,

    pub common_total_defects: usize,
    pub common_urgent_defects: usize,
    pub common_areas_count: usize,

    pub summary_trade: Vec<TradeCount>,
    pub summary_unit: Vec<UnitCount>,
    pub summary_room: Vec<RoomCount>,
    pub summary_unit_trade: Vec<UnitTradeCount>,
    pub summary_room_comp: Vec<RoomComponentCount>,
    pub urgent_defects_table: Vec<UrgentDefectRow>,
    pub planned_work_2weeks_table: Vec<PlannedWorkRow>,
    pub planned_work_month_table: Vec<PlannedWorkRow>,
    pub component_details_summary: Vec<ComponentDetailRow>,

    pub common_summary_trade: Vec<TradeCount>,
    pub common_summary_room: Vec<RoomCount>,
    pub common_urgent_defects_table: Vec<UrgentDefectRow>,
}
