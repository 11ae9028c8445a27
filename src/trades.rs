// Room/component → trade lookup
//
// The mapping is edited outside the pipeline and only read here. Pairs
// without an entry resolve to `UNKNOWN_TRADE` so that every inspection
// item keeps a trade.
use crate::types::TradeMappingEntry;
use std::collections::HashMap;

pub const UNKNOWN_TRADE: &str = "Unknown Trade";

#[derive(Debug, Clone, Default)]
pub struct TradeMapping {
    entries: Vec<TradeMappingEntry>,
    index: HashMap<String, HashMap<String, usize>>,
}

impl TradeMapping {
    /// Build the lookup. A repeated (room, component) pair keeps its first
    /// trade.
    pub fn from_entries(entries: Vec<TradeMappingEntry>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut index: HashMap<String, HashMap<String, usize>> = HashMap::new();
        let mut duplicates = 0usize;
        for entry in entries {
            let by_component = index.entry(entry.room.clone()).or_default();
            if by_component.contains_key(&entry.component) {
                duplicates += 1;
                continue;
            }
            by_component.insert(entry.component.clone(), kept.len());
            kept.push(entry);
        }
        if duplicates > 0 {
            log::warn!("Ignored {} duplicate trade mapping entries", duplicates);
        }
        Self {
            entries: kept,
            index,
        }
    }

    pub fn entries(&self) -> &[TradeMappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, room: &str, component: &str) -> Option<&str> {
        let i = *self.index.get(room)?.get(component)?;
        Some(self.entries[i].trade.as_str())
    }

    /// Left-join semantics: never fails, unmapped pairs get `Unknown Trade`.
    pub fn resolve(&self, room: &str, component: &str) -> &str {
        self.get(room, component).unwrap_or(UNKNOWN_TRADE)
    }
}

const DEFAULT_MAPPING: &[(&str, &str, &str)] = &[
    ("Kitchen", "Cabinets", "Carpentry & Joinery"),
    ("Kitchen", "Benchtop", "Stone & Tiling"),
    ("Kitchen", "Splashback", "Tiling"),
    ("Kitchen", "Appliances", "Electrical"),
    ("Kitchen", "Plumbing", "Plumbing"),
    ("Kitchen", "Lighting", "Electrical"),
    ("Kitchen", "Flooring", "Flooring"),
    ("Kitchen", "Walls", "Painting"),
    ("Kitchen", "Ceiling", "Painting"),
    ("Bathroom", "Tiles", "Tiling"),
    ("Bathroom", "Fixtures", "Plumbing"),
    ("Bathroom", "Vanity", "Carpentry & Joinery"),
    ("Bathroom", "Mirror", "Glazing"),
    ("Bathroom", "Lighting", "Electrical"),
    ("Bathroom", "Exhaust Fan", "Electrical"),
    ("Bathroom", "Waterproofing", "Waterproofing"),
    ("Bathroom", "Shower Screen", "Glazing"),
    ("Bedroom", "Flooring", "Flooring"),
    ("Bedroom", "Walls", "Painting"),
    ("Bedroom", "Ceiling", "Painting"),
    ("Bedroom", "Windows", "Glazing"),
    ("Bedroom", "Doors", "Doors"),
    ("Bedroom", "Wardrobes", "Carpentry & Joinery"),
    ("Bedroom", "Lighting", "Electrical"),
    ("Bedroom", "Power Points", "Electrical"),
    ("Living", "Flooring", "Flooring"),
    ("Living", "Walls", "Painting"),
    ("Living", "Ceiling", "Painting"),
    ("Living", "Windows", "Glazing"),
    ("Living", "Doors", "Doors"),
    ("Living", "Lighting", "Electrical"),
    ("Living", "Power Points", "Electrical"),
    ("Living", "Air Conditioning", "HVAC"),
    ("Laundry", "Cabinets", "Carpentry & Joinery"),
    ("Laundry", "Benchtop", "Stone & Tiling"),
    ("Laundry", "Plumbing", "Plumbing"),
    ("Laundry", "Flooring", "Flooring"),
    ("Laundry", "Walls", "Painting"),
    ("Laundry", "Lighting", "Electrical"),
    ("External", "Balcony", "Structural"),
    ("External", "Deck", "Carpentry & Joinery"),
    ("External", "Facade", "External Cladding"),
    ("External", "Roof", "Roofing"),
    ("External", "Gutters", "Roofing"),
    ("External", "Driveway", "Concreting"),
    ("External", "Landscaping", "Landscaping"),
    ("General", "Security System", "Security Systems"),
    ("General", "Intercom", "Communications"),
    ("General", "Fire Safety", "Fire Safety"),
    ("General", "Ventilation", "HVAC"),
];

/// Starter mapping used until an edited one has been saved.
pub fn default_trade_mapping() -> TradeMapping {
    TradeMapping::from_entries(
        DEFAULT_MAPPING
            .iter()
            .map(|(room, component, trade)| TradeMappingEntry::new(room, component, trade))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_pair_is_unknown_trade() {
        let mapping = default_trade_mapping();
        assert_eq!(mapping.resolve("Balcony", "Railing"), UNKNOWN_TRADE);
        assert_eq!(mapping.get("Balcony", "Railing"), None);
    }

    #[test]
    fn test_join_is_exact_on_room_and_component() {
        let mapping = default_trade_mapping();
        assert_eq!(mapping.resolve("Bathroom", "Mirror"), "Glazing");
        assert_eq!(mapping.resolve("bathroom", "Mirror"), UNKNOWN_TRADE);
        assert_eq!(mapping.resolve("Kitchen", "Mirror"), UNKNOWN_TRADE);
    }

    #[test]
    fn test_duplicate_pairs_keep_first_trade() {
        let mapping = TradeMapping::from_entries(vec![
            TradeMappingEntry::new("Kitchen", "Sink", "Plumbing"),
            TradeMappingEntry::new("Kitchen", "Sink", "Joinery"),
            TradeMappingEntry::new("Kitchen", "Tap", "Plumbing"),
        ]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.resolve("Kitchen", "Sink"), "Plumbing");
    }

    #[test]
    fn test_default_mapping_is_unique() {
        let mapping = default_trade_mapping();
        assert_eq!(mapping.len(), DEFAULT_MAPPING.len());
    }
}
