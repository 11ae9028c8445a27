// Status, area and urgency classification
//
// All keyword tables live in `ClassifierRules`. The defaults below are the
// tables used for pre-settlement exports; a config file can replace any of
// them without touching the matching logic.
use crate::types::{AreaType, StatusClass, Urgency, UserPriorityConfig};
use crate::util::contains_any;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Cell values that mean the point passed
pub const PASS_TOKENS: &[&str] = &["✓", "✔", "ok", "pass", "passed", "good", "satisfactory"];

/// Cell values that mean the point failed
pub const FAIL_TOKENS: &[&str] = &["✗", "✘", "x", "fail", "failed", "not ok", "defect", "issue"];

/// Room names that identify shared building spaces
pub const COMMON_AREA_ROOMS: &[&str] = &[
    "lobby",
    "foyer",
    "entrance",
    "reception",
    "mailroom",
    "mail room",
    "corridor",
    "hallway",
    "staircase",
    "stairwell",
    "lift",
    "elevator",
    "parking",
    "garage",
    "basement",
    "storage",
    "plant room",
    "mechanical room",
    "roof",
    "rooftop",
    "balcony common",
    "common balcony",
    "terrace common",
    "laundry common",
    "common laundry",
    "gym",
    "pool",
    "spa",
    "sauna",
    "bbq area",
    "common kitchen",
    "meeting room",
    "community room",
    "fire stair",
    "fire escape",
    "emergency",
    "utility",
    "bin room",
    "loading dock",
    "loading bay",
    "common area",
    "public area",
];

/// Unit identifiers that denote a building-level audit rather than a lot
pub const COMMON_UNIT_INDICATORS: &[&str] =
    &["common", "ca", "public", "shared", "general", "building"];

/// Words in a cell value that escalate a non-priority item
pub const URGENT_VALUE_KEYWORDS: &[&str] =
    &["broken", "not working", "fail", "failed", "dangerous", "hazard"];

/// Finishes that are always worth fixing before handover
pub const HIGH_PRIORITY_COMPONENTS: &[&str] = &["mirror", "tiles", "paint", "ceiling", "walls"];

/// A user-selectable safety category and the keywords that put an item in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCategory {
    pub name: String,
    pub components: Vec<String>,
    pub rooms: Vec<String>,
    pub trades: Vec<String>,
}

impl PriorityCategory {
    fn from_static(name: &str, components: &[&str], rooms: &[&str], trades: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            components: to_owned(components),
            rooms: to_owned(rooms),
            trades: to_owned(trades),
        }
    }

    /// Arguments must already be lowercased.
    pub fn matches(&self, component: &str, room: &str, trade: &str) -> bool {
        contains_any(component, &self.components)
            || contains_any(room, &self.rooms)
            || contains_any(trade, &self.trades)
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

static DEFAULT_PRIORITY_CATEGORIES: Lazy<Vec<PriorityCategory>> = Lazy::new(|| {
    vec![
        PriorityCategory::from_static(
            "Fire Safety",
            &[
                "fire",
                "smoke",
                "fire compliance",
                "fire door",
                "fire extinguisher",
                "sprinkler",
                "fire alarm",
            ],
            &["fire stair", "fire escape", "emergency"],
            &["fire", "safety"],
        ),
        PriorityCategory::from_static(
            "Electrical Safety",
            &[
                "electrical",
                "gpo",
                "power",
                "switch",
                "light",
                "circuit",
                "wiring",
                "outlet",
            ],
            &["electrical", "switch"],
            &["electrical"],
        ),
        PriorityCategory::from_static(
            "Gas Safety",
            &["gas", "gas outlet", "gas pipe", "gas meter", "gas appliance"],
            &["gas"],
            &["gas", "plumbing"],
        ),
        PriorityCategory::from_static(
            "Security Systems",
            &[
                "security",
                "lock",
                "door lock",
                "intercom",
                "access",
                "key",
                "door handle",
                "self latching",
            ],
            &["entry", "security"],
            &["security", "doors"],
        ),
        PriorityCategory::from_static(
            "Water/Plumbing",
            &[
                "water", "plumbing", "pipe", "drain", "toilet", "shower", "sink", "tap", "drainage",
            ],
            &["bathroom", "laundry", "kitchen"],
            &["plumbing"],
        ),
        PriorityCategory::from_static(
            "Entry Doors",
            &["door", "door handle", "door lock", "self latching", "paint"],
            &["apartment entry door", "entry", "door"],
            &["doors", "painting"],
        ),
        PriorityCategory::from_static(
            "Structural",
            &[
                "structural",
                "concrete",
                "wall",
                "ceiling",
                "floor",
                "foundation",
                "beam",
            ],
            &["structural"],
            &["structural", "concrete"],
        ),
    ]
});

static DEFAULT_RULES: Lazy<ClassifierRules> = Lazy::new(|| ClassifierRules {
    pass_tokens: to_owned(PASS_TOKENS),
    fail_tokens: to_owned(FAIL_TOKENS),
    common_area_rooms: to_owned(COMMON_AREA_ROOMS),
    common_unit_indicators: to_owned(COMMON_UNIT_INDICATORS),
    priority_categories: DEFAULT_PRIORITY_CATEGORIES.clone(),
    urgent_value_keywords: to_owned(URGENT_VALUE_KEYWORDS),
    high_priority_components: to_owned(HIGH_PRIORITY_COMPONENTS),
});

/// Keyword tables driving every classification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub pass_tokens: Vec<String>,
    pub fail_tokens: Vec<String>,
    pub common_area_rooms: Vec<String>,
    pub common_unit_indicators: Vec<String>,
    pub priority_categories: Vec<PriorityCategory>,
    pub urgent_value_keywords: Vec<String>,
    pub high_priority_components: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl ClassifierRules {
    pub fn category(&self, name: &str) -> Option<&PriorityCategory> {
        self.priority_categories.iter().find(|c| c.name == name)
    }
}

/// What a rule inspects. Text fields are compared lowercased.
#[derive(Debug, Clone, Copy)]
pub enum Predicate<'a> {
    /// Component, room or trade contains one of the category keywords
    Category(&'a PriorityCategory),
    /// The raw cell value contains one of the keywords
    ValueContains(&'a [String]),
    /// The component name contains one of the keywords
    ComponentContains(&'a [String]),
}

#[derive(Debug, Clone, Copy)]
pub struct UrgencyRule<'a> {
    pub label: &'a str,
    pub predicate: Predicate<'a>,
    pub result: Urgency,
}

/// Ordered urgency rules; the first matching rule decides, `Normal` otherwise.
#[derive(Debug, Clone)]
pub struct UrgencyRuleTable<'a> {
    rules: Vec<UrgencyRule<'a>>,
}

impl<'a> UrgencyRuleTable<'a> {
    pub fn rules(&self) -> &[UrgencyRule<'a>] {
        &self.rules
    }

    pub fn evaluate(
        &self,
        value: Option<&str>,
        component: &str,
        room: &str,
        trade: &str,
    ) -> Urgency {
        let Some(value) = value else {
            return Urgency::Normal;
        };
        let value = value.trim().to_lowercase();
        let component = component.to_lowercase();
        let room = room.to_lowercase();
        let trade = trade.to_lowercase();

        self.rules
            .iter()
            .find(|rule| match rule.predicate {
                Predicate::Category(cat) => cat.matches(&component, &room, &trade),
                Predicate::ValueContains(words) => contains_any(&value, words),
                Predicate::ComponentContains(words) => contains_any(&component, words),
            })
            .map(|rule| rule.result)
            .unwrap_or(Urgency::Normal)
    }
}

/// Classifier over an injected rule set.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    rules: ClassifierRules,
}

impl Classifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    /// Unrecognized non-empty values count as defects.
    pub fn status(&self, value: Option<&str>) -> StatusClass {
        let Some(value) = value else {
            return StatusClass::Blank;
        };
        let v = value.trim().to_lowercase();
        let is = |tokens: &[String]| tokens.iter().any(|t| t.to_lowercase() == v);
        if is(self.rules.pass_tokens.as_slice()) {
            StatusClass::Ok
        } else if is(self.rules.fail_tokens.as_slice()) {
            StatusClass::NotOk
        } else if v.is_empty() {
            StatusClass::Blank
        } else {
            StatusClass::NotOk
        }
    }

    /// Room keywords are checked before unit indicators.
    pub fn area_type(&self, room: &str, unit: &str) -> AreaType {
        let room = room.to_lowercase();
        let unit = unit.to_lowercase();
        if contains_any(&room, &self.rules.common_area_rooms)
            || contains_any(&unit, &self.rules.common_unit_indicators)
        {
            AreaType::CommonArea
        } else {
            AreaType::Apartment
        }
    }

    /// Build the rule table for one run: enabled priority categories in the
    /// caller's order, then value keywords, then high-priority components.
    pub fn urgency_rules(&self, priorities: &UserPriorityConfig) -> UrgencyRuleTable<'_> {
        let mut rules = Vec::new();
        for name in priorities.enabled_categories() {
            match self.rules.category(name) {
                Some(cat) => rules.push(UrgencyRule {
                    label: cat.name.as_str(),
                    predicate: Predicate::Category(cat),
                    result: Urgency::Urgent,
                }),
                None => log::debug!("Ignoring unknown priority category '{}'", name),
            }
        }
        rules.push(UrgencyRule {
            label: "urgent value keywords",
            predicate: Predicate::ValueContains(&self.rules.urgent_value_keywords),
            result: Urgency::HighPriority,
        });
        rules.push(UrgencyRule {
            label: "high priority components",
            predicate: Predicate::ComponentContains(&self.rules.high_priority_components),
            result: Urgency::HighPriority,
        });
        UrgencyRuleTable { rules }
    }

    pub fn urgency(
        &self,
        value: Option<&str>,
        component: &str,
        room: &str,
        trade: &str,
        priorities: &UserPriorityConfig,
    ) -> Urgency {
        self.urgency_rules(priorities)
            .evaluate(value, component, room, trade)
    }
}

pub fn classify_status(value: Option<&str>) -> StatusClass {
    Classifier::default().status(value)
}

pub fn classify_area_type(room: &str, unit: &str) -> AreaType {
    Classifier::default().area_type(room, unit)
}

pub fn classify_urgency(
    value: Option<&str>,
    component: &str,
    room: &str,
    trade: &str,
    priorities: &UserPriorityConfig,
) -> Urgency {
    Classifier::default().urgency(value, component, room, trade, priorities)
}
