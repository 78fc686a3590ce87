use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

use crate::core::DashboardError;

pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

/// One kind of content in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardType {
    Schedule,
    Drivers,
    Constructors,
    PreviousRace,
    NextRace,
    DriverCard,
    TeamCard,
}

impl CardType {
    pub const ALL: [CardType; 7] = [
        CardType::Schedule,
        CardType::Drivers,
        CardType::Constructors,
        CardType::PreviousRace,
        CardType::NextRace,
        CardType::DriverCard,
        CardType::TeamCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Schedule => "schedule",
            CardType::Drivers => "drivers",
            CardType::Constructors => "constructors",
            CardType::PreviousRace => "previousRace",
            CardType::NextRace => "nextRace",
            CardType::DriverCard => "driverCard",
            CardType::TeamCard => "teamCard",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            CardType::Schedule => "Race Schedule",
            CardType::Drivers => "Driver Standings",
            CardType::Constructors => "Constructor Standings",
            CardType::PreviousRace => "Previous Race",
            CardType::NextRace => "Next Race",
            CardType::DriverCard => "Driver Card",
            CardType::TeamCard => "Team Card",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .iter()
            .copied()
            .find(|card| card.as_str() == s)
            .ok_or_else(|| DashboardError::UnknownCardType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(rename = "id")]
    pub card_type: CardType,
    #[serde(rename = "label")]
    pub display_label: String,
    pub enabled: bool,
}

impl CardConfig {
    pub fn new(card_type: CardType, enabled: bool) -> Self {
        Self { card_type, display_label: card_type.default_label().to_string(), enabled }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

impl Default for IntervalRange {
    fn default() -> Self {
        Self { min: 5_000, max: 60_000, default: DEFAULT_INTERVAL_MS }
    }
}

impl IntervalRange {
    /// Clamps without panicking, even for an inverted range.
    pub fn clamp(&self, value: u64) -> u64 {
        value.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizes {
    pub schedule: usize,
    pub drivers: usize,
    pub constructors: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self { schedule: 10, drivers: 11, constructors: 11 }
    }
}

impl PageSizes {
    pub fn for_card(&self, card: CardType) -> Option<usize> {
        match card {
            CardType::Schedule => Some(self.schedule),
            CardType::Drivers => Some(self.drivers),
            CardType::Constructors => Some(self.constructors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub allow_reordering: bool,
    pub allow_interval_change: bool,
    #[serde(rename = "showUserConfigMenu", alias = "showPreferenceMenu")]
    pub show_preference_menu: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self { allow_reordering: true, allow_interval_change: true, show_preference_menu: true }
    }
}

/// Operator-declared configuration served by the dashboard server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDocument {
    pub available_cards: Vec<CardConfig>,
    pub interval_range: IntervalRange,
    #[serde(rename = "itemsPerPage")]
    pub page_sizes: PageSizes,
    pub features: Features,
}

impl Default for CapabilityDocument {
    fn default() -> Self {
        Self {
            available_cards: CardType::ALL.iter().map(|card| CardConfig::new(*card, true)).collect(),
            interval_range: IntervalRange::default(),
            page_sizes: PageSizes::default(),
            features: Features::default(),
        }
    }
}

impl CapabilityDocument {
    /// Enabled card types in declared order, without duplicates.
    pub fn enabled_cards(&self) -> Vec<CardType> {
        let mut enabled = Vec::new();
        for card in self.available_cards.iter().filter(|c| c.enabled) {
            if !enabled.contains(&card.card_type) {
                enabled.push(card.card_type);
            }
        }
        enabled
    }

    pub fn is_enabled(&self, card: CardType) -> bool {
        self.available_cards.iter().any(|c| c.card_type == card && c.enabled)
    }

    pub fn label_for(&self, card: CardType) -> &str {
        self.available_cards
            .iter()
            .find(|c| c.card_type == card)
            .map(|c| c.display_label.as_str())
            .unwrap_or_else(|| card.default_label())
    }

    /// Strict check used before an operator update is stored.
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.available_cards.is_empty() {
            return Err(DashboardError::InvalidCapabilities("availableCards is empty".into()));
        }

        for (index, card) in self.available_cards.iter().enumerate() {
            if self.available_cards[..index].iter().any(|c| c.card_type == card.card_type) {
                return Err(DashboardError::InvalidCapabilities(format!(
                    "card '{}' is declared more than once",
                    card.card_type
                )));
            }
        }

        let range = &self.interval_range;
        if range.min > range.max {
            return Err(DashboardError::InvalidCapabilities(format!(
                "intervalRange.min ({}) is greater than intervalRange.max ({})",
                range.min, range.max
            )));
        }
        if range.default < range.min || range.default > range.max {
            return Err(DashboardError::InvalidCapabilities(format!(
                "intervalRange.default ({}) is outside {}..={}",
                range.default, range.min, range.max
            )));
        }

        let sizes = &self.page_sizes;
        if sizes.schedule == 0 || sizes.drivers == 0 || sizes.constructors == 0 {
            return Err(DashboardError::InvalidCapabilities(
                "itemsPerPage values must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Repairs a fetched document instead of rejecting it. Returns one warning
    /// per correction.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen = Vec::new();
        self.available_cards.retain(|card| {
            if seen.contains(&card.card_type) {
                warnings.push(format!("duplicate card '{}' dropped", card.card_type));
                return false;
            }
            seen.push(card.card_type);
            true
        });

        let range = &mut self.interval_range;
        if range.min > range.max {
            warnings.push(format!("interval range {}..{} inverted", range.min, range.max));
            std::mem::swap(&mut range.min, &mut range.max);
        }
        let clamped_default = range.clamp(range.default);
        if clamped_default != range.default {
            warnings.push(format!(
                "default interval {} clamped to {}",
                range.default, clamped_default
            ));
            range.default = clamped_default;
        }

        let sizes = &mut self.page_sizes;
        for (name, size) in [
            ("schedule", &mut sizes.schedule),
            ("drivers", &mut sizes.drivers),
            ("constructors", &mut sizes.constructors),
        ] {
            if *size == 0 {
                warnings.push(format!("page size for {name} raised to 1"));
                *size = 1;
            }
        }

        warnings
    }
}

/// User-local configuration. Deserialization is lenient: unknown card names
/// are dropped and an unusable interval falls back to a number the reconciler
/// will clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDocument {
    #[serde(default, deserialize_with = "lenient_cards")]
    pub selected_cards: Vec<CardType>,
    #[serde(default, deserialize_with = "lenient_cards")]
    pub card_order: Vec<CardType>,
    #[serde(default = "default_interval", deserialize_with = "lenient_interval")]
    pub interval: u64,
    #[serde(default)]
    pub favorite_driver_number: Option<u32>,
    #[serde(default)]
    pub favorite_team: Option<String>,
}

impl PreferenceDocument {
    /// Defaults derived from a capability document: every enabled card, in
    /// declared order, at the operator's default interval.
    pub fn defaults_for(caps: &CapabilityDocument) -> Self {
        let enabled = caps.enabled_cards();
        Self {
            selected_cards: enabled.clone(),
            card_order: enabled,
            interval: caps.interval_range.default,
            favorite_driver_number: None,
            favorite_team: None,
        }
    }

    pub fn is_selected(&self, card: CardType) -> bool {
        self.selected_cards.contains(&card)
    }
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn lenient_cards<'de, D>(deserializer: D) -> Result<Vec<CardType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.iter().filter_map(|value| value.as_str()).filter_map(|s| s.parse().ok()).collect())
}

fn lenient_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let interval = match raw.as_f64() {
        Some(ms) if ms.is_finite() && ms > 0.0 => {
            if ms >= u64::MAX as f64 {
                u64::MAX
            } else {
                ms as u64
            }
        }
        Some(_) => 0,
        None => DEFAULT_INTERVAL_MS,
    };
    Ok(interval)
}
