use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wear tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WearTier {
    FactoryNew,
    MinimalWear,
    FieldTested,
    WellWorn,
    BattleScarred,
}

impl WearTier {
    /// Enumeration order doubles as the tie-break when a name matches more than one phrase.
    pub const ALL: [WearTier; 5] = [
        WearTier::FactoryNew,
        WearTier::MinimalWear,
        WearTier::FieldTested,
        WearTier::WellWorn,
        WearTier::BattleScarred,
    ];

    /// Phrase as it appears inside market listing names.
    pub fn phrase(self) -> &'static str {
        match self {
            WearTier::FactoryNew => "Factory New",
            WearTier::MinimalWear => "Minimal Wear",
            WearTier::FieldTested => "Field-Tested",
            WearTier::WellWorn => "Well-Worn",
            WearTier::BattleScarred => "Battle-Scarred",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            WearTier::FactoryNew => "fn",
            WearTier::MinimalWear => "mw",
            WearTier::FieldTested => "ft",
            WearTier::WellWorn => "ww",
            WearTier::BattleScarred => "bs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WearTier::FactoryNew => "FN",
            WearTier::MinimalWear => "MW",
            WearTier::FieldTested => "FT",
            WearTier::WellWorn => "WW",
            WearTier::BattleScarred => "BS",
        }
    }
}

impl std::fmt::Display for WearTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

impl FromStr for WearTier {
    type Err = String;

    /// Accepts the short code, the label, or the full phrase, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        WearTier::ALL
            .into_iter()
            .find(|t| {
                s.eq_ignore_ascii_case(t.code())
                    || s.eq_ignore_ascii_case(t.phrase())
                    || s.eq_ignore_ascii_case(&t.phrase().replace('-', " "))
            })
            .ok_or_else(|| format!("unknown wear tier '{s}' (expected one of fn, mw, ft, ww, bs)"))
    }
}

// ---------------------------------------------------------------------------
// Skin listing (canonical shape, produced by the boundary adapter)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinListing {
    /// Raw market name, e.g. `StatTrak™ M4A4 | Howl (Factory New)`.
    pub name: String,
    /// Text shown on the card, e.g. `$12.34`.
    pub price_text: String,
    /// Dollar value when the backend sent one or the text parses as one.
    pub price: Option<f64>,
    pub listings: Option<u64>,
    pub icon_url: Option<String>,
    pub market_url: Option<String>,
}

impl SkinListing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub tiers: BTreeSet<WearTier>,
    pub stattrak_only: bool,
}

impl FilterState {
    pub fn new(tiers: impl IntoIterator<Item = WearTier>, stattrak_only: bool) -> Self {
        Self {
            tiers: tiers.into_iter().collect(),
            stattrak_only,
        }
    }

    /// Flip one wear checkbox. Returns whether the tier is now checked.
    pub fn toggle_tier(&mut self, tier: WearTier) -> bool {
        if self.tiers.remove(&tier) {
            false
        } else {
            self.tiers.insert(tier);
            true
        }
    }

    pub fn set_stattrak_only(&mut self, on: bool) {
        self.stattrak_only = on;
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
        self.stattrak_only = false;
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty() && !self.stattrak_only
    }
}

// ---------------------------------------------------------------------------
// Loadout side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    T,
    CT,
}

impl Side {
    pub fn toggled(self) -> Self {
        match self {
            Side::T => Side::CT,
            Side::CT => Side::T,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::T => write!(f, "T"),
            Side::CT => write!(f, "CT"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T" => Ok(Side::T),
            "CT" => Ok(Side::CT),
            other => Err(format!("unknown side '{other}' (expected T or CT)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Loadout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadoutSlot {
    Primary,
    Secondary,
    Knife,
    Gloves,
}

impl LoadoutSlot {
    pub const ALL: [LoadoutSlot; 4] = [
        LoadoutSlot::Primary,
        LoadoutSlot::Secondary,
        LoadoutSlot::Knife,
        LoadoutSlot::Gloves,
    ];

    pub fn key(self) -> &'static str {
        match self {
            LoadoutSlot::Primary => "primary",
            LoadoutSlot::Secondary => "secondary",
            LoadoutSlot::Knife => "knife",
            LoadoutSlot::Gloves => "gloves",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            LoadoutSlot::Primary | LoadoutSlot::Secondary => "🔫",
            LoadoutSlot::Knife => "🔪",
            LoadoutSlot::Gloves => "🧤",
        }
    }

    /// Section title; the weapon slots list the side's typical guns.
    pub fn title(self, side: Side) -> &'static str {
        match (self, side) {
            (LoadoutSlot::Primary, Side::T) => "Primary — AK-47 / SG 553 / Galil AR",
            (LoadoutSlot::Primary, Side::CT) => "Primary — M4A4 / M4A1-S / AUG",
            (LoadoutSlot::Secondary, Side::T) => "Secondary — Glock-18 / Tec-9 / Deagle",
            (LoadoutSlot::Secondary, Side::CT) => "Secondary — USP-S / P2000 / Five-SeveN",
            (LoadoutSlot::Knife, _) => "Knife",
            (LoadoutSlot::Gloves, _) => "Gloves",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadoutRequest {
    pub side: Side,
    pub weapons_budget: f64,
    pub knife_budget: f64,
    pub gloves_budget: f64,
}

impl LoadoutRequest {
    pub fn total(&self) -> f64 {
        self.weapons_budget + self.knife_budget + self.gloves_budget
    }

    /// Budget shown on a slot section. Primary and secondary split the weapons budget.
    pub fn slot_budget(&self, slot: LoadoutSlot) -> f64 {
        match slot {
            LoadoutSlot::Primary | LoadoutSlot::Secondary => self.weapons_budget / 2.0,
            LoadoutSlot::Knife => self.knife_budget,
            LoadoutSlot::Gloves => self.gloves_budget,
        }
    }
}

/// Server-chosen options per slot. `None` means the backend omitted the slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loadout {
    pub primary: Option<Vec<SkinListing>>,
    pub secondary: Option<Vec<SkinListing>>,
    pub knife: Option<Vec<SkinListing>>,
    pub gloves: Option<Vec<SkinListing>>,
}

impl Loadout {
    pub fn slot(&self, slot: LoadoutSlot) -> Option<&[SkinListing]> {
        match slot {
            LoadoutSlot::Primary => self.primary.as_deref(),
            LoadoutSlot::Secondary => self.secondary.as_deref(),
            LoadoutSlot::Knife => self.knife.as_deref(),
            LoadoutSlot::Gloves => self.gloves.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Budget optimizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetReport {
    pub skins: Vec<SkinListing>,
    pub budget: f64,
    pub total_spent: Option<f64>,
    pub remaining: Option<f64>,
}
