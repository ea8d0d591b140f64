//! Listing-name parsing: wear tier, StatTrak flag, and the display base name.
//!
//! Market names look like `StatTrak™ M4A4 | Howl (Factory New)`. The wear tier
//! is the parenthetical suffix and StatTrak is a name prefix; the card shows
//! the name with both removed.

use crate::types::WearTier;

/// Prefix the market puts in front of StatTrak variants.
pub const STATTRAK_PREFIX: &str = "StatTrak™";

/// Marker searched for when deciding whether a listing is a StatTrak variant.
pub const STATTRAK_MARKER: &str = "StatTrak";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub tier: Option<WearTier>,
    pub base_name: String,
    pub stattrak: bool,
}

pub fn parse(raw: &str) -> ParsedName {
    ParsedName {
        tier: detect_wear(raw),
        base_name: base_name(raw),
        stattrak: is_stattrak(raw),
    }
}

/// First tier (in `WearTier::ALL` order) whose phrase occurs anywhere in the name.
pub fn detect_wear(raw: &str) -> Option<WearTier> {
    WearTier::ALL.into_iter().find(|t| raw.contains(t.phrase()))
}

/// Checked on the raw name, independent of prefix stripping.
pub fn is_stattrak(raw: &str) -> bool {
    raw.contains(STATTRAK_MARKER)
}

/// Name with every `" (<tier phrase>)"` and a leading `StatTrak™ ` removed.
///
/// Idempotent: stripping runs to a fixpoint, so a suffix exposed by an earlier
/// removal is removed too.
pub fn base_name(raw: &str) -> String {
    let mut name = raw.to_string();

    loop {
        let mut changed = false;
        for tier in WearTier::ALL {
            let needle = format!("({})", tier.phrase());
            while let Some(pos) = name.find(&needle) {
                // whitespace in front of the parenthesis goes with it
                let start = name[..pos].trim_end().len();
                name.replace_range(start..pos + needle.len(), "");
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut rest = name.as_str();
    while let Some(stripped) = rest.strip_prefix(STATTRAK_PREFIX) {
        rest = stripped.trim_start();
    }
    rest.to_string()
}
