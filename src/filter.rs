use crate::parser::{detect_wear, is_stattrak};
use crate::types::{FilterState, SkinListing};

/// Client-side narrowing of a fetched result set. Both predicates must pass.
/// Input order is kept; the input slice is never modified.
pub fn apply(results: &[SkinListing], filters: &FilterState) -> Vec<SkinListing> {
    results
        .iter()
        .filter(|s| matches(s, filters))
        .cloned()
        .collect()
}

pub fn matches(listing: &SkinListing, filters: &FilterState) -> bool {
    passes_tier(listing, filters) && passes_stattrak(listing, filters)
}

fn passes_tier(listing: &SkinListing, filters: &FilterState) -> bool {
    if filters.tiers.is_empty() {
        return true;
    }
    detect_wear(&listing.name).is_some_and(|t| filters.tiers.contains(&t))
}

fn passes_stattrak(listing: &SkinListing, filters: &FilterState) -> bool {
    !filters.stattrak_only || is_stattrak(&listing.name)
}
