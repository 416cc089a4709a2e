//! Company identifier normalization.
//!
//! Upstream collectors write the same company under two surface forms: the
//! plain ticker (`AAPL`) and a dollar-prefixed variant (`$AAPL`). Both
//! denote one logical entity. Every comparison and query site goes through
//! these helpers instead of repeating the alternation inline.

/// Strips the `$` surface form down to the canonical identifier.
///
/// Only a single leading `$` is recognized; anything else passes through
/// unchanged.
pub fn canonical(id: &str) -> &str {
    id.strip_prefix('$').unwrap_or(id)
}

/// Both surface forms of an identifier, canonical form first.
///
/// Used to build query filters that match either spelling of the company.
pub fn aliases(id: &str) -> [String; 2] {
    let canon = canonical(id);
    [canon.to_owned(), format!("${canon}")]
}
