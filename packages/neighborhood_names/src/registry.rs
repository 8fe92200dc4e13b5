//! Name table registry: loads alias tables from embedded TOML configs.
//!
//! Each `.toml` file in `packages/neighborhood_names/aliases/` is baked into
//! the binary at compile time via [`include_str!`].

use std::sync::LazyLock;

use crate::NameTable;

/// TOML configs embedded at compile time.
const ALIAS_TOMLS: &[(&str, &str)] = &[(
    "porto_alegre",
    include_str!("../aliases/porto_alegre.toml"),
)];

static DEFAULT_TABLE: LazyLock<NameTable> = LazyLock::new(|| load(ALIAS_TOMLS[0]));

fn load((name, toml): (&str, &str)) -> NameTable {
    NameTable::from_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
}

/// Returns the table used when callers don't pick one explicitly.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (a compile-time guarantee
/// since the config is embedded and covered by tests).
#[must_use]
pub fn default_table() -> &'static NameTable {
    &DEFAULT_TABLE
}

/// Returns every configured name table, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any embedded TOML is malformed.
#[must_use]
pub fn all_tables() -> Vec<NameTable> {
    ALIAS_TOMLS.iter().copied().map(load).collect()
}
