//! Neighborhood name normalization.
//!
//! The pipeline, applied identically to record names and lookup targets:
//! 1. Uppercase
//! 2. Strip punctuation (`.`, `,`, `;`, `'`, `"`, `` ` ``, `_`, `-`, `/`)
//! 3. Expand token abbreviations (`JD` -> `JARDIM`, `STA` -> `SANTA`, ...)
//! 4. Collapse whitespace and trim
//! 5. Look the result up in the alias table, first as-is and then with
//!    accents folded; unknown names are returned as cleaned in step 4
//!
//! Canonical names map to themselves, so normalization is idempotent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::{NameTableDefinition, NameTableError};

/// Regex to strip punctuation that never appears in canonical names.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,;'"`_/\-]+"#).expect("valid regex"));

/// A compiled alias table for one city.
#[derive(Debug, Clone)]
pub struct NameTable {
    id: String,
    city: String,
    abbreviations: BTreeMap<String, String>,
    canonical: BTreeSet<String>,
    /// Cleaned spelling (accented and folded) -> canonical name.
    lookup: BTreeMap<String, String>,
}

impl NameTable {
    /// Parses and compiles a table from its TOML definition.
    ///
    /// # Errors
    ///
    /// Returns [`NameTableError::Toml`] if the TOML is malformed, or
    /// [`NameTableError::Conflict`] if two canonical names claim the same
    /// spelling.
    pub fn from_toml(toml_str: &str) -> Result<Self, NameTableError> {
        let definition: NameTableDefinition = toml::de::from_str(toml_str)?;
        Self::from_definition(definition)
    }

    /// Compiles a table from an already-deserialized definition.
    ///
    /// # Errors
    ///
    /// Returns [`NameTableError::Conflict`] if two canonical names claim the
    /// same spelling.
    pub fn from_definition(definition: NameTableDefinition) -> Result<Self, NameTableError> {
        let abbreviations: BTreeMap<String, String> = definition
            .abbreviations
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v.to_uppercase()))
            .collect();

        let mut table = Self {
            id: definition.id,
            city: definition.city,
            abbreviations,
            canonical: BTreeSet::new(),
            lookup: BTreeMap::new(),
        };

        for entry in &definition.neighborhoods {
            let canonical = table.clean(&entry.name);
            table.canonical.insert(canonical.clone());
        }

        for entry in definition.neighborhoods {
            let canonical = table.clean(&entry.name);
            let spellings = std::iter::once(entry.name).chain(entry.aliases);
            for spelling in spellings {
                let cleaned = table.clean(&spelling);
                let folded = fold_accents(&cleaned);
                table.register(cleaned, &canonical)?;
                table.register(folded, &canonical)?;
            }
        }

        log::debug!(
            "Loaded name table '{}': {} neighborhoods, {} spellings",
            table.id,
            table.canonical.len(),
            table.lookup.len()
        );

        Ok(table)
    }

    fn register(&mut self, spelling: String, canonical: &str) -> Result<(), NameTableError> {
        // A canonical name may only ever resolve to itself
        if self.canonical.contains(&spelling) && spelling != canonical {
            return Err(NameTableError::Conflict {
                alias: spelling.clone(),
                first: spelling,
                second: canonical.to_string(),
            });
        }
        match self.lookup.get(&spelling) {
            Some(existing) if existing != canonical => Err(NameTableError::Conflict {
                alias: spelling,
                first: existing.clone(),
                second: canonical.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.lookup.insert(spelling, canonical.to_string());
                Ok(())
            }
        }
    }

    /// Returns the table identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the city this table covers.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns all canonical neighborhood names, sorted.
    #[must_use]
    pub const fn canonical_names(&self) -> &BTreeSet<String> {
        &self.canonical
    }

    /// Whether `raw` resolves to a neighborhood in this table.
    #[must_use]
    pub fn is_known(&self, raw: &str) -> bool {
        self.canonical.contains(&self.normalize(raw))
    }

    /// Normalizes a raw neighborhood name to its canonical spelling.
    ///
    /// Blank input yields an empty string, which never matches anything.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = self.clean(raw);
        if cleaned.is_empty() {
            return cleaned;
        }
        if let Some(canonical) = self.lookup.get(&cleaned) {
            return canonical.clone();
        }
        if let Some(canonical) = self.lookup.get(&fold_accents(&cleaned)) {
            return canonical.clone();
        }
        cleaned
    }

    /// Steps 1-4 of the pipeline.
    fn clean(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        let no_punct = PUNCTUATION_RE.replace_all(&upper, " ");
        let expanded: Vec<&str> = no_punct
            .split_whitespace()
            .map(|token| {
                self.abbreviations
                    .get(token)
                    .map_or(token, String::as_str)
            })
            .collect();
        expanded.join(" ")
    }
}

/// Replaces accented Latin letters with their unaccented base letter.
#[must_use]
pub fn fold_accents(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ç' => 'C',
            'ç' => 'c',
            'Ñ' => 'N',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
