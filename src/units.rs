//! Mapping between Körbchen unit tokens and Crouton quantity types.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Crouton's quantity enumeration. `Section` marks a header row and is never
/// produced by the unit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuantityType {
    Grams,
    Kgs,
    Mills,
    Litres,
    Centiliter,
    Deciliter,
    Tablespoon,
    Teaspoon,
    Pinch,
    Bunch,
    Can,
    Cup,
    Packet,
    Bottle,
    Item,
    Section,
}

const UNIT_TABLE: &[(&str, QuantityType)] = &[
    ("g", QuantityType::Grams),
    ("kg", QuantityType::Kgs),
    ("ml", QuantityType::Mills),
    ("l", QuantityType::Litres),
    ("cl", QuantityType::Centiliter),
    ("dl", QuantityType::Deciliter),
    ("EL", QuantityType::Tablespoon),
    ("TL", QuantityType::Teaspoon),
    ("Prise(n)", QuantityType::Pinch),
    ("Bund", QuantityType::Bunch),
    ("Dose(n)", QuantityType::Can),
    ("Becher", QuantityType::Cup),
    ("Pck.", QuantityType::Packet),
    ("Pkt.", QuantityType::Packet),
    ("Flasche(n)", QuantityType::Bottle),
    ("Stück(e)", QuantityType::Item),
    ("St", QuantityType::Item),
];

/// Exact, case-sensitive table lookup.
pub fn lookup(token: &str) -> Option<QuantityType> {
    UNIT_TABLE
        .iter()
        .find(|(source, _)| *source == token)
        .map(|(_, kind)| *kind)
}

/// Outcome of resolving one ingredient's unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUnit {
    pub quantity_type: QuantityType,
    /// Display name, with an unknown unit token prepended.
    pub name: String,
}

/// Resolves unit tokens and remembers the ones the table does not know.
///
/// Each builder owns its reconciler; reconcilers from independent builders
/// are combined with [`UnitReconciler::merge`] before reporting.
#[derive(Debug, Default, Clone)]
pub struct UnitReconciler {
    unmapped: IndexSet<String>,
}

impl UnitReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target kind for a token. Unknown tokens fall back to `Item` and are
    /// recorded; a missing token is simply `Item`.
    pub fn resolve(&mut self, token: Option<&str>) -> QuantityType {
        let Some(token) = token else {
            return QuantityType::Item;
        };
        match lookup(token) {
            Some(kind) => kind,
            None => {
                if self.unmapped.insert(token.to_string()) {
                    tracing::debug!(unit = token, "Unknown unit token");
                }
                QuantityType::Item
            }
        }
    }

    /// Resolve an ingredient line. An unknown unit is kept visible by
    /// prefixing it to the ingredient name.
    pub fn resolve_ingredient(&mut self, name: &str, token: Option<&str>) -> ResolvedUnit {
        let quantity_type = self.resolve(token);
        let name = match token {
            Some(token) if lookup(token).is_none() => format!("{token} {name}"),
            _ => name.to_string(),
        };
        ResolvedUnit {
            quantity_type,
            name: name.trim().to_string(),
        }
    }

    pub fn merge(&mut self, other: UnitReconciler) {
        self.unmapped.extend(other.unmapped);
    }

    /// Distinct unknown tokens in the order they were first seen.
    pub fn unmapped(&self) -> impl Iterator<Item = &str> {
        self.unmapped.iter().map(String::as_str)
    }

    pub fn into_unmapped(self) -> Vec<String> {
        self.unmapped.into_iter().collect()
    }
}
