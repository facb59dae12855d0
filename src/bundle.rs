//! Builds Crouton `.crumb` records from canonical recipes.
//!
//! Ingredient and step entries each carry an `order` counter. It starts at
//! zero and grows by one per emitted entry, section headers included, so
//! every list is gap-free.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Number;
use tracing::debug;
use url::Url;

use crate::config::BundleConfig;
use crate::contract::{IdGenerator, ImageStore};
use crate::error::ConvertError;
use crate::recipe::{CanonicalRecipe, IngredientGroup, Step};
use crate::tagged::Value;
use crate::units::{QuantityType, UnitReconciler};

/// Nutrient key, label and unit suffix, in rendering order.
const NUTRITION_LINES: &[(&str, &str, &str)] = &[
    ("carbohydrate", "Kohlenhydrate", "g"),
    ("calories", "Kalorien", " kcal"),
    ("protein", "Protein", "g"),
    ("fat", "Fett", "g"),
];

const SERVING_SIZE_LABEL: &str = "Serviergröße";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRecord {
    pub uuid: String,
    pub name: String,
    pub serves: Option<Number>,
    pub default_scale: Option<Number>,
    pub duration: Option<Number>,
    pub cooking_duration: Value,
    pub web_link: Option<String>,
    // Crouton's own spelling.
    #[serde(rename = "neutritionalInfo")]
    pub nutritional_info: Option<String>,
    pub sender_name: String,
    pub source_name: Option<String>,
    pub ingredients: Vec<IngredientEntry>,
    pub steps: Vec<StepEntry>,
    pub is_public_recipe: bool,
    pub tags: Vec<String>,
    #[serde(rename = "folderIDs")]
    pub folder_ids: Vec<String>,
    /// Base64 image payloads.
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientEntry {
    pub uuid: String,
    pub order: usize,
    pub ingredient: IngredientRef,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRef {
    pub uuid: String,
    pub name: String,
}

/// A section header carries no amount at all; a measured line always has an
/// `amount` key, possibly `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quantity {
    Section {
        #[serde(rename = "quantityType")]
        quantity_type: QuantityType,
    },
    Measured {
        #[serde(rename = "quantityType")]
        quantity_type: QuantityType,
        amount: Option<Number>,
    },
}

impl Quantity {
    pub fn section() -> Self {
        Quantity::Section {
            quantity_type: QuantityType::Section,
        }
    }

    pub fn quantity_type(&self) -> QuantityType {
        match self {
            Quantity::Section { quantity_type } | Quantity::Measured { quantity_type, .. } => {
                *quantity_type
            }
        }
    }

    pub fn amount(&self) -> Option<&Number> {
        match self {
            Quantity::Section { .. } => None,
            Quantity::Measured { amount, .. } => amount.as_ref(),
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Quantity::Section { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntry {
    pub uuid: String,
    pub order: usize,
    pub is_section: bool,
    pub step: String,
}

/// Nutrition summary lines joined with `",\n"`, or `None` if every value is
/// blank (null, zero or `"0"`).
pub fn render_nutrition(
    nutrition: Option<&BTreeMap<String, Value>>,
    dishes: Option<&Number>,
) -> Option<String> {
    let nutrition = nutrition?;
    if nutrition.values().all(Value::is_blank) {
        return None;
    }

    let mut lines: Vec<String> = NUTRITION_LINES
        .iter()
        .filter_map(|(key, label, suffix)| {
            nutrition
                .get(*key)
                .filter(|value| !value.is_blank())
                .map(|value| format!("{label}: {value}{suffix}"))
        })
        .collect();
    let serves = dishes.map(Number::to_string).unwrap_or_default();
    lines.push(format!("{SERVING_SIZE_LABEL}: {serves}"));
    Some(lines.join(",\n"))
}

/// Host of the source URL without a leading `www.`, first letter upper-cased.
/// A source without a scheme is read as `https`.
pub fn source_site_name(source: &str) -> Option<String> {
    let url = Url::parse(source)
        .or_else(|_| Url::parse(&format!("https://{source}")))
        .ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut chars = host.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

pub struct BundleBuilder<'a> {
    ids: &'a dyn IdGenerator,
    store: &'a dyn ImageStore,
    config: &'a BundleConfig,
}

impl<'a> BundleBuilder<'a> {
    pub fn new(ids: &'a dyn IdGenerator, store: &'a dyn ImageStore, config: &'a BundleConfig) -> Self {
        Self { ids, store, config }
    }

    /// Convert one recipe. Unknown unit tokens are recorded in `units`.
    pub fn build(
        &self,
        recipe: &CanonicalRecipe,
        units: &mut UnitReconciler,
    ) -> Result<BundleRecord, ConvertError> {
        let ingredients = self.ingredient_entries(&recipe.ingredients, units);
        let steps = self.step_entries(&recipe.instructions);
        let images = self.embedded_images(recipe)?;

        debug!(
            id = %recipe.id,
            ingredients = ingredients.len(),
            steps = steps.len(),
            images = images.len(),
            "Built bundle"
        );

        Ok(BundleRecord {
            uuid: self.ids.next_id(),
            name: recipe.title.clone(),
            serves: recipe.dishes.clone(),
            default_scale: recipe.scaled_dishes.clone(),
            duration: None,
            cooking_duration: recipe.total_time.clone(),
            web_link: recipe.source.clone(),
            nutritional_info: render_nutrition(recipe.nutrition.as_ref(), recipe.dishes.as_ref()),
            sender_name: self.config.sender_name.clone(),
            source_name: recipe.source.as_deref().and_then(source_site_name),
            ingredients,
            steps,
            is_public_recipe: false,
            tags: if self.config.export_tags {
                recipe.tags.clone()
            } else {
                Vec::new()
            },
            folder_ids: Vec::new(),
            images,
        })
    }

    fn ingredient_entries(
        &self,
        groups: &[IngredientGroup],
        units: &mut UnitReconciler,
    ) -> Vec<IngredientEntry> {
        // Group titles only become sections when there are several groups.
        let show_titles = groups.len() > 1;
        let mut entries = Vec::new();

        for group in groups {
            if let Some(title) = group.title.as_ref().filter(|_| show_titles) {
                entries.push(self.ingredient_entry(entries.len(), title.clone(), Quantity::section()));
            }
            for ingredient in &group.ingredients {
                let resolved = units.resolve_ingredient(&ingredient.name, ingredient.unit.as_deref());
                let quantity = Quantity::Measured {
                    quantity_type: resolved.quantity_type,
                    amount: ingredient.amount.clone(),
                };
                // A non-numeric amount stays readable in front of the name.
                let name = match &ingredient.raw_amount {
                    Some(raw) => format!("{raw} {}", resolved.name),
                    None => resolved.name,
                };
                entries.push(self.ingredient_entry(entries.len(), name, quantity));
            }
        }
        entries
    }

    fn ingredient_entry(&self, order: usize, name: String, quantity: Quantity) -> IngredientEntry {
        IngredientEntry {
            uuid: self.ids.next_id(),
            order,
            ingredient: IngredientRef {
                uuid: self.ids.next_id(),
                name,
            },
            quantity,
        }
    }

    fn step_entries(&self, steps: &[Step]) -> Vec<StepEntry> {
        let mut entries = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            if let Some(title) = &step.title {
                let boilerplate = index == 0 && *title == self.config.default_step_title;
                if !boilerplate {
                    entries.push(self.step_entry(entries.len(), true, title));
                }
            }
            if let Some(text) = &step.text {
                entries.push(self.step_entry(entries.len(), false, text));
            }
        }
        entries
    }

    fn step_entry(&self, order: usize, is_section: bool, step: &str) -> StepEntry {
        StepEntry {
            uuid: self.ids.next_id(),
            order,
            is_section,
            step: step.to_string(),
        }
    }

    /// Cached payloads in recipe order. Images that were never fetched are
    /// left out.
    fn embedded_images(&self, recipe: &CanonicalRecipe) -> Result<Vec<String>, ConvertError> {
        recipe
            .images
            .iter()
            .filter(|image| self.store.exists(&image.id))
            .map(|image| {
                self.store.read(&image.id).map_err(|source| ConvertError::Store {
                    id: image.id.clone(),
                    source,
                })
            })
            .collect()
    }
}
