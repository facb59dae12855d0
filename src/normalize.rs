//! Turns raw Firestore export records into [`CanonicalRecipe`]s.
//!
//! Fields are decoded one at a time through [`Fields`], so a broken envelope
//! is reported with the record and field it came from. Fields the converter
//! does not read are never decoded.
//!
//! A recipe without a title is corrupt input and aborts the whole run.
//! Cookbooks referencing recipe ids that are not in the export (deleted
//! recipes) are ignored.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Number;
use tracing::{debug, error, info};

use crate::error::ConvertError;
use crate::recipe::{CanonicalRecipe, Cookbook, ImageRef, Ingredient, IngredientGroup, Step};
use crate::slug::slugify;
use crate::tagged::{decode, Value};

/// One entry of an export file: `{"document": {"name": ..., "fields": {...}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRecord {
    pub document: ExportDocument,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Field-by-field view of a document, labelled for error reporting.
struct Fields<'a> {
    record: String,
    fields: &'a serde_json::Map<String, serde_json::Value>,
}

impl<'a> Fields<'a> {
    fn new(record: String, document: &'a ExportDocument) -> Self {
        Self {
            record,
            fields: &document.fields,
        }
    }

    fn relabel(self, record: &str) -> Self {
        Self {
            record: record.to_string(),
            fields: self.fields,
        }
    }

    fn decode(&self, field: &str) -> Result<Value, ConvertError> {
        decode(self.fields.get(field)).map_err(|source| {
            error!(record = %self.record, field, error = %source, "Failed to decode field");
            ConvertError::Decode {
                record: self.record.clone(),
                field: field.to_string(),
                source,
            }
        })
    }

    fn text(&self, field: &str) -> Result<Option<String>, ConvertError> {
        Ok(self.decode(field)?.to_text())
    }

    fn number(&self, field: &str) -> Result<Option<Number>, ConvertError> {
        Ok(self.decode(field)?.as_number())
    }

    fn required_text(&self, field: &str) -> Result<String, ConvertError> {
        self.text(field)?.ok_or_else(|| self.missing(field))
    }

    fn missing(&self, field: &str) -> ConvertError {
        error!(record = %self.record, field, "Required field is missing");
        ConvertError::MissingRequiredField {
            record: self.record.clone(),
            field: field.to_string(),
        }
    }
}

fn record_label(kind: &str, index: usize, document: &ExportDocument) -> String {
    document
        .name
        .clone()
        .unwrap_or_else(|| format!("{kind} #{}", index + 1))
}

fn normalize_ingredient(record: &str, ingredient: &Value) -> Ingredient {
    let name = ingredient
        .get("product")
        .get("name")
        .to_text()
        .unwrap_or_default();
    let amount = ingredient.get("amount");
    let number = amount.as_number();
    let raw_amount = match number {
        Some(_) => None,
        None => amount.to_text(),
    };
    if let Some(raw) = &raw_amount {
        debug!(record, ingredient = %name, amount = %raw, "Amount is not numeric, keeping its text");
    }
    Ingredient {
        name,
        amount: number,
        raw_amount,
        unit: ingredient.get("unit").get("name").to_text(),
    }
}

/// Decode a single recipe record.
pub fn normalize_recipe(index: usize, record: &ExportRecord) -> Result<CanonicalRecipe, ConvertError> {
    let document = &record.document;
    let fields = Fields::new(record_label("recipe", index, document), document);
    let id = fields.required_text("id")?;
    let fields = fields.relabel(&id);

    let title = fields.required_text("title")?;

    let instructions = fields
        .decode("instructions")?
        .as_list()
        .iter()
        .map(|step| Step {
            id: step.get("id").to_text(),
            title: step.get("title").to_text(),
            text: step.get("text").to_text(),
        })
        .collect();

    let images = fields
        .decode("images")?
        .as_list()
        .iter()
        .map(|image| {
            let url = image
                .get("url")
                .to_text()
                .ok_or_else(|| fields.missing("images.url"))?;
            Ok(ImageRef {
                id: slugify(&url),
                author: image.get("author").to_text(),
                url,
            })
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    let nutrition = fields.decode("nutrition")?.as_map().and_then(|entries| {
        let kept: std::collections::BTreeMap<_, _> = entries
            .iter()
            .filter(|(_, value)| !value.is_blank())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        (!kept.is_empty()).then_some(kept)
    });

    let ingredients = fields
        .decode("ingredientLists")?
        .as_list()
        .iter()
        .map(|group| IngredientGroup {
            title: group.get("title").to_text(),
            ingredients: group
                .get("ingredients")
                .as_list()
                .iter()
                .map(|ingredient| normalize_ingredient(&fields.record, ingredient))
                .collect(),
        })
        .collect();

    let tags = fields
        .decode("categories")?
        .as_list()
        .iter()
        .filter_map(|category| category.to_text().or_else(|| category.get("name").to_text()))
        .collect();

    let recipe = CanonicalRecipe {
        id,
        title,
        dishes_title: fields.text("dishesTitle")?,
        instructions,
        images,
        total_time: fields.decode("totalTime")?,
        rating: fields.decode("rating")?,
        dishes: fields.number("dishes")?,
        scaled_dishes: fields.number("scaledDishes")?,
        source: fields.text("source")?,
        nutrition,
        ingredients,
        tags,
        cookbooks: Vec::new(),
        created_at: fields.text("createdAt")?,
    };

    debug!(
        id = %recipe.id,
        title = %recipe.title,
        groups = recipe.ingredients.len(),
        steps = recipe.instructions.len(),
        images = recipe.images.len(),
        "Normalized recipe"
    );
    Ok(recipe)
}

/// Decode a single cookbook record.
pub fn normalize_cookbook(index: usize, record: &ExportRecord) -> Result<Cookbook, ConvertError> {
    let document = &record.document;
    let fields = Fields::new(record_label("cookbook", index, document), document);
    let id = fields.required_text("id")?;
    let fields = fields.relabel(&id);

    Ok(Cookbook {
        name: fields.required_text("name")?,
        recipe_ids: fields
            .decode("recipeIds")?
            .as_list()
            .iter()
            .filter_map(Value::to_text)
            .collect(),
        id,
    })
}

/// Append each cookbook's name to the recipes it lists, in cookbook order.
pub fn attach_cookbooks<'a>(
    recipes: &mut IndexMap<String, CanonicalRecipe>,
    cookbooks: impl IntoIterator<Item = &'a Cookbook>,
) {
    for cookbook in cookbooks {
        for recipe_id in &cookbook.recipe_ids {
            match recipes.get_mut(recipe_id) {
                Some(recipe) => recipe.cookbooks.push(cookbook.name.clone()),
                None => debug!(
                    cookbook = %cookbook.name,
                    recipe_id = %recipe_id,
                    "Cookbook references unknown recipe, ignoring"
                ),
            }
        }
    }
}

/// Decode both exports and merge cookbook memberships into the recipes.
///
/// The result is keyed by recipe id in export order. A repeated id keeps its
/// first position and takes the content of the later record.
pub fn normalize(
    recipe_records: &[ExportRecord],
    cookbook_records: &[ExportRecord],
) -> Result<IndexMap<String, CanonicalRecipe>, ConvertError> {
    let mut recipes = IndexMap::with_capacity(recipe_records.len());
    for (index, record) in recipe_records.iter().enumerate() {
        let recipe = normalize_recipe(index, record)?;
        recipes.insert(recipe.id.clone(), recipe);
    }

    let mut cookbooks: IndexMap<String, Cookbook> = IndexMap::new();
    for (index, record) in cookbook_records.iter().enumerate() {
        let cookbook = normalize_cookbook(index, record)?;
        cookbooks.insert(cookbook.id.clone(), cookbook);
    }

    attach_cookbooks(&mut recipes, cookbooks.values());

    info!(
        recipes = recipes.len(),
        cookbooks = cookbooks.len(),
        "Normalized export"
    );
    Ok(recipes)
}
