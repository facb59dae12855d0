//! Canonical, envelope-free recipe representation.
//!
//! These types are what `recipes.json` lists and what the bundle builder
//! consumes. They are built once by the normalizer; only `cookbooks` is
//! appended to afterwards, during cookbook reconciliation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Number;

use crate::tagged::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecipe {
    pub id: String,
    pub title: String,
    pub dishes_title: Option<String>,
    pub instructions: Vec<Step>,
    pub images: Vec<ImageRef>,
    pub total_time: Value,
    pub rating: Value,
    pub dishes: Option<Number>,
    pub scaled_dishes: Option<Number>,
    pub source: Option<String>,
    /// Nutrient name to value. Blank entries are dropped; `None` when nothing
    /// is left.
    pub nutrition: Option<BTreeMap<String, Value>>,
    pub ingredients: Vec<IngredientGroup>,
    pub tags: Vec<String>,
    pub cookbooks: Vec<String>,
    pub created_at: Option<String>,
}

/// A titled (or untitled, `title == None`) run of ingredients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientGroup {
    pub title: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub amount: Option<Number>,
    /// Amount text that is not a number, such as `1/2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_amount: Option<String>,
    pub unit: Option<String>,
}

/// An instruction step. Either part may be missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Slug of the URL; doubles as the image cache key.
    pub id: String,
    pub author: Option<String>,
    pub url: String,
}

/// A decoded cookbook: a named list of recipe ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Cookbook {
    pub id: String,
    pub name: String,
    pub recipe_ids: Vec<String>,
}
