//! Builders for Firestore-style export fixtures.
#![allow(dead_code)]

use crumb_convert_core::normalize::ExportRecord;
use serde_json::{json, Value as Json};

pub fn text(s: &str) -> Json {
    json!({ "stringValue": s })
}

pub fn int(n: i64) -> Json {
    json!({ "integerValue": n.to_string() })
}

pub fn null_value() -> Json {
    json!({ "nullValue": null })
}

pub fn array(values: Vec<Json>) -> Json {
    json!({ "arrayValue": { "values": values } })
}

pub fn empty_array() -> Json {
    json!({ "arrayValue": {} })
}

pub fn map(fields: Json) -> Json {
    json!({ "mapValue": { "fields": fields } })
}

pub fn document(fields: Json) -> Json {
    json!({ "document": { "fields": fields } })
}

pub fn record(fields: Json) -> ExportRecord {
    serde_json::from_value(document(fields)).expect("fixture record")
}

pub fn ingredient(name: &str, amount: Option<i64>, unit: Option<&str>) -> Json {
    map(json!({
        "product": map(json!({ "name": text(name) })),
        "amount": amount.map(int).unwrap_or_else(null_value),
        "unit": unit.map(|u| map(json!({ "name": text(u) }))).unwrap_or_else(null_value),
    }))
}

pub fn group(title: Option<&str>, ingredients: Vec<Json>) -> Json {
    map(json!({
        "title": title.map(text).unwrap_or_else(null_value),
        "ingredients": array(ingredients),
    }))
}

pub fn step(title: Option<&str>, body: Option<&str>) -> Json {
    map(json!({
        "id": text("step"),
        "title": title.map(text).unwrap_or_else(null_value),
        "text": body.map(text).unwrap_or_else(null_value),
    }))
}

pub fn image(url: &str) -> Json {
    map(json!({ "author": null_value(), "url": text(url) }))
}

/// Recipe fields with every expected key present; callers override what
/// they care about.
pub fn recipe_fields(id: &str, title: &str) -> serde_json::Map<String, Json> {
    let fields = json!({
        "id": text(id),
        "title": text(title),
        "dishesTitle": text("Portionen"),
        "instructions": empty_array(),
        "images": empty_array(),
        "totalTime": int(30),
        "rating": int(4),
        "dishes": int(2),
        "scaledDishes": int(2),
        "source": null_value(),
        "ingredientLists": empty_array(),
        "categories": empty_array(),
        "createdAt": json!({ "timestampValue": "2023-01-02T10:00:00Z" }),
    });
    match fields {
        Json::Object(map) => map,
        _ => unreachable!(),
    }
}

pub fn recipe(id: &str, title: &str, overrides: Json) -> Json {
    let mut fields = recipe_fields(id, title);
    if let Json::Object(extra) = overrides {
        fields.extend(extra);
    }
    document(Json::Object(fields))
}

pub fn cookbook(id: &str, name: &str, recipe_ids: &[&str]) -> Json {
    document(json!({
        "id": text(id),
        "name": text(name),
        "recipeIds": array(recipe_ids.iter().map(|id| text(id)).collect()),
    }))
}

/// The "Soup" recipe: one untitled group with a pinch of salt, one step.
pub fn soup(id: &str) -> Json {
    recipe(
        id,
        "Soup",
        json!({
            "ingredientLists": array(vec![group(None, vec![ingredient("Salt", Some(1), Some("Prise(n)"))])]),
            "instructions": array(vec![step(None, Some("Stir"))]),
        }),
    )
}

pub fn records(values: Vec<Json>) -> Vec<ExportRecord> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).expect("fixture record"))
        .collect()
}
