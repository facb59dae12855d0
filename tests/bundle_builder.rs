mod common;

use std::collections::BTreeMap;

use common::*;
use crumb_convert_core::bundle::{render_nutrition, source_site_name, BundleBuilder, BundleRecord};
use crumb_convert_core::config::BundleConfig;
use crumb_convert_core::contract::{ImageStore, SequentialIds};
use crumb_convert_core::images::DirImageStore;
use crumb_convert_core::normalize::normalize_recipe;
use crumb_convert_core::recipe::CanonicalRecipe;
use crumb_convert_core::tagged::Value;
use crumb_convert_core::units::{QuantityType, UnitReconciler};
use serde_json::{json, Number};
use tempfile::tempdir;

fn canonical(fixture: serde_json::Value) -> CanonicalRecipe {
    let record = records(vec![fixture]);
    normalize_recipe(0, &record[0]).expect("fixture should normalize")
}

fn build_with(recipe: &CanonicalRecipe, store: &dyn ImageStore) -> (BundleRecord, UnitReconciler) {
    let ids = SequentialIds::new();
    let config = BundleConfig::default();
    let builder = BundleBuilder::new(&ids, store, &config);
    let mut units = UnitReconciler::new();
    let bundle = builder.build(recipe, &mut units).expect("bundle should build");
    (bundle, units)
}

fn build(recipe: &CanonicalRecipe) -> (BundleRecord, UnitReconciler) {
    let dir = tempdir().unwrap();
    let store = DirImageStore::open(dir.path()).unwrap();
    build_with(recipe, &store)
}

#[test]
fn test_soup_bundle_end_to_end() {
    let (bundle, units) = build(&canonical(soup("r1")));

    assert_eq!(bundle.name, "Soup");
    assert_eq!(bundle.ingredients.len(), 1);
    let salt = &bundle.ingredients[0];
    assert_eq!(salt.order, 0);
    assert_eq!(salt.ingredient.name, "Salt");
    assert_eq!(salt.quantity.quantity_type(), QuantityType::Pinch);
    assert_eq!(salt.quantity.amount(), Some(&Number::from(1)));

    assert_eq!(bundle.steps.len(), 1);
    assert_eq!(bundle.steps[0].order, 0);
    assert!(!bundle.steps[0].is_section);
    assert_eq!(bundle.steps[0].step, "Stir");

    assert_eq!(units.into_unmapped(), Vec::<String>::new());

    let json = serde_json::to_value(&bundle).unwrap();
    assert_eq!(
        json["ingredients"][0]["quantity"],
        json!({ "quantityType": "PINCH", "amount": 1 })
    );
    assert_eq!(json["steps"][0]["isSection"], json!(false));
    assert_eq!(json["senderName"], json!("Körbchen"));
    assert_eq!(json["duration"], json!(null));
    assert_eq!(json["folderIDs"], json!([]));
}

#[test]
fn test_single_titled_group_gets_no_section() {
    let recipe = canonical(recipe(
        "r1",
        "Cake",
        json!({ "ingredientLists": array(vec![group(
            Some("Teig"),
            vec![ingredient("Mehl", Some(500), Some("g"))],
        )]) }),
    ));
    let (bundle, _) = build(&recipe);

    assert_eq!(bundle.ingredients.len(), 1);
    assert!(!bundle.ingredients[0].quantity.is_section());
    assert_eq!(bundle.ingredients[0].ingredient.name, "Mehl");
}

#[test]
fn test_multiple_titled_groups_get_sections() {
    let recipe = canonical(recipe(
        "r1",
        "Cake",
        json!({ "ingredientLists": array(vec![
            group(Some("Teig"), vec![
                ingredient("Mehl", Some(500), Some("g")),
                ingredient("Milch", Some(250), Some("ml")),
            ]),
            group(None, vec![ingredient("Ei", Some(2), None)]),
            group(Some("Guss"), vec![ingredient("Zucker", Some(100), Some("g"))]),
        ]) }),
    ));
    let (bundle, _) = build(&recipe);

    let rows: Vec<(usize, &str, QuantityType)> = bundle
        .ingredients
        .iter()
        .map(|e| (e.order, e.ingredient.name.as_str(), e.quantity.quantity_type()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (0, "Teig", QuantityType::Section),
            (1, "Mehl", QuantityType::Grams),
            (2, "Milch", QuantityType::Mills),
            (3, "Ei", QuantityType::Item),
            (4, "Guss", QuantityType::Section),
            (5, "Zucker", QuantityType::Grams),
        ]
    );

    let json = serde_json::to_value(&bundle.ingredients[0]).unwrap();
    assert_eq!(json["quantity"], json!({ "quantityType": "SECTION" }));
}

#[test]
fn test_default_first_step_title_is_suppressed() {
    let recipe = canonical(recipe(
        "r1",
        "Stew",
        json!({ "instructions": array(vec![
            step(Some("Zubereitung"), Some("Alles schneiden")),
            step(Some("Zubereitung"), Some("Kochen")),
        ]) }),
    ));
    let (bundle, _) = build(&recipe);

    let rows: Vec<(usize, bool, &str)> = bundle
        .steps
        .iter()
        .map(|s| (s.order, s.is_section, s.step.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (0, false, "Alles schneiden"),
            (1, true, "Zubereitung"),
            (2, false, "Kochen"),
        ]
    );
}

#[test]
fn test_other_first_step_titles_become_sections() {
    let recipe = canonical(recipe(
        "r1",
        "Stew",
        json!({ "instructions": array(vec![
            step(Some("Vorbereitung"), Some("Schneiden")),
            step(Some("Servieren"), None),
        ]) }),
    ));
    let (bundle, _) = build(&recipe);

    let rows: Vec<(usize, bool, &str)> = bundle
        .steps
        .iter()
        .map(|s| (s.order, s.is_section, s.step.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (0, true, "Vorbereitung"),
            (1, false, "Schneiden"),
            (2, true, "Servieren"),
        ]
    );
}

#[test]
fn test_unknown_unit_is_prefixed_and_recorded() {
    let recipe = canonical(recipe(
        "r1",
        "Pesto",
        json!({ "ingredientLists": array(vec![group(None, vec![
            ingredient("Knoblauch", Some(2), Some("Zehe(n)")),
            ingredient("Basilikum", Some(1), Some("Zehe(n)")),
        ])]) }),
    ));
    let (bundle, units) = build(&recipe);

    assert_eq!(bundle.ingredients[0].ingredient.name, "Zehe(n) Knoblauch");
    assert_eq!(bundle.ingredients[0].quantity.quantity_type(), QuantityType::Item);
    assert_eq!(bundle.ingredients[0].quantity.amount(), Some(&Number::from(2)));
    assert_eq!(units.into_unmapped(), vec!["Zehe(n)"]);
}

#[test]
fn test_non_numeric_amount_is_prefixed_to_the_name() {
    let recipe = canonical(recipe(
        "r1",
        "Pesto",
        json!({ "ingredientLists": array(vec![group(None, vec![
            map(json!({
                "product": map(json!({ "name": text("Knoblauch") })),
                "amount": text("1/2"),
                "unit": map(json!({ "name": text("Zehe(n)") })),
            })),
            map(json!({
                "product": map(json!({ "name": text("Zwiebel") })),
                "amount": text("etwas"),
                "unit": null_value(),
            })),
        ])]) }),
    ));
    let (bundle, _) = build(&recipe);

    assert_eq!(bundle.ingredients[0].ingredient.name, "1/2 Zehe(n) Knoblauch");
    assert_eq!(bundle.ingredients[0].quantity.amount(), None);
    assert_eq!(bundle.ingredients[1].ingredient.name, "etwas Zwiebel");
    assert_eq!(bundle.ingredients[1].quantity.quantity_type(), QuantityType::Item);

    let json = serde_json::to_value(&bundle.ingredients[1]).unwrap();
    assert_eq!(json["quantity"], json!({ "quantityType": "ITEM", "amount": null }));
}

#[test]
fn test_order_is_gap_free_and_ids_are_unique() {
    let recipe = canonical(recipe(
        "r1",
        "Cake",
        json!({
            "ingredientLists": array(vec![
                group(Some("A"), vec![ingredient("x", None, None)]),
                group(Some("B"), vec![ingredient("y", None, None), ingredient("z", None, None)]),
            ]),
            "instructions": array(vec![
                step(None, Some("one")),
                step(Some("Backen"), Some("two")),
                step(None, None),
                step(None, Some("three")),
            ]),
        }),
    ));
    let (bundle, _) = build(&recipe);

    let ingredient_orders: Vec<_> = bundle.ingredients.iter().map(|e| e.order).collect();
    assert_eq!(ingredient_orders, (0..5).collect::<Vec<_>>());
    let step_orders: Vec<_> = bundle.steps.iter().map(|e| e.order).collect();
    assert_eq!(step_orders, (0..4).collect::<Vec<_>>());

    let mut ids = vec![bundle.uuid.clone()];
    for entry in &bundle.ingredients {
        ids.push(entry.uuid.clone());
        ids.push(entry.ingredient.uuid.clone());
    }
    ids.extend(bundle.steps.iter().map(|s| s.uuid.clone()));
    let distinct: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(distinct.len(), ids.len());
}

#[test]
fn test_nutrition_rendering() {
    let mut nutrition = BTreeMap::new();
    nutrition.insert("fat".to_string(), Value::Double(12.5));
    nutrition.insert("calories".to_string(), Value::Text("420".into()));
    nutrition.insert("carbohydrate".to_string(), Value::Int(30));
    nutrition.insert("fiber".to_string(), Value::Int(3));

    let rendered = render_nutrition(Some(&nutrition), Some(&Number::from(4))).unwrap();
    assert_eq!(
        rendered,
        "Kohlenhydrate: 30g,\nKalorien: 420 kcal,\nFett: 12.5g,\nServiergröße: 4"
    );

    assert_eq!(render_nutrition(None, Some(&Number::from(4))), None);

    let mut blank = BTreeMap::new();
    blank.insert("fat".to_string(), Value::Null);
    assert_eq!(render_nutrition(Some(&blank), None), None);
}

#[test]
fn test_zero_nutrition_values_are_omitted() {
    let mut nutrition = BTreeMap::new();
    nutrition.insert("calories".to_string(), Value::Int(200));
    nutrition.insert("fat".to_string(), Value::Int(0));
    nutrition.insert("protein".to_string(), Value::Double(0.0));
    nutrition.insert("carbohydrate".to_string(), Value::Text("0".into()));

    assert_eq!(
        render_nutrition(Some(&nutrition), Some(&Number::from(2))).as_deref(),
        Some("Kalorien: 200 kcal,\nServiergröße: 2")
    );

    let mut zeroes = BTreeMap::new();
    zeroes.insert("fat".to_string(), Value::Int(0));
    zeroes.insert("calories".to_string(), Value::Text("0".into()));
    assert_eq!(render_nutrition(Some(&zeroes), Some(&Number::from(2))), None);
}

#[test]
fn test_source_site_name() {
    assert_eq!(
        source_site_name("https://www.chefkoch.de/rezepte/123/suppe.html").as_deref(),
        Some("Chefkoch.de")
    );
    assert_eq!(
        source_site_name("http://eatsmarter.de/rezepte").as_deref(),
        Some("Eatsmarter.de")
    );
    assert_eq!(
        source_site_name("lecker.de/rezept").as_deref(),
        Some("Lecker.de")
    );

    let (bundle, _) = build(&canonical(soup("r1")));
    assert_eq!(bundle.source_name, None);
    assert_eq!(bundle.web_link, None);
}

#[test]
fn test_only_cached_images_are_embedded() {
    let dir = tempdir().unwrap();
    let store = DirImageStore::open(dir.path()).unwrap();
    let recipe = canonical(recipe(
        "r1",
        "Soup",
        json!({ "images": array(vec![
            image("https://img.example.com/a.jpg"),
            image("https://img.example.com/missing.jpg"),
            image("https://img.example.com/b.jpg"),
        ]) }),
    ));
    store.write(&recipe.images[0].id, "QUFB").unwrap();
    store.write(&recipe.images[2].id, "QkJC").unwrap();

    let (bundle, _) = build_with(&recipe, &store);
    assert_eq!(bundle.images, vec!["QUFB", "QkJC"]);
}

#[test]
fn test_tags_are_exported_only_when_enabled() {
    let recipe = canonical(recipe(
        "r1",
        "Soup",
        json!({ "categories": array(vec![text("Suppe")]) }),
    ));
    let (bundle, _) = build(&recipe);
    assert!(bundle.tags.is_empty());

    let dir = tempdir().unwrap();
    let store = DirImageStore::open(dir.path()).unwrap();
    let ids = SequentialIds::new();
    let config = BundleConfig {
        export_tags: true,
        ..BundleConfig::default()
    };
    let bundle = BundleBuilder::new(&ids, &store, &config)
        .build(&recipe, &mut UnitReconciler::new())
        .unwrap();
    assert_eq!(bundle.tags, vec!["Suppe"]);
}
