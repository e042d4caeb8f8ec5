use blur_core::RowUpdate;
use blur_generate::{
    GenerationError, Modifier, ModifierChain, ModifierError, ModifierRegistry,
};
use serde_json::{Value, json};

fn update(value: Value) -> RowUpdate {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn keys() -> Vec<String> {
    vec!["id".to_string()]
}

#[test]
fn chain_applies_modifiers_in_order() {
    let registry = ModifierRegistry::new();
    let chain = ModifierChain::resolve(
        &registry,
        &[
            "copy:name,display_name".to_string(),
            "uppercase:display_name".to_string(),
            "email_from_name:name,email,corp.test".to_string(),
        ],
    )
    .expect("resolve chain");
    assert_eq!(chain.len(), 3);

    let result = chain
        .apply(update(json!({"id": 7, "name": "Macey Rempel"})), &keys())
        .expect("apply chain");

    assert_eq!(result["id"], json!(7));
    assert_eq!(result["display_name"], json!("MACEY REMPEL"));
    assert_eq!(result["email"], json!("macey.rempel@corp.test"));
}

#[test]
fn email_from_name_defaults_domain() {
    let registry = ModifierRegistry::new();
    let chain = ModifierChain::resolve(&registry, &["email_from_name:name,email".to_string()])
        .expect("resolve chain");

    let result = chain
        .apply(update(json!({"id": 1, "name": "Mr. Dave O'Neil-Smith"})), &keys())
        .expect("apply chain");
    assert_eq!(result["email"], json!("mr.dave.oneil.smith@example.com"));
}

#[test]
fn unknown_modifier_fails_resolution() {
    let registry = ModifierRegistry::new();
    let result = ModifierChain::resolve(&registry, &["reverse:name".to_string()]);
    assert!(matches!(result, Err(GenerationError::UnknownModifier(name)) if name == "reverse"));
}

#[test]
fn malformed_modifier_arguments_fail_resolution() {
    let registry = ModifierRegistry::new();
    let result = ModifierChain::resolve(&registry, &["copy:name".to_string()]);
    assert!(matches!(result, Err(GenerationError::InvalidModifier { .. })));
}

#[test]
fn failure_reports_modifier_and_row_keys() {
    let registry = ModifierRegistry::new();
    let chain = ModifierChain::resolve(&registry, &["lowercase:nickname".to_string()])
        .expect("resolve chain");

    let result = chain.apply(update(json!({"id": 42, "name": "x"})), &keys());
    match result {
        Err(GenerationError::Modifier {
            modifier, keys, ..
        }) => {
            assert_eq!(modifier, "lowercase:nickname");
            assert_eq!(keys, r#"{"id":42}"#);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

struct Stamp;

impl Modifier for Stamp {
    fn modify(&self, mut update: RowUpdate) -> Result<RowUpdate, ModifierError> {
        if update.contains_key("stamped") {
            return Err(ModifierError("already stamped".to_string()));
        }
        update.insert("stamped".to_string(), Value::Bool(true));
        Ok(update)
    }
}

#[test]
fn custom_modifiers_register_by_name() {
    let mut registry = ModifierRegistry::new();
    registry.register("stamp", |_args| Ok(Box::new(Stamp) as Box<dyn Modifier>));
    assert!(registry.contains("stamp"));

    let chain = ModifierChain::resolve(&registry, &["stamp".to_string()]).expect("resolve");
    let result = chain.apply(update(json!({"id": 1})), &keys()).expect("apply");
    assert_eq!(result["stamped"], json!(true));
}

#[test]
fn empty_chain_returns_update_unchanged() {
    let chain = ModifierChain::empty();
    let original = update(json!({"id": 3, "name": "n"}));
    let result = chain.apply(original.clone(), &keys()).expect("apply");
    assert_eq!(result, original);
}

#[test]
fn rewriting_a_key_column_is_rejected() {
    let registry = ModifierRegistry::new();
    let chain = ModifierChain::resolve(&registry, &["uppercase:code".to_string()])
        .expect("resolve chain");

    let result = chain.apply(
        update(json!({"code": "ab", "owner": "X"})),
        &["code".to_string()],
    );

    match result {
        Err(GenerationError::Modifier {
            modifier,
            keys,
            message,
        }) => {
            assert_eq!(modifier, "uppercase:code");
            assert_eq!(keys, r#"{"code":"ab"}"#);
            assert!(message.contains("'code'"), "message: {message}");
        }
        other => panic!("expected modifier error, got {other:?}"),
    }
}

#[test]
fn chain_reports_the_columns_it_writes() {
    let registry = ModifierRegistry::new();
    let chain = ModifierChain::resolve(
        &registry,
        &[
            "email_from_name:name,email".to_string(),
            "copy:name,display_name".to_string(),
            "lowercase:email".to_string(),
        ],
    )
    .expect("resolve chain");

    assert_eq!(chain.targets(), vec!["display_name", "email"]);
}
