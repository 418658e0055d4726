//! Strategy chains built from TOML configuration.

use crate::common::*;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tessera::{ConfigError, StrategyStoreConfig, IDENTITY_STRATEGY_NAME, NATIVE_STRATEGY_NAME};

fn fact_chain_toml() -> String {
    format!(
        r#"
[[strategy]]
kind = "identity"
accept = ["{}"]

[[strategy]]
kind = "native"
"#,
        std::any::type_name::<Fact>()
    )
}

#[test]
fn configured_chain_routes_like_hand_built_one() {
    let mut store = StrategyStoreConfig::from_toml_str(&fact_chain_toml())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(store.names(), vec![IDENTITY_STRATEGY_NAME, NATIVE_STRATEGY_NAME]);

    let shared = fact("cfg", 1);
    let mut buf = Vec::new();
    assert_eq!(store.write_object(&mut buf, &shared).unwrap(), 0);
    assert_eq!(store.write_object(&mut buf, &object_ref(order(2))).unwrap(), 1);
    assert_eq!(store.write_object(&mut buf, &shared).unwrap(), 0);

    let _scope = TypeResolver::enter(Arc::new(resolver()));
    let mut cursor = Cursor::new(buf);
    let first = store.read_object(&mut cursor).unwrap();
    let middle = store.read_object(&mut cursor).unwrap();
    let last = store.read_object(&mut cursor).unwrap();
    assert!(ObjectIdentity::same(&first, &shared));
    assert!(ObjectIdentity::same(&last, &shared));
    assert_eq!(middle.downcast_ref::<Order>(), Some(&order(2)));
}

#[test]
fn module_prefix_pattern_accepts_whole_module() {
    let module = std::any::type_name::<Fact>()
        .rsplit_once("::")
        .map(|(m, _)| m)
        .unwrap();
    let toml = format!(
        r#"
[[strategy]]
kind = "identity"
name = "facts"
accept = ["{module}::*"]

[[strategy]]
kind = "native"
name = "values"
"#
    );
    let store = StrategyStoreConfig::from_toml_str(&toml)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(store.index_of(fact("f", 1).as_ref()).unwrap(), 0);
    assert_eq!(store.index_of(&order(1)).unwrap(), 1);
    assert_eq!(store.by_name("values"), Some(1));
}

#[test]
fn config_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("strategies.toml");
    std::fs::write(&path, fact_chain_toml()).unwrap();

    let config = StrategyStoreConfig::from_file(&path).unwrap();
    assert_eq!(config.strategies.len(), 2);
}

#[test]
fn default_template_builds_native_only_chain() {
    let store = StrategyStoreConfig::from_toml_str(StrategyStoreConfig::default_toml())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(store.names(), vec![NATIVE_STRATEGY_NAME]);
    assert_eq!(store.index_of(fact("any", 0).as_ref()).unwrap(), 0);
}

#[test]
fn malformed_config_is_rejected() {
    let err = StrategyStoreConfig::from_toml_str("[[strategy]]\nname = \"no kind\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
