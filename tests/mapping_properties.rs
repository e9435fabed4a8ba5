// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the flatten / encode / reconstruct / assign pipeline.

mod common;

use common::stores::FlakyStore;
use optmap::config_record;
use optmap::domain::{
    assign, encode_all, flatten, reconstruct, ConfigError, ConfigKey, ConfigValue, EncodedMap,
};
use optmap::ports::OptionStore;
use optmap::service::{App, AppOptionsService, ConfigHandle, ServerConfig};

config_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Inner {
        pub x: i32 as "X",
    }
}

config_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Outer {
        pub a: i32 as "A",
        pub b: i32 as "B",
        pub inner: Inner as "Inner",
    }
}

config_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Settings {
        pub enabled: bool,
        pub retries: u32 as "Retries",
        pub ratio: f64,
        pub name: String as "-",
        pub tags: Vec<String>,
        pub window: [i16; 3],
        pub offset: i64 as "offset,omitempty",
        pub inner: Inner as "Inner",
    }
}

fn round_trip<T: optmap::domain::ConfigRecord + Default>(value: &T) -> T {
    let encoded = encode_all(flatten(value).unwrap()).unwrap();
    let mut fresh = T::default();
    let report = assign(&reconstruct(encoded).unwrap(), &mut fresh);
    assert!(report.is_clean(), "skipped: {:?}", report.skipped());
    fresh
}

#[test]
fn test_round_trip_scalars_and_sequences() {
    let settings = Settings {
        enabled: true,
        retries: 5,
        ratio: 0.1 + 0.2,
        name: "primary, with comma".to_string(),
        tags: vec!["b".to_string(), "a".to_string(), String::new()],
        window: [-3, 0, 32767],
        offset: i64::MIN,
        inner: Inner { x: 42 },
    };

    assert_eq!(round_trip(&settings), settings);
}

#[test]
fn test_round_trip_is_byte_stable() {
    let settings = Settings {
        ratio: 1e-7,
        tags: vec!["ünïcödé".to_string()],
        ..Settings::default()
    };

    let first = encode_all(flatten(&settings).unwrap()).unwrap();
    let second = encode_all(flatten(&round_trip(&settings)).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_partial_update_leaves_siblings() {
    let mut outer = Outer {
        a: 1,
        b: 2,
        inner: Inner { x: 7 },
    };

    let report = assign(&reconstruct([("B", "3")]).unwrap(), &mut outer);

    assert!(report.is_clean());
    assert_eq!(outer.a, 1);
    assert_eq!(outer.b, 3);
    assert_eq!(outer.inner.x, 7);
}

#[test]
fn test_unknown_keys_are_tolerated() {
    let original = Outer {
        a: 1,
        b: 2,
        inner: Inner { x: 7 },
    };
    let mut outer = original.clone();

    let report = assign(
        &reconstruct([("Z", "x"), ("Inner.Y", "1"), ("deep.unknown.key", "v")]).unwrap(),
        &mut outer,
    );

    assert!(report.is_clean());
    assert_eq!(outer, original);
}

#[test]
fn test_alias_modifiers_are_dropped() {
    let app = App {
        dark_color: "#101010".to_string(),
        ..App::default()
    };
    let flat = flatten(&app).unwrap();

    assert!(flat.contains_key(&ConfigKey::from("dark_color")));
    assert!(!flat.keys().any(|k| k.as_str().contains(',')));
    assert!(!flat.contains_key(&ConfigKey::from("DarkColor")));
}

#[test]
fn test_omit_marker_falls_back_to_field_name() {
    let flat = flatten(&Settings::default()).unwrap();
    assert!(flat.contains_key(&ConfigKey::from("name")));
    assert!(flat.contains_key(&ConfigKey::from("offset")));
    assert!(!flat.contains_key(&ConfigKey::from("-")));
}

#[test]
fn test_nested_record_is_prefixed() {
    let outer = Outer {
        inner: Inner { x: 1 },
        ..Outer::default()
    };
    let encoded = encode_all(flatten(&outer).unwrap()).unwrap();

    assert_eq!(encoded[&ConfigKey::from("Inner.X")], ConfigValue::from("1"));
    assert_eq!(encoded.len(), 3);
}

#[test]
fn test_sequence_encodes_to_one_ordered_entry() {
    let settings = Settings {
        tags: vec!["a".to_string(), "b".to_string()],
        ..Settings::default()
    };
    let encoded = encode_all(flatten(&settings).unwrap()).unwrap();

    let tags = &encoded[&ConfigKey::from("tags")];
    assert!(!encoded.keys().any(|k| k.as_str().starts_with("tags.")));

    let decoded: Vec<String> = tags.decode_json("tags").unwrap();
    assert_eq!(decoded, vec!["a", "b"]);
}

#[test]
fn test_structural_conflict_is_reported() {
    let mut flat = EncodedMap::new();
    flat.insert(ConfigKey::from("apps.x"), ConfigValue::from("leaf"));
    flat.insert(ConfigKey::from("apps.x.y"), ConfigValue::from("nested"));

    assert!(matches!(
        reconstruct(flat),
        Err(ConfigError::StructuralConflict { .. })
    ));
}

#[test]
fn test_partial_write_failure_is_visible() {
    let store = FlakyStore::failing_on(2);
    let service = AppOptionsService::new(&store, ConfigHandle::new(ServerConfig::default()));

    let app = App {
        active: true,
        title: "Bash".to_string(),
        args: vec!["-e".to_string()],
        ..App::default()
    };

    let err = service.set_app("bash", &app).unwrap_err();
    match &err {
        ConfigError::PartialWrite {
            key,
            persisted,
            source,
        } => {
            assert_eq!(key, "apps.bash.args");
            assert_eq!(persisted, &vec!["apps.bash.active".to_string()]);
            assert!(matches!(**source, ConfigError::StoreError { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    // The first write stays persisted and nothing after the failure is tried
    let stored = store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&ConfigKey::from("apps.bash.active")].as_str(), "true");
    assert_eq!(store.attempted(), vec!["apps.bash.active", "apps.bash.args"]);

    // The live object mirrors the store
    let live = service.get_app("bash").unwrap();
    assert!(live.active);
    assert!(live.args.is_empty());
    assert_eq!(live.title, "");
}

#[test]
fn test_successful_write_then_reload_matches() {
    let store = FlakyStore::failing_on(usize::MAX);
    let app = App {
        active: true,
        priority: -4,
        title: "Python".to_string(),
        path: "/usr/bin/python3".to_string(),
        args: vec!["-u".to_string(), "main.py".to_string()],
        ..App::default()
    };

    let service = AppOptionsService::new(&store, ConfigHandle::default());
    service.set_app("python", &app).unwrap();
    assert_eq!(store.attempted().len(), 8);

    let reloaded = AppOptionsService::load(&store).unwrap();
    assert_eq!(reloaded.get_app("python").unwrap(), app);
    assert_eq!(
        reloaded.config().snapshot().unwrap(),
        service.config().snapshot().unwrap()
    );
    assert_eq!(store.name(), "flaky");
}
