use json_kv::{Error, Fingerprint, JsonStore, WriteOutcome};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

fn temp_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(format!("{name}.json"))
}

// ---- get / set / has --------------------------------------------------------

#[test]
fn set_get_has() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore = JsonStore::new(temp_path(&dir, "set_get"));

    assert!(db.set("hello", json!("world")).unwrap());
    assert_eq!(db.get("hello"), Some(&json!("world")));
    assert_eq!(db.get("fifi"), None);
    assert!(db.has("hello"));
    assert!(!db.has("foo"));
}

#[test]
fn set_replaces_existing_value() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "replace"));

    assert!(db.set("a", 1).unwrap());
    assert!(db.set("a", 2).unwrap());
    assert_eq!(db.get("a"), Some(&2));
    assert_eq!(db.size(), 1);
}

#[test]
fn set_if_absent_keeps_first_value() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "if_absent"));

    assert!(db.set("key", 1).unwrap());
    let fp = db.fingerprint().clone();
    assert!(!db.set_if_absent("key", 2).unwrap());
    assert_eq!(db.get("key"), Some(&1));
    assert_eq!(db.fingerprint(), &fp);

    assert!(db.set_if_absent("other", 3).unwrap());
    assert_eq!(db.get("other"), Some(&3));
}

#[test]
fn mixed_values_in_untyped_store() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore = JsonStore::new(temp_path(&dir, "mixed"));

    db.set("hello", json!("world")).unwrap();
    db.set("foo", json!({ "bar": "baz" })).unwrap();
    db.set("fizz", json!(123)).unwrap();
    db.set("nothing", Value::Null).unwrap();

    assert_eq!(db.size(), 4);
    assert_eq!(db.get("foo").and_then(|v| v.get("bar")), Some(&json!("baz")));
    assert_eq!(db.get("nothing"), Some(&Value::Null));
}

// ---- delete / clear / size --------------------------------------------------

#[test]
fn delete_present_and_absent() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore = JsonStore::new(temp_path(&dir, "delete"));
    db.set("hello", json!("world")).unwrap();
    db.set("foo", json!("bar")).unwrap();
    assert_eq!(db.size(), 2);

    assert!(db.delete("hello").unwrap());
    assert_eq!(db.size(), 1);
    assert!(!db.has("hello"));
    assert!(db.has("foo"));
    assert_eq!(db.get("hello"), None);

    let fp = db.fingerprint().clone();
    assert!(!db.delete("hello").unwrap());
    assert_eq!(db.fingerprint(), &fp);
}

#[test]
fn clear_removes_all_entries() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore = JsonStore::new(temp_path(&dir, "clear"));
    db.set("hello", json!("world")).unwrap();
    db.set("foo", json!("bar")).unwrap();

    db.clear();
    assert_eq!(db.size(), 0);
    assert!(db.is_empty());
    assert!(!db.has("hello"));
    assert_eq!(db.fingerprint(), &Fingerprint::empty());
}

// ---- iteration --------------------------------------------------------------

#[test]
fn iteration_follows_insertion_order() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "order"));
    db.set("c", 3).unwrap();
    db.set("a", 1).unwrap();
    db.set("b", 2).unwrap();
    // replacing keeps the original slot
    db.set("c", 30).unwrap();

    let entries: Vec<(&str, i32)> = db.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(entries, vec![("c", 30), ("a", 1), ("b", 2)]);

    let keys: Vec<&String> = db.keys().collect();
    assert_eq!(keys, vec!["c", "a", "b"]);

    // restartable, and usable with a for loop
    let mut total = 0;
    for (_, v) in &db {
        total += v;
    }
    assert_eq!(total, 33);
    assert_eq!(db.iter().count(), 3);
}

#[test]
fn delete_preserves_order_of_remaining_keys() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "delete_order"));
    db.extend(vec![("x", 1), ("y", 2), ("z", 3)]).unwrap();
    db.delete("x").unwrap();
    let keys: Vec<&String> = db.keys().collect();
    assert_eq!(keys, vec!["y", "z"]);
}

// ---- extend / update --------------------------------------------------------

#[test]
fn extend_bulk_insert() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "extend"));
    db.set("k0", 99).unwrap();

    let batch: Vec<(String, i32)> = (0..50).map(|i| (format!("k{i}"), i)).collect();
    db.extend(batch).unwrap();
    assert_eq!(db.size(), 50);
    assert_eq!(db.get("k0"), Some(&0));
    assert_eq!(db.get("k49"), Some(&49));
}

#[test]
fn update_existing_and_missing() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "update"));
    db.set("counter", 10).unwrap();
    let before = db.fingerprint().clone();

    assert!(db.update("counter", |v| *v += 5).unwrap());
    assert_eq!(db.get("counter"), Some(&15));
    assert_ne!(db.fingerprint(), &before);

    assert!(!db.update("nope", |v| *v += 1).unwrap());
    assert_eq!(db.size(), 1);
}

// ---- serialization failures -------------------------------------------------

type TupleKeyed = BTreeMap<(i32, i32), i32>;

#[test]
fn unserializable_value_is_rolled_back() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<TupleKeyed> = JsonStore::new(temp_path(&dir, "rollback"));
    assert!(db.set("ok", TupleKeyed::new()).unwrap());
    let fp = db.fingerprint().clone();

    let mut bad = TupleKeyed::new();
    bad.insert((1, 2), 3);

    let err = db.set("new", bad.clone()).unwrap_err();
    assert!(matches!(err, Error::Serialize(_)));
    assert!(!db.has("new"));

    assert!(db.set("ok", bad).is_err());
    assert_eq!(db.get("ok"), Some(&TupleKeyed::new()));
    assert_eq!(db.size(), 1);
    assert_eq!(db.fingerprint(), &fp);
}

#[test]
fn non_finite_float_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "nan");
    let mut db: JsonStore<f64> = JsonStore::new(&path);
    assert!(db.set("x", 1.5).unwrap());
    let fp = db.fingerprint().clone();

    let err = db.set("y", f64::NAN).unwrap_err();
    assert!(matches!(err, Error::Serialize(_)));
    assert!(!db.has("y"));

    assert!(db.set("x", f64::INFINITY).is_err());
    assert_eq!(db.get("x"), Some(&1.5));

    assert!(db.extend(vec![("z", 2.0), ("w", f64::NEG_INFINITY)]).is_err());
    assert!(!db.has("z"));

    assert!(db.update("x", |v| *v = f64::NAN).is_err());
    assert_eq!(db.get("x"), Some(&1.5));
    assert_eq!(db.size(), 1);
    assert_eq!(db.fingerprint(), &fp);

    // whatever was accepted loads back
    assert_eq!(db.write().unwrap(), WriteOutcome::Written);
    let reader: JsonStore<f64> = JsonStore::open(&path).unwrap();
    assert_eq!(reader.get("x"), Some(&1.5));
}

// ---- accessors --------------------------------------------------------------

#[test]
fn path_accessor_and_replace() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "path_acc");
    let mut db: JsonStore = JsonStore::new(&path);
    assert_eq!(db.path(), path.as_path());

    let other = temp_path(&dir, "path_other");
    db.set_path(&other);
    assert_eq!(db.path(), other.as_path());
}

#[test]
fn dirty_tracking() {
    let dir = TempDir::new().unwrap();
    let mut db: JsonStore<i32> = JsonStore::new(temp_path(&dir, "dirty"));
    assert!(!db.is_dirty());

    db.set("a", 1).unwrap();
    assert!(db.is_dirty());

    assert_eq!(db.write().unwrap(), WriteOutcome::Written);
    assert!(!db.is_dirty());
    assert_eq!(db.persisted_fingerprint(), Some(db.fingerprint()));
}

#[test]
fn debug_impls_dont_panic() {
    let dir = TempDir::new().unwrap();
    let path = temp_path(&dir, "debug");
    let db: JsonStore = JsonStore::new(&path);

    let dbg_store = format!("{db:?}");
    assert!(dbg_store.contains("JsonStore"));
    assert!(dbg_store.contains("path"));
    assert!(dbg_store.contains("pretty: false"));

    let builder = JsonStore::<i32>::builder(&path).pretty(true);
    let dbg_builder = format!("{builder:?}");
    assert!(dbg_builder.contains("JsonStoreBuilder"));
    assert!(dbg_builder.contains("pretty: true"));

    let pretty: JsonStore<i32> = builder.build();
    assert!(format!("{pretty:?}").contains("pretty: true"));
}

#[test]
fn error_display() {
    assert_eq!(Error::Io("boom".into()).to_string(), "i/o error: boom");
    assert_eq!(
        Error::Deserialize("bad".into()).to_string(),
        "deserialization error: bad"
    );
    let mismatch = Error::FingerprintMismatch {
        stored: "a".into(),
        computed: "b".into(),
    };
    assert!(mismatch.to_string().contains("file says a"));
}

#[test]
fn error_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
    assert!(matches!(Error::from(io), Error::Io(_)));

    let eof = serde_json::from_str::<Value>("{").unwrap_err();
    assert!(matches!(Error::from(eof), Error::Deserialize(_)));

    let mut tuple_keyed = TupleKeyed::new();
    tuple_keyed.insert((0, 0), 0);
    let data = serde_json::to_value(&tuple_keyed).unwrap_err();
    assert!(matches!(Error::from(data), Error::Serialize(_)));
}
