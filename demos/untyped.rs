//! Untyped store at the default location: `<exe dir>/.jsonkv/store.json`.
//!
//! Run with `RUST_LOG=json_kv=debug` to see what the store does.

use json_kv::JsonStore;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), json_kv::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut db: JsonStore = JsonStore::with_default_path()?;
    println!("store file: {}", db.path().display());
    println!("load: {:?}", db.load()?);

    db.set("hello", json!("world"))?;
    db.set("foo", json!({ "bar": "baz" }))?;
    db.set("fizz", json!(123))?;

    println!("write: {:?}", db.write()?);
    println!("fingerprint: {}", db.fingerprint());
    Ok(())
}
