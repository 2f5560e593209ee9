use json_kv::JsonStore;

fn main() -> Result<(), json_kv::Error> {
    let path = std::env::temp_dir().join("json_kv_example_builder.json");

    // pretty-printed JSON, and reject files whose _hash doesn't match their data
    let mut db: JsonStore<String> = JsonStore::builder(&path)
        .pretty(true)
        .verify_on_load(true)
        .build();

    db.set("name", "json-kv".to_string())?;
    db.set("version", "0.1.0".to_string())?;
    db.write()?;

    // the file on disk is indented
    let contents = std::fs::read_to_string(db.path())?;
    println!("On-disk JSON:\n{contents}");

    let mut reader: JsonStore<String> = JsonStore::builder(&path).verify_on_load(true).build();
    println!("\nreader load: {:?}", reader.load()?);
    println!("Debug output: {reader:?}");

    db.delete_store()?;
    Ok(())
}
