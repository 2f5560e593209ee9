use json_kv::{JsonStore, LoadOutcome};

fn main() -> Result<(), json_kv::Error> {
    let path = std::env::temp_dir().join("json_kv_example_basic.json");
    let mut db: JsonStore<i32> = JsonStore::new(&path);

    if db.load()? == LoadOutcome::NoStoreFile {
        println!("no store yet at {}", path.display());
    }

    // set / get / delete
    db.set("apples", 3)?;
    db.set("bananas", 5)?;
    println!("apples  = {:?}", db.get("apples"));
    println!("bananas = {:?}", db.get("bananas"));

    // keep the first value
    let changed = db.set_if_absent("apples", 100)?;
    println!("set_if_absent replaced apples? {changed}");

    // update in place
    db.update("apples", |n| *n += 1)?;
    println!("apples after update = {:?}", db.get("apples"));

    // bulk insert
    db.extend(vec![("grapes", 12), ("lemons", 7)])?;
    db.delete("bananas")?;

    for (k, v) in &db {
        println!("{k:>8} = {v}");
    }
    println!("size = {}", db.size());

    // only the first write touches disk
    println!("write #1: {:?}", db.write()?);
    println!("write #2: {:?}", db.write()?);

    db.delete_store()?;
    Ok(())
}
