//! Demonstration of state bound to a storage entry

use std::sync::Arc;

use stashcan::storage::{MemoryStorage, StorageBackend};
use stashcan::{use_local_storage, Signal};

fn print_store(store: &MemoryStorage) {
    for (key, value) in store.snapshot() {
        println!("   [store] {} = {}", key, value);
    }
}

fn main() {
    println!("=== Bound State Example ===\n");

    let store = Arc::new(MemoryStorage::new());
    store.set_item("visits", "3").unwrap();

    // Stored value wins over the initial state
    println!("1. Binding \"visits\" with initial state 0");
    let key = Signal::new("visits".to_string());
    let visits = use_local_storage(store.clone(), key.clone(), 0u32, false);
    println!("   value: {}", visits.get());

    // Every change is written back
    println!("\n2. Counting a visit");
    let (value, set_value) = visits.split();
    set_value.update(|n| n + 1);
    println!("   value: {}", value.get());
    print_store(&store);

    // Changing the key moves the entry
    println!("\n3. Renaming the key to \"page-visits\"");
    key.set("page-visits".to_string());
    println!("   active key: {}", visits.key());
    print_store(&store);

    // Dropping the binding leaves the entry behind
    println!("\n4. Dropping the binding");
    drop(visits);
    set_value.set(100);
    print_store(&store);

    println!("\n✓ Example complete!");
}
