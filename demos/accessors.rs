//! Demonstration of the storage accessors over an in-memory store

use serde::{Deserialize, Serialize};
use stashcan::storage::{
    get_stored_as, get_stored_item, remove_stored_item, set_stored_item, try_set_stored_item,
    MemoryStorage,
};

#[derive(Debug, Serialize, Deserialize)]
struct Profile {
    name: String,
    languages: Vec<String>,
}

fn main() {
    println!("=== Accessors Example ===\n");

    let store = MemoryStorage::with_quota(256);

    // Structured values are stored as JSON
    println!("1. Storing a profile");
    let profile = Profile {
        name: "Ada".to_string(),
        languages: vec!["Rust".to_string(), "OCaml".to_string()],
    };
    set_stored_item(&store, "profile", &profile);
    println!("   raw: {:?}", store.snapshot().get("profile"));

    println!("\n2. Reading it back");
    println!("   untyped: {:?}", get_stored_item(&store, "profile"));
    println!(
        "   typed:   {:?}",
        get_stored_as::<Profile, _>(&store, "profile")
    );

    // Strings are stored verbatim
    println!("\n3. Storing plain strings");
    set_stored_item(&store, "greeting", "hello");
    set_stored_item(&store, "answer", "42");
    println!("   greeting: {:?}", get_stored_item(&store, "greeting"));
    println!("   answer (untyped): {:?}", get_stored_item(&store, "answer"));
    println!(
        "   answer (as String): {:?}",
        get_stored_as::<String, _>(&store, "answer")
    );

    // Failures are swallowed unless asked for
    println!("\n4. Exceeding the quota");
    let big = "x".repeat(512);
    println!("   set_stored_item: {}", set_stored_item(&store, "big", &big));
    if let Err(err) = try_set_stored_item(&store, "big", &big) {
        println!("   try_set_stored_item: {}", err);
    }

    println!("\n5. Removing");
    remove_stored_item(&store, "greeting");
    println!("   greeting: {:?}", get_stored_item(&store, "greeting"));
    println!("   keys left: {:?}", store.keys());

    println!("\n✓ Example complete!");
}
