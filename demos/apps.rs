// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application options example.
//!
//! This example demonstrates:
//! - Loading the live configuration from an option store
//! - Writing a whole app as flat options
//! - Updating one option without touching the others
//! - Listing and deleting apps
//!
//! To run this example:
//! ```bash
//! cargo run --example apps
//! ```

use optmap::prelude::*;
use optmap::service::App;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== optmap: Application Options ===\n");

    let service = AppOptionsService::load(MemoryOptionStore::with_values([
        ("apps.python.active", "true"),
        ("apps.python.title", "Python"),
        ("apps.python.args", r#"["-u"]"#),
    ]))?;

    println!("--- Example 1: Writing an app ---");
    let bash = App {
        active: true,
        priority: 1,
        title: "Bash".to_string(),
        icon: "terminal".to_string(),
        color: "green".to_string(),
        dark_color: "lime".to_string(),
        path: "/bin/bash".to_string(),
        args: vec!["-e".to_string()],
    };
    service.set_app("bash", &bash)?;

    let stored = service.store().get_options(&ConfigKey::from("apps.bash"))?;
    for (key, value) in &stored {
        println!("  {} = {}", key, value);
    }

    println!("\n--- Example 2: Updating one option ---");
    service.set_app_option("bash", "priority", "5")?;
    let bash = service.get_app("bash")?;
    println!("  priority = {}, title still = {}", bash.priority, bash.title);

    if let Err(e) = service.set_app_option("bash", "priority", "high") {
        println!("  rejected: {}", e);
    }

    println!("\n--- Example 3: Listing apps ---");
    for app in service.list_apps()? {
        println!(
            "  {:<12} active={:<5} title={}",
            app.id, app.active, app.title
        );
    }

    println!("\n--- Example 4: Deleting an app ---");
    service.delete_app("bash")?;
    println!("  bash configured: {}", service.get_app("bash").is_ok());
    println!("  options left in store: {}", service.store().len());

    Ok(())
}
