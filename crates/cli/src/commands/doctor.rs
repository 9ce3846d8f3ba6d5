//! `neuroqueue doctor` — Diagnose system health.

use neuroqueue_config::AppConfig;
use neuroqueue_memory::DocumentStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 NeuroQueue Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ℹ️  No config file at {}, using defaults", config_path.display());
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    // Generation backend
    let generator = neuroqueue_providers::build_from_config(&config);
    match generator.health_check().await {
        Ok(true) => println!("  ✅ '{}' is installed (model: {})", config.ollama_binary, config.model),
        Ok(false) => {
            println!("  ⚠️  '{}' is present but reported an error", config.ollama_binary);
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    // Document store
    if config.retrieval.enabled {
        let path = config.retrieval.resolved_path();
        match DocumentStore::open(&path) {
            Ok(store) => println!(
                "  ✅ Document store at {} ({} documents)",
                path.display(),
                store.len().await
            ),
            Err(e) => {
                println!("  ⚠️  Document store unusable: {e}; retrieval will be skipped");
                issues += 1;
            }
        }
    } else {
        println!("  ℹ️  Document retrieval disabled");
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
