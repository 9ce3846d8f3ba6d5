//! Generation backends for NeuroQueue.
//!
//! All backends implement the `neuroqueue_core::Generator` trait.
//! [`build_from_config`] selects and configures one from `AppConfig`.

pub mod ollama;

pub use ollama::OllamaCliGenerator;

use std::sync::Arc;
use std::time::Duration;

use neuroqueue_config::AppConfig;
use neuroqueue_core::Generator;

/// Build the configured generator.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Generator> {
    Arc::new(
        OllamaCliGenerator::new(&config.model)
            .with_binary(&config.ollama_binary)
            .with_timeout(Duration::from_secs(config.generation_timeout_secs)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ollama_generator_from_defaults() {
        let generator = build_from_config(&AppConfig::default());
        assert_eq!(generator.name(), "ollama-cli");
    }
}
