//! `neuroqueue config` — Show the effective configuration.

use neuroqueue_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", config.to_toml());
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = neuroqueue_config::AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains(".neuroqueue"));
    }
}
