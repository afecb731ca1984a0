use tracing_subscriber::EnvFilter;

use crate::error::{DeskError, Result};
use crate::settings::{config_dir, load_settings, save_settings, Settings};

/// Apply the requested changes, validating each one first.
pub fn update(settings: &mut Settings, base_uri: Option<String>, log_level: Option<String>) -> Result<()> {
    if let Some(uri) = base_uri {
        reqwest::Url::parse(&uri)
            .map_err(|e| DeskError::Settings(format!("invalid base URI {uri}: {e}")))?;
        settings.base_uri = uri.trim_end_matches('/').to_string();
    }
    if let Some(level) = log_level {
        EnvFilter::try_new(&level)
            .map_err(|e| DeskError::Settings(format!("invalid log level {level}: {e}")))?;
        settings.log_level = level;
    }
    Ok(())
}

pub fn run(base_uri: Option<String>, log_level: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if base_uri.is_none() && log_level.is_none() {
        println!("Base URI:   {}", settings.base_uri);
        println!("Log level:  {}", settings.log_level);
        return Ok(());
    }
    update(&mut settings, base_uri, log_level)?;
    save_settings(&settings)?;
    println!("Saved settings to {}", config_dir().join("settings.json").display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_trims_base_uri() {
        let mut settings = Settings::default();
        update(&mut settings, Some("https://books.example.com/api/".into()), None).unwrap();
        assert_eq!(settings.base_uri, "https://books.example.com/api");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_update_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(update(&mut settings, Some("not a url".into()), None).is_err());
        assert!(update(&mut settings, None, Some("ledgerdesk=loud".into())).is_err());
        assert_eq!(settings.base_uri, "http://127.0.0.1:8000");
    }
}
