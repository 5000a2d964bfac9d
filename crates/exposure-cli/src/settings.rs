use color_eyre::eyre::{eyre, Result, WrapErr};
use exposure_engine::EngineSettings;

use crate::command::{SettingsArgs, CORPUS_URL_ENV};

impl SettingsArgs {
    /// Build the engine settings from the optional settings file and the command line overrides.
    pub(crate) fn load(&self) -> Result<EngineSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str::<EngineSettings>(&contents)
                    .wrap_err_with(|| format!("Failed to parse {}", path.display()))?
            }
            None => {
                let Some(url) = &self.corpus_url else {
                    return Err(eyre!(
                        "No corpus configured. Use --corpus-url, {CORPUS_URL_ENV} or --config."
                    ));
                };
                EngineSettings::new(url.as_str())
            }
        };

        if let Some(url) = &self.corpus_url {
            settings.corpus_url.clone_from(url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.request_timeout_ms = timeout_ms;
        }
        if let Some(ttl) = self.cache_ttl_secs {
            settings.cache_ttl_secs = ttl;
        }

        settings.validate()?;
        Ok(settings)
    }
}
