use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Configuration read from `APP_`-prefixed environment variables, with `__`
/// separating nested keys (`APP_DATABASE__URL` sets `database.url`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    fn load_dotenv() {
        // crate-root .env first, then the working directory
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();
        Self::from_source(
            config_rs::Environment::with_prefix(Self::PREFIX)
                .prefix_separator("_")
                .separator(Self::SEPARATOR)
                .try_parsing(true),
        )
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config_rs::Source + Send + Sync + 'static,
    {
        let settings = config_rs::Config::builder()
            .add_source(source)
            .build()
            .context("failed to read configuration sources")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
