//! Application state for the certificate API

use crate::config::Config;
use certificate::Storage;

pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    /// Build state from configuration, creating the storage directories
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let storage = Storage::new(&config.upload_dir, &config.output_dir);
        storage.ensure_dirs()?;

        tracing::info!(
            upload_dir = %config.upload_dir.display(),
            output_dir = %config.output_dir.display(),
            "storage ready"
        );

        Ok(Self { config, storage })
    }
}
