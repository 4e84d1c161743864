use std::path::Path;

use anyhow::{anyhow, Result};

use rollarchive_core::AppConfig;

pub fn run(config: &AppConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists.\nUse --force to overwrite it.",
            path.display()
        ));
    }
    if path == AppConfig::config_path() {
        config.save()?;
    } else {
        config.save_to(path)?;
    }
    println!("Wrote {}", path.display());
    Ok(())
}
