//! Init command implementation

use anyhow::Result;
use std::path::Path;

use skipfeed::config::Config;

/// Create the config file with a fresh device ID
pub fn init_command(config_path: &Path, force: bool) -> Result<()> {
    let (config, written) = Config::init(config_path, force)?;

    if written {
        println!("Created: {}", config_path.display());
    } else {
        println!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }
    println!("Device ID: {}", config.settings.device_id);

    Ok(())
}
