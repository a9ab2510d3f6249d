use anyhow::{bail, Context, Result};
use mendel_sim::simulation::Config;
use std::fs;
use std::path::Path;

/// Write a configuration primed from `defaults` (or the built-in values).
pub fn create_config(path: &Path, defaults: Option<&Path>) -> Result<()> {
    if path.exists() {
        bail!("{} already exists; remove it first", path.display());
    }

    let config = match defaults {
        Some(defaults) => Config::load_defaults(defaults)
            .with_context(|| format!("Failed to read defaults file {}", defaults.display()))?,
        None => Config::default(),
    };
    let text = config.to_toml_string()?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Wrote configuration to {}", path.display());
    if let Some(defaults) = defaults {
        println!("  Primed from {}", defaults.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_from_builtin_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.toml");
        create_config(&path, None).unwrap();
        let written = Config::load_defaults(&path).unwrap();
        assert_eq!(written, Config::default());
    }

    #[test]
    fn test_create_from_defaults_file() {
        let dir = tempdir().unwrap();
        let defaults = dir.path().join("defaults.toml");
        fs::write(&defaults, "[basic]\npop_size = 42\n").unwrap();
        let path = dir.path().join("new.toml");
        create_config(&path, Some(&defaults)).unwrap();
        assert_eq!(Config::load_defaults(&path).unwrap().basic.pop_size, 42);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.toml");
        fs::write(&path, "").unwrap();
        assert!(create_config(&path, None).is_err());
    }
}
