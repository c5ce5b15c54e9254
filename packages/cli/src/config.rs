use anyhow::{anyhow, Context, Result};
use std::path::Path;
use stencil_engine::{MissingDataPolicy, RenderConfig, UnknownCommandPolicy, DEFAULT_CONFIG_NAME};

/// Command line settings that win over the config file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub missing_data: Option<String>,
    pub strict: bool,
}

/// Load `stencil.config.json` from `dir` (or the working directory) and
/// apply command line overrides
pub fn load(cwd: &Path, dir: Option<&Path>, overrides: &Overrides) -> Result<RenderConfig> {
    let dir = dir.map_or_else(|| cwd.to_path_buf(), |dir| cwd.join(dir));
    let mut config = RenderConfig::load(&dir)
        .with_context(|| format!("loading {}", dir.join(DEFAULT_CONFIG_NAME).display()))?;
    apply(&mut config, overrides)?;
    Ok(config)
}

fn apply(config: &mut RenderConfig, overrides: &Overrides) -> Result<()> {
    if let Some(policy) = &overrides.missing_data {
        config.missing_data = MissingDataPolicy::parse(policy)
            .ok_or_else(|| anyhow!("Unknown missing-data policy: {} (use delete, keep or marker)", policy))?;
    }
    if overrides.strict {
        config.unknown_command = UnknownCommandPolicy::Error;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let mut config = RenderConfig::default();
        let overrides = Overrides {
            missing_data: Some("marker".to_string()),
            strict: true,
        };
        apply(&mut config, &overrides).unwrap();

        assert_eq!(config.missing_data, MissingDataPolicy::Marker);
        assert_eq!(config.unknown_command, UnknownCommandPolicy::Error);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let mut config = RenderConfig::default();
        let overrides = Overrides {
            missing_data: Some("never".to_string()),
            strict: false,
        };
        assert!(apply(&mut config, &overrides).is_err());
        assert_eq!(config, RenderConfig::default());
    }
}
