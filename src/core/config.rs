//! Build configuration passed explicitly into workflow builders.
//!
//! There is no process-wide configuration: every builder that needs a
//! thread count or a working directory receives a `BuildConfig`.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options consumed while assembling workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Threads granted to multi-threaded steps (e.g. masking).
    pub omp_nthreads: usize,
    /// Scratch directory; reportlets are written below it.
    pub work_dir: PathBuf,
    /// Root of the input dataset, if known.
    pub bids_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            omp_nthreads: 1,
            work_dir: PathBuf::from("work"),
            bids_dir: None,
        }
    }
}

impl BuildConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded build config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Set the thread count.
    pub fn with_omp_nthreads(mut self, n: usize) -> Self {
        self.omp_nthreads = n;
        self
    }

    /// Set the working directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Directory that receives visual reports.
    pub fn reportlets_dir(&self) -> PathBuf {
        self.work_dir.join("reportlets")
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.omp_nthreads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "omp_nthreads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.omp_nthreads, 1);
        assert_eq!(config.reportlets_dir(), PathBuf::from("work/reportlets"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BuildConfig::from_toml_str("omp_nthreads = 8").unwrap();
        assert_eq!(config.omp_nthreads, 8);
        assert_eq!(config.work_dir, PathBuf::from("work"));
        assert!(config.bids_dir.is_none());
    }

    #[test]
    fn test_rejects_zero_threads() {
        let result = BuildConfig::from_toml_str("omp_nthreads = 0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = BuildConfig::from_toml_str("nthreads = 2");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "omp_nthreads = 4").unwrap();
        writeln!(file, "work_dir = \"/tmp/dwi_work\"").unwrap();

        let config = BuildConfig::from_file(file.path()).unwrap();
        assert_eq!(config.omp_nthreads, 4);
        assert_eq!(
            config.reportlets_dir(),
            PathBuf::from("/tmp/dwi_work/reportlets")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BuildConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
