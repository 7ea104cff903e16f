//! Locating the sidecar files of a diffusion series.

use crate::core::config::BuildConfig;
use crate::workflows::naming::split_filename;
use std::path::{Path, PathBuf};

/// Path arithmetic over a BIDS dataset.
///
/// Sidecars are derived from the series path alone; nothing is read from
/// disk, so a workflow can be assembled before the data is reachable.
#[derive(Debug, Clone, Default)]
pub struct BidsLayout {
    root: Option<PathBuf>,
}

impl BidsLayout {
    /// Layout rooted at `root`, against which relative paths resolve.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Layout for the dataset named in the build configuration.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.bids_dir.clone())
    }

    /// Dataset root, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Resolve a series path against the dataset root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The b-vectors file next to a series.
    pub fn get_bvec(&self, dwi_file: impl AsRef<Path>) -> PathBuf {
        self.sidecar(dwi_file.as_ref(), "bvec")
    }

    /// The b-values file next to a series.
    pub fn get_bval(&self, dwi_file: impl AsRef<Path>) -> PathBuf {
        self.sidecar(dwi_file.as_ref(), "bval")
    }

    fn sidecar(&self, dwi_file: &Path, extension: &str) -> PathBuf {
        let (dir, stem, _) = split_filename(&self.resolve(dwi_file));
        dir.join(format!("{}.{}", stem, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecars() {
        let layout = BidsLayout::default();
        let dwi = "/data/sub-01/dwi/sub-01_run-1_dwi.nii.gz";

        assert_eq!(
            layout.get_bvec(dwi),
            PathBuf::from("/data/sub-01/dwi/sub-01_run-1_dwi.bvec")
        );
        assert_eq!(
            layout.get_bval(dwi),
            PathBuf::from("/data/sub-01/dwi/sub-01_run-1_dwi.bval")
        );
    }

    #[test]
    fn test_relative_paths_resolve_against_root() {
        let config = BuildConfig {
            bids_dir: Some(PathBuf::from("/bids")),
            ..BuildConfig::default()
        };
        let layout = BidsLayout::from_config(&config);

        assert_eq!(layout.root(), Some(Path::new("/bids")));
        assert_eq!(
            layout.resolve("sub-01/dwi/sub-01_dwi.nii.gz"),
            PathBuf::from("/bids/sub-01/dwi/sub-01_dwi.nii.gz")
        );
        assert_eq!(
            layout.get_bvec("sub-01/dwi/sub-01_dwi.nii.gz"),
            PathBuf::from("/bids/sub-01/dwi/sub-01_dwi.bvec")
        );
        assert_eq!(
            layout.resolve("/elsewhere/sub-01_dwi.nii.gz"),
            PathBuf::from("/elsewhere/sub-01_dwi.nii.gz")
        );
    }
}
