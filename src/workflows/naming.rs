//! Deriving workflow names from input file paths.
//!
//! `sub-01_run-1_dwi.nii.gz` becomes `dwi_preproc_run_1_wf`: the subject
//! entity is dropped because the enclosing subject workflow already scopes
//! the name, so two subjects with the same run layout derive the same name.

use crate::core::error::{NamingError, NamingResult};
use log::warn;
use std::path::{Path, PathBuf};

/// Extensions that are stripped as a whole rather than at the last dot.
pub const MULTI_PART_EXTENSIONS: [&str; 3] = [".nii.gz", ".tar.gz", ".niml.dset"];

/// Split a path into directory, stem and extension.
///
/// Known multi-part extensions are matched case-insensitively; otherwise
/// the extension starts at the last dot, and a leading dot is part of the
/// stem.
pub fn split_filename(path: &Path) -> (PathBuf, String, String) {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for ext in MULTI_PART_EXTENSIONS {
        let split = name.len().saturating_sub(ext.len());
        if name.len() >= ext.len()
            && name.get(split..).is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
        {
            return (dir, name[..split].to_string(), name[split..].to_string());
        }
    }

    match name.rfind('.') {
        Some(ix) if ix > 0 => (dir, name[..ix].to_string(), name[ix..].to_string()),
        _ => (dir, name, String::new()),
    }
}

/// Turns an input path into a filesystem-safe workflow identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDeriver {
    /// Namespace every derived name starts with.
    pub prefix: String,
    /// Separator between filename entities.
    pub delimiter: char,
    /// Entity naming the imaging modality.
    pub modality_token: String,
    /// What the modality entity becomes.
    pub replacement: String,
}

impl Default for NameDeriver {
    fn default() -> Self {
        Self {
            prefix: "dwi_preproc_".to_string(),
            delimiter: '_',
            modality_token: "dwi".to_string(),
            replacement: "wf".to_string(),
        }
    }
}

impl NameDeriver {
    /// Derive the workflow name for `path`.
    ///
    /// Fails only when the path has no filename stem. Filenames whose
    /// leading entity is not `sub-<label>` still derive a name but are
    /// logged, since that entity is dropped unconditionally.
    ///
    /// The modality token is replaced only as a whole `_`-separated token,
    /// never as a substring: `acq-dwi2` stays `acq_dwi2` rather than becoming
    /// `acq_wf2`. Deriving again from `sub-<label>_<body>` yields the same name.
    pub fn derive_name(&self, path: impl AsRef<Path>) -> NamingResult<String> {
        let path = path.as_ref();
        let (_, stem, _) = split_filename(path);
        if stem.is_empty() {
            return Err(NamingError::MalformedFilename {
                path: path.display().to_string(),
                reason: "no filename stem".to_string(),
            });
        }

        let mut entities = stem.split(self.delimiter);
        let subject = entities.next().unwrap_or_default();
        let rest: Vec<&str> = entities.collect();

        if !is_subject_entity(subject) {
            warn!(
                "'{}': leading entity '{}' is not a subject label but is dropped from the name",
                path.display(),
                subject
            );
        }
        if rest.is_empty() {
            warn!(
                "'{}': no entities after '{}', deriving the bare prefix",
                path.display(),
                subject
            );
        }

        let delimiter = self.delimiter.to_string();
        let sanitized = rest.join(&delimiter).replace(['.', ' ', '-'], &delimiter);
        let body = sanitized
            .split(self.delimiter)
            .map(|token| {
                if token == self.modality_token {
                    self.replacement.as_str()
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(&delimiter);

        Ok(format!("{}{}", self.prefix, body))
    }
}

fn is_subject_entity(entity: &str) -> bool {
    entity
        .strip_prefix("sub-")
        .is_some_and(|label| !label.is_empty())
}

/// Derive a workflow name with the default [`NameDeriver`].
pub fn derive_name(path: impl AsRef<Path>) -> NamingResult<String> {
    NameDeriver::default().derive_name(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_run() {
        assert_eq!(
            derive_name("/data/sub-01/dwi/sub-01_dwi.nii.gz").unwrap(),
            "dwi_preproc_wf"
        );
    }

    #[test]
    fn test_run_entity() {
        assert_eq!(
            derive_name("/data/sub-01/dwi/sub-01_run-1_dwi.nii.gz").unwrap(),
            "dwi_preproc_run_1_wf"
        );
    }

    #[test]
    fn test_subjects_collide() {
        assert_eq!(
            derive_name("/data/sub-01_ses-a_dwi.nii.gz").unwrap(),
            derive_name("/other/sub-02_ses-a_dwi.nii.gz").unwrap()
        );
    }

    #[test]
    fn test_modality_inside_entity_is_kept() {
        assert_eq!(
            derive_name("sub-01_acq-dwi2_dwi.nii.gz").unwrap(),
            "dwi_preproc_acq_dwi2_wf"
        );
        assert_eq!(
            derive_name("sub-01_acq-dwi_dwi.nii.gz").unwrap(),
            "dwi_preproc_acq_wf_wf"
        );
    }

    #[test]
    fn test_spaces_and_dots_sanitized() {
        assert_eq!(
            derive_name("sub-01_my run.v2_dwi.nii").unwrap(),
            "dwi_preproc_my_run_v2_wf"
        );
    }

    #[test]
    fn test_nothing_after_subject() {
        assert_eq!(derive_name("sub-01.nii.gz").unwrap(), "dwi_preproc_");
    }

    #[test]
    fn test_empty_stem() {
        for bad in ["", ".nii.gz", "/data/.NII.GZ"] {
            assert!(matches!(
                derive_name(bad),
                Err(NamingError::MalformedFilename { .. })
            ));
        }
    }

    #[test]
    fn test_split_filename() {
        let (dir, stem, ext) = split_filename(Path::new("/data/sub-01_dwi.nii.gz"));
        assert_eq!(dir, PathBuf::from("/data"));
        assert_eq!(stem, "sub-01_dwi");
        assert_eq!(ext, ".nii.gz");

        let (_, stem, ext) = split_filename(Path::new("sub-01_dwi.bvec"));
        assert_eq!((stem.as_str(), ext.as_str()), ("sub-01_dwi", ".bvec"));

        let (_, stem, ext) = split_filename(Path::new("surf.niml.dset"));
        assert_eq!((stem.as_str(), ext.as_str()), ("surf", ".niml.dset"));

        let (_, stem, ext) = split_filename(Path::new(".hidden"));
        assert_eq!((stem.as_str(), ext.as_str()), (".hidden", ""));
    }

    #[test]
    fn test_custom_deriver() {
        let deriver = NameDeriver {
            prefix: "anat_preproc_".to_string(),
            modality_token: "T1w".to_string(),
            ..NameDeriver::default()
        };
        assert_eq!(
            deriver.derive_name("sub-01_run-2_T1w.nii.gz").unwrap(),
            "anat_preproc_run_2_wf"
        );
    }

    proptest! {
        #[test]
        fn prop_names_are_safe(stem in "sub-[a-z0-9]{1,4}(_[a-zA-Z0-9 .-]{0,8}){0,4}") {
            let name = derive_name(format!("/data/{}.nii.gz", stem)).unwrap();

            prop_assert!(name.starts_with("dwi_preproc_"));
            prop_assert!(!name.contains(['.', ' ', '-']));
        }

        #[test]
        fn prop_derivation_is_deterministic(stem in "[a-zA-Z0-9_ .-]{1,24}") {
            let path = format!("/data/{}.nii.gz", stem);
            prop_assert_eq!(derive_name(&path).ok(), derive_name(&path).ok());
        }

        #[test]
        fn prop_rederivation_is_stable(stem in "sub-[a-z0-9]{1,4}(_[a-zA-Z0-9 .-]{0,8}){0,4}") {
            let name = derive_name(format!("{}.nii.gz", stem)).unwrap();
            let body = name.strip_prefix("dwi_preproc_").unwrap();

            let again = derive_name(format!("sub-01_{}.nii.gz", body)).unwrap();
            prop_assert_eq!(again, name);
        }
    }
}
