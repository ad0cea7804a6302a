//! Candidate-generating strategies, one per installation layout.
//!
//! Each strategy only proposes paths; the [`Locator`](super::Locator) checks
//! them against a [`Probe`](super::Probe) in priority order.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use super::InstallLayout;

pub trait Strategy: std::fmt::Debug + Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Candidate executable paths, most specific first.
    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf>;
}

/// Scripts directory of the default install scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultScheme;

impl Strategy for DefaultScheme {
    fn name(&self) -> &'static str {
        "default-scheme"
    }

    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf> {
        vec![layout.default_binary_path()]
    }
}

/// Scripts directory of the per-user install scheme (`pip install --user`).
#[derive(Debug, Default, Clone, Copy)]
pub struct UserScheme;

impl Strategy for UserScheme {
    fn name(&self) -> &'static str {
        "user-scheme"
    }

    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf> {
        layout
            .user_scripts_dir
            .iter()
            .map(|dir| dir.join(&layout.binary))
            .collect()
    }
}

/// `bin/` next to the package root, as created by `pip install --target`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageRootBin;

impl Strategy for PackageRootBin {
    fn name(&self) -> &'static str {
        "package-root-bin"
    }

    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf> {
        layout
            .package_root
            .iter()
            .map(|root| root.join("bin").join(&layout.binary))
            .collect()
    }
}

/// pip's isolated build environment.
///
/// pip prepends `<tmp>/pip-build-env-<rand>/overlay/<bin>` and
/// `<tmp>/pip-build-env-<rand>/normal/<bin>` to `PATH`; build requirements,
/// including this package, land in the overlay.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipBuildEnv;

impl PipBuildEnv {
    fn is_build_env_dir(path: &Path, kind: &str) -> bool {
        let mut parts = path.components().rev().map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        });
        let (Some(Some(_)), Some(Some(parent)), Some(Some(grandparent))) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        parent == OsStr::new(kind)
            && grandparent
                .to_str()
                .is_some_and(|g| g.starts_with("pip-build-env-"))
    }
}

impl Strategy for PipBuildEnv {
    fn name(&self) -> &'static str {
        "pip-build-env"
    }

    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf> {
        match layout.path.as_slice() {
            [overlay, normal, ..]
                if Self::is_build_env_dir(overlay, "overlay")
                    && Self::is_build_env_dir(normal, "normal") =>
            {
                vec![overlay.join(&layout.binary)]
            }
            _ => Vec::new(),
        }
    }
}

/// Every `PATH` entry, in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathScan;

impl Strategy for PathScan {
    fn name(&self) -> &'static str {
        "path"
    }

    fn candidates(&self, layout: &InstallLayout) -> Vec<PathBuf> {
        layout
            .path
            .iter()
            .map(|dir| dir.join(&layout.binary))
            .collect()
    }
}

/// The standard search order.
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(DefaultScheme),
        Box::new(UserScheme),
        Box::new(PackageRootBin),
        Box::new(PipBuildEnv),
        Box::new(PathScan),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(path: &[&str]) -> InstallLayout {
        InstallLayout {
            binary: "x13as_html".into(),
            scripts_dir: PathBuf::from("/venv/bin"),
            user_scripts_dir: None,
            package_root: None,
            path: path.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn test_optional_dirs_yield_nothing_when_unset() {
        let layout = layout(&[]);
        assert!(UserScheme.candidates(&layout).is_empty());
        assert!(PackageRootBin.candidates(&layout).is_empty());
        assert_eq!(
            DefaultScheme.candidates(&layout),
            vec![PathBuf::from("/venv/bin/x13as_html")]
        );
    }

    #[test]
    fn test_package_root_bin() {
        let mut layout = layout(&[]);
        layout.package_root = Some(PathBuf::from("/target"));
        assert_eq!(
            PackageRootBin.candidates(&layout),
            vec![PathBuf::from("/target/bin/x13as_html")]
        );
    }

    #[test]
    fn test_pip_build_env_detected() {
        let layout = layout(&[
            "/tmp/pip-build-env-k3j/overlay/bin",
            "/tmp/pip-build-env-k3j/normal/bin",
            "/usr/bin",
        ]);
        assert_eq!(
            PipBuildEnv.candidates(&layout),
            vec![PathBuf::from("/tmp/pip-build-env-k3j/overlay/bin/x13as_html")]
        );
    }

    #[test]
    fn test_pip_build_env_requires_both_entries() {
        for path in [
            &["/tmp/pip-build-env-k3j/overlay/bin"][..],
            &["/tmp/pip-build-env-k3j/normal/bin", "/tmp/pip-build-env-k3j/overlay/bin"],
            &["/tmp/build-env-k3j/overlay/bin", "/tmp/build-env-k3j/normal/bin"],
            &["/overlay/bin", "/normal/bin"],
        ] {
            assert!(PipBuildEnv.candidates(&layout(path)).is_empty(), "{path:?}");
        }
    }

    #[test]
    fn test_path_scan_keeps_order() {
        let layout = layout(&["/a", "/b"]);
        assert_eq!(
            PathScan.candidates(&layout),
            vec![PathBuf::from("/a/x13as_html"), PathBuf::from("/b/x13as_html")]
        );
    }
}
