//! Snapshot of where an installation may have put the X-13 executable.
//!
//! Resolution mirrors the install schemes a wheel can land in: the active
//! environment's scripts directory, the per-user scripts directory, and a
//! `--target` style package root. Nothing is cached; callers build a fresh
//! layout for every lookup.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Operating system family, as far as install schemes care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// Per-user install scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserScheme {
    NtUser,
    OsxFrameworkUser,
    PosixUser,
}

/// `major.minor` of the interpreter the wheel was installed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl std::str::FromStr for PythonVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let parse = |part: Option<&str>| part.and_then(|p| p.parse::<u32>().ok());
        match (parse(parts.next()), parse(parts.next())) {
            (Some(major), Some(minor)) => Ok(Self { major, minor }),
            _ => Err(format!("Invalid Python version: {s}")),
        }
    }
}

/// Captured process state the layout is derived from.
///
/// Tests construct this directly instead of touching the real environment.
#[derive(Debug, Clone)]
pub struct Environment {
    pub os: HostOs,
    pub vars: HashMap<String, OsString>,
    pub home: Option<PathBuf>,
    pub current_exe: Option<PathBuf>,
}

impl Environment {
    /// Snapshot the running process.
    pub fn capture() -> Self {
        Self {
            os: HostOs::current(),
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v)))
                .collect(),
            home: dirs::home_dir(),
            current_exe: std::env::current_exe().ok(),
        }
    }

    /// Look up a variable, treating empty values as unset.
    pub fn var(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .get(key)
            .map(OsString::as_os_str)
            .filter(|v| !v.is_empty())
    }

    fn python_version(&self) -> Option<PythonVersion> {
        self.var("X13BINARY_PYTHON_VERSION")?
            .to_str()?
            .parse()
            .ok()
    }

    /// Directory two levels above the running executable.
    fn exe_grandparent(&self) -> Option<PathBuf> {
        Some(self.current_exe.as_ref()?.parent()?.parent()?.to_path_buf())
    }
}

/// Every location the locator strategies look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Executable file name, including the platform suffix
    pub binary: String,
    /// Scripts directory of the default install scheme
    pub scripts_dir: PathBuf,
    /// Scripts directory of the per-user scheme, when it can be resolved
    pub user_scripts_dir: Option<PathBuf>,
    /// Directory the package itself was installed into
    pub package_root: Option<PathBuf>,
    /// `PATH` entries, in order
    pub path: Vec<PathBuf>,
}

impl InstallLayout {
    /// Resolve the layout from the live process environment.
    pub fn from_env() -> Self {
        Self::resolve(&Environment::capture())
    }

    pub fn resolve(env: &Environment) -> Self {
        let prefix = default_prefix(env);
        let scripts_dir = scripts_dir(env.os, &prefix);
        let user_scripts_dir = user_scripts_dir(env, user_scheme(env.os, &prefix));
        let package_root = env
            .var("X13BINARY_PACKAGE_ROOT")
            .map(PathBuf::from)
            .or_else(|| env.exe_grandparent());
        let path = std::env::split_paths(&env.var("PATH").unwrap_or_default())
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();

        Self {
            binary: x13_schema::binary_file_name(),
            scripts_dir,
            user_scripts_dir,
            package_root,
            path,
        }
    }

    /// Where the binary is expected under the default scheme.
    pub fn default_binary_path(&self) -> PathBuf {
        self.scripts_dir.join(&self.binary)
    }
}

fn default_prefix(env: &Environment) -> PathBuf {
    env.var("VIRTUAL_ENV")
        .or_else(|| env.var("CONDA_PREFIX"))
        .map(PathBuf::from)
        .or_else(|| env.exe_grandparent())
        .unwrap_or_default()
}

fn scripts_dir(os: HostOs, prefix: &Path) -> PathBuf {
    match os {
        HostOs::Windows => prefix.join("Scripts"),
        HostOs::MacOs | HostOs::Other => prefix.join("bin"),
    }
}

/// Pick the per-user scheme for this platform.
pub fn user_scheme(os: HostOs, prefix: &Path) -> UserScheme {
    let framework = prefix
        .components()
        .any(|c| c == Component::Normal(OsStr::new("Python.framework")));
    match os {
        HostOs::Windows => UserScheme::NtUser,
        HostOs::MacOs if framework => UserScheme::OsxFrameworkUser,
        HostOs::MacOs | HostOs::Other => UserScheme::PosixUser,
    }
}

fn user_scripts_dir(env: &Environment, scheme: UserScheme) -> Option<PathBuf> {
    let override_base = env.var("PYTHONUSERBASE").map(PathBuf::from);
    match scheme {
        UserScheme::NtUser => {
            let version = env.python_version()?;
            let base = override_base
                .or_else(|| Some(PathBuf::from(env.var("APPDATA")?).join("Python")))?;
            Some(
                base.join(format!("Python{}{}", version.major, version.minor))
                    .join("Scripts"),
            )
        }
        UserScheme::OsxFrameworkUser => {
            let base = match override_base {
                Some(base) => base,
                None => {
                    let version = env.python_version()?;
                    env.home
                        .as_ref()?
                        .join("Library/Python")
                        .join(format!("{}.{}", version.major, version.minor))
                }
            };
            Some(base.join("bin"))
        }
        UserScheme::PosixUser => {
            let base = override_base.or_else(|| Some(env.home.as_ref()?.join(".local")))?;
            Some(base.join("bin"))
        }
    }
}
