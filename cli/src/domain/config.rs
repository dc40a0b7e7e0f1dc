//! Domain types and validators for the provisioning configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access. A partial
//! YAML file only overrides the values it names; the defaults are the
//! authoring-time constants. Application entries are layered field by field
//! over the defaults of their role.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::plan::AppRole;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.winrice/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Chocolatey bootstrap.
    pub package_manager: PackageManagerConfig,
    /// Git, installed through the package manager.
    pub git: GitConfig,
    /// Rust toolchain, installed through `rustup-init`.
    pub toolchain: ToolchainConfig,
    /// MSVC build tools, detected through `vswhere`.
    pub build_tools: BuildToolsConfig,
    /// Browser, detected on the command path.
    pub browser: BrowserConfig,
    /// The two desktop applications.
    pub apps: AppsConfig,
    /// Themed configuration repository.
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// Remote bootstrap script executed through PowerShell.
    pub bootstrap_url: String,
    /// Marker whose existence means the package manager is installed.
    pub executable: PathBuf,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            bootstrap_url: "https://community.chocolatey.org/install.ps1".to_string(),
            executable: PathBuf::from(r"%ProgramData%\chocolatey\bin\choco.exe"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub package: String,
    pub executable: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            package: "git".to_string(),
            executable: PathBuf::from(r"%ProgramFiles%\Git\cmd\git.exe"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// `rustup-init.exe` download location.
    pub installer_url: String,
    pub cargo: PathBuf,
    pub rustup: PathBuf,
    /// Toolchain passed to `rustup default` on every run.
    pub default_toolchain: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            installer_url:
                "https://static.rust-lang.org/rustup/dist/x86_64-pc-windows-msvc/rustup-init.exe"
                    .to_string(),
            cargo: PathBuf::from(r"~\.cargo\bin\cargo.exe"),
            rustup: PathBuf::from(r"~\.cargo\bin\rustup.exe"),
            default_toolchain: "stable-x86_64-pc-windows-msvc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildToolsConfig {
    /// Discovery tool. When it is missing the step is skipped with a warning.
    pub vswhere: PathBuf,
    /// Component id that must be reported by the discovery tool.
    pub component: String,
    pub package: String,
    pub package_parameters: String,
}

impl Default for BuildToolsConfig {
    fn default() -> Self {
        Self {
            vswhere: PathBuf::from(
                r"%ProgramFiles(x86)%\Microsoft Visual Studio\Installer\vswhere.exe",
            ),
            component: "Microsoft.VisualStudio.Component.VC.Tools.x86.x64".to_string(),
            package: "visualstudio2022buildtools".to_string(),
            package_parameters:
                "--add Microsoft.VisualStudio.Workload.VCTools --includeRecommended --passive"
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Command looked up on the search path.
    pub command: String,
    pub package: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            command: "firefox".to_string(),
            package: "firefox".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppsConfig {
    /// Shared installation root for both applications.
    pub install_root: PathBuf,
    /// Window manager. Launched at the end of the run.
    pub primary: AppConfig,
    /// Status bar.
    pub secondary: AppConfig,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from(r"C:\Tools"),
            primary: AppConfig {
                name: "komorebi".to_string(),
                directory: "komorebi".to_string(),
                executable: "komorebi.exe".to_string(),
                msi_url: "https://github.com/LGUG2Z/komorebi/releases/download/v0.1.38/komorebi-0.1.38-x86_64.msi"
                    .to_string(),
                msi_sha256: None,
                install_dir_property: "INSTALLDIR".to_string(),
                source: Some(SourceBuildConfig {
                    repository: "https://github.com/LGUG2Z/komorebi.git".to_string(),
                    binary: "komorebi.exe".to_string(),
                    package: Some("komorebi".to_string()),
                }),
            },
            secondary: AppConfig {
                name: "zebar".to_string(),
                directory: "zebar".to_string(),
                executable: "zebar.exe".to_string(),
                msi_url: "https://github.com/glzr-io/zebar/releases/download/v2.7.0/zebar-v2.7.0-opt1-x64.msi"
                    .to_string(),
                msi_sha256: None,
                install_dir_property: "INSTALLDIR".to_string(),
                source: None,
            },
        }
    }
}

impl<'de> Deserialize<'de> for AppsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct RawApps {
            install_root: Option<PathBuf>,
            primary: AppOverrides,
            secondary: AppOverrides,
        }

        let raw = RawApps::deserialize(deserializer)?;
        let mut apps = Self::default();
        if let Some(root) = raw.install_root {
            apps.install_root = root;
        }
        raw.primary.apply(&mut apps.primary);
        raw.secondary.apply(&mut apps.secondary);
        Ok(apps)
    }
}

impl AppsConfig {
    #[must_use]
    pub fn get(&self, role: AppRole) -> &AppConfig {
        match role {
            AppRole::Primary => &self.primary,
            AppRole::Secondary => &self.secondary,
        }
    }
}

/// One desktop application installed from an MSI package.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub name: String,
    /// Directory name under `apps.install_root`.
    pub directory: String,
    pub executable: String,
    pub msi_url: String,
    /// Optional hex SHA-256 the downloaded package must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msi_sha256: Option<String>,
    /// MSI property receiving the target directory.
    pub install_dir_property: String,
    /// Source build used when the package install fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceBuildConfig>,
}

impl AppConfig {
    #[must_use]
    pub fn install_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.directory)
    }

    #[must_use]
    pub fn executable_path(&self, root: &Path) -> PathBuf {
        self.install_dir(root).join(&self.executable)
    }

    /// File name the package is downloaded to, taken from the URL.
    #[must_use]
    pub fn package_file_name(&self) -> String {
        self.msi_url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("{}.msi", self.name), str::to_owned)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceBuildConfig {
    pub repository: String,
    /// Binary produced under `target/release/`.
    pub binary: String,
    /// Workspace package passed to `cargo build --package`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// Fields a YAML `apps.<role>` entry may override.
#[derive(Deserialize, Default)]
#[serde(default)]
struct AppOverrides {
    name: Option<String>,
    directory: Option<String>,
    executable: Option<String>,
    msi_url: Option<String>,
    msi_sha256: Option<String>,
    install_dir_property: Option<String>,
    /// Absent keeps the role default, `null` disables the source build.
    #[allow(clippy::option_option)]
    #[serde(deserialize_with = "present_or_null")]
    source: Option<Option<SourceOverrides>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SourceOverrides {
    repository: Option<String>,
    binary: Option<String>,
    package: Option<String>,
}

#[allow(clippy::option_option)]
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl AppOverrides {
    fn apply(self, app: &mut AppConfig) {
        if let Some(v) = self.name {
            app.name = v;
        }
        if let Some(v) = self.directory {
            app.directory = v;
        }
        if let Some(v) = self.executable {
            app.executable = v;
        }
        if let Some(v) = self.msi_url {
            app.msi_url = v;
        }
        if self.msi_sha256.is_some() {
            app.msi_sha256 = self.msi_sha256;
        }
        if let Some(v) = self.install_dir_property {
            app.install_dir_property = v;
        }
        match self.source {
            None => {}
            Some(None) => app.source = None,
            Some(Some(overrides)) => {
                // An app without a default source builds its own executable.
                let base = app.source.take().unwrap_or_else(|| SourceBuildConfig {
                    repository: String::new(),
                    binary: app.executable.clone(),
                    package: None,
                });
                app.source = Some(SourceBuildConfig {
                    repository: overrides.repository.unwrap_or(base.repository),
                    binary: overrides.binary.unwrap_or(base.binary),
                    package: overrides.package.or(base.package),
                });
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub repository: String,
    /// Clone destination. Its existence means the clone already happened.
    pub directory: PathBuf,
    /// Settings document inside the clone.
    pub settings_file: String,
    /// Where the application expects the settings document.
    pub destination: PathBuf,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            repository: "https://github.com/LGUG2Z/komorebi-application-specific-configuration.git"
                .to_string(),
            directory: PathBuf::from(r"~\.config\winrice\theme"),
            settings_file: "applications.json".to_string(),
            destination: PathBuf::from(r"~\.config\komorebi\applications.json"),
        }
    }
}

// ── Path expansion ───────────────────────────────────────────────────────────

/// `%NAME%` environment references, including `ProgramFiles(x86)`.
static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"%([A-Za-z_][A-Za-z0-9_()]*)%").expect("valid regex")
});

/// Expand a leading `~` and `%VAR%` tokens in `raw`.
///
/// Variables unknown to `lookup` are left verbatim.
pub fn expand_path(
    raw: &Path,
    home: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    let text = raw.to_string_lossy();

    let expanded = ENV_VAR_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    let Some(home) = home else {
        return PathBuf::from(expanded.into_owned());
    };
    if expanded == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = expanded
        .strip_prefix("~\\")
        .or_else(|| expanded.strip_prefix("~/"))
    {
        let mut path = home.to_path_buf();
        for part in rest.split(['\\', '/']).filter(|p| !p.is_empty()) {
            path.push(part);
        }
        return path;
    }
    PathBuf::from(expanded.into_owned())
}

impl ProvisionConfig {
    /// Expand `~` and `%VAR%` in every path-valued field.
    pub fn expand_paths(&mut self, home: Option<&Path>, lookup: &impl Fn(&str) -> Option<String>) {
        for path in [
            &mut self.package_manager.executable,
            &mut self.git.executable,
            &mut self.toolchain.cargo,
            &mut self.toolchain.rustup,
            &mut self.build_tools.vswhere,
            &mut self.apps.install_root,
            &mut self.theme.directory,
            &mut self.theme.destination,
        ] {
            let expanded = expand_path(path.as_path(), home, lookup);
            *path = expanded;
        }
    }

    /// Validate the configuration before any step runs.
    ///
    /// # Errors
    ///
    /// Returns an error for non-HTTPS URLs, empty names, or colliding
    /// application directories.
    pub fn validate(&self) -> Result<()> {
        let mut urls = vec![
            ("package_manager.bootstrap_url", &self.package_manager.bootstrap_url),
            ("toolchain.installer_url", &self.toolchain.installer_url),
            ("apps.primary.msi_url", &self.apps.primary.msi_url),
            ("apps.secondary.msi_url", &self.apps.secondary.msi_url),
            ("theme.repository", &self.theme.repository),
        ];
        if let Some(source) = &self.apps.primary.source {
            urls.push(("apps.primary.source.repository", &source.repository));
        }
        if let Some(source) = &self.apps.secondary.source {
            urls.push(("apps.secondary.source.repository", &source.repository));
        }
        for (field, value) in urls {
            if !value.starts_with("https://") {
                return Err(ConfigError::InsecureUrl {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        let names = [
            ("git.package", &self.git.package),
            ("toolchain.default_toolchain", &self.toolchain.default_toolchain),
            ("browser.command", &self.browser.command),
            ("apps.primary.name", &self.apps.primary.name),
            ("apps.primary.executable", &self.apps.primary.executable),
            ("apps.secondary.name", &self.apps.secondary.name),
            ("apps.secondary.executable", &self.apps.secondary.executable),
            ("theme.settings_file", &self.theme.settings_file),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(field.to_string()).into());
            }
        }

        if self
            .apps
            .primary
            .directory
            .eq_ignore_ascii_case(&self.apps.secondary.directory)
        {
            return Err(ConfigError::SharedAppDirectory(self.apps.primary.directory.clone()).into());
        }
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
