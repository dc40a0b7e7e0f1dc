//! PowerShell command construction.
//!
//! Every script is passed through `-Command`, so single quotes inside values
//! are doubled.

/// Flags prepended to every PowerShell invocation.
pub const BASE_ARGS: &[&str] = &["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass"];

/// Quote `value` as a PowerShell single-quoted literal.
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Script that forces TLS 1.2 and runs the remote bootstrap script at `url`.
#[must_use]
pub fn bootstrap_script(url: &str) -> String {
    format!(
        "[System.Net.ServicePointManager]::SecurityProtocol = \
         [System.Net.ServicePointManager]::SecurityProtocol -bor 3072; \
         iex ((New-Object System.Net.WebClient).DownloadString({}))",
        quote(url)
    )
}

/// Script that prints the raw user-level `Path`, `%VAR%` references intact.
///
/// `[Environment]::GetEnvironmentVariable` expands them, and writing that
/// value back would freeze entries such as `%USERPROFILE%\...` for good.
#[must_use]
pub fn read_user_path_script() -> String {
    "(Get-Item -Path 'HKCU:\\Environment').GetValue('Path', '', 'DoNotExpandEnvironmentNames')"
        .to_string()
}

/// Script that stores `value` as the user-level `Path` as an expandable
/// string, then touches a scratch variable so running programs are notified.
#[must_use]
pub fn write_user_path_script(value: &str) -> String {
    format!(
        "$key = [Microsoft.Win32.Registry]::CurrentUser.CreateSubKey('Environment'); \
         $key.SetValue('Path', {}, 'ExpandString'); $key.Close(); \
         [Environment]::SetEnvironmentVariable('WINRICE_REFRESH', '1', 'User'); \
         [Environment]::SetEnvironmentVariable('WINRICE_REFRESH', $null, 'User')",
        quote(value)
    )
}
