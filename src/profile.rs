//! The Installation Profile: operator-supplied configuration.
//!
//! Collected once before any mutation begins (interactively or from a JSON
//! file) and read-only afterward.

use crate::prompt;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_locale() -> String {
    "en_US.UTF-8".to_string()
}

fn default_hostname() -> String {
    "archlinux".to_string()
}

fn default_username() -> String {
    "user".to_string()
}

/// Operator-supplied configuration for the installed system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// IANA timezone string, e.g. `Europe/Berlin`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Locale to generate and set system-wide.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Hostname of the new system.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Primary (wheel) user account name.
    #[serde(default = "default_username")]
    pub username: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            locale: default_locale(),
            hostname: default_hostname(),
            username: default_username(),
        }
    }
}

/// Hostname and username share the same shape rules: start with a letter,
/// alphanumerics or underscores, 3..=32 characters.
pub fn is_valid_name(value: &str) -> bool {
    value.len() >= 3
        && value.len() <= 32
        && value.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// IANA zone strings are `Area/Location` or a bare zone like `UTC`; reject
/// anything empty or containing whitespace.
pub fn is_valid_timezone(value: &str) -> bool {
    !value.is_empty()
        && !value.contains(char::is_whitespace)
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '+' | '-'))
}

/// Locales must carry a charset suffix, e.g. `en_US.UTF-8`.
pub fn is_valid_locale(value: &str) -> bool {
    !value.contains(char::is_whitespace)
        && value
            .split_once('.')
            .is_some_and(|(lang, charset)| !lang.is_empty() && !charset.is_empty())
}

impl Profile {
    /// Collect the profile interactively, re-prompting on invalid input.
    pub fn collect<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Self> {
        let defaults = Self::default();

        let timezone = prompt::ask_validated(
            input,
            output,
            "Timezone",
            &defaults.timezone,
            is_valid_timezone,
        )?;
        let locale =
            prompt::ask_validated(input, output, "Locale", &defaults.locale, is_valid_locale)?;
        let hostname =
            prompt::ask_validated(input, output, "Hostname", &defaults.hostname, is_valid_name)?;
        let username =
            prompt::ask_validated(input, output, "Username", &defaults.username, is_valid_name)?;

        Ok(Self {
            timezone,
            locale,
            hostname,
            username,
        })
    }

    /// Load the profile from a JSON file and validate it.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let profile: Self = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Validate all fields, reporting the first offender.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_valid_timezone(&self.timezone) {
            anyhow::bail!("invalid timezone: {:?}", self.timezone);
        }
        if !is_valid_locale(&self.locale) {
            anyhow::bail!("invalid locale: {:?}", self.locale);
        }
        if !is_valid_name(&self.hostname) {
            anyhow::bail!("invalid hostname: {:?}", self.hostname);
        }
        if !is_valid_name(&self.username) {
            anyhow::bail!("invalid username: {:?}", self.username);
        }
        Ok(())
    }
}
