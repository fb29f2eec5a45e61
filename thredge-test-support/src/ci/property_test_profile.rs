//! Property-test run profile read from the environment.
//!
//! Long statistical properties default to a modest case count locally; CI
//! raises it through `PROPTEST_CASES` and can isolate cases in subprocesses
//! with `THREDGE_PBT_FORK`.

use std::env;

/// Environment variable overriding the proptest case count.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";
/// Environment variable toggling forked proptest execution.
pub const THREDGE_PBT_FORK_ENV_KEY: &str = "THREDGE_PBT_FORK";

/// Case count and fork flag applied to a property-test suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the environment, falling back to the supplied
    /// defaults when a variable is absent or malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use thredge_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_from_env(PROPTEST_CASES_ENV_KEY, parse_cases).unwrap_or(default_cases),
            fork: override_from_env(THREDGE_PBT_FORK_ENV_KEY, parse_flag).unwrap_or(default_fork),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub const fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether each case runs in a forked subprocess.
    #[must_use]
    pub const fn fork(&self) -> bool {
        self.fork
    }
}

/// Parses `key` with `parse`, logging and discarding malformed values.
fn override_from_env<T>(key: &'static str, parse: fn(&str) -> Result<T, String>) -> Option<T> {
    let raw = env::var(key).ok()?;
    parse(raw.trim())
        .inspect_err(|reason| {
            tracing::warn!(
                env = key,
                raw = %raw,
                reason = %reason,
                "ignoring malformed property-test override",
            );
        })
        .ok()
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(0) => Err("case count must be positive".to_owned()),
        Ok(cases) => Ok(cases),
        Err(error) => Err(format!("not a case count: {error}")),
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    if ["1", "true", "yes", "on"]
        .iter()
        .any(|word| raw.eq_ignore_ascii_case(word))
    {
        Ok(true)
    } else if ["0", "false", "no", "off"]
        .iter()
        .any(|word| raw.eq_ignore_ascii_case(word))
    {
        Ok(false)
    } else {
        Err(format!("`{raw}` is not a boolean flag"))
    }
}
