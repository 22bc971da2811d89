use std::fmt;
use std::io::Error;
use std::str::FromStr;

const APP_ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Where a helper binary runs, selected through `APP_ENVIRONMENT`.
///
/// Only the log output depends on it: production-like environments emit JSON
/// lines for the cluster log collector, development emits readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Prod,
    Staging,
    Dev,
}

impl Environment {
    const ALL: [Environment; 3] = [Environment::Prod, Environment::Staging, Environment::Dev];

    /// Reads `APP_ENVIRONMENT`, falling back to [`Environment::Prod`] when unset.
    ///
    /// Both binaries normally run inside broker pods where nothing sets it.
    pub fn load() -> Result<Environment, Error> {
        match std::env::var(APP_ENVIRONMENT_VAR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Environment::default()),
        }
    }

    /// Exports this environment as `APP_ENVIRONMENT` for the current process.
    pub fn set(&self) {
        // Only called during single threaded startup or from test setup.
        unsafe { std::env::set_var(APP_ENVIRONMENT_VAR, self.as_str()) }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Staging => "staging",
            Environment::Dev => "dev",
        }
    }

    /// Staging is treated like production.
    pub fn is_prod(&self) -> bool {
        !matches!(self, Environment::Dev)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|environment| environment.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                Error::other(format!(
                    "{value} is not a supported environment, expected one of prod, staging or dev"
                ))
            })
    }
}
