#![deny(missing_docs)]
//! This crate provides a typed utility for determining what environment we
//! are running in, plus the [env_var!] macro for declaring the environment
//! variables a crate consumes as sentinel types rather than loose strings.

// Re-export paste so users don't need to depend on it directly
pub use paste;
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod testing_harness {
    use super::VarNameErr;
    use std::cell::Cell;

    type MockValue = Cell<Option<Box<dyn Fn(&'static str) -> Result<String, std::env::VarError>>>>;
    thread_local! {
        static MOCK_VAR_GETTER: MockValue = const { Cell::new(None) };
    }

    /// read an environment variable, attaching the variable name to any failure
    pub fn read_env(s: &'static str) -> Result<String, VarNameErr> {
        let cur_getter = MOCK_VAR_GETTER.replace(None);
        match cur_getter {
            Some(mock) => {
                let out = mock(s);
                MOCK_VAR_GETTER.replace(Some(mock));
                out
            }
            None => std::env::var(s),
        }
        .map_err(|err| VarNameErr { var_name: s, err })
    }

    pub(crate) fn with_mock_env<F, Cb, U>(f: F, cb: Cb) -> U
    where
        F: Fn(&'static str) -> Result<String, std::env::VarError> + 'static,
        Cb: FnOnce() -> U,
    {
        MOCK_VAR_GETTER.replace(Some(Box::new(f)));
        let output = cb();
        MOCK_VAR_GETTER.replace(None);
        output
    }
}

#[cfg(test)]
pub use testing_harness::read_env;

/// read an environment variable, attaching the variable name to any failure
#[cfg(not(test))]
pub fn read_env(s: &'static str) -> Result<String, VarNameErr> {
    std::env::var(s).map_err(|err| VarNameErr { var_name: s, err })
}

/// The type of error that is produced when an environment variable cannot be read
#[derive(Debug, Error)]
#[error("An error occurred while reading envvar: {var_name}. Err: {err}")]
pub struct VarNameErr {
    var_name: &'static str,
    err: std::env::VarError,
}

/// Declares a sentinel type for one environment variable.
///
/// The variable name is the SCREAMING_SNAKE form of the type name, so
/// `env_var!(struct DocflowSnapshotDir;)` reads `DOCFLOW_SNAPSHOT_DIR`.
/// Holding a value of the type is proof the variable existed when it was
/// constructed.
#[macro_export]
macro_rules! env_var {
    (
        $(#[$attr:meta])*
        $v:vis struct $n:ident;
    ) => {
        $crate::paste::paste! {
            #[doc = "Sentinel for the `" $n:snake:upper "` environment variable; holding a value proves the variable existed at construction."]
            $(#[$attr])*
            $v struct $n(std::sync::Arc<str>);

            impl $n {
                #[doc = "Attempt to construct [Self] by reading `" $n:snake:upper "` from the environment."]
                #[allow(dead_code)]
                #[tracing::instrument(err)]
                $v fn new() -> Result<Self, $crate::VarNameErr> {
                    let res = $crate::read_env(stringify!([<$n:snake:upper>]))?;
                    Ok(Self(std::sync::Arc::from(res)))
                }

                #[doc = "The name of the environment variable this sentinel reads."]
                #[allow(dead_code)]
                $v const fn var_name() -> &'static str {
                    stringify!([<$n:snake:upper>])
                }
            }

            impl AsRef<str> for $n {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl std::fmt::Display for $n {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl std::fmt::Debug for $n {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.debug_tuple(stringify!($n)).field(&self.0).finish()
                }
            }
        }
    };
}

mod var {
    crate::env_var!(
        #[derive(Clone)]
        pub struct DocflowEnv;
    );
}

/// The current environment the application is running in
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Dev and or staging environment
    Develop,
    /// Running on a developer's machine
    Local,
}

/// An error which can occur when constructing an [Environment]
#[derive(Debug, Error)]
pub enum EnvError {
    /// a std::env::var error while reading the variable
    #[error("{0}")]
    VarErr(#[from] VarNameErr),
    /// the input string value was not recognized as a valid env
    #[error("{0}")]
    InvalidValue(#[from] UnknownValue),
}

impl Environment {
    /// Attempt to construct an [Environment] from the `DOCFLOW_ENV` variable
    #[tracing::instrument(err, level = tracing::Level::TRACE)]
    pub fn new_from_env() -> Result<Self, EnvError> {
        let v = var::DocflowEnv::new()?;
        Ok(Self::from_str(v.as_ref())?)
    }

    /// attempt to create a new [Environment] falling back to production if we fail to construct
    pub fn new_or_prod() -> Self {
        Self::new_from_env().unwrap_or(Environment::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "prod"),
            Environment::Develop => write!(f, "dev"),
            Environment::Local => write!(f, "local"),
        }
    }
}

/// Represents a value which cannot be converted into an [Environment]
#[derive(Debug, Error)]
#[error("Could not convert {0} into an environment value")]
pub struct UnknownValue(String);

impl FromStr for Environment {
    type Err = UnknownValue;

    fn from_str(environment: &str) -> Result<Self, UnknownValue> {
        match environment {
            "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Develop),
            "local" => Ok(Environment::Local),
            s => Err(UnknownValue(s.to_string())),
        }
    }
}
