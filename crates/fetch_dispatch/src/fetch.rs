//! External collaborator seam: the blocking fetch operation and the
//! credential it requires.
//!
//! The engine treats the fetch as opaque I/O with unspecified latency. HTTP
//! clients, response decoding and the like live behind [`Fetch`]
//! implementations supplied by the caller; the dispatcher only sees
//! `Result<P>`.

use anyhow::{bail, Context, Result};
use std::fmt;

/// A blocking lookup invoked once per task.
///
/// Implementations must be `Send + Sync`: one instance is shared across all
/// worker threads of a batch via `Arc`. The call may block for arbitrary
/// external latency; the engine never preempts it.
pub trait Fetch<P>: Send + Sync {
    fn fetch(&self, key: &str, credential: &str) -> Result<P>;
}

/// Blanket impl so plain closures can serve as fetchers in small programs
/// and tests.
impl<P, F> Fetch<P> for F
where
    F: Fn(&str, &str) -> Result<P> + Send + Sync,
{
    fn fetch(&self, key: &str, credential: &str) -> Result<P> {
        self(key, credential)
    }
}

/// API credential handed to every fetch call.
///
/// Loading happens before dispatch begins; a missing or empty value is a
/// precondition failure and no worker is ever launched.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wraps an in-process credential value. Empty values are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            bail!("credential must not be empty");
        }
        Ok(Self(value))
    }

    /// Reads the credential from an environment variable.
    pub fn from_env(var: &str) -> Result<Self> {
        let value = std::env::var(var)
            .with_context(|| format!("environment variable {} is not set", var))?;
        Self::new(value).with_context(|| format!("environment variable {} is empty", var))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

// Keeps the secret out of debug logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}
