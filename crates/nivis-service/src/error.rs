use crate::config::ConfigError;
use crate::manager::Algorithm;

/// Errors surfaced by the id service.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No generator is registered under the requested name.
    #[error("no id generation algorithm named `{name}`")]
    UnknownAlgorithm { name: String },

    /// A maintenance task was asked to drive a generator that has no
    /// maintained clock.
    #[error("algorithm `{algorithm}` has no clock to maintain")]
    UnsupportedGenerator { algorithm: Algorithm },

    /// A generator rejected its construction or a mint.
    #[error("id generation failed: {0}")]
    Generator(#[from] nivis::Error),

    /// The service configuration could not be loaded.
    #[error("configuration fault: {0}")]
    Config(#[from] ConfigError),
}

/// Canonical result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;
