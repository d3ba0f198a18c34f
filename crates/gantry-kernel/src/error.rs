use thiserror::Error;

/// Errors surfaced by the module host.
#[derive(Debug, Error)]
pub enum HostError {
    /// A second all-loaded barrier was registered while one was still
    /// outstanding. Silently dropping either callback would hide a
    /// real scheduling bug, so this fails loudly.
    #[error("an all-loaded barrier is already registered")]
    BarrierOccupied,

    /// The operation addressed a key with no registered record.
    #[error("no module registered under key `{0}`")]
    UnknownModule(String),
}

/// Failure to resolve a module implementation.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The source has no implementation for the key.
    #[error("no module implementation available for key `{0}`")]
    UnknownKey(String),

    /// The source found the module but could not produce it.
    #[error("module `{key}` failed to load: {reason}")]
    Source { key: String, reason: String },
}
