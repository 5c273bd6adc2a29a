use thiserror::Error;

/// Errors building a [`MediaIdentity`](crate::MediaIdentity).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Title is required for every resolution attempt
    #[error("Media identity requires a non-empty title")]
    MissingTitle,
}

/// Reasons a parsed filename is rejected before resolution starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsedNameError {
    #[error("No title parsed from name")]
    MissingTitle,

    #[error("No resolution parsed from name")]
    MissingResolution,

    /// Season or episode came back as a list (multi-episode packs etc.)
    #[error("Ambiguous {0}: parsed as a list")]
    Ambiguous(&'static str),

    #[error("Season {0} has no episode number")]
    MissingEpisode(u32),
}
