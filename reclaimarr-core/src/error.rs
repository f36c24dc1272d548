use reclaimarr_model::MediaType;

/// Errors from upstream REST calls. Callers at the sync layer degrade
/// these to empty results; callers at the action layer surface them.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },

    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} response could not be decoded: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid {service} base URL: {source}")]
    BadBaseUrl {
        service: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Failures of the action executor. Validation variants mean nothing was
/// mutated; `Upstream` means the mutation was attempted and refused or
/// failed remotely.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("No archive folder was selected in the request")]
    MissingDestination,

    #[error("No archive folders are configured for {media_type} content")]
    NoConfiguredFolders { media_type: MediaType },

    #[error("The selected folder is not in the list of pre-configured archive folders")]
    DestinationNotAllowed,

    #[error("Could not find media item file path")]
    MissingFilePath,

    #[error("Item has no {media_type} library manager id")]
    MissingManagerId { media_type: MediaType },

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ActionError {
    /// Whether this failure was caught before any filesystem or upstream
    /// mutation was attempted.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ActionError::Upstream(_))
    }
}
