use shared::error::ApiError;
use thiserror::Error;

/// Problems caught before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity}: `{field}` is required")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("testimonial rating must be between 1 and 5, got {rating}")]
    RatingOutOfRange { rating: u8 },
    #[error("footer section {section_id} does not exist")]
    UnknownFooterSection { section_id: i64 },
    #[error("footer section {section_id} is not a menu, account or info column and takes no links")]
    SectionTakesNoLinks { section_id: i64 },
    #[error("parent navbar item {parent_id} does not exist")]
    UnknownParent { parent_id: i64 },
    #[error("navbar item {id} cannot be its own parent")]
    SelfParent { id: i64 },
    #[error("{entity}: invalid fields: {detail}")]
    InvalidFields {
        entity: &'static str,
        detail: String,
    },
    #[error("image file is empty")]
    EmptyImage,
    #[error("image type `{extension}` is not allowed; use jpg, jpeg, png, gif or webp")]
    ImageType { extension: String },
    #[error("image is {size} bytes; the limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request: {0}")]
    Rejected(#[from] ApiError),
    #[error("server refused request: {0}")]
    Refused(String),
    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid endpoint url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("{entity}: a {operation} request is already in flight")]
    Busy {
        entity: &'static str,
        operation: &'static str,
    },
}

impl ClientError {
    /// Server-provided explanation, if the server gave one.
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Rejected(err) => err.detail.as_deref(),
            Self::Refused(detail) => Some(detail.as_str()),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
