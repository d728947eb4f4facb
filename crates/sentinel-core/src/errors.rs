/// Core error type.
///
/// Adapter crates map these into their own surface (chat reply, HTTP status)
/// instead of letting them cross the boundary as opaque failures. Every
/// variant is a local, data-level outcome; none is process-fatal except
/// `Config`, which only the binary treats as fatal at startup.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("url must start with http:// or https://")]
    InvalidScheme,

    #[error("short code not found: {0}")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid page number, max page {max_page}")]
    InvalidPage { max_page: usize },

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
