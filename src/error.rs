use thiserror::Error;

/// Failures raised by the fetch, load and narrative layers.
///
/// The CLI and orchestration layers wrap these in `anyhow` with context.
#[derive(Debug, Error)]
pub enum EoError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected JSON shape in {origin}: {detail}")]
    Shape { origin: String, detail: String },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    Date { value: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EoError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        EoError::Network {
            url: url.into(),
            source,
        }
    }

    pub fn shape(origin: impl Into<String>, detail: impl Into<String>) -> Self {
        EoError::Shape {
            origin: origin.into(),
            detail: detail.into(),
        }
    }
}

pub type EoResult<T> = std::result::Result<T, EoError>;
