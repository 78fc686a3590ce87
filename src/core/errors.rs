use thiserror::Error;
use tokio::sync::mpsc::error::SendError;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid capability document: {0}")]
    InvalidCapabilities(String),

    #[error("Unknown card type: {0}")]
    UnknownCardType(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("DashboardError: {0}")]
    Custom(String),
}

impl<T> From<SendError<T>> for DashboardError {
    fn from(error: SendError<T>) -> Self {
        DashboardError::ChannelClosed(error.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(error: std::io::Error) -> Self {
        DashboardError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(error: reqwest::Error) -> Self {
        DashboardError::Reqwest(Box::new(error))
    }
}

impl From<tungstenite::Error> for DashboardError {
    fn from(error: tungstenite::Error) -> Self {
        DashboardError::WebSocket(Box::new(error))
    }
}
