use crate::events::feed_event::FeedEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    Disconnected(String),
    Protocol(String),
    InvalidData(String),
    /// A finite source (replay) has nothing left to deliver.
    Exhausted,
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::Disconnected(msg) => write!(f, "disconnected: {msg}"),
            StreamError::Protocol(msg) => write!(f, "protocol: {msg}"),
            StreamError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            StreamError::Exhausted => write!(f, "stream exhausted"),
        }
    }
}

pub trait FeedStream {
    /// `Ok(None)` means nothing was decoded before the read deadline.
    fn next_event(&mut self) -> Result<Option<FeedEvent>, StreamError>;

    fn request_balance(&mut self) -> Result<(), StreamError>;
}
