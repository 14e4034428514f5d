use crate::feed::envelope::{decode_envelope, encode_request};
use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tradewatch_domain::events::feed_event::FeedEvent;
use tradewatch_domain::repositories::feed_stream::{FeedStream, StreamError};
use tungstenite::protocol::Message;
use tungstenite::stream::MaybeTlsStream;
use url::Url;

type Socket = tungstenite::WebSocket<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct WebsocketOptions {
    pub url: String,
    pub read_timeout: Duration,
    pub request_event: String,
    pub keepalive: Duration,
}

impl WebsocketOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            read_timeout: Duration::from_millis(200),
            request_event: "request_balance".to_string(),
            keepalive: Duration::from_secs(25),
        }
    }
}

#[derive(Debug)]
pub struct WebsocketFeedStream {
    socket: Socket,
    request_event: String,
    keepalive: Duration,
    last_ping: Instant,
}

impl WebsocketFeedStream {
    pub fn connect(options: &WebsocketOptions) -> Result<Self, String> {
        let url = Url::parse(&options.url)
            .map_err(|e| format!("invalid feed url {}: {e}", options.url))?;
        let (socket, _resp) =
            tungstenite::connect(url.as_str()).map_err(|e| format!("ws connect failed: {e}"))?;
        set_read_timeout(&socket, options.read_timeout)?;
        info!(url = %url, "feed socket open");
        Ok(Self {
            socket,
            request_event: options.request_event.clone(),
            keepalive: options.keepalive.max(Duration::from_secs(1)),
            last_ping: Instant::now(),
        })
    }
}

impl FeedStream for WebsocketFeedStream {
    fn next_event(&mut self) -> Result<Option<FeedEvent>, StreamError> {
        if self.last_ping.elapsed() >= self.keepalive {
            self.socket
                .send(Message::Ping(Default::default()))
                .map_err(|e| StreamError::Disconnected(format!("ping failed: {e}")))?;
            self.last_ping = Instant::now();
        }

        let msg = match self.socket.read() {
            Ok(msg) => msg,
            Err(tungstenite::Error::Io(ref err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                return Ok(None);
            }
            Err(tungstenite::Error::Protocol(err)) => {
                return Err(StreamError::Protocol(err.to_string()));
            }
            Err(err) => return Err(StreamError::Disconnected(err.to_string())),
        };

        match msg {
            Message::Text(text) => decode_envelope(text.as_str()),
            Message::Ping(payload) => {
                let _ = self.socket.send(Message::Pong(payload));
                Ok(None)
            }
            Message::Close(frame) => {
                debug!(?frame, "server closed feed");
                Err(StreamError::Disconnected("server closed".to_string()))
            }
            Message::Pong(_) | Message::Binary(_) | Message::Frame(_) => Ok(None),
        }
    }

    fn request_balance(&mut self) -> Result<(), StreamError> {
        self.socket
            .send(Message::text(encode_request(&self.request_event)))
            .map_err(|e| StreamError::Disconnected(format!("balance request failed: {e}")))
    }
}

fn set_read_timeout(socket: &Socket, timeout: Duration) -> Result<(), String> {
    let timeout = Some(timeout.max(Duration::from_millis(1)));
    let result = match socket.get_ref() {
        MaybeTlsStream::Plain(tcp) => tcp.set_read_timeout(timeout),
        MaybeTlsStream::Rustls(tls) => tls.get_ref().set_read_timeout(timeout),
        _ => Ok(()),
    };
    result.map_err(|e| format!("failed to set feed read timeout: {e}"))
}

#[cfg(test)]
mod tests {
    use super::{WebsocketFeedStream, WebsocketOptions};
    use std::net::TcpListener;
    use std::thread;
    use tradewatch_domain::events::feed_event::FeedEvent;
    use tradewatch_domain::repositories::feed_stream::{FeedStream, StreamError};
    use tungstenite::protocol::Message;

    #[test]
    fn requests_balance_and_decodes_pushes_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (tcp, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(tcp).unwrap();
            let request = ws.read().unwrap().into_text().unwrap();
            ws.send(Message::text(
                r#"{"event":"balance_update","data":{"total_equity":1000.0}}"#,
            ))
            .unwrap();
            ws.close(None).unwrap();
            // Drain until the client acknowledges the close.
            while ws.read().is_ok() {}
            request.as_str().to_string()
        });

        let mut stream =
            WebsocketFeedStream::connect(&WebsocketOptions::new(format!("ws://{addr}/feed")))
                .unwrap();
        stream.request_balance().unwrap();

        let mut balance = None;
        let mut closed = false;
        for _ in 0..200 {
            match stream.next_event() {
                Ok(Some(event)) => balance = Some(event),
                Ok(None) => {}
                Err(StreamError::Disconnected(_)) => {
                    closed = true;
                    break;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        drop(stream);

        assert!(matches!(balance, Some(FeedEvent::Balance(_))));
        assert!(closed);
        assert_eq!(server.join().unwrap(), r#"{"event":"request_balance"}"#);
    }
}
