//! Transport seam over the physical duplex connection.
//!
//! [`WsTransport`] is the production implementation on tokio-tungstenite.
//! The connection driver only depends on the traits, so tests swap in an
//! in-memory transport and script open/close sequences.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use veristream_shared::RealtimeError;

/// A raw inbound transport frame, already reduced to what the driver
/// cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Text(String),
    /// The peer sent a close frame. Always an unclean close from the
    /// driver's point of view; clean closes are locally initiated.
    Closed,
}

/// Factory for duplex connections to the event-stream endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), RealtimeError>;
}

/// Write half of one physical connection.
#[async_trait]
pub trait TransportSink: Send {
    async fn send_text(&mut self, text: String) -> Result<(), RealtimeError>;
    async fn close(&mut self) -> Result<(), RealtimeError>;
}

/// Read half of one physical connection. `None` means the stream ended
/// without a close frame (network drop).
#[async_trait]
pub trait TransportStream: Send {
    async fn next_message(&mut self) -> Option<Result<InboundMessage, RealtimeError>>;
}

/// Production transport over tokio-tungstenite.
#[derive(Debug, Default)]
pub struct WsTransport;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[async_trait]
impl Transport for WsTransport {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), RealtimeError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| RealtimeError::Transport(e.to_string()))?;
        let (write, read) = stream.split();
        Ok((
            Box::new(WsSink { write }),
            Box::new(WsReadStream { read }),
        ))
    }
}

struct WsSink {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl TransportSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), RealtimeError> {
        self.write
            .send(Message::text(text))
            .await
            .map_err(|e| RealtimeError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), RealtimeError> {
        self.write
            .send(Message::Close(None))
            .await
            .map_err(|e| RealtimeError::Transport(e.to_string()))
    }
}

struct WsReadStream {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for WsReadStream {
    async fn next_message(&mut self) -> Option<Result<InboundMessage, RealtimeError>> {
        while let Some(item) = self.read.next().await {
            match item {
                Ok(Message::Text(text)) => {
                    return Some(Ok(InboundMessage::Text(text.to_string())))
                }
                Ok(Message::Close(_)) => return Some(Ok(InboundMessage::Closed)),
                // Pongs are answered by tungstenite itself; binary frames
                // are not part of the protocol.
                Ok(_) => continue,
                Err(e) => return Some(Err(RealtimeError::Transport(e.to_string()))),
            }
        }
        None
    }
}
