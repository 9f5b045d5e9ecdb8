/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending a frame to the peer failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading the next frame from the peer failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or upgrading an accepted socket failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
