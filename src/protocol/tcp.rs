// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP device link.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time;

use crate::error::ProtocolError;
use crate::protocol::{ConnectionState, DeviceLink, Frame, decode, encode};

// ============================================================================
// LinkConfig - Address and timeouts of a device endpoint
// ============================================================================

/// Configuration for a TCP device endpoint.
///
/// # Examples
///
/// ```
/// use hearth_lib::protocol::LinkConfig;
/// use std::time::Duration;
///
/// // Simple configuration
/// let config = LinkConfig::new("192.168.1.50");
///
/// // With all options
/// let config = LinkConfig::new("192.168.1.50")
///     .with_port(5050)
///     .with_credentials("house", "secret")
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_request_timeout(Duration::from_millis(500));
/// assert_eq!(config.address(), "192.168.1.50:5050");
/// ```
#[derive(Debug, Clone)]
pub struct LinkConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl LinkConfig {
    /// Default device port.
    pub const DEFAULT_PORT: u16 = 5050;
    /// Default connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default round-trip timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the specified host.
    ///
    /// # Arguments
    ///
    /// * `host` - The hostname or IP address of the device endpoint
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            credentials: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the credentials of the house owner.
    ///
    /// The wire protocol has no login frame; the user name is attached to
    /// the link's log events.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the round-trip timeout of a single exchange.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the round-trip timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn user(&self) -> &str {
        self.credentials().map_or("", |(user, _)| user)
    }
}

// ============================================================================
// TcpDeviceLink - Line-oriented TCP client
// ============================================================================

/// A device link over a TCP connection.
///
/// Each frame is written as one line and answered by one line. A round
/// trip that times out, fails, or finds the connection closed drops the
/// connection; call [`connect`](DeviceLink::connect) again to recover.
///
/// # Examples
///
/// ```no_run
/// use hearth_lib::protocol::{DeviceLink, LinkConfig, TcpDeviceLink, fetch_state};
///
/// # async fn example() -> Result<(), hearth_lib::ProtocolError> {
/// let mut link = TcpDeviceLink::new(LinkConfig::new("127.0.0.1"));
/// link.connect().await?;
///
/// let state = fetch_state(&mut link).await?;
/// println!("{} values", state.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpDeviceLink {
    config: LinkConfig,
    stream: Option<BufReader<TcpStream>>,
    state: ConnectionState,
}

impl TcpDeviceLink {
    /// Creates a disconnected link.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            stream: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Returns the link configuration.
    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    fn drop_connection(&mut self, error: &ProtocolError) {
        tracing::warn!(address = %self.config.address(), error = %error, "Dropping device connection");
        self.stream = None;
        self.state = ConnectionState::Disconnected;
    }

    fn fail(&mut self, error: ProtocolError) -> ProtocolError {
        self.stream = None;
        self.state = ConnectionState::Failed(error.to_string());
        error
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn round_trip(
    stream: &mut BufReader<TcpStream>,
    line: &str,
) -> Result<String, ProtocolError> {
    stream.get_mut().write_all(line.as_bytes()).await?;
    stream.get_mut().write_all(b"\n").await?;
    stream.get_mut().flush().await?;

    let mut reply = String::new();
    if stream.read_line(&mut reply).await? == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(reply)
}

impl DeviceLink for TcpDeviceLink {
    async fn connect(&mut self) -> Result<(), ProtocolError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let address = self.config.address();
        tracing::debug!(address = %address, user = self.config.user(), "Connecting to device");

        let stream = match time::timeout(self.config.connect_timeout(), TcpStream::connect(&address))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(self.fail(ProtocolError::ConnectionFailed(format!("{address}: {e}"))));
            }
            Err(_) => {
                return Err(self.fail(ProtocolError::Timeout(millis(self.config.connect_timeout()))));
            }
        };

        stream.set_nodelay(true)?;
        self.stream = Some(BufReader::new(stream));
        self.state = ConnectionState::Connected;
        tracing::info!(address = %address, "Connected to device");
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // Best effort; the peer may already be gone
            let _ = stream.get_mut().shutdown().await;
            tracing::info!(address = %self.config.address(), "Disconnected from device");
        }
        self.state = ConnectionState::Disconnected;
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    async fn exchange(&mut self, frame: &Frame) -> Result<Frame, ProtocolError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProtocolError::NotConnected);
        };

        let line = encode(frame);
        tracing::debug!(frame = %line, "Sending frame");

        let reply = match time::timeout(self.config.request_timeout, round_trip(stream, &line)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                self.drop_connection(&e);
                return Err(e);
            }
            Err(_) => {
                let e = ProtocolError::Timeout(millis(self.config.request_timeout));
                self.drop_connection(&e);
                return Err(e);
            }
        };

        tracing::debug!(frame = %reply.trim_end(), "Received frame");
        decode(&reply).map_err(Into::into)
    }
}
