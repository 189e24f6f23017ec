use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::error::TrackerError;

/// The `event` parameter of an announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnounceEvent {
    /// A regular interval announce.
    #[default]
    None,
    Started,
    Stopped,
    Completed,
}

impl AnnounceEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnounceEvent::None => "",
            AnnounceEvent::Started => "started",
            AnnounceEvent::Stopped => "stopped",
            AnnounceEvent::Completed => "completed",
        }
    }
}

impl FromStr for AnnounceEvent {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(AnnounceEvent::None),
            "started" => Ok(AnnounceEvent::Started),
            "stopped" => Ok(AnnounceEvent::Stopped),
            "completed" => Ok(AnnounceEvent::Completed),
            other => Err(TrackerError::InvalidEvent(other.to_string())),
        }
    }
}

impl fmt::Display for AnnounceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated announce request.
///
/// Built from already percent-decoded query parameters. Binary parameters
/// (`info_hash`, `peer_id`) are taken as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
    pub ip: IpAddr,
    pub port: u16,
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub event: AnnounceEvent,
    /// The client accepts the compact peer list format ([BEP-23](http://bittorrent.org/beps/bep_0023.html)).
    pub compact: bool,
    /// The client does not need peer ids in a non-compact peer list.
    pub no_peer_id: bool,
}

impl AnnounceRequest {
    /// Validates announce parameters.
    ///
    /// `client_ip` is the address the request arrived from; an `ip`
    /// parameter takes precedence over it. When a parameter is repeated the
    /// last occurrence wins.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::MissingParameter`] if a required parameter (or any
    ///   source for the peer address) is absent
    /// - [`TrackerError::InvalidInfoHash`] / [`TrackerError::InvalidPeerId`]
    ///   if either is not exactly 20 bytes
    /// - [`TrackerError::InvalidPort`] if the port is not in `1..=65535`
    /// - [`TrackerError::InvalidEvent`] for an unknown event
    pub fn from_params<I, K, V>(params: I, client_ip: Option<IpAddr>) -> Result<Self, TrackerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let mut raw = RawParams::default();
        for (name, value) in params {
            let value = value.as_ref().to_vec();
            match name.as_ref() {
                "info_hash" => raw.info_hash = Some(value),
                "peer_id" => raw.peer_id = Some(value),
                "ip" => raw.ip = Some(value),
                "port" => raw.port = Some(value),
                "uploaded" => raw.uploaded = Some(value),
                "downloaded" => raw.downloaded = Some(value),
                "left" => raw.left = Some(value),
                "event" => raw.event = Some(value),
                "compact" => raw.compact = Some(value),
                "no_peer_id" => raw.no_peer_id = Some(value),
                _ => {}
            }
        }

        let info_hash: [u8; 20] = raw
            .info_hash
            .ok_or(TrackerError::MissingParameter("info_hash"))?
            .as_slice()
            .try_into()
            .map_err(|_| TrackerError::InvalidInfoHash)?;

        let peer_id: [u8; 20] = raw
            .peer_id
            .ok_or(TrackerError::MissingParameter("peer_id"))?
            .as_slice()
            .try_into()
            .map_err(|_| TrackerError::InvalidPeerId)?;

        let ip: IpAddr = match raw.ip {
            Some(ip) => {
                let text = String::from_utf8_lossy(&ip);
                text.parse()
                    .map_err(|_| TrackerError::InvalidIp(text.into_owned()))?
            }
            None => client_ip.ok_or(TrackerError::MissingParameter("ip"))?,
        };

        let port = raw.port.ok_or(TrackerError::MissingParameter("port"))?;
        let port = parse_port(&port)?;

        let uploaded = parse_counter(raw.uploaded, "uploaded")?;
        let downloaded = parse_counter(raw.downloaded, "downloaded")?;
        let left = parse_counter(raw.left, "left")?;

        let event = match raw.event {
            Some(event) => String::from_utf8_lossy(&event).parse::<AnnounceEvent>()?,
            None => AnnounceEvent::None,
        };

        Ok(Self {
            info_hash,
            peer_id,
            ip,
            port,
            uploaded,
            downloaded,
            left,
            event,
            compact: raw.compact.as_deref().is_some_and(is_truthy),
            no_peer_id: raw.no_peer_id.as_deref().is_some_and(is_truthy),
        })
    }

    /// Whether the announcing peer has the complete content.
    pub fn is_seeder(&self) -> bool {
        self.left == 0
    }
}

#[derive(Default)]
struct RawParams {
    info_hash: Option<Vec<u8>>,
    peer_id: Option<Vec<u8>>,
    ip: Option<Vec<u8>>,
    port: Option<Vec<u8>>,
    uploaded: Option<Vec<u8>>,
    downloaded: Option<Vec<u8>>,
    left: Option<Vec<u8>>,
    event: Option<Vec<u8>>,
    compact: Option<Vec<u8>>,
    no_peer_id: Option<Vec<u8>>,
}

fn parse_decimal(value: &[u8]) -> Option<u64> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(value).ok()?.parse().ok()
}

fn parse_port(value: &[u8]) -> Result<u16, TrackerError> {
    parse_decimal(value)
        .and_then(|port| u16::try_from(port).ok())
        .filter(|&port| port != 0)
        .ok_or_else(|| TrackerError::InvalidPort(String::from_utf8_lossy(value).into_owned()))
}

fn parse_counter(value: Option<Vec<u8>>, name: &'static str) -> Result<u64, TrackerError> {
    let value = value.ok_or(TrackerError::MissingParameter(name))?;
    parse_decimal(&value).ok_or(TrackerError::InvalidParameter(name))
}

fn is_truthy(value: &[u8]) -> bool {
    !value.is_empty() && value != b"0"
}
