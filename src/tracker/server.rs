use std::fmt;
use std::net::IpAddr;

use super::error::TrackerError;
use super::listener::TrackerListener;
use super::peer::Peer;
use super::request::{AnnounceEvent, AnnounceRequest};
use super::response::AnnounceResponse;
use super::store::PeerStore;
use crate::constants::{DEFAULT_ANNOUNCE_INTERVAL, DEFAULT_MAX_GIVE};
use crate::metainfo::InfoHash;

/// Configuration for a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Re-announce interval handed to clients, in seconds.
    pub interval: u32,
    /// Register unknown torrents on first announce instead of rejecting them.
    pub auto_register: bool,
    /// Maximum number of peers returned per announce.
    pub max_give: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_ANNOUNCE_INTERVAL,
            auto_register: false,
            max_give: DEFAULT_MAX_GIVE,
        }
    }
}

/// Announce handling on top of a [`PeerStore`].
///
/// The tracker does no I/O. A front end hands it decoded query parameters
/// and writes the returned body back to the client.
///
/// # Examples
///
/// ```
/// use btkit::tracker::{MemoryStore, Tracker, TrackerConfig};
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let config = TrackerConfig { auto_register: true, ..TrackerConfig::default() };
/// let mut tracker = Tracker::with_config(MemoryStore::new(), config);
///
/// let params: [(&str, &[u8]); 8] = [
///     ("info_hash", &[0xaa; 20][..]),
///     ("peer_id", &[0x01; 20][..]),
///     ("port", b"6881"),
///     ("uploaded", b"0"),
///     ("downloaded", b"0"),
///     ("left", b"100"),
///     ("event", b"started"),
///     ("compact", b"1"),
/// ];
/// let client = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
///
/// let body = tracker.announce(params, Some(client));
/// assert_eq!(body, b"d8:completei0e10:incompletei0e8:intervali3600e5:peers0:e");
/// ```
pub struct Tracker<S> {
    store: S,
    config: TrackerConfig,
    listeners: Vec<Box<dyn TrackerListener>>,
}

impl<S: fmt::Debug> fmt::Debug for Tracker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: PeerStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, TrackerConfig::default())
    }

    pub fn with_config(store: S, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners fire in registration order.
    pub fn add_listener(&mut self, listener: impl TrackerListener + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    fn notify(&mut self, mut hook: impl FnMut(&mut dyn TrackerListener)) {
        for listener in &mut self.listeners {
            hook(listener.as_mut());
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies an announce to the store and builds the response.
    ///
    /// Registered [`TrackerListener`]s are notified along the way.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::TorrentNotFound`] if the torrent is not registered
    ///   and auto registration is off
    /// - [`TrackerError::UnknownPeer`] if a peer the tracker has never seen
    ///   announces without `started`
    pub fn serve(&mut self, request: &AnnounceRequest) -> Result<AnnounceResponse, TrackerError> {
        let info_hash = &request.info_hash;

        if !self.store.torrent_exists(info_hash) {
            self.notify(|l| l.torrent_does_not_exist(info_hash));
            if !self.config.auto_register {
                return Err(TrackerError::TorrentNotFound);
            }
            self.store.add_torrent(*info_hash);
            tracing::debug!(info_hash = %InfoHash::from(*info_hash), "registered torrent");
            self.notify(|l| l.torrent_automatically_registered(info_hash));
        }

        let known = self.store.peer_exists(info_hash, &request.peer_id);
        let peer = Peer::from_request(request);
        self.notify(|l| l.post_created_peer(request, &peer));

        tracing::debug!(
            info_hash = %InfoHash::from(*info_hash),
            peer = %peer.addr(),
            event = %request.event,
            known,
            "announce"
        );

        match request.event {
            AnnounceEvent::Stopped if known => {
                self.notify(|l| l.event_stopped(info_hash, &peer));
                self.store.delete_peer(info_hash, &peer.id);
            }
            AnnounceEvent::Completed if known => {
                self.notify(|l| l.event_completed(info_hash, &peer));
                self.store.complete_peer(info_hash, peer.clone());
            }
            AnnounceEvent::Started => {
                self.notify(|l| l.event_started(info_hash, &peer));
                self.store.add_peer(info_hash, peer.clone());
            }
            _ if known => {
                self.notify(|l| l.event_announcement(info_hash, &peer));
                self.store.update_peer(info_hash, peer.clone());
            }
            _ => return Err(TrackerError::UnknownPeer),
        }

        let mut peers = self
            .store
            .peers(info_hash, self.config.max_give, Some(&peer.id));
        peers.truncate(self.config.max_give);
        self.notify(|l| l.pre_create_response(request, &peers));

        let mut response = AnnounceResponse::new(self.config.interval);
        response.peers = peers;
        response.compact = request.compact;
        response.no_peer_id = request.no_peer_id;
        self.notify(|l| l.post_create_response(&mut response));

        Ok(response)
    }

    /// Validates raw announce parameters, serves them and encodes the body.
    ///
    /// Any failure is turned into a `failure reason` body.
    pub fn announce<I, K, V>(&mut self, params: I, client_ip: Option<IpAddr>) -> Vec<u8>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        self.notify(|l| l.pre_validate_request());
        let result = AnnounceRequest::from_params(params, client_ip).and_then(|request| {
            self.notify(|l| l.post_validate_request(&request));
            self.serve(&request)
        });

        match result {
            Ok(response) => response.encode(),
            Err(e) => {
                tracing::debug!(error = %e, "announce rejected");
                e.failure_response()
            }
        }
    }
}
