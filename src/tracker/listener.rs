use super::peer::Peer;
use super::request::AnnounceRequest;
use super::response::AnnounceResponse;

/// Hooks into the announce flow of a [`Tracker`](super::Tracker).
///
/// Every method has an empty default body, so a listener only implements
/// the points it cares about. Listeners run in the order they were added.
///
/// The validation hooks fire from [`Tracker::announce`](super::Tracker::announce)
/// only; [`Tracker::serve`](super::Tracker::serve) receives a request that
/// is already validated.
pub trait TrackerListener: Send {
    /// Raw parameters are about to be validated.
    fn pre_validate_request(&mut self) {}

    /// The parameters formed a valid request.
    fn post_validate_request(&mut self, _request: &AnnounceRequest) {}

    /// The announced torrent is not registered.
    fn torrent_does_not_exist(&mut self, _info_hash: &[u8; 20]) {}

    /// The announced torrent was registered because auto registration is on.
    fn torrent_automatically_registered(&mut self, _info_hash: &[u8; 20]) {}

    /// The peer record for this announce was built from the request.
    fn post_created_peer(&mut self, _request: &AnnounceRequest, _peer: &Peer) {}

    /// A peer is about to be added with `started`.
    fn event_started(&mut self, _info_hash: &[u8; 20], _peer: &Peer) {}

    /// A known peer is about to be removed with `stopped`.
    fn event_stopped(&mut self, _info_hash: &[u8; 20], _peer: &Peer) {}

    /// A known peer is about to be marked as seed with `completed`.
    fn event_completed(&mut self, _info_hash: &[u8; 20], _peer: &Peer) {}

    /// A known peer is about to be updated by a regular announce.
    fn event_announcement(&mut self, _info_hash: &[u8; 20], _peer: &Peer) {}

    /// Peers were selected and the response is about to be built.
    fn pre_create_response(&mut self, _request: &AnnounceRequest, _peers: &[Peer]) {}

    /// The response is built; it may still be changed before it is returned.
    fn post_create_response(&mut self, _response: &mut AnnounceResponse) {}
}
