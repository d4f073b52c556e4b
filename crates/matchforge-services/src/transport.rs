//! Transport bridge: hands a resolved connection to the network layer.

use matchforge_types::ConnectionDescriptor;

/// Performs the client-side "travel" to a session host.
///
/// Travel is one-way: the coordinator calls [`travel`](Self::travel)
/// exactly once per successful join and never hears back. Handshake
/// failures are the transport's (and the game's) concern.
pub trait TransportBridge: Send + Sync + 'static {
    fn travel(&self, descriptor: ConnectionDescriptor);
}
