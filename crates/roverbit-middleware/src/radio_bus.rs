//! Group-addressed radio broadcast built on [`tokio::sync::broadcast`].
//!
//! Every transmitter and every receiver shares one [`RadioBus`].  A packet
//! carries the group it was sent on; a [`RadioReceiver`] drops packets whose
//! group differs from the one its [`RadioLink`] has joined.  Until a group is
//! joined, nothing is heard.
//!
//! The group is held in a [`tokio::sync::watch`] channel so that changing it
//! through [`Radio::set_group`] takes effect for receivers that were created
//! earlier.

use roverbit_hal::Radio;
use roverbit_types::{RadioPacket, RoverError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace, warn};

/// Default channel capacity (packets buffered before slow receivers lag).
const DEFAULT_CAPACITY: usize = 64;

/// The shared medium.  Clone it cheaply – all clones share the same channel.
#[derive(Clone, Debug)]
pub struct RadioBus {
    sender: broadcast::Sender<RadioPacket>,
}

impl RadioBus {
    /// Create a bus buffering up to `capacity` packets per receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Transmit `payload` on `group`.
    ///
    /// Returns the number of receivers that were handed the packet, whether
    /// or not their group matches.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Radio`] when nobody is listening.
    pub fn send(&self, group: u8, payload: impl Into<String>) -> Result<usize, RoverError> {
        let packet = RadioPacket::new(group, payload);
        trace!(group, payload = %packet.payload, "radio transmit");
        self.sender
            .send(packet)
            .map_err(|_| RoverError::Radio(format!("no receivers listening on group {group}")))
    }

    /// Create a transceiver that has not joined any group yet.
    pub fn link(&self) -> RadioLink {
        let (group, _) = watch::channel(None);
        RadioLink {
            sender: self.sender.clone(),
            group,
        }
    }
}

impl Default for RadioBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Transceiver
// ---------------------------------------------------------------------------

/// The rover's transceiver.
///
/// Hand one to the controller as its [`Radio`] and call
/// [`subscribe`][Self::subscribe] on it beforehand to get the inbound
/// stream.  A link keeps the bus open while it exists.
#[derive(Debug)]
pub struct RadioLink {
    sender: broadcast::Sender<RadioPacket>,
    group: watch::Sender<Option<u8>>,
}

impl RadioLink {
    /// Start receiving.  Packets sent before this call are not seen.
    pub fn subscribe(&self) -> RadioReceiver {
        RadioReceiver {
            packets: self.sender.subscribe(),
            group: self.group.subscribe(),
        }
    }
}

impl Radio for RadioLink {
    fn set_group(&mut self, group: u8) -> Result<(), RoverError> {
        let previous = self.group.send_replace(Some(group));
        debug!(group, ?previous, "radio group set");
        Ok(())
    }

    fn group(&self) -> Option<u8> {
        *self.group.borrow()
    }
}

/// Inbound packets for one [`RadioLink`], filtered by its current group.
pub struct RadioReceiver {
    packets: broadcast::Receiver<RadioPacket>,
    group: watch::Receiver<Option<u8>>,
}

impl RadioReceiver {
    /// Wait for the next packet addressed to the link's group.
    ///
    /// Lagged packets are skipped with a warning.  Returns `None` once every
    /// sender is gone.
    pub async fn recv(&mut self) -> Option<RadioPacket> {
        loop {
            match self.packets.recv().await {
                Ok(packet) => {
                    let joined = *self.group.borrow();
                    if joined == Some(packet.group) {
                        return Some(packet);
                    }
                    trace!(packet_group = packet.group, ?joined, "ignoring packet for other group");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "radio receiver lagged, packets dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn joined_group_receives_payload() -> Result<(), Box<dyn std::error::Error>> {
        let bus = RadioBus::default();
        let mut link = bus.link();
        link.set_group(2)?;
        let mut rx = link.subscribe();

        bus.send(2, "Forward")?;

        let packet = rx.recv().await.ok_or("no packet received")?;
        assert_eq!(packet.payload, "Forward");
        assert_eq!(packet.group, 2);
        Ok(())
    }

    #[tokio::test]
    async fn other_groups_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let bus = RadioBus::default();
        let mut link = bus.link();
        link.set_group(4)?;
        let mut rx = link.subscribe();

        bus.send(2, "Left")?;
        bus.send(4, "Right")?;

        let packet = rx.recv().await.ok_or("no packet received")?;
        assert_eq!(packet.payload, "Right");
        Ok(())
    }

    #[tokio::test]
    async fn nothing_heard_before_joining() -> Result<(), Box<dyn std::error::Error>> {
        let bus = RadioBus::default();
        let link = bus.link();
        let mut rx = link.subscribe();
        assert_eq!(link.group(), None);

        bus.send(2, "Forward")?;

        assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn group_change_applies_to_existing_receiver() -> Result<(), Box<dyn std::error::Error>> {
        let bus = RadioBus::default();
        let mut link = bus.link();
        link.set_group(2)?;
        let mut rx = link.subscribe();

        link.set_group(4)?;
        assert_eq!(link.group(), Some(4));
        bus.send(2, "Left")?;
        bus.send(4, "Backward")?;

        let packet = rx.recv().await.ok_or("no packet received")?;
        assert_eq!(packet.payload, "Backward");
        Ok(())
    }

    #[tokio::test]
    async fn lagged_receiver_skips_to_newest() -> Result<(), Box<dyn std::error::Error>> {
        let bus = RadioBus::new(2);
        let mut link = bus.link();
        link.set_group(1)?;
        let mut rx = link.subscribe();

        for token in ["a", "b", "c", "d"] {
            bus.send(1, token)?;
        }

        let packet = rx.recv().await.ok_or("no packet received")?;
        assert_eq!(packet.payload, "c");
        Ok(())
    }

    #[test]
    fn send_without_receivers_is_an_error() {
        let bus = RadioBus::default();
        let err = bus.send(2, "Forward").unwrap_err();
        assert!(matches!(err, RoverError::Radio(_)));
    }

    #[tokio::test]
    async fn receiver_ends_when_bus_is_gone() {
        let bus = RadioBus::default();
        let link = bus.link();
        let mut rx = link.subscribe();
        drop(link);
        drop(bus);
        assert!(rx.recv().await.is_none());
    }
}
