//! Generic `Radio` trait for the inbound command link.
//!
//! Only group selection lives here.  Delivery of inbound tokens is the
//! transport's business; see `roverbit-middleware`.

use roverbit_types::RoverError;

/// A radio transceiver that only hears packets sent to its group.
pub trait Radio: Send {
    /// Join `group`.  Packets on other groups are ignored from now on.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Radio`] if the transceiver rejects the group.
    fn set_group(&mut self, group: u8) -> Result<(), RoverError>;

    /// The currently joined group, if one has been set.
    fn group(&self) -> Option<u8>;
}
