use core::{fmt, str::FromStr};

/// A four-octet node address.
///
/// Addresses identify nodes of the mesh, not interfaces. The routing engine treats them as
/// opaque except for the broadcast and unspecified patterns; in deployments that run the
/// protocol over UDP/IP these are simply the host addresses.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 4]);

    /// The unspecified address, never assigned to a node.
    pub const UNSPECIFIED: Address = Address([0x00; 4]);

    /// Construct an address from four octets.
    pub const fn new(a0: u8, a1: u8, a2: u8, a3: u8) -> Address {
        Address([a0, a1, a2, a3])
    }

    /// Construct an address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not four octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return the address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() || self.is_unspecified())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether this address is unspecified.
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// The error returned when textual address parsing fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseAddressError {
    _private: (),
}

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("expected four dot-separated decimal octets")
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(src: &str) -> core::result::Result<Self, ParseAddressError> {
        let mut parsed = [0; 4];
        let mut components = src.split('.');
        for c in parsed.iter_mut() {
            let part = components
                .next()
                .ok_or(ParseAddressError { _private: () })?;
            *c = u8::from_str(part)
                .map_err(|_| ParseAddressError { _private: () })?;
        }

        if components.next().is_some() {
            return Err(ParseAddressError { _private: () });
        }

        Ok(Address(parsed))
    }
}
