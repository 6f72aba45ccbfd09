//! The three routing messages: route request, route reply, route error.
//!
//! Message layouts follow the micro-AODV dialect: every message starts with a type tag, a flag
//! octet and a reserved octet, addresses are four octets and all multi-octet fields are in
//! network byte order. A request floods outward and builds reverse routes, a reply walks the
//! reverse routes back and builds forward routes, an error revokes a broken route.
use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::node::Address;

enum_with_unknown! {
    /// Routing message type.
    pub enum MessageType(u8) {
        RouteRequest = 1,
        RouteReply = 2,
        RouteError = 3,
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MessageType::RouteRequest => write!(f, "route request"),
            MessageType::RouteReply   => write!(f, "route reply"),
            MessageType::RouteError   => write!(f, "route error"),
            MessageType::Unknown(id)  => write!(f, "{}", id),
        }
    }
}

/// A monotonically advancing freshness counter, compared with rollover-safe arithmetic.
///
/// Every node advances its own sequence number when it originates routing state. Receivers
/// prefer the route carrying the fresher number, which is what prevents routing loops and
/// resurrecting stale routes. Comparison uses the signed difference rule of RFC 3561: a
/// counter that wraps from `0xffff_ffff` to `0` still counts as newer than its predecessor,
/// as long as the true numeric gap stays below half the counter space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeqNo(pub u32);

impl SeqNo {
    /// Whether `self` denotes strictly newer routing state than `other`.
    ///
    /// Total over all pairs, but only transitive while the compared counters stay within half
    /// the counter space of each other.
    #[inline]
    pub fn is_fresher_than(self, other: SeqNo) -> bool {
        self.0.wrapping_sub(other.0) as i32 > 0
    }

    /// Step the counter, returning the new value.
    pub fn advance(&mut self) -> SeqNo {
        self.0 = self.0.wrapping_add(1);
        *self
    }
}

impl From<u32> for SeqNo {
    fn from(value: u32) -> SeqNo {
        SeqNo(value)
    }
}

impl fmt::Display for SeqNo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request flag: the originator does not know a current sequence number for the destination.
pub const FLAG_UNKNOWN_SEQNO: u8 = 0x08;

/// Length in octets of a route request.
pub const REQUEST_LEN: usize = 24;
/// Length in octets of a route reply.
pub const REPLY_LEN: usize = 20;
/// Length in octets of a route error.
pub const ERROR_LEN: usize = 12;
/// Length in octets of the largest routing message.
pub const MAX_LEN: usize = REQUEST_LEN;

byte_wrapper! {
    /// A byte sequence representing any routing message.
    #[derive(Debug, PartialEq, Eq)]
    pub struct packet([u8]);
}

mod field {
    #![allow(non_snake_case)]

    use crate::wire::field::*;

    pub const TYPE: usize = 0;
    pub const FLAGS: usize = 1;
    pub const RESERVED: usize = 2;

    // Route request, after the common prefix.
    pub const HOP_COUNT: usize = 3;
    pub const RREQ_ID: Field = 4..8;
    pub const RREQ_DEST: Field = 8..12;
    pub const RREQ_DEST_SEQ: Field = 12..16;
    pub const RREQ_ORIG: Field = 16..20;
    pub const RREQ_ORIG_SEQ: Field = 20..24;

    // Route reply. Shares HOP_COUNT with the request.
    pub const RREP_ORIG: Field = 4..8;
    pub const RREP_DEST_SEQ: Field = 8..12;
    pub const RREP_DEST: Field = 12..16;
    pub const RREP_LIFETIME: Field = 16..20;

    // Route error. The fourth octet counts unreachable destinations instead of hops.
    pub const DEST_COUNT: usize = 3;
    pub const RERR_DEST: Field = 4..8;
    pub const RERR_DEST_SEQ: Field = 8..12;
}

impl packet {
    /// Imbue a raw octet buffer with message structure.
    pub fn new_unchecked(buffer: &[u8]) -> &packet {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with message structure.
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut packet {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&packet> {
        let msg = Self::new_unchecked(data);
        msg.check_len()?;
        Ok(msg)
    }

    /// Unwrap the message as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ensure that no accessor method of the recognized message kind will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than the fixed length of its
    /// message kind and `Err(Error::Unrecognized)` for an unknown type tag.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len <= field::TYPE {
            return Err(Error::Truncated);
        }
        let wanted = match self.msg_type() {
            MessageType::RouteRequest => REQUEST_LEN,
            MessageType::RouteReply => REPLY_LEN,
            MessageType::RouteError => ERROR_LEN,
            MessageType::Unknown(_) => return Err(Error::Unrecognized),
        };
        if len < wanted {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the type tag.
    #[inline]
    pub fn msg_type(&self) -> MessageType {
        MessageType::from(self.0[field::TYPE])
    }

    /// Return the flags octet.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.0[field::FLAGS]
    }

    /// Return the hop count field of a request or reply.
    #[inline]
    pub fn hop_count(&self) -> u8 {
        self.0[field::HOP_COUNT]
    }

    /// Return the unreachable destination count of an error.
    #[inline]
    pub fn dest_count(&self) -> u8 {
        self.0[field::DEST_COUNT]
    }

    /// Return the request id of a request.
    #[inline]
    pub fn rreq_id(&self) -> u32 {
        NetworkEndian::read_u32(&self.0[field::RREQ_ID])
    }

    /// Return the sought destination of a request.
    pub fn rreq_dest(&self) -> Address {
        Address::from_bytes(&self.0[field::RREQ_DEST])
    }

    /// Return the last known destination sequence number of a request.
    #[inline]
    pub fn rreq_dest_seqno(&self) -> SeqNo {
        SeqNo(NetworkEndian::read_u32(&self.0[field::RREQ_DEST_SEQ]))
    }

    /// Return the originator of a request.
    pub fn rreq_orig(&self) -> Address {
        Address::from_bytes(&self.0[field::RREQ_ORIG])
    }

    /// Return the originator sequence number of a request.
    #[inline]
    pub fn rreq_orig_seqno(&self) -> SeqNo {
        SeqNo(NetworkEndian::read_u32(&self.0[field::RREQ_ORIG_SEQ]))
    }

    /// Return the originator a reply travels back to.
    pub fn rrep_orig(&self) -> Address {
        Address::from_bytes(&self.0[field::RREP_ORIG])
    }

    /// Return the destination sequence number carried by a reply.
    #[inline]
    pub fn rrep_dest_seqno(&self) -> SeqNo {
        SeqNo(NetworkEndian::read_u32(&self.0[field::RREP_DEST_SEQ]))
    }

    /// Return the destination a reply answers for.
    pub fn rrep_dest(&self) -> Address {
        Address::from_bytes(&self.0[field::RREP_DEST])
    }

    /// Return the advertised route lifetime of a reply, in milliseconds.
    #[inline]
    pub fn rrep_lifetime(&self) -> u32 {
        NetworkEndian::read_u32(&self.0[field::RREP_LIFETIME])
    }

    /// Return the unreachable destination named by an error.
    pub fn rerr_dest(&self) -> Address {
        Address::from_bytes(&self.0[field::RERR_DEST])
    }

    /// Return the sequence number of the unreachable destination named by an error.
    #[inline]
    pub fn rerr_dest_seqno(&self) -> SeqNo {
        SeqNo(NetworkEndian::read_u32(&self.0[field::RERR_DEST_SEQ]))
    }

    /// Set the type tag.
    #[inline]
    pub fn set_msg_type(&mut self, value: MessageType) {
        self.0[field::TYPE] = value.into()
    }

    /// Set the flags octet.
    #[inline]
    pub fn set_flags(&mut self, value: u8) {
        self.0[field::FLAGS] = value
    }

    /// Zero the reserved octet.
    #[inline]
    pub fn clear_reserved(&mut self) {
        self.0[field::RESERVED] = 0
    }

    /// Set the hop count field of a request or reply.
    #[inline]
    pub fn set_hop_count(&mut self, value: u8) {
        self.0[field::HOP_COUNT] = value
    }

    /// Set the unreachable destination count of an error.
    #[inline]
    pub fn set_dest_count(&mut self, value: u8) {
        self.0[field::DEST_COUNT] = value
    }

    /// Set the request id of a request.
    #[inline]
    pub fn set_rreq_id(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.0[field::RREQ_ID], value)
    }

    /// Set the sought destination of a request.
    pub fn set_rreq_dest(&mut self, value: Address) {
        self.0[field::RREQ_DEST].copy_from_slice(value.as_bytes())
    }

    /// Set the last known destination sequence number of a request.
    #[inline]
    pub fn set_rreq_dest_seqno(&mut self, value: SeqNo) {
        NetworkEndian::write_u32(&mut self.0[field::RREQ_DEST_SEQ], value.0)
    }

    /// Set the originator of a request.
    pub fn set_rreq_orig(&mut self, value: Address) {
        self.0[field::RREQ_ORIG].copy_from_slice(value.as_bytes())
    }

    /// Set the originator sequence number of a request.
    #[inline]
    pub fn set_rreq_orig_seqno(&mut self, value: SeqNo) {
        NetworkEndian::write_u32(&mut self.0[field::RREQ_ORIG_SEQ], value.0)
    }

    /// Set the originator a reply travels back to.
    pub fn set_rrep_orig(&mut self, value: Address) {
        self.0[field::RREP_ORIG].copy_from_slice(value.as_bytes())
    }

    /// Set the destination sequence number carried by a reply.
    #[inline]
    pub fn set_rrep_dest_seqno(&mut self, value: SeqNo) {
        NetworkEndian::write_u32(&mut self.0[field::RREP_DEST_SEQ], value.0)
    }

    /// Set the destination a reply answers for.
    pub fn set_rrep_dest(&mut self, value: Address) {
        self.0[field::RREP_DEST].copy_from_slice(value.as_bytes())
    }

    /// Set the advertised route lifetime of a reply, in milliseconds.
    #[inline]
    pub fn set_rrep_lifetime(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.0[field::RREP_LIFETIME], value)
    }

    /// Set the unreachable destination named by an error.
    pub fn set_rerr_dest(&mut self, value: Address) {
        self.0[field::RERR_DEST].copy_from_slice(value.as_bytes())
    }

    /// Set the sequence number of the unreachable destination named by an error.
    #[inline]
    pub fn set_rerr_dest_seqno(&mut self, value: SeqNo) {
        NetworkEndian::write_u32(&mut self.0[field::RERR_DEST_SEQ], value.0)
    }
}

impl AsRef<[u8]> for packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for packet {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// A high-level representation of a route request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RequestRepr {
    /// The originator holds no current sequence number for the destination.
    pub unknown_seqno: bool,
    /// Hops accumulated from the originator to the node re-broadcasting the request.
    pub hop_count: u8,
    /// Flood identifier, monotonically increasing per originator.
    pub id: u32,
    /// The destination a route is sought for.
    pub dest: Address,
    /// The freshest destination sequence number known to the originator.
    pub dest_seqno: SeqNo,
    /// The node looking for the route.
    pub orig: Address,
    /// The originator's own sequence number at flood time.
    pub orig_seqno: SeqNo,
}

/// A high-level representation of a route reply.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReplyRepr {
    /// Hops between the replying node and the destination.
    pub hop_count: u8,
    /// The node the reply travels back to.
    pub orig: Address,
    /// The destination the reply answers for.
    pub dest: Address,
    /// The destination's sequence number as known by the replier.
    pub dest_seqno: SeqNo,
    /// Advertised lifetime of the route, in milliseconds.
    pub lifetime: u32,
}

/// A high-level representation of a route error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ErrorRepr {
    /// The destination that became unreachable through the sender.
    pub dest: Address,
    /// The last sequence number stored for that destination.
    pub dest_seqno: SeqNo,
}

/// A high-level representation of any routing message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Repr {
    /// A flooded route request.
    Request(RequestRepr),
    /// A unicast route reply.
    Reply(ReplyRepr),
    /// A route error revoking a broken route.
    Error(ErrorRepr),
}

impl Repr {
    /// Parse a length-checked packet into a high-level representation.
    pub fn parse(msg: &packet) -> Result<Repr> {
        msg.check_len()?;
        match msg.msg_type() {
            MessageType::RouteRequest => Ok(Repr::Request(RequestRepr {
                unknown_seqno: msg.flags() & FLAG_UNKNOWN_SEQNO != 0,
                hop_count: msg.hop_count(),
                id: msg.rreq_id(),
                dest: msg.rreq_dest(),
                dest_seqno: msg.rreq_dest_seqno(),
                orig: msg.rreq_orig(),
                orig_seqno: msg.rreq_orig_seqno(),
            })),
            MessageType::RouteReply => Ok(Repr::Reply(ReplyRepr {
                hop_count: msg.hop_count(),
                orig: msg.rrep_orig(),
                dest: msg.rrep_dest(),
                dest_seqno: msg.rrep_dest_seqno(),
                lifetime: msg.rrep_lifetime(),
            })),
            MessageType::RouteError => match msg.dest_count() {
                0 => Err(Error::Malformed),
                1 => Ok(Repr::Error(ErrorRepr {
                    dest: msg.rerr_dest(),
                    dest_seqno: msg.rerr_dest_seqno(),
                })),
                _ => Err(Error::Unsupported),
            },
            MessageType::Unknown(_) => Err(Error::Unrecognized),
        }
    }

    /// The length of a buffer required to hold the emitted message.
    pub fn buffer_len(&self) -> usize {
        match self {
            Repr::Request(_) => REQUEST_LEN,
            Repr::Reply(_) => REPLY_LEN,
            Repr::Error(_) => ERROR_LEN,
        }
    }

    /// Emit the representation into a packet buffer.
    ///
    /// # Panics
    /// The function panics if the underlying buffer is shorter than [buffer_len].
    ///
    /// [buffer_len]: #method.buffer_len
    pub fn emit(&self, msg: &mut packet) {
        msg.clear_reserved();
        match *self {
            Repr::Request(RequestRepr {
                unknown_seqno, hop_count, id, dest, dest_seqno, orig, orig_seqno,
            }) => {
                msg.set_msg_type(MessageType::RouteRequest);
                msg.set_flags(if unknown_seqno { FLAG_UNKNOWN_SEQNO } else { 0 });
                msg.set_hop_count(hop_count);
                msg.set_rreq_id(id);
                msg.set_rreq_dest(dest);
                msg.set_rreq_dest_seqno(dest_seqno);
                msg.set_rreq_orig(orig);
                msg.set_rreq_orig_seqno(orig_seqno);
            },
            Repr::Reply(ReplyRepr { hop_count, orig, dest, dest_seqno, lifetime }) => {
                msg.set_msg_type(MessageType::RouteReply);
                msg.set_flags(0);
                msg.set_hop_count(hop_count);
                msg.set_rrep_orig(orig);
                msg.set_rrep_dest_seqno(dest_seqno);
                msg.set_rrep_dest(dest);
                msg.set_rrep_lifetime(lifetime);
            },
            Repr::Error(ErrorRepr { dest, dest_seqno }) => {
                msg.set_msg_type(MessageType::RouteError);
                msg.set_flags(0);
                msg.set_dest_count(1);
                msg.set_rerr_dest(dest);
                msg.set_rerr_dest_seqno(dest_seqno);
            },
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Repr::Request(rreq) => write!(f,
                "RREQ for {} orig={} seq={} id={} hops={}",
                rreq.dest, rreq.orig, rreq.orig_seqno, rreq.id, rreq.hop_count),
            Repr::Reply(rrep) => write!(f,
                "RREP dest={} seq={} orig={} hops={}",
                rrep.dest, rrep.dest_seqno, rrep.orig, rrep.hop_count),
            Repr::Error(rerr) => write!(f,
                "RERR for {} seq={}", rerr.dest, rerr.dest_seqno),
        }
    }
}
