use core::fmt;

/// The error type for parsing of routing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An incoming message could not be parsed because it was shorter than assumed.
    ///
    /// The message may be shorter than the minimum length of its kind, or the buffer may have
    /// been cut off by the link layer. Truncated messages carry no trustworthy routing state
    /// and are dropped without a reply.
    Truncated,

    /// An incoming message could not be recognized and was dropped.
    ///
    /// E.g. a datagram with an unknown type tag. This may be due to an outdated implementation
    /// of the protocol revision which defines identifiers in messages. It is not fatal:
    /// well-crafted protocols allow ignoring unknown message kinds.
    Unrecognized,

    /// An incoming message was recognized but was self-contradictory.
    ///
    /// Example: a route error that claims to describe zero unreachable destinations.
    Malformed,

    /// Parsing depends on a feature this implementation does not have.
    ///
    /// Example: a route error carrying more than one unreachable destination. We know the
    /// message is valid but refuse to report only a part of it.
    Unsupported,
}

/// The result type for the wire module.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated    => write!(f, "truncated message"),
            Error::Unrecognized => write!(f, "unrecognized message"),
            Error::Malformed    => write!(f, "malformed message"),
            Error::Unsupported  => write!(f, "unsupported message"),
        }
    }
}
