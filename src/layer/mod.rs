//! The process logic of the routing protocol.
//!
//! The message logic is contained in `wire`, the processing part lives here. The [`Endpoint`]
//! represents the local protocol state: the route table, the forwarding cache and the single
//! pending command slot. The state is open to inspection and administrative calls while no
//! event is being processed, similar to reconfiguration with `route`/`ifconfig` utilities on
//! the OS level.
//!
//! ## Receiving
//!
//! The host stack hands every routing datagram to [`Endpoint::receive`] together with the
//! address of the immediate sender. Processing runs to completion and may emit messages
//! through the [`Transport`] before returning; there is no internal queueing.
//!
//! ## Sending
//!
//! Local sends are decoupled from caller context. [`Endpoint::request_route`] and
//! [`Endpoint::report_unreachable`] only record a pending command; the next scheduling turn
//! ([`Endpoint::tick`]) performs the actual emission. This keeps network I/O out of the
//! caller's stack frame and gives a natural place to rate-limit the shared broadcast medium.
//!
//! [`Endpoint`]: struct.Endpoint.html
//! [`Endpoint::receive`]: struct.Endpoint.html#method.receive
//! [`Endpoint::request_route`]: struct.Endpoint.html#method.request_route
//! [`Endpoint::report_unreachable`]: struct.Endpoint.html#method.report_unreachable
//! [`Endpoint::tick`]: struct.Endpoint.html#method.tick
//! [`Transport`]: trait.Transport.html

mod cache;
mod endpoint;
mod route;
#[cfg(test)]
mod tests;

pub use cache::{ForwardingCache, Seen};
pub use endpoint::{Answer, Config, Endpoint, Transport};
pub use route::{Entry, RouteTable};
