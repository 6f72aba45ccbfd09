//! An on-demand routing engine for low-power wireless mesh networks.
//!
//! Nodes in an ad hoc mesh have no topology knowledge up front. Routes to other nodes are
//! discovered when they are first needed, refreshed while they are used, and torn down when a
//! link on the path breaks. This crate implements the distance-vector core of that scheme in
//! the style of RFC 3561 (AODV): a route table with rollover-safe sequence numbers for loop
//! prevention, the three message kinds (route request, route reply, route error), duplicate
//! flood suppression through a small direct-mapped cache, and rate-limited request issuance.
//!
//! ## Design and relevant core concepts
//!
//! Nothing in this crate *ever* dynamically allocates memory on its own. Setup code passes
//! preallocated storage for the route table and the forwarding cache explicitly, see the
//! [`managed`] module. The engine is a plain state machine driven by three kinds of events:
//!
//! * an inbound datagram, handed to [`layer::Endpoint::receive`],
//! * a cooperative scheduling turn, [`layer::Endpoint::tick`], which performs route table
//!   housekeeping and flushes the single pending command slot,
//! * calls from the rest of the stack, [`layer::Endpoint::request_route`] and
//!   [`layer::Endpoint::report_unreachable`].
//!
//! Each event is processed to completion before the engine yields; no handler blocks. Outbound
//! messages are handed to a caller supplied [`layer::Transport`], a best-effort broadcast or
//! unicast datagram service that is free to drop, reorder, or duplicate. The protocol is
//! designed to tolerate all three.
//!
//! The wire formats live in the [`wire`] module, in the packet/repr split described there.
//!
//! [`managed`]: managed/index.html
//! [`wire`]: wire/index.html
//! [`layer::Endpoint::receive`]: layer/struct.Endpoint.html#method.receive
//! [`layer::Endpoint::tick`]: layer/struct.Endpoint.html#method.tick
//! [`layer::Endpoint::request_route`]: layer/struct.Endpoint.html#method.request_route
//! [`layer::Endpoint::report_unreachable`]: layer/struct.Endpoint.html#method.report_unreachable
//! [`layer::Transport`]: layer/trait.Transport.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod layer;
pub mod managed;
pub mod time;
pub mod wire;
