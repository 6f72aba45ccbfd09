use core::mem;

use crate::time::{Duration, Instant};
use crate::wire::aodv::{self, packet, ErrorRepr, ReplyRepr, RequestRepr};
use crate::wire::{Address, Repr, SeqNo};

use super::cache::ForwardingCache;
use super::route::{Entry, RouteTable};

/// The output half of the host stack.
///
/// The engine never owns sockets. Whenever processing decides that a message must leave the
/// node it hands the serialized payload to this trait and forgets about it; delivery is
/// datagram best-effort and losses are recovered by protocol retries, not by the transport.
pub trait Transport {
    /// Send a payload to one direct neighbor.
    fn unicast(&mut self, next_hop: Address, payload: &[u8]);

    /// Send a payload to all direct neighbors.
    fn broadcast(&mut self, payload: &[u8]);
}

/// The answer to a route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// A route is known and was marked recently used.
    Found(Entry),
    /// No route yet but a discovery for this destination is underway.
    Pending,
    /// No route, and no discovery could be started right now.
    ///
    /// Either another command already occupies the send slot or the minimum spacing between
    /// self-originated floods has not elapsed. Ask again later.
    RateLimited,
}

/// Protocol knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Minimum spacing between self-originated request floods.
    pub rreq_interval: Duration,
    /// Scheduling turns a route survives without being used, `None` to never expire.
    pub route_lifetime: Option<u32>,
    /// Requests that accumulated this many hops are no longer re-broadcast.
    pub max_hop_count: u8,
    /// Advertised lifetime carried in originated replies, in milliseconds.
    ///
    /// Informational only. Receivers on this implementation ignore the field, `0` mirrors
    /// what constrained deployments of the protocol put on the wire.
    pub reply_lifetime: u32,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            rreq_interval: Duration::from_millis(125),
            route_lifetime: None,
            max_hop_count: 35,
            reply_lifetime: 0,
        }
    }
}

/// The single deferred send slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Idle,
    SendRequest(Address),
    SendError { dest: Address, seqno: SeqNo },
}

/// The local routing state of one mesh node.
///
/// One endpoint exists per node. It reacts to two kinds of events, incoming routing messages
/// ([receive]) and scheduling turns ([tick]), and is otherwise inert. Local wishes, a route
/// query or an unreachable report, do not emit anything themselves. They at most park a
/// command in the single deferred send slot, which the next turn executes. A newly parked
/// command displaces nothing except that unreachable reports displace pending requests; the
/// broken-route news is what the neighborhood needs most urgently.
///
/// [receive]: #method.receive
/// [tick]: #method.tick
#[derive(Debug)]
pub struct Endpoint<'a> {
    addr: Address,
    routes: RouteTable<'a>,
    seen: ForwardingCache<'a>,
    config: Config,
    seqno: SeqNo,
    rreq_id: u32,
    command: Command,
    silent_until: Instant,
}

impl<'a> Endpoint<'a> {
    /// Create an endpoint for the node with the given unicast address.
    pub fn new(
        addr: Address,
        routes: RouteTable<'a>,
        seen: ForwardingCache<'a>,
        config: Config,
    ) -> Endpoint<'a> {
        Endpoint {
            addr,
            routes,
            seen,
            config,
            seqno: SeqNo(0),
            rreq_id: 0,
            command: Command::Idle,
            silent_until: Instant::from_millis(0),
        }
    }

    /// The node's own address.
    pub fn addr(&self) -> Address {
        self.addr
    }

    /// The current route table, for inspection.
    pub fn routes(&self) -> &RouteTable<'a> {
        &self.routes
    }

    /// Process one incoming routing datagram.
    ///
    /// `sender` is the address of the immediate neighbor the datagram arrived from, which is
    /// generally not the originator of the message. Payloads that do not parse are logged and
    /// dropped; a routing engine must survive arbitrary input from the air.
    pub fn receive<T: Transport>(&mut self, sender: Address, payload: &[u8], tx: &mut T) {
        let repr = packet::new_checked(payload)
            .and_then(Repr::parse);
        let repr = match repr {
            Ok(repr) => repr,
            Err(err) => {
                net_debug!("dropping undecodable payload from {}: {}", sender, err);
                return;
            },
        };

        net_trace!("from {}: {}", sender, repr);
        match repr {
            Repr::Request(rreq) => self.handle_request(sender, rreq, tx),
            Repr::Reply(rrep) => self.handle_reply(sender, rrep, tx),
            Repr::Error(rerr) => self.handle_error(sender, rerr, tx),
        }
    }

    fn handle_request<T: Transport>(&mut self, sender: Address, rreq: RequestRepr, tx: &mut T) {
        if rreq.orig == self.addr {
            // Our own flood, echoed back by a neighbor.
            return;
        }
        if self.seen.seen(rreq.orig, rreq.id) {
            net_trace!("suppressing duplicate request {} of {}", rreq.id, rreq.orig);
            return;
        }

        // The path the request took backwards is a valid route to the originator. Replies
        // walk the table entry, which keeps an already stored fresher reverse route intact.
        let reverse_hop = self.routes
            .upsert(rreq.orig, sender, rreq.hop_count, rreq.orig_seqno)
            .next_hop;

        if rreq.dest == self.addr {
            // Answer with a number the requester can not mistake for stale state.
            let mut seqno = self.seqno.advance();
            if !rreq.unknown_seqno && rreq.dest_seqno.is_fresher_than(seqno) {
                self.seqno = SeqNo(rreq.dest_seqno.0.wrapping_add(1));
                seqno = self.seqno;
            }
            let reply = Repr::Reply(ReplyRepr {
                hop_count: 0,
                orig: rreq.orig,
                dest: self.addr,
                dest_seqno: seqno,
                lifetime: self.config.reply_lifetime,
            });
            return unicast(tx, reverse_hop, &reply);
        }

        if let Some(&route) = self.routes.lookup(rreq.dest) {
            // Reply on the destination's behalf, but only with state at least as fresh as
            // what the originator already discounts.
            if rreq.unknown_seqno || !rreq.dest_seqno.is_fresher_than(route.seqno) {
                self.routes.touch(rreq.dest);
                let reply = Repr::Reply(ReplyRepr {
                    hop_count: route.hop_count.saturating_add(1),
                    orig: rreq.orig,
                    dest: rreq.dest,
                    dest_seqno: route.seqno,
                    lifetime: self.config.reply_lifetime,
                });
                return unicast(tx, reverse_hop, &reply);
            }
        }

        if rreq.hop_count >= self.config.max_hop_count {
            net_trace!("request for {} exceeded {} hops", rreq.dest, self.config.max_hop_count);
            return;
        }
        self.seen.record(rreq.orig, rreq.id);
        broadcast(tx, &Repr::Request(RequestRepr {
            hop_count: rreq.hop_count + 1,
            ..rreq
        }));
    }

    fn handle_reply<T: Transport>(&mut self, sender: Address, rrep: ReplyRepr, tx: &mut T) {
        // The reply walked here from the destination, so the sender leads there.
        self.routes.upsert(rrep.dest, sender, rrep.hop_count, rrep.dest_seqno);

        if rrep.orig == self.addr {
            net_trace!("route to {} established", rrep.dest);
            return;
        }

        let next_hop = match self.routes.lookup(rrep.orig) {
            Some(route) => route.next_hop,
            None => {
                net_debug!("no reverse route for reply to {}", rrep.orig);
                return;
            },
        };
        self.routes.touch(rrep.orig);
        unicast(tx, next_hop, &Repr::Reply(ReplyRepr {
            hop_count: rrep.hop_count.saturating_add(1),
            ..rrep
        }));
    }

    fn handle_error<T: Transport>(&mut self, sender: Address, rerr: ErrorRepr, tx: &mut T) {
        let applies = match self.routes.lookup(rerr.dest) {
            // Only the node we would actually forward through can invalidate the route,
            // and only if we hold no fresher state than the error revokes.
            Some(route) =>
                route.next_hop == sender && !route.seqno.is_fresher_than(rerr.dest_seqno),
            None => false,
        };
        if !applies {
            net_trace!("ignoring error for {}", rerr.dest);
            return;
        }

        self.routes.remove(rerr.dest);
        // Everyone routing through us shares the broken path.
        broadcast(tx, &Repr::Error(rerr));
    }

    /// Run one scheduling turn.
    ///
    /// Ages the route table and executes the deferred command, if any. The caller decides the
    /// turn cadence; route lifetimes count these turns.
    pub fn tick<T: Transport>(&mut self, tx: &mut T) {
        self.routes.age_routes(self.config.route_lifetime);

        match mem::replace(&mut self.command, Command::Idle) {
            Command::Idle => (),
            Command::SendRequest(dest) => {
                if self.routes.lookup(dest).is_some() {
                    // A reply beat us to it between the query and this turn.
                    net_trace!("request for {} no longer needed", dest);
                } else {
                    self.send_request(dest, tx);
                }
            },
            Command::SendError { dest, seqno } => {
                broadcast(tx, &Repr::Error(ErrorRepr { dest, dest_seqno: seqno }));
            },
        }
    }

    fn send_request<T: Transport>(&mut self, dest: Address, tx: &mut T) {
        self.rreq_id = self.rreq_id.wrapping_add(1);
        let orig_seqno = self.seqno.advance();
        broadcast(tx, &Repr::Request(RequestRepr {
            unknown_seqno: true,
            hop_count: 0,
            id: self.rreq_id,
            dest,
            dest_seqno: SeqNo(0),
            orig: self.addr,
            orig_seqno,
        }));
    }

    /// Ask for a route to `dest`, starting a discovery when necessary.
    ///
    /// A hit also counts as route usage and defers its expiry. On a miss the discovery flood
    /// is not sent from here; it is parked for the next [tick], provided the send slot is
    /// free and at least [`Config::rreq_interval`] passed since the previous parked request.
    ///
    /// [tick]: #method.tick
    /// [`Config::rreq_interval`]: struct.Config.html#structfield.rreq_interval
    pub fn request_route(&mut self, dest: Address, now: Instant) -> Answer {
        if let Some(&route) = self.routes.lookup(dest) {
            self.routes.touch(dest);
            return Answer::Found(route);
        }

        match self.command {
            Command::SendRequest(pending) if pending == dest => Answer::Pending,
            Command::Idle if now >= self.silent_until => {
                self.command = Command::SendRequest(dest);
                self.silent_until = now + self.config.rreq_interval;
                Answer::Pending
            },
            _ => Answer::RateLimited,
        }
    }

    /// Report that forwarding through the route to `dest` failed.
    ///
    /// Drops the route immediately and parks an error broadcast for the next [tick],
    /// displacing any pending request; neighbors still forwarding into the broken path matter
    /// more than our own discovery.
    ///
    /// [tick]: #method.tick
    pub fn report_unreachable(&mut self, dest: Address) {
        let seqno = match self.routes.lookup(dest) {
            Some(route) => route.seqno,
            None => SeqNo(0),
        };
        self.routes.remove(dest);
        self.command = Command::SendError { dest, seqno };
    }

    /// Administratively forget all learned state.
    ///
    /// Clears the route table, the duplicate suppression cache and the pending command. The
    /// node's own sequence number is kept, forgetting it could resurrect stale routes
    /// elsewhere in the mesh.
    pub fn flush(&mut self) {
        self.routes.flush_all();
        self.seen.clear();
        self.command = Command::Idle;
    }
}

fn emit_into<'b>(buffer: &'b mut [u8; aodv::MAX_LEN], repr: &Repr) -> &'b [u8] {
    let len = repr.buffer_len();
    repr.emit(packet::new_unchecked_mut(&mut buffer[..len]));
    &buffer[..len]
}

fn unicast<T: Transport>(tx: &mut T, next_hop: Address, repr: &Repr) {
    net_trace!("to {}: {}", next_hop, repr);
    let mut buffer = [0u8; aodv::MAX_LEN];
    tx.unicast(next_hop, emit_into(&mut buffer, repr));
}

fn broadcast<T: Transport>(tx: &mut T, repr: &Repr) {
    net_trace!("to all: {}", repr);
    let mut buffer = [0u8; aodv::MAX_LEN];
    tx.broadcast(emit_into(&mut buffer, repr));
}
