use crate::time::{Duration, Instant};
use crate::wire::aodv::{packet, ErrorRepr, ReplyRepr, RequestRepr};
use crate::wire::{Address, Repr, SeqNo};

use super::{Answer, Config, Endpoint, ForwardingCache, Entry, RouteTable, Seen, Transport};

const NODE_S: Address = Address::new(10, 0, 0, 1);
const NODE_M: Address = Address::new(10, 0, 0, 2);
const NODE_D: Address = Address::new(10, 0, 0, 3);
const NODE_X: Address = Address::new(10, 0, 0, 4);
const NODE_Y: Address = Address::new(10, 0, 0, 5);

/// Captures everything an endpoint emits.
#[derive(Default)]
struct Mock {
    /// `(None, _)` is a broadcast, `(Some(next_hop), _)` a unicast.
    sent: Vec<(Option<Address>, Vec<u8>)>,
}

impl Transport for Mock {
    fn unicast(&mut self, next_hop: Address, payload: &[u8]) {
        self.sent.push((Some(next_hop), payload.to_vec()));
    }

    fn broadcast(&mut self, payload: &[u8]) {
        self.sent.push((None, payload.to_vec()));
    }
}

impl Mock {
    fn take_single(&mut self) -> (Option<Address>, Vec<u8>) {
        assert_eq!(self.sent.len(), 1, "expected exactly one emission");
        self.sent.pop().unwrap()
    }
}

fn node(addr: Address) -> Endpoint<'static> {
    Endpoint::new(
        addr,
        RouteTable::new(vec![Entry::default(); 8]),
        ForwardingCache::new(vec![Seen::default(); 16]),
        Config::default())
}

fn serialize(repr: &Repr) -> Vec<u8> {
    let mut buffer = vec![0; repr.buffer_len()];
    repr.emit(packet::new_unchecked_mut(&mut buffer));
    buffer
}

/// Full discovery over the three node line topology S - M - D.
#[test]
fn three_node_discovery() {
    let (mut s, mut m, mut d) = (node(NODE_S), node(NODE_M), node(NODE_D));
    let now = Instant::from_millis(0);

    assert_eq!(s.request_route(NODE_D, now), Answer::Pending);
    let mut tx = Mock::default();
    s.tick(&mut tx);
    let (to, rreq) = tx.take_single();
    assert_eq!(to, None);

    // The middle node builds a reverse route and floods onward.
    let mut tx = Mock::default();
    m.receive(NODE_S, &rreq, &mut tx);
    let (to, rreq) = tx.take_single();
    assert_eq!(to, None);
    let reverse = m.routes().lookup(NODE_S).unwrap();
    assert_eq!(reverse.next_hop, NODE_S);
    assert_eq!(reverse.hop_count, 0);

    // The destination answers along the reverse path.
    let mut tx = Mock::default();
    d.receive(NODE_M, &rreq, &mut tx);
    let (to, rrep) = tx.take_single();
    assert_eq!(to, Some(NODE_M));
    assert_eq!(d.routes().lookup(NODE_S).unwrap().next_hop, NODE_M);

    // The middle node learns the forward route and relays the reply.
    let mut tx = Mock::default();
    m.receive(NODE_D, &rrep, &mut tx);
    let (to, rrep) = tx.take_single();
    assert_eq!(to, Some(NODE_S));
    let forward = m.routes().lookup(NODE_D).unwrap();
    assert_eq!(forward.next_hop, NODE_D);
    assert_eq!(forward.hop_count, 0);

    // The reply terminates at its originator without further emissions.
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);
    assert!(tx.sent.is_empty());

    match s.request_route(NODE_D, now) {
        Answer::Found(route) => {
            assert_eq!(route.next_hop, NODE_M);
            assert_eq!(route.hop_count, 1);
        },
        answer => panic!("expected a route, got {:?}", answer),
    }
}

#[test]
fn duplicate_request_suppressed() {
    let mut m = node(NODE_M);
    let mut s = node(NODE_S);

    let mut tx = Mock::default();
    assert_eq!(s.request_route(NODE_D, Instant::from_millis(0)), Answer::Pending);
    s.tick(&mut tx);
    let (_, rreq) = tx.take_single();

    // The same flood arrives twice, as it will on a shared medium.
    let mut tx = Mock::default();
    m.receive(NODE_S, &rreq, &mut tx);
    m.receive(NODE_S, &rreq, &mut tx);
    assert_eq!(tx.sent.len(), 1);
}

#[test]
fn own_request_echo_ignored() {
    let mut s = node(NODE_S);

    let mut tx = Mock::default();
    assert_eq!(s.request_route(NODE_D, Instant::from_millis(0)), Answer::Pending);
    s.tick(&mut tx);
    let (_, rreq) = tx.take_single();

    let mut tx = Mock::default();
    s.receive(NODE_M, &rreq, &mut tx);
    assert!(tx.sent.is_empty());
    assert!(s.routes().lookup(NODE_S).is_none());
}

#[test]
fn request_rate_limited() {
    let mut s = node(NODE_S);
    let t0 = Instant::from_millis(0);

    assert_eq!(s.request_route(NODE_D, t0), Answer::Pending);
    // Same destination re-asked: still the same pending discovery.
    assert_eq!(s.request_route(NODE_D, t0), Answer::Pending);
    // Another destination can not claim the occupied slot.
    assert_eq!(s.request_route(NODE_M, t0), Answer::RateLimited);

    let mut tx = Mock::default();
    s.tick(&mut tx);
    assert_eq!(tx.sent.len(), 1);

    // The slot is free again but the inter-flood spacing is not over yet.
    assert_eq!(s.request_route(NODE_M, t0 + Duration::from_millis(10)), Answer::RateLimited);
    assert_eq!(s.request_route(NODE_M, t0 + Duration::from_millis(125)), Answer::Pending);
}

#[test]
fn pending_request_cancelled_by_reply() {
    let mut s = node(NODE_S);

    assert_eq!(s.request_route(NODE_D, Instant::from_millis(0)), Answer::Pending);

    // A reply from a previous flood arrives before the new one leaves.
    let rrep = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(3),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);

    s.tick(&mut tx);
    assert!(tx.sent.is_empty());
    assert!(s.routes().lookup(NODE_D).is_some());
}

#[test]
fn intermediate_node_answers_from_table() {
    let (mut s, mut m) = (node(NODE_S), node(NODE_M));

    // Teach the middle node a direct route to the destination.
    let learned = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 0,
        orig: NODE_M,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    m.receive(NODE_D, &learned, &mut tx);

    let mut tx = Mock::default();
    assert_eq!(s.request_route(NODE_D, Instant::from_millis(0)), Answer::Pending);
    s.tick(&mut tx);
    let (_, rreq) = tx.take_single();

    // The middle node replies itself instead of flooding on.
    let mut tx = Mock::default();
    m.receive(NODE_S, &rreq, &mut tx);
    let (to, rrep) = tx.take_single();
    assert_eq!(to, Some(NODE_S));

    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);
    let route = s.routes().lookup(NODE_D).unwrap();
    assert_eq!(route.next_hop, NODE_M);
    assert_eq!(route.hop_count, 1);
    assert_eq!(route.seqno, SeqNo(5));
}

#[test]
fn reply_walks_stored_reverse_route() {
    let mut d = node(NODE_D);

    // The first flood establishes the reverse route S via X.
    let first = serialize(&Repr::Request(RequestRepr {
        unknown_seqno: true,
        hop_count: 1,
        id: 1,
        dest: NODE_D,
        dest_seqno: SeqNo(0),
        orig: NODE_S,
        orig_seqno: SeqNo(10),
    }));
    let mut tx = Mock::default();
    d.receive(NODE_X, &first, &mut tx);
    let (to, _) = tx.take_single();
    assert_eq!(to, Some(NODE_X));

    // A later flood with an older originator seqno arrives over Y. The stored reverse route
    // wins the replacement invariant, and the reply must follow it, not the sender.
    let second = serialize(&Repr::Request(RequestRepr {
        unknown_seqno: true,
        hop_count: 1,
        id: 2,
        dest: NODE_D,
        dest_seqno: SeqNo(0),
        orig: NODE_S,
        orig_seqno: SeqNo(9),
    }));
    let mut tx = Mock::default();
    d.receive(NODE_Y, &second, &mut tx);
    let (to, _) = tx.take_single();
    assert_eq!(to, Some(NODE_X));
    assert_eq!(d.routes().lookup(NODE_S).unwrap().next_hop, NODE_X);
}

#[test]
fn request_with_fresher_knowledge_floods_on() {
    let mut m = node(NODE_M);

    // The middle node holds a route to the destination at seqno 5.
    let learned = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 0,
        orig: NODE_M,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    m.receive(NODE_D, &learned, &mut tx);

    // The originator already discounts anything older than seqno 6, so answering from the
    // table would hand back stale state. The request travels on instead.
    let rreq = serialize(&Repr::Request(RequestRepr {
        unknown_seqno: false,
        hop_count: 0,
        id: 1,
        dest: NODE_D,
        dest_seqno: SeqNo(6),
        orig: NODE_S,
        orig_seqno: SeqNo(1),
    }));
    let mut tx = Mock::default();
    m.receive(NODE_S, &rreq, &mut tx);
    let (to, forwarded) = tx.take_single();
    assert_eq!(to, None);
    match Repr::parse(packet::new_checked(&forwarded).unwrap()).unwrap() {
        Repr::Request(forwarded) => assert_eq!(forwarded.hop_count, 1),
        repr => panic!("expected a forwarded request, got {}", repr),
    }
}

#[test]
fn error_revokes_and_propagates() {
    let (mut s, mut m) = (node(NODE_S), node(NODE_M));

    // S routes to D through M, M routes to D directly.
    let for_m = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 0,
        orig: NODE_M,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let for_s = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    m.receive(NODE_D, &for_m, &mut tx);
    s.receive(NODE_M, &for_s, &mut tx);

    // The link M - D breaks.
    m.report_unreachable(NODE_D);
    assert!(m.routes().lookup(NODE_D).is_none());
    let mut tx = Mock::default();
    m.tick(&mut tx);
    let (to, rerr) = tx.take_single();
    assert_eq!(to, None);

    // S drops its dependent route and warns its own neighborhood.
    let mut tx = Mock::default();
    s.receive(NODE_M, &rerr, &mut tx);
    assert!(s.routes().lookup(NODE_D).is_none());
    let (to, _) = tx.take_single();
    assert_eq!(to, None);
}

#[test]
fn stale_error_ignored() {
    let mut s = node(NODE_S);

    let rrep = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);

    // The error refers to older state than the stored route.
    let rerr = serialize(&Repr::Error(ErrorRepr {
        dest: NODE_D,
        dest_seqno: SeqNo(4),
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rerr, &mut tx);
    assert!(s.routes().lookup(NODE_D).is_some());
    assert!(tx.sent.is_empty());
}

#[test]
fn error_from_wrong_neighbor_ignored() {
    let mut s = node(NODE_S);

    let rrep = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);

    // Only the next hop of the stored route may revoke it.
    let rerr = serialize(&Repr::Error(ErrorRepr {
        dest: NODE_D,
        dest_seqno: SeqNo(9),
    }));
    let mut tx = Mock::default();
    s.receive(NODE_D, &rerr, &mut tx);
    assert!(s.routes().lookup(NODE_D).is_some());
    assert!(tx.sent.is_empty());
}

#[test]
fn garbage_input_dropped() {
    let mut s = node(NODE_S);

    let mut tx = Mock::default();
    s.receive(NODE_M, &[], &mut tx);
    s.receive(NODE_M, &[0x07, 0xff, 0xff], &mut tx);
    s.receive(NODE_M, &[0x01, 0x00], &mut tx);
    assert!(tx.sent.is_empty());
    assert!(s.routes().is_empty());
}

#[test]
fn flush_forgets_learned_state() {
    let mut s = node(NODE_S);

    let rrep = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);
    assert!(!s.routes().is_empty());

    s.flush();
    assert!(s.routes().is_empty());
    s.tick(&mut tx);
    assert!(tx.sent.is_empty());
}

#[test]
fn expired_routes_rediscovered() {
    let config = Config {
        route_lifetime: Some(2),
        ..Config::default()
    };
    let mut s = Endpoint::new(
        NODE_S,
        RouteTable::new(vec![Entry::default(); 8]),
        ForwardingCache::new(vec![Seen::default(); 16]),
        config);

    let rrep = serialize(&Repr::Reply(ReplyRepr {
        hop_count: 1,
        orig: NODE_S,
        dest: NODE_D,
        dest_seqno: SeqNo(5),
        lifetime: 0,
    }));
    let mut tx = Mock::default();
    s.receive(NODE_M, &rrep, &mut tx);

    for _ in 0..3 {
        s.tick(&mut tx);
    }
    assert!(s.routes().lookup(NODE_D).is_none());
    assert_eq!(s.request_route(NODE_D, Instant::from_millis(1000)), Answer::Pending);
}
