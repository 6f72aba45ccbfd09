/*! Low-level message access and construction.

The `wire` module deals with the message *representation* on two levels.

 * The lowercase [`aodv::packet`] type wraps a sequence of octets and provides accessors for
   the individual fields of the three routing messages. After [`aodv::packet::check_len`]
   succeeded, no field accessor of the recognized message will panic.
 * The `Repr` family ([`aodv::Repr`], [`aodv::RequestRepr`], [`aodv::ReplyRepr`],
   [`aodv::ErrorRepr`]) is a compact, high-level description of the header data that can be
   created by parsing and written out with `emit`. `Repr::parse` never panics on a length
   checked packet and `Repr::emit` never panics when the target buffer is `buffer_len` octets
   long.

[`aodv::packet`]: aodv/struct.packet.html
[`aodv::packet::check_len`]: aodv/struct.packet.html#method.check_len
[`aodv::Repr`]: aodv/enum.Repr.html
[`aodv::RequestRepr`]: aodv/struct.RequestRepr.html
[`aodv::ReplyRepr`]: aodv/struct.ReplyRepr.html
[`aodv::ErrorRepr`]: aodv/struct.ErrorRepr.html

# Examples

To emit a route error into an octet buffer, and then parse it back:

```rust
use aodvx::wire::{aodv, Address, SeqNo};

let repr = aodv::Repr::Error(aodv::ErrorRepr {
    dest: Address::new(10, 0, 0, 2),
    dest_seqno: SeqNo(4),
});
let mut buffer = vec![0; repr.buffer_len()];
repr.emit(aodv::packet::new_unchecked_mut(&mut buffer));

let parsed = aodv::Repr::parse(aodv::packet::new_checked(&buffer).unwrap())
    .expect("malformed message");
assert_eq!(repr, parsed);
```
*/

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

pub mod aodv;
mod error;
mod node;

pub use self::aodv::{MessageType, Repr, SeqNo};
pub use self::error::{Error, Result};
pub use self::node::Address;
