//! Discovery — the announce and listen halves of the protocol.
//!
//! The two loops never call each other. They cooperate only through the
//! network (every node hears every broadcast, its own included) and through
//! the [`NeighbourTable`](crate::table::NeighbourTable) the listener writes.

pub mod announce;
pub mod listener;

pub use announce::announce_loop;
pub use listener::{bind_listener_socket, listener_loop, sweep_loop};
