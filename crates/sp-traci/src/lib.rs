//! `sp-traci` — talk to a running SUMO instance over TraCI.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`constants`] | Command, variable, and type identifiers used on the wire   |
//! | [`codec`]     | `Writer`, `Reader`, `TraciValue`, command framing          |
//! | [`client`]    | `TraciClient`: request/response over any `Read + Write`   |
//! | [`simulator`] | `TraciSimulator`: `TrafficSimulator` on top of the client |
//! | [`launcher`]  | `SumoLauncher`: spawn `sumo`/`sumo-gui` and connect       |
//! | [`error`]     | `TraciError`, `TraciResult<T>`                             |
//!
//! # Wire format
//!
//! ```text
//! message  := u32 total_length  command*
//! command  := u8 length  u8 id  content          (length ≤ 255)
//!           | u8 0  u32 length  u8 id  content   (extended)
//! ```
//!
//! All integers and doubles are big-endian.  Every request is answered by a
//! status command (`result`, `description`) followed by any response
//! commands.
//!
//! The client is generic over its stream, so tests drive it with in-memory
//! buffers instead of a socket.

pub mod client;
pub mod codec;
pub mod constants;
pub mod error;
pub mod launcher;
pub mod simulator;

#[cfg(test)]
mod tests;

pub use client::TraciClient;
pub use codec::{RawCommand, Reader, TraciValue, Writer};
pub use error::{TraciError, TraciResult};
pub use launcher::SumoLauncher;
pub use simulator::TraciSimulator;
