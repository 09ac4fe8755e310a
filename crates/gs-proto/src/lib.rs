//! Scene protocol types, field codec and packet framing.

pub mod codec;
pub mod error;
pub mod frame;
pub mod item;
pub mod packets;
pub mod types;
pub mod wire;
