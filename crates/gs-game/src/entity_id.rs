//! Entity id allocation.
//!
//! An entity id packs its kind into the high byte and a world-wide counter
//! into the low 24 bits, so clients can tell avatars from gadgets by id alone.

use std::sync::atomic::{AtomicU32, Ordering};

use gs_proto::packets::ProtEntityType;
use tracing::warn;

/// Low 24 bits of an id hold the counter.
pub const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Kind tag stored in the high byte of an entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityIdType {
    Avatar = 0x01,
    Monster = 0x02,
    Npc = 0x03,
    Gadget = 0x04,
    Weather = 0x05,
    Team = 0x09,
    MpLevel = 0x0B,
}

impl EntityIdType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Avatar),
            0x02 => Some(Self::Monster),
            0x03 => Some(Self::Npc),
            0x04 => Some(Self::Gadget),
            0x05 => Some(Self::Weather),
            0x09 => Some(Self::Team),
            0x0B => Some(Self::MpLevel),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Entity type reported to clients.
    pub fn prot_entity_type(&self) -> ProtEntityType {
        match self {
            Self::Avatar => ProtEntityType::Avatar,
            Self::Monster => ProtEntityType::Monster,
            Self::Npc => ProtEntityType::Npc,
            Self::Gadget => ProtEntityType::Gadget,
            Self::Weather => ProtEntityType::Weather,
            Self::Team => ProtEntityType::Team,
            Self::MpLevel => ProtEntityType::MpLevel,
        }
    }
}

/// Recover the kind of an id produced by [`EntityIdAllocator::next`].
pub fn entity_kind(entity_id: u32) -> Option<EntityIdType> {
    EntityIdType::from_u8((entity_id >> 24) as u8)
}

/// Thread-safe entity id allocator, shared by every scene of a world.
#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: AtomicU32,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id of the given kind.
    ///
    /// Ids are unique for the first 2^24 - 1 allocations. Past that the
    /// counter wraps inside its 24 bits and the kind byte is left intact.
    pub fn next(&self, kind: EntityIdType) -> u32 {
        let mut counter = self.next.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & COUNTER_MASK;
        if counter == 0 {
            warn!("Entity id counter wrapped, ids will be reused");
            counter = self.next.fetch_add(1, Ordering::Relaxed).wrapping_add(1) & COUNTER_MASK;
        }
        ((kind.as_u8() as u32) << 24) | counter
    }

    /// Number of ids handed out so far.
    pub fn current(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

/// What an entity needs from its scene while being constructed.
///
/// `Scene` implements this; tests can supply a lightweight stand-in.
pub trait SpawnContext {
    fn scene_id(&self) -> u32;

    /// Peer that is authoritative for entities spawned by the server.
    fn host_peer_id(&self) -> u32;

    fn next_entity_id(&self, kind: EntityIdType) -> u32;
}
