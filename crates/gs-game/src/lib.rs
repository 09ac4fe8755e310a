//! Game logic: entity ids, item data, scene entities, scenes and worlds.

pub mod entity;
pub mod entity_id;
pub mod error;
pub mod game_item;
pub mod item_data;
pub mod scene;
pub mod world;
