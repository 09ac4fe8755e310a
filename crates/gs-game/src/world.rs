//! A world owns the scenes of one host and the entity id counter they share.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::entity_id::{EntityIdAllocator, EntityIdType};
use crate::error::GameError;
use crate::scene::{Scene, ScenePlayer};

pub struct World {
    host_uid: u32,
    host_peer_id: u32,
    ids: Arc<EntityIdAllocator>,
    scenes: HashMap<u32, Scene>,
}

impl World {
    pub fn new(host_uid: u32, host_peer_id: u32) -> Self {
        Self {
            host_uid,
            host_peer_id,
            ids: Arc::new(EntityIdAllocator::new()),
            scenes: HashMap::new(),
        }
    }

    pub fn host_uid(&self) -> u32 {
        self.host_uid
    }

    pub fn host_peer_id(&self) -> u32 {
        self.host_peer_id
    }

    /// Allocate an id from the world-wide counter.
    pub fn next_entity_id(&self, kind: EntityIdType) -> u32 {
        self.ids.next(kind)
    }

    pub fn get_or_create_scene(&mut self, scene_id: u32) -> &mut Scene {
        let host_peer_id = self.host_peer_id;
        let ids = &self.ids;
        self.scenes.entry(scene_id).or_insert_with(|| {
            info!("Created scene {}", scene_id);
            Scene::new(scene_id, host_peer_id, Arc::clone(ids))
        })
    }

    pub fn scene(&self, scene_id: u32) -> Option<&Scene> {
        self.scenes.get(&scene_id)
    }

    pub fn scene_mut(&mut self, scene_id: u32) -> Result<&mut Scene, GameError> {
        self.scenes
            .get_mut(&scene_id)
            .ok_or(GameError::UnknownScene(scene_id))
    }

    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    pub fn scenes_mut(&mut self) -> impl Iterator<Item = &mut Scene> {
        self.scenes.values_mut()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Drop a scene unless it is pinned. Returns whether it was removed.
    pub fn deregister_scene(&mut self, scene_id: u32) -> bool {
        match self.scenes.get(&scene_id) {
            Some(scene) if !scene.dont_destroy_when_empty() => {
                self.scenes.remove(&scene_id);
                info!("Deregistered scene {}", scene_id);
                true
            }
            _ => false,
        }
    }

    /// Scene currently holding `uid`, if any.
    pub fn scene_of_player(&self, uid: u32) -> Option<u32> {
        self.scenes
            .values()
            .find(|scene| scene.get_player(uid).is_some())
            .map(|scene| scene.id())
    }

    /// Put a player into a scene, creating the scene on demand, and show
    /// them what is already there. A player coming from another scene is
    /// removed from it first.
    pub fn add_player(&mut self, scene_id: u32, player: ScenePlayer) -> bool {
        let uid = player.uid;
        if let Some(prev) = self.scene_of_player(uid).filter(|&prev| prev != scene_id) {
            debug!("Player {} moving from scene {} to {}", uid, prev, scene_id);
            if let Err(e) = self.remove_player(prev, uid) {
                warn!("Failed to leave scene {}: {}", prev, e);
            }
        }
        let scene = self.get_or_create_scene(scene_id);
        if !scene.add_player(player) {
            return false;
        }
        scene.show_other_entities(uid);
        true
    }

    /// Take a player out of a scene. A scene left with no players and no
    /// entities is deregistered.
    pub fn remove_player(
        &mut self,
        scene_id: u32,
        uid: u32,
    ) -> Result<Option<ScenePlayer>, GameError> {
        let scene = self.scene_mut(scene_id)?;
        let removed = scene.remove_player(uid);
        if scene.player_count() == 0 && scene.entity_count() == 0 {
            self.deregister_scene(scene_id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_id::{entity_kind, SpawnContext};
    use crate::item_data::{ItemData, ItemType};
    use gs_proto::types::Vec3;

    fn flower() -> Arc<ItemData> {
        Arc::new(ItemData {
            id: 101,
            name: "Sweet Flower".into(),
            item_type: ItemType::Material,
            gadget_id: 70600055,
            stack_limit: 2000,
            rank_level: 1,
            skill_affix: Vec::new(),
            main_prop_id: 0,
        })
    }

    #[test]
    fn scenes_created_once() {
        let mut world = World::new(10001, 1);
        world.get_or_create_scene(3);
        world.get_or_create_scene(3);
        world.get_or_create_scene(5);
        assert_eq!(world.scene_count(), 2);
        assert_eq!(world.scene(3).map(|s| s.host_peer_id()), Some(1));
    }

    #[test]
    fn ids_shared_across_scenes() {
        let mut world = World::new(10001, 1);
        let a = world
            .get_or_create_scene(3)
            .spawn_item(flower(), 1, Vec3::ZERO, None);
        let b = world
            .get_or_create_scene(5)
            .spawn_item(flower(), 1, Vec3::ZERO, None);
        let c = world.next_entity_id(EntityIdType::Avatar);
        assert_ne!(a, b);
        assert_eq!(b & 0x00FF_FFFF, (a & 0x00FF_FFFF) + 1);
        assert_eq!(entity_kind(c), Some(EntityIdType::Avatar));
    }

    #[test]
    fn unknown_scene() {
        let mut world = World::new(10001, 1);
        assert!(matches!(world.scene_mut(9), Err(GameError::UnknownScene(9))));
        assert!(matches!(
            world.remove_player(9, 10001),
            Err(GameError::UnknownScene(9))
        ));
    }

    #[test]
    fn add_player_shows_existing_entities() {
        let mut world = World::new(10001, 1);
        let id = world
            .get_or_create_scene(3)
            .spawn_item(flower(), 1, Vec3::ZERO, None);
        assert!(world.add_player(3, ScenePlayer::new(10001, 1, "host")));
        assert!(!world.add_player(3, ScenePlayer::new(10001, 1, "host")));

        let out = world.scene_mut(3).unwrap().drain_outgoing();
        // Time first, then everything already in the scene.
        assert_eq!(out.len(), 2);
        let meet: gs_proto::packets::SceneEntityAppearNotify =
            out[1].packet.decode_payload().unwrap();
        assert_eq!(meet.entity_list[0].entity_id, id);
    }

    #[test]
    fn empty_scene_deregistered_on_leave() {
        let mut world = World::new(10001, 1);
        world.add_player(3, ScenePlayer::new(10001, 1, "host"));
        let left = world.remove_player(3, 10001).unwrap();
        assert_eq!(left.map(|p| p.uid), Some(10001));
        assert!(world.scene(3).is_none());
    }

    #[test]
    fn scene_with_items_survives() {
        let mut world = World::new(10001, 1);
        world.add_player(3, ScenePlayer::new(10001, 1, "host"));
        world
            .get_or_create_scene(3)
            .spawn_item(flower(), 1, Vec3::ZERO, None);
        world.remove_player(3, 10001).unwrap();
        assert!(world.scene(3).is_some());
    }

    #[test]
    fn joining_another_scene_leaves_the_previous_one() {
        let mut world = World::new(10001, 1);
        world.add_player(3, ScenePlayer::new(10001, 1, "host"));
        world.add_player(3, ScenePlayer::new(10002, 2, "guest"));
        let gadget = crate::entity::EntityClientGadget::new(
            3,
            10002,
            2,
            crate::entity::CreateGadgetRequest {
                entity_id: 0x0400_9000,
                config_id: 41038001,
                ..Default::default()
            },
        );
        world.scene_mut(3).unwrap().on_player_create_gadget(gadget);

        assert!(world.add_player(5, ScenePlayer::new(10002, 2, "guest")));
        assert_eq!(world.scene_of_player(10002), Some(5));
        let old = world.scene(3).unwrap();
        assert!(old.get_player(10002).is_none());
        assert!(!old.is_in_scene(0x0400_9000));
        assert!(world.scene(5).unwrap().get_player(10002).is_some());
    }

    #[test]
    fn moving_out_of_empty_scene_deregisters_it() {
        let mut world = World::new(10001, 1);
        world.add_player(3, ScenePlayer::new(10002, 2, "guest"));
        world.add_player(5, ScenePlayer::new(10002, 2, "guest"));
        assert!(world.scene(3).is_none());
        assert_eq!(world.scene_count(), 1);
    }

    #[test]
    fn pinned_scene_is_kept() {
        let mut world = World::new(10001, 1);
        world.get_or_create_scene(3).set_dont_destroy_when_empty(true);
        assert!(!world.deregister_scene(3));
        world.add_player(3, ScenePlayer::new(10001, 1, "host"));
        world.remove_player(3, 10001).unwrap();
        assert!(world.scene(3).is_some());

        world.get_or_create_scene(5);
        assert!(world.deregister_scene(5));
        assert!(!world.deregister_scene(5));
    }
}
