//! A scene: the players in it, the entities they can see, and the packets
//! queued for them.
//!
//! Nothing here talks to the network. Broadcasts are wrapped in a
//! [`GamePacket`] per recipient and pushed onto an outgoing queue that the
//! network layer drains with [`Scene::drain_outgoing`].

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use gs_proto::frame::{encode_frame, GamePacket};
use gs_proto::packets::{
    Packet, SceneEntityAppearNotify, SceneEntityDisappearNotify, SceneTimeNotify, VisionType,
};
use gs_proto::types::Vec3;
use tracing::{debug, warn};

use crate::entity::{Entity, EntityClientGadget, EntityItem, GadgetEntity};
use crate::entity_id::{EntityIdAllocator, EntityIdType, SpawnContext};
use crate::error::GameError;
use crate::game_item::GameItem;
use crate::item_data::ItemData;

/// Minutes in an in-game day.
pub const DAY_MINUTES: u32 = 24 * 60;

/// Scene clock when a scene is created (08:00).
pub const DEFAULT_SCENE_TIME: u32 = 8 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClimateType {
    None = 0,
    #[default]
    Sunny = 1,
    Cloudy = 2,
    Rain = 3,
    Thunderstorm = 4,
    Snow = 5,
    Mist = 6,
}

impl ClimateType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Sunny),
            2 => Some(Self::Cloudy),
            3 => Some(Self::Rain),
            4 => Some(Self::Thunderstorm),
            5 => Some(Self::Snow),
            6 => Some(Self::Mist),
            _ => None,
        }
    }
}

/// A connected player as far as a scene is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePlayer {
    pub uid: u32,
    pub peer_id: u32,
    pub nickname: String,
    /// Client gadgets this player owns in the scene.
    gadgets: Vec<u32>,
}

impl ScenePlayer {
    pub fn new(uid: u32, peer_id: u32, nickname: impl Into<String>) -> Self {
        Self {
            uid,
            peer_id,
            nickname: nickname.into(),
            gadgets: Vec::new(),
        }
    }

    pub fn gadgets(&self) -> &[u32] {
        &self.gadgets
    }
}

/// A packet waiting to be sent to one player.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingPacket {
    pub uid: u32,
    pub peer_id: u32,
    pub packet: GamePacket,
}

impl OutgoingPacket {
    pub fn to_frame(&self) -> Result<Bytes, GameError> {
        Ok(encode_frame(&self.packet)?)
    }
}

pub struct Scene {
    id: u32,
    host_peer_id: u32,
    ids: Arc<EntityIdAllocator>,
    players: Vec<ScenePlayer>,
    entities: HashMap<u32, Entity>,
    time: u32,
    climate: ClimateType,
    weather: u32,
    dont_destroy_when_empty: bool,
    outgoing: Vec<OutgoingPacket>,
}

impl SpawnContext for Scene {
    fn scene_id(&self) -> u32 {
        self.id
    }

    fn host_peer_id(&self) -> u32 {
        self.host_peer_id
    }

    fn next_entity_id(&self, kind: EntityIdType) -> u32 {
        self.ids.next(kind)
    }
}

impl Scene {
    pub fn new(id: u32, host_peer_id: u32, ids: Arc<EntityIdAllocator>) -> Self {
        Self {
            id,
            host_peer_id,
            ids,
            players: Vec::new(),
            entities: HashMap::new(),
            time: DEFAULT_SCENE_TIME,
            climate: ClimateType::default(),
            weather: 0,
            dont_destroy_when_empty: false,
            outgoing: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    // -- Environment --

    pub fn time(&self) -> u32 {
        self.time
    }

    /// Set the clock (wrapping at midnight) and tell everyone.
    pub fn change_time(&mut self, time: u32) {
        self.time = time % DAY_MINUTES;
        let notify = self.time_notify();
        self.broadcast_packet(&notify);
    }

    pub fn time_notify(&self) -> SceneTimeNotify {
        SceneTimeNotify {
            scene_id: self.id,
            scene_time: self.time as u64,
            is_paused: false,
        }
    }

    pub fn climate(&self) -> ClimateType {
        self.climate
    }

    pub fn set_climate(&mut self, climate: ClimateType) {
        self.climate = climate;
    }

    pub fn weather(&self) -> u32 {
        self.weather
    }

    pub fn set_weather(&mut self, weather: u32) {
        self.weather = weather;
    }

    pub fn dont_destroy_when_empty(&self) -> bool {
        self.dont_destroy_when_empty
    }

    pub fn set_dont_destroy_when_empty(&mut self, value: bool) {
        self.dont_destroy_when_empty = value;
    }

    // -- Players --

    pub fn players(&self) -> &[ScenePlayer] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn get_player(&self, uid: u32) -> Option<&ScenePlayer> {
        self.players.iter().find(|p| p.uid == uid)
    }

    /// Add a player and send them the scene clock. Returns `false` if the
    /// player was already here.
    pub fn add_player(&mut self, player: ScenePlayer) -> bool {
        if self.get_player(player.uid).is_some() {
            return false;
        }
        let uid = player.uid;
        debug!("Player {} ({}) entered scene {}", player.nickname, uid, self.id);
        self.players.push(player);
        let notify = self.time_notify();
        self.send_to(uid, &notify);
        true
    }

    /// Remove a player together with the gadgets they own.
    pub fn remove_player(&mut self, uid: u32) -> Option<ScenePlayer> {
        let index = self.players.iter().position(|p| p.uid == uid)?;
        let player = self.players.remove(index);
        for gadget_id in &player.gadgets {
            self.remove_entity(*gadget_id);
        }
        debug!("Player {} left scene {}", uid, self.id);
        Some(player)
    }

    // -- Entities --

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn get_entity(&self, id: u32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn is_in_scene(&self, id: u32) -> bool {
        self.entities.contains_key(&id)
    }

    fn add_entity_directly(&mut self, entity: Entity) {
        self.entities.insert(entity.id(), entity);
    }

    fn remove_entity_directly(&mut self, id: u32) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn add_entity(&mut self, entity: impl Into<Entity>) {
        let entity = entity.into();
        let notify = SceneEntityAppearNotify::new(vec![entity.to_proto()], VisionType::Born);
        debug!("Entity {:#x} added to scene {}", entity.id(), self.id);
        self.add_entity_directly(entity);
        self.broadcast_packet(&notify);
    }

    /// Add several entities with a single appear notify.
    pub fn add_entities(&mut self, entities: Vec<Entity>) {
        if entities.is_empty() {
            return;
        }
        let infos = entities.iter().map(Entity::to_proto).collect();
        for entity in entities {
            self.add_entity_directly(entity);
        }
        self.broadcast_packet(&SceneEntityAppearNotify::new(infos, VisionType::Born));
    }

    pub fn remove_entity(&mut self, id: u32) -> Option<Entity> {
        self.remove_entity_with(id, VisionType::Die)
    }

    pub fn remove_entity_with(&mut self, id: u32, vision: VisionType) -> Option<Entity> {
        let removed = self.remove_entity_directly(id)?;
        debug!("Entity {:#x} removed from scene {} ({:?})", id, self.id, vision);
        self.broadcast_packet(&SceneEntityDisappearNotify::new(vec![id], vision));
        Some(removed)
    }

    /// Swap one entity for another in a single visual transition.
    pub fn replace_entity(&mut self, old_id: u32, new_entity: impl Into<Entity>) -> Option<Entity> {
        let new_entity = new_entity.into();
        let old = self.remove_entity_directly(old_id);
        let mut appear =
            SceneEntityAppearNotify::new(vec![new_entity.to_proto()], VisionType::Replace);
        appear.param = old_id;
        self.add_entity_directly(new_entity);
        self.broadcast_packet(&SceneEntityDisappearNotify::new(
            vec![old_id],
            VisionType::Replace,
        ));
        self.broadcast_packet(&appear);
        old
    }

    /// Send one player everything currently in the scene.
    pub fn show_other_entities(&mut self, uid: u32) {
        let mut entities: Vec<&Entity> = self.entities.values().collect();
        entities.sort_by_key(|e| e.id());
        let infos = entities.into_iter().map(Entity::to_proto).collect();
        self.send_to(uid, &SceneEntityAppearNotify::new(infos, VisionType::Meet));
    }

    // -- Items --

    /// Drop an item into the scene and announce it. Returns the entity id.
    pub fn spawn_item(
        &mut self,
        item_data: Arc<ItemData>,
        count: u32,
        position: Vec3,
        rotation: Option<Vec3>,
    ) -> u32 {
        let item = EntityItem::new(&*self, item_data, count, position, rotation);
        let id = item.id();
        debug!(
            "Spawned item {} x{} as {:#x} at {}",
            item.item().item_id(),
            item.count(),
            id,
            position
        );
        self.add_entity(item);
        id
    }

    /// Remove a dropped item on behalf of a player and hand back its payload.
    ///
    /// Returns `Ok(None)` when `entity_id` is not an item in this scene.
    pub fn pick_up_item(&mut self, uid: u32, entity_id: u32) -> Result<Option<GameItem>, GameError> {
        if self.get_player(uid).is_none() {
            return Err(GameError::PlayerNotInScene {
                uid,
                scene_id: self.id,
            });
        }
        if self.get_entity(entity_id).and_then(Entity::as_item).is_none() {
            warn!("Player {} tried to pick up non-item entity {:#x}", uid, entity_id);
            return Ok(None);
        }
        match self.remove_entity_with(entity_id, VisionType::Pickup) {
            Some(Entity::Item(item)) => Ok(Some(item.into_item())),
            _ => Ok(None),
        }
    }

    // -- Client gadgets --

    pub fn on_player_create_gadget(&mut self, gadget: EntityClientGadget) {
        let owner = gadget.owner_uid();
        let id = gadget.id();
        let info = gadget.to_proto();
        self.add_entity_directly(gadget.into());

        if let Some(player) = self.players.iter_mut().find(|p| p.uid == owner) {
            player.gadgets.push(id);
        }

        self.broadcast_packet_to_others(
            owner,
            &SceneEntityAppearNotify::new(vec![info], VisionType::Born),
        );
    }

    pub fn on_player_destroy_gadget(&mut self, entity_id: u32) {
        let owner = match self.get_entity(entity_id).and_then(Entity::as_client_gadget) {
            Some(gadget) => gadget.owner_uid(),
            None => return,
        };
        self.remove_entity_directly(entity_id);

        if let Some(player) = self.players.iter_mut().find(|p| p.uid == owner) {
            player.gadgets.retain(|&id| id != entity_id);
        }

        self.broadcast_packet_to_others(
            owner,
            &SceneEntityDisappearNotify::new(vec![entity_id], VisionType::Die),
        );
    }

    // -- Broadcasting --

    pub fn send_to<P: Packet>(&mut self, uid: u32, packet: &P) {
        let Some(peer_id) = self.get_player(uid).map(|p| p.peer_id) else {
            return;
        };
        self.outgoing.push(OutgoingPacket {
            uid,
            peer_id,
            packet: GamePacket::new(packet),
        });
    }

    pub fn broadcast_packet<P: Packet>(&mut self, packet: &P) {
        self.queue_for(None, packet);
    }

    pub fn broadcast_packet_to_others<P: Packet>(&mut self, excluded_uid: u32, packet: &P) {
        self.queue_for(Some(excluded_uid), packet);
    }

    fn queue_for<P: Packet>(&mut self, excluded_uid: Option<u32>, packet: &P) {
        if self.players.iter().all(|p| Some(p.uid) == excluded_uid) {
            return;
        }
        let packet = GamePacket::new(packet);
        for player in &self.players {
            if Some(player.uid) == excluded_uid {
                continue;
            }
            self.outgoing.push(OutgoingPacket {
                uid: player.uid,
                peer_id: player.peer_id,
                packet: packet.clone(),
            });
        }
    }

    /// Take every queued packet, oldest first.
    pub fn drain_outgoing(&mut self) -> Vec<OutgoingPacket> {
        std::mem::take(&mut self.outgoing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CreateGadgetRequest;
    use crate::item_data::ItemType;
    use gs_proto::item::ItemDetail;

    fn scene() -> Scene {
        Scene::new(3, 1, Arc::new(EntityIdAllocator::new()))
    }

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

    fn with_players(uids: &[u32]) -> Scene {
        let mut scene = scene();
        for &uid in uids {
            scene.add_player(ScenePlayer::new(uid, uid - 10000, format!("p{uid}")));
        }
        scene.drain_outgoing();
        scene
    }

    fn client_gadget(id: u32, owner: u32) -> EntityClientGadget {
        EntityClientGadget::new(
            3,
            owner,
            owner - 10000,
            CreateGadgetRequest {
                entity_id: id,
                config_id: 41038001,
                ..Default::default()
            },
        )
    }

    #[test]
    fn new_scene_defaults() {
        let scene = scene();
        assert_eq!(scene.time(), DEFAULT_SCENE_TIME);
        assert_eq!(scene.climate(), ClimateType::Sunny);
        assert_eq!(scene.weather(), 0);
        assert!(!scene.dont_destroy_when_empty());
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn climate_and_weather() {
        let mut scene = scene();
        assert_eq!(ClimateType::from_u8(3), Some(ClimateType::Rain));
        assert_eq!(ClimateType::from_u8(7), None);
        scene.set_climate(ClimateType::Rain);
        scene.set_weather(1001);
        assert_eq!(scene.climate(), ClimateType::Rain);
        assert_eq!(scene.weather(), 1001);
    }

    #[test]
    fn add_player_sends_time() {
        let mut scene = scene();
        assert!(scene.add_player(ScenePlayer::new(10001, 1, "host")));
        assert!(!scene.add_player(ScenePlayer::new(10001, 1, "host")));
        assert_eq!(scene.player_count(), 1);

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        let notify: SceneTimeNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.scene_id, 3);
        assert_eq!(notify.scene_time, DEFAULT_SCENE_TIME as u64);
    }

    #[test]
    fn change_time_wraps() {
        let mut scene = with_players(&[10001]);
        scene.change_time(DAY_MINUTES + 30);
        assert_eq!(scene.time(), 30);
        let out = scene.drain_outgoing();
        let notify: SceneTimeNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.scene_time, 30);
    }

    #[test]
    fn spawn_item_broadcasts_born() {
        let mut scene = with_players(&[10001, 10002]);
        let id = scene.spawn_item(flower(), 5, Vec3::new(1.0, 2.0, 3.0), None);
        assert!(scene.is_in_scene(id));

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].uid, 10001);
        assert_eq!(out[1].uid, 10002);
        assert_eq!(out[1].peer_id, 2);

        let notify: SceneEntityAppearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.appear_type, VisionType::Born);
        assert_eq!(notify.entity_list.len(), 1);
        let gadget = notify.entity_list[0].gadget.as_ref().unwrap();
        assert_eq!(
            gadget.trifle_item().map(|t| t.detail.clone()),
            Some(ItemDetail::Material { count: 5 })
        );
    }

    #[test]
    fn spawned_ids_unique() {
        let mut scene = scene();
        let a = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        let b = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        assert_ne!(a, b);
        assert_eq!(scene.entity_count(), 2);
    }

    #[test]
    fn no_players_no_packets() {
        let mut scene = scene();
        scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        assert!(scene.drain_outgoing().is_empty());
    }

    #[test]
    fn pick_up_returns_payload() {
        let mut scene = with_players(&[10001]);
        let id = scene.spawn_item(flower(), 5, Vec3::ZERO, None);
        scene.drain_outgoing();

        let item = scene.pick_up_item(10001, id).unwrap().unwrap();
        assert_eq!(item.item_id(), 101);
        assert_eq!(item.count(), 5);
        assert!(!scene.is_in_scene(id));

        let out = scene.drain_outgoing();
        let notify: SceneEntityDisappearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.entity_list, vec![id]);
        assert_eq!(notify.disappear_type, VisionType::Pickup);
    }

    #[test]
    fn pick_up_rejects_strangers_and_non_items() {
        let mut scene = with_players(&[10001]);
        let id = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        assert!(matches!(
            scene.pick_up_item(10009, id),
            Err(GameError::PlayerNotInScene { uid: 10009, scene_id: 3 })
        ));

        scene.on_player_create_gadget(client_gadget(0x0400_9000, 10001));
        assert!(scene.pick_up_item(10001, 0x0400_9000).unwrap().is_none());
        assert!(scene.pick_up_item(10001, 12345).unwrap().is_none());
        assert!(scene.is_in_scene(0x0400_9000));
        assert!(scene.is_in_scene(id));
    }

    #[test]
    fn remove_missing_entity_is_silent() {
        let mut scene = with_players(&[10001]);
        assert!(scene.remove_entity(42).is_none());
        assert!(scene.drain_outgoing().is_empty());
    }

    #[test]
    fn add_entities_single_notify() {
        let mut scene = with_players(&[10001]);
        let a = EntityItem::new(&scene, flower(), 1, Vec3::ZERO, None);
        let b = EntityItem::new(&scene, flower(), 2, Vec3::ZERO, None);
        scene.add_entities(vec![a.into(), b.into()]);
        assert_eq!(scene.entity_count(), 2);

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        let notify: SceneEntityAppearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.entity_list.len(), 2);

        scene.add_entities(Vec::new());
        assert!(scene.drain_outgoing().is_empty());
    }

    #[test]
    fn replace_entity_notifies_both_sides() {
        let mut scene = with_players(&[10001]);
        let old = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        scene.drain_outgoing();

        let replacement = EntityItem::new(&scene, flower(), 9, Vec3::ZERO, None);
        let new_id = replacement.id();
        let removed = scene.replace_entity(old, replacement);
        assert_eq!(removed.map(|e| e.id()), Some(old));
        assert!(scene.is_in_scene(new_id));
        assert!(!scene.is_in_scene(old));

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 2);
        let gone: SceneEntityDisappearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(gone.disappear_type, VisionType::Replace);
        let appear: SceneEntityAppearNotify = out[1].packet.decode_payload().unwrap();
        assert_eq!(appear.appear_type, VisionType::Replace);
        assert_eq!(appear.param, old);
    }

    #[test]
    fn show_other_entities_only_to_one_player() {
        let mut scene = with_players(&[10001, 10002]);
        let a = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        let b = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        scene.drain_outgoing();

        scene.show_other_entities(10002);
        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].uid, 10002);
        let notify: SceneEntityAppearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.appear_type, VisionType::Meet);
        let ids: Vec<u32> = notify.entity_list.iter().map(|e| e.entity_id).collect();
        assert_eq!(ids, vec![a.min(b), a.max(b)]);
    }

    #[test]
    fn client_gadget_skips_owner() {
        let mut scene = with_players(&[10001, 10002]);
        scene.on_player_create_gadget(client_gadget(0x0400_9000, 10001));
        assert_eq!(scene.get_player(10001).unwrap().gadgets(), &[0x0400_9000]);

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].uid, 10002);

        scene.on_player_destroy_gadget(0x0400_9000);
        assert!(!scene.is_in_scene(0x0400_9000));
        assert!(scene.get_player(10001).unwrap().gadgets().is_empty());
        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        let notify: SceneEntityDisappearNotify = out[0].packet.decode_payload().unwrap();
        assert_eq!(notify.disappear_type, VisionType::Die);
    }

    #[test]
    fn solo_owner_gets_nothing() {
        let mut scene = with_players(&[10001]);
        scene.on_player_create_gadget(client_gadget(0x0400_9000, 10001));
        assert!(scene.is_in_scene(0x0400_9000));
        assert!(scene.drain_outgoing().is_empty());
    }

    #[test]
    fn destroy_ignores_items() {
        let mut scene = with_players(&[10001]);
        let id = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        scene.drain_outgoing();
        scene.on_player_destroy_gadget(id);
        assert!(scene.is_in_scene(id));
        assert!(scene.drain_outgoing().is_empty());
    }

    #[test]
    fn remove_player_drops_their_gadgets() {
        let mut scene = with_players(&[10001, 10002]);
        scene.on_player_create_gadget(client_gadget(0x0400_9000, 10001));
        let item = scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        scene.drain_outgoing();

        let player = scene.remove_player(10001).unwrap();
        assert_eq!(player.uid, 10001);
        assert!(!scene.is_in_scene(0x0400_9000));
        assert!(scene.is_in_scene(item));
        assert_eq!(scene.player_count(), 1);
        assert!(scene.remove_player(10001).is_none());

        let out = scene.drain_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].uid, 10002);
    }

    #[test]
    fn outgoing_frames() {
        let mut scene = with_players(&[10001]);
        scene.spawn_item(flower(), 1, Vec3::ZERO, None);
        let out = scene.drain_outgoing();
        let frame = out[0].to_frame().unwrap();
        assert_eq!(frame.len(), out[0].packet.framed_len());
        assert_eq!(&frame[..2], &[0x45, 0x67]);
    }
}
