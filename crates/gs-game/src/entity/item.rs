//! Dropped item lying in a scene, waiting to be picked up.

use std::sync::Arc;

use gs_proto::packets::{GadgetBornType, SceneGadgetInfo};
use gs_proto::types::Vec3;

use crate::entity::gadget::{GadgetBase, GadgetEntity};
use crate::entity_id::{EntityIdType, SpawnContext};
use crate::game_item::GameItem;
use crate::item_data::ItemData;

#[derive(Debug, Clone, PartialEq)]
pub struct EntityItem {
    base: GadgetBase,
    item: GameItem,
}

impl EntityItem {
    /// Spawn an item gadget in the context's scene.
    ///
    /// The count, position and definition are taken as given.
    /// `rotation` defaults to [`Vec3::ZERO`].
    pub fn new(
        ctx: &impl SpawnContext,
        item_data: Arc<ItemData>,
        count: u32,
        position: Vec3,
        rotation: Option<Vec3>,
    ) -> Self {
        let mut base = GadgetBase::new(
            ctx.next_entity_id(EntityIdType::Gadget),
            ctx.scene_id(),
            item_data.gadget_id,
            ctx.host_peer_id(),
            position,
            rotation.unwrap_or_default(),
        );
        base.born_type = GadgetBornType::InAir;
        base.enable_interact = true;

        Self {
            base,
            item: GameItem::new(item_data, count),
        }
    }

    pub fn id(&self) -> u32 {
        self.base.id()
    }

    pub fn scene_id(&self) -> u32 {
        self.base.scene_id()
    }

    pub fn position(&self) -> Vec3 {
        self.base.position()
    }

    pub fn rotation(&self) -> Vec3 {
        self.base.rotation()
    }

    pub fn gadget_id(&self) -> u32 {
        self.base.gadget_id()
    }

    pub fn authority_peer_id(&self) -> u32 {
        self.base.authority_peer_id()
    }

    pub fn item(&self) -> &GameItem {
        &self.item
    }

    pub fn count(&self) -> u32 {
        self.item.count()
    }

    pub fn into_item(self) -> GameItem {
        self.item
    }
}

impl GadgetEntity for EntityItem {
    fn base(&self) -> &GadgetBase {
        &self.base
    }

    fn to_gadget_proto(&self) -> SceneGadgetInfo {
        self.base
            .gadget_init_proto()
            .trifle_item(self.item.to_proto())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_id::EntityIdAllocator;
    use crate::item_data::ItemType;
    use gs_proto::item::ItemDetail;
    use gs_proto::wire::WireMessage;
    use std::collections::HashSet;

    struct FakeScene {
        ids: EntityIdAllocator,
    }

    impl SpawnContext for FakeScene {
        fn scene_id(&self) -> u32 {
            3
        }

        fn host_peer_id(&self) -> u32 {
            1
        }

        fn next_entity_id(&self, kind: EntityIdType) -> u32 {
            self.ids.next(kind)
        }
    }

    fn scene() -> FakeScene {
        FakeScene {
            ids: EntityIdAllocator::new(),
        }
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

    #[test]
    fn ids_unique_in_scene() {
        let scene = scene();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let item = EntityItem::new(&scene, flower(), 1, Vec3::ZERO, None);
            assert!(item.id() != 0);
            assert!(seen.insert(item.id()));
        }
    }

    #[test]
    fn rotation_defaults_to_zero() {
        let item = EntityItem::new(&scene(), flower(), 1, Vec3::new(1.0, 2.0, 3.0), None);
        assert_eq!(item.rotation(), Vec3::ZERO);
        assert_eq!(item.position(), Vec3::new(1.0, 2.0, 3.0));

        let turned = EntityItem::new(
            &scene(),
            flower(),
            1,
            Vec3::ZERO,
            Some(Vec3::new(0.0, 90.0, 0.0)),
        );
        assert_eq!(turned.rotation(), Vec3::new(0.0, 90.0, 0.0));
    }

    #[test]
    fn gadget_id_from_definition() {
        let item = EntityItem::new(&scene(), flower(), 1, Vec3::ZERO, None);
        assert_eq!(item.gadget_id(), 70600055);
        assert_eq!(item.to_gadget_proto().gadget_id, 70600055);
    }

    #[test]
    fn context_is_stamped() {
        let item = EntityItem::new(&scene(), flower(), 1, Vec3::ZERO, None);
        assert_eq!(item.scene_id(), 3);
        assert_eq!(item.authority_peer_id(), 1);
        assert_eq!(item.id() >> 24, EntityIdType::Gadget as u32);
    }

    #[test]
    fn fixed_flags() {
        let info = EntityItem::new(&scene(), flower(), 1, Vec3::ZERO, None).to_gadget_proto();
        assert_eq!(info.born_type, GadgetBornType::InAir);
        assert!(info.is_enable_interact);
        assert_eq!(info.authority_peer_id, 1);
    }

    #[test]
    fn count_five_in_trifle_item() {
        let item = EntityItem::new(&scene(), flower(), 5, Vec3::new(1.0, 2.0, 3.0), None);
        let info = item.to_gadget_proto();
        let trifle = info.trifle_item().expect("trifle item present");
        assert_eq!(trifle.item_id, 101);
        assert_eq!(trifle.detail, ItemDetail::Material { count: 5 });

        // Survives the wire as well.
        let decoded = SceneGadgetInfo::decode(&mut info.encode_to_bytes()).unwrap();
        assert_eq!(decoded.trifle_item().map(|t| t.count()), Some(5));
    }

    #[test]
    fn serialization_is_repeatable() {
        let item = EntityItem::new(&scene(), flower(), 5, Vec3::ZERO, None);
        let first = item.to_gadget_proto();
        let second = item.to_gadget_proto();
        assert_eq!(first.trifle_item(), second.trifle_item());
        assert_eq!(first, second);
    }

    #[test]
    fn entity_record() {
        let item = EntityItem::new(&scene(), flower(), 2, Vec3::new(4.0, 5.0, 6.0), None);
        let entity = item.to_proto();
        assert_eq!(entity.entity_id, item.id());
        assert_eq!(entity.motion_info.pos, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(
            entity.gadget.and_then(|g| g.trifle_item().map(|t| t.count())),
            Some(2)
        );
    }
}
