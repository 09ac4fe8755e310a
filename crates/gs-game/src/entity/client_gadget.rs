//! Gadgets created by a client (skill constructs, thrown objects).

use gs_proto::packets::{ClientGadgetInfo, GadgetBornType, SceneGadgetInfo};
use gs_proto::types::Vec3;

use crate::entity::gadget::{GadgetBase, GadgetEntity};

/// What the client reports when it creates a gadget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateGadgetRequest {
    /// Id chosen by the client.
    pub entity_id: u32,
    pub config_id: u32,
    pub camp_id: u32,
    pub camp_type: u32,
    pub guid: u64,
    pub owner_entity_id: u32,
    pub target_entity_id: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub async_load: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityClientGadget {
    base: GadgetBase,
    owner_uid: u32,
    camp_id: u32,
    camp_type: u32,
    guid: u64,
    target_entity_id: u32,
    async_load: bool,
}

impl EntityClientGadget {
    pub fn new(scene_id: u32, owner_uid: u32, owner_peer_id: u32, req: CreateGadgetRequest) -> Self {
        let mut base = GadgetBase::new(
            req.entity_id,
            scene_id,
            req.config_id,
            owner_peer_id,
            req.position,
            req.rotation,
        );
        base.config_id = req.config_id;
        base.owner_entity_id = req.owner_entity_id;
        base.born_type = GadgetBornType::PlayerUse;

        Self {
            base,
            owner_uid,
            camp_id: req.camp_id,
            camp_type: req.camp_type,
            guid: req.guid,
            target_entity_id: req.target_entity_id,
            async_load: req.async_load,
        }
    }

    pub fn id(&self) -> u32 {
        self.base.id()
    }

    pub fn owner_uid(&self) -> u32 {
        self.owner_uid
    }

    pub fn owner_entity_id(&self) -> u32 {
        self.base.owner_entity_id
    }
}

impl GadgetEntity for EntityClientGadget {
    fn base(&self) -> &GadgetBase {
        &self.base
    }

    fn to_gadget_proto(&self) -> SceneGadgetInfo {
        self.base
            .gadget_init_proto()
            .client_gadget(ClientGadgetInfo {
                camp_id: self.camp_id,
                camp_type: self.camp_type,
                guid: self.guid,
                owner_entity_id: self.base.owner_entity_id,
                target_entity_id: self.target_entity_id,
                async_load: self.async_load,
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_client_content() {
        let gadget = EntityClientGadget::new(
            3,
            10001,
            2,
            CreateGadgetRequest {
                entity_id: 0x0400_1234,
                config_id: 41038001,
                camp_id: 1,
                guid: 55,
                owner_entity_id: 0x0100_0001,
                position: Vec3::new(1.0, 2.0, 3.0),
                ..Default::default()
            },
        );
        assert_eq!(gadget.id(), 0x0400_1234);
        assert_eq!(gadget.owner_uid(), 10001);

        let info = gadget.to_gadget_proto();
        assert_eq!(info.gadget_id, 41038001);
        assert_eq!(info.config_id, 41038001);
        assert_eq!(info.owner_entity_id, 0x0100_0001);
        assert_eq!(info.authority_peer_id, 2);
        assert_eq!(info.born_type, GadgetBornType::PlayerUse);
        assert!(info.trifle_item().is_none());

        let client = info.client_gadget().unwrap();
        assert_eq!(client.guid, 55);
        assert_eq!(client.camp_id, 1);
        assert_eq!(client.owner_entity_id, 0x0100_0001);
    }
}
