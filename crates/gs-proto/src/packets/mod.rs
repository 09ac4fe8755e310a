//! Scene packet definitions.

pub mod scene_entity_appear_notify;
pub mod scene_entity_disappear_notify;
pub mod scene_entity_info;
pub mod scene_gadget_info;
pub mod scene_time_notify;

pub use scene_entity_appear_notify::{SceneEntityAppearNotify, VisionType};
pub use scene_entity_disappear_notify::SceneEntityDisappearNotify;
pub use scene_entity_info::{LifeState, MotionInfo, ProtEntityType, SceneEntityInfo};
pub use scene_gadget_info::{
    ClientGadgetInfo, GadgetBornType, GadgetContent, SceneGadgetInfo, SceneGadgetInfoBuilder,
};
pub use scene_time_notify::SceneTimeNotify;

use crate::wire::WireMessage;

/// A top-level message that travels in its own frame.
pub trait Packet: WireMessage {
    const CMD_ID: u16;
}

/// Packet command IDs.
pub mod id {
    pub const SCENE_ENTITY_DISAPPEAR_NOTIFY: u16 = 203;
    pub const SCENE_ENTITY_APPEAR_NOTIFY: u16 = 221;
    pub const SCENE_TIME_NOTIFY: u16 = 245;
}

/// Human-readable name for a command id, for logging.
pub fn cmd_name(cmd_id: u16) -> &'static str {
    match cmd_id {
        id::SCENE_ENTITY_DISAPPEAR_NOTIFY => "SceneEntityDisappearNotify",
        id::SCENE_ENTITY_APPEAR_NOTIFY => "SceneEntityAppearNotify",
        id::SCENE_TIME_NOTIFY => "SceneTimeNotify",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_ids_are_distinct() {
        assert_ne!(SceneEntityAppearNotify::CMD_ID, SceneEntityDisappearNotify::CMD_ID);
        assert_ne!(SceneEntityAppearNotify::CMD_ID, SceneTimeNotify::CMD_ID);
        assert_ne!(SceneEntityDisappearNotify::CMD_ID, SceneTimeNotify::CMD_ID);
    }

    #[test]
    fn cmd_names() {
        assert_eq!(cmd_name(id::SCENE_ENTITY_APPEAR_NOTIFY), "SceneEntityAppearNotify");
        assert_eq!(cmd_name(0xFFFF), "Unknown");
    }
}
