//! Game-level errors.

use gs_proto::error::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to read item data: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid item data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown item id: {0}")]
    UnknownItem(u32),

    #[error("unknown scene id: {0}")]
    UnknownScene(u32),

    #[error("player {uid} is not in scene {scene_id}")]
    PlayerNotInScene { uid: u32, scene_id: u32 },

    #[error("packet encoding failed: {0}")]
    Proto(#[from] ProtoError),
}
