//! Operator console: parses stdin lines and runs them against the world.

use gs_game::entity::{CreateGadgetRequest, EntityClientGadget};
use gs_game::entity_id::EntityIdType;
use gs_game::error::GameError;
use gs_game::item_data::ItemDataRegistry;
use gs_game::scene::ScenePlayer;
use gs_game::world::World;
use gs_proto::packets::cmd_name;
use gs_proto::types::Vec3;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::DropsSection;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Drop {
        item_id: u32,
        count: Option<u32>,
        position: Option<Vec3>,
    },
    Pickup {
        entity_id: u32,
        uid: Option<u32>,
    },
    Gadget {
        uid: u32,
        config_id: u32,
    },
    Ungadget {
        entity_id: u32,
    },
    List,
    Time {
        minutes: u32,
    },
    Join {
        uid: u32,
        peer_id: u32,
        nickname: String,
    },
    Leave {
        uid: u32,
    },
    Help,
    Stop,
}

const HELP: &[(&str, &str)] = &[
    ("drop <item_id> [count] [x y z]", "Drop an item into the scene"),
    ("pickup <entity_id> [uid]", "Pick up a dropped item"),
    ("gadget <uid> <config_id>", "Create a client gadget owned by a player"),
    ("ungadget <entity_id>", "Destroy a client gadget"),
    ("list", "Show players and entities in the scene"),
    ("time <minutes>", "Set the scene clock"),
    ("join <uid> <peer_id> <name>", "Add a player to the scene"),
    ("leave <uid>", "Remove a player from the scene"),
    ("help", "List available commands"),
    ("stop", "Stop the server"),
];

/// Accepts decimal or `0x` hex, so entity ids can be pasted from logs.
fn parse_u32(arg: &str, what: &str) -> Result<u32, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.map_err(|_| format!("Invalid {what}: {arg}"))
}

fn parse_f32(arg: &str) -> Result<f32, String> {
    arg.parse().map_err(|_| format!("Invalid coordinate: {arg}"))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default().trim_start_matches('/');
        let args: Vec<&str> = parts.collect();

        match (name, args.as_slice()) {
            ("drop", [item_id, rest @ ..]) => {
                let item_id = parse_u32(item_id, "item id")?;
                let (count, coords) = match rest {
                    [] => (None, &rest[..0]),
                    [count] | [count, _, _, _] => (Some(parse_u32(count, "count")?), &rest[1..]),
                    [_, _, _] => (None, rest),
                    _ => return Err("Usage: drop <item_id> [count] [x y z]".into()),
                };
                let position = match coords {
                    [x, y, z] => Some(Vec3::new(parse_f32(x)?, parse_f32(y)?, parse_f32(z)?)),
                    _ => None,
                };
                Ok(Self::Drop {
                    item_id,
                    count,
                    position,
                })
            }
            ("drop", _) => Err("Usage: drop <item_id> [count] [x y z]".into()),
            ("pickup", [entity_id]) => Ok(Self::Pickup {
                entity_id: parse_u32(entity_id, "entity id")?,
                uid: None,
            }),
            ("pickup", [entity_id, uid]) => Ok(Self::Pickup {
                entity_id: parse_u32(entity_id, "entity id")?,
                uid: Some(parse_u32(uid, "uid")?),
            }),
            ("pickup", _) => Err("Usage: pickup <entity_id> [uid]".into()),
            ("gadget", [uid, config_id]) => Ok(Self::Gadget {
                uid: parse_u32(uid, "uid")?,
                config_id: parse_u32(config_id, "config id")?,
            }),
            ("gadget", _) => Err("Usage: gadget <uid> <config_id>".into()),
            ("ungadget", [entity_id]) => Ok(Self::Ungadget {
                entity_id: parse_u32(entity_id, "entity id")?,
            }),
            ("ungadget", _) => Err("Usage: ungadget <entity_id>".into()),
            ("list", []) => Ok(Self::List),
            ("time", [minutes]) => Ok(Self::Time {
                minutes: parse_u32(minutes, "time")?,
            }),
            ("time", _) => Err("Usage: time <minutes>".into()),
            ("join", [uid, peer_id, nickname @ ..]) if !nickname.is_empty() => Ok(Self::Join {
                uid: parse_u32(uid, "uid")?,
                peer_id: parse_u32(peer_id, "peer id")?,
                nickname: nickname.join(" "),
            }),
            ("join", _) => Err("Usage: join <uid> <peer_id> <name>".into()),
            ("leave", [uid]) => Ok(Self::Leave {
                uid: parse_u32(uid, "uid")?,
            }),
            ("leave", _) => Err("Usage: leave <uid>".into()),
            ("help", _) => Ok(Self::Help),
            ("stop", _) => Ok(Self::Stop),
            _ => Err(format!(
                "Unknown command: {name}. Type help for a list of commands."
            )),
        }
    }
}

/// Outcome of a console command.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub messages: Vec<String>,
    /// If true, the server should shut down.
    pub should_stop: bool,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            should_stop: false,
        }
    }
}

impl From<GameError> for CommandResult {
    fn from(e: GameError) -> Self {
        Self::err(e.to_string())
    }
}

/// Totals for one flush of the outgoing queues.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    pub packets: usize,
    pub bytes: usize,
}

/// The world plus what the console needs to drive it.
pub struct Console {
    world: World,
    items: ItemDataRegistry,
    scene_id: u32,
    drops: DropsSection,
}

impl Console {
    pub fn new(world: World, items: ItemDataRegistry, scene_id: u32, drops: DropsSection) -> Self {
        Self {
            world,
            items,
            scene_id,
            drops,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn handle_line(&mut self, line: &str) -> CommandResult {
        match Command::parse(line) {
            Ok(cmd) => self.execute(cmd),
            Err(usage) => CommandResult::err(usage),
        }
    }

    pub fn execute(&mut self, cmd: Command) -> CommandResult {
        match cmd {
            Command::Drop {
                item_id,
                count,
                position,
            } => self.cmd_drop(item_id, count, position),
            Command::Pickup { entity_id, uid } => {
                let uid = uid.unwrap_or(self.world.host_uid());
                self.cmd_pickup(entity_id, uid)
            }
            Command::Gadget { uid, config_id } => self.cmd_gadget(uid, config_id),
            Command::Ungadget { entity_id } => {
                let scene = self.world.get_or_create_scene(self.scene_id);
                if scene.get_entity(entity_id).and_then(|e| e.as_client_gadget()).is_none() {
                    return CommandResult::err(format!("No client gadget {entity_id:#x}"));
                }
                scene.on_player_destroy_gadget(entity_id);
                CommandResult::ok(format!("Destroyed gadget {entity_id:#x}"))
            }
            Command::List => self.cmd_list(),
            Command::Time { minutes } => {
                let scene = self.world.get_or_create_scene(self.scene_id);
                scene.change_time(minutes);
                CommandResult::ok(format!("Scene time is now {}", scene.time()))
            }
            Command::Join {
                uid,
                peer_id,
                nickname,
            } => {
                let player = ScenePlayer::new(uid, peer_id, nickname.clone());
                if self.world.add_player(self.scene_id, player) {
                    CommandResult::ok(format!("{nickname} ({uid}) joined scene {}", self.scene_id))
                } else {
                    CommandResult::err(format!("Player {uid} is already in the scene"))
                }
            }
            Command::Leave { uid } => match self.world.remove_player(self.scene_id, uid) {
                Ok(Some(player)) => CommandResult::ok(format!("{} ({uid}) left", player.nickname)),
                Ok(None) => CommandResult::err(format!("Player {uid} is not in the scene")),
                Err(e) => e.into(),
            },
            Command::Help => CommandResult {
                success: true,
                messages: std::iter::once("Available commands:".to_string())
                    .chain(HELP.iter().map(|(usage, desc)| format!("  {usage} - {desc}")))
                    .collect(),
                should_stop: false,
            },
            Command::Stop => CommandResult {
                success: true,
                messages: vec!["Stopping the server...".to_string()],
                should_stop: true,
            },
        }
    }

    fn cmd_drop(&mut self, item_id: u32, count: Option<u32>, position: Option<Vec3>) -> CommandResult {
        let Some(item_data) = self.items.get(item_id) else {
            return GameError::UnknownItem(item_id).into();
        };
        let count = count.unwrap_or(self.drops.default_count);
        let position = self.scatter(position.unwrap_or_default());
        let name = item_data.name.clone();
        let scene = self.world.get_or_create_scene(self.scene_id);
        let entity_id = scene.spawn_item(item_data, count, position, None);
        CommandResult::ok(format!("Dropped {name} x{count} as {entity_id:#x} at {position}"))
    }

    fn cmd_pickup(&mut self, entity_id: u32, uid: u32) -> CommandResult {
        let scene = match self.world.scene_mut(self.scene_id) {
            Ok(scene) => scene,
            Err(e) => return e.into(),
        };
        match scene.pick_up_item(uid, entity_id) {
            Ok(Some(item)) => CommandResult::ok(format!(
                "Player {uid} picked up {} x{}",
                item.item_data().name,
                item.count()
            )),
            Ok(None) => CommandResult::err(format!("No item entity {entity_id:#x}")),
            Err(e) => e.into(),
        }
    }

    fn cmd_gadget(&mut self, uid: u32, config_id: u32) -> CommandResult {
        let entity_id = self.world.next_entity_id(EntityIdType::Gadget);
        let scene = self.world.get_or_create_scene(self.scene_id);
        let Some(peer_id) = scene.get_player(uid).map(|p| p.peer_id) else {
            return GameError::PlayerNotInScene {
                uid,
                scene_id: self.scene_id,
            }
            .into();
        };
        let gadget = EntityClientGadget::new(
            self.scene_id,
            uid,
            peer_id,
            CreateGadgetRequest {
                entity_id,
                config_id,
                ..Default::default()
            },
        );
        scene.on_player_create_gadget(gadget);
        CommandResult::ok(format!("Created gadget {config_id} as {entity_id:#x}"))
    }

    fn cmd_list(&self) -> CommandResult {
        let Some(scene) = self.world.scene(self.scene_id) else {
            return CommandResult::ok(format!("Scene {} is not loaded", self.scene_id));
        };
        let mut messages = vec![format!(
            "Scene {}: {} player(s), {} entit{}, time {}",
            scene.id(),
            scene.player_count(),
            scene.entity_count(),
            if scene.entity_count() == 1 { "y" } else { "ies" },
            scene.time()
        )];
        for player in scene.players() {
            messages.push(format!(
                "  player {} ({}) peer {}",
                player.nickname, player.uid, player.peer_id
            ));
        }
        let mut entities: Vec<_> = scene.entities().collect();
        entities.sort_by_key(|e| e.id());
        for entity in entities {
            let line = if let Some(item) = entity.as_item() {
                format!(
                    "  {:#x} item {} x{} at {}",
                    item.id(),
                    item.item().item_id(),
                    item.count(),
                    item.position()
                )
            } else if let Some(gadget) = entity.as_client_gadget() {
                format!("  {:#x} client gadget of {}", gadget.id(), gadget.owner_uid())
            } else {
                format!("  {:#x}", entity.id())
            };
            messages.push(line);
        }
        CommandResult {
            success: true,
            messages,
            should_stop: false,
        }
    }

    fn scatter(&self, position: Vec3) -> Vec3 {
        let radius = self.drops.scatter;
        // NaN fails both tests.
        if !(radius > 0.0 && radius.is_finite()) {
            return position;
        }
        let mut rng = rand::thread_rng();
        position
            + Vec3::new(
                rng.gen_range(-radius..=radius),
                0.0,
                rng.gen_range(-radius..=radius),
            )
    }

    /// Drain every scene's queue and frame the packets for sending.
    pub fn flush_outgoing(&mut self) -> FlushStats {
        let mut stats = FlushStats::default();
        for scene in self.world.scenes_mut() {
            for out in scene.drain_outgoing() {
                match out.to_frame() {
                    Ok(frame) => {
                        debug!(
                            "-> {} ({} bytes) to uid {} peer {}",
                            cmd_name(out.packet.cmd_id),
                            frame.len(),
                            out.uid,
                            out.peer_id
                        );
                        stats.packets += 1;
                        stats.bytes += frame.len();
                    }
                    Err(e) => warn!("Failed to frame {}: {}", cmd_name(out.packet.cmd_id), e),
                }
            }
        }
        stats
    }
}
