use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    #[serde(default)]
    pub world: WorldSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub drops: DropsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub name: String,
    pub host_uid: u32,
    #[serde(default = "default_host_peer_id")]
    pub host_peer_id: u32,
    #[serde(default = "default_nickname")]
    pub nickname: String,
}

fn default_host_peer_id() -> u32 {
    1
}

fn default_nickname() -> String {
    "Traveler".into()
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    /// Scene the host starts in. Default: 3 (the open world).
    #[serde(default = "default_scene")]
    pub default_scene: u32,
    /// JSON array of item definitions.
    #[serde(default = "default_item_data")]
    pub item_data: String,
}

fn default_scene() -> u32 {
    3
}

fn default_item_data() -> String {
    "data/items.json".into()
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            default_scene: default_scene(),
            item_data: default_item_data(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropsSection {
    /// Stack size used when `drop` is given no count.
    #[serde(default = "default_drop_count")]
    pub default_count: u32,
    /// Horizontal radius drops are scattered within. 0 = exact position.
    #[serde(default)]
    pub scatter: f32,
}

fn default_drop_count() -> u32 {
    1
}

impl Default for DropsSection {
    fn default() -> Self {
        Self {
            default_count: default_drop_count(),
            scatter: 0.0,
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        let scatter = self.drops.scatter;
        if !scatter.is_finite() || scatter < 0.0 {
            return Err(format!(
                "drops.scatter must be a finite, non-negative radius, got {scatter}"
            ));
        }
        Ok(())
    }
}
