//! Persisted tool settings

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level tool mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    None,
    Create,
    Edit,
    Delete,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::None, Mode::Create, Mode::Edit, Mode::Delete];

    /// Next mode in the cycle key order, with wraparound
    pub fn cycle(self) -> Self {
        match self {
            Mode::None => Mode::Create,
            Mode::Create => Mode::Edit,
            Mode::Edit => Mode::Delete,
            Mode::Delete => Mode::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::None => "None",
            Mode::Create => "Create",
            Mode::Edit => "Edit",
            Mode::Delete => "Delete",
        }
    }
}

/// Which point a volume's presented position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pivot {
    #[default]
    Center,
    /// Center of the base face
    Surface,
}

impl Pivot {
    pub fn label(&self) -> &'static str {
        match self {
            Pivot::Center => "Center",
            Pivot::Surface => "Surface",
        }
    }
}

/// World axis serving as "up" for the construction plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    XAxis,
    #[default]
    YAxis,
    ZAxis,
}

impl Alignment {
    pub fn up(&self) -> Vec3 {
        match self {
            Alignment::XAxis => Vec3::X,
            Alignment::YAxis => Vec3::Y,
            Alignment::ZAxis => Vec3::Z,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Alignment::XAxis => "X axis",
            Alignment::YAxis => "Y axis",
            Alignment::ZAxis => "Z axis",
        }
    }
}

/// Viewport underlay settings (world grid and axes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    pub visible: bool,
    pub size: f32,
    pub range: i32,
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 5,
            opacity: 0.6,
        }
    }
}

/// All persisted tool settings.
///
/// Serialized field names keep the setting keys the tool has always used
/// ("Mode", "Volume", "Pivot", "CreationAlignment", "ShowProperties"), so
/// existing preference files stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(rename = "Mode", default)]
    pub mode: Mode,
    /// Draw the full translucent cuboid instead of the base face only
    #[serde(rename = "Volume", default)]
    pub draw_full_volume: bool,
    #[serde(rename = "Pivot", default)]
    pub pivot: Pivot,
    #[serde(rename = "CreationAlignment", default)]
    pub alignment: Alignment,
    #[serde(rename = "ShowProperties", default = "default_true")]
    pub show_properties: bool,
    /// Round drag deltas to the grid step instead of the minimum granularity
    #[serde(default)]
    pub grid_snap: bool,
    #[serde(default = "default_grid_step")]
    pub grid_step: f32,
    #[serde(default)]
    pub grid: GridSettings,
}

fn default_true() -> bool {
    true
}

fn default_grid_step() -> f32 {
    0.25
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            mode: Mode::None,
            draw_full_volume: false,
            pivot: Pivot::Center,
            alignment: Alignment::YAxis,
            show_properties: true,
            grid_snap: false,
            grid_step: default_grid_step(),
            grid: GridSettings::default(),
        }
    }
}

impl ToolSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "vbox", "vbox") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        let Some(dirs) = directories::ProjectDirs::from("com", "vbox", "vbox") else {
            return;
        };
        let config_dir = dirs.config_dir();
        if let Err(e) = std::fs::create_dir_all(config_dir) {
            tracing::warn!("Failed to create config dir: {e}");
            return;
        }
        let config_path = config_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&config_path, json) {
                    tracing::warn!("Failed to save settings: {e}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize settings: {e}"),
        }
    }
}
