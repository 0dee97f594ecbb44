use netdesign_graph::{EdgeRouter, GridLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub routing: RoutingSettings,
    pub palette: PaletteSettings,
    pub layout: LayoutSettings,
    /// Length of locally generated ids (drag handles, collisions, provisional links).
    pub id_length: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            routing: RoutingSettings::default(),
            palette: PaletteSettings::default(),
            layout: LayoutSettings::default(),
            id_length: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub perimeter_factor: f64,
    pub loop_radius: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            perimeter_factor: 0.8,
            loop_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    pub device_size: f64,
    /// Icon size of switches; also the offset of fresh link handles from the drop point.
    pub router_size: f64,
    pub endpoint_size: f64,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            device_size: 40.0,
            router_size: 60.0,
            endpoint_size: 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub offset_x: f64,
    pub offset_y: f64,
    pub items_per_row: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            offset_x: 150.0,
            offset_y: 150.0,
            items_per_row: 8,
        }
    }
}

impl EditorSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("netdesign").join("settings.json"))
    }

    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        tracing::info!("Loading settings from {:?}", path);
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Settings loaded successfully: {:?}", settings);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::error!("Failed to save settings: {}", e);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    pub fn router(&self) -> EdgeRouter {
        EdgeRouter::with_settings(self.routing.perimeter_factor, self.routing.loop_radius)
    }

    pub fn grid(&self) -> GridLayout {
        GridLayout {
            offset_x: self.layout.offset_x,
            offset_y: self.layout.offset_y,
            items_per_row: self.layout.items_per_row,
        }
    }
}
