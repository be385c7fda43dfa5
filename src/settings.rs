use serde::{Serialize, Deserialize};

/// All user-configurable settings, persisted to JSON.
#[derive(Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub edit: EditSettings,
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplaySettings {
    pub default_shape_color: [f32; 4],
    pub highlight_intensity: f32,
    pub undo_limit: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            default_shape_color: [0.5, 0.55, 0.6, 1.0],
            highlight_intensity: 0.5,
            undo_limit: 50,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EditSettings {
    pub extrude_distance: f32,
    pub duplicate_offset: f32,
    pub bvh_leaf_size: usize,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            extrude_distance: 0.5,
            duplicate_offset: 0.5,
            bvh_leaf_size: 8,
        }
    }
}

impl Settings {
    /// Load settings from config file. Falls back to defaults on error.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists()
            && let Ok(data) = std::fs::read_to_string(&path)
            && let Ok(settings) = serde_json::from_str::<Settings>(&data)
        {
            return settings;
        }
        Self::default()
    }

    /// Save settings to config file.
    pub fn save(&self) {
        let path = config_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(self) {
            let _ = std::fs::write(&path, data);
        }
    }
}

fn config_path() -> std::path::PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    std::path::PathBuf::from(home).join(".config/shaper3d/settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"display":{"undo_limit":10}}"#).unwrap();
        assert_eq!(settings.display.undo_limit, 10);
        assert_eq!(settings.display.highlight_intensity, 0.5);
        assert_eq!(settings.edit.bvh_leaf_size, 8);
    }
}
