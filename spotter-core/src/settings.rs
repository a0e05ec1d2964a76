//! Topic names and feature flags shared by the spotter and the mother node

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Palette entry used when a color label is unknown
pub const ERROR_COLOR: &str = "error";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<SettingsError> for crate::Error {
    fn from(err: SettingsError) -> Self {
        crate::Error::Configuration(err.to_string())
    }
}

/// Parse a settings document, trying JSON, then TOML, then YAML
pub fn parse_document<T: DeserializeOwned>(content: &str) -> Result<T, SettingsError> {
    if let Ok(value) = serde_json::from_str::<T>(content) {
        return Ok(value);
    }

    if let Ok(value) = toml::from_str::<T>(content) {
        return Ok(value);
    }

    serde_yaml::from_str::<T>(content)
        .map_err(|e| SettingsError::Parse(format!("not valid JSON, TOML or YAML: {}", e)))
}

/// Read and parse a settings document from disk
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SettingsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| SettingsError::Io(format!("{}: {}", path.display(), e)))?;
    parse_document(&content)
}

fn check_name(kind: &str, value: &str) -> Result<(), SettingsError> {
    if value.trim().is_empty() {
        return Err(SettingsError::Validation(format!("{} must not be empty", kind)));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(SettingsError::Validation(format!(
            "{} '{}' must not contain whitespace",
            kind, value
        )));
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings of the mother coordination node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotherSettings {
    pub recognizer_service_name: String,
    pub object_candidates_topic: String,
    pub goal_pose_topic: String,
    pub navigation_goal_topic: String,
    pub goal_achieved_topic: String,
    /// Frame the mother node reasons in
    pub working_frame: String,
    pub arm_pickup_service_name: String,
    pub arm_movement_complete_topic: String,
    pub odometry_topic: String,
    pub using_path_planning: bool,
    pub using_arm: bool,
    pub using_vision: bool,
    /// Display color (RGB) per object color label
    pub palette: BTreeMap<String, [u8; 3]>,
    pub vision_verbose: bool,
    pub detection_verbose: bool,
}

impl Default for MotherSettings {
    fn default() -> Self {
        let palette = [
            ("green", [0, 255, 0]),
            ("red", [255, 0, 0]),
            ("blue", [0, 0, 255]),
            ("yellow", [255, 255, 0]),
            ("purple", [128, 0, 128]),
            ("orange", [255, 165, 0]),
            (ERROR_COLOR, [128, 128, 128]),
        ]
        .into_iter()
        .map(|(name, rgb)| (name.to_string(), rgb))
        .collect();

        Self {
            recognizer_service_name: "/camera/recognizer".to_string(),
            object_candidates_topic: "/camera/object_candidates".to_string(),
            goal_pose_topic: "/move_base_simple/goal".to_string(),
            navigation_goal_topic: "navigation/set_the_goal".to_string(),
            goal_achieved_topic: "navigation/status".to_string(),
            working_frame: "world_map".to_string(),
            arm_pickup_service_name: "/arm/pickup".to_string(),
            arm_movement_complete_topic: "/arm/done".to_string(),
            odometry_topic: "/odometry_node/odom".to_string(),
            using_path_planning: false,
            using_arm: false,
            using_vision: true,
            palette,
            vision_verbose: false,
            detection_verbose: false,
        }
    }
}

impl MotherSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        read_document(path)
    }

    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        parse_document(content)
    }

    /// Defaults overridden by `SPOTTER_*` environment variables
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Apply overrides from a variable lookup; unparsable flags are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(frame) = lookup("SPOTTER_WORKING_FRAME") {
            self.working_frame = frame;
        }
        if let Some(topic) = lookup("SPOTTER_OBJECT_CANDIDATES_TOPIC") {
            self.object_candidates_topic = topic;
        }
        if let Some(topic) = lookup("SPOTTER_ODOMETRY_TOPIC") {
            self.odometry_topic = topic;
        }

        let flags: [(&str, &mut bool); 5] = [
            ("SPOTTER_USING_PATH_PLANNING", &mut self.using_path_planning),
            ("SPOTTER_USING_ARM", &mut self.using_arm),
            ("SPOTTER_USING_VISION", &mut self.using_vision),
            ("SPOTTER_VISION_VERBOSE", &mut self.vision_verbose),
            ("SPOTTER_DETECTION_VERBOSE", &mut self.detection_verbose),
        ];
        for (key, flag) in flags {
            if let Some(value) = lookup(key).as_deref().and_then(parse_flag) {
                *flag = value;
            }
        }
    }

    /// Display color for a label, falling back to the error entry
    pub fn color_rgb(&self, label: &str) -> [u8; 3] {
        self.palette
            .get(label)
            .or_else(|| self.palette.get(ERROR_COLOR))
            .copied()
            .unwrap_or([128, 128, 128])
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_name("recognizer_service_name", &self.recognizer_service_name)?;
        check_name("object_candidates_topic", &self.object_candidates_topic)?;
        check_name("goal_pose_topic", &self.goal_pose_topic)?;
        check_name("navigation_goal_topic", &self.navigation_goal_topic)?;
        check_name("goal_achieved_topic", &self.goal_achieved_topic)?;
        check_name("working_frame", &self.working_frame)?;
        check_name("arm_pickup_service_name", &self.arm_pickup_service_name)?;
        check_name("arm_movement_complete_topic", &self.arm_movement_complete_topic)?;
        check_name("odometry_topic", &self.odometry_topic)?;

        if !self.palette.contains_key(ERROR_COLOR) {
            return Err(SettingsError::Validation(format!(
                "palette must contain an '{}' entry",
                ERROR_COLOR
            )));
        }

        Ok(())
    }
}

/// Topics the camera spotter reads from and writes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTopics {
    pub rgb_image: String,
    pub depth_image: String,
    pub camera_info: String,
    pub object_candidates: String,
    pub debug_image: String,
    pub debug_hue: String,
    pub debug_mask: String,
    pub debug_hsv_scale: String,
    /// Frame id stamped on published candidates
    pub frame_id: String,
}

impl Default for CameraTopics {
    fn default() -> Self {
        Self {
            rgb_image: "/camera/rgb/image_rect_color".to_string(),
            depth_image: "/camera/depth_registered/sw_registered/image_rect".to_string(),
            camera_info: "/camera/rgb/camera_info".to_string(),
            object_candidates: "/camera/object_candidates".to_string(),
            debug_image: "/camera/debug/img".to_string(),
            debug_hue: "/camera/debug/hsv/h".to_string(),
            debug_mask: "/camera/debug/h/mask".to_string(),
            debug_hsv_scale: "/camera/debug/hsv/scale/".to_string(),
            frame_id: "/camera_link".to_string(),
        }
    }
}

impl CameraTopics {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_name("rgb_image", &self.rgb_image)?;
        check_name("depth_image", &self.depth_image)?;
        check_name("camera_info", &self.camera_info)?;
        check_name("object_candidates", &self.object_candidates)?;
        check_name("debug_image", &self.debug_image)?;
        check_name("debug_hue", &self.debug_hue)?;
        check_name("debug_mask", &self.debug_mask)?;
        check_name("debug_hsv_scale", &self.debug_hsv_scale)?;
        check_name("frame_id", &self.frame_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_deployment() {
        let settings = MotherSettings::default();
        assert_eq!(settings.object_candidates_topic, "/camera/object_candidates");
        assert_eq!(settings.working_frame, "world_map");
        assert!(settings.using_vision);
        assert!(!settings.using_arm);
        assert!(!settings.using_path_planning);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_candidates_topic_agrees_with_camera() {
        assert_eq!(
            MotherSettings::default().object_candidates_topic,
            CameraTopics::default().object_candidates
        );
    }

    #[test]
    fn test_color_rgb_fallback() {
        let settings = MotherSettings::default();
        assert_eq!(settings.color_rgb("orange"), [255, 165, 0]);
        assert_eq!(settings.color_rgb("magenta"), [128, 128, 128]);
    }

    #[test]
    fn test_apply_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SPOTTER_WORKING_FRAME", "odom"),
            ("SPOTTER_USING_ARM", "yes"),
            ("SPOTTER_USING_VISION", "0"),
            ("SPOTTER_DETECTION_VERBOSE", "maybe"),
        ]
        .into_iter()
        .collect();

        let mut settings = MotherSettings::default();
        settings.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.working_frame, "odom");
        assert!(settings.using_arm);
        assert!(!settings.using_vision);
        // unparsable flag keeps its default
        assert!(!settings.detection_verbose);
    }

    #[test]
    fn test_validate_rejects_empty_topic() {
        let mut settings = MotherSettings::default();
        settings.goal_pose_topic = String::new();
        assert!(matches!(settings.validate(), Err(SettingsError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_whitespace() {
        let mut topics = CameraTopics::default();
        topics.frame_id = "camera link".to_string();
        assert!(topics.validate().is_err());
    }

    #[test]
    fn test_validate_requires_error_color() {
        let mut settings = MotherSettings::default();
        settings.palette.remove(ERROR_COLOR);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let settings = MotherSettings::from_str("using_arm = true\nworking_frame = \"map\"\n").unwrap();
        assert!(settings.using_arm);
        assert_eq!(settings.working_frame, "map");
        assert_eq!(settings.odometry_topic, "/odometry_node/odom");
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = "using_path_planning: true\npalette:\n  error: [1, 2, 3]\n";
        let settings = MotherSettings::from_str(yaml).unwrap();
        assert!(settings.using_path_planning);
        assert_eq!(settings.color_rgb("unknown"), [1, 2, 3]);

        let json = r#"{"vision_verbose": true}"#;
        let settings = MotherSettings::from_str(json).unwrap();
        assert!(settings.vision_verbose);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            MotherSettings::from_str("using_arm: [unterminated"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_error_into_core() {
        let err: crate::Error = SettingsError::Validation("x".to_string()).into();
        assert!(matches!(err, crate::Error::Configuration(_)));
    }
}
