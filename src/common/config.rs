use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::common::collections::HashMap;
use crate::dispatch::ActionDispatcher;
use crate::gesture::{
    CloseMode, Feature, LauncherProfile, Profile, ToggleProfile, WindowPinchProfile,
};
use crate::sys::keys::KeyChord;
use crate::sys::recognizer::{ActionMode, Orientation, Registration};

pub fn config_file() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join("gesture-shell.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub volume: VolumeSettings,
    #[serde(default)]
    pub window_manipulation: WindowManipulationSettings,
    #[serde(default)]
    pub launcher: LauncherSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Default log level when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether the shell's own workspace gesture is active, which frees up
    /// three finger vertical swipes.
    #[serde(default)]
    pub default_session_workspace_gesture: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TerminalSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_four_fingers")]
    pub fingers: Vec<u8>,
    #[serde(default = "default_terminal_app_id")]
    pub app_id: String,
    #[serde(default = "default_toggle_keys")]
    pub toggle_keys: KeyChord,
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    #[serde(default = "default_commit_duration_ms")]
    pub commit_duration_ms: u64,
    #[serde(default = "default_cancel_duration_ms")]
    pub cancel_duration_ms: u64,
    #[serde(default)]
    pub easing: Easing,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct VolumeSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_four_fingers")]
    pub fingers: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct WindowManipulationSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "default_three_fingers")]
    pub fingers: Vec<u8>,
    #[serde(default)]
    pub close_mode: CloseMode,
    #[serde(default = "default_close_document_keys")]
    pub close_document_keys: KeyChord,
    #[serde(default = "default_minimize_threshold")]
    pub minimize_threshold: f64,
    #[serde(default = "default_minimize_scale")]
    pub minimize_scale: f64,
    #[serde(default = "default_fullscreen_inset")]
    pub fullscreen_inset: f64,
    #[serde(default)]
    pub easing: Easing,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LauncherSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_four_fingers")]
    pub fingers: Vec<u8>,
    #[serde(default = "default_launcher_keys")]
    pub launcher_keys: KeyChord,
    #[serde(default = "default_preview_width")]
    pub preview_width: f64,
    #[serde(default = "default_preview_height")]
    pub preview_height: f64,
    #[serde(default = "default_progress_gain")]
    pub progress_gain: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: default_log_level(),
            default_session_workspace_gesture: false,
        }
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            enabled: true,
            fingers: default_four_fingers(),
            app_id: default_terminal_app_id(),
            toggle_keys: default_toggle_keys(),
            snap_threshold: default_snap_threshold(),
            commit_duration_ms: default_commit_duration_ms(),
            cancel_duration_ms: default_cancel_duration_ms(),
            easing: Easing::default(),
        }
    }
}

impl Default for VolumeSettings {
    fn default() -> Self {
        VolumeSettings {
            enabled: false,
            fingers: default_four_fingers(),
        }
    }
}

impl Default for WindowManipulationSettings {
    fn default() -> Self {
        WindowManipulationSettings {
            enabled: true,
            fingers: default_three_fingers(),
            close_mode: CloseMode::default(),
            close_document_keys: default_close_document_keys(),
            minimize_threshold: default_minimize_threshold(),
            minimize_scale: default_minimize_scale(),
            fullscreen_inset: default_fullscreen_inset(),
            easing: Easing::default(),
        }
    }
}

impl Default for LauncherSettings {
    fn default() -> Self {
        LauncherSettings {
            enabled: false,
            fingers: default_four_fingers(),
            launcher_keys: default_launcher_keys(),
            preview_width: default_preview_width(),
            preview_height: default_preview_height(),
            progress_gain: default_progress_gain(),
            easing: Easing::default(),
        }
    }
}

fn check_fingers(section: &str, fingers: &[u8], issues: &mut Vec<String>) {
    if fingers.is_empty() {
        issues.push(format!("{section}.fingers must not be empty"));
    }
    if let Some(bad) = fingers.iter().find(|&&n| !(2..=5).contains(&n)) {
        issues.push(format!("{section}.fingers must be between 2 and 5, got {bad}"));
    }
}

fn in_unit_interval(value: f64) -> bool { value > 0.0 && value < 1.0 }

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.log_level.parse::<tracing::Level>().is_err() {
            issues.push(format!("log_level must be a tracing level, got {:?}", self.log_level));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        if self.log_level.parse::<tracing::Level>().is_err() {
            self.log_level = default_log_level();
            return 1;
        }
        0
    }
}

impl TerminalSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        check_fingers("terminal", &self.fingers, &mut issues);

        if self.app_id.is_empty() {
            issues.push("terminal.app_id must not be empty".to_string());
        }

        if !in_unit_interval(self.snap_threshold) {
            issues.push(format!(
                "terminal.snap_threshold must be in (0, 1), got {}",
                self.snap_threshold
            ));
        }

        if self.commit_duration_ms == 0 {
            issues.push("terminal.commit_duration_ms must be positive".to_string());
        }

        if self.cancel_duration_ms == 0 {
            issues.push("terminal.cancel_duration_ms must be positive".to_string());
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !in_unit_interval(self.snap_threshold) {
            self.snap_threshold = default_snap_threshold();
            fixes += 1;
        }

        if self.commit_duration_ms == 0 {
            self.commit_duration_ms = default_commit_duration_ms();
            fixes += 1;
        }

        if self.cancel_duration_ms == 0 {
            self.cancel_duration_ms = default_cancel_duration_ms();
            fixes += 1;
        }

        fixes
    }

    pub fn profile(&self) -> Profile {
        Profile::Toggle(ToggleProfile {
            app_id: self.app_id.clone(),
            snap_threshold: self.snap_threshold,
            commit_duration: Duration::from_millis(self.commit_duration_ms),
            cancel_duration: Duration::from_millis(self.cancel_duration_ms),
            easing: self.easing,
        })
    }
}

impl VolumeSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        check_fingers("volume", &self.fingers, &mut issues);
        issues
    }
}

impl WindowManipulationSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        check_fingers("window_manipulation", &self.fingers, &mut issues);

        if !in_unit_interval(self.minimize_threshold) {
            issues.push(format!(
                "window_manipulation.minimize_threshold must be in (0, 1), got {}",
                self.minimize_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.minimize_scale) {
            issues.push(format!(
                "window_manipulation.minimize_scale must be in [0, 1], got {}",
                self.minimize_scale
            ));
        }

        if !(0.0..0.5).contains(&self.fullscreen_inset) {
            issues.push(format!(
                "window_manipulation.fullscreen_inset must be in [0, 0.5), got {}",
                self.fullscreen_inset
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !in_unit_interval(self.minimize_threshold) {
            self.minimize_threshold = default_minimize_threshold();
            fixes += 1;
        }

        if !(0.0..=1.0).contains(&self.minimize_scale) {
            self.minimize_scale = default_minimize_scale();
            fixes += 1;
        }

        if !(0.0..0.5).contains(&self.fullscreen_inset) {
            self.fullscreen_inset = default_fullscreen_inset();
            fixes += 1;
        }

        fixes
    }

    pub fn profile(&self) -> Profile {
        Profile::WindowPinch(WindowPinchProfile {
            minimize_threshold: self.minimize_threshold,
            minimize_scale: self.minimize_scale,
            fullscreen_inset: self.fullscreen_inset,
            easing: self.easing,
        })
    }
}

impl LauncherSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        check_fingers("launcher", &self.fingers, &mut issues);

        if self.preview_width <= 0.0 || self.preview_height <= 0.0 {
            issues.push(format!(
                "launcher preview size must be positive, got {}x{}",
                self.preview_width, self.preview_height
            ));
        }

        if !(self.progress_gain > 0.0 && self.progress_gain.is_finite()) {
            issues.push(format!(
                "launcher.progress_gain must be positive, got {}",
                self.progress_gain
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.preview_width <= 0.0 {
            self.preview_width = default_preview_width();
            fixes += 1;
        }

        if self.preview_height <= 0.0 {
            self.preview_height = default_preview_height();
            fixes += 1;
        }

        if !(self.progress_gain > 0.0 && self.progress_gain.is_finite()) {
            self.progress_gain = default_progress_gain();
            fixes += 1;
        }

        fixes
    }

    pub fn profile(&self) -> Profile {
        Profile::Launcher(LauncherProfile {
            preview_width: self.preview_width,
            preview_height: self.preview_height,
            progress_gain: self.progress_gain,
            easing: self.easing,
            preview: None,
        })
    }
}

fn yes() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

fn default_three_fingers() -> Vec<u8> { vec![3] }

fn default_four_fingers() -> Vec<u8> { vec![4] }

fn default_terminal_app_id() -> String { "com.github.amezin.ddterm".to_string() }

fn default_toggle_keys() -> KeyChord { KeyChord::new(vec![crate::sys::keys::KeyCode::F12]) }

fn default_launcher_keys() -> KeyChord {
    use crate::sys::keys::KeyCode::*;
    KeyChord::new(vec![SuperL, Slash])
}

fn default_close_document_keys() -> KeyChord {
    use crate::sys::keys::KeyCode::*;
    KeyChord::new(vec![ControlL, KeyW])
}

fn default_snap_threshold() -> f64 { 0.2 }

fn default_commit_duration_ms() -> u64 { 400 }

fn default_cancel_duration_ms() -> u64 { 100 }

fn default_minimize_threshold() -> f64 { 0.8 }

fn default_minimize_scale() -> f64 { 0.8 }

fn default_fullscreen_inset() -> f64 { 0.025 }

fn default_preview_width() -> f64 { 725.0 }

fn default_preview_height() -> f64 { 180.0 }

fn default_progress_gain() -> f64 { 3.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../gesture-shell.default.toml"))
            .unwrap_or_else(|_| Config::builtin())
    }

    /// The config with every field at its serde default.
    fn builtin() -> Config {
        Config {
            settings: Settings::default(),
            terminal: TerminalSettings::default(),
            volume: VolumeSettings::default(),
            window_manipulation: WindowManipulationSettings::default(),
            launcher: LauncherSettings::default(),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    /// Disabled features are not checked.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.settings.validate());

        if self.terminal.enabled {
            issues.extend(self.terminal.validate());
        }
        if self.volume.enabled {
            issues.extend(self.volume.validate());
        }
        if self.window_manipulation.enabled {
            issues.extend(self.window_manipulation.validate());
        }
        if self.launcher.enabled {
            issues.extend(self.launcher.validate());
        }

        let mut claimed: HashMap<(u8, Orientation), Feature> = HashMap::default();
        for registration in self.registrations() {
            for &fingers in &registration.fingers {
                let key = (fingers, registration.orientation);
                if let Some(other) = claimed.insert(key, registration.feature) {
                    issues.push(format!(
                        "{} and {} both use {fingers} finger {:?} gestures",
                        other, registration.feature, registration.orientation
                    ));
                }
            }
        }

        issues
    }

    /// Attempts to fix configuration values automatically. Finger lists and
    /// conflicts are left alone. Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        fixes += self.settings.auto_fix_values();
        fixes += self.terminal.auto_fix_values();
        fixes += self.window_manipulation.auto_fix_values();
        fixes += self.launcher.auto_fix_values();

        fixes
    }

    /// Auto-fixes what it can and returns the issues that remain, along with
    /// the number of fixes applied.
    pub fn repair(&mut self) -> (usize, Vec<String>) {
        let fixes = self.auto_fix_values();
        (fixes, self.validate())
    }

    pub fn volume_fingers(&self) -> Vec<u8> {
        if self.settings.default_session_workspace_gesture {
            vec![3]
        } else {
            self.volume.fingers.clone()
        }
    }

    /// Recognizer registrations for every enabled feature.
    pub fn registrations(&self) -> Vec<Registration> {
        let mut registrations = Vec::new();
        if self.terminal.enabled {
            registrations.push(Registration {
                feature: Feature::DropDownTerminal,
                fingers: self.terminal.fingers.clone(),
                orientation: Orientation::Vertical,
                mode: ActionMode::Normal,
            });
        }
        if self.volume.enabled {
            registrations.push(Registration {
                feature: Feature::Volume,
                fingers: self.volume_fingers(),
                orientation: Orientation::Vertical,
                mode: ActionMode::All,
            });
        }
        if self.window_manipulation.enabled {
            registrations.push(Registration {
                feature: Feature::WindowManipulation,
                fingers: self.window_manipulation.fingers.clone(),
                orientation: Orientation::Pinch,
                mode: ActionMode::Normal,
            });
        }
        if self.launcher.enabled {
            registrations.push(Registration {
                feature: Feature::Launcher,
                fingers: self.launcher.fingers.clone(),
                orientation: Orientation::Pinch,
                mode: ActionMode::Normal,
            });
        }
        registrations
    }

    pub fn dispatcher(&self) -> ActionDispatcher {
        ActionDispatcher {
            toggle_keys: self.terminal.toggle_keys.clone(),
            launcher_keys: self.launcher.launcher_keys.clone(),
            close_mode: self.window_manipulation.close_mode,
            close_document_keys: self.window_manipulation.close_document_keys.clone(),
        }
    }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default();
        assert_eq!(config, Config::builtin());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::builtin());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("[terminal]\nsnap = 0.3\n").is_err());
        assert!(Config::parse("[keys]\n").is_err());
    }

    #[test]
    fn parses_sections() {
        let config = Config::parse(
            r#"
            [settings]
            default_session_workspace_gesture = true

            [terminal]
            snap_threshold = 0.1
            toggle_keys = "Ctrl + Alt + T"
            easing = "ease_out_cubic"

            [volume]
            enabled = true

            [window_manipulation]
            close_mode = "document"
            close_document_keys = ["Ctrl", "Q"]
            "#,
        )
        .unwrap();

        assert_eq!(config.terminal.snap_threshold, 0.1);
        assert_eq!(config.terminal.toggle_keys.to_string(), "Ctrl + Alt + T");
        assert_eq!(config.terminal.easing, Easing::EaseOutCubic);
        assert_eq!(config.window_manipulation.close_mode, CloseMode::Document);
        assert_eq!(config.dispatcher().close_document_keys.to_string(), "Ctrl + Q");
        // The shell's workspace gesture leaves three fingers to volume.
        assert_eq!(config.volume_fingers(), vec![3]);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn invalid_chord_fails_to_parse() {
        assert!(Config::parse("[terminal]\ntoggle_keys = \"Ctrl\"\n").is_err());
        assert!(Config::parse("[launcher]\nlauncher_keys = \"Meta + Nope\"\n").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.terminal.snap_threshold = 1.5;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("snap_threshold must be in (0, 1)"));

        let fixes = config.auto_fix_values();
        assert_eq!(fixes, 1);
        assert_eq!(config.terminal.snap_threshold, 0.2);

        config.window_manipulation.fullscreen_inset = 0.7;
        config.settings.log_level = "loud".to_string();
        assert_eq!(config.validate().len(), 2);
        assert_eq!(config.auto_fix_values(), 2);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn repair_leaves_only_unfixable_issues() {
        let mut config = Config::default();
        config.terminal.snap_threshold = 1.5;
        config.window_manipulation.fingers.clear();

        let (fixes, issues) = config.repair();
        assert_eq!(fixes, 1);
        assert_eq!(config.terminal.snap_threshold, 0.2);
        assert_eq!(issues, vec!["window_manipulation.fingers must not be empty"]);
    }

    #[test]
    fn empty_fingers_are_not_auto_fixed() {
        let mut config = Config::default();
        config.window_manipulation.fingers.clear();
        assert_eq!(config.auto_fix_values(), 0);
        assert_eq!(config.validate(), vec!["window_manipulation.fingers must not be empty"]);

        // Disabled features aren't checked.
        config.window_manipulation.enabled = false;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn conflicting_fingers_are_reported() {
        let mut config = Config::default();
        config.volume.enabled = true;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("drop_down_terminal and volume"), "{}", issues[0]);

        config.settings.default_session_workspace_gesture = true;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn registrations_follow_enabled_features() {
        let mut config = Config::default();
        config.launcher.enabled = true;
        let features: Vec<_> = config.registrations().iter().map(|r| r.feature).collect();
        assert_eq!(
            features,
            vec![Feature::DropDownTerminal, Feature::WindowManipulation, Feature::Launcher]
        );
        let launcher = &config.registrations()[2];
        assert_eq!(launcher.orientation, Orientation::Pinch);
        assert_eq!(launcher.mode, ActionMode::Normal);
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gesture-shell.toml");
        let mut config = Config::default();
        config.launcher.enabled = true;
        config.launcher.progress_gain = 2.5;
        config.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn read_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::read(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
