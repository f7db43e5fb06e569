//! Scenario definition for headless rotation runs.

use std::path::Path;

use anyhow::{Context, Result};
use imagecube::SettingsPatch;
use serde::Deserialize;

/// Sequence of steps replayed against one container.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}

fn default_frame_ms() -> f32 {
    16.0
}

fn default_frames() -> u32 {
    1
}

/// One scripted step. Panels are addressed by their index in the container.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Advance time in one jump without printing
    Wait { ms: f32 },
    /// Advance `frames` frames of `ms` each, optionally printing each one
    Tick {
        #[serde(default = "default_frames")]
        frames: u32,
        #[serde(default = "default_frame_ms")]
        ms: f32,
        #[serde(default)]
        print: bool,
    },
    Rotate {
        #[serde(default)]
        next: Option<usize>,
    },
    Start,
    Stop {
        #[serde(default)]
        temporary: bool,
    },
    Reconfigure { settings: SettingsPatch },
    Detach,
    Snapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecube::{Patch, Selection};

    #[test]
    fn parses_every_step_kind() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [
                { "type": "wait", "ms": 2000 },
                { "type": "tick", "frames": 10, "print": true },
                { "type": "rotate", "next": 2 },
                { "type": "rotate" },
                { "type": "stop", "temporary": true },
                { "type": "start" },
                { "type": "reconfigure", "settings": { "selection": "backward", "speed": null } },
                { "type": "snapshot" },
                { "type": "detach" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 9);
        assert!(matches!(
            scenario.steps[1],
            ScenarioStep::Tick { frames: 10, ms, print: true } if ms == 16.0
        ));
        assert!(matches!(scenario.steps[2], ScenarioStep::Rotate { next: Some(2) }));
        assert!(matches!(scenario.steps[3], ScenarioStep::Rotate { next: None }));
        match &scenario.steps[6] {
            ScenarioStep::Reconfigure { settings } => {
                assert_eq!(settings.selection, Patch::Set(Selection::Backward));
                assert_eq!(settings.speed, Patch::Clear);
                assert!(settings.pause.is_keep());
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_settings() {
        let err = Scenario::from_json(
            r#"{ "steps": [ { "type": "reconfigure", "settings": { "spin": 3 } } ] }"#,
        );
        assert!(err.is_err());
    }
}
