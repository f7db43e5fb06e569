//! Tagged commands
//!
//! Hosts that drive the widget from data (scripts, scenario files, message
//! queues) describe each call as a [`Command`] and hand it to
//! [`ImageCube::execute`](crate::ImageCube::execute).

use std::str::FromStr;

use imagecube_surface::SurfaceId;

use crate::error::CubeError;
use crate::settings::SettingsPatch;

/// One effectful image cube operation
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Attach(SettingsPatch),
    Reconfigure(SettingsPatch),
    /// Rotate now, optionally to a specific panel
    Rotate { next: Option<SurfaceId> },
    Start,
    Stop { temporary: bool },
    Detach,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Attach(_) => "attach",
            Command::Reconfigure(_) => "reconfigure",
            Command::Rotate { .. } => "rotate",
            Command::Start => "start",
            Command::Stop { .. } => "stop",
            Command::Detach => "detach",
        }
    }
}

/// Parses the argument-free form of a command name
impl FromStr for Command {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attach" => Ok(Command::Attach(SettingsPatch::new())),
            "reconfigure" | "change" | "option" => Ok(Command::Reconfigure(SettingsPatch::new())),
            "rotate" => Ok(Command::Rotate { next: None }),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop { temporary: false }),
            "pause" => Ok(Command::Stop { temporary: true }),
            "detach" | "destroy" => Ok(Command::Detach),
            _ => Err(CubeError::UnknownCommand(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!("rotate".parse::<Command>().unwrap(), Command::Rotate { next: None });
        assert_eq!(
            "Pause".parse::<Command>().unwrap(),
            Command::Stop { temporary: true }
        );
        assert_eq!("destroy".parse::<Command>().unwrap().name(), "detach");
        assert!(matches!(
            "spin".parse::<Command>(),
            Err(CubeError::UnknownCommand(_))
        ));
    }
}
