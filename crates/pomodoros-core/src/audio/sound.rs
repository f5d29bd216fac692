//! The catalogue of sound ids a task may reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AudioError;

/// Sound id meaning "play nothing".
pub const NONE: &str = "None";
/// Alarm id meaning "pulse the haptic motor".
pub const VIBRATION: &str = "Vibration";

/// Alarm cue numbers shipped with the app. There is no `alarm2`.
pub const ALARM_SOUNDS: [u8; 11] = [1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
/// Ambient loop numbers shipped with the app.
pub const BACKGROUND_SOUNDS: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// A recognised sound id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sound {
    None,
    Vibration,
    Alarm(u8),
    Background(u8),
}

impl Sound {
    /// Every id in the catalogue, alarms first.
    pub fn catalogue() -> Vec<Sound> {
        let mut sounds = vec![Sound::None, Sound::Vibration];
        sounds.extend(ALARM_SOUNDS.iter().map(|&n| Sound::Alarm(n)));
        sounds.extend(BACKGROUND_SOUNDS.iter().map(|&n| Sound::Background(n)));
        sounds
    }

    /// Whether this id maps to an audio file.
    pub fn is_audible(self) -> bool {
        matches!(self, Sound::Alarm(_) | Sound::Background(_))
    }
}

impl FromStr for Sound {
    type Err = AudioError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let unknown = || AudioError::UnknownSoundId(id.to_string());
        match id {
            NONE => Ok(Sound::None),
            VIBRATION => Ok(Sound::Vibration),
            _ => {
                if let Some(n) = id.strip_prefix("alarm") {
                    let n: u8 = n.parse().map_err(|_| unknown())?;
                    ALARM_SOUNDS.contains(&n).then_some(Sound::Alarm(n)).ok_or_else(unknown)
                } else if let Some(n) = id.strip_prefix("background") {
                    let n: u8 = n.parse().map_err(|_| unknown())?;
                    BACKGROUND_SOUNDS
                        .contains(&n)
                        .then_some(Sound::Background(n))
                        .ok_or_else(unknown)
                } else {
                    Err(unknown())
                }
            }
        }
    }
}

impl TryFrom<String> for Sound {
    type Error = AudioError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

impl From<Sound> for String {
    fn from(sound: Sound) -> Self {
        sound.to_string()
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sound::None => f.write_str(NONE),
            Sound::Vibration => f.write_str(VIBRATION),
            Sound::Alarm(n) => write!(f, "alarm{n}"),
            Sound::Background(n) => write!(f, "background{n}"),
        }
    }
}
