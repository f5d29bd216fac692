//! Live volume preferences.
//!
//! Volumes are read each time a sound starts, so a change made mid-session
//! applies to the next sound rather than the one already playing.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::storage::Config;

/// Source of the two volume levels, each in `[0, 100]`.
pub trait VolumePreferences: Send + Sync {
    fn alarm_volume(&self) -> u8;
    fn ambient_volume(&self) -> u8;
}

/// Shareable, lock-free preference store.
#[derive(Debug)]
pub struct Preferences {
    alarm_volume: AtomicU8,
    ambient_volume: AtomicU8,
    distraction_free: AtomicBool,
}

impl Preferences {
    pub fn new(alarm_volume: u8, ambient_volume: u8) -> Self {
        Self {
            alarm_volume: AtomicU8::new(alarm_volume.min(100)),
            ambient_volume: AtomicU8::new(ambient_volume.min(100)),
            distraction_free: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let prefs = Self::new(
            clamp_volume(config.preferences.alarm_volume),
            clamp_volume(config.preferences.background_volume),
        );
        prefs.set_distraction_free(config.preferences.distraction_free);
        prefs
    }

    pub fn set_alarm_volume(&self, volume: u8) {
        self.alarm_volume.store(volume.min(100), Ordering::Relaxed);
    }

    pub fn set_ambient_volume(&self, volume: u8) {
        self.ambient_volume.store(volume.min(100), Ordering::Relaxed);
    }

    /// Carried for front-ends; the core does not act on it.
    pub fn distraction_free(&self) -> bool {
        self.distraction_free.load(Ordering::Relaxed)
    }

    pub fn set_distraction_free(&self, enabled: bool) {
        self.distraction_free.store(enabled, Ordering::Relaxed);
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

impl VolumePreferences for Preferences {
    fn alarm_volume(&self) -> u8 {
        self.alarm_volume.load(Ordering::Relaxed)
    }

    fn ambient_volume(&self) -> u8 {
        self.ambient_volume.load(Ordering::Relaxed)
    }
}

fn clamp_volume(volume: u32) -> u8 {
    u8::try_from(volume.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_to_hundred() {
        let prefs = Preferences::default();
        prefs.set_alarm_volume(250);
        prefs.set_ambient_volume(40);
        assert_eq!(prefs.alarm_volume(), 100);
        assert_eq!(prefs.ambient_volume(), 40);
    }

    #[test]
    fn from_config_reads_preference_section() {
        let mut config = Config::default();
        config.preferences.alarm_volume = 30;
        config.preferences.background_volume = 900;
        config.preferences.distraction_free = true;
        let prefs = Preferences::from_config(&config);
        assert_eq!(prefs.alarm_volume(), 30);
        assert_eq!(prefs.ambient_volume(), 100);
        assert!(prefs.distraction_free());
    }
}
