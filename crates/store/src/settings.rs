//! Player preferences
//!
//! Sound, haptic and theme flags are stored and toggled but nothing consumes
//! them beyond the presenter that chooses to.

use tile_merge_types::Difficulty;

use crate::keys;
use crate::kv::KeyValueStore;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub sound_enabled: bool,
    pub haptic_enabled: bool,
    pub dark_theme: bool,
    pub tutorial_shown: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            sound_enabled: true,
            haptic_enabled: true,
            dark_theme: false,
            tutorial_shown: false,
        }
    }
}

impl Settings {
    /// Read every preference, defaulting each one independently
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        let defaults = Self::default();
        let difficulty: String =
            storage.get(keys::DIFFICULTY, defaults.difficulty.as_str().to_string());
        Self {
            difficulty: Difficulty::from_str(&difficulty).unwrap_or(defaults.difficulty),
            sound_enabled: storage.get(keys::SOUND_ENABLED, defaults.sound_enabled),
            haptic_enabled: storage.get(keys::HAPTIC_ENABLED, defaults.haptic_enabled),
            dark_theme: storage.get(keys::DARK_THEME, defaults.dark_theme),
            tutorial_shown: storage.get(keys::TUTORIAL_SHOWN, defaults.tutorial_shown),
        }
    }

    pub fn set_difficulty<S: KeyValueStore>(
        &mut self,
        storage: &mut Storage<S>,
        difficulty: Difficulty,
    ) -> bool {
        self.difficulty = difficulty;
        storage.set(keys::DIFFICULTY, difficulty.as_str())
    }

    pub fn set_sound<S: KeyValueStore>(&mut self, storage: &mut Storage<S>, on: bool) -> bool {
        self.sound_enabled = on;
        storage.set(keys::SOUND_ENABLED, &on)
    }

    pub fn set_haptic<S: KeyValueStore>(&mut self, storage: &mut Storage<S>, on: bool) -> bool {
        self.haptic_enabled = on;
        storage.set(keys::HAPTIC_ENABLED, &on)
    }

    pub fn set_dark_theme<S: KeyValueStore>(&mut self, storage: &mut Storage<S>, on: bool) -> bool {
        self.dark_theme = on;
        storage.set(keys::DARK_THEME, &on)
    }

    pub fn mark_tutorial_shown<S: KeyValueStore>(&mut self, storage: &mut Storage<S>) -> bool {
        self.tutorial_shown = true;
        storage.set(keys::TUTORIAL_SHOWN, &true)
    }
}
