// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio cues played after a successful analysis.
//!
//! Cue selection is a pure keyword match. Playback failures arm a single
//! deferred retry that fires on the next click in the window.

pub mod player;

use crate::config::AudioConfig;
use crate::models::verdict::RipenessLevel;

/// One of the three fixed sound clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Unripe,
    Ripe,
    Overripe,
}

impl AudioCue {
    pub fn for_level(level: RipenessLevel) -> Self {
        match level {
            RipenessLevel::Unripe => AudioCue::Unripe,
            RipenessLevel::Perfect => AudioCue::Ripe,
            RipenessLevel::VeryRipe | RipenessLevel::Overripe => AudioCue::Overripe,
        }
    }

    /// Location of the clip for this cue.
    pub fn url<'a>(&self, config: &'a AudioConfig) -> &'a str {
        match self {
            AudioCue::Unripe => &config.unripe_url,
            AudioCue::Ripe => &config.ripe_url,
            AudioCue::Overripe => &config.overripe_url,
        }
    }
}

/// Pick the cue for a verdict's ripeness text, if any keyword matches.
pub fn select_cue(ripeness: &str) -> Option<AudioCue> {
    RipenessLevel::classify(ripeness).map(AudioCue::for_level)
}

/// Whether a playback request is the first try or the deferred retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Single pending retry slot.
#[derive(Debug, Default)]
pub struct DeferredCue {
    pending: Option<AudioCue>,
}

impl DeferredCue {
    /// Record a failed playback. Retries are never re-armed.
    pub fn on_failure(&mut self, cue: AudioCue, attempt: Attempt) {
        match attempt {
            Attempt::First => {
                if let Some(previous) = self.pending.replace(cue) {
                    log::debug!("Replacing pending {:?} cue with {:?}", previous, cue);
                }
            }
            Attempt::Retry => {
                log::warn!("Audio still failed after user interaction ({:?})", cue);
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending cue in response to a click.
    pub fn take_on_click(&mut self) -> Option<AudioCue> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_selection() {
        assert_eq!(select_cue("green/unripe"), Some(AudioCue::Unripe));
        assert_eq!(select_cue("yellow/perfect"), Some(AudioCue::Ripe));
        assert_eq!(select_cue("spotted/very ripe"), Some(AudioCue::Overripe));
        assert_eq!(select_cue("brown/overripe"), Some(AudioCue::Overripe));
        assert_eq!(select_cue("no idea"), None);
    }

    #[test]
    fn test_cue_urls() {
        let config = AudioConfig::default();
        assert!(AudioCue::Unripe.url(&config).ends_with("unripe.mp3"));
        assert!(AudioCue::Ripe.url(&config).ends_with("/ripe.mp3"));
        assert!(AudioCue::Overripe.url(&config).ends_with("overripe.mp3"));
    }

    #[test]
    fn test_one_click_fires_one_retry() {
        let mut deferred = DeferredCue::default();
        deferred.on_failure(AudioCue::Unripe, Attempt::First);
        deferred.on_failure(AudioCue::Ripe, Attempt::First);

        assert_eq!(deferred.take_on_click(), Some(AudioCue::Ripe));
        assert_eq!(deferred.take_on_click(), None);
    }

    #[test]
    fn test_failed_retry_is_not_rearmed() {
        let mut deferred = DeferredCue::default();
        deferred.on_failure(AudioCue::Overripe, Attempt::Retry);
        assert!(!deferred.is_armed());
    }

    #[test]
    fn test_cancel() {
        let mut deferred = DeferredCue::default();
        deferred.on_failure(AudioCue::Ripe, Attempt::First);
        deferred.cancel();
        assert_eq!(deferred.take_on_click(), None);
    }
}
