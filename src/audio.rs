//! Audio driven by game events
//!
//! The core never touches an audio device. It raises `PlaySound`/`StopSound`
//! events and [`AudioManager`] forwards them to whatever [`AudioPort`] the host
//! provides, applying volume and mute on the way.

use std::collections::HashSet;

use crate::settings::AudioSettings;
use crate::sim::{GameEvent, SoundCue};

/// Output side of the audio system
pub trait AudioPort {
    /// Start `cue` at `volume` (0.0 - 1.0)
    fn play(&mut self, cue: SoundCue, volume: f32);
    /// Cut `cue` short if it is still playing
    fn stop(&mut self, cue: SoundCue);
}

/// Audio manager for the game
pub struct AudioManager<P: AudioPort> {
    port: P,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Sustained cues started and not yet stopped
    playing: HashSet<SoundCue>,
}

impl<P: AudioPort> AudioManager<P> {
    pub fn new(port: P, settings: &AudioSettings) -> Self {
        let mut manager = Self {
            port,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            playing: HashSet::new(),
        };
        manager.apply_settings(settings);
        manager
    }

    pub fn apply_settings(&mut self, settings: &AudioSettings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn is_playing(&self, cue: SoundCue) -> bool {
        self.playing.contains(&cue)
    }

    /// Play a cue at the effective volume; silent when muted
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        // Restarting a cue replaces the running instance
        if self.playing.contains(&cue) {
            self.port.stop(cue);
        }
        self.port.play(cue, vol);
        if cue.is_sustained() {
            self.playing.insert(cue);
        }
    }

    pub fn stop(&mut self, cue: SoundCue) {
        if self.playing.remove(&cue) {
            self.port.stop(cue);
        }
    }

    /// React to the sound events in `events`, ignoring everything else
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::PlaySound(cue) => self.play(cue),
                GameEvent::StopSound(cue) => self.stop(cue),
                _ => {}
            }
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}

/// Port that writes cues to the log; used by the headless build
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioPort for LogAudio {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::info!("Sound: play {cue:?} at {volume:.2}");
    }

    fn stop(&mut self, cue: SoundCue) {
        log::debug!("Sound: stop {cue:?}");
    }
}
