//! Collision audio cues
//!
//! The engine only emits cues; synthesis belongs to whatever implements
//! `AudioSink` (Web Audio, a native mixer, or nothing at all).

/// Impact speed at which cues reach full pitch and volume
pub const LOUD_IMPACT_SPEED: f32 = 8.0;

/// Pitch range for peg hits (Hz)
const MIN_FREQUENCY: f32 = 300.0;
const MAX_FREQUENCY: f32 = 1200.0;

/// Volume range for peg hits (0.0 - 1.0)
const MIN_VOLUME: f32 = 0.05;
const MAX_VOLUME: f32 = 0.4;

const PEG_HIT_DURATION_SECS: f32 = 0.05;

/// A short synthesized blip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    pub frequency: f32,
    pub volume: f32,
    pub duration_secs: f32,
}

/// Cue for a peg hit; pitch and volume rise with impact speed
pub fn peg_hit_cue(impact_speed: f32) -> AudioCue {
    let t = if impact_speed.is_finite() {
        (impact_speed / LOUD_IMPACT_SPEED).clamp(0.0, 1.0)
    } else {
        1.0
    };

    AudioCue {
        frequency: MIN_FREQUENCY + (MAX_FREQUENCY - MIN_FREQUENCY) * t,
        volume: MIN_VOLUME + (MAX_VOLUME - MIN_VOLUME) * t,
        duration_secs: PEG_HIT_DURATION_SECS,
    }
}

/// Anything that can play cues
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Sink that drops every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Sink that keeps every cue (headless runs and tests)
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub cues: Vec<AudioCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_monotonic_in_speed() {
        let mut last = peg_hit_cue(0.0);
        for i in 1..=20 {
            let cue = peg_hit_cue(i as f32 * 0.5);
            assert!(cue.frequency >= last.frequency);
            assert!(cue.volume >= last.volume);
            last = cue;
        }
    }

    #[test]
    fn test_cue_clamped() {
        let quiet = peg_hit_cue(-3.0);
        assert_eq!(quiet.frequency, MIN_FREQUENCY);
        assert_eq!(quiet.volume, MIN_VOLUME);

        let loud = peg_hit_cue(1000.0);
        assert_eq!(loud.frequency, MAX_FREQUENCY);
        assert_eq!(loud.volume, MAX_VOLUME);
        assert_eq!(peg_hit_cue(f32::NAN), loud);
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingAudio::default();
        sink.play(peg_hit_cue(2.0));
        assert_eq!(sink.cues.len(), 1);
    }
}
