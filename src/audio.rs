//! Sound effects via the Web Audio API
//!
//! Everything is synthesized from oscillators, so the page ships no audio
//! files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Avatar card flips over
    Decrypt,
    /// Player caught a food
    Catch,
    LevelUp,
    /// Countdown ran out
    TimeUp,
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: 0.8,
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = self.volume;
        match effect {
            SoundEffect::Decrypt => self.play_decrypt(ctx, vol),
            SoundEffect::Catch => self.play_catch(ctx, vol),
            SoundEffect::LevelUp => self.play_level_up(ctx, vol),
            SoundEffect::TimeUp => self.play_time_up(ctx, vol),
        }
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Short rising chirp sequence
    fn play_decrypt(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        for (i, freq) in [440.0, 660.0, 550.0, 880.0].iter().enumerate() {
            osc.frequency()
                .set_value_at_time(*freq, t + i as f64 * 0.06)
                .ok();
        }

        osc.start().ok();
        osc.stop_with_when(t + 0.32).ok();
    }

    /// Bright pop
    fn play_catch(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 600.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(600.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1200.0, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Major arpeggio
    fn play_level_up(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (i, freq) in [523.0, 659.0, 784.0].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) else {
                continue;
            };
            let start = t + i as f64 * 0.08;
            gain.gain().set_value_at_time(vol * 0.3, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.22).ok();
        }
    }

    /// Falling tone
    fn play_time_up(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.8)
            .ok();
        osc.frequency().set_value_at_time(400.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(80.0, t + 0.8)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.85).ok();
    }
}
