//! Haptic output scheduler
//!
//! Owns the playback timeline triggered by hit events. Each render tick it
//! advances a time cursor, samples the acoustic field at every registered
//! actuator position, shapes the sampled level (gain, floor subtraction,
//! silence threshold, cap), quantizes to 0..=100, aggregates per device
//! group, and flushes bounded-duration packets to the device sink.
//!
//! The state machine is `Idle → Playing → Idle`: a hit (or the auto-play
//! timer) starts a session; the session tears down, silencing all groups,
//! in the same tick the remaining duration crosses zero.

use serde::{Deserialize, Serialize};

use crate::error::BellwaveError;
use crate::field::AcousticField;
use crate::hit::HitSource;
use crate::sink::DeviceSink;
use crate::types::{ContactSnapshot, DeviceGroup, Vec3};

/// Maximum number of registered actuators.
pub const MAX_ACTUATORS: usize = 64;

/// Maximum motor slots per device group (sized for a 40-motor vest).
pub const MAX_MOTORS: usize = 40;

/// Floor for the reference ceilings, preventing division by zero when a
/// configuration yields a silent sweep.
const CEILING_FLOOR: f32 = 1e-6;

// ============================================================================
// Configuration
// ============================================================================

/// One registered actuator: a motor slot in a device group, bound to a world
/// position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actuator {
    /// Device group this actuator belongs to
    pub group: DeviceGroup,
    /// Motor slot index within the group; clamped to the group's motor count
    /// at emit time
    pub index: u8,
    /// World position; `None` falls back to the bell center
    pub position: Option<Vec3>,
    /// Local gain multiplier
    pub gain: f32,
    /// Hand classification: selects the contact-transmission path while the
    /// contact flag is raised
    pub is_hand: bool,
}

impl Actuator {
    /// Body actuator at a world position with unit gain.
    #[inline]
    #[must_use]
    pub const fn new(group: DeviceGroup, index: u8, position: Vec3) -> Self {
        Self { group, index, position: Some(position), gain: 1.0, is_hand: false }
    }

    /// Hand actuator at a world position with unit gain.
    #[inline]
    #[must_use]
    pub const fn hand(group: DeviceGroup, index: u8, position: Vec3) -> Self {
        Self { group, index, position: Some(position), gain: 1.0, is_hand: true }
    }
}

/// Packet delivery mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Advance by the elapsed tick duration, splitting long ticks into
    /// chunks no longer than `max_chunk_ms`, one packet per chunk, each
    /// sampled at its temporal midpoint.
    FrameDriven {
        /// Maximum chunk duration in milliseconds
        max_chunk_ms: u32,
    },
    /// Accumulate elapsed time and emit exactly one packet per consumed
    /// fixed step.
    FixedStep,
}

impl Default for DeliveryMode {
    fn default() -> Self {
        Self::FrameDriven { max_chunk_ms: 150 }
    }
}

/// Mapping from hit-sensor strength to session gain.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitGainParams {
    /// When false, every hit uses `fixed_gain` and the strength is ignored
    pub use_strength: bool,
    /// Gain used when strength mapping is disabled
    pub fixed_gain: f32,
    /// Sensor strength mapping to gain 0
    pub threshold: u32,
    /// Sensor strength mapping to gain 1; guarded below by `threshold + 1`
    pub max_strength: u32,
    /// Post-mapping scale
    pub scale: f32,
    /// Lower bound applied before scaling
    pub min_gain: f32,
}

impl Default for HitGainParams {
    fn default() -> Self {
        Self {
            use_strength: false,
            fixed_gain: 1.0,
            threshold: 30,
            max_strength: 700,
            scale: 1.0,
            min_gain: 0.2,
        }
    }
}

/// Start playback automatically after a delay instead of waiting for a hit.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoPlayParams {
    /// Delay before the session starts, in seconds
    pub delay_s: f32,
    /// When set, start through the normal hit path with this strength;
    /// otherwise start with `fixed_gain`
    pub virtual_strength: Option<u32>,
    /// Session gain for the non-virtual-hit start
    pub fixed_gain: f32,
}

/// Full scheduler configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Registered actuators; must be non-empty
    pub actuators: heapless::Vec<Actuator, MAX_ACTUATORS>,
    /// Motor slots per device group, in [`DeviceGroup::ALL`] order
    pub motor_counts: [u8; DeviceGroup::COUNT],
    /// Fixed-step size in seconds; 0 falls back to the field's table
    /// interval (floored at 0.1 s)
    pub interval_s: f32,
    /// Total playable duration per session in seconds; 0 falls back to the
    /// field's precompute horizon
    pub play_length_s: f32,
    /// Whether a hit during playback resets the time cursor
    pub restart_on_new_hit: bool,
    /// Global gain multiplier
    pub gain: f32,
    /// Level ceiling applied after floor shaping
    pub level_cap: f32,
    /// Levels below this are forced to zero
    pub silence_below: f32,
    /// Floor subtracted from every level before the silence/cap stage
    pub subtract_floor: f32,
    /// Rescale the post-subtraction remainder back to [0, 1] instead of
    /// clamping at zero
    pub renormalize_after_cut: bool,
    /// Whether airborne sampling applies source directivity
    pub use_directivity: bool,
    /// Extra multiplier for hand actuators sampling the airborne path
    pub hand_air_gain: f32,
    /// Configured strike point; `None` falls back to the bell center
    pub impact_point: Option<Vec3>,
    /// Packet delivery mode
    pub delivery: DeliveryMode,
    /// Minimum packet duration the hardware will honor, in milliseconds
    pub min_packet_ms: u32,
    /// Hit-strength gain mapping
    pub hit_gain: HitGainParams,
    /// Auto-play configuration; `None` waits for the first hit
    pub auto_play: Option<AutoPlayParams>,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            actuators: heapless::Vec::new(),
            motor_counts: [40, 6, 6],
            interval_s: 0.0,
            play_length_s: 0.0,
            restart_on_new_hit: true,
            gain: 1.0,
            level_cap: 0.8,
            silence_below: 0.0,
            subtract_floor: 0.1,
            renormalize_after_cut: false,
            use_directivity: true,
            hand_air_gain: 1.0,
            impact_point: None,
            delivery: DeliveryMode::default(),
            min_packet_ms: 100,
            hit_gain: HitGainParams::default(),
            auto_play: None,
        }
    }
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        0.0
    } else {
        ((v - a) / (b - a)).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Real-time renderer of the acoustic field onto a wearable actuator array.
#[derive(Debug)]
pub struct HapticScheduler {
    field: AcousticField,
    params: SchedulerParams,
    /// Fixed-step size after zero-value fallback resolution
    step_dt: f32,
    /// Session length after zero-value fallback resolution
    total_playable: f32,
    t_cursor: f32,
    accum: f32,
    remaining: f32,
    playing: bool,
    hit_gain: f32,
    /// Auto-play countdown; decremented each tick, fires at zero
    pending_start: Option<f32>,
    /// Normalization ceiling for body actuators (standard-listener sweep)
    ref_max_body: f32,
    /// Normalization ceiling for hand actuators (impact-point sweep)
    ref_max_hand: f32,
    /// Per-group intensity buffers, rebuilt every frame
    buffers: [[u8; MAX_MOTORS]; DeviceGroup::COUNT],
    /// Groups with at least one registered actuator
    group_active: [bool; DeviceGroup::COUNT],
}

impl HapticScheduler {
    /// Build a scheduler around a field model.
    ///
    /// Resolves the zero-value fallbacks (`interval_s`, `play_length_s`),
    /// samples the reference ceilings, and arms the auto-play timer.
    ///
    /// # Errors
    ///
    /// Returns [`BellwaveError::NoActuators`] for an empty actuator list.
    pub fn new(field: AcousticField, params: SchedulerParams) -> Result<Self, BellwaveError> {
        if params.actuators.is_empty() {
            return Err(BellwaveError::NoActuators);
        }

        let field_interval = field.params().table.interval_s;
        let field_horizon = field.params().table.horizon_s;
        let step_dt = if params.interval_s > 0.0 {
            params.interval_s
        } else {
            field_interval.max(0.1)
        };
        let total_playable = if params.play_length_s > 0.0 {
            params.play_length_s
        } else {
            field_horizon.max(0.1)
        };

        let mut group_active = [false; DeviceGroup::COUNT];
        for act in &params.actuators {
            group_active[act.group.index()] = true;
        }

        let pending_start = params.auto_play.map(|ap| ap.delay_s.max(0.0));

        let mut scheduler = Self {
            field,
            params,
            step_dt,
            total_playable,
            t_cursor: 0.0,
            accum: 0.0,
            remaining: 0.0,
            playing: false,
            hit_gain: 1.0,
            pending_start,
            ref_max_body: 1.0,
            ref_max_hand: 1.0,
            buffers: [[0; MAX_MOTORS]; DeviceGroup::COUNT],
            group_active,
        };
        scheduler.resample_ceilings();
        Ok(scheduler)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Whether a session is currently playing.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current session time cursor in seconds.
    #[inline]
    #[must_use]
    pub fn time_cursor(&self) -> f32 {
        self.t_cursor
    }

    /// Current hit-derived session gain.
    #[inline]
    #[must_use]
    pub fn hit_gain(&self) -> f32 {
        self.hit_gain
    }

    /// The (body, hand) normalization ceilings.
    #[inline]
    #[must_use]
    pub fn reference_ceilings(&self) -> (f32, f32) {
        (self.ref_max_body, self.ref_max_hand)
    }

    /// Shared access to the owned field model.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &AcousticField {
        &self.field
    }

    /// Mutable access to the owned field model. Ceilings are resampled at
    /// the next session start, so parameter edits take full effect on the
    /// next hit.
    #[inline]
    pub fn field_mut(&mut self) -> &mut AcousticField {
        &mut self.field
    }

    /// Configured strike point, falling back to the bell center.
    #[inline]
    #[must_use]
    pub fn strike_point(&self) -> Vec3 {
        self.params.impact_point.unwrap_or_else(|| self.field.center())
    }

    // ------------------------------------------------------------------
    // Session control
    // ------------------------------------------------------------------

    /// Start (or restart) a session from a hit of the given sensor strength.
    ///
    /// Recomputes the session gain, resamples the reference ceilings, and
    /// resets the timeline. When `restart_on_new_hit` is false and a session
    /// is already playing, the time cursor is kept and only the remaining
    /// duration refills; an idle scheduler restarts from zero regardless.
    pub fn trigger(&mut self, strength: u32) {
        let hg = self.params.hit_gain;
        self.hit_gain = if hg.use_strength {
            let upper = hg.max_strength.max(hg.threshold + 1);
            let t = inverse_lerp(hg.threshold as f32, upper as f32, strength as f32);
            t.max(hg.min_gain) * hg.scale
        } else {
            hg.fixed_gain
        };

        self.resample_ceilings();

        if self.params.restart_on_new_hit || !self.playing {
            self.t_cursor = 0.0;
            self.accum = 0.0;
        }
        self.remaining = self.total_playable;
        self.playing = true;
    }

    /// Stop playback and silence every device group.
    ///
    /// Also disarms a pending auto-play start; teardown leaves no timer
    /// that could emit packets afterwards.
    pub fn stop(&mut self, sink: &mut impl DeviceSink) {
        self.playing = false;
        self.pending_start = None;
        self.remaining = 0.0;
        sink.stop_all();
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the scheduler by one render tick of `dt_s` seconds.
    ///
    /// Drains pending hits, advances the auto-play countdown, then runs the
    /// configured delivery loop. All field evaluation and packet emission
    /// happen here, on the caller's thread.
    pub fn tick(
        &mut self,
        dt_s: f32,
        hits: &mut impl HitSource,
        contact: ContactSnapshot,
        sink: &mut impl DeviceSink,
    ) {
        if self.advance_auto_play(dt_s, contact, sink) {
            return;
        }

        while let Some(hit) = hits.try_next() {
            self.trigger(hit.strength);
        }

        if !self.playing {
            return;
        }

        match self.params.delivery {
            DeliveryMode::FrameDriven { max_chunk_ms } => {
                self.tick_frame_driven(dt_s, max_chunk_ms, contact, sink);
            }
            DeliveryMode::FixedStep => self.tick_fixed_step(dt_s, contact, sink),
        }
    }

    /// Count down the auto-play timer. Returns true when the session started
    /// this tick (the delivery loop then resumes next tick, so the immediate
    /// packet keeps its t=0 sample).
    fn advance_auto_play(
        &mut self,
        dt_s: f32,
        contact: ContactSnapshot,
        sink: &mut impl DeviceSink,
    ) -> bool {
        let Some(left) = self.pending_start else {
            return false;
        };
        let left = left - dt_s;
        if left > 0.0 {
            self.pending_start = Some(left);
            return false;
        }
        self.pending_start = None;

        let Some(ap) = self.params.auto_play else {
            return false;
        };
        if let Some(strength) = ap.virtual_strength {
            self.trigger(strength);
        } else {
            self.hit_gain = ap.fixed_gain.max(0.0);
            self.resample_ceilings();
            self.t_cursor = 0.0;
            self.accum = 0.0;
            self.remaining = self.total_playable;
            self.playing = true;

            // Frame-driven delivery waits for elapsed time before its first
            // packet; emit one immediately so the onset is not swallowed.
            if matches!(self.params.delivery, DeliveryMode::FrameDriven { .. }) {
                let duration = self.params.min_packet_ms.max(100);
                self.send_frame(0.0, duration, contact, sink);
            }
        }
        true
    }

    fn tick_frame_driven(
        &mut self,
        dt_s: f32,
        max_chunk_ms: u32,
        contact: ContactSnapshot,
        sink: &mut impl DeviceSink,
    ) {
        self.t_cursor += dt_s;
        self.remaining -= dt_s;
        if self.remaining <= 0.0 {
            self.playing = false;
            sink.stop_all();
            return;
        }

        let max_chunk_s = self.params.min_packet_ms.max(max_chunk_ms) as f32 / 1000.0;
        let mut dt_left = dt_s;
        while dt_left > 0.0 {
            let chunk_s = dt_left.min(max_chunk_s);
            let duration_ms = self
                .params
                .min_packet_ms
                .max(libm::roundf(chunk_s * 1000.0) as u32);
            // Sample each chunk at its temporal midpoint.
            let sample_t = self.t_cursor - dt_left + chunk_s * 0.5;
            self.send_frame(sample_t, duration_ms, contact, sink);
            dt_left -= chunk_s;
        }
    }

    fn tick_fixed_step(
        &mut self,
        dt_s: f32,
        contact: ContactSnapshot,
        sink: &mut impl DeviceSink,
    ) {
        self.accum += dt_s;
        while self.accum >= self.step_dt && self.playing {
            self.accum -= self.step_dt;
            self.t_cursor += self.step_dt;
            self.remaining -= self.step_dt;
            if self.remaining <= 0.0 {
                self.playing = false;
                sink.stop_all();
                return;
            }
            let duration_ms = self
                .params
                .min_packet_ms
                .max(libm::roundf(self.step_dt * 1000.0) as u32);
            self.send_frame(self.t_cursor, duration_ms, contact, sink);
        }
    }

    // ------------------------------------------------------------------
    // Frame emission
    // ------------------------------------------------------------------

    /// Compute every actuator's intensity at sample time `t` and flush one
    /// packet per active device group.
    fn send_frame(
        &mut self,
        t: f32,
        duration_ms: u32,
        contact: ContactSnapshot,
        sink: &mut impl DeviceSink,
    ) {
        self.buffers = [[0; MAX_MOTORS]; DeviceGroup::COUNT];

        let impact = contact
            .impact_point
            .or(self.params.impact_point)
            .unwrap_or_else(|| self.field.center());
        let bell_center = self.field.center();

        for a in 0..self.params.actuators.len() {
            let act = self.params.actuators[a];
            let motor_count = self.params.motor_counts[act.group.index()] as usize;
            if motor_count == 0 {
                continue;
            }
            let idx = (act.index as usize).min(motor_count - 1).min(MAX_MOTORS - 1);
            let pos = act.position.unwrap_or(bell_center);

            let mut level = if act.is_hand && contact.is_contact {
                // Contact path: vibration conducted from the impact point
                // through the structure, no directivity.
                let base = self
                    .field
                    .render_level(impact, t, self.ref_max_hand, false);
                let conducted = self.field.structural_transmission(impact, pos);
                base * conducted * self.hit_gain * self.params.gain * act.gain
            } else {
                let ceiling = if act.is_hand {
                    self.ref_max_hand
                } else {
                    self.ref_max_body
                };
                let base = self.field.render_level(
                    pos,
                    t,
                    ceiling,
                    self.params.use_directivity,
                );
                let mut level = base * self.params.gain * act.gain * self.hit_gain;
                if act.is_hand {
                    level *= self.params.hand_air_gain;
                }
                level
            };

            // Shaping order: floor subtraction, then silence threshold and cap.
            if self.params.subtract_floor > 0.0 {
                if self.params.renormalize_after_cut {
                    let denom = (1.0 - self.params.subtract_floor).max(1e-6);
                    level = ((level - self.params.subtract_floor) / denom).clamp(0.0, 1.0);
                } else {
                    level = (level - self.params.subtract_floor).max(0.0);
                }
            }
            if level < self.params.silence_below {
                level = 0.0;
            }
            level = level.min(self.params.level_cap);

            let intensity = libm::roundf(level.clamp(0.0, 1.0) * 100.0) as u8;
            let slot = &mut self.buffers[act.group.index()][idx];
            *slot = (*slot).max(intensity);
        }

        for group in DeviceGroup::ALL {
            let g = group.index();
            let count = (self.params.motor_counts[g] as usize).min(MAX_MOTORS);
            if count == 0 || !self.group_active[g] {
                continue;
            }
            sink.play(group, &self.buffers[g][..count], duration_ms);
        }
    }

    // ------------------------------------------------------------------
    // Reference ceilings
    // ------------------------------------------------------------------

    /// Resample both normalization ceilings across the precompute horizon:
    /// the body ceiling at the standard listener with directivity on, the
    /// hand ceiling at the strike point with directivity off.
    fn resample_ceilings(&mut self) {
        self.field.precompute_if_needed();

        let standard = self.field.standard_listener();
        let strike = self.strike_point();
        let steps = self.field.steps();

        let mut max_body = 0.0f32;
        let mut max_hand = 0.0f32;
        for k in 0..steps {
            let t = self.field.step_time(k);
            max_body = max_body.max(self.field.amplitude_at(standard, t, true));
            max_hand = max_hand.max(self.field.amplitude_at(strike, t, false));
        }

        self.ref_max_body = max_body.max(CEILING_FLOOR);
        self.ref_max_hand = max_hand.max(CEILING_FLOOR);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldParams;
    use crate::hit::NoHits;

    type Packet = (DeviceGroup, heapless::Vec<u8, MAX_MOTORS>, u32);

    #[derive(Default)]
    struct TestSink {
        packets: heapless::Vec<Packet, 64>,
        stops: usize,
    }

    impl DeviceSink for TestSink {
        fn play(&mut self, group: DeviceGroup, intensities: &[u8], duration_ms: u32) {
            let mut buf = heapless::Vec::new();
            buf.extend_from_slice(intensities).unwrap();
            self.packets.push((group, buf, duration_ms)).unwrap();
        }

        fn stop_all(&mut self) {
            self.stops += 1;
        }
    }

    fn field() -> AcousticField {
        AcousticField::new(FieldParams::default()).unwrap()
    }

    fn vest_actuator(index: u8) -> Actuator {
        // Just outside the source circle, near the first source.
        Actuator::new(DeviceGroup::Vest, index, Vec3::new(1.2, 1.0, 1.2))
    }

    fn params_with(actuators: &[Actuator]) -> SchedulerParams {
        let mut params = SchedulerParams::default();
        for act in actuators {
            params.actuators.push(*act).unwrap();
        }
        params
    }

    #[test]
    fn test_rejects_empty_actuators() {
        let result = HapticScheduler::new(field(), SchedulerParams::default());
        assert!(matches!(result, Err(BellwaveError::NoActuators)));
    }

    #[test]
    fn test_frame_driven_chunking_splits_long_tick() {
        let params = params_with(&[vest_actuator(0)]);
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.trigger(500);
        scheduler.tick(0.37, &mut NoHits, ContactSnapshot::NONE, &mut sink);

        // 0.37 s with max_chunk 150 ms and min_packet 100 ms: 150 + 150 + 100.
        let durations: heapless::Vec<u32, 8> =
            sink.packets.iter().map(|p| p.2).collect();
        assert_eq!(&durations[..], &[150, 150, 100]);
        for &d in &durations {
            assert!(d >= 100 && d <= 150);
        }
    }

    #[test]
    fn test_fixed_step_accumulator() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.delivery = DeliveryMode::FixedStep;
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        // interval_s = 0 falls back to the field's 0.1 s table interval.
        scheduler.trigger(500);
        scheduler.tick(0.25, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert_eq!(sink.packets.len(), 2);

        scheduler.tick(0.05, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert_eq!(sink.packets.len(), 3);
        assert_eq!(sink.packets[2].2, 100);
    }

    #[test]
    fn test_quantization_stays_in_bounds() {
        let mut params = params_with(&[vest_actuator(0), vest_actuator(5)]);
        params.gain = 1000.0;
        params.subtract_floor = 0.0;
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.trigger(700);
        scheduler.tick(0.1, &mut NoHits, ContactSnapshot::NONE, &mut sink);

        let (_, intensities, _) = &sink.packets[0];
        // Oversized gain saturates at the level cap, never past 100.
        assert!(intensities.iter().all(|&v| v <= 100));
        assert_eq!(intensities[0], 80);
        assert_eq!(intensities[5], 80);
    }

    #[test]
    fn test_shared_slot_takes_max() {
        let strong = vest_actuator(3);
        let mut weak = vest_actuator(3);
        weak.gain = 0.4;

        let run = |acts: &[Actuator]| -> u8 {
            let mut scheduler = HapticScheduler::new(field(), params_with(acts)).unwrap();
            let mut sink = TestSink::default();
            scheduler.trigger(500);
            scheduler.tick(0.1, &mut NoHits, ContactSnapshot::NONE, &mut sink);
            sink.packets[0].1[3]
        };

        let alone_strong = run(&[strong]);
        let alone_weak = run(&[weak]);
        let together = run(&[strong, weak]);
        assert_eq!(together, alone_strong.max(alone_weak));
    }

    #[test]
    fn test_session_end_silences_same_tick() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.play_length_s = 0.2;
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.trigger(500);
        scheduler.tick(0.15, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert!(scheduler.is_playing());
        assert_eq!(sink.stops, 0);
        let packets_before_end = sink.packets.len();

        scheduler.tick(0.1, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert!(!scheduler.is_playing());
        assert_eq!(sink.stops, 1);
        assert_eq!(sink.packets.len(), packets_before_end);
    }

    #[test]
    fn test_restart_asymmetry() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.restart_on_new_hit = false;
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        // Idle scheduler restarts from zero regardless of the flag.
        scheduler.trigger(500);
        assert_eq!(scheduler.time_cursor(), 0.0);

        scheduler.tick(0.3, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        let cursor = scheduler.time_cursor();
        assert!(cursor > 0.0);

        // A hit mid-session keeps the cursor, only refilling the duration.
        scheduler.trigger(500);
        assert_eq!(scheduler.time_cursor(), cursor);
        assert!(scheduler.is_playing());
    }

    #[test]
    fn test_hit_gain_mapping_endpoints() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.hit_gain = HitGainParams {
            use_strength: true,
            fixed_gain: 1.0,
            threshold: 30,
            max_strength: 700,
            scale: 1.0,
            min_gain: 0.2,
        };
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();

        scheduler.trigger(30);
        assert!((scheduler.hit_gain() - 0.2).abs() < 1e-6);

        scheduler.trigger(700);
        assert!((scheduler.hit_gain() - 1.0).abs() < 1e-6);

        scheduler.trigger(2000);
        assert!((scheduler.hit_gain() - 1.0).abs() < 1e-6);

        scheduler.trigger(365);
        let mid = scheduler.hit_gain();
        assert!(mid > 0.2 && mid < 1.0);
    }

    #[test]
    fn test_degenerate_strength_range_guard() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.hit_gain.use_strength = true;
        params.hit_gain.threshold = 500;
        params.hit_gain.max_strength = 100; // below threshold: guard kicks in
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();

        scheduler.trigger(501);
        assert!((scheduler.hit_gain() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_auto_play_fires_after_delay() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.auto_play = Some(AutoPlayParams {
            delay_s: 0.5,
            virtual_strength: None,
            fixed_gain: 0.9,
        });
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.tick(0.3, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert!(!scheduler.is_playing());
        assert!(sink.packets.is_empty());

        scheduler.tick(0.3, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert!(scheduler.is_playing());
        assert!((scheduler.hit_gain() - 0.9).abs() < 1e-6);
        // Frame-driven start emits the onset packet immediately.
        assert_eq!(sink.packets.len(), 1);
        assert_eq!(sink.packets[0].2, 100);
    }

    #[test]
    fn test_contact_switches_hand_to_structural_path() {
        let strike = Vec3::new(1.1245, 1.0, 0.0);
        let hand = Actuator::hand(DeviceGroup::GloveLeft, 0, strike);
        let mut params = params_with(&[hand]);
        params.hand_air_gain = 0.0;
        params.subtract_floor = 0.0;
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.trigger(500);
        scheduler.tick(0.1, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        let airborne = sink.packets[0].1[0];
        assert_eq!(airborne, 0, "zero hand air gain silences the air path");

        scheduler.trigger(500);
        scheduler.tick(0.1, &mut NoHits, ContactSnapshot::touching(strike), &mut sink);
        let conducted = sink.packets[1].1[0];
        assert!(conducted > 0, "contact path must drive the hand actuator");
    }

    #[test]
    fn test_hits_drain_through_queue() {
        let params = params_with(&[vest_actuator(0)]);
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        let mut queue: heapless::spsc::Queue<crate::types::HitEvent, 8> =
            heapless::spsc::Queue::new();
        let (mut producer, mut consumer) = queue.split();
        producer.enqueue(crate::types::HitEvent::new(400)).unwrap();

        scheduler.tick(0.1, &mut consumer, ContactSnapshot::NONE, &mut sink);
        assert!(scheduler.is_playing());
        assert!(!sink.packets.is_empty());
    }

    #[test]
    fn test_stop_disarms_auto_play() {
        let mut params = params_with(&[vest_actuator(0)]);
        params.auto_play = Some(AutoPlayParams {
            delay_s: 1.0,
            virtual_strength: Some(300),
            fixed_gain: 1.0,
        });
        let mut scheduler = HapticScheduler::new(field(), params).unwrap();
        let mut sink = TestSink::default();

        scheduler.stop(&mut sink);
        assert_eq!(sink.stops, 1);

        // The disarmed timer never fires.
        scheduler.tick(2.0, &mut NoHits, ContactSnapshot::NONE, &mut sink);
        assert!(!scheduler.is_playing());
        assert!(sink.packets.is_empty());
    }

    #[test]
    fn test_ceilings_are_positive() {
        let params = params_with(&[vest_actuator(0)]);
        let scheduler = HapticScheduler::new(field(), params).unwrap();
        let (body, hand) = scheduler.reference_ceilings();
        assert!(body > 0.0);
        assert!(hand > 0.0);
    }
}
