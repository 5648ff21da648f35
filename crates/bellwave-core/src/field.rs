//! Acoustic field model for a struck bell
//!
//! The field is a sum of point sources on a horizontal circle around the
//! bell's center. Each source carries a precomputed temporal envelope (decay,
//! strike transient, beat modulation); evaluation at a listener position
//! combines the tabulated temporal value with analytic distance and
//! directivity attenuation. A separate structural-transmission estimate
//! models vibration conducted through solid contact rather than air.
//!
//! # Example
//!
//! ```rust
//! use bellwave_core::field::{AcousticField, FieldParams};
//! use bellwave_core::types::Vec3;
//!
//! let mut field = AcousticField::new(FieldParams::default()).unwrap();
//! let near = field.amplitude_at(field.standard_listener(), 0.0, true);
//! let far = field.amplitude_at(Vec3::new(10.0, 1.0, 0.0), 0.0, true);
//! assert!(near > far);
//! ```

use core::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::BellwaveError;
use crate::types::Vec3;

/// Maximum number of point sources on the bell rim.
pub const MAX_SOURCES: usize = 8;

/// Capacity of the flattened temporal envelope table (`sources * steps`).
pub const TABLE_CAPACITY: usize = 8192;

/// Smallest duration treated as non-degenerate, in seconds.
const EPS_TIME: f32 = 1e-4;

/// Floor for the directivity weight, so listeners behind a source are
/// attenuated but never fully silenced.
const DIRECTIVITY_FLOOR: f32 = 0.01;

const DEG_TO_RAD: f32 = PI / 180.0;

// ============================================================================
// Parameters
// ============================================================================

/// Bell geometry in world space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BellGeometry {
    /// World position of the bell's base
    pub base: Vec3,
    /// Height of the bell in meters; the acoustic center sits this far
    /// above the base
    pub height_m: f32,
    /// Radius of the source circle in meters
    pub radius_m: f32,
}

impl BellGeometry {
    /// Acoustic center of the bell (base offset upward by the height).
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.base.add(Vec3::UP.scale(self.height_m))
    }
}

impl Default for BellGeometry {
    fn default() -> Self {
        Self {
            base: Vec3::ZERO,
            height_m: 1.0,
            radius_m: 1.1245,
        }
    }
}

/// Three-term temporal decay envelope.
///
/// `E(t) = a e^{-λ1 t} + b e^{-λ2 t} + c e^{-t/τ_fast}` with `c = 1 - a - b`,
/// so `E(0) = 1`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayParams {
    /// First slow decay rate (s⁻¹)
    pub lambda1: f32,
    /// Second slow decay rate (s⁻¹)
    pub lambda2: f32,
    /// Weight of the first slow term (0..1)
    pub a: f32,
    /// Weight of the second slow term (0..1); the fast term gets `1 - a - b`
    pub b: f32,
    /// Time constant of the fast early-drop term (s)
    pub tau_fast_s: f32,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            lambda1: 0.000_13,
            lambda2: 0.000_30,
            a: 0.35,
            b: 0.35,
            tau_fast_s: 1.0,
        }
    }
}

/// Strike transient shaping: a large early boost and deeper beat contrast,
/// both fading out by `boost_end_s`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrikeTransient {
    /// Extra gain at t=0; the initial multiplier is `1 + early_boost`
    pub early_boost: f32,
    /// Time constant of the boost's own decay (s)
    pub tau_impact_s: f32,
    /// Time by which the boost and the early beat depth have fully faded (s)
    pub boost_end_s: f32,
    /// Beat modulation depth during the early window
    pub beat_depth_early: f32,
}

impl Default for StrikeTransient {
    fn default() -> Self {
        Self {
            early_boost: 1.0,
            tau_impact_s: 0.7,
            boost_end_s: 4.0,
            beat_depth_early: 0.55,
        }
    }
}

/// Beat modulation and source layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatParams {
    /// Beat period in seconds
    pub period_s: f32,
    /// Steady-state amplitude modulation depth (0..1 recommended)
    pub depth: f32,
    /// Source angles on the rim circle, in degrees; the list length is the
    /// source count
    pub source_angles_deg: heapless::Vec<f32, MAX_SOURCES>,
    /// Per-source beat phase offsets in degrees, matched index-wise with the
    /// angle list; missing entries read as zero
    pub phase_offsets_deg: heapless::Vec<f32, MAX_SOURCES>,
}

impl Default for BeatParams {
    fn default() -> Self {
        let mut angles = heapless::Vec::new();
        let mut phases = heapless::Vec::new();
        for (angle, phase) in [(45.0, 0.0), (135.0, 90.0), (225.0, 180.0), (315.0, 270.0)] {
            let _ = angles.push(angle);
            let _ = phases.push(phase);
        }
        Self {
            period_s: 2.9,
            depth: 0.65,
            source_angles_deg: angles,
            phase_offsets_deg: phases,
        }
    }
}

/// Airborne and contact propagation parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationParams {
    /// Distance attenuation exponent (`r^-alpha`)
    pub alpha: f32,
    /// Minimum listener distance in meters (singularity clamp)
    pub min_distance_m: f32,
    /// Whether to apply exponential air absorption on top of `r^-alpha`
    pub use_air_absorption: bool,
    /// Air absorption coefficient (m⁻¹)
    pub air_alpha_per_meter: f32,
    /// Decay rate of the structural (contact) transmission path (m⁻¹)
    pub contact_decay_per_meter: f32,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            alpha: 1.2,
            min_distance_m: 0.5,
            use_air_absorption: false,
            air_alpha_per_meter: 0.0,
            contact_decay_per_meter: 2.0,
        }
    }
}

/// Precompute grid for the temporal envelope table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableParams {
    /// Precompute horizon in seconds
    pub horizon_s: f32,
    /// Sample interval in seconds
    pub interval_s: f32,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            horizon_s: 30.0,
            interval_s: 0.1,
        }
    }
}

/// Full acoustic field configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldParams {
    /// Bell geometry
    pub geometry: BellGeometry,
    /// Temporal decay envelope
    pub decay: DecayParams,
    /// Strike transient shaping
    pub transient: StrikeTransient,
    /// Beat modulation and source layout
    pub beat: BeatParams,
    /// Distance, directivity and contact propagation
    pub propagation: PropagationParams,
    /// Precompute grid
    pub table: TableParams,
    /// Ceiling applied when mapping a normalized amplitude to a render level
    pub level_cap: f32,
}

impl FieldParams {
    /// Number of configured sources.
    #[inline]
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.beat.source_angles_deg.len()
    }

    fn validate(&self) -> Result<usize, BellwaveError> {
        if self.beat.source_angles_deg.is_empty() {
            return Err(BellwaveError::NoSources);
        }
        if self.table.interval_s <= 0.0 {
            return Err(BellwaveError::InvalidInterval {
                interval_ms: (self.table.interval_s * 1000.0) as i32,
            });
        }
        let steps = table_steps(&self.table);
        let required = steps * self.source_count();
        if required > TABLE_CAPACITY {
            return Err(BellwaveError::TableCapacityExceeded {
                required,
                capacity: TABLE_CAPACITY,
            });
        }
        Ok(steps)
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            geometry: BellGeometry::default(),
            decay: DecayParams::default(),
            transient: StrikeTransient::default(),
            beat: BeatParams::default(),
            propagation: PropagationParams::default(),
            table: TableParams::default(),
            level_cap: 0.8,
        }
    }
}

#[inline]
fn table_steps(table: &TableParams) -> usize {
    let steps = libm::ceilf(table.horizon_s / table.interval_s.max(EPS_TIME));
    (steps as usize).max(1)
}

#[inline]
fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

#[inline]
fn smoothstep01(x: f32) -> f32 {
    let w = clamp01(x);
    w * w * (3.0 - 2.0 * w)
}

#[inline]
fn lerp(a: f32, b: f32, w: f32) -> f32 {
    a + (b - a) * w
}

// ============================================================================
// Acoustic Field
// ============================================================================

/// Precomputed, evaluable vibration field of a struck bell.
///
/// The temporal envelope table is immutable once built; it is invalidated and
/// rebuilt wholesale when parameters change, and rebuilt lazily on first use.
/// Evaluation never observes a partially built table: the rebuild fills a
/// staging buffer completely and swaps it in.
#[derive(Clone, Debug)]
pub struct AcousticField {
    params: FieldParams,
    /// Flattened `[source][step]` temporal samples, source-major.
    table: heapless::Vec<f32, TABLE_CAPACITY>,
    steps: usize,
    ready: bool,
}

impl AcousticField {
    /// Create a field model, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BellwaveError::NoSources`], [`BellwaveError::InvalidInterval`]
    /// or [`BellwaveError::TableCapacityExceeded`] for unusable parameters.
    pub fn new(params: FieldParams) -> Result<Self, BellwaveError> {
        params.validate()?;
        Ok(Self {
            params,
            table: heapless::Vec::new(),
            steps: 0,
            ready: false,
        })
    }

    /// Current parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Replace the configuration and invalidate the envelope table.
    ///
    /// # Errors
    ///
    /// Rejects unusable parameters without touching the current state.
    pub fn set_params(&mut self, params: FieldParams) -> Result<(), BellwaveError> {
        params.validate()?;
        self.params = params;
        self.invalidate();
        Ok(())
    }

    /// Mark the envelope table stale; the next evaluation rebuilds it.
    #[inline]
    pub fn invalidate(&mut self) {
        self.ready = false;
    }

    /// Whether the envelope table is built and non-empty.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready && !self.table.is_empty() && self.steps > 0
    }

    /// Number of temporal samples per source.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> usize {
        if self.ready {
            self.steps
        } else {
            table_steps(&self.params.table)
        }
    }

    /// Time of the `k`-th temporal sample, clamped to the table range.
    #[inline]
    #[must_use]
    pub fn step_time(&self, k: usize) -> f32 {
        let last = self.steps().saturating_sub(1);
        k.min(last) as f32 * self.params.table.interval_s
    }

    /// Acoustic center of the bell.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.params.geometry.center()
    }

    /// World position of source `s` on the rim circle.
    #[must_use]
    pub fn source_position(&self, s: usize) -> Vec3 {
        let angle_deg = self.params.beat.source_angles_deg.get(s).copied().unwrap_or(0.0);
        let rad = angle_deg * DEG_TO_RAD;
        let offset = Vec3::new(libm::cosf(rad), 0.0, libm::sinf(rad));
        self.center().add(offset.scale(self.params.geometry.radius_m))
    }

    /// Standard listener used for reference-ceiling sampling: just outside
    /// the source circle, in the direction of the first source.
    #[must_use]
    pub fn standard_listener(&self) -> Vec3 {
        let angle_deg = self
            .params
            .beat
            .source_angles_deg
            .first()
            .copied()
            .unwrap_or(0.0);
        let rad = angle_deg * DEG_TO_RAD;
        let outward = Vec3::new(libm::cosf(rad), 0.0, libm::sinf(rad));
        let reach = self.params.geometry.radius_m + self.params.propagation.min_distance_m;
        self.center().add(outward.scale(reach))
    }

    // ------------------------------------------------------------------
    // Precompute
    // ------------------------------------------------------------------

    /// Build the temporal envelope table if it is stale.
    ///
    /// Safe to call at any time; a fresh table replaces the old one in a
    /// single assignment so evaluation never sees a half-built table.
    pub fn precompute_if_needed(&mut self) {
        if self.is_ready() {
            return;
        }

        let steps = table_steps(&self.params.table);
        let sources = self.params.source_count();
        let f_beat = 1.0 / self.params.beat.period_s.max(EPS_TIME);
        let dt = self.params.table.interval_s;

        let mut staged: heapless::Vec<f32, TABLE_CAPACITY> = heapless::Vec::new();
        for s in 0..sources {
            let phase_rad = self
                .params
                .beat
                .phase_offsets_deg
                .get(s)
                .copied()
                .unwrap_or(0.0)
                * DEG_TO_RAD;
            for k in 0..steps {
                let t = k as f32 * dt;
                let envelope = self.decay_envelope(t) * self.strike_boost(t);
                let depth = self.beat_depth_at(t);
                let modulation = 1.0 + depth * libm::sinf(2.0 * PI * f_beat * t + phase_rad);
                // Capacity was validated at construction.
                let _ = staged.push(envelope * modulation);
            }
        }

        self.table = staged;
        self.steps = steps;
        self.ready = true;
    }

    /// Three-term decay envelope, normalized to 1 at t=0.
    #[must_use]
    fn decay_envelope(&self, t: f32) -> f32 {
        let d = &self.params.decay;
        let c = (1.0 - d.a - d.b).max(0.0);
        let slow1 = libm::expf(-d.lambda1 * t);
        let slow2 = libm::expf(-d.lambda2 * t);
        let fast = libm::expf(-t / d.tau_fast_s.max(EPS_TIME));
        d.a * slow1 + d.b * slow2 + c * fast
    }

    /// Early boost multiplier: `1 + early_boost * e^{-t/τ}` at t=0, fading
    /// smoothly to 1 by `boost_end_s`.
    #[must_use]
    fn strike_boost(&self, t: f32) -> f32 {
        let tr = &self.params.transient;
        let e = libm::expf(-t / tr.tau_impact_s.max(EPS_TIME));
        let target = 1.0 + tr.early_boost * e;
        let w = smoothstep01(t / tr.boost_end_s.max(EPS_TIME));
        lerp(target, 1.0, w)
    }

    /// Beat depth, fading from the early depth to the steady depth over the
    /// same boost-end window.
    #[must_use]
    fn beat_depth_at(&self, t: f32) -> f32 {
        let tr = &self.params.transient;
        let w = smoothstep01(t / tr.boost_end_s.max(EPS_TIME));
        lerp(tr.beat_depth_early, self.params.beat.depth, w)
    }

    /// Raw temporal sample for source `s` at step `k`, building the table
    /// first if needed. `None` when either index is out of range.
    #[must_use]
    pub fn temporal_sample(&mut self, s: usize, k: usize) -> Option<f32> {
        self.precompute_if_needed();
        if s >= self.params.source_count() || k >= self.steps {
            return None;
        }
        Some(self.table[s * self.steps + k])
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// Evaluate the airborne field amplitude at a listener position and time.
    ///
    /// Time is quantized to the precompute grid; queries beyond the horizon
    /// clamp to the last sample. The hot path: one call per actuator per
    /// render tick, allocation-free.
    #[must_use]
    pub fn amplitude_at(&mut self, listener: Vec3, t: f32, use_directivity: bool) -> f32 {
        self.precompute_if_needed();
        if !self.is_ready() {
            return 0.0;
        }

        let dt = self.params.table.interval_s.max(EPS_TIME);
        let k = (libm::floorf(t / dt) as i32).clamp(0, self.steps as i32 - 1) as usize;

        let center = self.center();
        let prop = self.params.propagation;
        let sources = self.params.source_count();
        let mut sum = 0.0f32;

        for s in 0..sources {
            let source_pos = self.source_position(s);
            let to_listener = listener.sub(source_pos);
            let r = to_listener.length().max(prop.min_distance_m);

            let mut g_r = libm::powf(1.0 / r, prop.alpha);
            if prop.use_air_absorption && prop.air_alpha_per_meter > 0.0 {
                g_r *= libm::expf(-prop.air_alpha_per_meter * r);
            }

            let w_dir = if use_directivity {
                let outward = source_pos.sub(center).normalized();
                let toward = to_listener.normalized();
                let w = 0.5 * (outward.dot(toward) + 1.0);
                w.max(DIRECTIVITY_FLOOR)
            } else {
                1.0
            };

            sum += self.table[s * self.steps + k] * g_r * w_dir;
        }

        sum.max(0.0)
    }

    /// Attenuation of vibration conducted through solid contact from the
    /// impact point to a target position.
    ///
    /// Exponential over the contact-path distance: 1 at zero distance,
    /// strictly decreasing, bounded in (0, 1]. Independent of the airborne
    /// directivity and air-absorption terms.
    #[inline]
    #[must_use]
    pub fn structural_transmission(&self, impact: Vec3, target: Vec3) -> f32 {
        let k = self.params.propagation.contact_decay_per_meter.max(0.0);
        libm::expf(-k * impact.distance(target))
    }

    // ------------------------------------------------------------------
    // Normalization & Mapping
    // ------------------------------------------------------------------

    /// Normalize a raw amplitude against a reference ceiling into [0, 1].
    ///
    /// A non-positive ceiling yields 0 (degenerate reference, recovered
    /// locally).
    #[inline]
    #[must_use]
    pub fn normalize(amp: f32, ref_max: f32) -> f32 {
        if ref_max > 0.0 {
            clamp01(amp / ref_max)
        } else {
            0.0
        }
    }

    /// Map a normalized amplitude to a bounded render level, applying the
    /// configured ceiling before the final clamp.
    #[inline]
    #[must_use]
    pub fn map_to_render_level(&self, norm: f32) -> f32 {
        norm.min(self.params.level_cap).clamp(0.0, 1.0)
    }

    /// Composed helper: amplitude → normalized → capped render level in [0, 1].
    #[must_use]
    pub fn render_level(
        &mut self,
        listener: Vec3,
        t: f32,
        ref_max: f32,
        use_directivity: bool,
    ) -> f32 {
        let amp = self.amplitude_at(listener, t, use_directivity);
        let norm = Self::normalize(amp, ref_max);
        clamp01(self.map_to_render_level(norm))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn single_source_params() -> FieldParams {
        let mut params = FieldParams::default();
        params.beat.source_angles_deg.clear();
        params.beat.phase_offsets_deg.clear();
        params.beat.source_angles_deg.push(0.0).unwrap();
        params.beat.phase_offsets_deg.push(0.0).unwrap();
        params
    }

    #[test]
    fn test_rejects_empty_sources() {
        let mut params = FieldParams::default();
        params.beat.source_angles_deg.clear();
        assert!(matches!(
            AcousticField::new(params),
            Err(BellwaveError::NoSources)
        ));
    }

    #[test]
    fn test_rejects_oversized_table() {
        let mut params = FieldParams::default();
        params.table.interval_s = 0.001; // 30_000 steps * 4 sources
        assert!(matches!(
            AcousticField::new(params),
            Err(BellwaveError::TableCapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_envelope_normalized_at_zero() {
        let mut field = AcousticField::new(single_source_params()).unwrap();
        field.precompute_if_needed();

        // Zero phase: temporal[0] = E(0) * (1 + early_boost) * (1 + depth*sin(0))
        let expected = 1.0 * (1.0 + field.params().transient.early_boost);
        assert!((field.table[0] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_lazy_rebuild_after_invalidation() {
        let mut field = AcousticField::new(FieldParams::default()).unwrap();
        assert!(!field.is_ready());

        let _ = field.amplitude_at(Vec3::new(2.0, 1.0, 0.0), 0.0, true);
        assert!(field.is_ready());

        field.invalidate();
        assert!(!field.is_ready());
        let amp = field.amplitude_at(Vec3::new(2.0, 1.0, 0.0), 0.0, true);
        assert!(field.is_ready());
        assert!(amp > 0.0);
    }

    #[test]
    fn test_amplitude_monotone_in_distance() {
        let mut field = AcousticField::new(single_source_params()).unwrap();

        // Walk outward from the single source along its radial direction:
        // directivity is constant 1 there, so only r^-alpha varies.
        let source = field.source_position(0);
        let outward = source.sub(field.center()).normalized();

        let mut prev = f32::INFINITY;
        for i in 1..10 {
            let listener = source.add(outward.scale(i as f32 * 0.75));
            let amp = field.amplitude_at(listener, 0.0, true);
            assert!(amp <= prev + 1e-6, "amplitude increased with distance");
            prev = amp;
        }
    }

    #[test]
    fn test_horizon_clamps_to_last_sample() {
        let mut field = AcousticField::new(FieldParams::default()).unwrap();
        let listener = field.standard_listener();

        let horizon = field.params().table.horizon_s;
        let at_end = field.amplitude_at(listener, horizon - 0.05, true);
        let beyond = field.amplitude_at(listener, horizon * 100.0, true);
        assert!((at_end - beyond).abs() < 1e-6);
    }

    #[test]
    fn test_structural_transmission_bounds() {
        let field = AcousticField::new(FieldParams::default()).unwrap();
        let impact = Vec3::new(1.0, 1.0, 0.0);

        assert!((field.structural_transmission(impact, impact) - 1.0).abs() < 1e-6);

        let mut prev = 1.0;
        for i in 1..8 {
            let target = Vec3::new(1.0 + i as f32 * 0.3, 1.0, 0.0);
            let w = field.structural_transmission(impact, target);
            assert!(w > 0.0 && w <= 1.0);
            assert!(w < prev, "transmission must strictly decrease");
            prev = w;
        }
    }

    #[test]
    fn test_normalize_and_map_bounds() {
        let field = AcousticField::new(FieldParams::default()).unwrap();
        let cap = field.params().level_cap;

        for amp in [0.0, 0.1, 1.0, 7.5, 1e6] {
            let level = field.map_to_render_level(AcousticField::normalize(amp, 2.0));
            assert!((0.0..=cap).contains(&level));
        }
        assert_eq!(AcousticField::normalize(1.0, 0.0), 0.0);
        assert_eq!(AcousticField::normalize(1.0, -3.0), 0.0);
    }

    #[test]
    fn test_four_source_sum_at_strike() {
        // End-to-end identity: with the default four sources, the amplitude at
        // the standard listener at t=0 equals the analytic sum of per-source
        // contributions.
        let mut field = AcousticField::new(FieldParams::default()).unwrap();
        let listener = field.standard_listener();
        let got = field.amplitude_at(listener, 0.0, true);

        let p = field.params().clone();
        let center = p.geometry.center();
        let boost = 1.0 + p.transient.early_boost;
        let mut expected = 0.0f32;
        for s in 0..p.source_count() {
            let angle = p.beat.source_angles_deg[s] * DEG_TO_RAD;
            let phase = p.beat.phase_offsets_deg[s] * DEG_TO_RAD;
            let source = center.add(Vec3::new(libm::cosf(angle), 0.0, libm::sinf(angle))
                .scale(p.geometry.radius_m));

            let to_listener = listener.sub(source);
            let r = to_listener.length().max(p.propagation.min_distance_m);
            let g_r = libm::powf(1.0 / r, p.propagation.alpha);

            let outward = source.sub(center).normalized();
            let w_dir = (0.5 * (outward.dot(to_listener.normalized()) + 1.0)).max(0.01);

            let temporal = boost * (1.0 + p.transient.beat_depth_early * libm::sinf(phase));
            expected += temporal * g_r * w_dir;
        }

        assert!((got - expected).abs() < 1e-4 * expected.max(1.0));
    }

    #[test]
    fn test_directivity_disabled_is_wider() {
        let mut field = AcousticField::new(single_source_params()).unwrap();

        // Listener behind the source (toward the bell center).
        let source = field.source_position(0);
        let inward = field.center().sub(source).normalized();
        let behind = source.add(inward.scale(1.5));

        let with_dir = field.amplitude_at(behind, 0.0, true);
        let without = field.amplitude_at(behind, 0.0, false);
        assert!(with_dir < without);
        assert!(with_dir > 0.0, "directivity floor must keep a residual");
    }
}
