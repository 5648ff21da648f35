//! Core value types for the bellwave renderer
//!
//! This module defines the fundamental types shared by the field model and
//! the output scheduler:
//! - World-space vectors
//! - Device group identification
//! - Hit and contact collaborator events

use serde::{Deserialize, Serialize};

// ============================================================================
// Vec3
// ============================================================================

/// 3D vector in world coordinates (meters).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters (up)
    pub y: f32,
    /// Z coordinate in meters
    pub z: f32,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// World up axis.
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    /// Create a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise addition.
    #[inline]
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise subtraction (`self - other`).
    #[inline]
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Uniform scaling.
    #[inline]
    #[must_use]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction, or zero for degenerate input.
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 1e-9 {
            self.scale(1.0 / len)
        } else {
            Self::ZERO
        }
    }
}

// ============================================================================
// Device Groups
// ============================================================================

/// A named set of actuator slots sharing one intensity buffer and one
/// output packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceGroup {
    /// Body-worn vest array
    Vest,
    /// Left-hand glove array
    GloveLeft,
    /// Right-hand glove array
    GloveRight,
}

impl DeviceGroup {
    /// Number of device groups.
    pub const COUNT: usize = 3;

    /// All groups in buffer order.
    pub const ALL: [Self; Self::COUNT] = [Self::Vest, Self::GloveLeft, Self::GloveRight];

    /// Stable buffer index for this group.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Vest => 0,
            Self::GloveLeft => 1,
            Self::GloveRight => 2,
        }
    }

    /// Human-readable group name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vest => "vest",
            Self::GloveLeft => "glove-left",
            Self::GloveRight => "glove-right",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceGroup {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.name());
    }
}

// ============================================================================
// Collaborator Events
// ============================================================================

/// A discrete strike event from the hit-sensor collaborator.
///
/// The strength is used only for gain mapping, never for timeline shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Raw sensor strength (non-negative)
    pub strength: u32,
}

impl HitEvent {
    /// Create a new hit event.
    #[inline]
    #[must_use]
    pub const fn new(strength: u32) -> Self {
        Self { strength }
    }
}

/// Per-tick view of the contact/position collaborator.
///
/// Read synchronously each render tick; staleness is the source's concern.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    /// Whether a hand is currently in physical contact with the bell
    pub is_contact: bool,
    /// World position of the impact point, if the source reports one.
    /// `None` falls back to the scheduler's configured strike point.
    pub impact_point: Option<Vec3>,
}

impl ContactSnapshot {
    /// Snapshot with no contact and no reported impact point.
    pub const NONE: Self = Self { is_contact: false, impact_point: None };

    /// Snapshot for a hand in contact at the given impact point.
    #[inline]
    #[must_use]
    pub const fn touching(impact_point: Vec3) -> Self {
        Self { is_contact: true, impact_point: Some(impact_point) }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_distance() {
        let p1 = Vec3::new(0.0, 0.0, 0.0);
        let p2 = Vec3::new(3.0, 4.0, 0.0);
        assert!((p1.distance(p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_normalized_degenerate() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let v = Vec3::new(0.0, 2.0, 0.0).normalized();
        assert!((v.y - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_device_group_indices_unique() {
        for (i, group) in DeviceGroup::ALL.iter().enumerate() {
            assert_eq!(group.index(), i);
        }
    }
}
