//! Bellwave core - `no_std` compatible haptic bell renderer
//!
//! This crate models the vibration field of a struck bell and schedules that
//! field onto a wearable actuator array in real time. It is designed to work
//! in `no_std` environments (embedded haptic controllers) as well as `std`
//! environments (desktop hosts, simulators).
//!
//! # Modules
//!
//! - [`types`]: Core value types (vectors, device groups, hit/contact events)
//! - [`error`]: Construction-time configuration errors
//! - [`field`]: Acoustic field model (decay envelopes, beats, attenuation)
//! - [`scheduler`]: Haptic output scheduler (session timeline, packet emission)
//! - [`hit`]: Hit-source capability interface and queue hand-off
//! - [`sink`]: Device output sink trait and reference sinks
//!
//! # Features
//!
//! - `std`: Enable standard library support (adds [`sink::MemorySink`])
//! - `defmt`: Enable `defmt` formatting for embedded logging
//!
//! # Example
//!
//! ```rust
//! use bellwave_core::field::{AcousticField, FieldParams};
//! use bellwave_core::types::Vec3;
//!
//! let mut field = AcousticField::new(FieldParams::default()).unwrap();
//! let listener = Vec3::new(2.0, 1.0, 0.0);
//! let amp = field.amplitude_at(listener, 0.0, true);
//! assert!(amp > 0.0);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod field;
pub mod hit;
pub mod scheduler;
pub mod sink;
pub mod types;

// Re-export commonly used types at crate root
pub use error::BellwaveError;
pub use field::{AcousticField, FieldParams};
pub use hit::{HitSource, NoHits};
pub use scheduler::{Actuator, DeliveryMode, HapticScheduler, SchedulerParams};
pub use sink::{DeviceSink, NullSink};
pub use types::{ContactSnapshot, DeviceGroup, HitEvent, Vec3};
