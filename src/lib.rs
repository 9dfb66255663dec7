//! Terra Escape: a portrait top-down arcade shooter.
//!
//! The library is the simulation core: entity state, the fixed-order frame
//! update, the boss state machine and the background-music scheduler.  The
//! stage content, drawing surface and audio device are traits
//! ([`stage::Stage`], [`render::Painter`], [`music::AudioSink`]) so the core
//! runs headless in tests.

pub mod boss;
pub mod clock;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod movement;
pub mod music;
pub mod render;
pub mod spawner;
pub mod stage;
#[cfg(feature = "audio")]
pub mod synth;
pub mod weapons;
