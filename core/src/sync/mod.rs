//! Playback synchronization
//!
//! This module provides:
//! - **Trigger guard**: trigger-window matching with duplicate suppression
//! - **Engine**: the polling loop driving pause → speak → resume
//!
//! # Lifecycle
//!
//! `Idle → Polling → Triggered → Resuming → Polling`, until `Stopped` on
//! explicit shutdown. Ticks without a match stay in `Polling`.

mod engine;
mod trigger;


pub use engine::{EngineHandle, EngineStats, EngineStatus, SyncEngine};
pub use trigger::TriggerGuard;
