//! `vague` - Guided triangle breathing engine
//!
//! This library provides the breathing-cycle engine (phase state machine,
//! triangle geometry, milestone markers, session time accounting) and the
//! session, scheduling and terminal layers built on top of it.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod localization;
pub mod observability;
pub mod pattern;
pub mod phase;
pub mod presenter;
pub mod session;
pub mod time;
pub mod timer;
