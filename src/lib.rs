//! Shift Scheduling
//!
//! Builds a weekly roster of employees over three daily shifts. Each
//! generation runs two passes: a greedy pass that honours ranked
//! preferences (spilling over to later days when a day is full), and a
//! random backfill that tops up understaffed shifts. The result replaces the
//! stored assignments as a whole.
//!
//! The allocation core ([`preferences`], [`allocator`]) is synchronous and
//! storage-agnostic; [`service`] wires it to a [`store`], and [`api`] exposes
//! it over HTTP.

pub mod allocator;
pub mod api;
pub mod config;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod service;
pub mod store;
pub mod view;

pub use error::{Result, SchedulingError};
