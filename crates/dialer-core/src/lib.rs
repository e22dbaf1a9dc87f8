//! Hardware-independent core library for the rotary dialer
//!
//! This crate contains all platform-agnostic logic for the passcode dialer:
//! the rotary dial widget and its gesture tracking, the passcode indicator,
//! the passcode page, animations, and display management.
//!
//! It is `no_std` with `extern crate alloc` so it compiles on embedded
//! targets as well as desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod display_manager;
pub mod framebuffer;
pub mod pages;
pub mod ui;
