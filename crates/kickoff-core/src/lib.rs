//! Attendance, moderation, and reporting for the Kickoff coordinator.
//!
//! A recurring capacity-limited event fills a fixed number of seats on a
//! first-come-first-served basis; overflow waits in a FIFO queue and is
//! promoted as seats free up. Admins ban and unban participants, mark
//! no-shows, close voting, and publish the event.
//!
//! # Modules
//!
//! - [`attendance`] -- Vote handling: window and ban checks, promotion.
//! - [`moderation`] -- Admin operations behind the [`moderation::Admin`] proof.
//! - [`report`] -- Read-only report, member directory, text rendering.
//! - [`service`] -- [`CoordinatorService`]: the serialized command API.
//! - [`notify`] -- Notification outbox, sink trait, retrying dispatcher.
//! - [`window`] -- Voting window (cutoff before kick-off, manual close).
//! - [`capability`] -- Admin capability check.
//! - [`clock`] -- Time sources.
//! - [`config`] -- Configuration loading from `kickoff-config.yaml`.
//! - [`error`] -- [`CommandError`].
//!
//! [`CoordinatorService`]: service::CoordinatorService
//! [`CommandError`]: error::CommandError

pub mod attendance;
pub mod capability;
pub mod clock;
pub mod config;
pub mod error;
pub mod moderation;
pub mod notify;
pub mod report;
pub mod service;
pub mod window;

pub use error::CommandError;
pub use service::CoordinatorService;
