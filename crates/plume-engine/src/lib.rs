//! Engine for target-seeking social automation runs.
//!
//! The pipeline: discover candidates for a search criteria, filter out
//! anything already acted on (persistent cache first, live check second),
//! perform the action with fixed or generated text, and keep discovering
//! until the success target is met or the source is exhausted.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod generator;
pub mod login;
pub mod runner;
pub mod selectors;
pub mod session;
pub mod suppress;
pub mod web;

pub use cache::ActionCache;
pub use runner::{CancelFlag, Runner, RunnerOptions, TextSource};
pub use session::SessionStore;
