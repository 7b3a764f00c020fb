//! GestIQ - hand gesture classification and action debouncing.
//!
//! Hand keypoints from an external detector are classified into a small set
//! of gestures; each new gesture fires its bound action once while held.

pub mod action;
pub mod config;
pub mod frame_timing;
pub mod gesture;
pub mod provider;
pub mod runner;
pub mod session;
pub mod sexp;
pub mod tracking;
