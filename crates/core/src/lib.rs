//! Core mood detection library: face-mesh landmark extraction, facial
//! feature normalization, mood classification, and the timer-driven
//! detection session that turns mood changes into track fetches.

pub mod classification;
pub mod detection;
pub mod session;
pub mod shared;
