//! Pixtone - Play pictures as sound
//!
//! Turns pixels into pitches. Moving the pointer over a picture glides a
//! tone toward the pitch of the pixel underneath: either its brightness or
//! its position on a musical scale. Short random sequences preview a picture
//! when it loads, when the mode changes and when the settings are shuffled.

pub mod config;
pub mod effects;
pub mod engine;
pub mod mapping;
pub mod render;
pub mod sequence;
pub mod session;
pub mod surface;
pub mod synth;
pub mod viz;

pub use config::PixtoneConfig;
pub use engine::Engine;
pub use session::Session;
