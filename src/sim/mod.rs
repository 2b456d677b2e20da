//! Ball simulation module
//!
//! All physics lives here. This module must stay pure:
//! - No clocks (time comes from sample timestamps)
//! - No rendering or platform dependencies
//! - Integrate, then reflect; the session commits the result

pub mod integrate;
pub mod reflect;
pub mod state;

pub use integrate::{Candidate, Integration, TimeAnomaly, integrate};
pub use reflect::{Edge, EdgeHits, Reflection, reflect, reflect_axis};
pub use state::{AccelerationSample, DominantAxis, SimulationState, Viewport};
