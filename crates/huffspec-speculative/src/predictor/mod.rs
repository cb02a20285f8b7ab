//! Length predictors.
//!
//! All variants implement [`huffspec_core::LengthPredictor`]; the scheduler
//! never knows which one it drives.
//!
//! | Predictor | Ranks by | History |
//! |-----------|----------|---------|
//! | [`ContextFreePredictor`] | global length mass | none |
//! | [`ContextAwarePredictor`] | mass conditioned on last k lengths | k lengths |
//! | [`PositionRestrictedPredictor`] | reachable offsets only | none |

mod baseline;
mod context_aware;
mod context_free;

pub use baseline::{baseline_set, PositionRestrictedPredictor};
pub use context_aware::ContextAwarePredictor;
pub use context_free::ContextFreePredictor;
