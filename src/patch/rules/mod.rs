//! The built-in patch rule set.
//!
//! Rules live one landmark family per module. [`default_rules`] assembles
//! the canonical ordered list the pipeline runs; the order mirrors the
//! load-time sequence the host tolerates (guards first, taps next, exposure
//! rules last) and matters only where one rule's output text is a
//! precondition for a later rule's match.

mod callbacks;
mod guards;
mod input;
mod maps;
mod objects;
mod rounds;
mod score;
mod state;
mod token;

pub use callbacks::CallbackTableRule;
pub use guards::GuardNeutralizeRule;
pub use input::InputTransformRule;
pub use maps::MapLoaderRule;
pub use objects::ObjectRefsRule;
pub use rounds::RoundLimitRule;
pub use score::ScoreInjectionRule;
pub use state::{AltStateTapRule, StateTapRule};
pub use token::TokenTapRule;

use crate::patch::PatchRule;

/// The canonical ordered rule list for the target module.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn PatchRule>> {
    vec![
        Box::new(GuardNeutralizeRule),
        Box::new(StateTapRule),
        Box::new(AltStateTapRule),
        Box::new(ScoreInjectionRule),
        Box::new(RoundLimitRule),
        Box::new(InputTransformRule),
        Box::new(MapLoaderRule),
        Box::new(TokenTapRule),
        Box::new(CallbackTableRule),
        Box::new(ObjectRefsRule),
    ]
}
