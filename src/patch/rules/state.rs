//! Per-tick state snapshot taps.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{alpha, ident, index, lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Taps the assignment that constructs the per-tick simulation state object.
///
/// The landmark is the `x[y[a][b]]={discs` assignment opening the state
/// literal. The injected call publishes the assigned value and invokes the
/// per-tick callback synchronously, immediately after the original assignment
/// and before any other statement in that tick.
pub struct StateTapRule;

impl PatchRule for StateTapRule {
    fn id(&self) -> RuleId {
        RuleId::StateTap
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let pattern = Pattern::new(vec![
            alpha(1),
            lit("["),
            ident(3),
            index(3),
            index(3),
            lit("]={discs"),
        ]);
        let landmark = Landmark::locate(self.id(), &pattern, source)?;
        let ns = ctx.namespace();
        Ok(vec![Splice::insert_at(
            landmark.start,
            format!("window.{ns}.state = arguments[0]; window.{ns}.onTick();"),
        )])
    }

    fn description(&self) -> &'static str {
        "Publish the per-tick state snapshot and fire the tick callback"
    }
}

/// Taps the structurally distinct state assignment of the alternate game
/// mode.
///
/// Same publication contract as [`StateTapRule`], but the snapshot lands in a
/// separate field. The runtime surface enforces that only one of the two taps
/// drives a given session: the first kind to publish pins the mode.
pub struct AltStateTapRule;

impl PatchRule for AltStateTapRule {
    fn id(&self) -> RuleId {
        RuleId::AltStateTap
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let pattern = Pattern::new(vec![
            lit("=[];if(!"),
            ident(1),
            lit("["),
            ident(3),
            index(3),
            index(3),
            lit("]){"),
        ]);
        let landmark = Landmark::locate(self.id(), &pattern, source)?;
        let ns = ctx.namespace();
        // The publication belongs after the `=[];` reset, before the guard.
        Ok(vec![Splice::insert_at(
            landmark.start + 4,
            format!("window.{ns}.altState = arguments[0]; window.{ns}.onTick();"),
        )])
    }

    fn description(&self) -> &'static str {
        "Publish the alternate-mode state snapshot and fire the tick callback"
    }
}
