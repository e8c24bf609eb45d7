//! Controller object reference taps.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{ident, ident_upto, index, lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Publishes host controller references at their one-time construction sites.
///
/// Four call sites, each identified by its own fixed adjacency:
///
/// - the menu controller, at the tail of its enter-key handler
///   (`== 13){x();}}`)
/// - the tool/network controller, at its two-argument construction
///   (`=new X(this,a[0][0],a[0][1]);`)
/// - the game-info container, at the roster placeholder initialization
///   (`={id:-1,element:null};`)
/// - the player-roster container, in front of the vote-window close anchor
///
/// Each tap publishes the live `this`/argument reference the moment the
/// surrounding constructor finishes. The fifth controller reference, the
/// state-mutation controller, is published by the score-injection rule, the
/// only rule that discovers its construction site.
pub struct ObjectRefsRule;

impl PatchRule for ObjectRefsRule {
    fn id(&self) -> RuleId {
        RuleId::ObjectRefs
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let ns = ctx.namespace().to_string();
        let mut splices = Vec::new();

        let menu = Pattern::new(vec![lit("== 13){"), ident(3), lit("();}}")]);
        let landmark = Landmark::locate(self.id(), &menu, source)?;
        splices.push(Splice::insert_at(
            landmark.end,
            format!("window.{ns}.menu = this;"),
        ));

        let tools = Pattern::new(vec![
            lit("=new "),
            ident_upto(1, 3),
            lit("(this,"),
            ident_upto(1, 3),
            lit("[0][0],"),
            ident_upto(1, 3),
            lit("[0][1]);"),
        ]);
        let landmark = Landmark::locate(self.id(), &tools, source)?;
        splices.push(Splice::insert_at(
            landmark.end,
            format!("window.{ns}.tools = this;"),
        ));

        let game_info = Pattern::new(vec![ident(3), index(3), lit("={id:-1,element:null};")]);
        let landmark = Landmark::locate(self.id(), &game_info, source)?;
        splices.push(Splice::insert_at(
            landmark.end,
            format!("window.{ns}.gameInfo = arguments;"),
        ));

        let roster = Pattern::new(vec![lit("newbonklobby_votewindow_close")]);
        let landmark = Landmark::locate(self.id(), &roster, source)?;
        splices.push(Splice::insert_at(
            landmark.start,
            format!("window.{ns}.players = arguments[1]; "),
        ));

        Ok(splices)
    }

    fn description(&self) -> &'static str {
        "Publish controller references at their one-time construction sites"
    }
}
