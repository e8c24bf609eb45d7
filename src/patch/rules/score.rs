//! Pending next-round score injection.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{alpha, cap, digits, group, ident, index, lit, skip_up_to, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Injects a conditional score overwrite at round-setup finalization.
///
/// Three scans cooperate, each feeding the next an explicitly captured token:
///
/// 1. The state-construction call site (`x[y[a][slot]]([{`) yields the lookup
///    slot the host routes state construction through.
/// 2. The construction assignment, parameterized by that slot, yields the
///    expression naming the freshly created round state and the controller
///    object it hangs off.
/// 3. The round-setup finalization statement - pinned by the round-end
///    scaling constant `* 999` - is where the conditional lands.
///
/// At runtime the injected block overwrites the new state's score field with
/// the externally pending value if one is set, then clears the pending slot;
/// with no pending value it changes nothing. It also publishes the
/// state-mutation controller reference, the one controller whose construction
/// site only this rule discovers.
pub struct ScoreInjectionRule;

impl PatchRule for ScoreInjectionRule {
    fn id(&self) -> RuleId {
        RuleId::ScoreInjection
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let slot_pattern = Pattern::new(vec![
            alpha(1),
            lit("["),
            ident(3),
            index(4),
            lit("["),
            cap("slot", digits(4)),
            lit("]"),
            lit("]([{"),
        ]);
        let slot_landmark = Landmark::locate(self.id(), &slot_pattern, source)?;
        let slot = slot_landmark.require("slot")?;

        let creation = Pattern::new(vec![
            cap("state", group(vec![ident(3), index(3)])),
            lit("="),
            cap("receiver", group(vec![ident(3), index(4)])),
            lit("["),
            ident(3),
            index(4),
            lit("["),
            lit(slot.to_string()),
            lit("]"),
            lit("]"),
            skip_up_to(ctx.config().scan_window),
            lit(";"),
        ]);
        let creation_landmark = Landmark::locate_unique(self.id(), &creation, source)?;
        let state = creation_landmark.require("state")?.to_string();
        let receiver = creation_landmark.require("receiver")?.to_string();

        let site = Pattern::new(vec![
            lit("* 999),"),
            ident(3),
            index(3),
            lit(",null,"),
            ident(3),
            index(3),
            lit(",true);"),
        ]);
        let site_landmark = Landmark::locate(self.id(), &site, source)?;

        ctx.record("state_expr", state.clone());
        let ns = ctx.namespace();
        let payload = format!(
            "if(window.{ns}.nextScores){{{state}.scores = window.{ns}.nextScores;}}\
             window.{ns}.nextScores = undefined;window.{ns}.stateController = {receiver};"
        );
        Ok(vec![Splice::insert_at(site_landmark.end, payload)])
    }

    fn description(&self) -> &'static str {
        "Overwrite the new round state's scores with the pending value, once, at round start"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchConfig;

    fn fixture() -> SourceText {
        SourceText::new(
            "v[q7M[1023][7]]([{a:1}]);\
             aBc[55]=q7M[1023][q7M[1023][7]]([{a:1}],true);\
             go(t * 999),aBc[56],null,aBc[57],true);",
        )
    }

    #[test]
    fn payload_lands_after_round_setup_and_names_the_state() {
        let source = fixture();
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        let patched = source
            .splice(ScoreInjectionRule.plan(&source, &mut ctx).unwrap())
            .unwrap();

        let text = patched.as_str();
        let anchor = "* 999),aBc[56],null,aBc[57],true);";
        let site_end = text.find(anchor).unwrap() + anchor.len();
        // Everything before the first round-setup tail is untouched, the
        // conditional follows immediately, bound to the captured state slot.
        assert!(text[site_end..].starts_with("if(window.tapscope.nextScores){aBc[55].scores"));
        assert!(text.contains("window.tapscope.nextScores = undefined;"));
        assert!(text.contains("window.tapscope.stateController = q7M[1023];"));
        assert_eq!(ctx.captured("state_expr"), Some("aBc[55]"));
    }

    #[test]
    fn missing_scaling_constant_aborts() {
        let source = SourceText::new(
            "v[q7M[1023][7]]([{a:1}]);aBc[55]=q7M[1023][q7M[1023][7]]([{a:1}],true);",
        );
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        assert!(matches!(
            ScoreInjectionRule.plan(&source, &mut ctx),
            Err(crate::Error::LandmarkNotFound {
                rule: RuleId::ScoreInjection
            })
        ));
    }
}
