//! Input-read transform interposition.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{cap, group, ident, ident_upto, index, lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Interposes an externally overridable transform on the host's input read.
///
/// The landmark is the input-collection call site: a zero-argument,
/// bracket-indexed method call whose result is stored into an indexed slot
/// (`s[a]=e[t[x][y]]();`). The injected statement routes the freshly read
/// value through the transform and stores the result back into the same slot
/// before the host continues, preserving the read's synchronous contract.
pub struct InputTransformRule;

impl PatchRule for InputTransformRule {
    fn id(&self) -> RuleId {
        RuleId::InputTransform
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let pattern = Pattern::new(vec![
            cap("slot", group(vec![ident(3), index(3)])),
            lit("="),
            ident_upto(1, 3),
            lit("["),
            ident(3),
            index(3),
            index(3),
            lit("]();"),
        ]);
        let landmark = Landmark::locate(self.id(), &pattern, source)?;
        let slot = landmark.require("slot")?;
        let ns = ctx.namespace();
        Ok(vec![Splice::insert_at(
            landmark.end,
            format!("{slot}=window.{ns}.transformInput({slot});"),
        )])
    }

    fn description(&self) -> &'static str {
        "Route every input read through the externally overridable transform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchConfig;

    #[test]
    fn read_result_is_routed_through_the_transform() {
        let source = SourceText::new("tick();aBc[77]=K[w2e[30][31]]();step(aBc[77]);");
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        let patched = source
            .splice(InputTransformRule.plan(&source, &mut ctx).unwrap())
            .unwrap();
        assert_eq!(
            patched.as_str(),
            "tick();aBc[77]=K[w2e[30][31]]();\
             aBc[77]=window.tapscope.transformInput(aBc[77]);step(aBc[77]);"
        );
    }
}
