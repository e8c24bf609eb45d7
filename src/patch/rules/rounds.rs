//! Round-count clamp removal and control re-parse.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{cap, group, ident, index, lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Removes the host's fixed upper bound on the configured round count and
/// re-sources the count from an external control.
///
/// Two landmarks:
///
/// - the clamp statement, a `min(max(1, n), 9)`-shaped double call routed
///   through the obfuscated `Math` lookup - deleted outright;
/// - the literal-derived `parseInt` of the round count - replaced with a
///   parse of the configured control expression, guarded so that a
///   non-positive or non-numeric value aborts the enclosing action before
///   any state changes.
pub struct RoundLimitRule;

impl PatchRule for RoundLimitRule {
    fn id(&self) -> RuleId {
        RuleId::RoundLimit
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let clamp = Pattern::new(vec![
            ident(3),
            index(3),
            index(3),
            lit("["),
            ident(3),
            index(3),
            index(3),
            lit("]"),
            lit("=Math["),
            ident(3),
            index(3),
            index(3),
            lit("]("),
            lit("Math["),
            ident(3),
            index(3),
            index(3),
            lit("]("),
            lit("1,"),
            ident(3),
            index(3),
            index(3),
            lit("["),
            ident(3),
            index(3),
            index(3),
            lit("]"),
            lit("),9);"),
        ]);
        let clamp_landmark = Landmark::locate(self.id(), &clamp, source)?;

        let parse = Pattern::new(vec![
            cap("round_var", group(vec![ident(3), index(4)])),
            lit("=parseInt("),
            ident(3),
            lit("[0][0]["),
            ident(3),
            index(4),
            index(4),
            lit("]);"),
        ]);
        let parse_landmark = Landmark::locate_unique(self.id(), &parse, source)?;
        let round_var = parse_landmark.require("round_var")?;

        let control = &ctx.config().round_control_expr;
        let replacement = format!(
            "{round_var}=parseInt({control});\
             if(isNaN({round_var}) || {round_var} <= 0) {{return;}}"
        );
        Ok(vec![
            Splice::replacing(clamp_landmark.start, clamp_landmark.matched.clone(), ""),
            Splice::replacing(parse_landmark.start, parse_landmark.matched.clone(), replacement),
        ])
    }

    fn description(&self) -> &'static str {
        "Drop the round-count clamp and re-parse the count from the external control"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchConfig;

    const CLAMP: &str =
        "aBc[10][11][q7M[12][13]]=Math[q7M[14][15]](Math[q7M[16][17]](1,aBc[18][19][q7M[20][21]]),9);";
    const PARSE: &str = "wQ2[1024]=parseInt(q7M[0][0][w2e[55][66]]);";

    #[test]
    fn clamp_is_deleted_and_parse_is_guarded() {
        let source = SourceText::new(format!("start();{CLAMP}mid();{PARSE}end();"));
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        let patched = source
            .splice(RoundLimitRule.plan(&source, &mut ctx).unwrap())
            .unwrap();

        let text = patched.as_str();
        assert!(!text.contains("),9);"));
        assert!(text.starts_with("start();mid();"));
        assert!(text.contains(
            "wQ2[1024]=parseInt(document.getElementById(\"newbonklobby_roundsinput\").value);\
             if(isNaN(wQ2[1024]) || wQ2[1024] <= 0) {return;}"
        ));
        assert!(text.ends_with("end();"));
    }

    #[test]
    fn missing_clamp_aborts() {
        let source = SourceText::new(format!("start();{PARSE}end();"));
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        assert!(matches!(
            RoundLimitRule.plan(&source, &mut ctx),
            Err(crate::Error::LandmarkNotFound {
                rule: RuleId::RoundLimit
            })
        ));
    }
}
