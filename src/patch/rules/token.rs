//! Authentication token capture.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Captures the authentication token at the protocol-constant assignment.
///
/// The host assigns a fixed array of report thresholds - a literal that is
/// part of its own protocol and survives minification byte-for-byte - in the
/// one function that also receives the session's authentication token as its
/// first argument. The injected statement hands that argument to the hook
/// surface.
pub struct TokenTapRule;

/// The report-threshold array adjacent to the token assignment.
const THRESHOLDS: &str = "[1,10000,25000,100000,500000,8000000,5000000000];";

impl PatchRule for TokenTapRule {
    fn id(&self) -> RuleId {
        RuleId::TokenTap
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let pattern = Pattern::new(vec![lit(THRESHOLDS)]);
        let landmark = Landmark::locate(self.id(), &pattern, source)?;
        let ns = ctx.namespace();
        Ok(vec![Splice::insert_at(
            landmark.end,
            format!("window.{ns}.setToken(arguments[0]);"),
        )])
    }

    fn description(&self) -> &'static str {
        "Capture the authentication token beside the report-threshold constant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchConfig;

    #[test]
    fn capture_lands_after_the_threshold_array() {
        let source = SourceText::new(
            "kQ9[3]=[1,10000,25000,100000,500000,8000000,5000000000];login(kQ9);",
        );
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        let patched = source
            .splice(TokenTapRule.plan(&source, &mut ctx).unwrap())
            .unwrap();
        assert_eq!(
            patched.as_str(),
            "kQ9[3]=[1,10000,25000,100000,500000,8000000,5000000000];\
             window.tapscope.setToken(arguments[0]);login(kQ9);"
        );
    }

    #[test]
    fn changed_thresholds_break_the_landmark() {
        let source = SourceText::new("kQ9[3]=[1,10000,25000];login(kQ9);");
        let config = PatchConfig::default();
        let mut ctx = PatchContext::new(&config);
        assert!(matches!(
            TokenTapRule.plan(&source, &mut ctx),
            Err(crate::Error::LandmarkNotFound {
                rule: RuleId::TokenTap
            })
        ));
    }
}
