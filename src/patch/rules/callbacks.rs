//! Protocol callback table registration.

use std::collections::HashSet;

use log::debug;

use crate::patch::{PatchContext, PatchRule, RuleId};
use crate::pattern::{cap, ident, lit, Pattern};
use crate::source::{SourceText, Splice};
use crate::{Error, Result};

/// Registers every protocol callback into the hook surface's callback table.
///
/// Every function the host defines with the fixed spread-args parameter
/// shape (`function xyz(...`) is a protocol callback. Each definition gets a
/// registration statement spliced in front of it, keyed by the declared name;
/// declaration hoisting makes the forward reference legal.
///
/// A module with no spread-args definitions has no callback dispatch table at
/// all, which is a structural break, not an empty result.
pub struct CallbackTableRule;

impl PatchRule for CallbackTableRule {
    fn id(&self) -> RuleId {
        RuleId::CallbackTable
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let pattern = Pattern::new(vec![lit("function "), cap("name", ident(3)), lit("(...")]);
        let text = source.as_str();
        let matches = pattern.find_all(text);
        if matches.is_empty() {
            return Err(Error::LandmarkNotFound { rule: self.id() });
        }

        let ns = ctx.namespace();
        let mut seen = HashSet::new();
        let mut splices = Vec::new();
        for m in &matches {
            let name = m
                .capture_text(text, "name")
                .ok_or_else(|| misapplied_error!("callback landmark bound without a name"))?;
            if !seen.insert(name) {
                continue;
            }
            splices.push(Splice::insert_at(
                m.start,
                format!("window.{ns}.callbacks[\"{name}\"] = {name};"),
            ));
        }
        debug!("registered {} protocol callbacks", splices.len());
        Ok(splices)
    }

    fn description(&self) -> &'static str {
        "Publish every spread-args protocol callback into the callback table"
    }
}
