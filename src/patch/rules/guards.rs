//! Integrity-guard predicate neutralization.

use log::debug;

use crate::patch::{PatchContext, PatchRule, RuleId};
use crate::pattern::{digits, group, ident, index, lit, repeat, Pattern, Shape};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Rewrites the host's integrity-check predicate chains to `if(true)`.
///
/// The host wraps sections of its own logic in chains of the form
/// `if(!(x.y(n,false,n) !== z[i] && …))` (and the `===`/`||` dual). Every
/// chain found is collapsed so the guarded branch always runs.
///
/// Unlike the single-site taps, this rule is an all-matches rule and
/// tolerates zero matches: guard count varies per build, and a build without
/// guards needs no neutralization.
pub struct GuardNeutralizeRule;

fn guard_call() -> Shape {
    group(vec![
        ident(3),
        lit("."),
        ident(3),
        lit("("),
        digits(4),
        lit(",false,"),
        digits(4),
        lit(")"),
    ])
}

impl PatchRule for GuardNeutralizeRule {
    fn id(&self) -> RuleId {
        RuleId::GuardNeutralize
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let limit = ctx.config().guard_chain_limit;
        let negated = Pattern::new(vec![
            lit("if(!("),
            repeat(
                group(vec![
                    guard_call(),
                    lit(" !== "),
                    ident(3),
                    index(4),
                    lit(" && "),
                ]),
                1,
                limit,
            ),
            guard_call(),
            lit(" !== "),
            ident(3),
            index(4),
            lit("))"),
        ]);
        let affirmed = Pattern::new(vec![
            lit("if("),
            repeat(
                group(vec![
                    guard_call(),
                    lit(" === "),
                    ident(3),
                    index(4),
                    lit(" || "),
                ]),
                1,
                limit,
            ),
            guard_call(),
            lit(" === "),
            ident(3),
            index(4),
            lit(")"),
        ]);

        let text = source.as_str();
        let mut splices = Vec::new();
        for pattern in [&negated, &affirmed] {
            for m in pattern.find_all(text) {
                splices.push(Splice::replacing(m.start, m.text(text), "if(true)"));
            }
        }
        debug!("neutralized {} guard chains", splices.len());
        Ok(splices)
    }

    fn description(&self) -> &'static str {
        "Collapse integrity-check predicate chains so guarded branches always run"
    }
}
