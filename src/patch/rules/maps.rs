//! Map-search result renderer exposure.

use crate::patch::{Landmark, PatchContext, PatchRule, RuleId};
use crate::pattern::{cap, digits, ident, index, lit, skip_up_to, Pattern};
use crate::source::{SourceText, Splice};
use crate::Result;

/// Publishes a direct reference to the map-search result renderer.
///
/// The renderer's minified name is only discoverable from its call inside the
/// search-response handler, which sits within a bounded distance of the
/// search input's DOM id. A second scan finds the function's definition and
/// the publication is spliced in front of it, so external code can invoke the
/// renderer without going through the search UI.
pub struct MapLoaderRule;

impl PatchRule for MapLoaderRule {
    fn id(&self) -> RuleId {
        RuleId::MapLoader
    }

    fn plan(&self, source: &SourceText, ctx: &mut PatchContext<'_>) -> Result<Vec<Splice>> {
        let handler = Pattern::new(vec![
            lit("maploadwindowsearchinput"),
            skip_up_to(200),
            lit("else if("),
            ident(3),
            lit("[0][0]["),
            ident(3),
            index(3),
            index(3),
            lit("] == "),
            ident(3),
            lit("."),
            ident(3),
            lit("("),
            digits(3),
            lit(")){"),
            cap("loader", ident(3)),
            lit("("),
            ident(3),
            lit("[0][0]);"),
            ident(3),
            index(3),
            lit("="),
            ident(3),
            lit("[0][0]["),
            ident(3),
            index(3),
            index(3),
            lit("];}})"),
        ]);
        let handler_landmark = Landmark::locate(self.id(), &handler, source)?;
        let loader = handler_landmark.require("loader")?.to_string();

        let definition = Pattern::new(vec![lit(format!("function {loader}"))]);
        let definition_landmark = Landmark::locate(self.id(), &definition, source)?;

        let ns = ctx.namespace();
        Ok(vec![Splice::insert_at(
            definition_landmark.start,
            format!("window.{ns}.mapLoader={loader};"),
        )])
    }

    fn description(&self) -> &'static str {
        "Expose the map-search result renderer for direct invocation"
    }
}
