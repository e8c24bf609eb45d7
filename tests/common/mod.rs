//! Shared synthetic module fixture for the integration suites.
//!
//! The fixture reproduces every structural landmark of the target module in
//! one concatenated blob, with freshly invented minified identifiers - the
//! rules must bind by shape alone, exactly as they do against a real build.

#![allow(dead_code)]

/// Negated integrity-guard chain.
pub const GUARD_NEG: &str =
    "if(!(w2e.r5T(5,false,3) !== q7M[4] && w2e.r5T(6,false,2) !== q7M[5])){aT1();}";
/// Affirmed integrity-guard chain.
pub const GUARD_POS: &str =
    "if(w2e.r5T(2,false,8) === q7M[6] || w2e.r5T(3,false,7) === q7M[7]){aT2();}";
/// First spread-args protocol callback definition.
pub const CALLBACK_ONE: &str = "function hY7(...n){dsp(20,n);}";
/// Second spread-args protocol callback definition.
pub const CALLBACK_TWO: &str = "function k3L(...n){dsp(21,n);}";
/// The map-search result renderer definition.
pub const MAP_RENDERER: &str = "function fN2(m){render(m);}";
/// The search-response handler the renderer's name is discovered from.
pub const MAP_HANDLER: &str = "bind(\"maploadwindowsearchinput\",function(){if(x1){noop();}\
else if(aBc[0][0][q7M[5][6]] == w2e.r5T(10)){fN2(aBc[0][0]);q7M[7]=aBc[0][0][w2e[8][9]];}})";
/// Per-tick state construction (primary mode).
pub const STATE_ASSIGN: &str = "z[aBc[12][34]]={discs:[],props:0};";
/// Per-tick state reset/guard (alternate mode).
pub const ALT_STATE: &str = "qR=[];if(!k[aBc[56][7]]){buildAlt();}";
/// Input-collection call site.
pub const INPUT_READ: &str = "aBc[77]=K[w2e[30][31]]();stepInputs(aBc[77]);";
/// State-construction call site carrying the lookup slot.
pub const SCORE_SLOT: &str = "v[q7M[1023][7]]([{m:1}]);";
/// The round-state construction assignment.
pub const SCORE_CREATE: &str = "aBc[55]=q7M[1023][q7M[1023][7]]([{m:1}],true);";
/// Round-setup finalization, pinned by the round-end scaling constant.
pub const SCORE_SITE: &str = "seed(pW * 999),aBc[56],null,aBc[57],true);";
/// The round-count clamp statement.
pub const ROUND_CLAMP: &str =
    "aBc[10][11][q7M[12][13]]=Math[q7M[14][15]](Math[q7M[16][17]](1,aBc[18][19][q7M[20][21]]),9);";
/// The literal-derived round-count parse.
pub const ROUND_PARSE: &str = "wQ2[1024]=parseInt(q7M[0][0][w2e[55][66]]);";
/// The report-threshold assignment adjacent to the auth token.
pub const TOKEN_ASSIGN: &str =
    "kQ9[3]=[1,10000,25000,100000,500000,8000000,5000000000];login(kQ9);";
/// Tail of the menu controller's enter-key handler.
pub const MENU_TAIL: &str = "if(e == 13){sQ1();}}";
/// The tool/network controller construction.
pub const TOOLS_CTOR: &str = "this.net=new Xy(this,ab[0][0],ab[0][1]);";
/// The game-info container's roster placeholder initialization.
pub const INFO_INIT: &str = "q7M[22]={id:-1,element:null};";
/// The player-roster anchor.
pub const ROSTER_ANCHOR: &str = "show(newbonklobby_votewindow_close);";

/// Every segment of the synthetic module, in source order.
pub fn segments() -> Vec<&'static str> {
    vec![
        GUARD_NEG,
        GUARD_POS,
        CALLBACK_ONE,
        CALLBACK_TWO,
        MAP_RENDERER,
        MAP_HANDLER,
        STATE_ASSIGN,
        ALT_STATE,
        INPUT_READ,
        SCORE_SLOT,
        SCORE_CREATE,
        SCORE_SITE,
        ROUND_CLAMP,
        ROUND_PARSE,
        TOKEN_ASSIGN,
        MENU_TAIL,
        TOOLS_CTOR,
        INFO_INIT,
        ROSTER_ANCHOR,
    ]
}

/// The complete synthetic module.
pub fn fixture() -> String {
    segments().concat()
}

/// The synthetic module with one segment left out.
pub fn fixture_without(dropped: &str) -> String {
    segments()
        .into_iter()
        .filter(|segment| *segment != dropped)
        .collect()
}
