//! Full pipeline tests with exact output verification.
//!
//! Each test drives the complete default rule list over the synthetic module
//! and verifies the **exact** patched text against an expected rendering
//! assembled segment by segment. Exact comparison is what proves the
//! byte-identity invariant: every byte outside the planned insertion points
//! survives unchanged.

mod common;

use common::*;
use tapscope::patch::{PatchConfig, RuleId};
use tapscope::pipeline::{PatchPipeline, PipelineState};
use tapscope::source::SourceText;
use tapscope::Error;

fn expected() -> String {
    [
        "if(true){aT1();}",
        "if(true){aT2();}",
        "window.tapscope.callbacks[\"hY7\"] = hY7;",
        CALLBACK_ONE,
        "window.tapscope.callbacks[\"k3L\"] = k3L;",
        CALLBACK_TWO,
        "window.tapscope.mapLoader=fN2;",
        MAP_RENDERER,
        MAP_HANDLER,
        "window.tapscope.state = arguments[0]; window.tapscope.onTick();",
        STATE_ASSIGN,
        "qR=[];",
        "window.tapscope.altState = arguments[0]; window.tapscope.onTick();",
        "if(!k[aBc[56][7]]){buildAlt();}",
        "aBc[77]=K[w2e[30][31]]();",
        "aBc[77]=window.tapscope.transformInput(aBc[77]);",
        "stepInputs(aBc[77]);",
        SCORE_SLOT,
        SCORE_CREATE,
        SCORE_SITE,
        "if(window.tapscope.nextScores){aBc[55].scores = window.tapscope.nextScores;}",
        "window.tapscope.nextScores = undefined;",
        "window.tapscope.stateController = q7M[1023];",
        // The round clamp is deleted outright; only the guarded re-parse remains.
        "wQ2[1024]=parseInt(document.getElementById(\"newbonklobby_roundsinput\").value);",
        "if(isNaN(wQ2[1024]) || wQ2[1024] <= 0) {return;}",
        "kQ9[3]=[1,10000,25000,100000,500000,8000000,5000000000];",
        "window.tapscope.setToken(arguments[0]);",
        "login(kQ9);",
        MENU_TAIL,
        "window.tapscope.menu = this;",
        TOOLS_CTOR,
        "window.tapscope.tools = this;",
        INFO_INIT,
        "window.tapscope.gameInfo = arguments;",
        "show(",
        "window.tapscope.players = arguments[1]; ",
        "newbonklobby_votewindow_close);",
    ]
    .concat()
}

#[test]
fn full_pipeline_produces_the_exact_expected_module() {
    let mut pipeline = PatchPipeline::with_defaults();
    let patched = pipeline.run(SourceText::new(fixture())).unwrap();

    assert_eq!(patched.as_str(), expected());
    assert_eq!(pipeline.state(), PipelineState::Ready);
    assert_eq!(pipeline.report().len(), 10);
}

#[test]
fn every_missing_landmark_aborts_with_its_rule() {
    let cases: Vec<(&str, RuleId)> = vec![
        (STATE_ASSIGN, RuleId::StateTap),
        (ALT_STATE, RuleId::AltStateTap),
        (SCORE_SITE, RuleId::ScoreInjection),
        (SCORE_SLOT, RuleId::ScoreInjection),
        (ROUND_CLAMP, RuleId::RoundLimit),
        (ROUND_PARSE, RuleId::RoundLimit),
        (INPUT_READ, RuleId::InputTransform),
        (MAP_HANDLER, RuleId::MapLoader),
        (TOKEN_ASSIGN, RuleId::TokenTap),
        (MENU_TAIL, RuleId::ObjectRefs),
        (TOOLS_CTOR, RuleId::ObjectRefs),
        (INFO_INIT, RuleId::ObjectRefs),
        (ROSTER_ANCHOR, RuleId::ObjectRefs),
    ];

    for (dropped, expected_rule) in cases {
        let mut pipeline = PatchPipeline::with_defaults();
        let err = pipeline
            .run(SourceText::new(fixture_without(dropped)))
            .unwrap_err();
        match err {
            Error::LandmarkNotFound { rule } => {
                assert_eq!(rule, expected_rule, "dropping {dropped:?}")
            }
            other => panic!("dropping {dropped:?}: unexpected error {other}"),
        }
        assert_eq!(pipeline.state(), PipelineState::Aborted(expected_rule));

        // An aborted pipeline never yields text, patched or otherwise.
        assert!(matches!(
            pipeline.run(SourceText::new(fixture())),
            Err(Error::PipelineAborted { .. })
        ));
    }
}

#[test]
fn missing_callback_definitions_abort() {
    let source: String = segments()
        .into_iter()
        .filter(|s| *s != CALLBACK_ONE && *s != CALLBACK_TWO)
        .collect();
    let mut pipeline = PatchPipeline::with_defaults();
    let err = pipeline.run(SourceText::new(source)).unwrap_err();
    assert!(matches!(
        err,
        Error::LandmarkNotFound {
            rule: RuleId::CallbackTable
        }
    ));
}

#[test]
fn absent_guards_are_tolerated() {
    let source: String = segments()
        .into_iter()
        .filter(|s| *s != GUARD_NEG && *s != GUARD_POS)
        .collect();
    let mut pipeline = PatchPipeline::with_defaults();
    let patched = pipeline.run(SourceText::new(source)).unwrap();
    assert!(!patched.as_str().contains("if(true)"));
    assert_eq!(pipeline.report()[0].rule, RuleId::GuardNeutralize);
    assert_eq!(pipeline.report()[0].splices, 0);
}

#[test]
fn custom_namespace_flows_through_every_injection() {
    let config = PatchConfig {
        namespace: "probe9".to_string(),
        ..PatchConfig::default()
    };
    let mut pipeline = PatchPipeline::with_config(config);
    let patched = pipeline.run(SourceText::new(fixture())).unwrap();

    let text = patched.as_str();
    assert!(text.contains("window.probe9.state = arguments[0];"));
    assert!(text.contains("window.probe9.callbacks[\"hY7\"]"));
    assert!(text.contains("window.probe9.setToken(arguments[0]);"));
    assert!(!text.contains("window.tapscope."));
}

#[test]
fn custom_round_control_is_spliced_verbatim() {
    let config = PatchConfig {
        round_control_expr: "window.probe9.roundControl".to_string(),
        ..PatchConfig::default()
    };
    let mut pipeline = PatchPipeline::with_config(config);
    let patched = pipeline.run(SourceText::new(fixture())).unwrap();
    assert!(patched
        .as_str()
        .contains("wQ2[1024]=parseInt(window.probe9.roundControl);"));
}
