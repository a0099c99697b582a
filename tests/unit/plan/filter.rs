use std::path::Path;

use super::*;
use crate::plan::seek::{LoopRequest, resolve};

fn looping() -> ResolvedSeekPlan {
    resolve(Path::new("clip.mp4"), &LoopRequest::new(0.0, None, true))
}

fn padded() -> ResolvedSeekPlan {
    resolve(Path::new("clip.mp4"), &LoopRequest::new(0.0, None, false))
}

fn assert_linear_chain(graph: &FilterGraph) {
    let k = graph.len();
    assert!(k > 0);
    assert_eq!(graph.stages[0].input_pad, None);
    assert_eq!(graph.stages[k - 1].output_pad, None);

    let links = graph
        .stages
        .iter()
        .filter(|s| s.output_pad.is_some())
        .count();
    assert_eq!(links, k - 1);
    for pair in graph.stages.windows(2) {
        assert!(pair[0].output_pad.is_some());
        assert_eq!(pair[0].output_pad, pair[1].input_pad);
    }
}

#[test]
fn looping_chain_is_concat_then_setpts() {
    let graph = assemble(&looping(), None);
    assert_eq!(graph.stage_names(), vec!["concat", "setpts"]);
    assert!(!graph.has_crop);
    assert_linear_chain(&graph);
    assert_eq!(
        graph.render(),
        FilterArg::Complex(
            "concat=n=2:v=1:a=0[concat-inputs0];[concat-inputs0]setpts=N/(FRAME_RATE*TB)"
                .to_string()
        )
    );
}

#[test]
fn looping_chain_with_crop() {
    let crop = CropRect::at(12, 24, 0, 0);
    let graph = assemble(&looping(), Some(&crop));
    assert_eq!(graph.stage_names(), vec!["concat", "setpts", "crop"]);
    assert!(graph.has_crop);
    assert_linear_chain(&graph);
    assert_eq!(
        graph.stages[2].params,
        FilterParams::Positional(vec!["12".into(), "24".into(), "0".into(), "0".into()])
    );
    assert_eq!(graph.stages[2].input_pad.as_deref(), Some("redo-timecodes1"));
    assert_eq!(
        graph.render(),
        FilterArg::Complex(
            "concat=n=2:v=1:a=0[concat-inputs0];\
             [concat-inputs0]setpts=N/(FRAME_RATE*TB)[redo-timecodes1];\
             [redo-timecodes1]crop=12:24:0:0"
                .to_string()
        )
    );
}

#[test]
fn padded_chain_collapses_to_simple_filter() {
    let graph = assemble(&padded(), None);
    assert_eq!(graph.stage_names(), vec!["tpad"]);
    assert_linear_chain(&graph);
    assert_eq!(
        graph.render(),
        FilterArg::Simple("tpad=stop=-1:stop_mode=clone".to_string())
    );
}

#[test]
fn padded_chain_with_crop_is_labelled() {
    let crop = CropRect::centered(12, 24);
    let graph = assemble(&padded(), Some(&crop));
    assert_eq!(graph.stage_names(), vec!["tpad", "crop"]);
    assert_linear_chain(&graph);
    assert_eq!(
        graph.render(),
        FilterArg::Complex(
            "tpad=stop=-1:stop_mode=clone[pad-at-end0];[pad-at-end0]crop=12:24".to_string()
        )
    );
}

#[test]
fn assembling_twice_is_identical() {
    let crop = CropRect::at(12, 24, 3, 4);
    let a = assemble(&looping(), Some(&crop));
    let b = assemble(&looping(), Some(&crop));
    assert_eq!(a, b);
    assert_eq!(a.render(), b.render());
}

#[test]
fn chain_labels_fall_back_to_filter_name() {
    let graph = FilterChain::new()
        .then(FilterStage::new("hflip", FilterParams::None))
        .then(FilterStage::new("vflip", FilterParams::None))
        .then(FilterStage::new("null", FilterParams::None))
        .build(false);
    assert_linear_chain(&graph);
    assert_eq!(graph.stages[0].output_pad.as_deref(), Some("hflip0"));
    assert_eq!(graph.stages[1].output_pad.as_deref(), Some("vflip1"));
    assert_eq!(
        graph.render(),
        FilterArg::Complex("hflip[hflip0];[hflip0]vflip[vflip1];[vflip1]null".to_string())
    );
}

#[test]
fn empty_chain_renders_nothing() {
    let chain = FilterChain::new();
    assert!(chain.is_empty());
    let graph = chain.build(false);
    assert!(graph.is_empty());
    assert_eq!(graph.render(), FilterArg::None);
    assert_eq!(graph.render().flag_and_value(), None);
}

#[test]
fn filter_arg_flags() {
    assert_eq!(
        FilterArg::Simple("tpad".into()).flag_and_value(),
        Some(("-vf", "tpad"))
    );
    assert_eq!(
        FilterArg::Complex("a;b".into()).flag_and_value(),
        Some(("-filter_complex", "a;b"))
    );
}

#[test]
fn special_characters_are_quoted() {
    assert_eq!(escape_value("plain"), "plain");
    assert_eq!(escape_value("a:b"), "'a:b'");
    assert_eq!(escape_value("it's"), r"'it'\''s'");
}
