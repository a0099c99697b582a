use super::*;

fn src() -> &'static Path {
    Path::new("clip.mp4")
}

#[test]
fn looping_opens_seeked_input_then_looped_input() {
    let plan = resolve(src(), &LoopRequest::new(0.0, None, true));
    assert!(plan.is_looping());
    assert_eq!(plan.inputs.len(), 2);

    assert_eq!(plan.inputs[0].seek_offset, Some(0.0));
    assert!(!plan.inputs[0].stream_loop);

    assert_eq!(plan.inputs[1].seek_offset, None);
    assert!(plan.inputs[1].stream_loop);
    assert_eq!(plan.inputs[1].path, plan.inputs[0].path);
    assert_eq!(plan.output_start_trim, None);
}

#[test]
fn looping_seek_wraps_into_duration() {
    let durations = [0.5, 1.0, 7.25, 30.0];
    let starts = [0.0, 0.25, 1.0, 7.25, 29.9, 30.0, 61.5, 1234.5];
    for &d in &durations {
        for &s in &starts {
            let plan = resolve(src(), &LoopRequest::new(s, Some(d), true));
            let seek = plan.inputs[0].seek_offset.unwrap();
            assert!((0.0..d).contains(&seek), "start={s} duration={d} seek={seek}");
            assert!((seek - s % d).abs() < 1e-9, "start={s} duration={d} seek={seek}");
        }
    }
}

#[test]
fn looping_unknown_duration_uses_raw_start() {
    let plan = resolve(src(), &LoopRequest::new(42.5, Some(-1.0), true));
    assert_eq!(plan.inputs[0].seek_offset, Some(42.5));

    let plan = resolve(src(), &LoopRequest::new(42.5, None, true));
    assert_eq!(plan.inputs[0].seek_offset, Some(42.5));
}

#[test]
fn padded_opens_single_unlooped_input() {
    let plan = resolve(src(), &LoopRequest::new(0.0, None, false));
    assert!(!plan.is_looping());
    assert_eq!(plan.inputs.len(), 1);
    assert_eq!(plan.inputs[0].seek_offset, Some(0.0));
    assert!(!plan.inputs[0].stream_loop);
    assert_eq!(plan.output_start_trim, None);
}

#[test]
fn padded_clamps_one_second_before_end() {
    let req = LoopRequest::new(29.9, Some(30.0), false);
    assert_eq!(start_before_end(&req), 29.0);

    let plan = resolve(src(), &req);
    assert_eq!(plan.inputs[0].seek_offset, Some(29.0));
    let trim = plan.output_start_trim.unwrap();
    assert!((trim - 0.9).abs() < 1e-9, "trim={trim}");
}

#[test]
fn padded_trim_is_capped_at_one_second() {
    let durations = [2.0, 10.0, 30.0];
    let starts = [2.0, 9.5, 10.0, 30.0, 45.0, 1000.0];
    for &d in &durations {
        for &s in &starts {
            if s < d - 1.0 {
                continue;
            }
            let req = LoopRequest::new(s, Some(d), false);
            let sbe = start_before_end(&req);
            assert!(sbe <= d - 1.0, "start={s} duration={d} sbe={sbe}");

            let plan = resolve(src(), &req);
            match plan.output_start_trim {
                Some(trim) => {
                    assert!(sbe < s);
                    assert_eq!(trim, (s - sbe).min(1.0));
                }
                None => assert_eq!(sbe, s),
            }
        }
    }
}

#[test]
fn padded_without_clamp_has_no_trim() {
    let plan = resolve(src(), &LoopRequest::new(5.0, Some(30.0), false));
    assert_eq!(plan.inputs[0].seek_offset, Some(5.0));
    assert_eq!(plan.output_start_trim, None);
}

#[test]
fn padded_sub_second_source_seeks_to_zero() {
    let req = LoopRequest::new(0.3, Some(0.5), false);
    assert_eq!(start_before_end(&req), 0.0);
    let plan = resolve(src(), &req);
    assert_eq!(plan.output_start_trim, Some(0.3));
}

#[test]
fn padded_unknown_duration_keeps_start() {
    let plan = resolve(src(), &LoopRequest::new(3.0, Some(-1.0), false));
    assert_eq!(plan.inputs[0].seek_offset, Some(3.0));
    assert_eq!(plan.output_start_trim, None);
}

#[test]
fn request_treats_non_positive_duration_as_unknown() {
    assert_eq!(LoopRequest::new(0.0, Some(-1.0), true).input_duration, None);
    assert_eq!(LoopRequest::new(0.0, Some(0.0), true).input_duration, None);
    assert_eq!(LoopRequest::new(0.0, Some(12.0), true).input_duration, Some(12.0));
}
