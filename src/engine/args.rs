use std::ffi::OsString;

use crate::engine::ffmpeg::FfmpegConfig;
use crate::foundation::math::format_secs;
use crate::plan::{LoopPlan, OutputSpec};

/// Output target: raw frames on stdout.
pub const OUTPUT_TARGET: &str = "pipe:1";

/// Full `ffmpeg` argument vector (without the binary) for `plan`.
///
/// Layout: global flags, then `[-ss t] [-stream_loop -1] -i path` per input, then the filter
/// graph, then the fixed raw output options, then the optional output-side `-ss`, then
/// [`OUTPUT_TARGET`].
pub fn command_args(cfg: &FfmpegConfig, plan: &LoopPlan) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if cfg.hide_banner {
        args.push("-hide_banner".into());
    }
    args.push("-loglevel".into());
    args.push(cfg.log_level.clone().into());
    args.push("-nostdin".into());

    for input in &plan.seek().inputs {
        if let Some(seek) = input.seek_offset {
            args.push("-ss".into());
            args.push(format_secs(seek).into());
        }
        if input.stream_loop {
            args.push("-stream_loop".into());
            args.push("-1".into());
        }
        args.push("-i".into());
        args.push(input.path.clone().into_os_string());
    }

    if let Some((flag, value)) = plan.filters().render().flag_and_value() {
        args.push(flag.into());
        args.push(value.into());
    }

    let output = plan.output();
    args.extend(
        [
            "-an".to_string(),
            "-f".to_string(),
            OutputSpec::FORMAT.to_string(),
            "-vcodec".to_string(),
            OutputSpec::FORMAT.to_string(),
            "-pix_fmt".to_string(),
            OutputSpec::PIXEL_FORMAT.to_string(),
            "-s".to_string(),
            output.size.to_string(),
            "-r".to_string(),
            output.fps.to_string(),
        ]
        .map(OsString::from),
    );

    if let Some(trim) = plan.seek().output_start_trim {
        args.push("-ss".into());
        args.push(format_secs(trim).into());
    }

    args.push(OUTPUT_TARGET.into());
    args
}

/// Printable command line (binary + arguments), quoted for a POSIX shell.
pub fn command_line(cfg: &FfmpegConfig, plan: &LoopPlan) -> String {
    std::iter::once(cfg.binary.clone().into_os_string())
        .chain(command_args(cfg, plan))
        .map(|a| shell_quote(&a.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@+%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/args.rs"]
mod tests;
