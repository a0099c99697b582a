//! Filter graph assembly.
//!
//! The graph is always a single linear chain. The looping base is `concat` + `setpts`, the
//! padded base is `tpad`; an optional `crop` comes last. Consecutive stages are connected through
//! pad labels derived from the upstream stage, so the final stage is the graph output.
//!
//! A graph with one stage and no crop is rendered with the simple-filter shorthand (`-vf`,
//! no labels); anything else is rendered as a labelled `-filter_complex` graph.

use crate::plan::crop::CropRect;
use crate::plan::seek::ResolvedSeekPlan;

/// Filter options, in the order they are rendered.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterParams {
    /// No options (`name`).
    None,
    /// `key=value` pairs (`name=k1=v1:k2=v2`).
    Named(Vec<(String, String)>),
    /// Positional values (`name=v1:v2`).
    Positional(Vec<String>),
}

impl FilterParams {
    fn render(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Named(pairs) => Some(
                pairs
                    .iter()
                    .map(|(k, v)| format!("{k}={}", escape_value(v)))
                    .collect::<Vec<_>>()
                    .join(":"),
            ),
            Self::Positional(values) => Some(
                values
                    .iter()
                    .map(|v| escape_value(v))
                    .collect::<Vec<_>>()
                    .join(":"),
            ),
        }
    }
}

/// One filter in the chain.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FilterStage {
    /// `ffmpeg` filter name.
    pub name: String,
    /// Filter options.
    pub params: FilterParams,
    /// Label of the upstream link; `None` for the first stage.
    pub input_pad: Option<String>,
    /// Label of the downstream link; `None` for the final stage.
    pub output_pad: Option<String>,
    #[serde(skip)]
    pad_name: Option<&'static str>,
}

impl FilterStage {
    /// Unlinked stage.
    pub fn new(name: impl Into<String>, params: FilterParams) -> Self {
        Self {
            name: name.into(),
            params,
            input_pad: None,
            output_pad: None,
            pad_name: None,
        }
    }

    /// Use `pad_name` instead of the filter name when labelling this stage's output link.
    pub fn with_pad_name(mut self, pad_name: &'static str) -> Self {
        self.pad_name = Some(pad_name);
        self
    }

    /// Join `inputs` video streams end to end, without audio.
    pub fn concat(inputs: u32) -> Self {
        Self::new(
            "concat",
            FilterParams::Named(vec![
                ("n".into(), inputs.to_string()),
                ("v".into(), "1".into()),
                ("a".into(), "0".into()),
            ]),
        )
        .with_pad_name("concat-inputs")
    }

    /// Renumber timestamps at a constant frame rate; `concat` keeps the incoming ones.
    pub fn setpts_constant_rate() -> Self {
        Self::new(
            "setpts",
            FilterParams::Positional(vec!["N/(FRAME_RATE*TB)".into()]),
        )
        .with_pad_name("redo-timecodes")
    }

    /// Clone the last frame forever.
    pub fn tpad_clone_forever() -> Self {
        Self::new(
            "tpad",
            FilterParams::Named(vec![
                ("stop".into(), "-1".into()),
                ("stop_mode".into(), "clone".into()),
            ]),
        )
        .with_pad_name("pad-at-end")
    }

    /// Crop to `rect`.
    pub fn crop(rect: &CropRect) -> Self {
        Self::new("crop", FilterParams::Positional(rect.filter_args()))
    }

    fn link_label(&self, position: usize) -> String {
        format!("{}{position}", self.pad_name.unwrap_or(self.name.as_str()))
    }

    /// Render as `name=opts`, with `[in]`/`[out]` pads when `labelled`.
    pub fn render(&self, labelled: bool) -> String {
        let mut out = String::new();
        if labelled && let Some(pad) = &self.input_pad {
            out.push_str(&format!("[{pad}]"));
        }
        out.push_str(&self.name);
        if let Some(params) = self.params.render() {
            out.push('=');
            out.push_str(&params);
        }
        if labelled && let Some(pad) = &self.output_pad {
            out.push_str(&format!("[{pad}]"));
        }
        out
    }
}

/// Builder for a linear chain of stages.
///
/// Each [`FilterChain::then`] consumes the chain and returns the extended one; pads are wired
/// once in [`FilterChain::build`].
#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `stage` after the current last stage.
    #[must_use]
    pub fn then(self, stage: FilterStage) -> Self {
        let mut stages = self.stages;
        stages.push(FilterStage {
            input_pad: None,
            output_pad: None,
            ..stage
        });
        Self { stages }
    }

    /// Append `stage` when it is `Some`.
    #[must_use]
    pub fn then_some(self, stage: Option<FilterStage>) -> Self {
        match stage {
            Some(stage) => self.then(stage),
            None => self,
        }
    }

    /// Number of stages appended so far.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// `true` when no stage was appended.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Wire pads between consecutive stages.
    ///
    /// The link between stage `i` and `i + 1` is named after stage `i` (its pad name or filter
    /// name) followed by `i`.
    pub fn build(self, has_crop: bool) -> FilterGraph {
        let links: Vec<String> = self
            .stages
            .iter()
            .enumerate()
            .take(self.stages.len().saturating_sub(1))
            .map(|(i, stage)| stage.link_label(i))
            .collect();

        let stages = self
            .stages
            .into_iter()
            .enumerate()
            .map(|(i, stage)| FilterStage {
                input_pad: i.checked_sub(1).map(|prev| links[prev].clone()),
                output_pad: links.get(i).cloned(),
                ..stage
            })
            .collect();

        FilterGraph { stages, has_crop }
    }
}

/// Assembled filter chain.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FilterGraph {
    /// Stages in execution order.
    pub stages: Vec<FilterStage>,
    /// Whether a crop stage was appended.
    pub has_crop: bool,
}

/// How the graph is handed to `ffmpeg`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterArg {
    /// No filtering.
    None,
    /// Single unlabelled filter for `-vf`.
    Simple(String),
    /// Labelled graph for `-filter_complex`.
    Complex(String),
}

impl FilterArg {
    /// Command-line flag and value, if any.
    pub fn flag_and_value(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::None => None,
            Self::Simple(v) => Some(("-vf", v)),
            Self::Complex(v) => Some(("-filter_complex", v)),
        }
    }
}

impl FilterGraph {
    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// `true` when the graph has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in order, e.g. `["concat", "setpts", "crop"]`.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render for the command line, collapsing a lone uncropped stage to the simple form.
    pub fn render(&self) -> FilterArg {
        match self.stages.as_slice() {
            [] => FilterArg::None,
            [only] if !self.has_crop => FilterArg::Simple(only.render(false)),
            stages => FilterArg::Complex(
                stages
                    .iter()
                    .map(|s| s.render(true))
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
        }
    }
}

/// Build the filter chain for `seek`, cropping to `crop` when given.
pub fn assemble(seek: &ResolvedSeekPlan, crop: Option<&CropRect>) -> FilterGraph {
    let base = if seek.is_looping() {
        FilterChain::new()
            .then(FilterStage::concat(seek.inputs.len() as u32))
            .then(FilterStage::setpts_constant_rate())
    } else {
        // The stream never ends even when not looping: repeat the last frame.
        FilterChain::new().then(FilterStage::tpad_clone_forever())
    };

    base.then_some(crop.map(FilterStage::crop))
        .build(crop.is_some())
}

/// Quote a filter option value when it contains filtergraph syntax characters.
fn escape_value(v: &str) -> String {
    const SPECIAL: &[char] = &['\\', '\'', ':', ',', ';', '[', ']', '='];
    if !v.contains(SPECIAL) {
        return v.to_string();
    }
    format!("'{}'", v.replace('\'', r"'\''"))
}

#[cfg(test)]
#[path = "../../tests/unit/plan/filter.rs"]
mod tests;
