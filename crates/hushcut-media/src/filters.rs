//! Typed FFmpeg filter expressions.
//!
//! Every filter string handed to FFmpeg is rendered from these types;
//! call sites never interpolate raw filter text. A [`FilterSpec`] is a
//! single filter with key=value arguments, a [`FilterChain`] is a labeled
//! `[in]f1,f2[out]` chain, and a [`FilterGraph`] renders a full
//! `-filter_complex` expression.

use crate::silence::segments::Segment;

/// A single filter invocation, e.g. `trim=start=10:end=20`.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    name: &'static str,
    args: Vec<(&'static str, String)>,
}

impl FilterSpec {
    /// Create a filter with no arguments.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Add a key=value argument.
    pub fn arg(mut self, key: &'static str, value: impl ToString) -> Self {
        self.args.push((key, value.to_string()));
        self
    }

    /// Render to FFmpeg filter syntax.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.name.to_string();
        }
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("{}={}", self.name, args.join(":"))
    }
}

/// A labeled chain of filters: `[in0][in1]f1,f2[out0]`.
#[derive(Debug, Clone)]
pub struct FilterChain {
    inputs: Vec<String>,
    filters: Vec<FilterSpec>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            filters: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Add an input pad label (without brackets).
    pub fn input(mut self, label: impl Into<String>) -> Self {
        self.inputs.push(label.into());
        self
    }

    /// Append a filter to the chain.
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.filters.push(spec);
        self
    }

    /// Add an output pad label (without brackets).
    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.outputs.push(label.into());
        self
    }

    fn render(&self) -> String {
        let inputs: String = self.inputs.iter().map(|l| format!("[{}]", l)).collect();
        let filters: Vec<String> = self.filters.iter().map(FilterSpec::render).collect();
        let outputs: String = self.outputs.iter().map(|l| format!("[{}]", l)).collect();
        format!("{}{}{}", inputs, filters.join(","), outputs)
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// A full filter graph: chains joined with `;`.
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self { chains: Vec::new() }
    }

    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Render to a `-filter_complex` expression.
    pub fn render(&self) -> String {
        let chains: Vec<String> = self.chains.iter().map(FilterChain::render).collect();
        chains.join(";")
    }
}

/// `silencedetect` analysis filter.
pub fn silencedetect(noise_db: f64, min_silence_secs: f64) -> FilterSpec {
    FilterSpec::new("silencedetect")
        .arg("n", format!("{}dB", noise_db))
        .arg("d", min_silence_secs)
}

/// `aresample` with async compensation, used to absorb inter-chunk
/// audio drift at reassembly time.
pub fn aresample_async() -> FilterSpec {
    FilterSpec::new("aresample").arg("async", 1)
}

/// Trim/concat graph for the keep segments of one source.
///
/// Video and audio streams are trimmed per segment and their timestamps
/// reset to zero; without the reset, concatenated streams would carry
/// discontinuous timestamps and desync. With a single segment the trimmed
/// pads are mapped directly, skipping the concat nodes.
#[derive(Debug, Clone)]
pub struct SegmentGraph {
    pub graph: FilterGraph,
    /// Output pad label for the spliced video stream (without brackets).
    pub video_out: String,
    /// Output pad label for the spliced audio stream (without brackets).
    pub audio_out: String,
}

/// Build the trim/concat graph for `segments`.
pub fn segment_trim_graph(segments: &[Segment]) -> SegmentGraph {
    let mut graph = FilterGraph::new();

    for (i, seg) in segments.iter().enumerate() {
        graph = graph.chain(
            FilterChain::new()
                .input("0:v")
                .filter(
                    FilterSpec::new("trim")
                        .arg("start", seg.start)
                        .arg("end", seg.end),
                )
                .filter(FilterSpec::new("setpts").arg("expr", "PTS-STARTPTS"))
                .output(format!("v{}", i)),
        );
        graph = graph.chain(
            FilterChain::new()
                .input("0:a")
                .filter(
                    FilterSpec::new("atrim")
                        .arg("start", seg.start)
                        .arg("end", seg.end),
                )
                .filter(FilterSpec::new("asetpts").arg("expr", "PTS-STARTPTS"))
                .output(format!("a{}", i)),
        );
    }

    if segments.len() == 1 {
        return SegmentGraph {
            graph,
            video_out: "v0".to_string(),
            audio_out: "a0".to_string(),
        };
    }

    let mut video_concat = FilterChain::new();
    for i in 0..segments.len() {
        video_concat = video_concat.input(format!("v{}", i));
    }
    video_concat = video_concat
        .filter(
            FilterSpec::new("concat")
                .arg("n", segments.len())
                .arg("v", 1)
                .arg("a", 0),
        )
        .output("outv");

    let mut audio_concat = FilterChain::new();
    for i in 0..segments.len() {
        audio_concat = audio_concat.input(format!("a{}", i));
    }
    audio_concat = audio_concat
        .filter(
            FilterSpec::new("concat")
                .arg("n", segments.len())
                .arg("v", 0)
                .arg("a", 1),
        )
        .output("outa");

    SegmentGraph {
        graph: graph.chain(video_concat).chain(audio_concat),
        video_out: "outv".to_string(),
        audio_out: "outa".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec_render() {
        let spec = FilterSpec::new("trim").arg("start", 10.0).arg("end", 12.5);
        assert_eq!(spec.render(), "trim=start=10:end=12.5");

        assert_eq!(FilterSpec::new("anull").render(), "anull");
    }

    #[test]
    fn test_silencedetect_render() {
        let spec = silencedetect(-30.0, 0.5);
        assert_eq!(spec.render(), "silencedetect=n=-30dB:d=0.5");
    }

    #[test]
    fn test_aresample_render() {
        assert_eq!(aresample_async().render(), "aresample=async=1");
    }

    #[test]
    fn test_chain_render() {
        let chain = FilterChain::new()
            .input("0:v")
            .filter(FilterSpec::new("trim").arg("start", 0).arg("end", 5))
            .filter(FilterSpec::new("setpts").arg("expr", "PTS-STARTPTS"))
            .output("v0");
        assert_eq!(chain.render(), "[0:v]trim=start=0:end=5,setpts=expr=PTS-STARTPTS[v0]");
    }

    #[test]
    fn test_single_segment_graph_has_no_concat() {
        let segments = vec![Segment::new(0.0, 300.0)];
        let sg = segment_trim_graph(&segments);
        let rendered = sg.graph.render();

        assert!(!rendered.contains("concat"));
        assert_eq!(sg.video_out, "v0");
        assert_eq!(sg.audio_out, "a0");
        assert!(rendered.contains("trim=start=0:end=300"));
        assert!(rendered.contains("atrim=start=0:end=300"));
    }

    #[test]
    fn test_multi_segment_graph_concats_in_order() {
        let segments = vec![
            Segment::new(0.0, 10.0),
            Segment::new(12.0, 60.0),
            Segment::new(65.0, 120.0),
        ];
        let sg = segment_trim_graph(&segments);
        let rendered = sg.graph.render();

        assert!(rendered.contains("[v0][v1][v2]concat=n=3:v=1:a=0[outv]"));
        assert!(rendered.contains("[a0][a1][a2]concat=n=3:v=0:a=1[outa]"));
        assert_eq!(sg.video_out, "outv");
        assert_eq!(sg.audio_out, "outa");

        // Timestamps reset to zero on every trimmed pad.
        assert_eq!(rendered.matches("setpts=expr=PTS-STARTPTS").count(), 3);
        assert_eq!(rendered.matches("asetpts=expr=PTS-STARTPTS").count(), 3);
    }
}
