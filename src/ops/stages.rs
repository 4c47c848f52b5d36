/// A named phase of a Pioneer run, recognized from its output by keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    pub key: &'static str,
    pub label: &'static str,
    /// Lower-case substrings that signal entry into this stage. An empty list
    /// never matches; the first stage is entered at launch.
    pub keywords: &'static [&'static str],
}

pub const BUILD_STAGES: [StageInfo; 5] = [
    StageInfo {
        key: "starting",
        label: "Starting Pioneer",
        keywords: &[],
    },
    StageInfo {
        key: "prepare",
        label: "Preparing inputs",
        keywords: &["reading", "loading", "prepare", "initializing"],
    },
    StageInfo {
        key: "predict",
        label: "Predicting spectral library",
        keywords: &[
            "predict",
            "altimeter",
            "model",
            "generating",
            "writing predicted",
        ],
    },
    StageInfo {
        key: "write",
        label: "Writing spectral library",
        keywords: &["writing", "saving", "export"],
    },
    StageInfo {
        key: "complete",
        label: "Completed",
        keywords: &["complete", "finished", "success"],
    },
];

pub const SEARCH_STAGES: [StageInfo; 7] = [
    StageInfo {
        key: "starting",
        label: "Starting Pioneer",
        keywords: &[],
    },
    StageInfo {
        key: "prepare",
        label: "Preparing inputs",
        keywords: &["reading", "loading", "preparing", "initializing"],
    },
    StageInfo {
        key: "presearch",
        label: "Tuning search parameters",
        keywords: &["presearch", "tuning", "estimating"],
    },
    StageInfo {
        key: "first",
        label: "Running first pass search",
        keywords: &["first search", "index search", "first pass"],
    },
    StageInfo {
        key: "quant",
        label: "Running quantification search",
        keywords: &["quant", "quantification", "scoring"],
    },
    StageInfo {
        key: "finishing",
        label: "Finalizing results",
        keywords: &["writing results", "post-processing", "saving"],
    },
    StageInfo {
        key: "complete",
        label: "Completed",
        keywords: &["complete", "finished", "success"],
    },
];

/// Index of the first stage after `current` whose keywords occur in `line`
/// (case-insensitive). Stages never move backwards, but may skip ahead.
pub fn match_stage(line: &str, current: usize, stages: &[StageInfo]) -> Option<usize> {
    let normalized = line.to_lowercase();
    stages
        .iter()
        .enumerate()
        .skip(current + 1)
        .find(|(_, stage)| stage.keywords.iter().any(|kw| normalized.contains(kw)))
        .map(|(idx, _)| idx)
}

/// Percent complete when at stage `index` of `count`
pub fn progress_percent(index: usize, count: usize) -> f32 {
    if count <= 1 {
        100.0
    } else {
        (index.min(count - 1) as f32 / (count - 1) as f32) * 100.0
    }
}
