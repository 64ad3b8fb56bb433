pub mod check;
pub mod info;
pub mod play;

use std::path::Path;

use sb_graph::StoryGraph;

/// Load and structurally validate a story file.
pub fn load_story(file: &Path) -> Result<StoryGraph, String> {
    let source = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    StoryGraph::from_json(&source).map_err(|e| e.to_string())
}
