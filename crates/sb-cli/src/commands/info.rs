use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use sb_graph::StoryNode;

pub fn run(file: &Path) -> Result<(), String> {
    let graph = super::load_story(file)?;
    let meta = graph.meta();

    let mut scenes = 0usize;
    let mut dialogue_lines = 0usize;
    let mut choice_count = 0usize;
    let mut endings: Vec<(String, Option<String>)> = Vec::new();
    for (id, node) in graph.all_nodes() {
        match node {
            StoryNode::Start => {}
            StoryNode::Scene(scene) => {
                scenes += 1;
                dialogue_lines += scene.dialogues.len();
                choice_count += scene.choices.len();
            }
            StoryNode::End(end) => {
                endings.push((id.as_str().to_string(), end.ending_type.clone()));
            }
        }
    }
    endings.sort();

    println!("  {}", meta.title);
    if !meta.description.is_empty() {
        println!("  {}", meta.description);
    }
    if !meta.authors.is_empty() {
        println!("  by {}", meta.authors.join(", "));
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Count"]);
    table.add_row(vec!["Nodes".to_string(), graph.node_count().to_string()]);
    table.add_row(vec!["Scenes".to_string(), scenes.to_string()]);
    table.add_row(vec!["Endings".to_string(), endings.len().to_string()]);
    table.add_row(vec!["Edges".to_string(), graph.edge_count().to_string()]);
    table.add_row(vec!["Dialogue lines".to_string(), dialogue_lines.to_string()]);
    table.add_row(vec!["Choices".to_string(), choice_count.to_string()]);
    println!("{table}");

    if !endings.is_empty() {
        println!();
        for (id, ending_type) in endings {
            println!(
                "  ending '{}' ({})",
                id,
                ending_type.as_deref().unwrap_or("untyped")
            );
        }
    }

    Ok(())
}
