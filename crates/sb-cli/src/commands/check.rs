use std::path::Path;

use colored::Colorize;
use sb_expr::{Diagnostic, render_diagnostic};

/// Validate a story file beyond what loading already enforces: every
/// condition expression must parse, and every choice must have a
/// resolvable target.
pub fn run(file: &Path) -> Result<(), String> {
    let graph = super::load_story(file)?;

    let mut problems = 0usize;

    for edge in graph.all_edges() {
        if let Some(condition) = &edge.condition
            && !condition.trim().is_empty()
            && let Err(err) = sb_expr::parser::parse(condition)
        {
            problems += 1;
            eprintln!(
                "{} condition on edge '{}':",
                "error:".red().bold(),
                edge.id
            );
            eprintln!(
                "  {}",
                render_diagnostic(condition, &Diagnostic::from(&err)).replace('\n', "\n  ")
            );
        }
    }

    for (node_id, node) in graph.all_nodes() {
        let Some(scene) = node.as_scene() else {
            continue;
        };
        for choice in &scene.choices {
            if let Some(condition) = &choice.condition
                && !condition.trim().is_empty()
                && let Err(err) = sb_expr::parser::parse(condition)
            {
                problems += 1;
                eprintln!(
                    "{} condition on choice '{}' in node '{}':",
                    "error:".red().bold(),
                    choice.id,
                    node_id
                );
                eprintln!(
                    "  {}",
                    render_diagnostic(condition, &Diagnostic::from(&err)).replace('\n', "\n  ")
                );
            }
            if choice.target.is_none() && graph.choice_edge_for(node_id, &choice.id).is_none() {
                problems += 1;
                eprintln!(
                    "{} choice '{}' in node '{}' has no target and no choice edge",
                    "error:".red().bold(),
                    choice.id,
                    node_id
                );
            }
        }
    }

    if problems > 0 {
        return Err(format!(
            "{problems} problem{} found",
            if problems == 1 { "" } else { "s" }
        ));
    }

    println!("  All checks passed for '{}'.", graph.meta().title);
    println!(
        "  {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(())
}
