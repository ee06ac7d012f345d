//! Terminal rendering of option trees and display nodes

use blinc_field::highlight::{render_marked, Highlighter};
use blinc_field::option::SelectOption;
use blinc_field::presenter::DisplayNode;

/// Render an option tree, one option per line, with `[matched]` keyword spans
pub fn option_tree(options: &[SelectOption], highlighter: &Highlighter) -> String {
    let mut out = String::new();
    write_options(&mut out, options, highlighter, 0);
    out
}

fn write_options(
    out: &mut String,
    options: &[SelectOption],
    highlighter: &Highlighter,
    depth: usize,
) {
    for option in options {
        let label = render_marked(&highlighter.segments(&option.label), "[", "]");
        out.push_str(&"  ".repeat(depth));
        if option.is_group() {
            out.push_str(&label);
            out.push_str(":\n");
            let nested: Vec<SelectOption> = option.descendants().cloned().collect();
            write_options(out, &nested, highlighter, depth + 1);
            continue;
        }
        out.push_str(&format!("{} = {}", option.value, label));
        if option.disabled == Some(true) {
            out.push_str(" (disabled)");
        }
        out.push('\n');
    }
}

/// Render a display node with its decorations spelled out
pub fn display_node(node: &DisplayNode) -> String {
    match node {
        DisplayNode::Status { status, child } => {
            format!("({}) {}", status.as_str(), display_node(child))
        }
        DisplayNode::Badge { color, child } => format!("<{}> {}", color, display_node(child)),
        DisplayNode::Spaced(nodes) => nodes
            .iter()
            .map(display_node)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blinc_field::presenter::StatusKind;
    use serde_json::json;

    #[test]
    fn test_option_tree() {
        let options = vec![
            SelectOption::group(
                "Fruit",
                vec![
                    SelectOption::new("banana", "Banana"),
                    SelectOption::new("plantain", "Plantain").disabled(),
                ],
            ),
            SelectOption::new(3, "Carrot"),
        ];
        let rendered = option_tree(&options, &Highlighter::new(&["an"]));
        assert_eq!(
            rendered,
            "Fruit:\n  banana = B[an][an]a\n  plantain = Pl[an]tain (disabled)\n3 = Carrot\n"
        );
    }

    #[test]
    fn test_display_node() {
        let node = DisplayNode::Spaced(vec![
            DisplayNode::status(StatusKind::Success, DisplayNode::text("Open")),
            DisplayNode::badge("red", DisplayNode::text("Hot")),
            DisplayNode::Raw(json!(5)),
        ]);
        assert_eq!(display_node(&node), "(Success) Open <red> Hot 5");
    }
}
