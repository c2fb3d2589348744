use std::fmt::Write;

use crate::graph_ast::*;

const INDENT: &str = "    ";

pub fn write_dot(graph: &Graph) -> String {
    let mut out = String::new();

    if let Some(comment) = &graph.comment {
        for line in comment.lines() {
            let _ = writeln!(out, "// {line}");
        }
    }
    let _ = writeln!(out, "digraph {} {{", id(&graph.name));

    let mut graph_attrs = vec![("rankdir", bare(graph.direction.as_dot()))];
    if let Some(title) = &graph.title {
        graph_attrs.push(("label", quoted(title)));
        graph_attrs.push(("labelloc", bare(graph.title_loc.as_dot())));
    }
    graph_attrs.push(("fontsize", graph.font.title_size.to_string()));
    graph_attrs.push(("fontname", quoted(&graph.font.family)));
    write_attr_stmt(&mut out, 1, "graph", &graph_attrs);

    let mut node_attrs = Vec::new();
    if let Some(shape) = graph.default_shape {
        node_attrs.push(("shape", bare(shape.as_dot())));
    }
    if !graph.default_style.is_empty() {
        node_attrs.push(("style", quoted(&StyleFlag::join(&graph.default_style))));
    }
    node_attrs.push(("fontname", quoted(&graph.font.family)));
    write_attr_stmt(&mut out, 1, "node", &node_attrs);
    write_attr_stmt(&mut out, 1, "edge", &[("fontname", quoted(&graph.font.family))]);

    for cluster in &graph.clusters {
        out.push('\n');
        write_cluster(&mut out, cluster, &graph.font);
    }

    if !graph.nodes.is_empty() {
        out.push('\n');
    }
    for node in &graph.nodes {
        write_node(&mut out, 1, node);
    }

    if !graph.edges.is_empty() {
        out.push('\n');
    }
    for edge in &graph.edges {
        write_edge(&mut out, edge);
    }

    out.push_str("}\n");
    out
}

fn write_cluster(out: &mut String, cluster: &Cluster, font: &Font) {
    let _ = writeln!(out, "{INDENT}subgraph {} {{", id(&cluster_id(&cluster.id)));

    let mut attrs = vec![("label", quoted(&cluster.label))];
    if !cluster.style.is_empty() {
        attrs.push(("style", quoted(&StyleFlag::join(&cluster.style))));
    }
    if let Some(color) = &cluster.color {
        attrs.push(("color", quoted(color)));
    }
    attrs.push(("fontname", quoted(&font.family)));
    write_attr_stmt(out, 2, "graph", &attrs);

    for node in &cluster.nodes {
        write_node(out, 2, node);
    }
    let _ = writeln!(out, "{INDENT}}}");
}

fn write_node(out: &mut String, depth: usize, node: &Node) {
    let mut attrs = vec![("label", quoted(&node.label))];
    if let Some(shape) = node.shape {
        attrs.push(("shape", bare(shape.as_dot())));
    }
    if let Some(fill) = &node.fill_color {
        attrs.push(("fillcolor", quoted(fill)));
    }
    if !node.style.is_empty() {
        attrs.push(("style", quoted(&StyleFlag::join(&node.style))));
    }
    write_attr_stmt(out, depth, &id(&node.id), &attrs);
}

fn write_edge(out: &mut String, edge: &Edge) {
    let head = format!("{} -> {}", id(&edge.from), id(&edge.to));
    match &edge.label {
        Some(label) => write_attr_stmt(out, 1, &head, &[("label", quoted(label))]),
        None => {
            let _ = writeln!(out, "{INDENT}{head};");
        }
    }
}

fn write_attr_stmt(out: &mut String, depth: usize, head: &str, attrs: &[(&str, String)]) {
    let list = attrs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "{}{head} [{list}];", INDENT.repeat(depth));
}

/// Graphviz only draws a box around subgraphs whose name starts with `cluster`.
pub fn cluster_id(raw: &str) -> String {
    if raw.starts_with("cluster") {
        raw.to_string()
    } else {
        format!("cluster_{raw}")
    }
}

fn bare(value: &str) -> String {
    value.to_string()
}

fn id(raw: &str) -> String {
    if is_plain_id(raw) {
        raw.to_string()
    } else {
        quoted(raw)
    }
}

pub(crate) fn is_plain_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
