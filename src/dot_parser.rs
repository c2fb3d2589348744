use winnow::ascii::multispace0;
use winnow::combinator::{alt, eof, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, take_till, take_until, take_while};

use crate::error::RenderingError;
use crate::graph_ast::*;

type Attrs = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, PartialEq)]
enum Stmt {
    Attr(Target, Attrs),
    Assign(String, String),
    Subgraph(Option<String>, Vec<Stmt>),
    Node(String, Attrs),
    Edge(Vec<String>, Attrs),
}

/// Reads a `digraph` description back into a [`Graph`].
///
/// Only the constructs [`crate::dot_writer::write_dot`] produces are
/// understood, plus comments, attribute assignments and edge chains.
/// Edges do not declare nodes implicitly; an undeclared endpoint surfaces
/// later as a dangling edge.
pub fn parse_dot(input: &str) -> Result<Graph, RenderingError> {
    let mut rest = input;
    let (comments, name, stmts) = document(&mut rest).map_err(|_| syntax_error(input, rest))?;

    let mut graph = Graph::new(name.unwrap_or_else(|| "G".to_string()));
    if !comments.is_empty() {
        graph.comment = Some(comments.join("\n"));
    }
    for stmt in stmts {
        apply_top_level(&mut graph, stmt)?;
    }
    Ok(graph)
}

fn syntax_error(full: &str, rest: &str) -> RenderingError {
    let consumed = full.len() - rest.len();
    let line = full[..consumed].matches('\n').count() + 1;
    let context = rest.lines().next().unwrap_or("").trim();
    if context.is_empty() {
        return RenderingError::Syntax(format!("line {line}: unexpected end of input"));
    }
    let context_display = if context.chars().count() > 40 {
        format!("{}...", context.chars().take(40).collect::<String>())
    } else {
        context.to_string()
    };
    RenderingError::Syntax(format!("line {line}: unexpected `{context_display}`"))
}

// -----------------------------------------------------------------------------
// Grammar
// -----------------------------------------------------------------------------

fn document(input: &mut &str) -> winnow::Result<(Vec<String>, Option<String>, Vec<Stmt>)> {
    let comments = leading_comments(input)?;
    keyword("digraph").parse_next(input)?;
    trivia(input)?;
    let name = opt(node_id).parse_next(input)?;
    trivia(input)?;
    "{".parse_next(input)?;
    let stmts = stmt_list(input)?;
    "}".parse_next(input)?;
    trivia(input)?;
    eof.parse_next(input)?;
    Ok((comments, name, stmts))
}

fn leading_comments(input: &mut &str) -> winnow::Result<Vec<String>> {
    let mut comments = Vec::new();
    loop {
        multispace0.parse_next(input)?;
        if input.starts_with("//") {
            "//".parse_next(input)?;
            let text = take_till(0.., |c: char| c == '\n').parse_next(input)?;
            comments.push(text.trim().to_string());
        } else if input.starts_with('#') {
            take_till(0.., |c: char| c == '\n').parse_next(input)?;
        } else if input.starts_with("/*") {
            block_comment(input)?;
        } else {
            return Ok(comments);
        }
    }
}

/// Whitespace and `//`, `#` and `/* */` comments.
fn trivia(input: &mut &str) -> winnow::Result<()> {
    loop {
        multispace0.parse_next(input)?;
        if input.starts_with("//") || input.starts_with('#') {
            take_till(0.., |c: char| c == '\n').parse_next(input)?;
        } else if input.starts_with("/*") {
            block_comment(input)?;
        } else {
            return Ok(());
        }
    }
}

fn block_comment(input: &mut &str) -> winnow::Result<()> {
    "/*".parse_next(input)?;
    take_until(0.., "*/").parse_next(input)?;
    "*/".parse_next(input)?;
    Ok(())
}

fn stmt_list(input: &mut &str) -> winnow::Result<Vec<Stmt>> {
    let mut stmts = Vec::new();
    loop {
        trivia(input)?;
        if input.is_empty() || input.starts_with('}') {
            return Ok(stmts);
        }

        let start = *input;
        if opt(keyword("subgraph")).parse_next(input)?.is_some() {
            // Errors inside the body keep pointing at the offending inner line.
            stmts.push(subgraph_body(input)?);
        } else {
            match statement.parse_next(input) {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    *input = start;
                    return Err(e);
                }
            }
        }

        trivia(input)?;
        opt(";").parse_next(input)?;
    }
}

fn subgraph_body(input: &mut &str) -> winnow::Result<Stmt> {
    trivia(input)?;
    let id = opt(node_id).parse_next(input)?;
    trivia(input)?;
    "{".parse_next(input)?;
    let inner = stmt_list(input)?;
    "}".parse_next(input)?;
    Ok(Stmt::Subgraph(id, inner))
}

fn statement(input: &mut &str) -> winnow::Result<Stmt> {
    let target = opt(alt((
        keyword("graph").value(Target::Graph),
        keyword("node").value(Target::Node),
        keyword("edge").value(Target::Edge),
    )))
    .parse_next(input)?;
    if let Some(target) = target {
        let attrs = attr_lists(input)?;
        return Ok(Stmt::Attr(target, attrs));
    }

    let first = node_id.parse_next(input)?;

    if opt((trivia, "=")).parse_next(input)?.is_some() {
        trivia(input)?;
        let value = node_id.parse_next(input)?;
        return Ok(Stmt::Assign(first, value));
    }

    let mut chain = vec![first];
    while opt((trivia, "->")).parse_next(input)?.is_some() {
        trivia(input)?;
        chain.push(node_id.parse_next(input)?);
    }

    let attrs = attr_lists(input)?;
    if chain.len() == 1 {
        let id = chain.remove(0);
        Ok(Stmt::Node(id, attrs))
    } else {
        Ok(Stmt::Edge(chain, attrs))
    }
}

fn attr_lists(input: &mut &str) -> winnow::Result<Attrs> {
    let mut attrs = Vec::new();
    while opt((trivia, "[")).parse_next(input)?.is_some() {
        loop {
            trivia(input)?;
            if opt("]").parse_next(input)?.is_some() {
                break;
            }
            let key = node_id.parse_next(input)?;
            trivia(input)?;
            "=".parse_next(input)?;
            trivia(input)?;
            let value = node_id.parse_next(input)?;
            attrs.push((key, value));
            trivia(input)?;
            opt(alt((",", ";"))).parse_next(input)?;
        }
    }
    Ok(attrs)
}

fn keyword<'s>(kw: &'static str) -> impl Parser<&'s str, (), ContextError> {
    identifier.verify(move |word: &str| word.eq_ignore_ascii_case(kw)).void()
}

fn node_id(input: &mut &str) -> winnow::Result<String> {
    alt((quoted_string, identifier.map(|s: &str| s.to_string()))).parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '.').parse_next(input)
}

fn quoted_string(input: &mut &str) -> winnow::Result<String> {
    "\"".parse_next(input)?;
    let mut text = String::new();
    loop {
        let ch: char = any.parse_next(input)?;
        match ch {
            '"' => return Ok(text),
            '\\' => {
                let escaped: char = any.parse_next(input)?;
                match escaped {
                    'n' | 'l' | 'r' => text.push('\n'),
                    '"' => text.push('"'),
                    '\\' => text.push('\\'),
                    // line continuation
                    '\n' => {}
                    other => {
                        text.push('\\');
                        text.push(other);
                    }
                }
            }
            other => text.push(other),
        }
    }
}

// -----------------------------------------------------------------------------
// Statements -> Graph
// -----------------------------------------------------------------------------

fn apply_top_level(graph: &mut Graph, stmt: Stmt) -> Result<(), RenderingError> {
    match stmt {
        Stmt::Attr(Target::Graph, attrs) => apply_graph_attrs(graph, &attrs),
        Stmt::Assign(key, value) => apply_graph_attrs(graph, &[(key, value)]),
        Stmt::Attr(Target::Node, attrs) => {
            for (key, value) in &attrs {
                match key.as_str() {
                    "shape" => graph.default_shape = Some(parse_shape(value)?),
                    "style" => graph.default_style = parse_style(value)?,
                    _ => log::debug!("ignoring default node attribute {key}={value}"),
                }
            }
            Ok(())
        }
        Stmt::Attr(Target::Edge, attrs) => {
            for (key, value) in &attrs {
                log::debug!("ignoring default edge attribute {key}={value}");
            }
            Ok(())
        }
        Stmt::Node(id, attrs) => upsert_node(&mut graph.nodes, id, &attrs),
        Stmt::Edge(chain, attrs) => {
            push_edges(&mut graph.edges, &chain, &attrs);
            Ok(())
        }
        Stmt::Subgraph(id, inner) => {
            let id = id.unwrap_or_else(|| format!("cluster_{}", graph.clusters.len()));
            let cluster = build_cluster(id, inner, &mut graph.edges)?;
            graph.clusters.push(cluster);
            Ok(())
        }
    }
}

fn build_cluster(
    id: String,
    stmts: Vec<Stmt>,
    edges: &mut Vec<Edge>,
) -> Result<Cluster, RenderingError> {
    let mut cluster = Cluster::new(id, "");
    for stmt in stmts {
        match stmt {
            Stmt::Attr(Target::Graph, attrs) => apply_cluster_attrs(&mut cluster, &attrs)?,
            Stmt::Assign(key, value) => apply_cluster_attrs(&mut cluster, &[(key, value)])?,
            Stmt::Attr(_, attrs) => {
                for (key, value) in &attrs {
                    log::debug!("ignoring attribute {key}={value} inside {}", cluster.id);
                }
            }
            Stmt::Node(node_id, attrs) => upsert_node(&mut cluster.nodes, node_id, &attrs)?,
            Stmt::Edge(chain, attrs) => push_edges(edges, &chain, &attrs),
            Stmt::Subgraph(inner, _) => {
                return Err(RenderingError::Syntax(format!(
                    "nested subgraph `{}` inside `{}` is not supported",
                    inner.unwrap_or_default(),
                    cluster.id
                )));
            }
        }
    }
    Ok(cluster)
}

fn apply_graph_attrs(graph: &mut Graph, attrs: &[(String, String)]) -> Result<(), RenderingError> {
    for (key, value) in attrs {
        match key.as_str() {
            "rankdir" => {
                graph.direction =
                    Direction::from_dot(value).ok_or_else(|| invalid(key, value))?;
            }
            "label" => graph.title = Some(value.clone()),
            "labelloc" => {
                graph.title_loc = LabelLoc::from_dot(value).ok_or_else(|| invalid(key, value))?;
            }
            "fontsize" => {
                graph.font.title_size = value.parse().map_err(|_| invalid(key, value))?;
            }
            "fontname" => graph.font.family = value.clone(),
            _ => log::debug!("ignoring graph attribute {key}={value}"),
        }
    }
    Ok(())
}

fn apply_cluster_attrs(
    cluster: &mut Cluster,
    attrs: &[(String, String)],
) -> Result<(), RenderingError> {
    for (key, value) in attrs {
        match key.as_str() {
            "label" => cluster.label = value.clone(),
            "style" => cluster.style = parse_style(value)?,
            "color" => cluster.color = Some(value.clone()),
            _ => log::debug!("ignoring attribute {key}={value} on {}", cluster.id),
        }
    }
    Ok(())
}

/// Repeated declarations of one node merge, later attributes winning.
fn upsert_node(nodes: &mut Vec<Node>, id: String, attrs: &Attrs) -> Result<(), RenderingError> {
    let index = match nodes.iter().position(|n| n.id == id) {
        Some(index) => index,
        None => {
            nodes.push(Node::new(id.clone(), id));
            nodes.len() - 1
        }
    };
    let node = &mut nodes[index];
    for (key, value) in attrs {
        match key.as_str() {
            "label" => node.label = value.clone(),
            "shape" => node.shape = Some(parse_shape(value)?),
            "fillcolor" => node.fill_color = Some(value.clone()),
            "style" => node.style = parse_style(value)?,
            _ => log::debug!("ignoring attribute {key}={value} on node {}", node.id),
        }
    }
    Ok(())
}

fn push_edges(edges: &mut Vec<Edge>, chain: &[String], attrs: &Attrs) {
    let label = attrs
        .iter()
        .rev()
        .find(|(key, _)| key == "label")
        .map(|(_, value)| value.clone());
    for pair in chain.windows(2) {
        edges.push(Edge {
            from: pair[0].clone(),
            to: pair[1].clone(),
            label: label.clone(),
        });
    }
}

fn parse_shape(value: &str) -> Result<NodeShape, RenderingError> {
    NodeShape::from_dot(value).ok_or_else(|| invalid("shape", value))
}

fn parse_style(value: &str) -> Result<Vec<StyleFlag>, RenderingError> {
    StyleFlag::parse_list(value).ok_or_else(|| invalid("style", value))
}

fn invalid(attribute: &str, value: &str) -> RenderingError {
    RenderingError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}
