use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

mod common;

use common::lock_engines;
use modgraph::graph_ast::Edge;
use modgraph::{
    DEFAULT_BASENAME, DiagramRenderer, GraphvizRenderer, OutputFormat, RenderRequest,
    RenderingError, build_graph,
};

fn request_in(dir: &Path) -> RenderRequest {
    RenderRequest {
        directory: dir.to_path_buf(),
        ..RenderRequest::default()
    }
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Failures that never reach an engine
// =============================================================================

#[test]
fn missing_engine_is_rendering_error() {
    let dir = TempDir::new().unwrap();
    let renderer = GraphvizRenderer::new("modgraph-no-such-layout-engine");
    let err = renderer
        .render(&build_graph(), &request_in(dir.path()))
        .unwrap_err();
    assert!(matches!(err, RenderingError::EngineNotFound { .. }), "got {err:?}");
    assert!(err.to_string().contains("modgraph-no-such-layout-engine"));
    assert!(entries(dir.path()).is_empty(), "nothing written");
}

#[test]
fn dangling_edge_is_rendering_error() {
    let dir = TempDir::new().unwrap();
    let mut graph = build_graph();
    graph.edges.push(Edge::labeled("gateway", "cache", "lookup"));
    let err = GraphvizRenderer::default()
        .render(&graph, &request_in(dir.path()))
        .unwrap_err();
    assert!(matches!(err, RenderingError::DanglingEdge { .. }), "got {err:?}");
    assert!(entries(dir.path()).is_empty(), "nothing written");
}

// =============================================================================
// Fake engines
// =============================================================================

#[cfg(unix)]
mod fake_engine {
    use super::*;
    use crate::common::{COPYING_ENGINE, install};
    use pretty_assertions::assert_eq;

    #[test]
    fn successful_render_writes_final_file_only() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let engine = install(bin.path(), COPYING_ENGINE);

        let renderer = GraphvizRenderer::new(engine.to_string_lossy());
        let path = renderer
            .render(&build_graph(), &request_in(out.path()))
            .unwrap();

        assert_eq!(path, out.path().join(format!("{DEFAULT_BASENAME}.png")));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("// Credit Management System Architecture"));
        assert_eq!(entries(out.path()), vec![format!("{DEFAULT_BASENAME}.png")]);
    }

    #[test]
    fn keep_source_leaves_description_next_to_image() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let engine = install(bin.path(), COPYING_ENGINE);

        let request = RenderRequest {
            basename: "arch".to_string(),
            format: OutputFormat::Svg,
            cleanup: false,
            ..request_in(out.path())
        };
        GraphvizRenderer::new(engine.to_string_lossy())
            .render(&build_graph(), &request)
            .unwrap();

        assert_eq!(entries(out.path()), vec!["arch".to_string(), "arch.svg".to_string()]);
        let source = fs::read_to_string(out.path().join("arch")).unwrap();
        assert_eq!(modgraph::dot_parser::parse_dot(&source).unwrap(), build_graph());
    }

    #[test]
    fn engine_receives_format_flag() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let engine = install(
            bin.path(),
            r#"fmt="$1"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; shift; fi
  shift
done
cat > /dev/null
printf '%s' "$fmt" > "$out""#,
        );

        let request = RenderRequest {
            format: OutputFormat::Pdf,
            ..request_in(out.path())
        };
        let path = GraphvizRenderer::new(engine.to_string_lossy())
            .render(&build_graph(), &request)
            .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "-Tpdf");
    }

    #[test]
    fn failing_engine_leaves_no_output() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let engine = install(
            bin.path(),
            "cat > /dev/null\necho 'Error: syntax error in line 1' >&2\nexit 3",
        );

        let err = GraphvizRenderer::new(engine.to_string_lossy())
            .render(&build_graph(), &request_in(out.path()))
            .unwrap_err();
        match &err {
            RenderingError::EngineFailed { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("syntax error"), "got: {stderr}");
            }
            other => panic!("expected engine failure, got {other:?}"),
        }
        assert!(entries(out.path()).is_empty(), "staging file removed");
    }

    #[test]
    fn failing_engine_does_not_replace_previous_image() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let previous = out.path().join(format!("{DEFAULT_BASENAME}.png"));
        fs::write(&previous, "old image").unwrap();
        let engine = install(bin.path(), "exit 1");

        let err = GraphvizRenderer::new(engine.to_string_lossy())
            .render(&build_graph(), &request_in(out.path()))
            .unwrap_err();
        assert!(matches!(err, RenderingError::EngineFailed { .. }), "got {err:?}");
        assert_eq!(fs::read_to_string(&previous).unwrap(), "old image");
        assert_eq!(entries(out.path()), vec![format!("{DEFAULT_BASENAME}.png")]);
    }

    #[test]
    fn empty_output_is_rendering_error() {
        let _guard = lock_engines();
        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let engine = install(bin.path(), "cat > /dev/null\nexit 0");

        let err = GraphvizRenderer::new(engine.to_string_lossy())
            .render(&build_graph(), &request_in(out.path()))
            .unwrap_err();
        assert!(matches!(err, RenderingError::EmptyOutput { .. }), "got {err:?}");
        assert!(entries(out.path()).is_empty());
    }
}

// =============================================================================
// Real Graphviz, when installed
// =============================================================================

#[test]
fn graphviz_renders_non_empty_png() {
    let _guard = lock_engines();
    if which::which("dot").is_err() {
        eprintln!("skipping: Graphviz `dot` not on PATH");
        return;
    }
    let dir = TempDir::new().unwrap();
    let path = GraphvizRenderer::default()
        .render(&build_graph(), &request_in(dir.path()))
        .unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..4], b"\x89PNG", "PNG signature");
}
