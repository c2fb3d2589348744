use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::dot_writer::write_dot;
use crate::error::RenderingError;
use crate::graph_ast::Graph;

pub const DEFAULT_BASENAME: &str = "system_function_module_diagram";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Pdf,
    Jpg,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Gif => "gif",
        }
    }
}

/// Where and how a diagram should land on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub directory: PathBuf,
    pub basename: String,
    pub format: OutputFormat,
    /// Discard the intermediate DOT source once rendering is done.
    pub cleanup: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            basename: DEFAULT_BASENAME.to_string(),
            format: OutputFormat::default(),
            cleanup: true,
        }
    }
}

impl RenderRequest {
    pub fn output_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.basename, self.format.extension()))
    }

    pub fn source_path(&self) -> PathBuf {
        self.directory.join(&self.basename)
    }
}

/// Turns a graph description into an image file.
pub trait DiagramRenderer {
    fn render(&self, graph: &Graph, request: &RenderRequest) -> Result<PathBuf, RenderingError>;
}

/// Renders through a Graphviz layout program (`dot` unless told otherwise).
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    engine: String,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    /// `engine` is either a program name looked up on `PATH` or a path.
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    fn locate(&self) -> Result<PathBuf, RenderingError> {
        which::which(&self.engine).map_err(|source| RenderingError::EngineNotFound {
            engine: self.engine.clone(),
            source,
        })
    }
}

impl DiagramRenderer for GraphvizRenderer {
    fn render(&self, graph: &Graph, request: &RenderRequest) -> Result<PathBuf, RenderingError> {
        graph.validate()?;
        let source = write_dot(graph);
        let engine = self.locate()?;

        if !request.cleanup {
            let source_path = request.source_path();
            fs::write(&source_path, &source).map_err(|e| RenderingError::io(&source_path, e))?;
            log::info!("kept graph description at {}", source_path.display());
        }

        let output_path = request.output_path();
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}-", request.basename))
            .suffix(&format!(".{}", request.format.extension()))
            .tempfile_in(&request.directory)
            .map_err(|e| RenderingError::io(&request.directory, e))?;

        run_engine(&engine, &source, request.format, staging.path())?;

        let size = staging
            .as_file()
            .metadata()
            .map_err(|e| RenderingError::io(staging.path(), e))?
            .len();
        if size == 0 {
            log::warn!("discarding empty output from {}", engine.display());
            return Err(RenderingError::EmptyOutput {
                format: request.format.extension().to_string(),
            });
        }

        staging
            .persist(&output_path)
            .map_err(|e| RenderingError::io(&output_path, e.error))?;
        log::info!("wrote {} ({size} bytes)", output_path.display());
        Ok(output_path)
    }
}

fn run_engine(
    engine: &Path,
    source: &str,
    format: OutputFormat,
    target: &Path,
) -> Result<(), RenderingError> {
    let mut command = Command::new(engine);
    command
        .arg(format!("-T{}", format.extension()))
        .arg("-o")
        .arg(target)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    log::debug!("running {command:?}");

    let launch_error = |source| RenderingError::EngineLaunch {
        path: engine.to_path_buf(),
        source,
    };

    let mut child = command.spawn().map_err(launch_error)?;
    if let Some(mut stdin) = child.stdin.take() {
        // An engine that bails out early closes its end; its exit status tells why.
        if let Err(e) = stdin.write_all(source.as_bytes()) {
            if e.kind() != ErrorKind::BrokenPipe {
                abandon(&mut child);
                return Err(launch_error(e));
            }
        }
    }

    let output = child.wait_with_output().map_err(launch_error)?;
    if !output.status.success() {
        log::warn!("layout engine failed, discarding {}", target.display());
        return Err(RenderingError::EngineFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Kills and reaps an engine we stopped talking to.
fn abandon(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("layout engine already gone: {e}");
    }
    if let Err(e) = child.wait() {
        log::warn!("failed to reap layout engine: {e}");
    }
}
