use std::path::PathBuf;

use clap::Parser;
use modgraph::graph_ast::Graph;
use modgraph::{
    DEFAULT_BASENAME, DiagramRenderer, GraphvizRenderer, OutputFormat, RenderRequest,
    RenderingError,
};

#[derive(Parser)]
#[command(
    name = "modgraph",
    about = "Render the credit platform's system function module diagram with Graphviz"
)]
struct Cli {
    /// Output file name without extension
    #[arg(long, short = 'o', default_value = DEFAULT_BASENAME)]
    output: String,

    /// Image format written by the layout engine
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Directory the files are written to
    #[arg(long, short = 'd', default_value = ".")]
    out_dir: PathBuf,

    /// Keep the intermediate DOT source next to the image
    #[arg(long)]
    keep_source: bool,

    /// Layout program name or path
    #[arg(long, env = "MODGRAPH_ENGINE", default_value = "dot")]
    engine: String,

    /// Font family for titles, nodes and edges
    #[arg(long, env = "MODGRAPH_FONT")]
    font: Option<String>,

    /// Render this DOT file instead of the built-in diagram
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Print the DOT source to stdout instead of rendering
    #[arg(long)]
    print_source: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(Some(path)) => {
            println!(
                "System function module diagram '{}' has been generated.",
                path.display()
            );
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<Option<PathBuf>, RenderingError> {
    let mut graph = load_graph(cli)?;
    if let Some(font) = &cli.font {
        graph.font.family = font.clone();
    }

    if cli.print_source {
        graph.validate()?;
        print!("{}", modgraph::dot_writer::write_dot(&graph));
        return Ok(None);
    }

    let request = RenderRequest {
        directory: cli.out_dir.clone(),
        basename: cli.output.clone(),
        format: cli.format,
        cleanup: !cli.keep_source,
    };
    let renderer = GraphvizRenderer::new(cli.engine.clone());
    log::debug!("rendering with {} into {}", renderer.engine(), request.output_path().display());
    renderer.render(&graph, &request).map(Some)
}

fn load_graph(cli: &Cli) -> Result<Graph, RenderingError> {
    match &cli.input {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| RenderingError::Io {
                path: path.clone(),
                source,
            })?;
            modgraph::dot_parser::parse_dot(&text)
        }
        None => Ok(modgraph::build_graph()),
    }
}
