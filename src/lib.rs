pub mod architecture;
pub mod dot_parser;
pub mod dot_writer;
pub mod error;
pub mod graph_ast;
pub mod renderer;

pub use architecture::build_graph;
pub use error::RenderingError;
pub use renderer::{DEFAULT_BASENAME, DiagramRenderer, GraphvizRenderer, OutputFormat, RenderRequest};
