pub mod ast;
pub mod engine;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod render;
pub mod render_context;
pub mod tags;

pub use ast::{Interrupt, Node, Output, Tag, Variable};
pub use engine::{Template, render_template};
pub use parser::{Block, Document, Parser, parse};
pub use registry::{TagFactory, TagRegistry, register_tag};
pub use render::render_all;
pub use render_context::Context;
