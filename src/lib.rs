//! Block parsing and rendering core of a Liquid-style template language.

pub mod data;
pub mod error;
pub mod models;
pub mod tpl;

pub use error::{Error, ErrorKind, SyntaxError};
pub use models::options::TemplateOptions;
pub use tpl::{Context, Template, render_template};
