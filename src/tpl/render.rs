use crate::error::Error;
use crate::tpl::ast::{Node, Output};
use crate::tpl::render_context::Context;
use tracing::trace;

/// Renders a node list in order.
///
/// Stops at the first pending interrupt. Recoverable errors are replaced by
/// their inline message and recorded on the context; fatal ones propagate.
pub fn render_all(nodes: &[Node], ctx: &mut Context<'_>) -> Result<String, Error> {
    let mut out = String::new();

    for node in nodes {
        if ctx.has_interrupt() {
            break;
        }

        let rendered = match node {
            Node::Text(t) => {
                out.push_str(t);
                continue;
            }
            Node::Variable(v) => v.render(ctx).map(Output::Emitted),
            Node::Tag { name, tag } => {
                trace!(tag = name.as_str(), "render tag");
                tag.render(ctx)
            }
        };

        match rendered {
            Ok(Output::Emitted(s)) => out.push_str(&s),
            Ok(Output::Interrupt(interrupt)) => {
                ctx.push_interrupt(interrupt);
                break;
            }
            Err(e) if e.is_recoverable() => {
                let message = ctx.handle_error(e);
                out.push_str(&message);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(out)
}
