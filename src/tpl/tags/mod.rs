//! Standard tags shipped with the engine.

mod comment;
mod condition;
mod for_tag;
mod if_tag;
mod interrupts;

use crate::tpl::registry::TagRegistry;

pub use comment::CommentTag;
pub use for_tag::ForTag;
pub use if_tag::IfTag;
pub use interrupts::InterruptTag;

pub(crate) fn register_standard_tags(registry: &TagRegistry) {
    registry.register("if", IfTag::parse);
    registry.register("for", ForTag::parse);
    registry.register("comment", CommentTag::parse);
    registry.register("break", InterruptTag::parse);
    registry.register("continue", InterruptTag::parse);
}
