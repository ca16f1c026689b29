use crate::error::Error;
use crate::tpl::ast::Tag;
use crate::tpl::parser::Parser;
use crate::tpl::tags;
use dashmap::DashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Builds a tag from `(name, markup, parser)`. Block tags call back into
/// [`Parser::parse_block`] to consume their body.
pub type TagFactory =
    Arc<dyn Fn(&str, &str, &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> + Send + Sync>;

/// Tag name to factory mapping consulted by the block parser.
#[derive(Default)]
pub struct TagRegistry {
    tags: DashMap<String, TagFactory>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `if`, `for`, `break`, `continue` and `comment`.
    pub fn with_standard_tags() -> Self {
        let registry = Self::new();
        tags::register_standard_tags(&registry);
        registry
    }

    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn(&str, &str, &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> + Send + Sync + 'static,
    {
        debug!(tag = name, "register tag");
        self.tags.insert(name.to_string(), Arc::new(factory));
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.tags.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// The factory is cloned out so no map guard is held while it parses.
    pub fn lookup(&self, name: &str) -> Option<TagFactory> {
        self.tags.get(name).map(|f| f.value().clone())
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.tags.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}

/// 全局标签注册表
static TAGS: LazyLock<TagRegistry> = LazyLock::new(TagRegistry::with_standard_tags);

pub fn global() -> &'static TagRegistry {
    &TAGS
}

/// Registers a tag with the process-wide registry used by [`crate::Template::parse`].
pub fn register_tag<F>(name: &str, factory: F)
where
    F: Fn(&str, &str, &mut Parser<'_>) -> Result<Box<dyn Tag>, Error> + Send + Sync + 'static,
{
    TAGS.register(name, factory);
}
