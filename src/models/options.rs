pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Settings shared by parsing and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateOptions {
    pub max_depth: usize,        // 允许的最大块嵌套层数
    pub strict_variables: bool,  // 未定义变量是否记为错误
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateOptions {
    pub fn new() -> Self {
        TemplateOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_variables: false,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict_variables(mut self, strict_variables: bool) -> Self {
        self.strict_variables = strict_variables;
        self
    }
}
