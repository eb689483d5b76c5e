use crate::compile::tree::Tree;

/// A distinct set of Tree instances.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub data: Vec<Tree>,
}

impl Scope {
    /// Create a new Scope.
    #[inline]
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Return true if the Scope would render nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|tree| match tree {
            Tree::Raw(text) => text.trim().is_empty(),
            _ => false,
        })
    }
}
