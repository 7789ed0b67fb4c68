use std::path::{Path, PathBuf};

/// Files currently being parsed, outermost first.
///
/// Holds only the active include chain: a path is pushed when the engine
/// descends into a file and popped once that file is done.
#[derive(Debug, Default)]
pub(crate) struct IncludeGuard {
    stack: Vec<PathBuf>,
}

impl IncludeGuard {
    pub(crate) fn rooted(root: PathBuf) -> Self {
        Self { stack: vec![root] }
    }

    /// Pushes `path`, or returns the cycle it would close
    /// (`[first visit, .., path]`) and leaves the stack unchanged.
    pub(crate) fn enter(&mut self, path: &Path) -> Result<(), Vec<PathBuf>> {
        if let Some(pos) = self.stack.iter().position(|p| p == path) {
            let mut chain = self.stack[pos..].to_vec();
            chain.push(path.to_path_buf());
            return Err(chain);
        }
        self.stack.push(path.to_path_buf());
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.stack.pop();
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}

pub(crate) fn render_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
