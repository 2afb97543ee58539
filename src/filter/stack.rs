use crate::roles::RoleSets;

/// Why an end marker could not close the innermost block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    /// Nothing is open
    Empty,
    /// The innermost open block belongs to another role
    Mismatch { expected: String },
}

/// Role names of the currently open blocks, outermost first.
///
/// Owned by a single file scan.
#[derive(Debug, Default)]
pub struct BlockStack {
    open: Vec<String>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: &str) {
        self.open.push(role.to_string());
    }

    /// Close the innermost block, which must belong to `role`
    pub fn close(&mut self, role: &str) -> Result<(), CloseError> {
        match self.open.last() {
            None => Err(CloseError::Empty),
            Some(last) if last != role => Err(CloseError::Mismatch { expected: last.clone() }),
            Some(_) => {
                self.open.pop();
                Ok(())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Whether lines at the current position are kept: every open role must be enabled
    pub fn retains(&self, roles: &RoleSets) -> bool {
        self.open.iter().all(|role| roles.is_enabled(role))
    }

    /// Consume the stack, yielding the still open roles outermost first
    pub fn into_open(self) -> Vec<String> {
        self.open
    }
}
