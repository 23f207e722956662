//! Plan tree rendering
//!
//! ```text
//! Limit(2)
//!  └─ Offset(1)
//!      └─ Values(3 rows)
//! ```

use std::fmt::{self, Write};

/// Builds the text of one node and its children
#[derive(Debug, Default)]
pub struct TreePrinter {
    node: String,
    children: Vec<String>,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node line
    pub fn write_node(&mut self, node: impl fmt::Display) {
        self.node.clear();
        // Writing to a String cannot fail
        let _ = write!(self.node, "{}", node);
    }

    /// Append children; each may render over several lines
    pub fn write_children<T: fmt::Display>(&mut self, children: impl IntoIterator<Item = T>) {
        self.children
            .extend(children.into_iter().map(|c| c.to_string()));
    }
}

impl fmt::Display for TreePrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.node)?;
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (first, rest) = if i == last {
                (" └─ ", "    ")
            } else {
                (" ├─ ", " │  ")
            };
            for (j, line) in child.lines().enumerate() {
                let prefix = if j == 0 { first } else { rest };
                writeln!(f, "{}{}", prefix, line)?;
            }
        }
        Ok(())
    }
}
