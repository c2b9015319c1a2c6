use std::fmt;

use crate::consts::TREE_PATH_SEPARATOR;

/// A tree assembled from `/`-delimited paths.
///
/// Paths sharing a prefix share the nodes of that prefix, and siblings keep
/// the order in which they were first added.
#[derive(Debug, Default)]
pub struct PathTree {
    roots: Vec<Node>,
}

#[derive(Debug)]
struct Node {
    label: String,
    children: Vec<Node>,
}

impl PathTree {
    pub fn add(&mut self, path: &str) {
        let mut level = &mut self.roots;
        for segment in path.split(TREE_PATH_SEPARATOR) {
            let index = if let Some(index) = level.iter().position(|node| node.label == segment) {
                index
            } else {
                level.push(Node { label: segment.to_string(), children: Vec::new() });
                level.len() - 1
            };
            level = &mut level[index].children;
        }
    }
}

impl<S> FromIterator<S> for PathTree
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(paths: I) -> Self {
        let mut tree = Self::default();
        for path in paths {
            tree.add(path.as_ref());
        }
        tree
    }
}

impl fmt::Display for PathTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            writeln!(f, "{}", root.label)?;
            write_children(f, &root.children, "")?;
        }
        Ok(())
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, nodes: &[Node], prefix: &str) -> fmt::Result {
    for (index, node) in nodes.iter().enumerate() {
        let is_last = index + 1 == nodes.len();
        let connector = if is_last { "└── " } else { "├── " };
        writeln!(f, "{prefix}{connector}{}", node.label)?;

        let prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        write_children(f, &node.children, &prefix)?;
    }
    Ok(())
}
