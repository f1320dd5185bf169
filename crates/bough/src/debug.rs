//! Text dumps of a tree for debugging.
//!
//! ```
//! use std::sync::Arc;
//! use bough::{HeadlessToolkit, Tree};
//! use bough::debug::{TreeDebug, TreeFormatOptions};
//!
//! let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
//! let window = tree.create_window();
//! let ok = tree.create_component();
//! tree.set_name(ok, "ok").unwrap();
//! tree.add(window, ok, None, None).unwrap();
//!
//! let dump = TreeDebug::with_options(TreeFormatOptions::minimal())
//!     .format_subtree(&tree, window)
//!     .unwrap();
//! assert!(dump.contains("ok"));
//! ```

use std::fmt::Write;

use crate::error::TreeResult;
use crate::peer::Peer;
use crate::tree::{NodeId, Tree};

/// Branch drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Dashes only.
    Compact,
}

/// What a dump includes.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Print node ids.
    pub show_ids: bool,
    /// Print the node kind.
    pub show_kinds: bool,
    /// Print bounds relative to the parent.
    pub show_bounds: bool,
    /// Print peer state, flags and hierarchy listener counters.
    pub show_state: bool,
    /// Deepest level printed, `None` for all.
    pub max_depth: Option<usize>,
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_kinds: true,
            show_bounds: true,
            show_state: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything, including state flags.
    pub fn detailed() -> Self {
        Self {
            show_state: true,
            ..Default::default()
        }
    }

    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_kinds: false,
            show_bounds: false,
            show_state: false,
            ..Default::default()
        }
    }
}

/// Formats trees as indented text.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every root of the tree.
    pub fn format_all(&self, tree: &Tree) -> TreeResult<String> {
        let roots = tree.roots();
        let mut output = String::new();
        let _ = writeln!(output, "Tree ({} nodes):", tree.len());
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            self.format_into(tree, root, 0, true, &mut output)?;
        }
        Ok(output)
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, tree: &Tree, root: NodeId) -> TreeResult<String> {
        let mut output = String::new();
        self.format_into(tree, root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        tree: &Tree,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> TreeResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let node = tree.node(id)?;

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if node.name.is_empty() {
            "(unnamed)"
        } else {
            &node.name
        });
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_kinds {
            let _ = write!(output, " ({:?})", node.kind);
        }
        if self.options.show_bounds {
            let _ = write!(output, " {}", node.bounds);
        }
        if self.options.show_state {
            let peer = match node.peer {
                Peer::None => "unrealized",
                Peer::Lightweight => "lightweight",
                Peer::Native(_) => "native",
            };
            let _ = write!(output, " {peer}");
            if !node.visible {
                output.push_str(" hidden");
            }
            if !node.enabled {
                output.push_str(" disabled");
            }
            if !node.valid {
                output.push_str(" invalid");
            }
            if let Some(data) = &node.container
                && (data.listening_children > 0 || data.listening_bounds_children > 0)
            {
                let _ = write!(
                    output,
                    " hierarchy={} bounds={}",
                    data.listening_children, data.listening_bounds_children
                );
            }
        }
        output.push('\n');

        let children = node.children();
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.format_into(tree, child, depth + 1, i + 1 == count, output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }
        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..depth - 1 {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bough_core::Rect;

    use super::*;
    use crate::headless::HeadlessToolkit;

    fn sample() -> (Tree, NodeId) {
        let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
        let window = tree.create_window();
        tree.set_name(window, "frame").unwrap();
        for name in ["ok", "cancel"] {
            let button = tree.create_component();
            tree.set_name(button, name).unwrap();
            tree.set_bounds(button, Rect::new(0, 0, 40, 20)).unwrap();
            tree.add(window, button, None, None).unwrap();
        }
        (tree, window)
    }

    #[test]
    fn ascii_dump_lists_children_in_order() {
        let (tree, window) = sample();
        let debug = TreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });
        let dump = debug.format_subtree(&tree, window).unwrap();
        assert_eq!(dump, "frame\n+-- ok\n`-- cancel\n");
    }

    #[test]
    fn detailed_dump_shows_state() {
        let (tree, window) = sample();
        let dump = TreeDebug::with_options(TreeFormatOptions::detailed())
            .format_subtree(&tree, window)
            .unwrap();
        assert!(dump.contains("(Window)"));
        assert!(dump.contains("[0, 0 40x20]"));
        assert!(dump.contains("unrealized hidden invalid"));
    }

    #[test]
    fn depth_limit_and_roots() {
        let (tree, _) = sample();
        let debug = TreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        });
        assert_eq!(debug.format_all(&tree).unwrap(), "Tree (3 nodes):\nframe\n");
    }

    #[test]
    fn state_includes_listener_counters() {
        struct Quiet;
        impl crate::listener::HierarchyListener for Quiet {}

        let (mut tree, window) = sample();
        let ok = tree.children(window).unwrap()[0];
        tree.add_listener(ok, crate::listener::Listener::Hierarchy(Arc::new(Quiet)))
            .unwrap();
        let dump = TreeDebug::with_options(TreeFormatOptions::detailed())
            .format_subtree(&tree, window)
            .unwrap();
        let first = dump.lines().next().unwrap();
        assert!(first.ends_with("hierarchy=1 bounds=0"), "{first}");
    }
}
