//! Left-to-right flow layout.

use bough_core::logging::targets;
use bough_core::{Rect, Size};

use crate::error::TreeResult;
use crate::tree::{NodeId, Tree};

use super::LayoutStrategy;

/// Horizontal alignment of each row in a [`FlowLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowAlignment {
    /// Rows hug the left edge.
    Left,
    /// Rows are centered.
    #[default]
    Center,
    /// Rows hug the right edge.
    Right,
}

/// Lays children out in rows, left to right, wrapping when a row is full.
///
/// Each visible child gets its preferred size. Children within a row are
/// vertically centered on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLayout {
    /// Row alignment.
    pub alignment: FlowAlignment,
    /// Gap between children and around the row edges.
    pub hgap: i32,
    /// Gap between rows and above/below the rows.
    pub vgap: i32,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new(FlowAlignment::Center)
    }
}

impl FlowLayout {
    /// A flow layout with 5-unit gaps.
    pub fn new(alignment: FlowAlignment) -> Self {
        Self::with_gaps(alignment, 5, 5)
    }

    /// A flow layout with explicit gaps.
    pub fn with_gaps(alignment: FlowAlignment, hgap: i32, vgap: i32) -> Self {
        Self {
            alignment,
            hgap,
            vgap,
        }
    }

    fn measured_children(
        &self,
        tree: &Tree,
        container: NodeId,
        minimum: bool,
    ) -> TreeResult<Vec<(NodeId, Size)>> {
        let mut sized = Vec::new();
        for &child in tree.children(container)? {
            if !tree.is_visible(child)? {
                continue;
            }
            let size = if minimum {
                tree.minimum_size(child)?
            } else {
                tree.preferred_size(child)?
            };
            sized.push((child, size));
        }
        Ok(sized)
    }

    fn single_row(&self, sizes: &[(NodeId, Size)]) -> Size {
        let mut width = 0;
        let mut height = 0;
        for (i, (_, size)) in sizes.iter().enumerate() {
            if i > 0 {
                width += self.hgap;
            }
            width += size.width;
            height = height.max(size.height);
        }
        Size::new(width + self.hgap * 2, height + self.vgap * 2)
    }

    fn place_row(
        &self,
        row: &[(NodeId, Size)],
        y: i32,
        slack: i32,
        height: i32,
        out: &mut Vec<(NodeId, Rect)>,
    ) {
        let mut x = self.hgap
            + match self.alignment {
                FlowAlignment::Left => 0,
                FlowAlignment::Center => slack / 2,
                FlowAlignment::Right => slack,
            };
        for &(child, size) in row {
            let cy = y + (height - size.height) / 2;
            out.push((child, Rect::new(x, cy, size.width, size.height)));
            x += size.width + self.hgap;
        }
    }
}

impl LayoutStrategy for FlowLayout {
    fn preferred_size(&self, tree: &Tree, container: NodeId) -> Size {
        self.measured_children(tree, container, false)
            .map(|sizes| self.single_row(&sizes))
            .unwrap_or_default()
    }

    fn minimum_size(&self, tree: &Tree, container: NodeId) -> Size {
        self.measured_children(tree, container, true)
            .map(|sizes| self.single_row(&sizes))
            .unwrap_or_default()
    }

    fn layout_container(&self, tree: &mut Tree, container: NodeId) -> TreeResult<()> {
        let max_width = tree.bounds(container)?.width - self.hgap * 2;
        let sized = self.measured_children(tree, container, false)?;

        let mut placed = Vec::with_capacity(sized.len());
        let mut x = 0;
        let mut y = self.vgap;
        let mut row_height = 0;
        let mut row_start = 0;
        for (i, &(_, size)) in sized.iter().enumerate() {
            if x == 0 || x + self.hgap + size.width <= max_width {
                if x > 0 {
                    x += self.hgap;
                }
                x += size.width;
                row_height = row_height.max(size.height);
            } else {
                self.place_row(&sized[row_start..i], y, max_width - x, row_height, &mut placed);
                y += self.vgap + row_height;
                x = size.width;
                row_height = size.height;
                row_start = i;
            }
        }
        self.place_row(&sized[row_start..], y, max_width - x, row_height, &mut placed);

        tracing::trace!(target: targets::LAYOUT, ?container, children = placed.len(), "flow layout");
        for (child, bounds) in placed {
            tree.set_bounds(child, bounds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessToolkit;
    use std::sync::Arc;

    fn tree_with_row(widths: &[i32]) -> (Tree, NodeId, Vec<NodeId>) {
        let mut tree = Tree::new(Arc::new(HeadlessToolkit::new()));
        let panel = tree.create_container();
        tree.set_layout(panel, Some(Arc::new(FlowLayout::with_gaps(FlowAlignment::Left, 5, 5))))
            .unwrap();
        let mut children = Vec::new();
        for &width in widths {
            let child = tree.create_component();
            tree.set_preferred_size(child, Some(Size::new(width, 10))).unwrap();
            tree.add(panel, child, None, None).unwrap();
            children.push(child);
        }
        (tree, panel, children)
    }

    #[test]
    fn preferred_size_is_single_row() {
        let (tree, panel, _) = tree_with_row(&[20, 30]);
        let layout = FlowLayout::with_gaps(FlowAlignment::Left, 5, 5);
        assert_eq!(layout.preferred_size(&tree, panel), Size::new(65, 20));
    }

    #[test]
    fn rows_wrap_when_full() {
        let (mut tree, panel, children) = tree_with_row(&[20, 30, 40]);
        tree.set_bounds(panel, Rect::new(0, 0, 70, 100)).unwrap();
        tree.validate(panel).unwrap();
        assert_eq!(tree.bounds(children[0]).unwrap(), Rect::new(5, 5, 20, 10));
        assert_eq!(tree.bounds(children[1]).unwrap(), Rect::new(30, 5, 30, 10));
        assert_eq!(tree.bounds(children[2]).unwrap(), Rect::new(5, 20, 40, 10));
    }

    #[test]
    fn hidden_children_are_skipped() {
        let (mut tree, panel, children) = tree_with_row(&[20, 30]);
        tree.set_visible(children[0], false).unwrap();
        let layout = FlowLayout::with_gaps(FlowAlignment::Left, 5, 5);
        assert_eq!(layout.preferred_size(&tree, panel), Size::new(40, 20));
    }
}
