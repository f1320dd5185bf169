//! Colors, fonts, cursors and locales.
//!
//! Getters return the effective value: the node's own, else the nearest
//! ancestor's. Setters store the node's own value and push the effective
//! value to a native peer.

use crate::appearance::{Color, CursorShape, Font, Locale};
use crate::error::{TreeError, TreeResult};

use super::{Node, NodeId, Tree};

impl Tree {
    /// Walk from `id` up the parent chain, returning the first value `pick`
    /// finds.
    fn inherited<T>(&self, id: NodeId, pick: impl Fn(&Node) -> Option<T>) -> TreeResult<Option<T>> {
        let mut current = Some(id);
        let mut first = true;
        while let Some(cur) = current {
            let node = if first {
                first = false;
                self.node(cur)?
            } else {
                match self.nodes.get(cur) {
                    Some(node) => node,
                    None => break,
                }
            };
            if let Some(value) = pick(node) {
                return Ok(Some(value));
            }
            current = node.parent;
        }
        Ok(None)
    }

    /// Effective foreground color.
    pub fn foreground(&self, id: NodeId) -> TreeResult<Option<Color>> {
        self.inherited(id, |n| n.foreground)
    }

    /// Set or clear the node's own foreground color.
    pub fn set_foreground(&mut self, id: NodeId, color: Option<Color>) -> TreeResult<()> {
        self.node_mut(id)?.foreground = color;
        let effective = self.foreground(id)?;
        if let Some(peer) = self.node(id)?.peer.native() {
            peer.set_foreground(effective);
        }
        Ok(())
    }

    /// Effective background color.
    pub fn background(&self, id: NodeId) -> TreeResult<Option<Color>> {
        self.inherited(id, |n| n.background)
    }

    /// Set or clear the node's own background color.
    pub fn set_background(&mut self, id: NodeId, color: Option<Color>) -> TreeResult<()> {
        self.node_mut(id)?.background = color;
        let effective = self.background(id)?;
        if let Some(peer) = self.node(id)?.peer.native() {
            peer.set_background(effective);
        }
        Ok(())
    }

    /// Effective font.
    pub fn font(&self, id: NodeId) -> TreeResult<Option<Font>> {
        self.inherited(id, |n| n.font.clone())
    }

    /// Set or clear the node's own font. Sizes depend on the font, so the
    /// node is invalidated.
    pub fn set_font(&mut self, id: NodeId, font: Option<Font>) -> TreeResult<()> {
        self.node_mut(id)?.font = font;
        let effective = self.font(id)?;
        let node = self.node_mut(id)?;
        if let Some(peer) = node.peer.native() {
            peer.set_font(effective.as_ref());
            node.peer_font = effective;
        }
        self.invalidate(id)
    }

    /// Effective cursor. Defaults to the arrow.
    pub fn cursor(&self, id: NodeId) -> TreeResult<CursorShape> {
        Ok(self.inherited(id, |n| n.cursor)?.unwrap_or_default())
    }

    /// Set or clear the node's own cursor.
    pub fn set_cursor(&mut self, id: NodeId, cursor: Option<CursorShape>) -> TreeResult<()> {
        self.node_mut(id)?.cursor = cursor;
        let effective = self.cursor(id)?;
        if let Some(peer) = self.node(id)?.peer.native() {
            peer.set_cursor(effective);
        }
        Ok(())
    }

    /// Effective locale.
    ///
    /// Fails with [`TreeError::NoLocale`] when neither the node nor any
    /// ancestor has one.
    pub fn locale(&self, id: NodeId) -> TreeResult<Locale> {
        self.inherited(id, |n| n.locale.clone())?
            .ok_or(TreeError::NoLocale(id))
    }

    /// Set or clear the node's own locale.
    pub fn set_locale(&mut self, id: NodeId, locale: Option<Locale>) -> TreeResult<()> {
        self.node_mut(id)?.locale = locale;
        Ok(())
    }

    /// Push every effective appearance value to the node's native peer.
    pub(crate) fn push_appearance(&mut self, id: NodeId) -> TreeResult<()> {
        let foreground = self.foreground(id)?;
        let background = self.background(id)?;
        let font = self.font(id)?;
        let cursor = self.cursor(id)?;
        let node = self.node_mut(id)?;
        let Some(peer) = node.peer.native().cloned() else {
            return Ok(());
        };
        if foreground.is_some() {
            peer.set_foreground(foreground);
        }
        if background.is_some() {
            peer.set_background(background);
        }
        if font.is_some() {
            peer.set_font(font.as_ref());
        }
        node.peer_font = font;
        peer.set_cursor(cursor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::appearance::FontStyle;
    use crate::config::TreeConfig;
    use crate::headless::HeadlessToolkit;

    fn tree() -> Tree {
        Tree::with_config(Arc::new(HeadlessToolkit::new()), TreeConfig::strict())
    }

    #[test]
    fn values_fall_back_to_ancestors() {
        let mut tree = tree();
        let root = tree.create_container();
        let panel = tree.create_container();
        let leaf = tree.create_component();
        tree.add(root, panel, None, None).unwrap();
        tree.add(panel, leaf, None, None).unwrap();

        let font = Font::new("Serif", FontStyle::Bold, 12);
        tree.set_font(root, Some(font.clone())).unwrap();
        tree.set_foreground(panel, Some(Color::WHITE)).unwrap();

        assert_eq!(tree.font(leaf).unwrap(), Some(font));
        assert_eq!(tree.foreground(leaf).unwrap(), Some(Color::WHITE));
        assert_eq!(tree.foreground(root).unwrap(), None);
        assert_eq!(tree.cursor(leaf).unwrap(), CursorShape::Arrow);

        tree.set_cursor(panel, Some(CursorShape::Hand)).unwrap();
        assert_eq!(tree.cursor(leaf).unwrap(), CursorShape::Hand);
    }

    #[test]
    fn missing_locale_is_an_error() {
        let mut tree = tree();
        let root = tree.create_container();
        let leaf = tree.create_component();
        tree.add(root, leaf, None, None).unwrap();
        assert_eq!(tree.locale(leaf), Err(TreeError::NoLocale(leaf)));

        tree.set_locale(root, Some(Locale::new("fr-CA"))).unwrap();
        assert_eq!(tree.locale(leaf).unwrap().tag(), "fr-CA");
    }
}
