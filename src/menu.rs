/// Visibility of the feed menu. Starts hidden; one action flips it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Menu {
    visible: bool,
}

impl Menu {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        tracing::trace!(visible = self.visible, "Menu toggled");
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_hidden(&self) -> bool {
        !self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_by_default() {
        assert!(Menu::default().is_hidden());
    }

    #[test]
    fn test_toggle_cycles_visibility() {
        let mut menu = Menu::default();
        menu.toggle();
        assert!(menu.is_visible());
        menu.toggle();
        assert!(menu.is_hidden());
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut menu = Menu::default();
        menu.hide();
        assert!(menu.is_hidden());
        menu.toggle();
        menu.hide();
        menu.hide();
        assert!(menu.is_hidden());
    }
}
