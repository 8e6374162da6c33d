//! Home page banner carousel.

use crate::models::PageView;

/// Popup carousel over the saved banner images.
///
/// Navigation wraps around in both directions. The popup only appears on the
/// home page and only when there is something to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupCarousel {
    images: Vec<String>,
    index: usize,
    open: bool,
}

impl PopupCarousel {
    /// Creates an open carousel positioned on the first image.
    pub fn new(images: Vec<String>) -> Self {
        Self {
            images,
            index: 0,
            open: true,
        }
    }

    /// Whether the popup should be displayed for `view`.
    pub fn is_visible_on(&self, view: PageView) -> bool {
        self.open && view == PageView::Home && !self.images.is_empty()
    }

    /// Image currently shown.
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    /// Position of the current image.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true when there are no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Advances to the next image, wrapping to the first.
    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.index = (self.index + 1) % self.images.len();
        }
    }

    /// Steps back to the previous image, wrapping to the last.
    pub fn previous(&mut self) {
        if !self.images.is_empty() {
            self.index = (self.index + self.images.len() - 1) % self.images.len();
        }
    }

    /// Closes the popup for the rest of the visit.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Replaces the images after a content change.
    pub fn set_images(&mut self, images: Vec<String>) {
        self.images = images;
        if self.index >= self.images.len() {
            self.index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let mut carousel = PopupCarousel::new(vec!["/a.png".into(), "/b.png".into()]);
        carousel.previous();
        assert_eq!(carousel.current(), Some("/b.png"));
        carousel.next();
        assert_eq!(carousel.current(), Some("/a.png"));
    }

    #[test]
    fn test_only_visible_on_home() {
        let mut carousel = PopupCarousel::new(vec!["/a.png".into()]);
        assert!(carousel.is_visible_on(PageView::Home));
        assert!(!carousel.is_visible_on(PageView::Gallery));
        carousel.close();
        assert!(!carousel.is_visible_on(PageView::Home));
    }

    #[test]
    fn test_empty_carousel() {
        let mut carousel = PopupCarousel::new(Vec::new());
        carousel.next();
        assert_eq!(carousel.current(), None);
        assert!(!carousel.is_visible_on(PageView::Home));
    }

    #[test]
    fn test_set_images_clamps_index() {
        let mut carousel = PopupCarousel::new(vec!["/a.png".into(), "/b.png".into()]);
        carousel.next();
        carousel.set_images(vec!["/c.png".into()]);
        assert_eq!(carousel.current(), Some("/c.png"));
    }
}
