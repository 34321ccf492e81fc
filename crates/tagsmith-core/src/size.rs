use crate::template::TemplateBounds;
use serde::{Deserialize, Serialize};

/// Rendered tag size in millimeters.
///
/// Derived from the template bounds on load and user-owned afterwards. With `lock_aspect`, editing
/// one dimension recomputes the other from the template's original aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSizeConfig {
    pub width: f64,
    pub height: f64,
    pub lock_aspect: bool,
}

impl TemplateSizeConfig {
    pub fn from_bounds(bounds: TemplateBounds) -> Self {
        Self {
            width: bounds.width,
            height: bounds.height,
            lock_aspect: true,
        }
    }

    pub fn set_width(&mut self, width: f64, original: Option<TemplateBounds>) {
        self.width = width;
        if let Some(aspect) = self.locked_aspect(original) {
            self.height = width / aspect;
        }
    }

    pub fn set_height(&mut self, height: f64, original: Option<TemplateBounds>) {
        self.height = height;
        if let Some(aspect) = self.locked_aspect(original) {
            self.width = height * aspect;
        }
    }

    /// Restores the original bounds, keeping the lock setting.
    pub fn reset_to(&mut self, original: TemplateBounds) {
        self.width = original.width;
        self.height = original.height;
    }

    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn locked_aspect(&self, original: Option<TemplateBounds>) -> Option<f64> {
        if !self.lock_aspect {
            return None;
        }
        original
            .map(|b| b.aspect_ratio())
            .filter(|a| a.is_finite() && *a > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: TemplateBounds = TemplateBounds {
        width: 90.0,
        height: 55.0,
    };

    #[test]
    fn locked_edits_keep_original_aspect() {
        let mut size = TemplateSizeConfig::from_bounds(ORIGINAL);
        size.set_width(45.0, Some(ORIGINAL));
        assert!((size.width / size.height - ORIGINAL.aspect_ratio()).abs() < 1e-9);
        assert!((size.height - 27.5).abs() < 1e-9);

        size.set_height(110.0, Some(ORIGINAL));
        assert!((size.width / size.height - ORIGINAL.aspect_ratio()).abs() < 1e-9);
        assert!((size.width - 180.0).abs() < 1e-9);
    }

    #[test]
    fn unlocked_edits_change_one_dimension() {
        let mut size = TemplateSizeConfig::from_bounds(ORIGINAL);
        size.lock_aspect = false;
        size.set_width(100.0, Some(ORIGINAL));
        assert_eq!((size.width, size.height), (100.0, 55.0));
    }

    #[test]
    fn locked_without_known_bounds_behaves_unlocked() {
        let mut size = TemplateSizeConfig::from_bounds(ORIGINAL);
        size.set_height(10.0, None);
        assert_eq!((size.width, size.height), (90.0, 10.0));
    }

    #[test]
    fn reset_restores_bounds_and_keeps_lock() {
        let mut size = TemplateSizeConfig::from_bounds(ORIGINAL);
        size.lock_aspect = false;
        size.set_width(12.0, Some(ORIGINAL));
        size.reset_to(ORIGINAL);
        assert_eq!((size.width, size.height, size.lock_aspect), (90.0, 55.0, false));
    }
}
