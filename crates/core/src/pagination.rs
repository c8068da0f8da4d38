//! Compact page-button window.

use serde::Serialize;

use crate::types::CATALOG_PAGE_CAP;

pub const DEFAULT_WINDOW_SIZE: u32 = 5;

/// Which page buttons to render around the current page.
///
/// Page 1 and the last page are rendered separately (`show_first`,
/// `show_last`) when they fall outside `buttons`; the ellipsis flags say
/// whether a gap separates them from the window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: u32,
    pub buttons: Vec<u32>,
    pub show_first: bool,
    pub show_lead_ellipsis: bool,
    pub show_trail_ellipsis: bool,
    pub show_last: bool,
    pub effective_max: u32,
}

impl PageWindow {
    /// No pagination UI is needed.
    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Clamps a navigation request into `[1, effective_max]`.
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.clamp(1, self.effective_max.max(1))
    }

    pub fn first(&self) -> u32 {
        1
    }

    pub fn prev(&self) -> u32 {
        self.clamp(self.current.saturating_sub(1))
    }

    pub fn next(&self) -> u32 {
        self.clamp(self.current.saturating_add(1))
    }

    pub fn last(&self) -> u32 {
        self.clamp(self.effective_max)
    }
}

/// Window with the catalog cap and the default size.
pub fn window(current: u32, total_pages: u32) -> PageWindow {
    window_with(current, total_pages, CATALOG_PAGE_CAP, DEFAULT_WINDOW_SIZE)
}

pub fn window_with(current: u32, total_pages: u32, cap: u32, window_size: u32) -> PageWindow {
    let effective_max = total_pages.min(cap);
    if effective_max <= 1 {
        return PageWindow {
            current: 1,
            effective_max,
            ..Default::default()
        };
    }

    let size = window_size.max(1);
    let current = current.clamp(1, effective_max);

    let start = current.saturating_sub(size / 2).max(1);
    let end = effective_max.min(start.saturating_add(size - 1));
    let start = end.saturating_sub(size - 1).max(1);

    PageWindow {
        current,
        buttons: (start..=end).collect(),
        show_first: start > 1,
        show_lead_ellipsis: start > 2,
        show_trail_ellipsis: end.saturating_add(1) < effective_max,
        show_last: end < effective_max,
        effective_max,
    }
}
