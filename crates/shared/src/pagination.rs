//! Offset pagination helpers for admin list endpoints.

use serde::Serialize;

/// Default page size when the client does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 500;

/// Resolved `limit`/`offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Clamps raw query values into a usable window.
    ///
    /// Missing or non-positive limits fall back to [`DEFAULT_LIMIT`], larger
    /// ones are capped at [`MAX_LIMIT`]. Negative offsets become zero.
    pub fn resolve(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.unwrap_or(0).max(0);
        Self { limit, offset }
    }

    /// Applies the window to an already ordered slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.offset as usize).min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let w = PageWindow::resolve(None, None);
        assert_eq!(w.limit, DEFAULT_LIMIT);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_resolve_clamps() {
        assert_eq!(PageWindow::resolve(Some(10_000), None).limit, MAX_LIMIT);
        assert_eq!(PageWindow::resolve(Some(0), None).limit, DEFAULT_LIMIT);
        assert_eq!(PageWindow::resolve(Some(-3), Some(-7)).offset, 0);
        assert_eq!(PageWindow::resolve(Some(20), Some(40)).limit, 20);
    }

    #[test]
    fn test_slice() {
        let items: Vec<i32> = (1..=10).collect();
        let w = PageWindow::resolve(Some(3), Some(8));
        assert_eq!(w.slice(&items), &[9, 10]);

        let past_end = PageWindow::resolve(Some(3), Some(50));
        assert!(past_end.slice(&items).is_empty());
    }
}
