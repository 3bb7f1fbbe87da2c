//! Scoped exclusive clipboard sessions.
//!
//! The Windows clipboard must be opened before raw calls and closed on every
//! exit path. [`ClipboardSession`] is the RAII guard for that: acquisition
//! opens the raw clipboard only when the reentrancy depth is zero, drop
//! closes it only when the depth returns to zero, so a call chain that
//! acquires again deeper down is a no-op rather than a deadlock.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};

use crate::backend::RawClipboard;
use crate::error::ClipboardResult;

/// RAII guard over an open clipboard session.
///
/// Derefs to the raw backend, so raw calls go through the guard while it is
/// alive. Single-threaded by design, matching the access layer's model.
pub struct ClipboardSession<'a, R: RawClipboard> {
    raw: &'a mut R,
    depth: &'a Cell<u32>,
}

impl<'a, R: RawClipboard> ClipboardSession<'a, R> {
    /// Acquire the session, opening the raw clipboard at depth zero.
    pub fn acquire(raw: &'a mut R, depth: &'a Cell<u32>) -> ClipboardResult<Self> {
        if depth.get() == 0 {
            raw.open()?;
        }
        depth.set(depth.get() + 1);
        Ok(Self { raw, depth })
    }

    /// Current nesting depth, including this guard.
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }
}

impl<R: RawClipboard> Deref for ClipboardSession<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.raw
    }
}

impl<R: RawClipboard> DerefMut for ClipboardSession<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.raw
    }
}

impl<R: RawClipboard> Drop for ClipboardSession<'_, R> {
    fn drop(&mut self) {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        if depth == 0 {
            self.raw.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClipboardError;
    use crate::formats::FormatId;

    #[derive(Default)]
    struct CountingRaw {
        opens: u32,
        closes: u32,
        fail_open: bool,
    }

    impl RawClipboard for CountingRaw {
        fn open(&mut self) -> ClipboardResult<()> {
            if self.fail_open {
                return Err(ClipboardError::Backend("open failed".to_string()));
            }
            self.opens += 1;
            Ok(())
        }

        fn close(&mut self) {
            self.closes += 1;
        }

        fn raw_list(&mut self) -> ClipboardResult<Vec<FormatId>> {
            Ok(Vec::new())
        }

        fn raw_read(&mut self, _id: &FormatId) -> ClipboardResult<Vec<u8>> {
            Ok(Vec::new())
        }

        fn raw_write(&mut self, _id: &FormatId, _data: &[u8]) -> ClipboardResult<()> {
            Ok(())
        }

        fn clear(&mut self) -> ClipboardResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_open_close_once() {
        let mut raw = CountingRaw::default();
        let depth = Cell::new(0);
        {
            let session = ClipboardSession::acquire(&mut raw, &depth).unwrap();
            assert_eq!(session.depth(), 1);
        }
        assert_eq!(depth.get(), 0);
        assert_eq!(raw.opens, 1);
        assert_eq!(raw.closes, 1);
    }

    #[test]
    fn test_nested_acquisition_is_noop() {
        let mut raw = CountingRaw::default();
        let depth = Cell::new(0);
        {
            let mut outer = ClipboardSession::acquire(&mut raw, &depth).unwrap();
            {
                let inner = ClipboardSession::acquire(&mut *outer, &depth).unwrap();
                assert_eq!(inner.depth(), 2);
            }
            // inner drop must not close the still-held session
            assert_eq!(depth.get(), 1);
        }
        assert_eq!(raw.opens, 1);
        assert_eq!(raw.closes, 1);
    }

    #[test]
    fn test_failed_open_leaves_depth_untouched() {
        let mut raw = CountingRaw {
            fail_open: true,
            ..CountingRaw::default()
        };
        let depth = Cell::new(0);
        assert!(ClipboardSession::acquire(&mut raw, &depth).is_err());
        assert_eq!(depth.get(), 0);
        assert_eq!(raw.closes, 0);
    }
}
