//! RAII guard for terminal raw mode.
//!
//! Ensures `disable_raw_mode` always runs when a prompt finishes, including
//! on early returns and unwinding. Use this instead of manual enable/disable
//! pairs.

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io;

/// Raw mode for the lifetime of the guard.
///
/// # Example
/// ```rust,ignore
/// let _raw = RawModeGuard::new(true)?;
/// // ... read keys byte by byte ...
/// // cooked mode comes back when `_raw` is dropped
/// ```
pub struct RawModeGuard {
    hid_cursor: bool,
}

impl RawModeGuard {
    /// Enter raw mode, hiding the cursor when `hide_cursor` is set.
    pub fn new(hide_cursor: bool) -> io::Result<Self> {
        enable_raw_mode()?;
        if hide_cursor {
            let mut stdout = io::stdout();
            let _ = execute!(stdout, cursor::Hide);
        }
        Ok(Self {
            hid_cursor: hide_cursor,
        })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.hid_cursor {
            let mut stdout = io::stdout();
            let _ = execute!(stdout, cursor::Show);
        }
        let _ = disable_raw_mode();
    }
}
