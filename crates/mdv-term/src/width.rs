//! Terminal width probing.

use terminal_size::{Width, terminal_size};

/// Fallback when the terminal size cannot be probed (pipes, CI).
const DEFAULT_WIDTH: u16 = 80;

/// Current terminal width in columns, defaulting to 80.
#[must_use]
pub fn terminal_width() -> u16 {
    match terminal_size() {
        Some((Width(w), _)) if w > 0 => w,
        _ => DEFAULT_WIDTH,
    }
}
