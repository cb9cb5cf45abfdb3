//! ANSI escape sequences
//!
//! Written byte-for-byte as listed; the block variants set a background and
//! a white foreground as two separate sequences.

/// Restore the terminal's default colors
pub const RESET: &str = "\x1b[0m";

/// White text on a red background
pub const RED: &str = "\x1b[41m\x1b[37m";
/// White text on a green background
pub const GREEN: &str = "\x1b[42m\x1b[37m";
/// White text on a yellow background
pub const YELLOW: &str = "\x1b[43m\x1b[37m";
/// White text on a blue background
pub const BLUE: &str = "\x1b[44m\x1b[37m";

/// Red text
pub const RED_CHAR: &str = "\x1b[31m";
/// Green text
pub const GREEN_CHAR: &str = "\x1b[32m";
/// Yellow text
pub const YELLOW_CHAR: &str = "\x1b[33m";
/// Blue text
pub const BLUE_CHAR: &str = "\x1b[34m";
