//! Inline-image protocol detection and escape-sequence emission.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::TermImageError;

/// Kitty caps escape payloads at 4096 bytes of base64 per chunk.
const KITTY_CHUNK_SIZE: usize = 4096;

/// Environment signals that drive protocol classification.
///
/// Captured as a value so classification itself stays a pure function;
/// [`EnvSignals::from_env`] re-reads the environment on every call.
#[derive(Debug, Default, Clone)]
pub struct EnvSignals {
    pub term: Option<String>,
    pub term_program: Option<String>,
    pub wt_session: Option<String>,
}

impl EnvSignals {
    /// Snapshot the relevant environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            term: std::env::var("TERM").ok(),
            term_program: std::env::var("TERM_PROGRAM").ok(),
            wt_session: std::env::var("WT_SESSION").ok(),
        }
    }
}

/// Inline-image protocol supported by the active terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProtocol {
    /// OSC 1337 base64 transfer, BEL-terminated (iTerm2 and compatibles).
    Iterm2,
    /// Kitty graphics protocol: APC `_G` control data, ST-terminated.
    Kitty,
    /// Terminal advertises sixel-class graphics; emitted via the iTerm2
    /// encoding, which those terminals also accept.
    Sixel,
    /// No inline-image support detected.
    Unsupported,
}

impl ImageProtocol {
    /// Detect the protocol from the current environment.
    ///
    /// Re-derived on every call; nothing is cached across queries.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(&EnvSignals::from_env())
    }

    /// Classify from explicit signals. First match wins.
    #[must_use]
    pub fn detect_from(signals: &EnvSignals) -> Self {
        let term = signals.term.as_deref().unwrap_or_default();
        let term_program = signals.term_program.as_deref().unwrap_or_default();

        if term_program == "iTerm.app" || term_program == "WarpTerminal" {
            return Self::Iterm2;
        }
        if term == "xterm-kitty" || term_program == "kitty" {
            return Self::Kitty;
        }
        if signals.wt_session.is_some() {
            return Self::Sixel;
        }
        if term_program == "vscode" {
            return Self::Iterm2;
        }
        Self::Unsupported
    }

    /// Whether this protocol can display images at all.
    #[must_use]
    pub fn supports_inline_images(self) -> bool {
        self != Self::Unsupported
    }
}

/// Emit PNG bytes through the terminal's inline-image protocol.
pub fn write_inline_image(
    out: &mut dyn Write,
    png: &[u8],
    protocol: ImageProtocol,
) -> Result<(), TermImageError> {
    match protocol {
        ImageProtocol::Iterm2 | ImageProtocol::Sixel => write_iterm2(out, png),
        ImageProtocol::Kitty => write_kitty(out, png),
        ImageProtocol::Unsupported => Err(TermImageError::Unsupported),
    }
}

/// OSC 1337: `ESC ] 1337 ; File=inline=1:<base64> BEL`.
fn write_iterm2(out: &mut dyn Write, png: &[u8]) -> Result<(), TermImageError> {
    let encoded = STANDARD.encode(png);
    write!(out, "\x1b]1337;File=inline=1:{encoded}\x07")?;
    writeln!(out)?;
    Ok(())
}

/// Kitty APC: `ESC _G <control> ; <base64> ESC \`, transmitted in chunks
/// with `m=1` continuation flags and PNG format (`f=100`).
fn write_kitty(out: &mut dyn Write, png: &[u8]) -> Result<(), TermImageError> {
    let encoded = STANDARD.encode(png);
    let total = encoded.len().div_ceil(KITTY_CHUNK_SIZE).max(1);

    for i in 0..total {
        let start = i * KITTY_CHUNK_SIZE;
        let end = (start + KITTY_CHUNK_SIZE).min(encoded.len());
        // Base64 is ASCII, so byte-range slicing cannot split a character.
        let payload = &encoded[start..end];
        let more = usize::from(i + 1 != total);
        if i == 0 {
            write!(out, "\x1b_Ga=T,f=100,m={more};{payload}\x1b\\")?;
        } else {
            write!(out, "\x1b_Gm={more};{payload}\x1b\\")?;
        }
    }
    writeln!(out)?;
    Ok(())
}
