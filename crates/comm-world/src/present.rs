//! Presentation layers for rendered frames.

use crate::render::Frame;
use comm_core::Result;
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Consumes rendered frames
pub trait Presenter {
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// Discards every frame
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _frame: &Frame) -> Result<()> {
        Ok(())
    }
}

/// Writes frames to any byte sink, optionally clearing the screen and colouring cells
pub struct TerminalPresenter<W: Write> {
    out: W,
    color: bool,
    clear: bool,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write> TerminalPresenter<W> {
    /// Animated output: clear before each frame
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            clear: true,
        }
    }

    /// Append-only output with no escape codes, suitable for log files
    pub fn plain(out: W) -> Self {
        Self {
            out,
            color: false,
            clear: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if self.clear {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        let text = if self.color {
            frame.to_ansi()
        } else {
            frame.to_plain()
        };
        self.out.write_all(text.as_bytes())?;
        if !self.clear {
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Glyph, Tint};
    use comm_core::Terrain;

    fn frame() -> Frame {
        Frame {
            tick: 4,
            rows: vec![vec![
                Glyph {
                    ch: '#',
                    tint: Tint::Terrain(Terrain::Border),
                };
                3
            ]],
            summary: vec!["Year 4".to_string()],
        }
    }

    #[test]
    fn test_plain_presenter_appends() {
        let mut presenter = TerminalPresenter::plain(Vec::new());
        presenter.present(&frame()).unwrap();
        presenter.present(&frame()).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(text, "###\nYear 4\n\n###\nYear 4\n\n");
    }

    #[test]
    fn test_terminal_presenter_clears_and_colours() {
        let mut presenter = TerminalPresenter::new(Vec::new(), true);
        presenter.present(&frame()).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.starts_with(CLEAR_SCREEN));
        assert!(text.contains("\x1b[97m###\x1b[0m"));
    }

    #[test]
    fn test_null_presenter() {
        assert!(NullPresenter.present(&frame()).is_ok());
    }
}
