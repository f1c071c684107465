//! Painting snapshots to a terminal.
//!
//! Tile colours follow the value palette of the web version of the game:
//! light tiles with dark text for 2 and 4, warm colours up to 128, and a
//! single dark colour for anything larger.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::game::{GameStatus, Snapshot};
use crate::session::View;

const TILE_WIDTH: usize = 8;
const TILE_HEIGHT: u16 = 3;
const GRID_TOP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    pub background: Color,
    pub foreground: Color,
    /// Three or more digits: drawn without emphasis so the label fits.
    pub compact: bool,
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb { r: (rgb >> 16) as u8, g: (rgb >> 8) as u8, b: rgb as u8 }
}

pub fn tile_style(value: u32) -> TileStyle {
    let background = match value {
        0 => hex(0x222222),
        2 => hex(0xeee4da),
        4 => hex(0xede0c8),
        8 => hex(0xf2b179),
        16 => hex(0xf59563),
        32 => hex(0xf67c5f),
        64 => hex(0xf65e3b),
        128 => hex(0xedcf72),
        _ => hex(0x3c3a32),
    };
    let foreground = if value <= 4 { hex(0x776e65) } else { Color::White };
    TileStyle { background, foreground, compact: value > 99 }
}

fn label(value: u32) -> String {
    match value {
        0 => String::new(),
        v => v.to_string(),
    }
}

/// Paints every snapshot over the whole screen of `out`.
pub struct TerminalView<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint_tile(&mut self, value: u32, line: u16) -> io::Result<()> {
        let text = if line == TILE_HEIGHT / 2 { label(value) } else { String::new() };
        if !self.color {
            let text = if value == 0 && line == TILE_HEIGHT / 2 { ".".to_string() } else { text };
            return queue!(self.out, Print(format!("{:^width$}", text, width = TILE_WIDTH)));
        }
        let style = tile_style(value);
        queue!(self.out, SetBackgroundColor(style.background), SetForegroundColor(style.foreground))?;
        if !style.compact {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            self.out,
            Print(format!("{:^width$}", text, width = TILE_WIDTH)),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }
}

impl<W: Write> View for TerminalView<W> {
    type Error = io::Error;

    fn paint(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0), Print("2048 Lite (2x2)"))?;
        let rows = snapshot.grid.rows();
        let mut y = GRID_TOP;
        for row in rows.iter() {
            for line in 0..TILE_HEIGHT {
                queue!(self.out, MoveTo(0, y))?;
                for (col, &value) in row.iter().enumerate() {
                    if col > 0 {
                        queue!(self.out, Print(" "))?;
                    }
                    self.paint_tile(value, line)?;
                }
                y += 1;
            }
            y += 1;
        }
        let footer = format!("moves: {}  best: {}", snapshot.moves, snapshot.grid.highest_tile());
        let hint = match snapshot.status {
            GameStatus::Playable => "arrows move, r resets, q quits",
            GameStatus::Stuck => "stuck: no move changes the grid. r resets, q quits",
        };
        queue!(self.out, MoveTo(0, y), Print(footer), MoveTo(0, y + 1), Print(hint))?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Grid;

    fn snapshot(rows: [[u32; 2]; 2], status: GameStatus) -> Snapshot {
        Snapshot { grid: Grid::from_rows(rows).unwrap(), moves: 3, status, last_spawn: None }
    }

    fn painted(view_color: bool, snap: &Snapshot) -> String {
        let mut view = TerminalView::new(Vec::new(), view_color);
        view.paint(snap).unwrap();
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn palette_matches_values() {
        assert_eq!(tile_style(0).background, Color::Rgb { r: 0x22, g: 0x22, b: 0x22 });
        assert_eq!(tile_style(2).background, Color::Rgb { r: 0xee, g: 0xe4, b: 0xda });
        assert_eq!(tile_style(128).background, Color::Rgb { r: 0xed, g: 0xcf, b: 0x72 });
        assert_eq!(tile_style(256).background, tile_style(4096).background);
        assert_eq!(tile_style(4).foreground, Color::Rgb { r: 0x77, g: 0x6e, b: 0x65 });
        assert_eq!(tile_style(8).foreground, Color::White);
        assert!(!tile_style(64).compact);
        assert!(tile_style(128).compact);
    }

    #[test]
    fn paints_labels_and_footer() {
        let out = painted(false, &snapshot([[2, 0], [0, 128]], GameStatus::Playable));
        assert!(out.contains("2048 Lite"));
        assert!(out.contains("   2    "));
        assert!(out.contains("  128   "));
        assert!(out.contains("moves: 3  best: 128"));
        assert!(out.contains("arrows move"));
        assert!(!out.contains("\x1b[48;2"));
    }

    #[test]
    fn colour_mode_emits_palette() {
        let out = painted(true, &snapshot([[2, 4], [4, 2]], GameStatus::Stuck));
        assert!(out.contains("\x1b[48;2;238;228;218m"));
        assert!(out.contains("stuck"));
    }
}
