//! Board rendering and the on-screen viewer

use std::io::{self, Write};

use chess_rl_core::{RLError, Result};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array3};
use tracing::{debug, info};

use crate::codec::{BOARD_SIZE, MAX_PIECE_CODE};

const LIGHT_SQUARE: Rgb<u8> = Rgb([255, 206, 158]);
const DARK_SQUARE: Rgb<u8> = Rgb([209, 139, 71]);
const WHITE_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const WHITE_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const BLACK_FILL: Rgb<u8> = Rgb([20, 20, 20]);
const BLACK_OUTLINE: Rgb<u8> = Rgb([235, 235, 235]);

const SPRITE_SIZE: usize = 12;

// Silhouettes indexed by piece code - 1.
const SPRITES: [[&str; SPRITE_SIZE]; 6] = [
    [
        "............",
        "............",
        ".....##.....",
        "....####....",
        "....####....",
        ".....##.....",
        "....####....",
        ".....##.....",
        "....####....",
        "...######...",
        "..########..",
        "............",
    ],
    [
        "............",
        ".....##.....",
        "....#####...",
        "...#######..",
        "..####.###..",
        "..###..##...",
        "......###...",
        ".....####...",
        "....#####...",
        "...######...",
        "..########..",
        "............",
    ],
    [
        "............",
        ".....##.....",
        "....####....",
        "...##.###...",
        "...#.####...",
        "...######...",
        "....####....",
        ".....##.....",
        "....####....",
        "...######...",
        "..########..",
        "............",
    ],
    [
        "............",
        "..##.##.##..",
        "..########..",
        "...######...",
        "...######...",
        "...######...",
        "...######...",
        "...######...",
        "..########..",
        "..########..",
        ".##########.",
        "............",
    ],
    [
        "............",
        ".#...##...#.",
        ".##..##..##.",
        ".###.##.###.",
        ".##########.",
        "..########..",
        "...######...",
        "...######...",
        "..########..",
        "..########..",
        ".##########.",
        "............",
    ],
    [
        ".....##.....",
        "....####....",
        ".....##.....",
        "..########..",
        ".##########.",
        ".##########.",
        "..########..",
        "...######...",
        "...######...",
        "..########..",
        ".##########.",
        "............",
    ],
];

/// Turns a piece configuration into a raster image
pub trait BoardRenderer {
    /// Render a raw (non-canonical) piece configuration as a `size`×`size` image
    fn render(&self, pieces: &Array2<i8>, size: u32) -> Result<RgbImage>;
}

/// Default renderer: flat squares with White at the bottom and piece silhouettes
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterRenderer;

impl RasterRenderer {
    fn sprite_hit(code: usize, row: isize, col: isize) -> bool {
        if !(0..SPRITE_SIZE as isize).contains(&row) || !(0..SPRITE_SIZE as isize).contains(&col) {
            return false;
        }
        SPRITES[code - 1][row as usize].as_bytes()[col as usize] == b'#'
    }

    fn sprite_pixel(piece: i8, row: usize, col: usize) -> Option<Rgb<u8>> {
        let code = usize::from(piece.unsigned_abs());
        let (r, c) = (row as isize, col as isize);
        let (fill, outline) = if piece < 0 {
            (WHITE_FILL, WHITE_OUTLINE)
        } else {
            (BLACK_FILL, BLACK_OUTLINE)
        };
        if Self::sprite_hit(code, r, c) {
            Some(fill)
        } else if [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|(dr, dc)| Self::sprite_hit(code, r + dr, c + dc))
        {
            Some(outline)
        } else {
            None
        }
    }
}

impl BoardRenderer for RasterRenderer {
    fn render(&self, pieces: &Array2<i8>, size: u32) -> Result<RgbImage> {
        if pieces.shape() != [BOARD_SIZE, BOARD_SIZE] {
            return Err(RLError::DimensionMismatch {
                expected: BOARD_SIZE * BOARD_SIZE,
                actual: pieces.len(),
            });
        }
        if size < BOARD_SIZE as u32 {
            return Err(RLError::Render(format!("render size {size} is smaller than the board")));
        }
        let max_code = MAX_PIECE_CODE.unsigned_abs();
        if let Some(code) = pieces.iter().find(|p| p.unsigned_abs() > max_code) {
            return Err(RLError::Render(format!("unknown piece code {code}")));
        }

        let n = BOARD_SIZE as u64;
        let size64 = u64::from(size);
        let image = RgbImage::from_fn(size, size, |x, y| {
            // scaled coordinates: square index and offset inside the square
            let (sx, sy) = (u64::from(x) * n, u64::from(y) * n);
            let file = (sx / size64) as usize;
            let rank = BOARD_SIZE - 1 - (sy / size64) as usize;
            let col = ((sx % size64) * SPRITE_SIZE as u64 / size64) as usize;
            let row = ((sy % size64) * SPRITE_SIZE as u64 / size64) as usize;

            let piece = pieces[[rank, file]];
            if piece != 0 {
                if let Some(color) = Self::sprite_pixel(piece, row, col) {
                    return color;
                }
            }
            if (file + rank) % 2 == 0 {
                DARK_SQUARE
            } else {
                LIGHT_SQUARE
            }
        });
        Ok(image)
    }
}

/// Convert an image into a `(height, width, 3)` pixel buffer
pub fn image_to_array(image: RgbImage) -> Result<Array3<u8>> {
    let (width, height) = image.dimensions();
    Array3::from_shape_vec((height as usize, width as usize, 3), image.into_raw())
        .map_err(|e| RLError::Render(e.to_string()))
}

/// Displays frames for `human` rendering
pub trait Viewer {
    /// Draw a `(height, width, 3)` frame
    fn imshow(&mut self, frame: &Array3<u8>) -> Result<()>;

    /// Whether the viewer can still display frames
    fn is_open(&self) -> bool;

    /// Release the display. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Draws frames in a true-color terminal using half-block characters.
///
/// Each character cell shows two pixels: the upper one as foreground, the
/// lower one as background. Subsequent frames overwrite the previous one.
pub struct TerminalViewer<W: Write> {
    out: W,
    columns: u32,
    open: bool,
    last_lines: usize,
}

impl TerminalViewer<io::Stdout> {
    /// Viewer writing to standard output
    #[must_use]
    pub fn stdout(columns: u32) -> Self {
        Self::new(io::stdout(), columns)
    }
}

impl<W: Write> TerminalViewer<W> {
    /// Viewer writing to any sink, `columns` characters wide
    pub fn new(out: W, columns: u32) -> Self {
        info!(columns, "opening terminal viewer");
        Self {
            out,
            columns: columns.max(1),
            open: true,
            last_lines: 0,
        }
    }
}

impl<W: Write> Viewer for TerminalViewer<W> {
    fn imshow(&mut self, frame: &Array3<u8>) -> Result<()> {
        if !self.open {
            return Err(RLError::Render("viewer is closed".into()));
        }
        let (height, width, channels) = frame.dim();
        if channels < 3 || width == 0 || height == 0 {
            return Err(RLError::Render(format!(
                "cannot display frame of shape {:?}",
                frame.shape()
            )));
        }

        let cols = (self.columns as usize).min(width);
        // two pixel rows per character line
        let lines = ((height * cols / width) / 2).max(1);
        let pixel = |line: usize, col: usize, lower: bool| {
            let y = ((2 * line + usize::from(lower)) * height / (2 * lines)).min(height - 1);
            let x = (col * width / cols).min(width - 1);
            (frame[[y, x, 0]], frame[[y, x, 1]], frame[[y, x, 2]])
        };

        let mut buf = String::new();
        if self.last_lines > 0 {
            buf.push_str(&format!("\x1b[{}A", self.last_lines));
        }
        for line in 0..lines {
            for col in 0..cols {
                let (tr, tg, tb) = pixel(line, col, false);
                let (br, bg, bb) = pixel(line, col, true);
                buf.push_str(&format!(
                    "\x1b[38;2;{tr};{tg};{tb}m\x1b[48;2;{br};{bg};{bb}m\u{2580}"
                ));
            }
            buf.push_str("\x1b[0m\n");
        }

        self.out.write_all(buf.as_bytes())?;
        self.out.flush()?;
        self.last_lines = lines;
        debug!(lines, cols, "drew frame");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.out.write_all(b"\x1b[0m")?;
        self.out.flush()?;
        info!("closed terminal viewer");
        Ok(())
    }
}
