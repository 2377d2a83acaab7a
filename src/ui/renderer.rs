/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Box-filter the finished canvas down to the terminal, two pixel
///      rows per cell (`▀`: foreground = top pixel, background = bottom)
///   2. Build the next frame into `front` buffer (array of Cell)
///   3. Compare each cell with `back` buffer (previous frame)
///   4. Only emit terminal commands for cells that changed
///   5. All commands are batched with `queue!`, flushed once at the end
///   6. Swap front/back
///
/// The canvas keeps its 2:1 aspect ratio; unused rows and columns are
/// letterboxed with the base background.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::gfx::{Canvas, Rgba};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for letterbox cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every empty cell
    /// keeps VTE inter-row gaps from showing as horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn half_block(top: Rgba, bottom: Rgba) -> Self {
        Cell {
            ch: '▀',
            fg: rgb(top),
            bg: rgb(bottom),
        }
    }
}

fn rgb(c: Rgba) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }
}

// ── Layout: where the canvas lands in the terminal ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Layout {
    /// First terminal column / row of the picture.
    col: usize,
    row: usize,
    /// Picture size in cells; `rows * 2` pixel rows.
    cols: usize,
    rows: usize,
}

/// Largest aspect-preserving fit of a `cw`×`ch` canvas into a terminal
/// of `tw`×`th` cells, centered.
fn fit(cw: usize, ch: usize, tw: usize, th: usize) -> Layout {
    if cw == 0 || ch == 0 || tw == 0 || th == 0 {
        return Layout { col: 0, row: 0, cols: 0, rows: 0 };
    }
    let px_h = th * 2;
    // Width-bound unless that would overflow the height.
    let (cols, px_rows) = if tw * ch <= px_h * cw {
        (tw, tw * ch / cw)
    } else {
        (px_h * cw / ch, px_h)
    };
    let rows = (px_rows / 2).max(1);
    let cols = cols.max(1);
    Layout {
        col: (tw - cols.min(tw)) / 2,
        row: (th - rows.min(th)) / 2,
        cols,
        rows,
    }
}

/// Box-filter `canvas` to `w`×`h` output pixels, row-major.
fn downsample(canvas: &Canvas, w: usize, h: usize) -> Vec<Rgba> {
    let (cw, ch) = (canvas.width(), canvas.height());
    let mut out = Vec::with_capacity(w * h);
    for oy in 0..h {
        let y0 = oy * ch / h;
        let y1 = ((oy + 1) * ch / h).max(y0 + 1).min(ch);
        for ox in 0..w {
            let x0 = ox * cw / w;
            let x1 = ((ox + 1) * cw / w).max(x0 + 1).min(cw);
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for y in y0..y1 {
                for x in x0..x1 {
                    let p = canvas.get(x, y);
                    r += p.r as u32;
                    g += p.g as u32;
                    b += p.b as u32;
                }
            }
            let n = ((y1 - y0) * (x1 - x0)).max(1) as u32;
            out.push(Rgba::rgb((r / n) as u8, (g / n) as u8, (b / n) as u8));
        }
    }
    out
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Terminal reports key Release events.
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(1 << 16, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::info!(
            "terminal {}x{}, key release events: {}",
            self.term_w,
            self.term_h,
            self.keyboard_enhanced
        );

        Ok(())
    }

    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    /// Restore the terminal. Raw mode is always switched off, even if an
    /// earlier step fails or `init` only got partway.
    pub fn cleanup(&mut self) -> io::Result<()> {
        let pop = if self.keyboard_enhanced {
            self.keyboard_enhanced = false;
            execute!(self.writer, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        let screen = execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let raw = terminal::disable_raw_mode();
        pop.and(screen).and(raw)
    }

    /// Present a finished frame.
    pub fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            log::debug!("terminal resized to {}x{}", self.term_w, self.term_h);
        }

        // Build front buffer
        self.front.clear();
        compose(&mut self.front, canvas);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // Do NOT use ResetColor here: it resets to the terminal's native
        // default, which may differ from BASE_BG and cause line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

/// Fill `buf` with the letterboxed, downsampled canvas.
fn compose(buf: &mut FrameBuffer, canvas: &Canvas) {
    let layout = fit(canvas.width(), canvas.height(), buf.width, buf.height);
    let px = downsample(canvas, layout.cols, layout.rows * 2);
    for r in 0..layout.rows {
        for c in 0..layout.cols {
            let top = px[(r * 2) * layout.cols + c];
            let bottom = px[(r * 2 + 1) * layout.cols + c];
            buf.set(layout.col + c, layout.row + r, Cell::half_block(top, bottom));
        }
    }
}
