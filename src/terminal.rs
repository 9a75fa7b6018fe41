use crate::palette::Rgb;
use crate::surface::Canvas;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::ResetColor,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

/// Raw-mode alternate screen, restored when dropped.
pub struct Session {
    out: BufWriter<Stdout>,
}

impl Session {
    pub fn begin() -> io::Result<Self> {
        let mut out = BufWriter::with_capacity(1024 * 64, io::stdout());
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { out })
    }

    pub fn out(&mut self) -> &mut BufWriter<Stdout> {
        &mut self.out
    }

    pub fn clear(&mut self) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn is_quit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && (key.code == KeyCode::Char('q')
            || key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}

/// Blocks until the terminal reports a usable size.
///
/// Returns `None` if the user quits first.
pub fn wait_for_viewport() -> io::Result<Option<(u16, u16)>> {
    loop {
        let (cols, rows) = terminal::size()?;
        if cols > 0 && rows > 0 {
            return Ok(Some((cols, rows)));
        }
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if is_quit(&key) => return Ok(None),
                Event::Resize(cols, rows) if cols > 0 && rows > 0 => {
                    return Ok(Some((cols, rows)));
                }
                _ => {}
            }
        }
    }
}

/// World size of a terminal: each cell holds two stacked pixels.
pub fn viewport_for(cols: u16, rows: u16, cell: u32) -> (u32, u32) {
    (cols as u32 * cell, rows as u32 * 2 * cell)
}

/// Turns a canvas into half-block terminal output over a background colour.
pub struct Presenter {
    bg: Rgb,
    output_buf: Vec<u8>,
}

impl Presenter {
    pub fn new(bg: Rgb) -> Self {
        Self {
            bg,
            output_buf: Vec::new(),
        }
    }

    fn shade(&self, [r, g, b, a]: [f32; 4]) -> Rgb {
        let [br, bg, bb] = self.bg.to_unit();
        let mix = |src: f32, base: f32| {
            ((src + base * (1.0 - a)).clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Rgb(mix(r, br), mix(g, bg), mix(b, bb))
    }

    /// Encodes one full frame, cursor homed.
    pub fn frame(&mut self, canvas: &Canvas) -> io::Result<&[u8]> {
        let (width, height) = (canvas.cols(), canvas.rows());
        self.output_buf.clear();
        self.output_buf.reserve(width * height.div_ceil(2) * 25);
        self.output_buf.extend_from_slice(b"\x1b[H");

        for y in (0..height).step_by(2) {
            let mut prev_top: Option<Rgb> = None;
            let mut prev_bot: Option<Rgb> = None;

            for x in 0..width {
                let top = self.shade(canvas.pixel(x, y));
                let bot = if y + 1 < height {
                    self.shade(canvas.pixel(x, y + 1))
                } else {
                    top
                };

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }

            self.output_buf.extend_from_slice(b"\x1b[0m");
            if y + 2 < height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        Ok(&self.output_buf)
    }

    pub fn present<W: Write>(&mut self, canvas: &Canvas, out: &mut W) -> io::Result<()> {
        self.frame(canvas)?;
        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn viewport_doubles_rows() {
        assert_eq!(viewport_for(100, 30, 8), (800, 480));
        assert_eq!(viewport_for(128, 48, 8), (1024, 768));
    }

    #[test]
    fn quit_keys() {
        let press = |code, mods| KeyEvent::new(code, mods);
        assert!(is_quit(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&press(KeyCode::Char(' '), KeyModifiers::NONE)));
    }

    #[test]
    fn blank_canvas_shows_background_once_per_row() {
        let canvas = Canvas::new(24, 32, 8);
        let mut presenter = Presenter::new(Rgb(0x1a, 0x1b, 0x26));
        let text = String::from_utf8(presenter.frame(&canvas).unwrap().to_vec()).unwrap();

        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 3 * 2);
        assert_eq!(text.matches("\x1b[48;2;26;27;38m").count(), 2);
        assert_eq!(text.matches("\r\n").count(), 1);
        assert!(text.ends_with("\x1b[0m"));
    }

    #[test]
    fn lit_pixels_blend_over_background() {
        let mut canvas = Canvas::new(16, 16, 8);
        canvas.set_global_alpha(0.5);
        canvas.set_fill(Rgb(255, 255, 255));
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0);

        let mut presenter = Presenter::new(Rgb::BLACK);
        let text = String::from_utf8(presenter.frame(&canvas).unwrap().to_vec()).unwrap();

        // Top-left is half white, its lower neighbour untouched
        assert!(text.contains("\x1b[48;2;128;128;128m"));
        assert!(text.contains("\x1b[38;2;0;0;0m"));
    }

    #[test]
    fn odd_row_count_repeats_last_row() {
        let mut canvas = Canvas::new(8, 24, 8);
        canvas.set_fill(Rgb(255, 0, 0));
        canvas.fill_rect(0.0, 16.0, 8.0, 8.0);

        let mut presenter = Presenter::new(Rgb::BLACK);
        let text = String::from_utf8(presenter.frame(&canvas).unwrap().to_vec()).unwrap();
        let last_line = text.rsplit("\r\n").next().unwrap();
        assert!(last_line.contains("\x1b[48;2;255;0;0m"));
        assert!(last_line.contains("\x1b[38;2;255;0;0m"));
    }

    #[test]
    fn present_writes_frame() {
        let canvas = Canvas::new(8, 16, 8);
        let mut presenter = Presenter::new(Rgb::BLACK);
        let mut sink = Vec::new();
        presenter.present(&canvas, &mut sink).unwrap();
        assert_eq!(sink, presenter.frame(&canvas).unwrap());
    }
}
