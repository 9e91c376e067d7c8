//! Terminal rendering of the catalog view.
//!
//! Grid view lays books out as cards, several per row; list view shows one
//! row per book. Colors follow the active [`Theme`].

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::UiConfig;
use crate::models::BookRecord;
use crate::ui::{status_icon, truncate_with_ellipsis, DisplaySettings, ErrorSink, RenderSink};
use crate::ui::{Spinner, Status, Theme, ViewMode};

const CARD_MIN_WIDTH: usize = 32;

/// How a list of books is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub theme: Theme,
    pub view: ViewMode,
    pub color: bool,
    pub grid_columns: usize,
    /// Total width available, in terminal columns
    pub width: usize,
}

impl RenderStyle {
    pub fn new(settings: &DisplaySettings, ui: &UiConfig, width: usize) -> Self {
        Self {
            theme: settings.theme,
            view: settings.view,
            color: ui.color,
            grid_columns: ui.grid_columns.max(1),
            width,
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            view: ViewMode::default(),
            color: false,
            grid_columns: 3,
            width: 100,
        }
    }
}

struct Palette {
    title: Color,
    text: Color,
    accent: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            title: Color::Cyan,
            text: Color::Grey,
            accent: Color::Yellow,
        },
        Theme::Light => Palette {
            title: Color::DarkBlue,
            text: Color::Black,
            accent: Color::DarkMagenta,
        },
    }
}

/// Render `records` to a string using `style`
pub fn format_books(records: &[BookRecord], style: &RenderStyle) -> String {
    if records.is_empty() {
        return format_empty_state(style);
    }

    let table = match style.view {
        ViewMode::List => list_table(records, style),
        ViewMode::Grid => grid_table(records, style),
    };
    table.to_string()
}

fn format_empty_state(style: &RenderStyle) -> String {
    let heading = "No books found";
    let hint = "Try adjusting your search or filters";
    if !style.color {
        return format!("{}\n{}", heading, hint);
    }
    match style.theme {
        Theme::Dark => format!("{}\n{}", heading.bright_cyan().bold(), hint.dimmed()),
        Theme::Light => format!("{}\n{}", heading.blue().bold(), hint.italic()),
    }
}

fn base_table(style: &RenderStyle) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(style.width).unwrap_or(u16::MAX));
    if style.color {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }
    table
}

fn styled(cell: Cell, color: Color, style: &RenderStyle) -> Cell {
    if style.color {
        cell.fg(color)
    } else {
        cell
    }
}

fn list_table(records: &[BookRecord], style: &RenderStyle) -> Table {
    let colors = palette(style.theme);
    let mut table = base_table(style);
    table.set_header(vec!["#", "Title", "Author", "Publisher", "Published", "Link"]);

    for (index, book) in records.iter().enumerate() {
        let title = styled(Cell::new(book.display_title()), colors.title, style);
        let title = if style.color {
            title.add_attribute(Attribute::Bold)
        } else {
            title
        };

        table.add_row(vec![
            Cell::new(index + 1),
            title,
            styled(Cell::new(book.display_authors()), colors.text, style),
            styled(Cell::new(book.display_publisher()), colors.text, style),
            styled(Cell::new(book.display_published_date()), colors.text, style),
            styled(Cell::new(book.display_info_link()), colors.accent, style),
        ]);
    }

    table
}

fn grid_table(records: &[BookRecord], style: &RenderStyle) -> Table {
    let colors = palette(style.theme);
    let columns = grid_columns(style);
    let card_width = (style.width / columns).saturating_sub(4).max(8);
    let mut table = base_table(style);

    for chunk in records.chunks(columns) {
        let mut row: Vec<Cell> = chunk
            .iter()
            .map(|book| styled(Cell::new(card(book, card_width)), colors.title, style))
            .collect();
        // pad the last row so every row has the same number of cells
        row.resize_with(columns, || Cell::new(""));
        table.add_row(row);
    }

    table
}

fn grid_columns(style: &RenderStyle) -> usize {
    let fit = (style.width / CARD_MIN_WIDTH).max(1);
    style.grid_columns.clamp(1, fit)
}

fn card(book: &BookRecord, width: usize) -> String {
    format!(
        "{}\nBy {}\n{}\nPublished: {}\nRead More: {}",
        truncate_with_ellipsis(book.display_title(), width),
        truncate_with_ellipsis(&book.display_authors(), width.saturating_sub(3)),
        truncate_with_ellipsis(book.display_publisher(), width),
        book.display_published_date(),
        book.display_info_link(),
    )
}

/// Render and error sink writing to the terminal
pub struct TerminalRenderer {
    style: Mutex<RenderStyle>,
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
    spinner: Mutex<Option<Spinner>>,
    show_spinner: bool,
    paused: AtomicBool,
}

impl TerminalRenderer {
    /// Write to stdout, with errors and the loading spinner on stderr
    pub fn stdout(style: RenderStyle) -> Self {
        Self {
            style: Mutex::new(style),
            out: Mutex::new(Box::new(io::stdout())),
            err: Mutex::new(Box::new(io::stderr())),
            spinner: Mutex::new(None),
            show_spinner: io::stderr().is_terminal(),
            paused: AtomicBool::new(false),
        }
    }

    /// Write to arbitrary writers; no spinner is shown
    pub fn with_writers(
        style: RenderStyle,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            style: Mutex::new(style),
            out: Mutex::new(out),
            err: Mutex::new(err),
            spinner: Mutex::new(None),
            show_spinner: false,
            paused: AtomicBool::new(false),
        }
    }

    pub fn style(&self) -> RenderStyle {
        *self.style.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change theme or layout for subsequent renders
    pub fn set_style(&self, style: RenderStyle) {
        *self.style.lock().unwrap_or_else(PoisonError::into_inner) = style;
    }

    /// While paused, renders are dropped; errors and the spinner still show
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }

    fn stop_spinner(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(spinner) = spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl RenderSink for TerminalRenderer {
    fn render(&self, records: &[BookRecord]) {
        self.stop_spinner();
        if self.paused.load(Ordering::SeqCst) {
            return;
        }
        let text = format_books(records, &self.style());

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write catalog view");
        }
    }

    fn loading(&self, active: bool) {
        if !active {
            self.stop_spinner();
            return;
        }
        if self.show_spinner {
            let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
            if spinner.is_none() {
                *spinner = Some(Spinner::new("Loading books..."));
            }
        }
    }
}

impl ErrorSink for TerminalRenderer {
    fn report_error(&self, message: &str) {
        self.stop_spinner();
        let icon = status_icon(Status::Error);
        let line = if self.style().color {
            format!("{} {}", icon.red().bold(), message.red())
        } else {
            format!("{} {}", icon, message)
        };

        let mut err = self.err.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(err, "{}", line) {
            tracing::warn!(error = %e, "failed to write error message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookBuilder;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn plain(view: ViewMode) -> RenderStyle {
        RenderStyle {
            view,
            width: 200,
            ..Default::default()
        }
    }

    fn sample() -> Vec<BookRecord> {
        vec![
            BookBuilder::new()
                .title("Dune")
                .author("Frank Herbert")
                .publisher("Chilton")
                .published_date("1965-08-01")
                .info_link("http://books.example/dune")
                .build(),
            BookRecord::default(),
        ]
    }

    #[test]
    fn test_list_view_contains_fields_and_fallbacks() {
        let text = format_books(&sample(), &plain(ViewMode::List));

        assert!(text.contains("Title"));
        assert!(text.contains("Dune"));
        assert!(text.contains("Frank Herbert"));
        assert!(text.contains("August 1, 1965"));
        assert!(text.contains("Unknown Title"));
        assert!(text.contains("Unknown Author"));
        assert!(text.contains("Unknown Publisher"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_grid_view_renders_cards() {
        let text = format_books(&sample(), &plain(ViewMode::Grid));

        assert!(text.contains("By Frank Herbert"));
        assert!(text.contains("Published: Unknown"));
        assert!(text.contains("Read More: #"));
    }

    #[test]
    fn test_empty_state() {
        let text = format_books(&[], &plain(ViewMode::Grid));
        assert_eq!(text, "No books found\nTry adjusting your search or filters");
    }

    #[test]
    fn test_grid_columns_fit_width() {
        let mut style = plain(ViewMode::Grid);
        style.grid_columns = 4;
        style.width = 70;
        assert_eq!(grid_columns(&style), 2);

        style.width = 10;
        assert_eq!(grid_columns(&style), 1);
    }

    #[test]
    fn test_terminal_renderer_writes_output_and_errors() {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let renderer = TerminalRenderer::with_writers(
            plain(ViewMode::List),
            Box::new(out.clone()),
            Box::new(err.clone()),
        );

        renderer.loading(true);
        renderer.render(&sample());
        renderer.report_error("Failed to fetch books: HTTP error! Status: 500");

        assert!(out.contents().contains("Dune"));
        assert_eq!(
            err.contents(),
            "✗ Failed to fetch books: HTTP error! Status: 500\n"
        );
    }

    #[test]
    fn test_set_style_switches_layout() {
        let out = SharedBuf::default();
        let renderer = TerminalRenderer::with_writers(
            plain(ViewMode::List),
            Box::new(out.clone()),
            Box::new(io::sink()),
        );

        renderer.set_style(plain(ViewMode::Grid));
        renderer.render(&sample());

        assert_eq!(renderer.style().view, ViewMode::Grid);
        assert!(out.contents().contains("Read More:"));
    }

    #[test]
    fn test_paused_renderer_drops_output() {
        let out = SharedBuf::default();
        let renderer = TerminalRenderer::with_writers(
            plain(ViewMode::List),
            Box::new(out.clone()),
            Box::new(io::sink()),
        );

        renderer.set_paused(true);
        renderer.render(&sample());
        assert!(out.contents().is_empty());

        renderer.set_paused(false);
        renderer.render(&sample());
        assert!(out.contents().contains("Dune"));
    }
}
