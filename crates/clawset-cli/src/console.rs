//! Terminal console: the raw input stream prompts read from, and the frame
//! renderer they draw with.
//!
//! Input is consumed in chunks: whatever a single read of the terminal
//! returns. Every chunk is handed to the registered data listeners before
//! the reader sees it, so a listener can react to raw bytes (a lone ESC)
//! independently of how the prompt decodes them.

use crossterm::{
    QueueableCommand, cursor,
    terminal::{Clear, ClearType},
};
use dialoguer::theme::{ColorfulTheme, Theme};
use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, IsTerminal, Write};
use std::rc::Rc;

use crate::tui_guard::RawModeGuard;

/// Producer of raw input chunks. An empty chunk means end of input.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> io::Result<Vec<u8>>;
}

/// Chunks from a buffered reader: one chunk per underlying read.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> ChunkSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> io::Result<Vec<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => {
                    let chunk = buf.to_vec();
                    self.reader.consume(chunk.len());
                    return Ok(chunk);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

pub type ListenerId = u64;

type Listener = Rc<dyn Fn(&[u8])>;

/// Raw input with `data` listeners.
pub struct InputStream {
    source: RefCell<Box<dyn ChunkSource>>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_id: Cell<ListenerId>,
}

impl InputStream {
    pub fn new(source: impl ChunkSource + 'static) -> Self {
        Self {
            source: RefCell::new(Box::new(source)),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener for every chunk read from now on.
    pub fn on_data(&self, listener: impl Fn(&[u8]) + 'static) -> ListenerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Register a listener that is removed when the returned guard drops.
    pub fn listen(&self, listener: impl Fn(&[u8]) + 'static) -> DataListener<'_> {
        DataListener {
            stream: self,
            id: self.on_data(listener),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Block for the next chunk, notify every listener, then return it.
    pub fn read_chunk(&self) -> io::Result<Vec<u8>> {
        let chunk = self.source.borrow_mut().next_chunk()?;
        // Snapshot so a listener may register or remove listeners.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&chunk);
        }
        Ok(chunk)
    }
}

/// Scoped data listener.
pub struct DataListener<'a> {
    stream: &'a InputStream,
    id: ListenerId,
}

impl Drop for DataListener<'_> {
    fn drop(&mut self) {
        self.stream.off(self.id);
    }
}

/// Input stream + output + theme.
pub struct Console {
    input: InputStream,
    output: RefCell<Box<dyn Write>>,
    theme: Box<dyn Theme>,
    /// Attached to a real terminal: prompts switch it to raw mode.
    interactive: bool,
    /// Terminal rows the prompt frame currently occupies.
    frame_lines: Cell<usize>,
    /// Fixed width; `None` asks the terminal.
    columns: Option<usize>,
}

impl Console {
    /// Console on stdin/stdout.
    pub fn stdio() -> Self {
        let mut console = Self::new(
            ReaderSource::new(io::stdin().lock()),
            io::stdout(),
            ColorfulTheme::default(),
        );
        console.interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
        console
    }

    /// Console on arbitrary input/output; never touches terminal modes.
    pub fn new(
        input: impl ChunkSource + 'static,
        output: impl Write + 'static,
        theme: impl Theme + 'static,
    ) -> Self {
        Self {
            input: InputStream::new(input),
            output: RefCell::new(Box::new(output)),
            theme: Box::new(theme),
            interactive: false,
            frame_lines: Cell::new(0),
            columns: None,
        }
    }

    pub fn input(&self) -> &InputStream {
        &self.input
    }

    pub fn theme(&self) -> &dyn Theme {
        self.theme.as_ref()
    }

    /// Raw mode for the duration of one prompt, when on a terminal.
    pub fn raw_mode(&self, hide_cursor: bool) -> io::Result<Option<RawModeGuard>> {
        if self.interactive {
            RawModeGuard::new(hide_cursor).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Replace the current frame with `frame`.
    pub fn draw(&self, frame: &str) -> io::Result<()> {
        self.clear_frame()?;
        let mut guard = self.output.borrow_mut();
        let out = guard.as_mut();
        let lines: Vec<&str> = frame.lines().collect();
        write!(out, "{}", lines.join("\r\n"))?;
        out.flush()?;
        self.frame_lines.set(frame_rows(&lines, self.columns()));
        Ok(())
    }

    /// Terminal width, when attached to one.
    fn columns(&self) -> Option<usize> {
        if self.columns.is_some() || !self.interactive {
            return self.columns;
        }
        let (_, cols) = ::console::Term::stdout().size();
        (cols > 0).then_some(usize::from(cols))
    }

    /// Erase the current frame, leaving the cursor at its first column.
    pub fn clear_frame(&self) -> io::Result<()> {
        let lines = self.frame_lines.replace(0);
        if lines == 0 {
            return Ok(());
        }
        let mut guard = self.output.borrow_mut();
        let out = guard.as_mut();
        out.queue(cursor::MoveToColumn(0))?
            .queue(Clear(ClearType::CurrentLine))?;
        for _ in 1..lines {
            out.queue(cursor::MoveUp(1))?
                .queue(Clear(ClearType::CurrentLine))?;
        }
        out.flush()
    }

    /// Replace the current frame with a permanent line.
    pub fn commit(&self, line: &str) -> io::Result<()> {
        self.clear_frame()?;
        self.println(line)
    }

    pub fn println(&self, line: &str) -> io::Result<()> {
        let mut guard = self.output.borrow_mut();
        let out = guard.as_mut();
        write!(out, "{}\r\n", line)?;
        out.flush()
    }
}

/// Rows `lines` take on screen once long lines wrap at `columns`.
fn frame_rows(lines: &[&str], columns: Option<usize>) -> usize {
    let rows: usize = lines
        .iter()
        .map(|line| match columns {
            Some(cols) => ::console::measure_text_width(line).div_ceil(cols).max(1),
            None => 1,
        })
        .sum();
    rows.max(1)
}


#[cfg(test)]
mod tests {
    use super::testing::scripted;
    use super::*;

    #[test]
    fn test_listeners_see_every_chunk() {
        let (console, _) = scripted(&[b"a", b"\x1b[B"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = console.input().on_data(move |chunk| sink.borrow_mut().push(chunk.to_vec()));

        assert_eq!(console.input().read_chunk().unwrap(), b"a");
        assert_eq!(console.input().read_chunk().unwrap(), b"\x1b[B");
        assert_eq!(*seen.borrow(), vec![b"a".to_vec(), b"\x1b[B".to_vec()]);

        assert!(console.input().off(id));
        assert!(!console.input().off(id));
    }

    #[test]
    fn test_scoped_listener_is_removed() {
        let (console, _) = scripted(&[]);
        {
            let _guard = console.input().listen(|_| {});
            assert_eq!(console.input().listener_count(), 1);
        }
        assert_eq!(console.input().listener_count(), 0);
    }

    #[test]
    fn test_reader_source_chunks() {
        let mut source = ReaderSource::new(io::BufReader::with_capacity(4, &b"abcdef"[..]));
        assert_eq!(source.next_chunk().unwrap(), b"abcd");
        assert_eq!(source.next_chunk().unwrap(), b"ef");
        assert!(source.next_chunk().unwrap().is_empty());
    }

    #[test]
    fn test_frame_rows_count_wrapped_lines() {
        assert_eq!(frame_rows(&[], None), 1);
        assert_eq!(frame_rows(&["a", "b"], None), 2);
        assert_eq!(frame_rows(&["0123456789", ""], Some(10)), 2);
        assert_eq!(frame_rows(&["01234567890", "x"], Some(10)), 3);
        // escape codes take no columns
        assert_eq!(frame_rows(&["\x1b[36mabcdefghij\x1b[0m"], Some(10)), 1);
    }

    #[test]
    fn test_clear_frame_covers_wrapped_rows() {
        let (mut console, captured) = scripted(&[]);
        console.columns = Some(10);
        console.draw("? pick\n> GPT-5 (openai/gpt-5-codex)").unwrap();
        console.clear_frame().unwrap();
        // one header row plus a 28-column label over three rows
        assert_eq!(captured.text().matches("\x1b[1A").count(), 3);
    }

    #[test]
    fn test_commit_replaces_frame() {
        let (console, captured) = scripted(&[]);
        console.draw("? pick\n  one\n  two").unwrap();
        console.commit("picked one").unwrap();
        let text = captured.text();
        assert!(text.contains("? pick\r\n  one\r\n  two"));
        assert!(text.ends_with("picked one\r\n"));
    }
}
