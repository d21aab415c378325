//! Cancellable prompts.
//!
//! Every prompt here can be abandoned with a lone ESC. While a prompt waits,
//! a data listener watches the raw input stream: a chunk that is exactly one
//! ESC byte fires the prompt's abort signal. Longer chunks that merely start
//! with ESC (arrow keys, function keys) are ordinary input, so navigating a
//! list never cancels it.

use dialoguer::theme::Theme;
use std::fmt;
use std::io;
use thiserror::Error;

use clawset_core::cancel::CancelToken;

use crate::console::Console;
use crate::keys::{self, ESC, Key};

/// Result of a prompt that may be abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Answered(T),
    Cancelled,
}

impl<T> Prompted<T> {
    pub fn answered(self) -> Option<T> {
        match self {
            Self::Answered(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Prompt failures.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The abort signal fired while the prompt was pending.
    #[error("Prompt was aborted")]
    Aborted,

    /// Ctrl-C.
    #[error("Interrupted")]
    Interrupted,

    /// The input stream ended.
    #[error("Input closed before the prompt was answered")]
    Closed,

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to render prompt")]
    Render(#[from] fmt::Error),
}

/// Progress of a prompt after a key press.
pub enum Step<T> {
    Pending,
    Done(T),
}

/// A single-question prompt, driven one key at a time.
pub trait Prompt {
    type Output;

    /// Draw the pending state.
    fn render(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result;

    /// Draw the line left behind once answered.
    fn render_answer(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result;

    fn on_key(&mut self, key: Key) -> Step<Self::Output>;

    /// List-style prompts have no caret to show.
    fn hides_cursor(&self) -> bool {
        false
    }
}

/// True for the chunk a bare ESC key press produces.
pub fn is_cancel_chunk(chunk: &[u8]) -> bool {
    chunk == [ESC]
}

/// Run `prompt` until it resolves or `signal` fires.
///
/// The signal is checked before waiting and after every chunk, so an abort
/// raised by a listener wins over keys in the same chunk.
pub fn run_prompt<P: Prompt>(
    console: &Console,
    prompt: &mut P,
    signal: &CancelToken,
) -> Result<P::Output, PromptError> {
    let _raw = console.raw_mode(prompt.hides_cursor())?;
    let theme = console.theme();

    let mut frame = String::new();
    prompt.render(theme, &mut frame)?;
    console.draw(&frame)?;

    loop {
        if signal.is_cancelled() {
            console.clear_frame()?;
            return Err(PromptError::Aborted);
        }

        let chunk = console.input().read_chunk()?;
        if signal.is_cancelled() {
            console.clear_frame()?;
            return Err(PromptError::Aborted);
        }
        if chunk.is_empty() {
            console.clear_frame()?;
            return Err(PromptError::Closed);
        }

        for key in keys::decode(&chunk) {
            if key == Key::Interrupt {
                console.clear_frame()?;
                return Err(PromptError::Interrupted);
            }
            if let Step::Done(value) = prompt.on_key(key) {
                let mut answer = String::new();
                prompt.render_answer(theme, &mut answer)?;
                console.commit(&answer)?;
                return Ok(value);
            }
        }

        frame.clear();
        prompt.render(theme, &mut frame)?;
        console.draw(&frame)?;
    }
}

/// Run `prompt` with ESC cancellation.
pub fn run_cancellable<P: Prompt>(
    console: &Console,
    prompt: P,
) -> Result<Prompted<P::Output>, PromptError> {
    run_cancellable_with(console, prompt, None)
}

/// Like [`run_cancellable`], also giving up when `parent` fires.
pub fn run_cancellable_with<P: Prompt>(
    console: &Console,
    mut prompt: P,
    parent: Option<&CancelToken>,
) -> Result<Prompted<P::Output>, PromptError> {
    let signal = CancelToken::new();
    if parent.is_some_and(CancelToken::is_cancelled) {
        return Ok(Prompted::Cancelled);
    }

    let listener_signal = signal.clone();
    let parent_signal = parent.cloned();
    let _listener = console.input().listen(move |chunk| {
        if is_cancel_chunk(chunk) || parent_signal.as_ref().is_some_and(CancelToken::is_cancelled) {
            listener_signal.cancel();
        }
    });
    tracing::trace!("{} input listeners", console.input().listener_count());

    match run_prompt(console, &mut prompt, &signal) {
        Ok(value) => Ok(Prompted::Answered(value)),
        Err(PromptError::Aborted) => Ok(Prompted::Cancelled),
        Err(e) => Err(e),
    }
}

/// Pick one of `items`; answers with the index.
pub struct Select {
    message: String,
    items: Vec<String>,
    cursor: usize,
    page_size: usize,
}

impl Select {
    pub fn new(message: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            message: message.into(),
            items,
            cursor: 0,
            page_size: 10,
        }
    }

    /// Indices of the rows currently visible.
    fn window(&self) -> std::ops::Range<usize> {
        let len = self.items.len();
        if len <= self.page_size {
            return 0..len;
        }
        let start = self
            .cursor
            .saturating_sub(self.page_size / 2)
            .min(len - self.page_size);
        start..start + self.page_size
    }
}

impl Prompt for Select {
    type Output = usize;

    fn render(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result {
        theme.format_select_prompt(out, &self.message)?;
        for idx in self.window() {
            out.push('\n');
            theme.format_select_prompt_item(out, &self.items[idx], idx == self.cursor)?;
        }
        Ok(())
    }

    fn render_answer(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result {
        let selected = self.items.get(self.cursor).map_or("", String::as_str);
        theme.format_select_prompt_selection(out, &self.message, selected)
    }

    fn on_key(&mut self, key: Key) -> Step<usize> {
        let len = self.items.len();
        if len == 0 {
            return Step::Pending;
        }
        match key {
            Key::Up => self.cursor = (self.cursor + len - 1) % len,
            Key::Down => self.cursor = (self.cursor + 1) % len,
            Key::Enter => return Step::Done(self.cursor),
            _ => {}
        }
        Step::Pending
    }

    fn hides_cursor(&self) -> bool {
        true
    }
}

/// Free text input.
pub struct Text {
    message: String,
    value: String,
    masked: bool,
}

impl Text {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            value: String::new(),
            masked: false,
        }
    }

    /// Secret input, echoed as `*`.
    pub fn password(message: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::new(message)
        }
    }
}

impl Prompt for Text {
    type Output = String;

    fn render(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result {
        if self.masked {
            theme.format_password_prompt(out, &self.message)?;
            out.push_str(&"*".repeat(self.value.chars().count()));
        } else {
            theme.format_input_prompt(out, &self.message, None)?;
            out.push_str(&self.value);
        }
        Ok(())
    }

    fn render_answer(&self, theme: &dyn Theme, out: &mut String) -> fmt::Result {
        if self.masked {
            theme.format_password_prompt_selection(out, &self.message)
        } else {
            theme.format_input_prompt_selection(out, &self.message, &self.value)
        }
    }

    fn on_key(&mut self, key: Key) -> Step<String> {
        match key {
            Key::Char(c) => self.value.push(c),
            Key::Backspace => {
                self.value.pop();
            }
            Key::Enter => return Step::Done(self.value.clone()),
            _ => {}
        }
        Step::Pending
    }
}

/// Select with ESC cancellation.
pub fn esc_select(
    console: &Console,
    message: &str,
    items: Vec<String>,
) -> Result<Prompted<usize>, PromptError> {
    run_cancellable(console, Select::new(message, items))
}

/// Text input with ESC cancellation.
pub fn esc_input(console: &Console, message: &str) -> Result<Prompted<String>, PromptError> {
    run_cancellable(console, Text::new(message))
}

/// Masked input with ESC cancellation.
pub fn esc_password(console: &Console, message: &str) -> Result<Prompted<String>, PromptError> {
    run_cancellable(console, Text::password(message))
}
