//! Menu engine: a labeled list on top of a cancellable select prompt, with
//! optional per-item actions and an optional loop until exit.

use anyhow::{Result, bail};
use tracing::{Span, debug, info_span};

use clawset_core::cancel::CancelToken;

use crate::console::Console;
use crate::prompt::{Prompted, Select, run_cancellable_with};

/// Value carried by a menu item. `Exit` is the sentinel that ends a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    Item(T),
    Exit,
}

type Action<'a> = Box<dyn Fn(&MenuContext<'_>) -> Result<()> + 'a>;

pub struct MenuItem<'a, T> {
    pub label: String,
    pub value: Choice<T>,
    action: Option<Action<'a>>,
}

impl<'a, T> MenuItem<'a, T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value: Choice::Item(value),
            action: None,
        }
    }

    pub fn exit(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: Choice::Exit,
            action: None,
        }
    }

    /// Run `action` whenever this item is picked.
    pub fn with_action(mut self, action: impl Fn(&MenuContext<'_>) -> Result<()> + 'a) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    fn display_label(&self) -> String {
        match self.value {
            Choice::Exit => console::style(&self.label).dim().to_string(),
            Choice::Item(_) => self.label.clone(),
        }
    }
}

/// Shared state handed to every action of one menu run.
pub struct MenuContext<'c> {
    pub console: &'c Console,
    pub span: Span,
    pub cancel: Option<CancelToken>,
}

impl<'c> MenuContext<'c> {
    pub fn new(console: &'c Console) -> Self {
        Self {
            console,
            span: info_span!("menu"),
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome<T> {
    Selected(T),
    /// The exit item was chosen.
    Exited,
    /// ESC.
    Cancelled,
}

impl<T> MenuOutcome<T> {
    /// The selection, treating exit and cancel alike.
    pub fn into_selection(self) -> Option<T> {
        match self {
            Self::Selected(value) => Some(value),
            Self::Exited | Self::Cancelled => None,
        }
    }
}

pub struct Menu<'a, T> {
    message: String,
    items: Vec<MenuItem<'a, T>>,
    looping: bool,
    context: Option<&'a MenuContext<'a>>,
}

impl<'a, T> Menu<'a, T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            items: Vec::new(),
            looping: false,
            context: None,
        }
    }

    pub fn item(mut self, item: MenuItem<'a, T>) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = MenuItem<'a, T>>) -> Self {
        self.items.extend(items);
        self
    }

    /// Keep asking after each action until exit or cancel.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn context(mut self, context: &'a MenuContext<'a>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn run(mut self, console: &Console) -> Result<MenuOutcome<T>> {
        if self.items.is_empty() {
            bail!("Menu '{}' has no items", self.message);
        }

        let owned;
        let ctx = match self.context {
            Some(ctx) => ctx,
            None => {
                owned = MenuContext::new(console);
                &owned
            }
        };
        let _enter = ctx.span.enter();

        let labels: Vec<String> = self.items.iter().map(MenuItem::display_label).collect();

        loop {
            let select = Select::new(self.message.as_str(), labels.clone());
            let index = match run_cancellable_with(console, select, ctx.cancel.as_ref())? {
                Prompted::Answered(index) => index,
                Prompted::Cancelled => {
                    debug!("Menu cancelled: {}", self.message);
                    return Ok(MenuOutcome::Cancelled);
                }
            };

            let item = &self.items[index];
            if matches!(item.value, Choice::Exit) {
                return Ok(MenuOutcome::Exited);
            }
            if let Some(action) = &item.action {
                debug!("Menu action: {}", item.label);
                action(ctx)?;
            }

            if !self.looping {
                return match self.items.swap_remove(index).value {
                    Choice::Item(value) => Ok(MenuOutcome::Selected(value)),
                    Choice::Exit => Ok(MenuOutcome::Exited),
                };
            }
            console.println("")?;
        }
    }
}
