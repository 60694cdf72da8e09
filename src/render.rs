// src/render.rs
use std::io::{self, Write};

use crate::{
    message::{Message, Sender},
    state::WidgetView,
};

pub const WELCOME_HEADING: &str = "Welcome!";
pub const WELCOME_TEXT: &str = "Please enter your details to start chatting with IDC bot.";

/// Turns messages into output, one at a time, in display order.
pub trait MessageRenderer {
    fn render(&mut self, message: &Message) -> io::Result<()>;

    fn render_loading(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Line-oriented renderer. Suggestion chips are numbered from 1 so the
/// terminal can click them with `/N`.
pub struct TerminalRenderer<W> {
    out: W,
    rendered: usize,
    last_revision: u64,
    loading_shown: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rendered: 0,
            last_revision: 0,
            loading_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn header(&mut self, view: &WidgetView) -> io::Result<()> {
        writeln!(self.out, "== {} ==", view.title)?;
        if !view.is_verified {
            writeln!(self.out, "{WELCOME_HEADING}")?;
            writeln!(self.out, "{WELCOME_TEXT}")?;
        }
        self.out.flush()
    }

    /// Print whatever arrived since the last call. Returns whether anything
    /// was written.
    pub fn sync(&mut self, view: &WidgetView) -> io::Result<bool> {
        if view.revision == self.last_revision && self.rendered == view.messages.len() {
            return Ok(false);
        }
        self.last_revision = view.revision;

        let fresh = &view.messages[self.rendered.min(view.messages.len())..];
        for message in fresh {
            self.render(message)?;
        }
        self.rendered = view.messages.len();

        if view.is_loading && !self.loading_shown {
            self.render_loading()?;
        }
        self.loading_shown = view.is_loading;
        self.out.flush()?;
        Ok(true)
    }
}

impl<W: Write> MessageRenderer for TerminalRenderer<W> {
    fn render(&mut self, message: &Message) -> io::Result<()> {
        match message.from {
            Sender::User => writeln!(self.out, "you > {}", message.text)?,
            Sender::Bot => {
                for line in message.text.lines() {
                    writeln!(self.out, "bot > {line}")?;
                }
            }
        }
        if message.is_bot() {
            if let Some(suggestions) = &message.suggestions {
                for (i, chip) in suggestions.iter().enumerate() {
                    writeln!(self.out, "      [{}] {chip}", i + 1)?;
                }
            }
        }
        Ok(())
    }

    fn render_loading(&mut self) -> io::Result<()> {
        writeln!(self.out, "bot > ...")
    }
}
