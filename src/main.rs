use std::{io, sync::Arc};

use anyhow::Context;
use chat_widget::{
    ChatWidget, HttpBackend, WidgetConfig,
    render::TerminalRenderer,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type SharedRenderer = Arc<Mutex<TerminalRenderer<io::Stdout>>>;

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Open,
    Close,
    Toggle,
    Quit,
    Suggestion(usize),
    Text(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/open" => Command::Open,
            "/close" => Command::Close,
            "/toggle" => Command::Toggle,
            "/quit" | "/exit" => Command::Quit,
            other => match other.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n >= 1 => Command::Suggestion(n),
                _ => Command::Text(line),
            },
        }
    }
}

#[derive(Clone, Copy)]
enum FormStep {
    Name,
    Email,
}

impl FormStep {
    fn prompt(self) -> &'static str {
        match self {
            FormStep::Name => "Your Name:",
            FormStep::Email => "Your Email:",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cli, config) = WidgetConfig::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_widget=info")),
        )
        .with_writer(io::stderr)
        .init();

    let widget = ChatWidget::new(HttpBackend::new(&config.backend_url), &config);
    info!(session = %widget.session_id(), backend = %config.backend_url, "chat widget started");

    let renderer: SharedRenderer = Arc::new(Mutex::new(TerminalRenderer::new(io::stdout())));

    let mut updates = widget.subscribe();
    let render_widget = widget.clone();
    let render_out = Arc::clone(&renderer);
    let render_task = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = render_widget.view().await;
            // Replies that land while closed are printed on the next /open.
            if !view.is_open {
                continue;
            }
            if let Err(e) = render_out.lock().await.sync(&view) {
                error!(error = %e, "failed to render chat");
                break;
            }
        }
    });

    println!("Type /open to start chatting, /quit to leave.");
    let mut step = FormStep::Name;
    if cli.open {
        widget.open().await;
        show_panel(&widget, &renderer, step).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Open => {
                widget.open().await;
                show_panel(&widget, &renderer, step).await?;
            }
            Command::Close => {
                widget.close().await;
                println!("(chat closed, /open to resume)");
            }
            Command::Toggle => {
                if widget.toggle().await {
                    show_panel(&widget, &renderer, step).await?;
                } else {
                    println!("(chat closed, /open to resume)");
                }
            }
            Command::Suggestion(n) => {
                if widget.is_open().await && widget.is_verified().await {
                    let widget = widget.clone();
                    tokio::spawn(async move {
                        widget.click_suggestion_at(n - 1).await;
                    });
                }
            }
            Command::Text(text) => {
                if !widget.is_open().await {
                    println!("(chat closed, /open to resume)");
                    continue;
                }
                if widget.is_verified().await {
                    widget.set_draft(text).await;
                    if widget.spawn_submit().await.is_none() && widget.is_loading().await {
                        println!("(waiting for the previous reply)");
                    }
                    continue;
                }
                step = match step {
                    FormStep::Name => {
                        widget.set_name(text).await;
                        FormStep::Email
                    }
                    FormStep::Email => {
                        widget.set_email(text).await;
                        widget.submit_verification().await;
                        FormStep::Name
                    }
                };
                if !widget.is_verified().await {
                    println!("{}", step.prompt());
                }
            }
        }
    }

    render_task.abort();
    info!(session = %widget.session_id(), "chat widget stopped");
    Ok(())
}

async fn show_panel(
    widget: &ChatWidget<HttpBackend>,
    renderer: &SharedRenderer,
    step: FormStep,
) -> anyhow::Result<()> {
    let view = widget.view().await;
    let mut renderer = renderer.lock().await;
    renderer.header(&view)?;
    renderer.sync(&view)?;
    if !view.is_verified {
        println!("{}", step.prompt());
    }
    Ok(())
}
