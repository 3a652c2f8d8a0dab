/*!
repl.rs - the interactive terminal loop.

Startup:
  1. handle: from settings, else prompt `Enter your hacker handle:` (blank -> anon)
  2. POST /start on its own task; `Session started as <id>` or the failure line
  3. every further non-blank input line is submitted to the dispatcher

Command entry is never gated on the session: while /start is pending, or after
it failed, commands go out with a null session id. On end of input the loop
waits for in-flight commands and the start task, closes the log and returns
the sink.
*/

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::cmd::Dispatcher;
use crate::session::SessionContext;
use crate::sink::{DisplayLine, LineSink, LogSender, spawn_writer};
use crate::transport::Transport;

pub const HANDLE_PROMPT: &str = "Enter your hacker handle:";

pub async fn run<R, S>(
    input: R,
    handle: Option<String>,
    transport: Arc<dyn Transport>,
    sink: S,
) -> Result<S>
where
    R: AsyncBufRead + Unpin,
    S: LineSink + 'static,
{
    let mut lines = input.lines();

    let handle = match handle {
        Some(h) => h,
        None => {
            eprint!("{HANDLE_PROMPT} ");
            lines
                .next_line()
                .await
                .context("failed to read handle")?
                .unwrap_or_default()
        }
    };
    let session = Arc::new(SessionContext::new(handle));

    let (log, rx) = LogSender::channel();
    let writer = spawn_writer(rx, sink);

    let starter = tokio::spawn({
        let session = Arc::clone(&session);
        let transport = Arc::clone(&transport);
        let log = log.clone();
        async move {
            match session.establish(transport.as_ref()).await {
                Ok(id) => log.emit(DisplayLine::notice(format!("Session started as {id}"))),
                Err(e) => log.emit(DisplayLine::error(e.to_string())),
            }
        }
    });

    let mut dispatcher = Dispatcher::new(Arc::clone(&session), transport, log);
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }
        dispatcher.submit(cmd);
    }

    debug!(pending = dispatcher.in_flight(), "input closed; waiting for in-flight commands");
    dispatcher.drain().await;
    drop(dispatcher);
    if let Err(e) = starter.await {
        warn!(error = %e, "session start task did not complete");
    }

    let sink = writer
        .await
        .context("log writer task failed")?
        .context("failed to write terminal output")?;
    Ok(sink)
}
