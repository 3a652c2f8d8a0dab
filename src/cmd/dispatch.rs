/*!
dispatch.rs - one submitted line, from echo to rendered reply.

Per submission:

  Echoed      `$ <raw>` is in the log
  Dispatched  request handed to the transport on its own task
  Rendered    reply lines appended (or the unknown-command notice)
  Failed      one line with the failure detail appended

Submissions are not serialized. Each known command runs on its own tokio task
and appends its lines as soon as its reply arrives, so a fast reply to a later
command can land before a slow reply to an earlier one. Within a submission the
echo always precedes its reply, and the reply lines stay together.
*/

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::parse::parse;
use super::registry::{CommandSpec, find_command};
use crate::session::SessionContext;
use crate::sink::{DisplayLine, LogSender};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Echoed,
    Dispatched,
    Rendered,
    Failed,
}

pub struct Dispatcher {
    session: Arc<SessionContext>,
    transport: Arc<dyn Transport>,
    log: LogSender,
    in_flight: Vec<JoinHandle<Phase>>,
}

impl Dispatcher {
    pub fn new(session: Arc<SessionContext>, transport: Arc<dyn Transport>, log: LogSender) -> Self {
        Self {
            session,
            transport,
            log,
            in_flight: Vec::new(),
        }
    }

    /// Echo `raw` and start its command. Never blocks on the network.
    ///
    /// Returns `Rendered` when the line was handled locally (unknown keyword),
    /// `Dispatched` when a request task was started.
    pub fn submit(&mut self, raw: &str) -> Phase {
        self.in_flight.retain(|h| !h.is_finished());

        let echo = DisplayLine::echo(raw);
        trace!(raw, phase = ?Phase::Echoed, "submission");
        let cmd = parse(raw);

        let Some(spec) = find_command(&cmd.keyword) else {
            self.log.emit_batch(vec![
                echo,
                DisplayLine::notice(format!("Unknown command: {}", cmd.keyword)),
            ]);
            return Phase::Rendered;
        };
        self.log.emit(echo);

        let body = spec.build_body(&self.session, &cmd);
        let transport = Arc::clone(&self.transport);
        let log = self.log.clone();
        self.in_flight.push(tokio::spawn(async move {
            let (phase, lines) = execute(spec, transport.as_ref(), body).await;
            log.emit_batch(lines);
            phase
        }));
        Phase::Dispatched
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every dispatched submission to append its lines.
    pub async fn drain(&mut self) {
        for handle in self.in_flight.drain(..) {
            match handle.await {
                Ok(phase) => trace!(?phase, "submission finished"),
                Err(e) => warn!(error = %e, "submission task did not complete"),
            }
        }
    }
}

async fn execute(
    spec: &'static CommandSpec,
    transport: &dyn Transport,
    body: Option<Value>,
) -> (Phase, Vec<DisplayLine>) {
    let started = Instant::now();
    let outcome = match transport.request(spec.method, spec.endpoint, body).await {
        Ok(payload) => spec.response.render(&payload),
        Err(e) => Err(e),
    };
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(lines) => {
            debug!(command = spec.keyword, elapsed_ms, lines = lines.len(), "rendered");
            (
                Phase::Rendered,
                lines.into_iter().map(DisplayLine::output).collect(),
            )
        }
        Err(e) => {
            warn!(command = spec.keyword, elapsed_ms, error = %e, "command failed");
            (Phase::Failed, vec![DisplayLine::error(e.to_string())])
        }
    }
}
