/*!
Command registry.

A fixed table mapping each keyword to its request descriptor: method,
endpoint, how the JSON body is built, and how the reply is rendered.
Lookup is exact (no prefixes, no aliases, case-sensitive).

Body convention: every body carries both `handle` and `session_id`
(`null` until `/start` succeeds). The service itself reads the identity from
`username`, which holds the session id for session-scoped commands and the
handle for handle-scoped ones.
*/

use serde_json::{Map, Value};

use super::parse::ParsedCommand;
use super::render::ResponseShape;
use crate::session::SessionContext;
use crate::transport::Method;

/// Which identity and which arguments go into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `{username: <session id>}`
    Session,
    /// `{username: <session id>, target: <arg 1>}`
    SessionTarget,
    /// `{target: <arg 1>}`
    Target,
    /// `{username: <handle>}`
    Handle,
    /// `{username: <handle>, ip: <arg 1>}`
    HandleIp,
    /// `{username: <handle>, filename: <all args joined>}`
    HandleFilename,
    /// No body at all (GET)
    Empty,
}

#[derive(Debug)]
pub struct CommandSpec {
    pub keyword: &'static str,
    pub method: Method,
    pub endpoint: &'static str,
    pub request: RequestShape,
    pub response: ResponseShape,
}

impl CommandSpec {
    pub fn build_body(&self, session: &SessionContext, cmd: &ParsedCommand) -> Option<Value> {
        if self.request == RequestShape::Empty {
            return None;
        }

        let session_id = session
            .session_id()
            .map(|id| Value::String(id.to_string()))
            .unwrap_or(Value::Null);
        let handle = Value::String(session.handle().to_string());

        let mut body = Map::new();
        body.insert("handle".into(), handle.clone());
        body.insert("session_id".into(), session_id.clone());

        match self.request {
            RequestShape::Session => {
                body.insert("username".into(), session_id);
            }
            RequestShape::SessionTarget => {
                body.insert("username".into(), session_id);
                insert_arg(&mut body, "target", cmd.first_arg());
            }
            RequestShape::Target => {
                insert_arg(&mut body, "target", cmd.first_arg());
            }
            RequestShape::Handle => {
                body.insert("username".into(), handle);
            }
            RequestShape::HandleIp => {
                body.insert("username".into(), handle);
                insert_arg(&mut body, "ip", cmd.first_arg());
            }
            RequestShape::HandleFilename => {
                body.insert("username".into(), handle);
                body.insert("filename".into(), Value::String(cmd.joined_args()));
            }
            RequestShape::Empty => {}
        }

        Some(Value::Object(body))
    }
}

// A missing argument is left out of the body; the service reports it.
fn insert_arg(body: &mut Map<String, Value>, key: &str, arg: Option<&str>) {
    if let Some(a) = arg {
        body.insert(key.into(), Value::String(a.to_string()));
    }
}

pub fn all_commands() -> &'static [CommandSpec] {
    COMMANDS
}

pub fn find_command(keyword: &str) -> Option<&'static CommandSpec> {
    all_commands().iter().find(|c| c.keyword == keyword)
}

const fn post(
    keyword: &'static str,
    endpoint: &'static str,
    request: RequestShape,
    response: ResponseShape,
) -> CommandSpec {
    CommandSpec {
        keyword,
        method: Method::Post,
        endpoint,
        request,
        response,
    }
}

use self::RequestShape as Rq;
use super::render::ResponseShape as Rs;

const COMMANDS: &[CommandSpec] = &[
    post("scan", "/scan", Rq::Session, Rs::NodeList),
    post("whoami", "/whoami", Rq::Session, Rs::ResultField),
    post("whois", "/whois", Rq::Target, Rs::ResultField),
    post("spoof", "/spoof", Rq::SessionTarget, Rs::ResultField),
    post("unspoof", "/unspoof", Rq::Session, Rs::ResultField),
    post("cloak", "/cloak", Rq::Session, Rs::ResultField),
    post("uncloak", "/uncloak", Rq::Session, Rs::ResultField),
    post("connect", "/connect", Rq::HandleIp, Rs::RawText),
    post("pivot", "/pivot", Rq::HandleIp, Rs::RawText),
    post("ls", "/ls", Rq::Handle, Rs::RawText),
    post("status", "/status", Rq::Handle, Rs::RawText),
    post("download", "/download", Rq::HandleFilename, Rs::RawText),
    post("cat", "/cat", Rq::HandleFilename, Rs::Mapping),
    CommandSpec {
        keyword: "help",
        method: Method::Get,
        endpoint: "/help",
        request: Rq::Empty,
        response: Rs::Mapping,
    },
];
