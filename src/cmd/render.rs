/*!
Reply renderers, one per response shape.

  NodeList    : `[{ip, hostname}, ...]`   -> `<ip>  <hostname>` per node
  ResultField : `{result: ...}`           -> the result, one line
  RawText     : any text                  -> one line per physical line
  Mapping     : `{name: description, ...}`-> `<name padded to 20> - <description>`

A payload that does not fit its shape is a `TransportError::Decode`.
*/

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::transport::TransportError;

/// Width the mapping key is padded to before the ` - ` separator.
pub const MAPPING_KEY_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    NodeList,
    ResultField,
    RawText,
    Mapping,
}

#[derive(Deserialize)]
struct Node {
    ip: String,
    #[serde(default)]
    hostname: String,
}

#[derive(Deserialize)]
struct ResultReply {
    result: Value,
}

impl ResponseShape {
    pub fn render(self, payload: &str) -> Result<Vec<String>, TransportError> {
        match self {
            ResponseShape::NodeList => render_nodes(payload),
            ResponseShape::ResultField => render_result(payload),
            ResponseShape::RawText => Ok(render_text(payload)),
            ResponseShape::Mapping => render_mapping(payload),
        }
    }
}

fn render_nodes(payload: &str) -> Result<Vec<String>, TransportError> {
    let nodes: Vec<Node> = serde_json::from_str(payload).map_err(TransportError::decode)?;
    Ok(nodes
        .into_iter()
        .map(|n| format!("{}  {}", n.ip, n.hostname))
        .collect())
}

fn render_result(payload: &str) -> Result<Vec<String>, TransportError> {
    let reply: ResultReply = serde_json::from_str(payload).map_err(TransportError::decode)?;
    Ok(vec![value_text(&reply.result)])
}

fn render_text(payload: &str) -> Vec<String> {
    let lines: Vec<String> = payload.lines().map(str::to_string).collect();
    if lines.is_empty() {
        // an empty reply still shows up as one (blank) line
        return vec![String::new()];
    }
    lines
}

fn render_mapping(payload: &str) -> Result<Vec<String>, TransportError> {
    let map: Map<String, Value> =
        serde_json::from_str(payload).map_err(TransportError::decode)?;
    Ok(map
        .iter()
        .map(|(name, desc)| {
            format!(
                "{name:<width$} - {}",
                value_text(desc),
                width = MAPPING_KEY_WIDTH
            )
        })
        .collect())
}

/// Strings verbatim, anything else as compact JSON.
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
