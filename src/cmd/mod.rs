/*!
Command dispatch core.

  src/cmd/
    mod.rs       (this file: module declarations + re-exports)
    parse.rs     raw line -> ParsedCommand { keyword, args }
    registry.rs  keyword -> CommandSpec (endpoint, body shape, reply shape)
    render.rs    reply payload -> display lines, one renderer per shape
    dispatch.rs  Dispatcher: echo, look up, send, render, append
    format.rs    ANSI styling used by the stdout sink and the banner

Conventions:
  - The registry is a fixed table; adding a command means adding a row.
  - Renderers and body builders are chosen by the row, never by matching on
    the keyword at the call site.
  - Nothing in here prints; all output goes through `sink::LogSender`.
*/

pub mod dispatch;
pub mod format;
pub mod parse;
pub mod registry;
pub mod render;

pub use dispatch::Dispatcher;
