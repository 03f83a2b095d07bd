use std::io::BufRead;

use log::trace;

use crate::{LineReader, Result};

/// What the dispatcher should do after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop reading the file; everything decoded so far is kept
    Stop,
}

/// Handler bound to a keyword prefix.
///
/// Receives the decoder state, the matching line and the reader positioned
/// just after that line. Handlers may consume further lines themselves.
pub type Handler<S, R> = fn(&mut S, &str, &mut LineReader<R>) -> Result<Flow>;

/// Routes each line of a file to the first handler whose prefix it starts with.
///
/// Prefixes are tested in registration order, so when two prefixes share a
/// leading substring the one registered first wins. Lines matching no prefix
/// are skipped.
pub struct LineDispatcher<S, R> {
    routes: Vec<(&'static str, Handler<S, R>)>,
    trim_leading: bool,
}

impl<S, R: BufRead> Default for LineDispatcher<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, R: BufRead> LineDispatcher<S, R> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            trim_leading: false,
        }
    }

    /// Ignore leading whitespace when matching prefixes
    pub fn trim_leading_whitespace(mut self, trim: bool) -> Self {
        self.trim_leading = trim;
        self
    }

    pub fn route(mut self, prefix: &'static str, handler: Handler<S, R>) -> Self {
        self.routes.push((prefix, handler));
        self
    }

    /// Scan the rest of the file. Returns [`Flow::Stop`] if a handler ended the scan early.
    pub fn run(&self, state: &mut S, reader: &mut LineReader<R>) -> Result<Flow> {
        while let Some(line) = reader.next_line()? {
            let probe = if self.trim_leading {
                line.trim_start()
            } else {
                line.as_str()
            };
            let Some(&(prefix, handler)) = self.routes.iter().find(|route| probe.starts_with(route.0))
            else {
                continue;
            };
            trace!("line {}: dispatching '{}'", reader.line_no(), prefix);
            if handler(state, &line, reader)? == Flow::Stop {
                trace!("line {}: handler for '{}' stopped the scan", reader.line_no(), prefix);
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }
}
