//! Decoder for JMAE kill definition files.
//!
//! The header lists every kill the file defines; the body is a set of
//! boolean nodes per kill. Node lines come in four shapes:
//! - `k<id> <node> <op> items…` opens a node of kill `k<id>`
//! - `<node> <op> items…` opens a node of the current kill
//! - `& items…` continues the most recent node
//! - `# …` is a comment

mod models;
mod parser;

pub use models::{KillNode, KillTree, NodeKey};
pub use parser::KillDecoder;
