use std::io::BufRead;
use std::path::Path;

use log::{debug, trace};
use parser_common::{field, parse_int, split_fields, DecodeError, LineReader, Result};

use crate::models::{KillNode, KillTree, NodeKey};

/// Decodes a kill definition file into a [`KillTree`]
pub struct KillDecoder<'m> {
    tree: &'m mut KillTree,
    description: Option<String>,
}

/// Position carried from one body line to the next
#[derive(Default)]
struct NodeCursor {
    kill: Option<String>,
    key: Option<NodeKey>,
}

impl<'m> KillDecoder<'m> {
    /// `description` is the kill the output file requested a matrix for.
    /// An empty description counts as none.
    pub fn new(tree: &'m mut KillTree, description: Option<&str>) -> Self {
        Self {
            tree,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }

    pub fn read(&mut self, path: &Path) -> Result<()> {
        debug!("Reading kill definition file {}", path.display());
        let mut reader = LineReader::open(path)?;
        self.decode(&mut reader)
    }

    pub fn read_from<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.decode(&mut LineReader::new(input))
    }

    fn decode<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        if reader.next_line()?.is_none() {
            debug!("kill definition file is empty");
            return Ok(());
        }
        self.read_header(reader)?;

        let mut cursor = NodeCursor::default();
        while let Some(line) = reader.next_line()? {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(first) = tokens.first() else {
                continue;
            };
            let line_no = reader.line_no();

            if first.starts_with(['k', 'K']) {
                let kill = first.to_lowercase();
                let node = parse_int(field(&tokens, 1, line_no, "node number")?, line_no, "node number")?;
                let operator = field(&tokens, 2, line_no, "node operator")?;
                cursor.kill = Some(kill.clone());
                self.open_node(&mut cursor, kill, node, operator, &tokens[3..]);
            } else if first.starts_with('&') {
                let key = cursor.key.as_ref().ok_or_else(|| {
                    DecodeError::structural(line_no, "continuation line before any kill node")
                })?;
                if let Some(node) = self.tree.nodes.get_mut(key) {
                    node.items.extend(tokens[1..].iter().map(|item| item.to_lowercase()));
                }
            } else if first.starts_with('#') {
                continue;
            } else if first.chars().all(|c| c.is_ascii_digit()) {
                let kill = cursor.kill.clone().ok_or_else(|| {
                    DecodeError::structural(line_no, format!("node {} appears before any kill", first))
                })?;
                let node = parse_int(first, line_no, "node number")?;
                let operator = field(&tokens, 1, line_no, "node operator")?;
                self.open_node(&mut cursor, kill, node, operator, &tokens[2..]);
            } else {
                return Err(DecodeError::structural(
                    line_no,
                    format!("unrecognized token '{}' in kill file", first),
                ));
            }
        }

        debug!(
            "{} kill nodes across {} kills, active kill {:?}",
            self.tree.len(),
            self.tree.last_node.len(),
            self.tree.kill_id
        );
        Ok(())
    }

    /// `count label`, then one `kill_id a b description…` row per kill
    fn read_header<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        let line = reader.expect_line("kill count")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(DecodeError::structural(line_no, "can't read number of kills"));
        }
        self.tree.kill_count = parse_int(tokens[0], line_no, "kill count")?;

        for _ in 0..self.tree.kill_count {
            let line = reader.expect_line("kill header row")?;
            let line_no = reader.line_no();
            let fields = split_fields(&line, 3);
            let kill = field(&fields, 0, line_no, "kill id")?.to_lowercase();
            let description = fields.last().map(|d| d.trim()).unwrap_or_default();

            if self.description.as_deref() == Some(description) {
                trace!("kill {} matches '{}'", kill, description);
                self.tree.kill_id = Some(kill.clone());
            }
            self.tree.descriptions.push((kill, description.to_string()));
        }

        match (&self.description, &self.tree.kill_id) {
            (Some(description), None) => Err(DecodeError::cross_reference(
                reader.line_no(),
                format!("no kill in the header is described as '{}'", description),
            )),
            _ => Ok(()),
        }
    }

    fn open_node(&mut self, cursor: &mut NodeCursor, kill: String, node: u32, operator: &str, items: &[&str]) {
        let key = NodeKey::new(kill.clone(), node);
        self.tree.nodes.insert(
            key.clone(),
            KillNode {
                operator: operator.to_string(),
                items: items.iter().map(|item| item.to_lowercase()).collect(),
            },
        );
        self.tree.last_node.insert(kill, node);
        cursor.key = Some(key);
    }
}
