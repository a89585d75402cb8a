//! Exec command implementation.

use kls_core::{Config, Store, StoreError};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// `insert <key> <value>`
    Insert {
        /// Key bytes
        key: Vec<u8>,
        /// Value bytes
        value: Vec<u8>,
    },
    /// `search <key> <index>`
    Search {
        /// Key bytes
        key: Vec<u8>,
        /// Value position
        index: usize,
    },
    /// `delete <key>`
    Delete {
        /// Key bytes
        key: Vec<u8>,
    },
}

impl ScriptCommand {
    fn op(&self) -> &'static str {
        match self {
            ScriptCommand::Insert { .. } => "insert",
            ScriptCommand::Search { .. } => "search",
            ScriptCommand::Delete { .. } => "delete",
        }
    }

    fn key(&self) -> &[u8] {
        match self {
            ScriptCommand::Insert { key, .. }
            | ScriptCommand::Search { key, .. }
            | ScriptCommand::Delete { key } => key,
        }
    }
}

/// Outcome of one script line.
#[derive(Debug, Serialize)]
pub struct ExecRecord {
    /// 1-based line number.
    pub line: usize,
    /// Operation name, or `parse` for lines that did not parse.
    pub op: &'static str,
    /// Key, as written by [`render_bytes`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `ok` or an error status.
    pub status: &'static str,
    /// Value returned by a search, as written by [`render_bytes`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecRecord {
    fn text(&self) -> String {
        let subject = match &self.key {
            Some(key) => format!("{} {}", self.op, key),
            None => self.op.to_string(),
        };
        match (&self.value, &self.message) {
            (Some(value), _) => format!("{}: {}", subject, value),
            (None, Some(message)) => format!("{}: {} ({})", subject, self.status, message),
            (None, None) => format!("{}: {}", subject, self.status),
        }
    }
}

/// Status name for a store error.
pub fn status_name(err: &StoreError) -> &'static str {
    match err {
        StoreError::InvalidArgument { .. } => "invalid-argument",
        StoreError::SizeExceeded { .. } => "size-exceeded",
        StoreError::OutOfMemory => "out-of-memory",
        StoreError::KeyNotFound => "key-not-found",
        StoreError::IndexOutOfRange { .. } => "index-out-of-range",
        StoreError::KeyLimitReached { .. } => "key-limit-reached",
        StoreError::InvalidConfig { .. } => "invalid-config",
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Renders bytes so that [`parse_line`] reads them back unchanged.
///
/// Printable UTF-8 without whitespace is written as-is; anything else
/// (including the empty string and text starting with `hex:`) is written
/// as `hex:` followed by lowercase hex.
pub fn render_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text)
            if !text.is_empty()
                && !text.starts_with("hex:")
                && !text.chars().any(|c| c.is_whitespace() || c.is_control()) =>
        {
            text.to_string()
        }
        _ => format!("hex:{}", hex_encode(bytes)),
    }
}

fn decode_arg(arg: &str) -> Result<Vec<u8>, String> {
    let Some(hex) = arg.strip_prefix("hex:") else {
        return Ok(arg.as_bytes().to_vec());
    };
    // ASCII hex digits only, so every two-byte chunk is valid UTF-8.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid hex argument: {arg}"));
    }
    if hex.len() % 2 != 0 {
        return Err(format!("odd-length hex argument: {arg}"));
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| format!("invalid hex argument: {arg}"))
        })
        .collect()
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let command = match parts.as_slice() {
        ["insert", key, value] => ScriptCommand::Insert {
            key: decode_arg(key)?,
            value: decode_arg(value)?,
        },
        ["search", key, index] => ScriptCommand::Search {
            key: decode_arg(key)?,
            index: index
                .parse()
                .map_err(|_| format!("invalid index: {index}"))?,
        },
        ["delete", key] => ScriptCommand::Delete {
            key: decode_arg(key)?,
        },
        [op, ..] if matches!(*op, "insert" | "search" | "delete") => {
            return Err(format!("wrong number of arguments for {op}"));
        }
        [op, ..] => return Err(format!("unknown command: {op}")),
        [] => return Ok(None),
    };
    Ok(Some(command))
}

/// Executes one command against `store`.
pub fn execute(store: &Store, line: usize, command: &ScriptCommand) -> ExecRecord {
    let result = match command {
        ScriptCommand::Insert { key, value } => store.insert(key, value).map(|()| None),
        ScriptCommand::Search { key, index } => store
            .search(key, *index)
            .map(|v| Some(render_bytes(&v))),
        ScriptCommand::Delete { key } => store.delete(key).map(|()| None),
    };

    let (status, value, message) = match result {
        Ok(value) => ("ok", value, None),
        Err(e) => (status_name(&e), None, Some(e.to_string())),
    };

    ExecRecord {
        line,
        op: command.op(),
        key: Some(render_bytes(command.key())),
        status,
        value,
        message,
    }
}

/// Summary of a script run.
#[derive(Debug, Default, Serialize)]
pub struct ExecSummary {
    /// Commands executed.
    pub executed: usize,
    /// Commands that returned an error.
    pub failed: usize,
    /// Lines that did not parse.
    pub invalid: usize,
}

/// Runs every line of `reader` against `store`, writing one result per
/// command to `out`.
pub fn run_script<R: BufRead, W: Write>(
    store: &Store,
    reader: R,
    out: &mut W,
    json: bool,
) -> io::Result<ExecSummary> {
    let mut summary = ExecSummary::default();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let record = match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                let record = execute(store, n + 1, &command);
                summary.executed += 1;
                if record.status != "ok" {
                    summary.failed += 1;
                }
                record
            }
            Err(message) => {
                tracing::warn!(line = n + 1, %message, "skipping line");
                summary.invalid += 1;
                ExecRecord {
                    line: n + 1,
                    op: "parse",
                    key: None,
                    status: "invalid",
                    value: None,
                    message: Some(message),
                }
            }
        };

        if json {
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", record.text())?;
        }
    }

    Ok(summary)
}

/// Runs the exec command.
pub fn run(
    config: Config,
    script: Option<&Path>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(config)?;
    let json = format == "json";
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = match script {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("cannot open script {}: {}", path.display(), e))?;
            run_script(&store, BufReader::new(file), &mut out, json)?
        }
        None => run_script(&store, io::stdin().lock(), &mut out, json)?,
    };

    tracing::info!(
        executed = summary.executed,
        failed = summary.failed,
        invalid = summary.invalid,
        "script finished"
    );

    if summary.invalid > 0 {
        return Err(format!("{} line(s) could not be parsed", summary.invalid).into());
    }
    Ok(())
}
