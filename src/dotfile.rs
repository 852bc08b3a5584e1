//! Dotfile rendering and deployment.
//!
//! Templates are rendered one line at a time. Each line is split into shell
//! words, tag spans such as `{% config app.name %}` are evaluated through a
//! [`TagRegistry`], and the words are joined back together with the original
//! indentation. A `# stop` line turns off rendering for the rest of the file.

use crate::constants::{DEFAULT_CLOSE, DEFAULT_OPEN, PREV_SUFFIX};
use crate::error::{Error, Result};
use crate::tag::TagRegistry;
use crate::words;
use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>\s*)(?P<body>.*)\n$").expect("line pattern is valid")
});

static STOP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#\s*stop\s*$").expect("stop pattern is valid")
});

/// Markers enclosing a tag span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    pub open: String,
    pub close: String,
}

impl Default for Delimiter {
    fn default() -> Self {
        Self { open: DEFAULT_OPEN.to_string(), close: DEFAULT_CLOSE.to_string() }
    }
}

impl Delimiter {
    /// # Errors
    /// * `Error::ConfigError` if either marker is empty
    pub fn new<O: Into<String>, C: Into<String>>(open: O, close: C) -> Result<Self> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() || close.is_empty() {
            return Err(Error::ConfigError("tag delimiters must not be empty".to_string()));
        }
        Ok(Self { open, close })
    }
}

/// Returns true for a `# stop` line, in any case and spacing.
pub fn is_stop_marker(line: &str) -> bool {
    STOP_PATTERN.is_match(line)
}

/// `<target>.prev`
pub fn prev_path<P: AsRef<Path>>(target: P) -> PathBuf {
    let mut path = target.as_ref().as_os_str().to_os_string();
    path.push(PREV_SUFFIX);
    PathBuf::from(path)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Copy,
    InTag,
}

/// Reassembles a single line.
struct LineRenderer<'a> {
    registry: &'a TagRegistry,
    delimiter: &'a Delimiter,
    state: State,
    out: String,
    tag_tokens: Vec<String>,
}

impl<'a> LineRenderer<'a> {
    fn new(registry: &'a TagRegistry, delimiter: &'a Delimiter, indent: &str) -> Self {
        Self {
            registry,
            delimiter,
            state: State::Copy,
            out: indent.to_string(),
            tag_tokens: Vec::new(),
        }
    }

    fn feed(&mut self, token: &str) -> Result<()> {
        match self.state {
            State::Copy => {
                self.copy_token(token);
                Ok(())
            }
            State::InTag => self.tag_token(token),
        }
    }

    fn push_word(&mut self, word: &str) {
        self.out.push_str(word);
        self.out.push(' ');
    }

    fn copy_token(&mut self, token: &str) {
        if token.is_empty() {
            self.push_word("''");
            return;
        }
        if words::has_whitespace(token) {
            let escaped = token.replace('\\', r"\\").replace('"', r#"\""#);
            self.push_word(&format!("\"{escaped}\""));
            return;
        }
        match token.strip_suffix(self.delimiter.open.as_str()) {
            // The value is glued to whatever precedes the open marker.
            Some(prefix) => {
                self.out.push_str(prefix);
                self.state = State::InTag;
            }
            None => self.push_word(token),
        }
    }

    fn tag_token(&mut self, token: &str) -> Result<()> {
        let rest = match token.strip_prefix(self.delimiter.close.as_str()) {
            Some(rest) if !words::has_whitespace(token) => rest,
            _ => {
                self.tag_tokens.push(token.to_string());
                return Ok(());
            }
        };

        let value = self.registry.parse_to_string(&self.tag_tokens)?;
        self.out.push_str(&words::quote(&value));
        self.tag_tokens.clear();
        self.state = State::Copy;

        if rest.is_empty() {
            self.out.push(' ');
        } else {
            // Trailing text may itself open the next span: `%}/{%`.
            self.copy_token(rest);
        }
        Ok(())
    }

    fn finish(self, line: &str) -> Result<String> {
        if self.state == State::InTag {
            return Err(Error::MalformedLine { line: line.to_string() });
        }
        let mut rendered = self.out.trim_end().to_string();
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Renders one template line, which must end in exactly one `\n`.
///
/// # Errors
/// * `Error::MalformedLine` if the line has no trailing newline, has
///   unbalanced quotes, or leaves a tag span open
/// * Any error raised while evaluating a tag
pub fn render_line(registry: &TagRegistry, delimiter: &Delimiter, line: &str) -> Result<String> {
    let captures = LINE_PATTERN
        .captures(line)
        .ok_or_else(|| Error::MalformedLine { line: line.to_string() })?;
    let indent = captures.name("indent").map_or("", |m| m.as_str());
    let body = captures.name("body").map_or("", |m| m.as_str());

    let mut renderer = LineRenderer::new(registry, delimiter, indent);
    for token in words::split(body)? {
        renderer.feed(&token)?;
    }
    renderer.finish(line)
}

/// Outcome of deploying a single file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Lines that went through tag substitution
    pub rendered_lines: usize,
    /// Whether a `# stop` line was found
    pub stopped: bool,
    /// Bytes copied verbatim after the stop line
    pub verbatim_bytes: u64,
    /// Where the previous target was moved to, if it existed
    pub backup: Option<PathBuf>,
}

/// Renders `reader` into `writer`.
///
/// Lines are rendered until a stop line. The stop line itself is dropped and
/// everything after it is copied byte-for-byte.
pub fn render_into<R: BufRead, W: Write>(
    registry: &TagRegistry,
    delimiter: &Delimiter,
    mut reader: R,
    writer: &mut W,
) -> Result<DeployReport> {
    let mut report = DeployReport::default();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if is_stop_marker(&line) {
            debug!("Stop marker found, copying the rest verbatim");
            report.stopped = true;
            report.verbatim_bytes = io::copy(&mut reader, writer)?;
            break;
        }
        writer.write_all(render_line(registry, delimiter, &line)?.as_bytes())?;
        report.rendered_lines += 1;
    }
    Ok(report)
}

/// Deploys one template file to one destination.
#[derive(Debug, Clone)]
pub struct DotfileDeployer {
    source: PathBuf,
    target: PathBuf,
    delimiter: Delimiter,
}

impl DotfileDeployer {
    pub fn new<S: Into<PathBuf>, T: Into<PathBuf>>(source: S, target: T) -> Self {
        Self { source: source.into(), target: target.into(), delimiter: Delimiter::default() }
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Moves an existing target to `<target>.prev`, deleting any older
    /// backup first. Symlinks are moved, not followed.
    pub fn backup_target(&self) -> Result<Option<PathBuf>> {
        if fs::symlink_metadata(&self.target).is_err() {
            return Ok(None);
        }
        let prev = prev_path(&self.target);
        if fs::symlink_metadata(&prev).is_ok() {
            debug!("Removing old backup {}", prev.display());
            fs::remove_file(&prev)?;
        }
        debug!("Backing up {} to {}", self.target.display(), prev.display());
        fs::rename(&self.target, &prev)?;
        Ok(Some(prev))
    }

    /// Opens the source, backs up the target, then writes the rendered
    /// source to it.
    ///
    /// A failure part-way leaves a partial target behind; the backup is
    /// kept either way.
    pub fn deploy(&self, registry: &TagRegistry) -> Result<DeployReport> {
        let reader = BufReader::new(File::open(&self.source)?);
        let backup = self.backup_target()?;
        if let Some(parent) = self.target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&self.target)?);
        let mut report = render_into(registry, &self.delimiter, reader, &mut writer)?;
        writer.flush()?;

        report.backup = backup;
        info!("Deployed {} to {}", self.source.display(), self.target.display());
        Ok(report)
    }
}

/// Deploys `source` to `target` with the default delimiters.
pub fn deploy_dotfile<S: Into<PathBuf>, T: Into<PathBuf>>(
    registry: &TagRegistry,
    source: S,
    target: T,
) -> Result<DeployReport> {
    DotfileDeployer::new(source, target).deploy(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_marker_variants() {
        assert!(is_stop_marker("# stop\n"));
        assert!(is_stop_marker("  #STOP  \n"));
        assert!(is_stop_marker("#Stop"));
        assert!(!is_stop_marker("# stop here\n"));
        assert!(!is_stop_marker("stop\n"));
    }

    #[test]
    fn prev_path_appends_suffix() {
        assert_eq!(prev_path("/home/ink/.bashrc"), PathBuf::from("/home/ink/.bashrc.prev"));
    }

    #[test]
    fn empty_delimiters_are_rejected() {
        assert!(Delimiter::new("", "%}").is_err());
        assert!(Delimiter::new("<<", ">>").is_ok());
    }
}
