//! Text (`.ma`) scene header.
//!
//! The header is every statement above the first `createNode` line (or the
//! closing `// End of` comment). Statements are sorted into buckets on load
//! and written back bucket by bucket, so lines the parser does not understand
//! keep their relative order but move below the known statements.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::general::error::{FormatError, HeaderError, Result};
use crate::general::header_store::parse_version;
use crate::scene::statement::{Token, escape, tokenize};
use crate::scene::{Encoding, MetaKind, SceneHeader, UnitKind, check_target};
use crate::storage::file::{open_for_scan, same_file};

const COMMENT: &str = "//";
const FILE: &str = "file ";
const REQUIRES: &str = "requires ";
const UNITS: &str = "currentUnit ";
const FILE_INFO: &str = "fileInfo ";

/// Statements that may continue over several lines until their `;`.
const STATEMENTS: [&str; 4] = [FILE, REQUIRES, UNITS, FILE_INFO];

const BODY_MARKERS: [&[u8]; 2] = [b"createNode", b"// End of"];

/// A `requires` statement naming a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequirement {
    pub version: String,
    /// `-flag value` tokens written before the plugin name.
    pub flags: Vec<Token>,
}

/// Parsed header statements, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHeader {
    pub comments: Vec<String>,
    pub files: Vec<String>,
    pub maya_version: Option<String>,
    pub plugins: IndexMap<String, PluginRequirement>,
    pub units: IndexMap<String, String>,
    pub fileinfo: IndexMap<String, String>,
    pub unknown: Vec<String>,
}

impl TextHeader {
    pub fn parse(statements: impl IntoIterator<Item = String>) -> Self {
        let mut header = Self::default();
        for statement in statements {
            header.push(statement);
        }
        header
    }

    fn push(&mut self, statement: String) {
        let text = statement.trim_start();

        if text.starts_with(COMMENT) {
            self.comments.push(statement);
            return;
        }
        if text.starts_with(FILE) {
            self.files.push(statement);
            return;
        }

        let parsed = if let Some(args) = text.strip_prefix(REQUIRES) {
            self.push_requires(args)
        } else if let Some(args) = text.strip_prefix(UNITS) {
            self.push_units(args)
        } else if let Some(args) = text.strip_prefix(FILE_INFO) {
            self.push_fileinfo(args)
        } else {
            false
        };

        if !parsed {
            if !text.is_empty() {
                debug!(statement = %text, "keeping unrecognized header statement");
            }
            self.unknown.push(statement);
        }
    }

    fn push_requires(&mut self, args: &str) -> bool {
        let Some(tokens) = tokenize(args) else {
            warn!(args, "malformed requires statement");
            return false;
        };

        if let [Token::Bare(word), version] = tokens.as_slice() {
            if word == "maya" {
                self.maya_version = Some(version.text().to_string());
                return true;
            }
        }

        let mut flags = Vec::new();
        let mut rest = tokens.as_slice();
        while let [flag, value, tail @ ..] = rest {
            if !flag.is_flag() {
                break;
            }
            flags.push(flag.clone());
            flags.push(value.clone());
            rest = tail;
        }

        match rest {
            [name, version] => {
                self.plugins.insert(
                    name.text().to_string(),
                    PluginRequirement {
                        version: version.text().to_string(),
                        flags,
                    },
                );
                true
            }
            _ => false,
        }
    }

    fn push_units(&mut self, args: &str) -> bool {
        let Some(tokens) = tokenize(args) else {
            return false;
        };
        if tokens.len() % 2 != 0 || !tokens.chunks(2).all(|pair| pair[0].is_flag()) {
            warn!(args, "malformed currentUnit statement");
            return false;
        }
        for pair in tokens.chunks(2) {
            self.units
                .insert(pair[0].text().to_string(), pair[1].text().to_string());
        }
        true
    }

    fn push_fileinfo(&mut self, args: &str) -> bool {
        match tokenize(args).as_deref() {
            Some([key, value]) => {
                self.fileinfo
                    .insert(key.text().to_string(), value.text().to_string());
                true
            }
            _ => {
                warn!(args, "malformed fileInfo statement");
                false
            }
        }
    }

    /// Renders the header, one statement per line, ending with `newline`.
    pub fn render(&self, newline: &str) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.extend(self.comments.iter().cloned());
        lines.extend(self.files.iter().cloned());

        if let Some(version) = &self.maya_version {
            lines.push(format!("{REQUIRES}maya \"{}\";", escape(version)));
        }

        for (name, plugin) in &self.plugins {
            let mut words: Vec<String> = plugin.flags.iter().map(Token::to_string).collect();
            words.push(Token::Quoted(name.clone()).to_string());
            words.push(Token::Quoted(plugin.version.clone()).to_string());
            lines.push(format!("{REQUIRES}{};", words.join(" ")));
        }

        if !self.units.is_empty() {
            let pairs: Vec<String> = self
                .units
                .iter()
                .map(|(flag, value)| format!("{flag} {value}"))
                .collect();
            lines.push(format!("{UNITS}{};", pairs.join(" ")));
        }

        for (key, value) in &self.fileinfo {
            lines.push(format!("{FILE_INFO}\"{}\" \"{}\";", escape(key), escape(value)));
        }

        lines.extend(self.unknown.iter().cloned());

        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push_str(newline);
        }
        out
    }
}

/// Statements of a text header and where the body starts.
#[derive(Debug)]
struct HeaderSplit {
    statements: Vec<String>,
    body_offset: u64,
    newline: &'static str,
}

/// Splits raw file bytes into header statements and the body offset.
///
/// Every line is its own statement, except that a `file`, `requires`,
/// `currentUnit` or `fileInfo` statement runs until a line ends in `;`.
/// Continuation lines are joined with the file's newline.
fn split_header(bytes: &[u8]) -> Result<HeaderSplit> {
    let mut statements = Vec::new();
    let mut pending: Option<String> = None;
    let mut newline = "\n";
    let mut offset = 0usize;

    for (index, raw) in bytes.split_inclusive(|&b| b == b'\n').enumerate() {
        if BODY_MARKERS.iter().any(|marker| raw.starts_with(marker)) {
            break;
        }
        if index == 0 && raw.ends_with(b"\r\n") {
            newline = "\r\n";
        }
        offset += raw.len();

        let line = std::str::from_utf8(raw).map_err(|_| FormatError::NotUtf8 { line: index + 1 })?;
        let line = line.trim_end_matches(['\r', '\n']);
        let ends_statement = line.trim_end().ends_with(';');

        match pending.take() {
            Some(mut statement) => {
                statement.push_str(newline);
                statement.push_str(line);
                if ends_statement {
                    statements.push(statement);
                } else {
                    pending = Some(statement);
                }
            }
            None => {
                let text = line.trim();
                if !STATEMENTS.iter().any(|prefix| text.starts_with(prefix)) || ends_statement {
                    statements.push(line.to_string());
                } else {
                    pending = Some(line.to_string());
                }
            }
        }
    }

    statements.extend(pending);

    Ok(HeaderSplit {
        statements,
        body_offset: offset as u64,
        newline,
    })
}

/// Text scene header editor.
#[derive(Debug)]
pub struct TextScene {
    path: PathBuf,
    header: TextHeader,
    body_offset: u64,
    newline: &'static str,
}

impl TextScene {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path)?;
        let split = split_header(&bytes)?;
        let header = TextHeader::parse(split.statements);

        debug!(
            path = %path.display(),
            fileinfo = header.fileinfo.len(),
            plugins = header.plugins.len(),
            body_offset = split.body_offset,
            "text header loaded"
        );
        Ok(Self {
            path,
            header,
            body_offset: split.body_offset,
            newline: split.newline,
        })
    }

    pub fn header(&self) -> &TextHeader {
        &self.header
    }

    fn read_body(&self) -> Result<Vec<u8>> {
        let mut file = open_for_scan(&self.path)?;
        file.seek(SeekFrom::Start(self.body_offset))?;
        let mut body = Vec::new();
        file.read_to_end(&mut body)?;
        Ok(body)
    }
}

fn validate(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(HeaderError::invalid("key", "must not be empty"));
    }
    if key.contains('\0') || value.contains('\0') {
        return Err(HeaderError::invalid("value", "must not contain NUL"));
    }
    Ok(())
}

impl SceneHeader for TextScene {
    fn path(&self) -> &Path {
        &self.path
    }

    fn encoding(&self) -> Encoding {
        Encoding::Text
    }

    fn get(&self, kind: MetaKind, key: &str) -> Option<String> {
        match kind {
            MetaKind::FileInfo => self.header.fileinfo.get(key).cloned(),
            MetaKind::Plugin => self.header.plugins.get(key).map(|p| p.version.clone()),
        }
    }

    fn set(&mut self, kind: MetaKind, key: &str, value: &str) -> Result<()> {
        validate(key, value)?;
        match kind {
            MetaKind::FileInfo => {
                self.header.fileinfo.insert(key.to_string(), value.to_string());
            }
            MetaKind::Plugin => match self.header.plugins.get_mut(key) {
                Some(plugin) => plugin.version = value.to_string(),
                None => {
                    self.header.plugins.insert(
                        key.to_string(),
                        PluginRequirement {
                            version: value.to_string(),
                            flags: Vec::new(),
                        },
                    );
                }
            },
        }
        Ok(())
    }

    fn remove(&mut self, kind: MetaKind, key: &str) -> Option<String> {
        match kind {
            MetaKind::FileInfo => self.header.fileinfo.shift_remove(key),
            MetaKind::Plugin => self.header.plugins.shift_remove(key).map(|p| p.version),
        }
    }

    fn list(&self, kind: MetaKind) -> Vec<(String, String)> {
        match kind {
            MetaKind::FileInfo => self
                .header
                .fileinfo
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            MetaKind::Plugin => self
                .header
                .plugins
                .iter()
                .map(|(k, p)| (k.clone(), p.version.clone()))
                .collect(),
        }
    }

    fn replace_all(&mut self, kind: MetaKind, entries: &IndexMap<String, String>) -> Result<()> {
        for (key, value) in entries {
            validate(key, value)?;
        }
        match kind {
            MetaKind::FileInfo => self.header.fileinfo.clear(),
            MetaKind::Plugin => self.header.plugins.clear(),
        }
        for (key, value) in entries {
            self.set(kind, key, value)?;
        }
        Ok(())
    }

    fn maya_version(&self) -> Option<u32> {
        parse_version(self.header.maya_version.as_deref()?)
    }

    fn set_maya_version(&mut self, version: u32) {
        self.header.maya_version = Some(version.to_string());
    }

    fn unit(&self, unit: UnitKind) -> Option<String> {
        let flag = match unit {
            UnitKind::Linear => "-l",
            UnitKind::Angle => "-a",
            UnitKind::Time => "-t",
        };
        self.header.units.get(flag).cloned()
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        check_target(Encoding::Text, path)?;

        let header = self.header.render(self.newline);
        let body = self.read_body()?;

        let mut out = Vec::with_capacity(header.len() + body.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&body);

        let in_place = same_file(&self.path, path);
        fs::write(path, out)?;
        info!(path = %path.display(), header_length = header.len(), "text scene written");

        if in_place {
            self.body_offset = header.len() as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "//Maya ASCII 2022 scene\n\
//Name: cube.ma\n\
requires maya \"2022\";\n\
requires -nodeType \"aiOptions\" \"mtoa\" \"5.1.0\";\n\
currentUnit -l centimeter -a degree -t film;\n\
fileInfo \"application\" \"maya\";\n\
fileInfo \"Note\" \"say \\\"hi\\\"\";\n\
createNode transform -n \"pCube1\";\n\
\tsetAttr \".t\" -type \"double3\" 0 1 0 ;\n";

    fn load(text: &str) -> (TextHeader, u64) {
        let split = split_header(text.as_bytes()).unwrap();
        (TextHeader::parse(split.statements), split.body_offset)
    }

    #[test]
    fn parses_known_statements() {
        let (header, body_offset) = load(SCENE);
        assert_eq!(header.comments.len(), 2);
        assert_eq!(header.maya_version.as_deref(), Some("2022"));
        assert_eq!(header.plugins["mtoa"].version, "5.1.0");
        assert_eq!(header.plugins["mtoa"].flags.len(), 2);
        assert_eq!(header.units["-t"], "film");
        assert_eq!(header.fileinfo["Note"], "say \"hi\"");
        assert!(header.unknown.is_empty());
        assert!(SCENE[body_offset as usize..].starts_with("createNode transform"));
    }

    #[test]
    fn render_reproduces_canonical_header() {
        let (header, body_offset) = load(SCENE);
        assert_eq!(header.render("\n"), &SCENE[..body_offset as usize]);
    }

    #[test]
    fn multi_line_statements_are_joined() {
        let text = "file -rdi 1 -ns \"ref\"\n\t\t\"C:/scenes/ref.ma\";\nfileInfo \"a\" \"b\";\n// End of cube.ma\n";
        let (header, body_offset) = load(text);
        assert_eq!(header.files, vec!["file -rdi 1 -ns \"ref\"\n\t\t\"C:/scenes/ref.ma\";".to_string()]);
        assert_eq!(header.fileinfo["a"], "b");
        assert_eq!(&text[body_offset as usize..], "// End of cube.ma\n");
    }

    #[test]
    fn unterminated_unknown_line_stands_alone() {
        let text = "//Maya ASCII 2022 scene\nsomething odd\nrequires maya \"2022\";\nfileInfo \"a\" \"b\";\ncreateNode x;\n";
        let (header, body_offset) = load(text);
        assert_eq!(header.maya_version.as_deref(), Some("2022"));
        assert_eq!(header.fileinfo["a"], "b");
        assert_eq!(header.unknown, vec!["something odd".to_string()]);
        assert_eq!(&text[body_offset as usize..], "createNode x;\n");
    }

    #[test]
    fn unknown_statements_keep_order_below_known_ones() {
        let text = "select -ne :time1;\nfileInfo \"a\" \"b\";\n\nrequires maya \"2024\";\ncreateNode x;\n";
        let (header, _) = load(text);
        assert_eq!(header.unknown, vec!["select -ne :time1;".to_string(), String::new()]);
        assert_eq!(
            header.render("\n"),
            "requires maya \"2024\";\nfileInfo \"a\" \"b\";\nselect -ne :time1;\n\n"
        );
    }

    #[test]
    fn crlf_is_detected() {
        let split = split_header(b"//Maya ASCII\r\nfileInfo \"a\" \"b\";\r\ncreateNode x;\r\n").unwrap();
        assert_eq!(split.newline, "\r\n");
        assert_eq!(split.statements[1], "fileInfo \"a\" \"b\";");
        assert_eq!(split.body_offset, 33);
    }

    #[test]
    fn invalid_utf8_header_is_a_format_error() {
        let err = split_header(b"//ok\nfileInfo \"a\" \"\xff\";\n").unwrap_err();
        assert!(matches!(err, HeaderError::Format(FormatError::NotUtf8 { line: 2 })));
    }

    #[test]
    fn file_without_body_marker_is_all_header() {
        let text = "requires maya \"2022\";\n";
        let (_, body_offset) = load(text);
        assert_eq!(body_offset as usize, text.len());
    }
}
