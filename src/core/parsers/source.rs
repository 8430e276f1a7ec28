use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{BytePos, FileName, Globals, SourceFile, SourceMap, Span, sync::Lrc};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// Source dialect, decided from the file extension.
///
/// TypeScript files carry type annotations, so the lambda-signature check
/// can ask whether parameters are typed. JavaScript files have no types to
/// resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
}

impl Dialect {
    pub fn from_path(file_path: &str) -> Self {
        if file_path.ends_with(".ts") || file_path.ends_with(".tsx") || file_path.ends_with(".mts")
        {
            Dialect::TypeScript
        } else {
            Dialect::JavaScript
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, Dialect::TypeScript)
    }
}

/// A parsed source file together with everything needed to map AST spans
/// back to text, byte offsets and line numbers.
pub struct ParsedSource {
    pub file_path: String,
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub dialect: Dialect,
    file: Lrc<SourceFile>,
    code: String,
}

impl ParsedSource {
    /// Full source text of the file.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Byte offset and length of a span, relative to the start of the file.
    ///
    /// Returns `None` for spans that do not lie inside this file (dummy spans,
    /// spans from another source map, inverted spans).
    pub fn source_range(&self, span: Span) -> Option<(usize, usize)> {
        let start = self.file.start_pos.0;
        if span.is_dummy() || span.lo.0 < start || span.hi.0 < span.lo.0 {
            return None;
        }
        let offset = (span.lo.0 - start) as usize;
        let length = (span.hi.0 - span.lo.0) as usize;
        if offset + length > self.code.len() {
            return None;
        }
        Some((offset, length))
    }

    /// Exact source text covered by a span.
    pub fn text(&self, span: Span) -> Option<&str> {
        let (offset, length) = self.source_range(span)?;
        self.code.get(offset..offset + length)
    }

    /// 1-indexed line number of a byte offset.
    pub fn line_number(&self, offset: usize) -> usize {
        self.position(offset).0
    }

    /// 1-indexed line and column of a byte offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let pos = BytePos(self.file.start_pos.0 + offset as u32);
        let loc = self.source_map.lookup_char_pos(pos);
        (loc.line, loc.col_display + 1)
    }

    /// Content of a 1-indexed source line, without the line terminator.
    pub fn line_text(&self, line: usize) -> String {
        self.file
            .get_line(line.saturating_sub(1))
            .map(|cow| cow.trim_end_matches(['\r', '\n']).to_string())
            .unwrap_or_default()
    }
}

/// Parse JavaScript/TypeScript source code into an AST.
///
/// Accepts a shared SourceMap so files can be parsed on separate threads,
/// each with its own map.
pub fn parse_source(
    code: String,
    file_path: &str,
    source_map: Arc<SourceMap>,
) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    let dialect = Dialect::from_path(file_path);

    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.clone());

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: !file_path.ends_with(".ts") && !file_path.ends_with(".mts"),
            decorators: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e))?;

        Ok(ParsedSource {
            file_path: file_path.to_string(),
            module,
            source_map,
            dialect,
            file: source_file,
            code,
        })
    })
}

/// Parse a snippet with a fresh SourceMap.
///
/// Convenience for tests and library callers analysing a single buffer.
pub fn parse_snippet(code: &str, file_path: &str) -> Result<ParsedSource> {
    parse_source(code.to_string(), file_path, Arc::new(SourceMap::default()))
}
