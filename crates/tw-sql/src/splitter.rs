//! Statement splitting
//!
//! Raw SQL is tokenized once; `;` tokens separate statements. Because the
//! tokenizer understands quoting and comments, a `;` inside `'...'`,
//! `` `...` ``, `-- ...` or `/* ... */` stays part of its statement.
//! Statement text is sliced out of the source by token span, never
//! re-rendered from tokens, so literals reach the server byte-for-byte.

use crate::dialect::dialect_for;
use crate::error::{SqlError, SqlResult};
use sqlparser::tokenizer::{Location, Span, Token, TokenWithSpan, Tokenizer, Whitespace};
use tw_core::{CommentMode, DbType};

/// A single executable statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based position in the batch
    pub index: usize,
    /// Statement text without the trailing delimiter
    pub sql: String,
}

/// Ordered statements derived from one script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBatch {
    statements: Vec<Statement>,
}

impl StatementBatch {
    /// Build a batch from already-separated statement texts, in order
    pub fn from_sql<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statements = texts
            .into_iter()
            .enumerate()
            .map(|(i, sql)| Statement {
                index: i + 1,
                sql: sql.into(),
            })
            .collect();
        Self { statements }
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// True when the script held no executable statement
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Statements in source order
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Statement texts in source order
    pub fn sql_texts(&self) -> Vec<&str> {
        self.statements.iter().map(|s| s.sql.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a StatementBatch {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl IntoIterator for StatementBatch {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// Split `sql` into statements using the lexical rules of `db_type`.
///
/// Fragments holding only whitespace and comments are dropped. A line that
/// opens with `--` is a comment in every dialect and never reaches the server.
/// With [`CommentMode::Strip`] comments are removed from the statements and
/// any line they leave blank is dropped as well.
pub fn split_statements(
    sql: &str,
    db_type: DbType,
    mode: CommentMode,
) -> SqlResult<StatementBatch> {
    let (lexed_text, tokens) = tokenize(sql, db_type)?;

    let source = SourceText::new(sql);
    let lexed = SourceText::new(&lexed_text);
    let texts = tokens
        .split(|t| t.token == Token::SemiColon)
        .filter_map(|fragment| {
            let first = fragment.iter().position(is_significant)?;
            let last = fragment.iter().rposition(is_significant)?;
            let body = &fragment[first..=last];
            Some(match mode {
                CommentMode::Keep => {
                    let span = Span::new(body[0].span.start, body[body.len() - 1].span.end);
                    without_blanked_lines(source.slice(span), lexed.slice(span))
                }
                CommentMode::Strip => strip_comments(body, &lexed),
            })
        });

    Ok(StatementBatch::from_sql(texts))
}

/// Tokenize `sql`, treating every line that opens with `--` as a comment.
///
/// MySQL only starts a comment at `--` followed by whitespace, so `--note`
/// lexes as two minus signs. Such lines are blanked in a working copy and the
/// copy is tokenized again. Blanking keeps the char count of every line, so
/// token locations stay valid against the original text. Returns the working
/// copy together with its tokens.
fn tokenize(sql: &str, db_type: DbType) -> SqlResult<(String, Vec<TokenWithSpan>)> {
    let dialect = dialect_for(db_type);
    let mut lexed = sql.to_string();
    loop {
        let mut tokens = Vec::new();
        let result =
            Tokenizer::new(dialect.as_ref(), &lexed).tokenize_with_location_into_buf(&mut tokens);

        let lines = dash_comment_lines(&tokens);
        if lines.is_empty() {
            return match result {
                Ok(()) => Ok((lexed, tokens)),
                Err(e) => Err(SqlError::Tokenize {
                    message: e.message,
                    line: e.location.line,
                    column: e.location.column,
                }),
            };
        }
        for start in lines {
            blank_to_line_end(&mut lexed, start);
        }
    }
}

/// Start locations of `--` runs that open a line but were not lexed as a
/// comment.
///
/// Stops after the first such line whose remaining tokens run onto a later
/// line: everything after it was lexed from the wrong state.
fn dash_comment_lines(tokens: &[TokenWithSpan]) -> Vec<Location> {
    let mut found = Vec::new();
    let mut line_start = true;
    for (i, t) in tokens.iter().enumerate() {
        match &t.token {
            Token::Whitespace(Whitespace::Newline)
            | Token::Whitespace(Whitespace::SingleLineComment { .. }) => line_start = true,
            Token::Whitespace(Whitespace::Space) | Token::Whitespace(Whitespace::Tab) => {}
            Token::Minus if line_start && follows_directly(tokens.get(i + 1), t, Token::Minus) => {
                found.push(t.span.start);
                let line = t.span.start.line;
                let runs_on = tokens[i..]
                    .iter()
                    .take_while(|rest| rest.span.start.line == line)
                    .filter(|rest| !ends_line(&rest.token))
                    .any(|rest| rest.span.end.line > line);
                if runs_on {
                    break;
                }
                line_start = false;
            }
            _ => line_start = false,
        }
    }
    found
}

fn follows_directly(next: Option<&TokenWithSpan>, prev: &TokenWithSpan, token: Token) -> bool {
    next.is_some_and(|n| n.token == token && n.span.start == prev.span.end)
}

fn ends_line(token: &Token) -> bool {
    matches!(
        token,
        Token::Whitespace(Whitespace::Newline)
            | Token::Whitespace(Whitespace::SingleLineComment { .. })
    )
}

/// Replace the text from `start` to the end of its line with spaces, one per
/// char.
fn blank_to_line_end(text: &mut String, start: Location) {
    let from = SourceText::new(text).offset(start);
    let to = text[from..]
        .find(['\r', '\n'])
        .map_or(text.len(), |i| from + i);
    let blank = " ".repeat(text[from..to].chars().count());
    text.replace_range(from..to, &blank);
}

/// Statement text as written, minus the lines blanked by [`tokenize`].
fn without_blanked_lines(original: &str, lexed: &str) -> String {
    if original == lexed {
        return original.to_string();
    }
    original
        .split('\n')
        .zip(lexed.split('\n'))
        .filter(|(orig, lexed)| orig == lexed)
        .map(|(orig, _)| orig)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_significant(token: &TokenWithSpan) -> bool {
    !matches!(token.token, Token::Whitespace(_) | Token::EOF)
}

/// Rebuild a statement from its tokens without comments or blank lines.
///
/// Indentation before the first token of a line is kept, trailing spaces are
/// dropped, and a line holding only whitespace or comments disappears.
fn strip_comments(tokens: &[TokenWithSpan], source: &SourceText<'_>) -> String {
    let mut out = String::new();
    let mut pending = String::new();
    let mut line_has_content = false;
    let mut after_comment = false;

    for t in tokens {
        match &t.token {
            // A single-line comment consumes its newline.
            Token::Whitespace(Whitespace::Newline)
            | Token::Whitespace(Whitespace::SingleLineComment { .. }) => {
                pending.clear();
                after_comment = false;
                if line_has_content {
                    out.push('\n');
                    line_has_content = false;
                }
            }
            Token::Whitespace(Whitespace::MultiLineComment(_)) => {
                // Keeps `a/*x*/b` from gluing into `ab`.
                if line_has_content && pending.is_empty() {
                    pending.push(' ');
                }
                after_comment = true;
            }
            Token::Whitespace(_) => {
                if !(after_comment && (!pending.is_empty() || !line_has_content)) {
                    pending.push_str(source.slice(t.span));
                }
            }
            _ => {
                out.push_str(&pending);
                pending.clear();
                after_comment = false;
                out.push_str(source.slice(t.span));
                line_has_content = true;
            }
        }
    }
    out
}

/// Maps tokenizer locations (1-based line, 1-based char column) to byte
/// offsets in the original text.
struct SourceText<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceText<'a> {
    fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    fn offset(&self, location: Location) -> usize {
        let line = usize::try_from(location.line).unwrap_or(usize::MAX);
        let Some(&start) = self.line_starts.get(line.saturating_sub(1)) else {
            return self.text.len();
        };
        let column = usize::try_from(location.column)
            .unwrap_or(usize::MAX)
            .saturating_sub(1);
        self.text[start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(self.text.len())
    }

    fn slice(&self, span: Span) -> &'a str {
        let start = self.offset(span.start);
        let end = self.offset(span.end).max(start);
        &self.text[start..end]
    }
}

#[cfg(test)]
#[path = "splitter_test.rs"]
mod tests;
