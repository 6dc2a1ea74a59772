/**
 * Page Parser
 *
 * Splits a template into literal text, `{{ expr | filters }}` islands and
 * `{{#block}}` statements. Comments `{{* ... *}}` produce no fragment.
 */
use super::fragments::*;
use crate::chars;
use crate::config::ScriptConfig;
use crate::error::{Result, ScriptError};
use crate::expression_parser::lexer::Lexer;
use crate::expression_parser::parser::{ParseFlags, Parser};
use crate::parse_util::syntax_error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Parse a template into fragments
pub fn parse_page(source: &str, config: &ScriptConfig) -> Result<Vec<PageFragment>> {
    PageParser::new(config).parse(source)
}

pub struct PageParser<'c> {
    config: &'c ScriptConfig,
    parser: Parser,
}

impl<'c> PageParser<'c> {
    pub fn new(config: &'c ScriptConfig) -> Self {
        PageParser {
            config,
            parser: Parser::new().with_max_excerpt_length(config.max_excerpt_length),
        }
    }

    pub fn parse(&self, source: &str) -> Result<Vec<PageFragment>> {
        self.parse_range(source, 0, source.len())
    }

    fn error(&self, source: &str, index: usize, message: &str) -> ScriptError {
        syntax_error(source, index, self.config.max_excerpt_length, message)
    }

    fn parse_range(&self, source: &str, start: usize, end: usize) -> Result<Vec<PageFragment>> {
        let mut fragments = Vec::new();
        let mut text_start = start;

        while let Some(open) = find_within(source, text_start, end, OPEN) {
            if open > text_start {
                fragments.push(PageFragment::text(&source[text_start..open]));
            }

            let inner = skip_whitespace(source, open + OPEN.len());
            text_start = if source[open + OPEN.len()..].starts_with(chars::STAR) {
                match find_within(source, open + OPEN.len(), end, "*}}") {
                    Some(close) => close + "*}}".len(),
                    None => return Err(self.error(source, open, "Unterminated comment, missing '*}}'")),
                }
            } else if source[inner..].starts_with(chars::HASH) {
                let (block, block_end) = self.parse_block(source, open, end)?;
                fragments.push(PageFragment::Block(block));
                block_end
            } else if source[inner..].starts_with(chars::SLASH) || is_else_tag(&source[inner..]) {
                return Err(self.error(source, open, "Unexpected block tag outside of a block"));
            } else {
                let (fragment, fragment_end) = self.parse_variable(source, open)?;
                fragments.push(PageFragment::Variable(fragment));
                fragment_end
            };
        }

        if end > text_start {
            fragments.push(PageFragment::text(&source[text_start..end]));
        }
        Ok(fragments)
    }

    /// `{{ expr | filter | filter }}` starting at `open`
    fn parse_variable(&self, source: &str, open: usize) -> Result<(VariableFragment, usize)> {
        let lexer = Lexer::new(source).with_max_excerpt_length(self.config.max_excerpt_length);
        let (expression, mut index) =
            self.parser
                .parse_partial(source, open + OPEN.len(), ParseFlags::FILTER_EXPRESSION)?;

        let mut filters = Vec::new();
        loop {
            match lexer.scan_token(index)? {
                Some(token) if token.is_operator("|") => {
                    let (filter, end) = self.parser.parse_filter(source, token.end)?;
                    filters.push(filter);
                    index = end;
                }
                Some(token) if source[token.index..].starts_with(CLOSE) => {
                    index = token.index + CLOSE.len();
                    break;
                }
                Some(token) => {
                    return Err(lexer.error(
                        token.index,
                        &format!("Expected '}}}}' but found '{}'", token.str_value),
                    ))
                }
                None => return Err(lexer.error(open, "Unterminated expression, missing '}}'")),
            }
        }

        let fragment = VariableFragment {
            original_text: source[open..index].to_string(),
            expression,
            filters,
        };
        let name = fragment
            .last_filter_name()
            .or_else(|| fragment.expression.name());
        if let Some(name) = name {
            if self.config.remove_new_line_after_filters_named.contains(name) {
                index = skip_new_line(source, index);
            }
        }
        Ok((fragment, index))
    }

    /// `{{#name arg}} ... {{else arg}} ... {{/name}}` starting at `open`
    fn parse_block(&self, source: &str, open: usize, limit: usize) -> Result<(BlockFragment, usize)> {
        let name_start = skip_whitespace(source, open + OPEN.len()) + 1;
        let name_end = source[name_start..]
            .find(|c: char| !chars::is_identifier_part(c))
            .map_or(source.len(), |offset| name_start + offset);
        if name_end == name_start {
            return Err(self.error(source, open, "Expected block name after '{{#'"));
        }
        let name = &source[name_start..name_end];
        let tag_close = find_within(source, name_end, limit, CLOSE)
            .ok_or_else(|| self.error(source, open, "Unterminated block tag, missing '}}'"))?;
        let argument = source[name_end..tag_close].trim().to_string();
        let body_start = skip_new_line(source, tag_close + CLOSE.len());
        let unterminated = || {
            self.error(
                source,
                open,
                &format!("Unterminated block '{}', missing '{{{{/{}}}}}'", name, name),
            )
        };

        let verbatim = self.config.dont_evaluate_blocks_named.contains(name);
        let (sections, block_end) = if verbatim {
            let (close_tag, after) =
                find_closing_tag(source, body_start, limit, name).ok_or_else(unterminated)?;
            (vec![(String::new(), body_start, close_tag)], after)
        } else {
            self.split_sections(source, name, body_start, limit)?
                .ok_or_else(unterminated)?
        };
        let block_end = skip_new_line(source, block_end);

        let mut bodies = Vec::with_capacity(sections.len());
        for (section_argument, start, end) in sections {
            let body = if verbatim {
                if end > start {
                    vec![PageFragment::text(&source[start..end])]
                } else {
                    Vec::new()
                }
            } else {
                self.parse_range(source, start, end)?
            };
            bodies.push(ElseBlock {
                argument: section_argument,
                body,
            });
        }
        let mut bodies = bodies.into_iter();
        let body = bodies.next().map(|main| main.body).unwrap_or_default();

        Ok((
            BlockFragment {
                original_text: source[open..block_end].to_string(),
                name: name.to_string(),
                argument,
                body,
                else_blocks: bodies.collect(),
            },
            block_end,
        ))
    }

    /// Split a block body at top-level `{{else}}` tags, balancing nested blocks.
    /// Returns `(argument, start, end)` per section and the offset after `{{/name}}`.
    #[allow(clippy::type_complexity)]
    fn split_sections(
        &self,
        source: &str,
        name: &str,
        body_start: usize,
        limit: usize,
    ) -> Result<Option<(Vec<(String, usize, usize)>, usize)>> {
        let mut sections = Vec::new();
        let mut section_argument = String::new();
        let mut section_start = body_start;
        let mut depth = 0usize;
        let mut cursor = body_start;

        while let Some(tag) = find_within(source, cursor, limit, OPEN) {
            if source[tag + OPEN.len()..].starts_with(chars::STAR) {
                cursor = find_within(source, tag + OPEN.len(), limit, "*}}")
                    .map(|close| close + "*}}".len())
                    .ok_or_else(|| self.error(source, tag, "Unterminated comment, missing '*}}'"))?;
                continue;
            }
            let inner_start = skip_whitespace(source, tag + OPEN.len());
            let tag_end = find_within(source, inner_start, limit, CLOSE)
                .ok_or_else(|| self.error(source, tag, "Unterminated tag, missing '}}'"))?;
            let inner = source[inner_start..tag_end].trim_end();

            if inner.starts_with(chars::HASH) {
                depth += 1;
            } else if let Some(closing) = inner.strip_prefix(chars::SLASH) {
                if depth == 0 {
                    let closing = closing.trim();
                    if closing != name {
                        return Err(self.error(
                            source,
                            tag,
                            &format!(
                                "Expected '{{{{/{}}}}}' but found '{{{{/{}}}}}'",
                                name, closing
                            ),
                        ));
                    }
                    sections.push((section_argument, section_start, tag));
                    return Ok(Some((sections, tag_end + CLOSE.len())));
                }
                depth -= 1;
            } else if depth == 0 && is_else_tag(inner) {
                sections.push((std::mem::take(&mut section_argument), section_start, tag));
                section_argument = inner["else".len()..].trim().to_string();
                cursor = skip_new_line(source, tag_end + CLOSE.len());
                section_start = cursor;
                continue;
            }
            cursor = tag_end + CLOSE.len();
        }
        Ok(None)
    }
}

fn find_within(source: &str, from: usize, limit: usize, pattern: &str) -> Option<usize> {
    if from >= limit {
        return None;
    }
    source[from..limit].find(pattern).map(|offset| from + offset)
}

/// First `{{/name}}` at or after `from`, ignoring everything else
fn find_closing_tag(source: &str, from: usize, limit: usize, name: &str) -> Option<(usize, usize)> {
    let mut cursor = from;
    while let Some(tag) = find_within(source, cursor, limit, OPEN) {
        let inner = skip_whitespace(source, tag + OPEN.len());
        if source[inner..].starts_with(chars::SLASH) {
            if let Some(close) = find_within(source, inner, limit, CLOSE) {
                if source[inner + 1..close].trim() == name {
                    return Some((tag, close + CLOSE.len()));
                }
            }
        }
        cursor = tag + OPEN.len();
    }
    None
}

fn skip_whitespace(source: &str, index: usize) -> usize {
    source[index..]
        .find(|c: char| !chars::is_whitespace(c))
        .map_or(source.len(), |offset| index + offset)
}

/// Skip one `\n` or `\r\n` at `index`
fn skip_new_line(source: &str, index: usize) -> usize {
    let rest = &source[index..];
    if rest.starts_with("\r\n") {
        index + 2
    } else if rest.starts_with(chars::LF) {
        index + 1
    } else {
        index
    }
}

fn is_else_tag(inner: &str) -> bool {
    inner
        .strip_prefix("else")
        .is_some_and(|rest| !rest.starts_with(chars::is_identifier_part))
}
