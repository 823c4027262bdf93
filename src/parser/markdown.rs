// file: src/parser/markdown.rs
// description: markdown to plain text rendering with pulldown-cmark
// reference: https://docs.rs/pulldown-cmark

use crate::error::Result;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

pub struct MarkdownParser;

#[derive(Debug, Clone)]
pub struct ParsedMarkdown {
    pub plain_text: String,
    pub headings: Vec<Heading>,
}

#[derive(Debug, Clone)]
pub struct Heading {
    pub level: u32,
    pub text: String,
    pub position: usize,
}

impl ParsedMarkdown {
    /// Text of the first level-one heading, if any.
    pub fn first_title(&self) -> Option<&str> {
        self.headings
            .iter()
            .find(|h| h.level == 1)
            .map(|h| h.text.as_str())
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    /// Render markdown to plain text, keeping block boundaries as blank lines
    /// so paragraph-level splitting still applies downstream.
    pub fn parse(&self, content: &str) -> Result<ParsedMarkdown> {
        let parser = Parser::new(content);

        let mut plain_text = String::new();
        let mut headings = Vec::new();
        let mut current_heading: Option<(u32, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current_heading = Some((level as u32, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current_heading.take() {
                        headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                            position: plain_text.len(),
                        });
                    }
                    end_block(&mut plain_text);
                }
                Event::End(TagEnd::Paragraph)
                | Event::End(TagEnd::CodeBlock)
                | Event::End(TagEnd::BlockQuote(_))
                | Event::End(TagEnd::List(_)) => {
                    end_block(&mut plain_text);
                }
                Event::End(TagEnd::Item) => {
                    end_line(&mut plain_text);
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, ref mut heading_text)) = current_heading {
                        heading_text.push_str(&text);
                    }
                    plain_text.push_str(&text);
                }
                Event::SoftBreak => plain_text.push(' '),
                Event::HardBreak => plain_text.push('\n'),
                _ => {}
            }
        }

        Ok(ParsedMarkdown {
            plain_text: plain_text.trim().to_string(),
            headings,
        })
    }
}

fn end_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn end_block(text: &mut String) {
    end_line(text);
    if !text.is_empty() && !text.ends_with("\n\n") {
        text.push('\n');
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parsing() {
        let parser = MarkdownParser::new();
        let content = "# Title\n\nSome *content* here.";
        let parsed = parser.parse(content).unwrap();

        assert_eq!(parsed.headings.len(), 1);
        assert_eq!(parsed.first_title(), Some("Title"));
        assert_eq!(parsed.plain_text, "Title\n\nSome content here.");
    }

    #[test]
    fn test_links_render_as_text() {
        let parser = MarkdownParser::new();
        let parsed = parser.parse("See [Example](https://example.com) now").unwrap();

        assert_eq!(parsed.plain_text, "See Example now");
    }

    #[test]
    fn test_list_items_on_separate_lines() {
        let parser = MarkdownParser::new();
        let parsed = parser.parse("- one\n- two\n\nAfter").unwrap();

        assert_eq!(parsed.plain_text, "one\ntwo\n\nAfter");
    }

    #[test]
    fn test_no_level_one_heading() {
        let parser = MarkdownParser::new();
        let parsed = parser.parse("## Sub\n\ntext").unwrap();

        assert!(parsed.first_title().is_none());
    }
}
