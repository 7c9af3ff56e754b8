//! Template tree parser
//!
//! Builds the hierarchical [`TemplateTree`] from a JSON buffer, tracking a
//! path stack that mirrors the recursion depth. When the document is not
//! valid JSON the parser records the first error and the path to the position
//! where it occurred; no partial tree is returned.

use cfn_template_toolkit_common::{
    Location, PathSegment, Result, TemplateError, TemplatePath,
};
use log::debug;

use crate::node::{NodeId, TemplateTree};
use crate::token::{Token, TokenKind, Tokenizer};

/// Everything a parse invocation produces.
///
/// On success `tree` is set and `path` is empty. On failure `tree` is `None`,
/// `error` holds the first failure, and `path` is the stack as it stood at
/// the failure point — the deepest successfully entered container.
#[derive(Debug)]
pub struct ParseOutcome {
    pub tree: Option<TemplateTree>,
    pub error: Option<TemplateError>,
    pub path: TemplatePath,
}

/// One-shot recursive-descent parser over a token stream.
///
/// A parser instance holds mutable parse state (the path stack, the last and
/// current tokenizer locations, the captured error) and must not be shared
/// across concurrent parses. Callers wanting to bound work do so through the
/// offset cutoff of [`TemplateParser::parse_prefix`]; there is no mid-parse
/// cancellation.
#[derive(Debug, Default)]
pub struct TemplateParser {
    path: Vec<PathSegment>,
    last_location: Location,
    current_location: Location,
    error: Option<String>,
}

impl TemplateParser {
    pub fn new() -> Self {
        TemplateParser::default()
    }

    /// Parse the whole buffer.
    pub fn parse(&mut self, text: &str) -> ParseOutcome {
        self.parse_prefix(text, text.len())
    }

    /// Parse only `text[..offset]`, for "parse up to cursor" use.
    ///
    /// The offset is clamped down to the nearest UTF-8 character boundary.
    pub fn parse_prefix(&mut self, text: &str, offset: usize) -> ParseOutcome {
        self.path.clear();
        self.error = None;
        self.last_location = Location::start();
        self.current_location = Location::start();

        let mut offset = offset.min(text.len());
        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let mut session = ParseSession {
            tokenizer: Tokenizer::new(&text[..offset]),
            current: None,
            parser: self,
        };
        match session.parse_document() {
            Ok(tree) => ParseOutcome {
                tree: Some(tree),
                error: None,
                path: TemplatePath::new(),
            },
            Err(err) => {
                debug!("template parse failed at {}: {}", self.failure_path(), err);
                self.error = Some(err.to_string());
                ParseOutcome {
                    tree: None,
                    error: Some(err),
                    path: self.failure_path(),
                }
            }
        }
    }

    /// Rendered message of the captured error, if the last parse failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The path stack as it stood when the last parse stopped.
    pub fn failure_path(&self) -> TemplatePath {
        self.path.clone().into()
    }
}

/// Per-invocation parse state: the tokenizer, its one-token lookahead, and a
/// borrow of the parser's durable state.
struct ParseSession<'a, 'b> {
    tokenizer: Tokenizer<'b>,
    current: Option<Token>,
    parser: &'a mut TemplateParser,
}

impl ParseSession<'_, '_> {
    /// Fetch the next token, capturing the stream location before and after
    /// the fetch.
    fn next_token(&mut self) -> Result<&Token> {
        self.parser.last_location = self.parser.current_location;
        let token = self.tokenizer.next()?;
        self.parser.current_location = self.tokenizer.location();
        match token {
            Some(token) => {
                self.current = Some(token);
                Ok(self.current.as_ref().expect("token just stored"))
            }
            None => Err(TemplateError::UnexpectedEof {
                location: self.parser.current_location,
            }),
        }
    }

    fn current(&self) -> &Token {
        self.current.as_ref().expect("current token after next_token")
    }

    fn unexpected(&self, expected: &str) -> TemplateError {
        let token = self.current();
        TemplateError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.describe().to_string(),
            location: token.start,
        }
    }

    fn push(&mut self, segment: PathSegment) {
        self.parser.path.push(segment);
    }

    fn pop(&mut self) -> Option<PathSegment> {
        self.parser.path.pop()
    }

    /// Parse the root object and return the finished tree.
    fn parse_document(&mut self) -> Result<TemplateTree> {
        let mut tree = TemplateTree::new();
        self.next_token()?;
        self.push(PathSegment::Root);
        let root = self.parse_object(&mut tree)?;
        self.pop();
        tree.set_root(root);
        Ok(tree)
    }

    /// Parse one object, current token being its `{`.
    fn parse_object(&mut self, tree: &mut TemplateTree) -> Result<NodeId> {
        if self.current().kind != TokenKind::ObjectStart {
            return Err(self.unexpected("'{'"));
        }
        let object = tree.new_object(self.current().start);

        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::ObjectEnd {
                break;
            }
            let field_name = match &token.kind {
                TokenKind::String(name) => name.clone(),
                _ => return Err(self.unexpected("field name")),
            };
            if self.next_token()?.kind != TokenKind::Colon {
                return Err(self.unexpected("':'"));
            }

            self.push(PathSegment::field(&field_name));
            self.next_token()?;
            let child = self.parse_value(tree)?;
            tree.put_field(object, &field_name, child);
            self.pop();

            // Mark the enclosing map key as a parameter in the path, carrying
            // the Type value that selects the child schema.
            if field_name == "Type" && tree.node(child).is_value() {
                let type_text = tree
                    .node(child)
                    .value_text()
                    .expect("scalar node has text")
                    .to_string();
                match self.pop() {
                    Some(PathSegment::Field { name, mut params }) => {
                        params.push(type_text);
                        self.push(PathSegment::Field { name, params });
                    }
                    // Root and index segments carry no parameters.
                    Some(other) => self.push(other),
                    None => {}
                }
            }

            let token = self.next_token()?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::ObjectEnd => break,
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }

        tree.set_end(object, self.current().end);
        Ok(object)
    }

    /// Parse one array, current token being its `[`.
    fn parse_array(&mut self, tree: &mut TemplateTree) -> Result<NodeId> {
        if self.current().kind != TokenKind::ArrayStart {
            return Err(self.unexpected("'['"));
        }
        let array = tree.new_array(self.current().start);

        let mut index = 0;
        loop {
            let token = self.next_token()?;
            if token.kind == TokenKind::ArrayEnd {
                break;
            }

            self.push(PathSegment::Index(index));
            let child = self.parse_value(tree)?;
            tree.push_item(array, child);
            self.pop();
            index += 1;

            let token = self.next_token()?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::ArrayEnd => break,
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        tree.set_end(array, self.current().end);
        Ok(array)
    }

    /// Parse the value the current token opens: an object, an array, or a
    /// scalar.
    fn parse_value(&mut self, tree: &mut TemplateTree) -> Result<NodeId> {
        let (start, end, scalar) = {
            let token = self.current();
            (token.start, token.end, token.kind.scalar_text())
        };
        match &self.current().kind {
            TokenKind::ObjectStart => self.parse_object(tree),
            TokenKind::ArrayStart => self.parse_array(tree),
            _ => match scalar {
                Some(text) => Ok(tree.new_value(text, start, end)),
                None => Err(self.unexpected("value")),
            },
        }
    }
}

/// Convenience wrapper: parse a whole buffer with a fresh parser.
pub fn parse_template(text: &str) -> ParseOutcome {
    TemplateParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object() {
        let outcome = parse_template("{}");
        let tree = outcome.tree.expect("empty object parses");
        assert_eq!(tree.container_count(), 1);
        assert_eq!(tree.leaf_count(), 0);
        assert!(outcome.path.is_empty());
    }

    #[test]
    fn test_non_object_root_fails() {
        let outcome = parse_template("[1, 2]");
        assert!(outcome.tree.is_none());
        assert!(matches!(
            outcome.error,
            Some(TemplateError::UnexpectedToken { .. })
        ));
        assert_eq!(outcome.path.to_string(), "ROOT/");
    }

    #[test]
    fn test_missing_colon_reports_structural_error() {
        let outcome = parse_template(r#"{"A" 1}"#);
        match outcome.error {
            Some(TemplateError::UnexpectedToken { expected, .. }) => {
                assert_eq!(expected, "':'");
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_first_error_wins() {
        let mut parser = TemplateParser::new();
        let outcome = parser.parse(r#"{"A": }"#);
        let first = outcome.error.expect("parse fails").to_string();
        assert_eq!(parser.error(), Some(first.as_str()));
    }

    #[test]
    fn test_type_rewrite_skips_root_segment() {
        // A scalar Type directly on the root object: the enclosing segment is
        // the sentinel, which carries no parameters, so nothing changes.
        let outcome = parse_template(r#"{"Type": "AWS::S3::Bucket", "X": {"#);
        assert_eq!(outcome.path.to_string(), "ROOT/X/");
    }
}
