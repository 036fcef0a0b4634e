//! Shared tree-sitter plumbing for the syntax-tree extractors.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::facts::ControlFlowInfo;
use super::ParsedFile;

/// Parse `source`, failing on invalid UTF-8 or any syntax error in the tree.
///
/// tree-sitter recovers from errors, but a tree with ERROR nodes gives
/// unreliable function extents, so such files are rejected and skipped.
pub(crate) fn parse_strict(
    language: &Language,
    path: &Path,
    source: &[u8],
) -> anyhow::Result<ParsedFile> {
    std::str::from_utf8(source)
        .map_err(|e| anyhow::anyhow!("{} is not valid UTF-8: {}", path.display(), e))?;

    let mut parser = Parser::new();
    parser.set_language(language)?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse source: {}", path.display()))?;

    if tree.root_node().has_error() {
        anyhow::bail!("syntax errors in {}", path.display());
    }

    Ok(ParsedFile {
        tree,
        source: source.to_vec(),
        path: path.to_string_lossy().to_string(),
    })
}

/// Check that a grammar loads and a query compiles against it.
pub(crate) fn check_grammar(language: &Language, query: &str) -> anyhow::Result<()> {
    let mut parser = Parser::new();
    parser.set_language(language)?;
    Query::new(language, query)?;
    Ok(())
}

/// Lexical nesting seen while walking a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Scope {
    pub function_depth: usize,
    pub class_depth: usize,
}

impl Scope {
    pub fn enter_function(self) -> Self {
        Self {
            function_depth: self.function_depth + 1,
            ..self
        }
    }

    pub fn enter_class(self) -> Self {
        Self {
            class_depth: self.class_depth + 1,
            ..self
        }
    }

    pub fn in_function(&self) -> bool {
        self.function_depth > 0
    }

    pub fn is_module_level(&self) -> bool {
        self.function_depth == 0 && self.class_depth == 0
    }
}

/// Pre-order walk over named nodes. `visit` returns the scope for the node's children.
pub(crate) fn walk<'t, F>(root: Node<'t>, mut visit: F) -> anyhow::Result<()>
where
    F: FnMut(Node<'t>, Scope) -> anyhow::Result<Scope>,
{
    let mut stack = vec![(root, Scope::default())];
    while let Some((node, scope)) = stack.pop() {
        let child_scope = visit(node, scope)?;
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, child_scope));
        }
    }
    Ok(())
}

/// Count branch points inside `node` using a control-flow query.
///
/// Capture names map to counters: `if`, `loop`, `case`, `catch`, `ternary`,
/// `bool`. Each `bool` capture is one binary boolean operator, so a chain of
/// n operands contributes n-1.
pub(crate) fn count_control_flow(query: &Query, node: Node, source: &[u8]) -> ControlFlowInfo {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    let mut info = ControlFlowInfo::default();

    while let Some(m) = matches.next() {
        for capture in m.captures {
            match query.capture_names()[capture.index as usize] {
                "if" => info.if_count += 1,
                "loop" => info.loop_count += 1,
                "case" => info.case_count += 1,
                "catch" => info.catch_count += 1,
                "ternary" => info.ternary_count += 1,
                "bool" => info.bool_op_count += 1,
                _ => {}
            }
        }
    }

    info
}

/// 1-indexed start line and number of lines spanned.
pub(crate) fn line_span(node: Node) -> (usize, usize) {
    let start = node.start_position().row;
    let end = node.end_position().row;
    (start + 1, end - start + 1)
}

/// Comment siblings directly above `node`, in source order.
///
/// Siblings of a kind in `skip_kinds` (attributes, decorators) may sit
/// between the comments and the node. A blank line ends the block.
pub(crate) fn leading_comments<'t>(
    node: Node<'t>,
    comment_kinds: &[&str],
    skip_kinds: &[&str],
) -> Vec<Node<'t>> {
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        let kind = sibling.kind();
        let is_comment = comment_kinds.contains(&kind);
        if !is_comment && !skip_kinds.contains(&kind) {
            break;
        }
        // Line comments may include their trailing newline, ending on `next_row` itself.
        if sibling.end_position().row + 1 < next_row {
            break;
        }
        if is_comment {
            comments.push(sibling);
        }
        next_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    comments.reverse();
    comments
}

/// Named children of `node` with kind `identifier`, or `node` itself.
pub(crate) fn identifiers_in<'t>(node: Node<'t>, parsed: &ParsedFile) -> Vec<String> {
    if node.kind() == "identifier" {
        return vec![parsed.node_text(node).to_string()];
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() == "identifier")
        .map(|n| parsed.node_text(n).to_string())
        .collect()
}
