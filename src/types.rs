use crate::error::ParseError;
use crate::template::Template;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a parsed fragment came from.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Context {
    pub path: PathBuf,
    pub line_no: usize,
}

impl Context {
    pub fn new(path: impl Into<PathBuf>, line_no: usize) -> Self {
        Self {
            path: path.into(),
            line_no,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line_no)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    StageDirection,
    Dialogue,
    Speaker,
    Mention,
    InlineStageDirection,
    Act,
    Scene,
    Declension,
    MentionWithDeclension,
    Text,
    Play,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::StageDirection => "stage_direction",
            NodeKind::Dialogue => "dialogue",
            NodeKind::Speaker => "speaker",
            NodeKind::Mention => "mention",
            NodeKind::InlineStageDirection => "inline_stage_direction",
            NodeKind::Act => "act",
            NodeKind::Scene => "scene",
            NodeKind::Declension => "declension",
            NodeKind::MentionWithDeclension => "mention_with_declension",
            NodeKind::Text => "text",
            NodeKind::Play => "play",
        };
        f.write_str(name)
    }
}

/// A node of the play tree.
///
/// A node carries child nodes or a text payload, never both. The fields are
/// private so the invariant can only be established through the constructors.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Node {
    context: Context,
    kind: NodeKind,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Fails with [`ParseError::MalformedNode`] when both `children` and
    /// `text` are non-empty.
    pub fn new(
        context: Context,
        kind: NodeKind,
        children: Vec<Node>,
        text: Option<String>,
    ) -> Result<Self, ParseError> {
        let has_text = text.as_deref().is_some_and(|t| !t.is_empty());
        if !children.is_empty() && has_text {
            return Err(ParseError::MalformedNode { kind, context });
        }
        Ok(Self {
            context,
            kind,
            children,
            text,
        })
    }

    pub fn leaf(context: Context, kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            context,
            kind,
            children: Vec::new(),
            text: Some(text.into()),
        }
    }

    pub fn branch(context: Context, kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            context,
            kind,
            children,
            text: None,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn push_child(&mut self, child: Node) -> Result<(), ParseError> {
        if self.text.as_deref().is_some_and(|t| !t.is_empty()) {
            return Err(ParseError::MalformedNode {
                kind: self.kind,
                context: child.context,
            });
        }
        self.children.push(child);
        Ok(())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Character {
    pub handle: String,
    pub display_name: String,
    pub context: Context,
    pub introduction: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub key: String,
    pub value: String,
    pub context: Context,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DuplicateDefinition,
    UnresolvedReference,
    UnknownFunction,
    InvalidArguments,
    MissingInclude,
    CyclicInclude,
    MalformedNode,
}

impl ViolationKind {
    pub fn severity(self) -> Severity {
        match self {
            ViolationKind::DuplicateDefinition | ViolationKind::UnresolvedReference => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Violation {
    pub description: String,
    pub context: Context,
    pub severity: Severity,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(kind: ViolationKind, description: impl Into<String>, context: Context) -> Self {
        Self {
            description: description.into(),
            context,
            severity: kind.severity(),
            kind,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.context, self.description)
    }
}

/// The result of parsing one play file together with everything it includes.
#[derive(Debug, Serialize, Clone, Default)]
pub struct Document {
    pub name: Option<String>,
    pub metadata: IndexMap<String, Metadata>,
    pub characters: IndexMap<String, Character>,
    pub nodes: Vec<Node>,
    pub violations: Vec<Violation>,
}

impl Document {
    /// True when no Error-severity violation was recorded.
    pub fn valid(&self) -> bool {
        !self.violations.iter().any(Violation::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_error())
    }

    /// Every node of the tree, children before their parent.
    pub fn flatten(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for node in &self.nodes {
            collect_post_order(node, &mut out);
        }
        out
    }

    /// Display name of `handle`, or the handle itself if it was never introduced.
    pub fn character_name<'a>(&'a self, handle: &'a str) -> &'a str {
        self.characters
            .get(handle)
            .map(|c| c.display_name.as_str())
            .unwrap_or(handle)
    }

    pub fn template(&self) -> Template {
        Template::from_metadata(&self.metadata)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn collect_post_order<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in &node.children {
        collect_post_order(child, out);
    }
    out.push(node);
}
