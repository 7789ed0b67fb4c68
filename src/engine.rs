use crate::ast::{DialogueBlock, Token};
use crate::error::ParseError;
use crate::functions;
use crate::include::IncludeGuard;
use crate::inline::{self, DialoguePart, Segment};
use crate::parser;
use crate::types::{
    Character, Context, Document, Metadata, Node, NodeKind, Severity, Violation, ViolationKind,
};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Record Error-level conditions and keep going instead of failing.
    pub lint: bool,
}

/// Builds a [`Document`] from one play file and everything it includes.
///
/// An engine is consumed by the parse, so every document gets fresh
/// registries, cursors and include state.
#[derive(Debug, Default)]
pub struct Engine {
    options: ParseOptions,

    name: Option<String>,
    metadata: IndexMap<String, Metadata>,
    pub(crate) characters: IndexMap<String, Character>,
    nodes: Vec<Node>,
    violations: Vec<Violation>,

    pub(crate) includes: IncludeGuard,
    current_act: Option<Node>,
    current_scene: Option<Node>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn lint() -> Self {
        Self::with_options(ParseOptions { lint: true })
    }

    pub fn is_lint(&self) -> bool {
        self.options.lint
    }

    pub fn parse_file(self, path: impl AsRef<Path>) -> Result<Document, ParseError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        self.parse_source(path, &source)
    }

    /// Parses `source` as if it were the content of the file at `path`.
    pub fn parse_source(
        mut self,
        path: impl AsRef<Path>,
        source: &str,
    ) -> Result<Document, ParseError> {
        let path = path.as_ref();
        debug!(path = %path.display(), lint = self.options.lint, "Parsing play");

        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.includes = IncludeGuard::rooted(key);
        self.tokenize(path, source)?;
        self.close_scene()?;
        self.close_act();
        self.includes.leave();

        let document = Document {
            name: self.name,
            metadata: self.metadata,
            characters: self.characters,
            nodes: self.nodes,
            violations: self.violations,
        };
        debug!(
            path = %path.display(),
            nodes = document.nodes.len(),
            violations = document.violations.len(),
            valid = document.valid(),
            "Parsed play"
        );
        Ok(document)
    }

    /// Runs the tokens of one file through the engine. Included files come
    /// back through here with the same cursors.
    pub(crate) fn tokenize(&mut self, path: &Path, source: &str) -> Result<(), ParseError> {
        for token in parser::parse(source) {
            let context = Context::new(path, token.line_no());
            self.dispatch(token, context)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, token: Token, context: Context) -> Result<(), ParseError> {
        match token {
            Token::Metadata(m) => self.update_metadata(m.key, m.value, context),
            Token::Function(call) => functions::call(self, &call, &context)?,
            Token::PlayTitle(t) => self.set_name(t.text, context),
            Token::ActTitle(t) => self.open_act(t.text, context)?,
            Token::SceneTitle(t) => self.open_scene(t.text, context)?,
            Token::StageDirection(d) => {
                let children = self.direction_children(&d.text, &context);
                self.place(Node::branch(context, NodeKind::StageDirection, children))?;
            }
            Token::Dialogue(d) => {
                let (speaker, dialogue) = self.dialogue_nodes(&d, &context);
                self.place(speaker)?;
                self.place(dialogue)?;
            }
        }
        Ok(())
    }

    pub(crate) fn warn(&mut self, kind: ViolationKind, description: String, context: &Context) {
        self.track(Violation::new(kind, description, context.clone()), true);
    }

    /// Records an Error-level violation. In strict mode it is also returned
    /// as the error that aborts the parse; in lint mode the caller skips the
    /// offending construct and carries on.
    pub(crate) fn reject(
        &mut self,
        violation: Violation,
        raise: impl FnOnce(Violation) -> ParseError,
    ) -> Result<(), ParseError> {
        let lint = self.options.lint;
        self.track(violation.clone(), lint);
        if lint {
            Ok(())
        } else {
            Err(raise(violation))
        }
    }

    fn track(&mut self, violation: Violation, log: bool) {
        if log {
            match violation.severity {
                Severity::Warning => warn!(
                    location = %violation.context,
                    kind = ?violation.kind,
                    "{}",
                    violation.description
                ),
                Severity::Error => error!(
                    location = %violation.context,
                    kind = ?violation.kind,
                    "{}",
                    violation.description
                ),
            }
        }
        self.violations.push(violation);
    }

    fn malformed(&mut self, err: ParseError) -> ParseError {
        if let ParseError::MalformedNode { kind, context } = &err {
            let description = format!("{} node cannot carry both children and text", kind);
            let violation = Violation::new(ViolationKind::MalformedNode, description, context.clone());
            self.track(violation, false);
        }
        err
    }

    fn set_name(&mut self, name: String, context: Context) {
        if let Some(existing) = self.name.as_deref() {
            let description = format!("Play already had a name '{}'", existing);
            self.warn(ViolationKind::DuplicateDefinition, description, &context);
            return;
        }
        self.name = Some(name);
    }

    fn update_metadata(&mut self, key: String, value: String, context: Context) {
        if let Some(previous) = self.metadata.get(&key) {
            let description = format!(
                "Metadata key '{}' was previously set in {}",
                key, previous.context
            );
            self.warn(ViolationKind::DuplicateDefinition, description, &context);
        }
        self.metadata
            .insert(key.clone(), Metadata { key, value, context });
    }

    fn open_act(&mut self, title: String, context: Context) -> Result<(), ParseError> {
        self.close_scene()?;
        self.close_act();
        let heading = Node::leaf(context.clone(), NodeKind::Text, title);
        self.current_act = Some(Node::branch(context, NodeKind::Act, vec![heading]));
        Ok(())
    }

    fn open_scene(&mut self, title: String, context: Context) -> Result<(), ParseError> {
        self.close_scene()?;
        let heading = Node::leaf(context.clone(), NodeKind::Text, title);
        self.current_scene = Some(Node::branch(context, NodeKind::Scene, vec![heading]));
        Ok(())
    }

    fn close_scene(&mut self) -> Result<(), ParseError> {
        let Some(scene) = self.current_scene.take() else {
            return Ok(());
        };
        let result = match self.current_act.as_mut() {
            Some(act) => act.push_child(scene),
            None => {
                self.nodes.push(scene);
                Ok(())
            }
        };
        result.map_err(|e| self.malformed(e))
    }

    fn close_act(&mut self) {
        if let Some(act) = self.current_act.take() {
            self.nodes.push(act);
        }
    }

    /// Innermost open scene, else open act, else the top level.
    fn place(&mut self, node: Node) -> Result<(), ParseError> {
        let result = if let Some(scene) = self.current_scene.as_mut() {
            scene.push_child(node)
        } else if let Some(act) = self.current_act.as_mut() {
            act.push_child(node)
        } else {
            self.nodes.push(node);
            Ok(())
        };
        result.map_err(|e| self.malformed(e))
    }

    fn dialogue_nodes(&mut self, block: &DialogueBlock, context: &Context) -> (Node, Node) {
        let mut speakers = Vec::with_capacity(block.speakers.len());
        for handle in &block.speakers {
            if !self.characters.contains_key(handle) {
                let description = format!("'{}' speaks but was not properly introduced", handle);
                self.warn(ViolationKind::UnresolvedReference, description, context);
            }
            speakers.push(Node::leaf(context.clone(), NodeKind::Speaker, handle.as_str()));
        }

        let mut lines = Vec::new();
        for part in inline::dialogue_parts(&block.text) {
            match part {
                DialoguePart::Speech(text) => {
                    lines.push(Node::leaf(context.clone(), NodeKind::Dialogue, text));
                }
                DialoguePart::Direction(text) => {
                    let children = self.direction_children(&text, context);
                    lines.push(Node::branch(
                        context.clone(),
                        NodeKind::InlineStageDirection,
                        children,
                    ));
                }
            }
        }

        (
            Node::branch(context.clone(), NodeKind::Speaker, speakers),
            Node::branch(context.clone(), NodeKind::Dialogue, lines),
        )
    }

    fn direction_children(&mut self, text: &str, context: &Context) -> Vec<Node> {
        let mut out = Vec::new();
        for segment in inline::direction_segments(text) {
            let node = match segment {
                Segment::Text(t) => Node::leaf(context.clone(), NodeKind::Text, t),
                Segment::Mention(handle) => {
                    self.check_mentioned(&handle, context);
                    Node::leaf(context.clone(), NodeKind::Mention, handle)
                }
                Segment::Declined { handle, form } => {
                    self.check_mentioned(&handle, context);
                    Node::branch(
                        context.clone(),
                        NodeKind::MentionWithDeclension,
                        vec![
                            Node::leaf(context.clone(), NodeKind::Mention, handle),
                            Node::leaf(context.clone(), NodeKind::Declension, form),
                        ],
                    )
                }
            };
            out.push(node);
        }
        out
    }

    fn check_mentioned(&mut self, handle: &str, context: &Context) {
        if !self.characters.contains_key(handle) {
            let description = format!("'{}' is mentioned but was not properly introduced", handle);
            self.warn(ViolationKind::UnresolvedReference, description, context);
        }
    }
}
