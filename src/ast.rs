/// One top-level lexical unit, tagged by category.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Function(FunctionCall),
    PlayTitle(Title),
    ActTitle(Title),
    SceneTitle(Title),
    Metadata(MetadataLine),
    StageDirection(Direction),
    Dialogue(DialogueBlock),
}

impl Token {
    pub fn line_no(&self) -> usize {
        match self {
            Token::Function(f) => f.line_no,
            Token::PlayTitle(t) | Token::ActTitle(t) | Token::SceneTitle(t) => t.line_no,
            Token::Metadata(m) => m.line_no,
            Token::StageDirection(d) => d.line_no,
            Token::Dialogue(d) => d.line_no,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<String>, // "a; b; c" split on ';' and trimmed
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataLine {
    pub key: String,
    pub value: String,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    pub text: String,
    pub line_no: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBlock {
    pub speakers: Vec<String>, // handles without '@'
    pub text: String,          // may span several lines, line breaks kept
    pub line_no: usize,
}
