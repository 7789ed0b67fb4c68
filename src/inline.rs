//! Inline grammar of direction and dialogue text.
//!
//! Stage-direction text splits into text runs, `@handle` mentions and
//! `@(Form)handle` declined mentions. Dialogue text splits into speech runs
//! and `{...}` inline stage directions; speech is left as-is.

use winnow::combinator::{alt, delimited, preceded, repeat};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(String),
    Mention(String),
    Declined { handle: String, form: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DialoguePart {
    Speech(String),
    Direction(String),
}

enum Piece<'s> {
    Text(&'s str),
    Mention(&'s str),
    Declined { form: &'s str, handle: &'s str },
}

fn handle<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric()).parse_next(input)
}

fn declined<'s>(input: &mut &'s str) -> ModalResult<Piece<'s>> {
    preceded('@', (delimited('(', take_till(1.., ')'), ')'), handle))
        .map(|(form, handle)| Piece::Declined { form, handle })
        .parse_next(input)
}

fn mention<'s>(input: &mut &'s str) -> ModalResult<Piece<'s>> {
    preceded('@', handle).map(Piece::Mention).parse_next(input)
}

// A lone '@' that starts no mention is ordinary text.
fn plain<'s>(input: &mut &'s str) -> ModalResult<Piece<'s>> {
    alt((take_till(1.., '@'), "@"))
        .map(Piece::Text)
        .parse_next(input)
}

fn direction_pieces<'s>(input: &mut &'s str) -> ModalResult<Vec<Piece<'s>>> {
    repeat(0.., alt((declined, mention, plain))).parse_next(input)
}

pub(crate) fn direction_segments(text: &str) -> Vec<Segment> {
    let pieces = direction_pieces
        .parse(text)
        .unwrap_or_else(|_| vec![Piece::Text(text)]);

    let mut out: Vec<Segment> = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(t) => match out.last_mut() {
                Some(Segment::Text(prev)) => prev.push_str(t),
                _ => out.push(Segment::Text(t.to_string())),
            },
            Piece::Mention(h) => out.push(Segment::Mention(h.to_string())),
            Piece::Declined { form, handle } => out.push(Segment::Declined {
                handle: handle.to_string(),
                form: form.to_string(),
            }),
        }
    }
    out
}

enum Part<'s> {
    Speech(&'s str),
    Direction(&'s str),
}

fn inline_direction<'s>(input: &mut &'s str) -> ModalResult<Part<'s>> {
    delimited('{', take_till(1.., '}'), '}')
        .map(Part::Direction)
        .parse_next(input)
}

// Unbalanced braces fall through as speech.
fn speech<'s>(input: &mut &'s str) -> ModalResult<Part<'s>> {
    alt((take_till(1.., |c: char| c == '{' || c == '}'), "{", "}"))
        .map(Part::Speech)
        .parse_next(input)
}

fn dialogue_pieces<'s>(input: &mut &'s str) -> ModalResult<Vec<Part<'s>>> {
    repeat(0.., alt((inline_direction, speech))).parse_next(input)
}

pub(crate) fn dialogue_parts(text: &str) -> Vec<DialoguePart> {
    let pieces = dialogue_pieces
        .parse(text)
        .unwrap_or_else(|_| vec![Part::Speech(text)]);

    let mut out: Vec<DialoguePart> = Vec::new();
    for piece in pieces {
        match piece {
            Part::Speech(s) => match out.last_mut() {
                Some(DialoguePart::Speech(prev)) => prev.push_str(s),
                _ => out.push(DialoguePart::Speech(s.to_string())),
            },
            Part::Direction(d) => out.push(DialoguePart::Direction(d.to_string())),
        }
    }
    out
}
