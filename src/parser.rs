use crate::ast::*;
use crate::patterns;

/// Splits play source into top-level tokens.
///
/// Line numbers are 1-based and count every physical line, comments
/// included. Lines that match no pattern are dropped.
pub fn parse(input: &str) -> Vec<Token> {
    let lines: Vec<&str> = input.split_inclusive('\n').collect();
    let mut tokens = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line_no = idx + 1;
        let mut raw = lines[idx];
        if idx == 0 {
            raw = raw.trim_start_matches('\u{feff}');
        }
        idx += 1;

        let line = strip_terminator(raw);
        if line.is_empty() || patterns::is_comment(line) {
            continue;
        }

        if let Some(caps) = patterns::FUNCTION.captures(line) {
            let arguments = caps
                .name("arguments")
                .map(|m| m.as_str().split(';').map(|a| a.trim().to_string()).collect())
                .unwrap_or_default();
            tokens.push(Token::Function(FunctionCall {
                name: caps["name"].to_string(),
                arguments,
                line_no,
            }));
            continue;
        }

        if let Some(caps) = patterns::PLAY_TITLE.captures(line) {
            tokens.push(Token::PlayTitle(title(&caps["title"], line_no)));
            continue;
        }

        if let Some(caps) = patterns::ACT_TITLE.captures(line) {
            tokens.push(Token::ActTitle(title(&caps["title"], line_no)));
            continue;
        }

        if let Some(caps) = patterns::SCENE_TITLE.captures(line) {
            tokens.push(Token::SceneTitle(title(&caps["title"], line_no)));
            continue;
        }

        if let Some(caps) = patterns::METADATA.captures(line) {
            tokens.push(Token::Metadata(MetadataLine {
                key: caps["key"].to_string(),
                value: caps["value"].to_string(),
                line_no,
            }));
            continue;
        }

        if let Some(caps) = patterns::STAGE_DIRECTION.captures(line) {
            tokens.push(Token::StageDirection(Direction {
                text: caps["text"].to_string(),
                line_no,
            }));
            continue;
        }

        if let Some(caps) = patterns::DIALOGUE.captures(line) {
            let speakers = caps["speakers"]
                .split(',')
                .map(|s| s.trim().trim_start_matches('@').to_string())
                .collect();

            let head = &caps["text"];
            let mut continuation = String::new();
            while idx < lines.len() && !patterns::is_boundary(lines[idx]) {
                push_normalized(&mut continuation, lines[idx]);
                idx += 1;
            }

            let text = if head.is_empty() {
                continuation
            } else {
                let mut text = head.to_string();
                if raw.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&continuation);
                text
            };
            if text.is_empty() {
                continue;
            }

            tokens.push(Token::Dialogue(DialogueBlock {
                speakers,
                text,
                line_no,
            }));
        }
    }

    tokens
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}

/// Appends `line` with a `\r\n` terminator rewritten as `\n`.
fn push_normalized(buf: &mut String, line: &str) {
    buf.push_str(strip_terminator(line));
    if line.ends_with('\n') {
        buf.push('\n');
    }
}

fn title(text: &str, line_no: usize) -> Title {
    Title {
        text: text.to_string(),
        line_no,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_play() {
        let tokens = parse("# My Play\n/introduce tom; Tom; none\n@tom: Hi\n");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            Token::PlayTitle(Title {
                text: "My Play".into(),
                line_no: 1
            })
        );
        assert_eq!(
            tokens[1],
            Token::Function(FunctionCall {
                name: "introduce".into(),
                arguments: vec!["tom".into(), "Tom".into(), "none".into()],
                line_no: 2,
            })
        );
        assert_eq!(
            tokens[2],
            Token::Dialogue(DialogueBlock {
                speakers: vec!["tom".into()],
                text: "Hi\n".into(),
                line_no: 3,
            })
        );
    }

    #[test]
    fn test_dialogue_spans_lines_until_boundary() {
        let src = "@tom: I am speaking.\n\nThis needs to be another line\nkey: value\n> @tom sits\n";
        let tokens = parse(src);
        assert_eq!(tokens.len(), 2);
        let Token::Dialogue(d) = &tokens[0] else {
            panic!("expected dialogue, got {:?}", tokens[0]);
        };
        assert_eq!(
            d.text,
            "I am speaking.\n\nThis needs to be another line\nkey: value\n"
        );
        assert_eq!(tokens[1].line_no(), 5);
    }

    #[test]
    fn test_dialogue_stops_at_comment_and_next_speaker() {
        let src = "@tom: one\n% aside\nignored\n@carl, @tom: two";
        let tokens = parse(src);
        assert_eq!(tokens.len(), 2);
        let Token::Dialogue(first) = &tokens[0] else {
            panic!("expected dialogue");
        };
        assert_eq!(first.text, "one\n");
        let Token::Dialogue(second) = &tokens[1] else {
            panic!("expected dialogue");
        };
        assert_eq!(second.speakers, vec!["carl".to_string(), "tom".to_string()]);
        assert_eq!(second.text, "two");
        assert_eq!(second.line_no, 4);
    }

    #[test]
    fn test_empty_opener_starts_body_on_next_line() {
        let tokens = parse("@tom:\nHello there\n");
        let Token::Dialogue(d) = &tokens[0] else {
            panic!("expected dialogue");
        };
        assert_eq!(d.text, "Hello there\n");

        assert!(parse("@tom:").is_empty());
    }

    #[test]
    fn test_empty_opener_before_boundary_yields_nothing() {
        let tokens = parse("@tom:\n@carl: hi\n");
        assert_eq!(
            tokens,
            vec![Token::Dialogue(DialogueBlock {
                speakers: vec!["carl".into()],
                text: "hi\n".into(),
                line_no: 2,
            })]
        );
    }

    #[test]
    fn test_comments_keep_line_numbers() {
        let tokens = parse("% header\n\n## Act\n### Scene\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].line_no(), 3);
        assert!(matches!(tokens[1], Token::SceneTitle(ref t) if t.text == "Scene" && t.line_no == 4));
    }

    #[test]
    fn test_unmatched_lines_are_dropped() {
        let tokens = parse(" ## indented\nplain prose\n>tight\n# Title #2\n");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_bom_and_crlf() {
        let tokens = parse("\u{feff}# Title\r\nauthor: Me\r\n");
        assert_eq!(
            tokens[0],
            Token::PlayTitle(Title {
                text: "Title".into(),
                line_no: 1
            })
        );
        assert_eq!(
            tokens[1],
            Token::Metadata(MetadataLine {
                key: "author".into(),
                value: "Me".into(),
                line_no: 2
            })
        );

        let tokens = parse("@tom: Hi\r\nthere\r\n\r\n> @tom leaves\r\n");
        let Token::Dialogue(d) = &tokens[0] else {
            panic!("expected dialogue, got {:?}", tokens[0]);
        };
        assert_eq!(d.text, "Hi\nthere\n\n");
        assert!(matches!(tokens[1], Token::StageDirection(ref s) if s.text == "@tom leaves"));
    }

    #[test]
    fn test_function_without_arguments() {
        let tokens = parse("/pagebreak\n");
        assert_eq!(
            tokens[0],
            Token::Function(FunctionCall {
                name: "pagebreak".into(),
                arguments: vec![],
                line_no: 1
            })
        );
    }
}
