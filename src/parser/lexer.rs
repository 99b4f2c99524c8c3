//! Lexer for view templates
//!
//! Markup outside `{{ ... }}` is passed through as [`Token::Text`]. The
//! inside of each mustache is tokenized with logos.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Markup between mustaches
    Text(String),
    /// `{{`
    Open,
    /// `}}`
    Close,

    // Helper keywords
    Render,
    Outlet,
    Action,

    Equals,
    Path(String),
    String(String),
    Number(f64),

    /// Input inside a mustache that matches no token
    Unknown(String),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum MustacheToken {
    #[token("render")]
    Render,
    #[token("outlet")]
    Outlet,
    #[token("action")]
    Action,

    #[token("=")]
    Equals,

    // Dotted or slashed paths, identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*([./][a-zA-Z_][a-zA-Z0-9_\-]*)*", |lex| lex.slice().to_string(), priority = 1)]
    Path(String),

    #[regex(r#""([^"\\]|\\.)*""#, unquote)]
    #[regex(r#"'([^'\\]|\\.)*'"#, unquote)]
    String(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

fn unquote(lex: &mut logos::Lexer<MustacheToken>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].to_string()
}

impl From<MustacheToken> for Token {
    fn from(tok: MustacheToken) -> Self {
        match tok {
            MustacheToken::Render => Token::Render,
            MustacheToken::Outlet => Token::Outlet,
            MustacheToken::Action => Token::Action,
            MustacheToken::Equals => Token::Equals,
            MustacheToken::Path(p) => Token::Path(p),
            MustacheToken::String(s) => Token::String(s),
            MustacheToken::Number(n) => Token::Number(n),
        }
    }
}

/// Lex a template into tokens with spans
///
/// An unterminated `{{` lexes to the end of input without a closing token,
/// which the grammar reports as an error.
pub fn lex(input: &str) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < input.len() {
        let Some(offset) = input[cursor..].find("{{") else {
            tokens.push((Token::Text(input[cursor..].to_string()), cursor..input.len()));
            break;
        };

        let open = cursor + offset;
        if open > cursor {
            tokens.push((Token::Text(input[cursor..open].to_string()), cursor..open));
        }
        tokens.push((Token::Open, open..open + 2));

        let body_start = open + 2;
        let close = input[body_start..].find("}}").map(|o| body_start + o);
        let body_end = close.unwrap_or(input.len());

        for (tok, span) in MustacheToken::lexer(&input[body_start..body_end]).spanned() {
            let span = span.start + body_start..span.end + body_start;
            let tok = match tok {
                Ok(tok) => tok.into(),
                Err(()) => Token::Unknown(input[span.clone()].to_string()),
            };
            tokens.push((tok, span));
        }

        match close {
            Some(close) => {
                tokens.push((Token::Close, close..close + 2));
                cursor = close + 2;
            }
            None => cursor = input.len(),
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        lex(input).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(kinds("<h1>HI</h1>"), vec![Token::Text("<h1>HI</h1>".into())]);
    }

    #[test]
    fn test_render_mustache() {
        assert_eq!(
            kinds("<h1>HI</h1>{{render home}}"),
            vec![
                Token::Text("<h1>HI</h1>".into()),
                Token::Open,
                Token::Render,
                Token::Path("home".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_quoted_strings_and_hash() {
        assert_eq!(
            kinds(r#"{{render 'post' post controller="posts"}}"#),
            vec![
                Token::Open,
                Token::Render,
                Token::String("post".into()),
                Token::Path("post".into()),
                Token::Path("controller".into()),
                Token::Equals,
                Token::String("posts".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_dotted_and_slashed_paths() {
        assert_eq!(
            kinds("{{render blog.post}}{{render blog/post}}"),
            vec![
                Token::Open,
                Token::Render,
                Token::Path("blog.post".into()),
                Token::Close,
                Token::Open,
                Token::Render,
                Token::Path("blog/post".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_a_path() {
        assert_eq!(
            kinds("{{renderer}}"),
            vec![Token::Open, Token::Path("renderer".into()), Token::Close]
        );
    }

    #[test]
    fn test_spans_are_absolute() {
        let tokens = lex("ab{{outlet}}");
        assert_eq!(tokens[1].1, 2..4);
        assert_eq!(tokens[2].1, 4..10);
        assert_eq!(tokens[3].1, 10..12);
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(
            kinds("{{render home!}}"),
            vec![
                Token::Open,
                Token::Render,
                Token::Path("home".into()),
                Token::Unknown("!".into()),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_unterminated_mustache() {
        assert_eq!(
            kinds("a{{render"),
            vec![Token::Text("a".into()), Token::Open, Token::Render]
        );
    }
}
