use super::{Token, AND, NOT, OR};
use crate::error::QueryError;
use crate::tokenizer::Normalizer;
use crate::Position;

/// Splits a boolean/phrasal line into infix tokens. Operators are
/// recognised before normalization and only in upper case. A word that
/// normalizes to several terms becomes a phrase; one that normalizes to
/// nothing becomes [`Token::Empty`]. Lines without any operator or
/// parenthesis join their values with AND, skipping empty operands unless
/// nothing else is left.
pub fn lex(line: &str, normalizer: &Normalizer) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '(' | ')' | '"' => {
                push_word(&mut tokens, &mut word, normalizer);
                match c {
                    '(' => tokens.push(Token::Open),
                    ')' => tokens.push(Token::Close),
                    _ => {
                        let mut phrase = String::new();
                        loop {
                            match chars.next() {
                                Some('"') => break,
                                Some(ch) => phrase.push(ch),
                                None => return Err(QueryError::UnterminatedPhrase),
                            }
                        }
                        tokens.push(value(normalizer.positioned_terms(&phrase)));
                    }
                }
            }
            c if c.is_whitespace() => push_word(&mut tokens, &mut word, normalizer),
            c => word.push(c),
        }
    }
    push_word(&mut tokens, &mut word, normalizer);

    if tokens.iter().all(Token::is_value) && tokens.len() > 1 {
        let mut values = std::mem::take(&mut tokens);
        if values.iter().any(|t| *t != Token::Empty) {
            values.retain(|t| *t != Token::Empty);
        }
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                tokens.push(Token::And);
            }
            tokens.push(v);
        }
    }
    Ok(tokens)
}

fn push_word(tokens: &mut Vec<Token>, word: &mut String, normalizer: &Normalizer) {
    if word.is_empty() {
        return;
    }
    match word.as_str() {
        AND => tokens.push(Token::And),
        OR => tokens.push(Token::Or),
        NOT => tokens.push(Token::Not),
        w => tokens.push(value(normalizer.positioned_terms(w))),
    }
    word.clear();
}

/// Offsets are rebased on the first kept term so dropped stopwords still
/// leave their gap.
fn value(mut terms: Vec<(String, Position)>) -> Token {
    match terms.len() {
        0 => Token::Empty,
        1 => terms.pop().map_or(Token::Empty, |(term, _)| Token::Term(term)),
        _ => {
            let base = terms[0].1;
            Token::Phrase(terms.into_iter().map(|(term, pos)| (term, pos - base)).collect())
        }
    }
}
