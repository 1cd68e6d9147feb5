//! Shunting-yard conversion from infix tokens to postfix.
//!
//! Precedence is NOT > AND > OR. A binary operator pops stacked operators of
//! strictly higher precedence (stopping at an open parenthesis) before being
//! pushed; NOT and `(` are always pushed. Operand/operator alternation is
//! checked on the way through so malformed input fails instead of producing
//! a wrong postfix sequence.

use super::Token;
use crate::error::QueryError;

pub fn to_postfix(infix: &[Token]) -> Result<Vec<Token>, QueryError> {
    if infix.is_empty() {
        return Err(QueryError::Empty);
    }
    let mut output = Vec::with_capacity(infix.len());
    let mut ops: Vec<&Token> = Vec::new();
    let mut expect_operand = true;

    for (position, token) in infix.iter().enumerate() {
        match token {
            Token::Term(_) | Token::Phrase(_) | Token::Empty => {
                if !expect_operand {
                    return Err(QueryError::MissingOperator { position });
                }
                output.push(token.clone());
                expect_operand = false;
            }
            Token::Not | Token::Open => {
                if !expect_operand {
                    return Err(QueryError::MissingOperator { position });
                }
                ops.push(token);
            }
            Token::And | Token::Or => {
                if expect_operand {
                    return Err(QueryError::MissingOperand { position });
                }
                while let Some(top) = ops.last() {
                    if **top == Token::Open || top.precedence() <= token.precedence() {
                        break;
                    }
                    output.extend(ops.pop().cloned());
                }
                ops.push(token);
                expect_operand = true;
            }
            Token::Close => {
                if expect_operand {
                    return Err(QueryError::MissingOperand { position });
                }
                loop {
                    match ops.pop() {
                        Some(Token::Open) => break,
                        Some(op) => output.push(op.clone()),
                        None => return Err(QueryError::UnbalancedClose),
                    }
                }
            }
        }
    }

    if expect_operand {
        return Err(QueryError::MissingOperand { position: infix.len() });
    }
    while let Some(op) = ops.pop() {
        if *op == Token::Open {
            return Err(QueryError::UnbalancedOpen);
        }
        output.push(op.clone());
    }
    Ok(output)
}
