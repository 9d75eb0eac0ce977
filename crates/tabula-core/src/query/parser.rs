//! Filter and sort expression parser implementation using pest.

use pest::iterators::Pair;
use pest::Parser as PestParser;
use pest_derive::Parser;
use serde_json::Value;

use super::ast::{Connective, FilterExpr, Op, SortKey, Term};
use super::error::{ParseError, ParseErrorKind};
use super::like::LikePattern;
use crate::value::parse_literal;

#[derive(Parser)]
#[grammar = "query/grammar.pest"]
pub(crate) struct ExprParser;

/// Extracts the column name from an identifier pair.
/// Handles regular identifiers and `` `quoted column` `` forms.
fn extract_identifier(pair: &Pair<'_, Rule>) -> String {
    match pair.as_rule() {
        Rule::identifier => pair
            .clone()
            .into_inner()
            .next()
            .map_or_else(|| pair.as_str().to_string(), |inner| extract_identifier(&inner)),
        Rule::backtick_identifier => {
            let s = pair.as_str();
            s[1..s.len() - 1].to_string()
        }
        _ => pair.as_str().to_string(),
    }
}

fn pest_error(input: &str, err: &pest::error::Error<Rule>) -> ParseError {
    let position = match err.location {
        pest::error::InputLocation::Pos(p) => p,
        pest::error::InputLocation::Span((s, _)) => s,
    };
    ParseError::new(
        ParseErrorKind::SyntaxError,
        position,
        input.chars().skip(position).take(30).collect::<String>(),
        err.variant.message().into_owned(),
    )
}

fn next_pair<'a>(
    inner: &mut pest::iterators::Pairs<'a, Rule>,
    position: usize,
    expected: &str,
) -> Result<Pair<'a, Rule>, ParseError> {
    inner
        .next()
        .ok_or_else(|| ParseError::syntax(position, "", format!("Expected {expected}")))
}

fn parse_literal_pair(pair: Pair<'_, Rule>) -> Result<Value, ParseError> {
    let position = pair.as_span().start();
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::syntax(position, "", "Expected literal"))?;

    match inner.as_rule() {
        Rule::string => {
            let text = inner
                .into_inner()
                .next()
                .map_or("", |p| p.as_str());
            Ok(Value::String(text.to_string()))
        }
        Rule::bare => Ok(parse_literal(inner.as_str())),
        _ => Err(ParseError::invalid_literal(position, inner.as_str())),
    }
}

fn parse_term(pair: Pair<'_, Rule>) -> Result<Term, ParseError> {
    let position = pair.as_span().start();
    let term = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::syntax(position, "", "Expected term"))?;
    let rule = term.as_rule();
    let mut inner = term.into_inner();
    let column = extract_identifier(&next_pair(&mut inner, position, "column")?);

    let op = match rule {
        Rule::in_term => {
            let _keyword = next_pair(&mut inner, position, "IN")?;
            let values = match inner.next() {
                Some(list) => list
                    .into_inner()
                    .map(parse_literal_pair)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Op::In(values)
        }
        Rule::like_term => {
            let _keyword = next_pair(&mut inner, position, "LIKE")?;
            let literal = parse_literal_pair(next_pair(&mut inner, position, "pattern")?)?;
            Op::Like(LikePattern::new(crate::value::to_display_string(&literal)))
        }
        Rule::text_term => {
            let op = next_pair(&mut inner, position, "text operator")?;
            let keyword = op
                .into_inner()
                .next()
                .ok_or_else(|| ParseError::syntax(position, "", "Expected text operator"))?;
            let literal = parse_literal_pair(next_pair(&mut inner, position, "literal")?)?;
            match keyword.as_rule() {
                Rule::kw_contains => Op::Contains(literal),
                Rule::kw_startswith => Op::StartsWith(literal),
                Rule::kw_endswith => Op::EndsWith(literal),
                _ => return Err(ParseError::syntax(position, keyword.as_str(), "Unknown operator")),
            }
        }
        Rule::compare_term => {
            let op = next_pair(&mut inner, position, "comparison operator")?;
            let literal = parse_literal_pair(next_pair(&mut inner, position, "literal")?)?;
            match op.as_str() {
                "=" => Op::Eq(literal),
                "!=" => Op::Neq(literal),
                ">" => Op::Gt(literal),
                ">=" => Op::Gte(literal),
                "<" => Op::Lt(literal),
                "<=" => Op::Lte(literal),
                other => return Err(ParseError::syntax(position, other, "Unknown operator")),
            }
        }
        Rule::truthy_term => Op::Truthy,
        _ => return Err(ParseError::syntax(position, "", "Unknown term")),
    };

    Ok(Term { column, op })
}

fn parse_connective(pair: &Pair<'_, Rule>) -> Result<Connective, ParseError> {
    let keyword = pair.clone().into_inner().next().map(|p| p.as_rule());
    match keyword {
        Some(Rule::kw_and) => Ok(Connective::And),
        Some(Rule::kw_or) => Ok(Connective::Or),
        _ => Err(ParseError::syntax(
            pair.as_span().start(),
            pair.as_str(),
            "Expected AND or OR",
        )),
    }
}

impl FilterExpr {
    /// Parses a WHERE-like filter string.
    ///
    /// Returns `Ok(None)` for an empty (or whitespace-only) string, meaning
    /// "no filter".
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the expression is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use tabula_core::query::FilterExpr;
    ///
    /// let filter = FilterExpr::parse("department = 'Engineering' AND age > 30")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(filter.terms().count(), 2);
    /// ```
    pub fn parse(input: &str) -> Result<Option<Self>, ParseError> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let root = ExprParser::parse(Rule::filter, input)
            .map_err(|e| pest_error(input, &e))?
            .next()
            .ok_or_else(|| ParseError::syntax(0, input, "Empty filter"))?;

        let mut first = None;
        let mut rest = Vec::new();
        let mut pending = None;

        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::term => {
                    let term = parse_term(pair)?;
                    match (first.is_none(), pending.take()) {
                        (true, _) => first = Some(term),
                        (false, Some(connective)) => rest.push((connective, term)),
                        (false, None) => {
                            return Err(ParseError::syntax(0, input, "Missing AND/OR between terms"))
                        }
                    }
                }
                Rule::connective => pending = Some(parse_connective(&pair)?),
                _ => {}
            }
        }

        let first = first.ok_or_else(|| ParseError::syntax(0, input, "Expected term"))?;
        Ok(Some(Self { first, rest }))
    }
}

/// Parses an ORDER-BY-like sort string into sort keys.
///
/// Clauses are comma separated `column [ASC|DESC]`; the direction defaults to
/// ascending. An empty string yields an empty key list.
///
/// # Errors
///
/// Returns a `ParseError` if a clause is malformed.
pub fn parse_sort(input: &str) -> Result<Vec<SortKey>, ParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root = ExprParser::parse(Rule::order_by, input)
        .map_err(|e| pest_error(input, &e))?
        .next()
        .ok_or_else(|| ParseError::syntax(0, input, "Empty sort"))?;

    let mut keys = Vec::new();
    for pair in root.into_inner() {
        if pair.as_rule() != Rule::sort_key {
            continue;
        }
        let position = pair.as_span().start();
        let mut inner = pair.into_inner();
        let column = extract_identifier(&next_pair(&mut inner, position, "column")?);
        let descending = inner
            .next()
            .and_then(|dir| dir.into_inner().next())
            .is_some_and(|kw| kw.as_rule() == Rule::kw_desc);
        keys.push(SortKey { column, descending });
    }

    Ok(keys)
}
