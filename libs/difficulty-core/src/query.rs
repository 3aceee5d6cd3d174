//! Card search grammar.
//!
//! A query is a sequence of terms joined by implicit AND. Supported syntax:
//!
//! - `a b` / `a and b`: both must match
//! - `a or b`: either matches
//! - `-a`: negation, also `-(a or b)`
//! - `( ... )`: grouping
//! - `"two words"` or `deck:"My Deck"`: quoting
//!
//! Terms: `deck:`, `tag:`, `is:new`, `is:review`, `prop:lapses>=3`,
//! `cid:1,2` and bare text matched against question and answer. `*` is a
//! wildcard in deck, tag and text terms. An empty query matches every card.

use crate::error::QueryError;
use crate::types::{CardId, ReviewStats, TagSet};

/// Parsed search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchNode {
    All,
    And(Vec<SearchNode>),
    Or(Vec<SearchNode>),
    Not(Box<SearchNode>),
    Term(Term),
}

/// A single search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Deck(String),
    Tag(String),
    NoTags,
    IsNew,
    IsReview,
    Prop {
        field: PropField,
        op: Comparison,
        value: u32,
    },
    CardIds(Vec<CardId>),
    Text(String),
}

/// Review statistic addressable with `prop:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropField {
    Lapses,
    Interval,
    Ease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn eval(self, lhs: u32, rhs: u32) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

/// The parts of a card a search can look at.
#[derive(Debug, Clone, Copy)]
pub struct CardView<'a> {
    pub id: CardId,
    pub deck: &'a str,
    pub question: &'a str,
    pub answer: &'a str,
    pub tags: &'a TagSet,
    pub stats: Option<ReviewStats>,
}

/// Parse a query string. Blank input yields [`SearchNode::All`].
pub fn parse_query(input: &str) -> Result<SearchNode, QueryError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(SearchNode::All);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_or()?;
    match parser.peek() {
        None => Ok(node),
        Some(Token { kind: TokenKind::RParen, position }) => {
            Err(QueryError::UnbalancedParens { position: *position })
        }
        Some(token) => Err(QueryError::DanglingOperator {
            operator: token.describe(),
            position: token.position,
        }),
    }
}

impl SearchNode {
    /// Evaluate the expression against a card.
    pub fn matches(&self, card: &CardView<'_>) -> bool {
        match self {
            Self::All => true,
            Self::And(nodes) => nodes.iter().all(|n| n.matches(card)),
            Self::Or(nodes) => nodes.iter().any(|n| n.matches(card)),
            Self::Not(node) => !node.matches(card),
            Self::Term(term) => term.matches(card),
        }
    }
}

impl Term {
    fn matches(&self, card: &CardView<'_>) -> bool {
        match self {
            Self::Deck(name) => matches_hierarchy(name, card.deck),
            Self::Tag(name) => card.tags.iter().any(|t| matches_hierarchy(name, t)),
            Self::NoTags => card.tags.is_empty(),
            Self::IsNew => card.stats.is_none(),
            Self::IsReview => card.stats.is_some(),
            Self::Prop { field, op, value } => card.stats.map_or(false, |s| {
                let actual = match field {
                    PropField::Lapses => s.lapses,
                    PropField::Interval => s.interval_days,
                    PropField::Ease => s.ease_pct,
                };
                op.eval(actual, *value)
            }),
            Self::CardIds(ids) => ids.contains(&card.id),
            Self::Text(text) => {
                let pattern = format!("*{text}*");
                glob_match(&pattern, card.question) || glob_match(&pattern, card.answer)
            }
        }
    }
}

/// `name` matches itself and any `name::child`.
fn matches_hierarchy(pattern: &str, value: &str) -> bool {
    glob_match(pattern, value) || glob_match(&format!("{pattern}::*"), value)
}

/// Case-insensitive glob match where `*` matches any run of characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let t: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            // Let the last star swallow one more character.
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Word(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

impl Token {
    fn describe(&self) -> String {
        match &self.kind {
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::Not => "-".into(),
            TokenKind::And => "and".into(),
            TokenKind::Or => "or".into(),
            TokenKind::Word(w) => w.clone(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (position, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token { kind: TokenKind::LParen, position });
                i += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::RParen, position });
                i += 1;
            }
            '-' => {
                tokens.push(Token { kind: TokenKind::Not, position });
                i += 1;
            }
            _ => {
                let mut word = String::new();
                let mut quoted = false;
                let mut in_quote = false;
                let mut quote_start = position;

                while i < chars.len() {
                    let (pos, c) = chars[i];
                    if c == '"' {
                        if !in_quote {
                            quote_start = pos;
                        }
                        in_quote = !in_quote;
                        quoted = true;
                    } else if !in_quote && (c.is_whitespace() || c == '(' || c == ')') {
                        break;
                    } else {
                        word.push(c);
                    }
                    i += 1;
                }

                if in_quote {
                    return Err(QueryError::UnterminatedQuote { position: quote_start });
                }

                let kind = match word.to_ascii_lowercase().as_str() {
                    "and" if !quoted => TokenKind::And,
                    "or" if !quoted => TokenKind::Or,
                    _ => TokenKind::Word(word),
                };
                tokens.push(Token { kind, position });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.position)
    }

    fn parse_or(&mut self) -> Result<SearchNode, QueryError> {
        let mut nodes = vec![self.parse_and()?];
        while let Some(op) = self.peek().filter(|t| t.kind == TokenKind::Or).cloned() {
            self.pos += 1;
            if self.at_operand_end() {
                return Err(QueryError::DanglingOperator {
                    operator: op.describe(),
                    position: op.position,
                });
            }
            nodes.push(self.parse_and()?);
        }
        Ok(flatten(nodes, SearchNode::Or))
    }

    fn parse_and(&mut self) -> Result<SearchNode, QueryError> {
        let mut nodes = vec![self.parse_unary()?];
        loop {
            match self.peek() {
                None => break,
                Some(Token { kind: TokenKind::Or | TokenKind::RParen, .. }) => break,
                Some(op @ Token { kind: TokenKind::And, .. }) => {
                    let op = op.clone();
                    self.pos += 1;
                    if self.at_operand_end() {
                        return Err(QueryError::DanglingOperator {
                            operator: op.describe(),
                            position: op.position,
                        });
                    }
                }
                Some(_) => {}
            }
            nodes.push(self.parse_unary()?);
        }
        Ok(flatten(nodes, SearchNode::And))
    }

    fn parse_unary(&mut self) -> Result<SearchNode, QueryError> {
        let Some(token) = self.next() else {
            return Err(QueryError::DanglingOperator {
                operator: "end of query".into(),
                position: self.end_position(),
            });
        };

        match token.kind {
            TokenKind::Not => {
                if self.at_operand_end() {
                    return Err(QueryError::DanglingOperator {
                        operator: "-".into(),
                        position: token.position,
                    });
                }
                Ok(SearchNode::Not(Box::new(self.parse_unary()?)))
            }
            TokenKind::LParen => {
                match self.peek() {
                    None => return Err(QueryError::UnbalancedParens { position: token.position }),
                    Some(Token { kind: TokenKind::RParen, .. }) => {
                        return Err(QueryError::EmptyGroup { position: token.position })
                    }
                    Some(_) => {}
                }
                let inner = self.parse_or()?;
                match self.next() {
                    Some(Token { kind: TokenKind::RParen, .. }) => Ok(inner),
                    _ => Err(QueryError::UnbalancedParens { position: token.position }),
                }
            }
            TokenKind::RParen => Err(QueryError::UnbalancedParens { position: token.position }),
            TokenKind::And | TokenKind::Or => Err(QueryError::DanglingOperator {
                operator: token.describe(),
                position: token.position,
            }),
            TokenKind::Word(word) => parse_term(&word).map(SearchNode::Term),
        }
    }

    fn at_operand_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token { kind: TokenKind::RParen | TokenKind::Or | TokenKind::And, .. })
        )
    }
}

fn flatten(mut nodes: Vec<SearchNode>, wrap: fn(Vec<SearchNode>) -> SearchNode) -> SearchNode {
    if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        wrap(nodes)
    }
}

fn parse_term(word: &str) -> Result<Term, QueryError> {
    let Some((field, value)) = word.split_once(':') else {
        return Ok(Term::Text(word.to_string()));
    };

    let invalid = |reason: &str| QueryError::InvalidTerm {
        term: word.to_string(),
        reason: reason.to_string(),
    };

    match field.to_ascii_lowercase().as_str() {
        "deck" if value.is_empty() => Err(invalid("deck name is empty")),
        "deck" => Ok(Term::Deck(value.to_string())),
        "tag" if value.is_empty() => Err(invalid("tag name is empty")),
        "tag" if value.eq_ignore_ascii_case("none") => Ok(Term::NoTags),
        "tag" => Ok(Term::Tag(value.to_string())),
        "is" => match value.to_ascii_lowercase().as_str() {
            "new" => Ok(Term::IsNew),
            "review" => Ok(Term::IsReview),
            _ => Err(invalid("expected `new` or `review`")),
        },
        "prop" => parse_prop(value).ok_or_else(|| {
            invalid("expected `lapses`, `ivl` or `ease` followed by a comparison and a number")
        }),
        "cid" => value
            .split(',')
            .map(|id| id.trim().parse::<CardId>())
            .collect::<Result<Vec<_>, _>>()
            .map(Term::CardIds)
            .map_err(|_| invalid("expected comma-separated card ids")),
        _ => Err(QueryError::UnknownField(field.to_string())),
    }
}

fn parse_prop(value: &str) -> Option<Term> {
    let split = value.find(|c: char| matches!(c, '<' | '>' | '=' | '!'))?;
    let (name, rest) = value.split_at(split);

    let field = match name.to_ascii_lowercase().as_str() {
        "lapses" => PropField::Lapses,
        "ivl" => PropField::Interval,
        "ease" => PropField::Ease,
        _ => return None,
    };

    let (op, number) = [
        (">=", Comparison::Ge),
        ("<=", Comparison::Le),
        ("!=", Comparison::Ne),
        ("=", Comparison::Eq),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
    ]
    .into_iter()
    .find_map(|(symbol, op)| rest.strip_prefix(symbol).map(|n| (op, n)))?;

    let value = number.parse::<u32>().ok()?;
    Some(Term::Prop { field, op, value })
}
