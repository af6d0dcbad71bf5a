//! トークン定義

use logos::{FilterResult, Lexer as LogosLexer, Logos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 数値リテラル。整数と実数は同じ規則で字句解析し、
/// 正規表現のバックトラックなしで`1..10`を`1`、`..`、`10`に分ける
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

/// トークンの大まかな種別。特定のトークンではなく種別（識別子、キーワードなど）を
/// 要求する文法検査で使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Integer,
    Double,
    Char,
    String,
    Identifier,
    Keyword,
    Operator,
    Separator,
    Comment,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "end of file",
            TokenKind::Integer => "integer literal",
            TokenKind::Double => "real literal",
            TokenKind::Char => "char literal",
            TokenKind::String => "string literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Separator => "separator",
            TokenKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// Pascalのトークン一覧。キーワードは大文字小文字を区別しない
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"\{[^}]*\}")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // キーワード
    #[token("and", ignore(ascii_case))]
    And,
    #[token("array", ignore(ascii_case))]
    Array,
    #[token("begin", ignore(ascii_case))]
    Begin,
    #[token("const", ignore(ascii_case))]
    Const,
    #[token("div", ignore(ascii_case))]
    Div,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("downto", ignore(ascii_case))]
    Downto,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("for", ignore(ascii_case))]
    For,
    #[token("forward", ignore(ascii_case))]
    Forward,
    #[token("function", ignore(ascii_case))]
    Function,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("mod", ignore(ascii_case))]
    Mod,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("of", ignore(ascii_case))]
    Of,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("out", ignore(ascii_case))]
    Out,
    #[token("procedure", ignore(ascii_case))]
    Procedure,
    #[token("program", ignore(ascii_case))]
    Program,
    #[token("record", ignore(ascii_case))]
    Record,
    #[token("repeat", ignore(ascii_case))]
    Repeat,
    #[token("shl", ignore(ascii_case))]
    Shl,
    #[token("shr", ignore(ascii_case))]
    Shr,
    #[token("string", ignore(ascii_case))]
    String,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("to", ignore(ascii_case))]
    To,
    #[token("true", ignore(ascii_case))]
    True,
    #[token("type", ignore(ascii_case))]
    Type,
    #[token("until", ignore(ascii_case))]
    Until,
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("xor", ignore(ascii_case))]
    Xor,

    // 識別子（同じ長さならキーワードが優先）
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_owned(), priority = 1)]
    Identifier(std::string::String),

    // リテラル
    #[regex(r"[0-9]+", lex_number)]
    Number(Number),

    #[regex(r"'([^'\n]|'')*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("''", "'")
    })]
    StringLiteral(std::string::String),

    #[regex(r"#[0-9]+", |lex| lex.slice()[1..].parse::<u32>().ok().and_then(char::from_u32))]
    CharLiteral(char),

    // 演算子
    #[token(":=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("=")]
    Equal,
    #[token("<>")]
    NotEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,

    // 区切り記号
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,

    /// `(* ... *)`コメント。常に読み飛ばし、閉じていない場合のみエラー
    #[token("(*", skip_block_comment)]
    BlockComment,

    /// レキサーが付ける入力終端
    Eof,
}

fn skip_block_comment(lex: &mut LogosLexer<Token>) -> FilterResult<(), ()> {
    match lex.remainder().find("*)") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}

/// 小数部または指数部が続く場合、整数を実数リテラルに拡張する。
/// `..`は範囲なのでそのまま残す
fn lex_number(lex: &mut LogosLexer<Token>) -> Option<Number> {
    let rest = lex.remainder().as_bytes();
    let mut len = 0;

    if rest.len() >= 2 && rest[0] == b'.' && rest[1].is_ascii_digit() {
        len = 1;
        while len < rest.len() && rest[len].is_ascii_digit() {
            len += 1;
        }
    }

    if len < rest.len() && (rest[len] == b'e' || rest[len] == b'E') {
        let mut exp = len + 1;
        if exp < rest.len() && (rest[exp] == b'+' || rest[exp] == b'-') {
            exp += 1;
        }
        if exp < rest.len() && rest[exp].is_ascii_digit() {
            while exp < rest.len() && rest[exp].is_ascii_digit() {
                exp += 1;
            }
            len = exp;
        }
    }

    if len == 0 {
        return lex.slice().parse::<i64>().ok().map(Number::Integer);
    }

    lex.bump(len);
    lex.slice().parse::<f64>().ok().map(Number::Real)
}

impl Token {
    /// トークンの種別を取得
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Eof => TokenKind::Eof,
            Token::Number(Number::Integer(_)) => TokenKind::Integer,
            Token::Number(Number::Real(_)) => TokenKind::Double,
            Token::CharLiteral(_) => TokenKind::Char,
            Token::StringLiteral(_) => TokenKind::String,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::BlockComment => TokenKind::Comment,
            Token::Assign
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::PlusAssign
            | Token::MinusAssign
            | Token::StarAssign
            | Token::SlashAssign
            | Token::Equal
            | Token::NotEqual
            | Token::Less
            | Token::Greater
            | Token::LessEqual
            | Token::GreaterEqual
            | Token::LtLt
            | Token::GtGt => TokenKind::Operator,
            Token::LeftParen
            | Token::RightParen
            | Token::LeftBracket
            | Token::RightBracket
            | Token::Comma
            | Token::Dot
            | Token::DotDot
            | Token::Semicolon
            | Token::Colon => TokenKind::Separator,
            _ => TokenKind::Keyword,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "and"),
            Token::Array => write!(f, "array"),
            Token::Begin => write!(f, "begin"),
            Token::Const => write!(f, "const"),
            Token::Div => write!(f, "div"),
            Token::Do => write!(f, "do"),
            Token::Downto => write!(f, "downto"),
            Token::Else => write!(f, "else"),
            Token::End => write!(f, "end"),
            Token::False => write!(f, "false"),
            Token::For => write!(f, "for"),
            Token::Forward => write!(f, "forward"),
            Token::Function => write!(f, "function"),
            Token::If => write!(f, "if"),
            Token::Mod => write!(f, "mod"),
            Token::Not => write!(f, "not"),
            Token::Of => write!(f, "of"),
            Token::Or => write!(f, "or"),
            Token::Out => write!(f, "out"),
            Token::Procedure => write!(f, "procedure"),
            Token::Program => write!(f, "program"),
            Token::Record => write!(f, "record"),
            Token::Repeat => write!(f, "repeat"),
            Token::Shl => write!(f, "shl"),
            Token::Shr => write!(f, "shr"),
            Token::String => write!(f, "string"),
            Token::Then => write!(f, "then"),
            Token::To => write!(f, "to"),
            Token::True => write!(f, "true"),
            Token::Type => write!(f, "type"),
            Token::Until => write!(f, "until"),
            Token::Var => write!(f, "var"),
            Token::While => write!(f, "while"),
            Token::Xor => write!(f, "xor"),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Number(Number::Integer(n)) => write!(f, "{}", n),
            Token::Number(Number::Real(n)) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::CharLiteral(c) => write!(f, "#{}", *c as u32),
            Token::Assign => write!(f, ":="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::PlusAssign => write!(f, "+="),
            Token::MinusAssign => write!(f, "-="),
            Token::StarAssign => write!(f, "*="),
            Token::SlashAssign => write!(f, "/="),
            Token::Equal => write!(f, "="),
            Token::NotEqual => write!(f, "<>"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::LtLt => write!(f, "<<"),
            Token::GtGt => write!(f, ">>"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::DotDot => write!(f, ".."),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::BlockComment => write!(f, "(* *)"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
