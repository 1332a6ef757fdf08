use std::collections::HashMap;

thread_local!(
    static STRING_TO_WORD: HashMap<std::string::String, Word> = Word::all()
        .iter()
        .map(|w| (w.to_string().to_ascii_uppercase(), w.clone()))
        .collect();
);

/// Expression tokens. Displaying a token reproduces its source text.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Unknown(String),
    Whitespace(usize),
    Number(String),
    Ident(String),
    Operator(Operator),
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Unknown(s) => write!(f, "{}", s),
            Whitespace(u) => write!(f, "{s:>w$}", s = "", w = u),
            Number(s) => write!(f, "{}", s),
            Ident(s) => write!(f, "{}", s),
            Operator(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    Modulus,
    Plus,
    Minus,
    Equal,
    EqualEqual,
    NotEqual,
    LessGreater,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
}

impl Operator {
    pub fn from_string(s: &str) -> Option<Operator> {
        use Operator::*;
        Some(match s {
            "^" => Caret,
            "*" => Multiply,
            "/" => Divide,
            "%" => Modulus,
            "+" => Plus,
            "-" => Minus,
            "=" => Equal,
            "==" => EqualEqual,
            "!=" => NotEqual,
            "<>" => LessGreater,
            "<" => Less,
            "<=" => LessEqual,
            ">" => Greater,
            ">=" => GreaterEqual,
            "!" => Not,
            "&&" => And,
            "||" => Or,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Caret => write!(f, "^"),
            Multiply => write!(f, "*"),
            Divide => write!(f, "/"),
            Modulus => write!(f, "%"),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Equal => write!(f, "="),
            EqualEqual => write!(f, "=="),
            NotEqual => write!(f, "!="),
            LessGreater => write!(f, "<>"),
            Less => write!(f, "<"),
            LessEqual => write!(f, "<="),
            Greater => write!(f, ">"),
            GreaterEqual => write!(f, ">="),
            Not => write!(f, "!"),
            And => write!(f, "&&"),
            Or => write!(f, "||"),
        }
    }
}

/// Command keywords. Matching is case-insensitive.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Word {
    Debug,
    End,
    Gosub,
    Goto,
    If,
    KeyPress,
    KeyPushFor,
    KeyRelease,
    KeyType,
    Label,
    Mode,
    MouseMove,
    MousePress,
    MousePushFor,
    MouseRelease,
    Mouserun,
    Print,
    ProConHat,
    ProConJoy,
    ProConPress,
    ProConPushFor,
    ProConRelease,
    Rem,
    Return,
    Set,
    SetLed,
    UseLed,
    Wait,
}

impl Word {
    pub fn all() -> &'static [Word] {
        use Word::*;
        &[
            Debug,
            End,
            Gosub,
            Goto,
            If,
            KeyPress,
            KeyPushFor,
            KeyRelease,
            KeyType,
            Label,
            Mode,
            MouseMove,
            MousePress,
            MousePushFor,
            MouseRelease,
            Mouserun,
            Print,
            ProConHat,
            ProConJoy,
            ProConPress,
            ProConPushFor,
            ProConRelease,
            Rem,
            Return,
            Set,
            SetLed,
            UseLed,
            Wait,
        ]
    }

    pub fn from_string(s: &str) -> Option<Word> {
        STRING_TO_WORD.with(|stw| stw.get(&s.to_ascii_uppercase()).copied())
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Debug => write!(f, "DEBUG"),
            End => write!(f, "END"),
            Gosub => write!(f, "GOSUB"),
            Goto => write!(f, "GOTO"),
            If => write!(f, "IF"),
            KeyPress => write!(f, "KeyPress"),
            KeyPushFor => write!(f, "KeyPushFor"),
            KeyRelease => write!(f, "KeyRelease"),
            KeyType => write!(f, "KeyType"),
            Label => write!(f, "LABEL"),
            Mode => write!(f, "Mode"),
            MouseMove => write!(f, "MouseMove"),
            MousePress => write!(f, "MousePress"),
            MousePushFor => write!(f, "MousePushFor"),
            MouseRelease => write!(f, "MouseRelease"),
            Mouserun => write!(f, "Mouserun"),
            Print => write!(f, "PRINT"),
            ProConHat => write!(f, "ProConHat"),
            ProConJoy => write!(f, "ProConJoy"),
            ProConPress => write!(f, "ProConPress"),
            ProConPushFor => write!(f, "ProConPushFor"),
            ProConRelease => write!(f, "ProConRelease"),
            Rem => write!(f, "REM"),
            Return => write!(f, "RETURN"),
            Set => write!(f, "SET"),
            SetLed => write!(f, "SetLED"),
            UseLed => write!(f, "UseLED"),
            Wait => write!(f, "WAIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        assert_eq!(Word::from_string("rem"), Some(Word::Rem));
        assert_eq!(Word::from_string("setled"), Some(Word::SetLed));
        assert_eq!(Word::from_string("MOUSERUN"), Some(Word::Mouserun));
        assert_eq!(Word::from_string("PICKLES"), None);
    }

    #[test]
    fn test_operator_round_trip() {
        for s in &["^", "==", "<>", "!=", "<=", "&&", "||", "%"] {
            let op = Operator::from_string(s).unwrap();
            assert_eq!(&op.to_string(), s);
        }
    }
}
