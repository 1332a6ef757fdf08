use super::token::*;

pub fn lex(s: &str) -> Vec<Token> {
    ExpressionLexer::lex(s)
}

fn is_script_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_script_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

trait Tokenizers<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>>;

    fn whitespace(&mut self) -> Option<Token> {
        let mut len = 0;
        while self.chars().next_if(|c| is_script_whitespace(*c)).is_some() {
            len += 1;
        }
        Some(Token::Whitespace(len))
    }

    fn number(&mut self) -> Option<Token> {
        let mut s = String::new();
        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(&c) = self.chars().peek() {
            let accept = match c {
                '.' => !seen_dot && !seen_exp,
                'e' | 'E' => !seen_exp,
                '+' | '-' => s.ends_with(|p| p == 'e' || p == 'E'),
                _ => is_script_digit(c),
            };
            if !accept {
                break;
            }
            seen_dot |= c == '.';
            seen_exp |= c == 'e' || c == 'E';
            s.push(c);
            self.chars().next();
        }
        Some(Token::Number(s))
    }

    fn ident(&mut self) -> Option<Token> {
        let mut s = String::new();
        while let Some(pk) = self.chars().peek() {
            if !is_ident_char(*pk) {
                break;
            }
            s.push(*pk);
            self.chars().next();
        }
        Some(Token::Ident(s))
    }

    fn minutia(&mut self) -> Option<Token> {
        let ch = self.chars().next()?;
        match ch {
            '(' => return Some(Token::LParen),
            ')' => return Some(Token::RParen),
            ',' => return Some(Token::Comma),
            _ => {}
        }
        if let Some(&second) = self.chars().peek() {
            let pair: String = [ch, second].iter().collect();
            if let Some(op) = Operator::from_string(&pair) {
                self.chars().next();
                return Some(Token::Operator(op));
            }
        }
        let s = ch.to_string();
        match Operator::from_string(&s) {
            Some(op) => Some(Token::Operator(op)),
            None => Some(Token::Unknown(s)),
        }
    }
}

struct ExpressionLexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Tokenizers<'a> for ExpressionLexer<'a> {
    fn chars(&mut self) -> &mut std::iter::Peekable<std::str::Chars<'a>> {
        &mut self.chars
    }
}

impl<'a> Iterator for ExpressionLexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let pk = *self.chars.peek()?;
        if is_script_whitespace(pk) {
            return self.whitespace();
        }
        if is_script_digit(pk) || pk == '.' {
            return self.number();
        }
        if is_ident_start(pk) {
            return self.ident();
        }
        self.minutia()
    }
}

impl<'a> ExpressionLexer<'a> {
    fn lex(s: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = ExpressionLexer {
            chars: s.chars().peekable(),
        }
        .collect();
        if let Some(Token::Whitespace(_)) = tokens.last() {
            tokens.pop();
        }
        tokens
    }
}
