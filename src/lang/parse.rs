use super::{ast::*, token::*, Error};

type Result<T> = std::result::Result<T, Error>;

/// Nesting limit for parentheses, unary operators and operator chains. It
/// bounds the recursion of every later walk over the tree.
const MAX_DEPTH: usize = 128;

pub fn parse(tokens: &[Token]) -> Result<Expression> {
    Parser::parse(tokens)
}

struct Parser<'a> {
    token_stream: std::slice::Iter<'a, Token>,
    peeked: Option<&'a Token>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [Token]) -> Result<Expression> {
        let mut parse = Parser {
            token_stream: tokens.iter(),
            peeked: None,
            depth: 0,
        };
        if parse.peek().is_none() {
            return Err(error!(MathError; "EMPTY EXPRESSION"));
        }
        let expr = parse.expression()?;
        match parse.next() {
            None => Ok(expr),
            Some(t) => Err(error!(MathError; format!("UNEXPECTED {}", t))),
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        if self.peeked.is_some() {
            return self.peeked.take();
        }
        loop {
            match self.token_stream.next()? {
                Token::Whitespace(_) => continue,
                t => return Some(t),
            }
        }
    }

    fn peek(&mut self) -> Option<&&'a Token> {
        if self.peeked.is_none() {
            self.peeked = self.next();
        }
        self.peeked.as_ref()
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(error!(MathError; "EXPRESSION TOO DEEP"));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expression> {
        fn parse(this: &mut Parser, precedence: usize) -> Result<Expression> {
            let mut lhs = this.unary()?;
            let mut folds = 0;
            loop {
                match this.peek() {
                    Some(Token::Operator(op)) => {
                        let op = *op;
                        let op_precedence = match Expression::op_precedence(op) {
                            Some(p) => p,
                            None => break,
                        };
                        if op_precedence < precedence {
                            break;
                        }
                        this.next();
                        let rhs = parse(this, op_precedence + 1)?;
                        lhs = Expression::for_binary_op(op, lhs, rhs);
                        this.enter()?;
                        folds += 1;
                    }
                    _ => break,
                }
            }
            this.depth -= folds;
            Ok(lhs)
        }
        parse(self, 0)
    }

    fn unary(&mut self) -> Result<Expression> {
        self.enter()?;
        let expr = match self.peek() {
            Some(Token::Operator(Operator::Minus)) => {
                self.next();
                Ok(Expression::Negation(Box::new(self.unary()?)))
            }
            Some(Token::Operator(Operator::Plus)) => {
                self.next();
                self.unary()
            }
            Some(Token::Operator(Operator::Not)) => {
                self.next();
                Ok(Expression::Not(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }?;
        self.depth -= 1;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(i)) => match self.peek() {
                Some(&&Token::LParen) => Ok(Expression::Function(i.clone(), self.expression_list()?)),
                _ => Ok(Expression::Var(i.clone())),
            },
            Some(Token::Number(s)) => match s.parse::<f64>() {
                Ok(n) => Ok(Expression::Number(n)),
                Err(_) => Err(error!(MathError; format!("INVALID NUMBER {}", s))),
            },
            Some(t) => Err(error!(MathError; format!("EXPECTED EXPRESSION AT {}", t))),
            None => Err(error!(MathError; "EXPECTED EXPRESSION")),
        }
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LParen)?;
        let mut v: Vec<Expression> = vec![];
        if let Some(Token::RParen) = self.peek() {
            self.next();
            return Ok(v);
        }
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token::RParen) => return Ok(v),
                Some(Token::Comma) => continue,
                _ => return Err(error!(MathError; "EXPECTED END OR SEPARATOR")),
            }
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if let Some(t) = self.next() {
            if *t == token {
                return Ok(());
            }
        }
        use Token::*;
        Err(error!(MathError;
            match token {
                LParen => "EXPECTED LEFT PARENTHESIS",
                RParen => "EXPECTED RIGHT PARENTHESIS",
                Comma => "EXPECTED COMMA",
                _ => "UNEXPECTED TOKEN",
            }
        ))
    }
}

impl Expression {
    fn for_binary_op(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
        use Operator::*;
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match op {
            Caret => Expression::Power(lhs, rhs),
            Multiply => Expression::Multiply(lhs, rhs),
            Divide => Expression::Divide(lhs, rhs),
            Modulus => Expression::Modulus(lhs, rhs),
            Plus => Expression::Add(lhs, rhs),
            Minus => Expression::Subtract(lhs, rhs),
            Equal | EqualEqual => Expression::Equal(lhs, rhs),
            NotEqual | LessGreater => Expression::NotEqual(lhs, rhs),
            Less => Expression::Less(lhs, rhs),
            LessEqual => Expression::LessEqual(lhs, rhs),
            Greater => Expression::Greater(lhs, rhs),
            GreaterEqual => Expression::GreaterEqual(lhs, rhs),
            And => Expression::And(lhs, rhs),
            Or => Expression::Or(lhs, rhs),
            Not => unreachable!("NOT is unary"),
        }
    }

    fn op_precedence(op: Operator) -> Option<usize> {
        use Operator::*;
        match op {
            Or => Some(10),
            And => Some(20),
            Equal | EqualEqual | NotEqual | LessGreater | Less | LessEqual | Greater
            | GreaterEqual => Some(30),
            Plus | Minus => Some(40),
            Multiply | Divide | Modulus => Some(50),
            Caret => Some(60),
            Not => None,
        }
    }
}
