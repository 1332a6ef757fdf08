/// One script line, classified by its leading command keyword.
///
/// Expression and label operands are kept as source text; expressions are
/// compiled when the line executes.
#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Blank,
    Remark,
    Label(String),
    End,
    Wait(String),
    Print(String),
    Set(String, String),
    If(String, String),
    Goto(String),
    Gosub(String),
    Return,
    /// A parenthesized command and its top-level arguments.
    Call(super::Word, Vec<String>),
    /// A known keyword whose operands could not be extracted.
    Malformed(super::Word),
    Unknown,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(f64),
    Var(String),
    Function(String, Vec<Expression>),
    Negation(Box<Expression>),
    Not(Box<Expression>),
    Power(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Modulus(Box<Expression>, Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessEqual(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterEqual(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
}

pub trait Visitor {
    fn visit_expression(&mut self, _: &Expression) {}
}

pub trait AcceptVisitor {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

impl AcceptVisitor for Expression {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Expression::*;
        match self {
            Number(_) | Var(_) => {}
            Function(_, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            Negation(expr) | Not(expr) => expr.accept(visitor),
            Power(expr1, expr2)
            | Multiply(expr1, expr2)
            | Divide(expr1, expr2)
            | Modulus(expr1, expr2)
            | Add(expr1, expr2)
            | Subtract(expr1, expr2)
            | Equal(expr1, expr2)
            | NotEqual(expr1, expr2)
            | Less(expr1, expr2)
            | LessEqual(expr1, expr2)
            | Greater(expr1, expr2)
            | GreaterEqual(expr1, expr2)
            | And(expr1, expr2)
            | Or(expr1, expr2) => {
                expr1.accept(visitor);
                expr2.accept(visitor);
            }
        }
        visitor.visit_expression(self)
    }
}
