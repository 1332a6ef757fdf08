use super::function::{Function, Host};
use super::{format_value, Device, Var};
use crate::error;
use crate::lang::ast::{AcceptVisitor, Expression, Visitor};
use crate::lang::{lex, parse, Error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Result<T> = std::result::Result<T, Error>;

/// ## Expression evaluator
///
/// Compiles expression text and evaluates it against the variable store and
/// the built-ins. Variables are case-sensitive; built-in names are not. A bound
/// variable shadows a built-in constant, call syntax always names a built-in.

pub struct Evaluator {
    rng: StdRng,
    started_ms: u64,
}

impl Evaluator {
    pub fn new(seed: u64, started_ms: u64) -> Evaluator {
        Evaluator {
            rng: StdRng::seed_from_u64(seed),
            started_ms,
        }
    }

    /// Seeds `Rand` from the start time and the script name.
    pub fn for_script(name: &str, now_ms: u64) -> Evaluator {
        let seed = now_ms ^ u64::from(crc::crc32::checksum_ieee(name.as_bytes()));
        tracing::debug!("rand seed {:#x}", seed);
        Evaluator::new(seed, now_ms)
    }

    pub fn compile(source: &str) -> Result<Expression> {
        let tokens = lex(source);
        let expr = parse(&tokens)?;
        let mut check = CallCheck::default();
        expr.accept(&mut check);
        match check.error {
            Some(error) => Err(error),
            None => Ok(expr),
        }
    }

    pub fn evaluate(&mut self, source: &str, vars: &Var, device: &Device) -> Result<f64> {
        let expr = Evaluator::compile(source)?;
        let mut env = Env {
            rng: &mut self.rng,
            started_ms: self.started_ms,
            device,
        };
        let value = eval(&expr, vars, &mut env)?;
        if !value.is_finite() {
            return Err(error!(NonFinite; format!("{} = {}", source.trim(), value)));
        }
        Ok(value)
    }
}

pub fn truthy(value: f64) -> bool {
    value != 0.0
}

struct Env<'e, 'd> {
    rng: &'e mut StdRng,
    started_ms: u64,
    device: &'e Device<'d>,
}

impl<'e, 'd> Host for Env<'e, 'd> {
    fn is_pressed(&self) -> bool {
        self.device.is_pressed()
    }
    fn random(&mut self, lo: f64, hi: f64) -> f64 {
        if (hi - lo).is_finite() {
            return self.rng.gen_range(lo..hi);
        }
        // Width overflows f64; sample in half scale.
        let unit: f64 = self.rng.gen();
        let value = (lo / 2.0 + unit * (hi / 2.0 - lo / 2.0)) * 2.0;
        if value < hi {
            value.max(lo)
        } else {
            lo
        }
    }
    fn elapsed_ms(&self) -> f64 {
        self.device.now_ms().saturating_sub(self.started_ms) as f64
    }
}

#[derive(Default)]
struct CallCheck {
    error: Option<Error>,
}

impl Visitor for CallCheck {
    fn visit_expression(&mut self, expr: &Expression) {
        if self.error.is_some() {
            return;
        }
        if let Expression::Function(name, args) = expr {
            match Function::builtin_and_arity(name) {
                None => self.error = Some(error!(MathError; format!("UNKNOWN FUNCTION {}", name))),
                Some((_, arity)) if !arity.contains(&args.len()) => {
                    self.error = Some(error!(MathError; format!("WRONG NUMBER OF ARGUMENTS FOR {}", name)))
                }
                Some(_) => {}
            }
        }
    }
}

fn eval(expr: &Expression, vars: &Var, host: &mut dyn Host) -> Result<f64> {
    use Expression as E;
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let binary = |lhs: &Expression, rhs: &Expression, host: &mut dyn Host| -> Result<(f64, f64)> {
        Ok((eval(lhs, vars, host)?, eval(rhs, vars, host)?))
    };
    Ok(match expr {
        E::Number(n) => *n,
        E::Var(name) => match vars.fetch(name).or_else(|| Function::constant(name)) {
            Some(value) => value,
            None => return Err(error!(MathError; format!("UNKNOWN VARIABLE {}", name))),
        },
        E::Function(name, args) => {
            let builtin = match Function::builtin_and_arity(name) {
                Some((builtin, _)) => builtin,
                None => return Err(error!(MathError; format!("UNKNOWN FUNCTION {}", name))),
            };
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, vars, host)?);
            }
            Function::call(builtin, &values, host)?
        }
        E::Negation(expr) => -eval(expr, vars, host)?,
        E::Not(expr) => flag(eval(expr, vars, host)? == 0.0),
        E::Power(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l.powf(r)
        }
        E::Multiply(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l * r
        }
        E::Divide(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l / r
        }
        E::Modulus(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l % r
        }
        E::Add(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l + r
        }
        E::Subtract(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            l - r
        }
        E::Equal(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l == r)
        }
        E::NotEqual(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l != r)
        }
        E::Less(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l < r)
        }
        E::LessEqual(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l <= r)
        }
        E::Greater(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l > r)
        }
        E::GreaterEqual(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l >= r)
        }
        E::And(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l != 0.0 && r != 0.0)
        }
        E::Or(lhs, rhs) => {
            let (l, r) = binary(lhs, rhs, host)?;
            flag(l != 0.0 || r != 0.0)
        }
    })
}

/// The line with every bound variable replaced by its value. Quoted text and
/// numeric literals are left alone.
pub fn expand_line(line: &str, vars: &Var) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();
    let mut in_quote = false;
    while let Some((start, ch)) = chars.next() {
        if ch == '"' {
            in_quote = !in_quote;
        }
        if in_quote || !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
            out.push(ch);
            continue;
        }
        let mut end = start + ch.len_utf8();
        while let Some(&(index, next)) = chars.peek() {
            if !(next.is_ascii_alphanumeric() || next == '_' || next == '.') {
                break;
            }
            end = index + next.len_utf8();
            chars.next();
        }
        let word = &line[start..end];
        let is_ident = ch.is_ascii_alphabetic() || ch == '_';
        match vars.fetch(word) {
            Some(value) if is_ident => out.push_str(&format_value(value)),
            _ => out.push_str(word),
        }
    }
    out
}
