use crate::error;
use crate::lang::Error;
use std::ops::RangeInclusive;

type Result<T> = std::result::Result<T, Error>;

/// Live state the device-facing built-ins read.
pub trait Host {
    fn is_pressed(&self) -> bool;
    /// Uniform draw from `[lo, hi)`.
    fn random(&mut self, lo: f64, hi: f64) -> f64;
    /// Milliseconds since the script started.
    fn elapsed_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    IsPressed,
    Rand,
    GetTime,
    Deg2Rad,
    Rad2Deg,
    Abs,
    Acos,
    Asin,
    Atan,
    Atan2,
    Ceil,
    Clamp,
    Cos,
    Cosh,
    Cot,
    Exp,
    Floor,
    Ln,
    Log10,
    Max,
    Min,
    Mod,
    Pow,
    Round,
    Sign,
    Sin,
    Sinh,
    Sqr,
    Sqrt,
    Sum,
    Tan,
    Tanh,
    Trunc,
    Fac,
    Ncr,
    Npr,
    If,
    Not,
    And,
    Or,
    Even,
    Odd,
}

pub struct Function {}

impl Function {
    /// Built-in function and the argument counts it accepts. Names are
    /// case-insensitive.
    pub fn builtin_and_arity(func_name: &str) -> Option<(Builtin, RangeInclusive<usize>)> {
        use Builtin::*;
        const MANY: usize = usize::max_value();
        let (builtin, arity) = match func_name.to_ascii_lowercase().as_str() {
            "ispressed" => (IsPressed, 0..=0),
            "rand" => (Rand, 2..=2),
            "gettime" => (GetTime, 0..=0),
            "deg2rad" => (Deg2Rad, 1..=1),
            "rad2deg" => (Rad2Deg, 1..=1),
            "abs" => (Abs, 1..=1),
            "acos" => (Acos, 1..=1),
            "asin" => (Asin, 1..=1),
            "atan" => (Atan, 1..=1),
            "atan2" => (Atan2, 2..=2),
            "ceil" => (Ceil, 1..=1),
            "clamp" => (Clamp, 3..=3),
            "cos" => (Cos, 1..=1),
            "cosh" => (Cosh, 1..=1),
            "cot" => (Cot, 1..=1),
            "exp" => (Exp, 1..=1),
            "floor" => (Floor, 1..=1),
            "ln" | "log" => (Ln, 1..=1),
            "log10" => (Log10, 1..=1),
            "max" => (Max, 1..=MANY),
            "min" => (Min, 1..=MANY),
            "mod" => (Mod, 2..=2),
            "pow" | "power" => (Pow, 2..=2),
            "round" => (Round, 1..=2),
            "sign" => (Sign, 1..=1),
            "sin" => (Sin, 1..=1),
            "sinh" => (Sinh, 1..=1),
            "sqr" => (Sqr, 1..=1),
            "sqrt" => (Sqrt, 1..=1),
            "sum" => (Sum, 1..=MANY),
            "tan" => (Tan, 1..=1),
            "tanh" => (Tanh, 1..=1),
            "trunc" => (Trunc, 1..=1),
            "fac" | "fact" => (Fac, 1..=1),
            "ncr" | "combin" => (Ncr, 2..=2),
            "npr" | "permut" => (Npr, 2..=2),
            "if" => (If, 3..=3),
            "not" => (Not, 1..=1),
            "and" => (And, 1..=MANY),
            "or" => (Or, 1..=MANY),
            "even" => (Even, 1..=1),
            "odd" => (Odd, 1..=1),
            _ => return None,
        };
        Some((builtin, arity))
    }

    /// Named constant for a bare identifier no variable is bound to.
    pub fn constant(name: &str) -> Option<f64> {
        match name.to_ascii_lowercase().as_str() {
            "pi" => Some(std::f64::consts::PI),
            "e" => Some(std::f64::consts::E),
            "true" => Some(1.0),
            "false" => Some(0.0),
            _ => None,
        }
    }

    /// Applies a built-in to already evaluated arguments. Domain errors give
    /// NaN; the caller rejects non-finite results.
    pub fn call(builtin: Builtin, args: &[f64], host: &mut dyn Host) -> Result<f64> {
        use Builtin::*;
        let arg = |n: usize| -> Result<f64> {
            args.get(n)
                .copied()
                .ok_or_else(|| error!(MathError; "WRONG NUMBER OF ARGUMENTS"))
        };
        let truth = |b: bool| if b { 1.0 } else { 0.0 };
        Ok(match builtin {
            IsPressed => truth(host.is_pressed()),
            Rand => {
                let (a, b) = (arg(0)?, arg(1)?);
                let (lo, hi) = if a > b { (b, a) } else { (a, b) };
                if lo == hi || !lo.is_finite() || !hi.is_finite() {
                    lo
                } else {
                    host.random(lo, hi)
                }
            }
            GetTime => host.elapsed_ms(),
            Deg2Rad => arg(0)?.to_radians(),
            Rad2Deg => arg(0)?.to_degrees(),
            Abs => arg(0)?.abs(),
            Acos => arg(0)?.acos(),
            Asin => arg(0)?.asin(),
            Atan => arg(0)?.atan(),
            Atan2 => arg(0)?.atan2(arg(1)?),
            Ceil => arg(0)?.ceil(),
            Clamp => {
                let (x, lo, hi) = (arg(0)?, arg(1)?, arg(2)?);
                let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
                x.max(lo).min(hi)
            }
            Cos => arg(0)?.cos(),
            Cosh => arg(0)?.cosh(),
            Cot => 1.0 / arg(0)?.tan(),
            Exp => arg(0)?.exp(),
            Floor => arg(0)?.floor(),
            Ln => arg(0)?.ln(),
            Log10 => arg(0)?.log10(),
            Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Mod => arg(0)? % arg(1)?,
            Pow => arg(0)?.powf(arg(1)?),
            Round => {
                let x = arg(0)?;
                match args.get(1) {
                    Some(digits) => {
                        let scale = 10f64.powi(*digits as i32);
                        (x * scale).round() / scale
                    }
                    None => x.round(),
                }
            }
            Sign => {
                let x = arg(0)?;
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Sin => arg(0)?.sin(),
            Sinh => arg(0)?.sinh(),
            Sqr => arg(0)? * arg(0)?,
            Sqrt => arg(0)?.sqrt(),
            Sum => args.iter().sum(),
            Tan => arg(0)?.tan(),
            Tanh => arg(0)?.tanh(),
            Trunc => arg(0)?.trunc(),
            Fac => factorial(arg(0)?),
            Ncr => {
                let (n, r) = (arg(0)?, arg(1)?);
                factorial(n) / (factorial(r) * factorial(n - r))
            }
            Npr => {
                let (n, r) = (arg(0)?, arg(1)?);
                factorial(n) / factorial(n - r)
            }
            If => {
                if arg(0)? != 0.0 {
                    arg(1)?
                } else {
                    arg(2)?
                }
            }
            Not => truth(arg(0)? == 0.0),
            And => truth(args.iter().all(|v| *v != 0.0)),
            Or => truth(args.iter().any(|v| *v != 0.0)),
            Even => round_to_parity(arg(0)?, 0.0),
            Odd => round_to_parity(arg(0)?, 1.0),
        })
    }
}

/// NaN for negative or fractional input.
fn factorial(n: f64) -> f64 {
    if n < 0.0 || n.fract() != 0.0 {
        return f64::NAN;
    }
    let mut result: f64 = 1.0;
    let mut i: f64 = 2.0;
    while i <= n && result.is_finite() {
        result *= i;
        i += 1.0;
    }
    result
}

/// Rounds away from zero to the nearest integer whose remainder mod 2 is
/// `parity`.
fn round_to_parity(x: f64, parity: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let mut n = x.abs().ceil();
    if n % 2.0 != parity {
        n += 1.0;
    }
    sign * n
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Host for Fixed {
        fn is_pressed(&self) -> bool {
            true
        }
        fn random(&mut self, lo: f64, _hi: f64) -> f64 {
            lo
        }
        fn elapsed_ms(&self) -> f64 {
            1500.0
        }
    }

    fn call(name: &str, args: &[f64]) -> f64 {
        let (builtin, arity) = Function::builtin_and_arity(name).unwrap();
        assert!(arity.contains(&args.len()));
        Function::call(builtin, args, &mut Fixed).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(Function::builtin_and_arity("GetTime").is_some());
        assert!(Function::builtin_and_arity("ISPRESSED").is_some());
        assert!(Function::builtin_and_arity("frobnicate").is_none());
        assert_eq!(Function::constant("PI"), Some(std::f64::consts::PI));
        assert_eq!(Function::constant("x"), None);
    }

    #[test]
    fn test_device_builtins() {
        assert_eq!(call("IsPressed", &[]), 1.0);
        assert_eq!(call("GetTime", &[]), 1500.0);
        assert_eq!(call("Rand", &[10.0, 2.0]), 2.0);
        assert_eq!(call("Rand", &[4.0, 4.0]), 4.0);
    }

    #[test]
    fn test_math() {
        assert_eq!(call("max", &[1.0, 7.0, 3.0]), 7.0);
        assert_eq!(call("min", &[1.0, 7.0, -3.0]), -3.0);
        assert_eq!(call("clamp", &[300.0, 0.0, 255.0]), 255.0);
        assert_eq!(call("fac", &[5.0]), 120.0);
        assert_eq!(call("ncr", &[5.0, 2.0]), 10.0);
        assert_eq!(call("npr", &[5.0, 2.0]), 20.0);
        assert_eq!(call("round", &[2.346, 2.0]), 2.35);
        assert_eq!(call("sign", &[-0.5]), -1.0);
        assert_eq!(call("even", &[1.5]), 2.0);
        assert_eq!(call("even", &[-3.0]), -4.0);
        assert_eq!(call("odd", &[2.0]), 3.0);
        assert_eq!(call("if", &[0.0, 1.0, 2.0]), 2.0);
        assert!((call("deg2rad", &[180.0]) - std::f64::consts::PI).abs() < 1e-12);
        assert!((call("rad2deg", &[std::f64::consts::PI]) - 180.0).abs() < 1e-9);
        assert!(call("sqrt", &[-1.0]).is_nan());
        assert!(call("fac", &[-1.0]).is_nan());
    }
}
