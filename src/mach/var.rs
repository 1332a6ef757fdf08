use std::collections::HashMap;
use std::rc::Rc;

/// ## Variable memory
///
/// Names are case-sensitive. Every variable holds an `f64`.

#[derive(Debug, Default, Clone)]
pub struct Var {
    vars: HashMap<Rc<str>, f64>,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn fetch(&self, var_name: &str) -> Option<f64> {
        self.vars.get(var_name).copied()
    }

    pub fn contains(&self, var_name: &str) -> bool {
        self.vars.contains_key(var_name)
    }

    pub fn store(&mut self, var_name: &str, value: f64) {
        match self.vars.get_mut(var_name) {
            Some(var) => *var = value,
            None => {
                self.vars.insert(var_name.into(), value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.vars.iter().map(|(k, v)| (k.as_ref(), *v))
    }
}

/// Renders a value the way traces and error reports show it: integral
/// values without a fraction, everything else in shortest form.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
