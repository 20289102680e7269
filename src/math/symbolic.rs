use crate::{
    math::{
        ast::{Exp, format_number},
        error::DiffError,
    },
    types::Op,
};

/// One additive term, `coefficient * x^power`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monomial {
    pub coefficient: f64,
    pub power: u32,
}

impl Monomial {
    pub fn new(coefficient: f64, power: u32) -> Self {
        Monomial { coefficient, power }
    }

    pub fn constant(coefficient: f64) -> Self {
        Monomial::new(coefficient, 0)
    }

    pub fn negated(self) -> Self {
        Monomial::new(-self.coefficient, self.power)
    }

    /// Power rule: `c*x^n` becomes `(c*n)*x^(n-1)`, constants become `0`.
    pub fn derivative(&self) -> Monomial {
        match self.power {
            0 => Monomial::constant(0.0),
            n => Monomial::new(self.coefficient * f64::from(n), n - 1),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient == 0.0
    }

    /// Reduces a single term to a monomial, or `None` when it has any other
    /// shape: calls, products of two non-constant factors, fractional or
    /// negative powers of the variable, nested sums. A coefficient that
    /// overflows is `None` as well.
    pub fn from_term(term: &Exp) -> Option<Monomial> {
        let monomial = match term {
            Exp::Val(v) => Some(Monomial::constant(*v)),
            Exp::Var(_) => Some(Monomial::new(1.0, 1)),
            Exp::Neg(inner) => Monomial::from_term(inner).map(Monomial::negated),
            Exp::Op(Op::Mul, lhs, rhs) => {
                let lhs = Monomial::from_term(lhs)?;
                let rhs = Monomial::from_term(rhs)?;
                if lhs.power > 0 && rhs.power > 0 {
                    return None;
                }
                Some(Monomial::new(
                    lhs.coefficient * rhs.coefficient,
                    lhs.power + rhs.power,
                ))
            }
            Exp::Op(Op::Div, lhs, rhs) => {
                let lhs = Monomial::from_term(lhs)?;
                let rhs = Monomial::from_term(rhs)?;
                if rhs.power > 0 || rhs.is_zero() {
                    return None;
                }
                Some(Monomial::new(lhs.coefficient / rhs.coefficient, lhs.power))
            }
            Exp::Op(Op::Pow, base, exponent) => {
                let base = Monomial::from_term(base)?;
                let exponent = Monomial::from_term(exponent)?;
                if exponent.power > 0 {
                    return None;
                }
                let n = exponent.coefficient;
                if base.power == 0 {
                    Some(Monomial::constant(base.coefficient.powf(n)))
                } else if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
                    None
                } else {
                    let n = n as u32;
                    Some(Monomial::new(
                        base.coefficient.powf(f64::from(n)),
                        base.power.checked_mul(n)?,
                    ))
                }
            }
            Exp::Op(Op::Add | Op::Sub, ..) | Exp::Fun(..) => None,
        };
        monomial.filter(|m| m.coefficient.is_finite())
    }

    /// `12*x^3`, `-x`, `x^2`, `-7`. A unit coefficient and a unit exponent are
    /// left out.
    pub fn render(&self, variable: &str) -> String {
        let var = match self.power {
            0 => return format_number(self.coefficient),
            1 => variable.to_string(),
            n => format!("{variable}^{n}"),
        };
        if self.coefficient == 1.0 {
            var
        } else if self.coefficient == -1.0 {
            format!("-{var}")
        } else {
            format!("{}*{var}", format_number(self.coefficient))
        }
    }
}

/// The additive structure of an expression: the terms that are monomials, in
/// source order, and the terms that are not.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    pub terms: Vec<Monomial>,
    pub unsupported: Vec<Exp>,
}

impl Polynomial {
    pub fn from_exp(exp: &Exp) -> Self {
        let mut poly = Polynomial::default();
        poly.collect(exp, false);
        poly
    }

    fn collect(&mut self, exp: &Exp, negate: bool) {
        match exp {
            Exp::Op(Op::Add, lhs, rhs) => {
                self.collect(lhs, negate);
                self.collect(rhs, negate);
            }
            Exp::Op(Op::Sub, lhs, rhs) => {
                self.collect(lhs, negate);
                self.collect(rhs, !negate);
            }
            Exp::Neg(inner) if matches!(**inner, Exp::Op(Op::Add | Op::Sub, ..)) => {
                self.collect(inner, !negate);
            }
            term => match Monomial::from_term(term) {
                Some(m) if negate => self.terms.push(m.negated()),
                Some(m) => self.terms.push(m),
                None => self.unsupported.push(term.clone()),
            },
        }
    }

    pub fn is_supported(&self) -> bool {
        self.unsupported.is_empty()
    }

    /// Sum rule over the monomial terms. Terms whose derivative vanishes are
    /// dropped.
    pub fn derivative(&self) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(Monomial::derivative)
                .filter(|m| !m.is_zero())
                .collect(),
            unsupported: Vec::new(),
        }
    }

    /// Joins terms with ` + `, turning `+ -` into `- `. An empty sum is `0`.
    pub fn render(&self, variable: &str) -> String {
        let joined = self
            .terms
            .iter()
            .filter(|m| !m.is_zero())
            .map(|m| m.render(variable))
            .collect::<Vec<_>>()
            .join(" + ")
            .replace("+ -", "- ");
        if joined.is_empty() {
            "0".to_string()
        } else {
            joined
        }
    }
}

/// Differentiates a sum of monomials in `variable` and renders the result in
/// the same textual grammar.
pub fn symbolic_derivative(input: &str, variable: &str) -> Result<String, DiffError> {
    if input.contains('=') {
        return Err(DiffError::ImplicitNotSupported);
    }
    let exp = Exp::parse(input, variable)?;
    let variable = variable.to_lowercase();
    let poly = Polynomial::from_exp(&exp);
    if let Some(term) = poly.unsupported.first() {
        return Err(DiffError::UnsupportedForm {
            term: term.to_string(),
        });
    }
    if let Some(term) = poly
        .terms
        .iter()
        .find(|m| !m.derivative().coefficient.is_finite())
    {
        return Err(DiffError::UnsupportedForm {
            term: term.render(&variable),
        });
    }
    Ok(poly.derivative().render(&variable))
}
