//! L7 — the explanation formatter (spec.md §4.9).

use crate::core::Problem;
use crate::value::{QualifiedName, Value};

/// A full explanation: either every problem found, or success.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainData {
    pub problems: Vec<Problem>,
}

impl ExplainData {
    pub fn success() -> Self {
        Self { problems: vec![] }
    }

    pub fn is_success(&self) -> bool {
        self.problems.is_empty()
    }
}

fn format_path(path: &[Value]) -> String {
    let mut s = String::from("[");
    for (i, p) in path.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        s.push_str(&p.to_string());
    }
    s.push(']');
    s
}

fn format_via(via: &[QualifiedName]) -> Option<String> {
    via.last().map(|n| n.to_string())
}

fn format_problem(p: &Problem) -> String {
    let mut line = String::new();
    if !p.in_.is_empty() {
        line.push_str(&format!("In: {} ", format_path(&p.in_)));
    }
    line.push_str(&format!("val: {} fails", p.val));
    if let Some(via) = format_via(&p.via) {
        line.push_str(&format!(" spec: {via}"));
    }
    line.push_str(&format!(" at: {}", format_path(&p.path)));
    line.push_str(&format!(" predicate: {}", p.pred));
    if let Some(reason) = &p.reason {
        line.push_str(&format!(", {reason}"));
    }
    line
}

impl std::fmt::Display for ExplainData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_success() {
            return write!(f, "Success!");
        }
        for (i, p) in self.problems.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", format_problem(p))?;
        }
        Ok(())
    }
}

/// `explain_data(spec, v)` — the structured record the formatter renders.
pub fn explain_data(spec: &crate::core::Spec, v: &Value) -> ExplainData {
    match spec.explain(&[], &[], &[], v) {
        Some(problems) => ExplainData { problems },
        None => ExplainData::success(),
    }
}

/// `explain_str(spec, v)`.
pub fn explain_str(spec: &crate::core::Spec, v: &Value) -> String {
    explain_data(spec, v).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{predicate, PredicateKind, TypeTag};
    use pretty_assertions::assert_eq;

    #[test]
    fn success_message() {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        assert_eq!(explain_str(&s, &Value::Int(1)), "Success!");
    }

    #[test]
    fn failure_line_shape() {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        let out = explain_str(&s, &Value::from("x"));
        assert!(out.starts_with("val: \"x\" fails at: [] predicate: Integer"));
    }

    #[test]
    fn reports_path_for_nested_failure() {
        let s = crate::collection::coll_of(predicate(PredicateKind::Type(TypeTag::Int)), Default::default());
        let v = Value::Seq(vec![Value::Int(1), Value::from("nope")]);
        let out = explain_str(&s, &v);
        assert!(out.contains("at: [1]"), "{out}");
    }
}
