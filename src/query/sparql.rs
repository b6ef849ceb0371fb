use super::{Level, QueryPlan, Shape, nest};

const PREFIX: &str = "PREFIX ex: <http://example.org/>";

// root persons are selected in a subquery so that every level is optional
fn head(root: &str) -> String {
    format!(
        "{PREFIX}\nSELECT *\nWHERE{{\n  {{ SELECT {root}\n    WHERE{{\n      {root} a ex:Person .\n    }}\n  }}\n"
    )
}

/// Variable bound at the subject end of a nested level: `?x_1`, `?x_1_1`, ...
fn variable(depth: usize) -> String {
    format!("?x_1{}", "_1".repeat(depth.saturating_sub(1)))
}

fn nested_level(level: Level, innermost: bool) -> String {
    let ind = level.indent(1);
    let (parent, child) = (variable(level.index), variable(level.index + 1));
    let tail = if innermost { "" } else { ind.as_str() };
    format!("OPTIONAL{{\n{ind}{parent} ex:relatedWith {child} .\n{ind}{child} a ex:Person .\n{tail}")
}

pub(super) fn render(plan: &QueryPlan) -> String {
    let (root, body) = match plan.shape() {
        Shape::Nested => (
            variable(1),
            nest(plan.levels(), nested_level, |level| format!("{}}}\n", level.indent(0))),
        ),
        Shape::Flat => (
            "?person".to_owned(),
            plan.levels()
                .iter()
                .map(|l| format!("OPTIONAL{{\n   ?person ex:field_{0} ?x_{0} .\n  }}\n  ", l.index))
                .collect(),
        ),
    };
    let mut q = head(&root);
    if !plan.is_empty() {
        q.push_str("  ");
        q.push_str(&body);
        q.push('\n');
    }
    q.push('}');
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Dialect, expand, render as render_query};
    use pretty_assertions::assert_eq;
    use spargebra::SparqlParser;

    #[test]
    fn variables() {
        assert_eq!(variable(1), "?x_1");
        assert_eq!(variable(3), "?x_1_1_1");
    }

    #[test]
    fn nested() {
        assert_eq!(
            render_query(Dialect::Sparql, Shape::Nested, 1),
            "PREFIX ex: <http://example.org/>\nSELECT *\nWHERE{\n  { SELECT ?x_1\n    WHERE{\n      ?x_1 a ex:Person .\n    }\n  }\n  OPTIONAL{\n    ?x_1 ex:relatedWith ?x_1_1 .\n    ?x_1_1 a ex:Person .\n  }\n\n}"
        );
        assert_eq!(
            render_query(Dialect::Sparql, Shape::Nested, 2),
            "PREFIX ex: <http://example.org/>\nSELECT *\nWHERE{\n  { SELECT ?x_1\n    WHERE{\n      ?x_1 a ex:Person .\n    }\n  }\n  OPTIONAL{\n    ?x_1 ex:relatedWith ?x_1_1 .\n    ?x_1_1 a ex:Person .\n    OPTIONAL{\n      ?x_1_1 ex:relatedWith ?x_1_1_1 .\n      ?x_1_1_1 a ex:Person .\n    }\n  }\n\n}"
        );
    }

    #[test]
    fn nested_two_levels_reference_parent() {
        let q = render_query(Dialect::Sparql, Shape::Nested, 2);
        assert_eq!(q.matches("OPTIONAL{").count(), 2);
        let outer = q.find("?x_1 ex:relatedWith ?x_1_1 .").unwrap();
        let inner = q.find("?x_1_1 ex:relatedWith ?x_1_1_1 .").unwrap();
        let second_optional = q.rfind("OPTIONAL{").unwrap();
        assert!(outer < second_optional && second_optional < inner);
    }

    #[test]
    fn nested_innermost_indent() {
        for depth in 1..20 {
            let q = render(&QueryPlan::new(Shape::Nested, depth));
            let pattern = format!("{} a ex:Person .", variable(depth + 1));
            let line = q.lines().find(|l| l.trim() == pattern).unwrap();
            assert_eq!(line, format!("{}{pattern}", " ".repeat(2 + 2 * depth)));
        }
    }

    #[test]
    fn flat() {
        assert_eq!(
            render_query(Dialect::Sparql, Shape::Flat, 2),
            "PREFIX ex: <http://example.org/>\nSELECT *\nWHERE{\n  { SELECT ?person\n    WHERE{\n      ?person a ex:Person .\n    }\n  }\n  OPTIONAL{\n   ?person ex:field_1 ?x_1 .\n  }\n  OPTIONAL{\n   ?person ex:field_2 ?x_2 .\n  }\n  \n}"
        );
    }

    #[test]
    fn depth_zero() {
        assert_eq!(
            render_query(Dialect::Sparql, Shape::Nested, 0),
            "PREFIX ex: <http://example.org/>\nSELECT *\nWHERE{\n  { SELECT ?x_1\n    WHERE{\n      ?x_1 a ex:Person .\n    }\n  }\n}"
        );
    }

    #[test]
    fn parses() {
        for shape in [Shape::Nested, Shape::Flat] {
            for q in std::iter::once(render_query(Dialect::Sparql, shape, 0))
                .chain(expand(Dialect::Sparql, shape, 12))
            {
                if let Err(e) = SparqlParser::new().parse_query(&q) {
                    panic!("invalid SPARQL {e}:\n{q}");
                }
            }
        }
    }
}
