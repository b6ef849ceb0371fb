use super::{QueryPlan, Shape, nest};

pub(super) fn render(root: &str, plan: &QueryPlan) -> String {
    let mut q = format!("{{\n  {root}{{\n    _id\n");
    match plan.shape() {
        Shape::Nested if !plan.is_empty() => {
            q.push_str("    ");
            q.push_str(&nest(
                plan.levels(),
                |level, innermost| {
                    let fields = level.indent(2);
                    let child = if innermost { "" } else { fields.as_str() };
                    format!("ex_relatedWith{{\n{fields}_id\n{child}")
                },
                |level| format!("\n{}}}\n", level.indent(1)),
            ));
        }
        Shape::Nested => {}
        Shape::Flat => {
            for level in plan.levels() {
                q.push_str(&format!("   ex_field_{}\n", level.index));
            }
        }
    }
    q.push_str("  }\n}");
    q
}
