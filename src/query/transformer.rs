use super::{QueryPlan, Shape, nest};

fn envelope(root: &str, proto: &str, patterns: &str) -> String {
    format!(
        "{{\n \"proto\":[{{\n  \"id\": \"{root}\"{proto}\n }}],\n \"$where\": [\n  \"{root} a ex:Person\"{patterns}\n ],\n \"$prefixes\":{{\n  \"ex\": \"http://example.org/\"\n }}\n}}"
    )
}

pub(super) fn render(plan: &QueryPlan) -> String {
    match plan.shape() {
        Shape::Nested => {
            let proto = nest(
                plan.levels(),
                |level, _| {
                    let (ind, i) = (level.indent(1), level.index);
                    format!(",\n{ind}\"rel_{i}\":{{\n{ind}\"id\": \"?rel_{i}\"")
                },
                |level| format!("{}}}\n", level.indent(1)),
            );
            // the where clause is a flat list, one hop per level
            let patterns: String = plan
                .levels()
                .iter()
                .map(|l| {
                    let i = l.index;
                    format!(",\n  \"?rel_{} ex:relatedWith ?rel_{i}\",\n  \"?rel_{i} a ex:Person\"", i - 1)
                })
                .collect();
            envelope("?rel_0", &proto, &patterns)
        }
        Shape::Flat => {
            let proto: String =
                plan.levels().iter().map(|l| format!(",\n   \"field_{0}\": \"$ex:field_{0}\"", l.index)).collect();
            envelope("?person", &proto, "")
        }
    }
}
