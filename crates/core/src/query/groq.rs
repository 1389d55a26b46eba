// Rendering queries as GROQ for the hosted content API.

use serde_json::Value;

use super::{Filter, Operand, Query};

impl Query {
    /// Render this query as a GROQ string. Perspective travels separately
    /// as a request parameter.
    pub fn to_groq(&self) -> String {
        let mut conditions = Vec::new();
        if let Some(doc_type) = &self.doc_type {
            conditions.push(format!("_type == {}", literal(&Value::String(doc_type.clone()))));
        }
        if self.filter != Filter::All {
            conditions.push(render(&self.filter, Precedence::And));
        }

        let mut out = String::from("*");
        if !conditions.is_empty() {
            out.push('[');
            out.push_str(&conditions.join(" && "));
            out.push(']');
        }
        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            out.push_str(&format!(" | order({} {direction})", order.field));
        }
        if let Some(limit) = self.limit {
            out.push_str(&format!("[0...{limit}]"));
        }
        out
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    Unary,
}

fn render(filter: &Filter, context: Precedence) -> String {
    let (text, own) = match filter {
        Filter::All => ("true".to_string(), Precedence::Unary),
        Filter::Eq(path, op) => (format!("{path} == {}", operand(op)), Precedence::Unary),
        Filter::Neq(path, op) => (format!("{path} != {}", operand(op)), Precedence::Unary),
        Filter::Gte(path, op) => (format!("{path} >= {}", operand(op)), Precedence::Unary),
        Filter::Defined(path) => (format!("defined({path})"), Precedence::Unary),
        Filter::References(op) => (format!("references({})", operand(op)), Precedence::Unary),
        Filter::And(l, r) => (
            format!("{} && {}", render(l, Precedence::And), render(r, Precedence::And)),
            Precedence::And,
        ),
        Filter::Or(l, r) => (
            format!("{} || {}", render(l, Precedence::Or), render(r, Precedence::Or)),
            Precedence::Or,
        ),
        Filter::Not(inner) => (format!("!{}", render(inner, Precedence::Unary)), Precedence::Unary),
    };
    if own < context {
        format!("({text})")
    } else {
        text
    }
}

fn operand(op: &Operand) -> String {
    match op {
        Operand::Literal(value) => literal(value),
        Operand::Param(name) => format!("${name}"),
        Operand::Now => "now()".to_string(),
    }
}

/// JSON scalars are valid GROQ literals.
fn literal(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_listing_query() {
        let query = Query::of_type("buurtActie")
            .filter(Filter::not_archived())
            .order_by("datetime", false);
        assert_eq!(
            query.to_groq(),
            r#"*[_type == "buurtActie" && isArchived != true] | order(datetime asc)"#
        );
    }

    #[test]
    fn renders_upcoming_filter_with_now() {
        let query = Query::of_type("buurtActie")
            .filter(Filter::not_archived())
            .filter(Filter::not_before_now("datetime"))
            .order_by("datetime", false)
            .limit(3);
        assert_eq!(
            query.to_groq(),
            r#"*[_type == "buurtActie" && isArchived != true && datetime >= now()] | order(datetime asc)[0...3]"#
        );
    }

    #[test]
    fn renders_params_and_slice() {
        let query = Query::of_type("registration")
            .filter(Filter::eq_param("email", "email").and(Filter::eq_param("buurtActie._ref", "actionId")))
            .limit(1);
        assert_eq!(
            query.to_groq(),
            r#"*[_type == "registration" && email == $email && buurtActie._ref == $actionId][0...1]"#
        );
    }

    #[test]
    fn parenthesises_or_inside_and() {
        let f = Filter::eq("a", 1).and(Filter::eq("b", 2).or(Filter::eq("c", 3)));
        assert_eq!(
            Query::all().filter(f).to_groq(),
            "*[a == 1 && (b == 2 || c == 3)]"
        );
    }

    #[test]
    fn unfiltered_query_is_star() {
        assert_eq!(Query::all().to_groq(), "*");
        assert_eq!(
            Query::all().filter(Filter::defined("slug").negate()).to_groq(),
            "*[!defined(slug)]"
        );
    }
}
