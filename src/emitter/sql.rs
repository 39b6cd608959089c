//! SQL emitter
//!
//! Transforms a PlanNode tree into a SQLite statement with numbered
//! placeholders. Every dynamic value travels in `params`, never in the text.

use crate::model::Aggregation;
use crate::plan::{
    Aggregate, AggregateExpr, Column, Expr, Filter, Limit, Literal, Param, PlanNode, Scan, Sort,
    SortDirection,
};
use super::error::EmitError;

/// A statement ready for the fact store
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    /// Values for `?1`, `?2`, ... in order
    pub params: Vec<Param>,
}

/// Emit a pretty-printed SQL statement from a PlanNode.
pub fn emit_sql(node: &PlanNode) -> Result<SqlQuery, EmitError> {
    let mut writer = SqlWriter::default();
    let sql = writer.node(node, 0)?;
    Ok(SqlQuery { sql, params: writer.params })
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Default)]
struct SqlWriter {
    params: Vec<Param>,
}

impl SqlWriter {
    // -----------------------------------------------------------------------
    // Node dispatch
    // -----------------------------------------------------------------------

    fn node(&mut self, node: &PlanNode, indent: usize) -> Result<String, EmitError> {
        match node {
            PlanNode::Scan(scan) => Ok(self.scan(scan, indent)),
            PlanNode::Filter(filter) => self.filter(filter, indent),
            PlanNode::Aggregate(agg) => self.aggregate(agg, indent),
            PlanNode::Sort(sort) => self.sort(sort, indent),
            PlanNode::Limit(limit) => self.limit(limit, indent),
        }
    }

    fn scan(&mut self, scan: &Scan, indent: usize) -> String {
        let p = pad(indent);
        let cols = if scan.columns.is_empty() {
            "*".to_string()
        } else {
            scan.columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ")
        };
        format!("{p}SELECT {cols}\n{p}FROM {table}", table = quote_ident(&scan.table))
    }

    fn filter(&mut self, filter: &Filter, indent: usize) -> Result<String, EmitError> {
        let p = pad(indent);
        let input = self.node(&filter.input, indent + 1)?;
        let predicate = self.expr(&filter.predicate)?;
        Ok(format!("{p}SELECT *\n{p}FROM (\n{input}\n{p}) AS _f\n{p}WHERE {predicate}"))
    }

    fn aggregate(&mut self, agg: &Aggregate, indent: usize) -> Result<String, EmitError> {
        if agg.group_by.is_empty() && agg.aggregates.is_empty() {
            return Err(EmitError::InvalidPlan("Aggregate has no output columns".to_string()));
        }
        let p = pad(indent);
        let input = self.node(&agg.input, indent + 1)?;

        let mut select_items = Vec::new();
        let mut group_cols = Vec::new();
        for item in &agg.group_by {
            let expr = self.expr(&item.expr)?;
            select_items.push(format!("{} AS {}", expr, quote_ident(&item.alias)));
            group_cols.push(expr);
        }
        for a in &agg.aggregates {
            select_items.push(self.aggregate_expr(a)?);
        }

        if group_cols.is_empty() {
            Ok(format!(
                "{p}SELECT {sel}\n{p}FROM (\n{input}\n{p}) AS _a",
                sel = select_items.join(", "),
            ))
        } else {
            Ok(format!(
                "{p}SELECT {sel}\n{p}FROM (\n{input}\n{p}) AS _a\n{p}GROUP BY {grp}",
                sel = select_items.join(", "),
                grp = group_cols.join(", "),
            ))
        }
    }

    fn sort(&mut self, sort: &Sort, indent: usize) -> Result<String, EmitError> {
        let p = pad(indent);
        let input = self.node(&sort.input, indent + 1)?;
        Ok(format!(
            "{p}SELECT *\n{p}FROM (\n{input}\n{p}) AS _s\n{p}ORDER BY {keys}",
            keys = order_keys(sort),
        ))
    }

    /// ORDER BY and LIMIT share one SELECT so the limit applies to the sorted rows
    fn limit(&mut self, limit: &Limit, indent: usize) -> Result<String, EmitError> {
        let p = pad(indent);
        let body = match limit.input.as_ref() {
            PlanNode::Sort(sort) => self.sort(sort, indent)?,
            PlanNode::Limit(_) => {
                return Err(EmitError::UnsupportedNode("Limit directly over Limit".to_string()));
            }
            other => {
                let input = self.node(other, indent + 1)?;
                format!("{p}SELECT *\n{p}FROM (\n{input}\n{p}) AS _l")
            }
        };
        let count = i64::try_from(limit.count)
            .map_err(|_| EmitError::InvalidPlan(format!("Limit {} out of range", limit.count)))?;
        let placeholder = self.bind(Param::Int(count));
        Ok(format!("{body}\n{p}LIMIT {placeholder}"))
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn bind(&mut self, param: Param) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    fn expr(&mut self, expr: &Expr) -> Result<String, EmitError> {
        match expr {
            Expr::Column(col) => Ok(emit_column(col)),
            Expr::Literal(lit) => Ok(emit_literal(lit)),
            Expr::Param(param) => Ok(self.bind(param.clone())),
            Expr::BinaryOp { left, op, right } => {
                let l = self.expr(left)?;
                let r = self.expr(right)?;
                Ok(format!("{} {} {}", l, op.as_str(), r))
            }
            Expr::And(exprs) => {
                if exprs.is_empty() {
                    return Ok("1 = 1".to_string());
                }
                let parts = self.exprs(exprs)?;
                Ok(format!("({})", parts.join(" AND ")))
            }
            Expr::Or(exprs) => {
                if exprs.is_empty() {
                    return Ok("1 = 0".to_string());
                }
                let parts = self.exprs(exprs)?;
                Ok(format!("({})", parts.join(" OR ")))
            }
            Expr::In { expr, values } => {
                if values.is_empty() {
                    return Err(EmitError::UnsupportedExpression("IN with an empty value list".to_string()));
                }
                let needle = self.expr(expr)?;
                let vals = self.exprs(values)?;
                Ok(format!("{} IN ({})", needle, vals.join(", ")))
            }
            Expr::IsNull(inner) => Ok(format!("{} IS NULL", self.expr(inner)?)),
            Expr::Trim { expr, chars } => {
                let inner = self.expr(expr)?;
                match chars {
                    Some(chars) => Ok(format!("TRIM({}, {})", inner, self.expr(chars)?)),
                    None => Ok(format!("TRIM({})", inner)),
                }
            }
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) -> Result<Vec<String>, EmitError> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn aggregate_expr(&mut self, agg: &AggregateExpr) -> Result<String, EmitError> {
        let inner = self.expr(&agg.expr)?;
        let func_sql = match agg.func {
            Aggregation::Sum => format!("SUM({})", inner),
            Aggregation::Avg => format!("AVG({})", inner),
            Aggregation::Count => format!("COUNT({})", inner),
            Aggregation::CountDistinct => format!("COUNT(DISTINCT {})", inner),
            Aggregation::Min => format!("MIN({})", inner),
            Aggregation::Max => format!("MAX({})", inner),
        };
        Ok(format!("{} AS {}", func_sql, quote_ident(&agg.alias)))
    }
}

fn order_keys(sort: &Sort) -> String {
    sort.sort_keys
        .iter()
        .map(|k| {
            let dir = match k.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            format!("{} {}", quote_ident(&k.column), dir)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_column(col: &Column) -> String {
    quote_ident(&col.name)
}

fn emit_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "NULL".to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{BinaryOperator, ProjectExpr, SortKey};

    fn scan() -> PlanNode {
        PlanNode::Scan(Scan::new("visits").with_columns(vec!["visit_year".into(), "amount".into()]))
    }

    fn aggregate(input: PlanNode) -> PlanNode {
        PlanNode::Aggregate(Aggregate {
            input: Box::new(input),
            group_by: vec![ProjectExpr { expr: Expr::column("visit_year"), alias: "year".into() }],
            aggregates: vec![AggregateExpr {
                func: Aggregation::Sum,
                expr: Expr::column("amount"),
                alias: "value_sum".into(),
            }],
        })
    }

    // -- unit: scan -----------------------------------------------------------

    #[test]
    fn test_sql_scan() {
        let query = emit_sql(&scan()).unwrap();
        assert_eq!(query.sql, "SELECT \"visit_year\", \"amount\"\nFROM \"visits\"");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    // -- unit: filter ---------------------------------------------------------

    #[test]
    fn test_sql_filter_binds_params() {
        let filter = PlanNode::Filter(Filter {
            input: Box::new(scan()),
            predicate: Expr::And(vec![
                Expr::In {
                    expr: Box::new(Expr::column("visit_year")),
                    values: vec![Expr::param(2023i64), Expr::param(2024i64)],
                },
                Expr::binary(Expr::column("visit_date"), BinaryOperator::GtEq, Expr::param("2023-01-01")),
            ]),
        });
        let query = emit_sql(&filter).unwrap();
        assert!(query.sql.contains("WHERE (\"visit_year\" IN (?1, ?2) AND \"visit_date\" >= ?3)"), "{}", query.sql);
        assert_eq!(
            query.params,
            vec![Param::Int(2023), Param::Int(2024), Param::Text("2023-01-01".into())]
        );
    }

    #[test]
    fn test_sql_blank_clause() {
        let expr = Expr::Or(vec![
            Expr::In { expr: Box::new(Expr::column("segment")), values: vec![Expr::param("A")] },
            Expr::IsNull(Box::new(Expr::column("segment"))),
            Expr::binary(
                Expr::Trim { expr: Box::new(Expr::column("segment")), chars: Some(Box::new(Expr::param(" \t"))) },
                BinaryOperator::Eq,
                Expr::Literal(Literal::String(String::new())),
            ),
        ]);
        let mut writer = SqlWriter::default();
        let sql = writer.expr(&expr).unwrap();
        assert_eq!(sql, "(\"segment\" IN (?1) OR \"segment\" IS NULL OR TRIM(\"segment\", ?2) = '')");
        assert_eq!(writer.params, vec![Param::Text("A".into()), Param::Text(" \t".into())]);

        let plain = Expr::Trim { expr: Box::new(Expr::column("segment")), chars: None };
        assert_eq!(writer.expr(&plain).unwrap(), "TRIM(\"segment\")");
    }

    #[test]
    fn test_sql_empty_in_is_rejected() {
        let expr = Expr::In { expr: Box::new(Expr::column("x")), values: vec![] };
        let mut writer = SqlWriter::default();
        assert!(writer.expr(&expr).is_err());
    }

    // -- unit: aggregate ------------------------------------------------------

    #[test]
    fn test_sql_aggregate() {
        let query = emit_sql(&aggregate(scan())).unwrap();
        assert!(query.sql.contains("SELECT \"visit_year\" AS \"year\", SUM(\"amount\") AS \"value_sum\""));
        assert!(query.sql.contains("GROUP BY \"visit_year\""));
        assert!(query.sql.contains("  SELECT \"visit_year\", \"amount\""), "Inner SELECT should be indented:\n{}", query.sql);
    }

    #[test]
    fn test_sql_count_distinct() {
        let mut writer = SqlWriter::default();
        let sql = writer
            .aggregate_expr(&AggregateExpr {
                func: Aggregation::CountDistinct,
                expr: Expr::column("visit_code"),
                alias: "visit_count_distinct".into(),
            })
            .unwrap();
        assert_eq!(sql, "COUNT(DISTINCT \"visit_code\") AS \"visit_count_distinct\"");
    }

    // -- unit: sort and limit -------------------------------------------------

    #[test]
    fn test_sql_sort() {
        let sort = PlanNode::Sort(Sort {
            input: Box::new(aggregate(scan())),
            sort_keys: vec![SortKey::desc("value_sum"), SortKey::asc("year")],
        });
        let query = emit_sql(&sort).unwrap();
        assert!(query.sql.ends_with("ORDER BY \"value_sum\" DESC, \"year\" ASC"), "{}", query.sql);
    }

    #[test]
    fn test_sql_limit_shares_select_with_sort() {
        let limit = PlanNode::Limit(Limit {
            input: Box::new(PlanNode::Sort(Sort {
                input: Box::new(aggregate(scan())),
                sort_keys: vec![SortKey::desc("value_sum")],
            })),
            count: 5,
        });
        let query = emit_sql(&limit).unwrap();
        assert!(query.sql.ends_with("ORDER BY \"value_sum\" DESC\nLIMIT ?1"), "{}", query.sql);
        assert_eq!(query.params, vec![Param::Int(5)]);
    }
}
