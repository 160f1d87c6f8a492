use super::{CatalogError, Dimension, Measure};
use sqlparser::ast::{
    Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, SelectItem, SetExpr,
    Statement,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

const AGGREGATE_FUNCTIONS: &[&str] = &[
    "COUNT",
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "MEDIAN",
    "MODE",
    "STDDEV",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "VARIANCE",
    "VAR_POP",
    "VAR_SAMP",
    "ARRAY_AGG",
    "STRING_AGG",
    "BOOL_AND",
    "BOOL_OR",
    "EVERY",
    "PERCENTILE_CONT",
    "PERCENTILE_DISC",
];

pub(super) fn check_dimension(dimension: &Dimension) -> Result<(), CatalogError> {
    let expr = parse_projection(dimension.key, dimension.expression)?;
    if contains_aggregate(&expr) {
        return Err(invalid(
            dimension.key,
            "dimension expressions must not aggregate",
        ));
    }
    Ok(())
}

pub(super) fn check_measure(measure: &Measure) -> Result<(), CatalogError> {
    let expr = parse_projection(measure.key, measure.expression)?;
    if !contains_aggregate(&expr) {
        return Err(invalid(
            measure.key,
            "measure expressions must contain an aggregate function",
        ));
    }
    Ok(())
}

/// Parses `SELECT <expression>` and returns the single projected expression.
///
/// Anything beyond a lone unaliased projection (a second statement, a FROM,
/// WHERE or GROUP BY clause, an alias, a trailing ORDER BY or LIMIT, a
/// subquery at any depth) is rejected, since the compiler splices the text
/// verbatim into its own select list.
fn parse_projection(key: &str, expression: &str) -> Result<Expr, CatalogError> {
    let dialect = PostgreSqlDialect {};
    let statements = Parser::parse_sql(&dialect, &format!("SELECT {}", expression))
        .map_err(|e| invalid(key, &e.to_string()))?;

    let query = match statements.as_slice() {
        [Statement::Query(query)] => query,
        _ => return Err(invalid(key, "expected exactly one projection")),
    };

    if query.to_string() != query.body.to_string() {
        return Err(invalid(key, "unexpected clauses after projection"));
    }

    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        _ => return Err(invalid(key, "expected a plain SELECT")),
    };

    let item = match select.projection.as_slice() {
        [item] => item,
        _ => return Err(invalid(key, "expected exactly one projection")),
    };

    if select.to_string() != format!("SELECT {}", item) {
        return Err(invalid(key, "expression must not read from a relation"));
    }

    let expr = match item {
        SelectItem::UnnamedExpr(expr) => expr,
        _ => return Err(invalid(key, "aliases and wildcards are not allowed")),
    };

    if reads_relation(expr) {
        return Err(invalid(key, "expression must not read from a relation"));
    }

    Ok(expr.clone())
}

fn contains_aggregate(expr: &Expr) -> bool {
    let aggregate = matches!(
        expr,
        Expr::Function(func)
            if AGGREGATE_FUNCTIONS.contains(&func.name.to_string().to_uppercase().as_str())
    );
    aggregate || sub_expressions(expr).into_iter().any(contains_aggregate)
}

fn reads_relation(expr: &Expr) -> bool {
    match expr {
        Expr::Subquery(_) | Expr::Exists { .. } | Expr::InSubquery { .. } => true,
        Expr::Function(func) if matches!(func.args, FunctionArguments::Subquery(_)) => true,
        other => sub_expressions(other).into_iter().any(reads_relation),
    }
}

/// Direct operands of a compound expression.
fn sub_expressions(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Function(func) => function_args(func).collect(),
        Expr::Nested(inner)
        | Expr::UnaryOp { expr: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::Extract { expr: inner, .. }
        | Expr::Substring { expr: inner, .. }
        | Expr::InSubquery { expr: inner, .. }
        | Expr::IsNull(inner)
        | Expr::IsNotNull(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner) => vec![inner.as_ref()],
        Expr::BinaryOp { left, right, .. }
        | Expr::IsDistinctFrom(left, right)
        | Expr::IsNotDistinctFrom(left, right)
        | Expr::Like {
            expr: left,
            pattern: right,
            ..
        }
        | Expr::ILike {
            expr: left,
            pattern: right,
            ..
        } => vec![left.as_ref(), right.as_ref()],
        Expr::Between {
            expr, low, high, ..
        } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
        Expr::InList { expr, list, .. } => std::iter::once(expr.as_ref()).chain(list).collect(),
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
            ..
        } => operand
            .iter()
            .chain(else_result.iter())
            .map(|e| e.as_ref())
            .chain(conditions)
            .chain(results)
            .collect(),
        Expr::Tuple(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

fn function_args(func: &Function) -> impl Iterator<Item = &Expr> {
    let args: &[FunctionArg] = match &func.args {
        FunctionArguments::List(list) => &list.args,
        _ => &[],
    };

    args.iter().filter_map(|arg| match arg {
        FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
        | FunctionArg::Named {
            arg: FunctionArgExpr::Expr(expr),
            ..
        } => Some(expr),
        _ => None,
    })
}

fn invalid(key: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidExpression {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
