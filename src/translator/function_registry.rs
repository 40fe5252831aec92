/// Qualifier Function Registry
///
/// Maps qualifier function names to their dialect-neutral SQL form. Dialects
/// rename or restructure the generic form later (`LOCATE`, `EXTRACT`, ...).
use std::collections::HashMap;

use super::errors::{TranslationError, UnsupportedConstructError};
use crate::sql_ast::builder::{function, text};
use crate::sql_ast::{ArgStyle, DatePart, ExtractNode, Node};

/// How the generic SQL for a function is shaped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FunctionKind {
    /// `NAME(a, b)`
    Plain,
    /// `CURRENT_DATE`
    NoParens,
    /// `EXTRACT(part FROM x)`
    Extract(DatePart),
    /// `LOCATE(needle, haystack)`, always rewritten by the dialect
    Locate,
}

/// Function mapping entry
#[derive(Debug, Clone)]
pub struct FunctionMapping {
    /// Qualifier name as documented (lookup is case-insensitive)
    pub name: &'static str,
    /// Generic SQL function name
    pub sql_name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub aggregate: bool,
    pub kind: FunctionKind,
}

impl FunctionMapping {
    fn expected_arity(&self) -> String {
        if self.min_args == self.max_args {
            self.min_args.to_string()
        } else if self.max_args == usize::MAX {
            format!("at least {}", self.min_args)
        } else {
            format!("{}..{}", self.min_args, self.max_args)
        }
    }

    /// Builds the generic SQL node for already translated `args`.
    pub fn build(&self, args: Vec<Node>) -> Result<Node, TranslationError> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(UnsupportedConstructError::FunctionArity {
                name: self.name.to_string(),
                expected: self.expected_arity(),
                actual: args.len(),
            }
            .into());
        }

        let node = match self.kind {
            FunctionKind::NoParens => function(self.sql_name).style(ArgStyle::NoParens).build(),
            FunctionKind::Extract(part) => {
                let mut args = args;
                Node::Extract(ExtractNode {
                    part,
                    expr: Box::new(args.remove(0)),
                })
            }
            FunctionKind::Plain | FunctionKind::Locate => {
                // COUNT() counts rows
                let args = if self.aggregate && args.is_empty() {
                    vec![text("*")]
                } else {
                    args
                };
                function(self.sql_name)
                    .args(args)
                    .aggregate(self.aggregate)
                    .build()
            }
        };
        Ok(node)
    }
}

/// Get function mapping for a qualifier function name
pub fn get_function_mapping(name: &str) -> Option<FunctionMapping> {
    let fn_lower = name.to_lowercase();
    FUNCTION_MAPPINGS.get(fn_lower.as_str()).cloned()
}

/// Looks up `name` and builds its SQL node.
pub fn translate_function(name: &str, args: Vec<Node>) -> Result<Node, TranslationError> {
    let mapping = get_function_mapping(name).ok_or_else(|| UnsupportedConstructError::UnknownFunction {
        name: name.to_string(),
    })?;
    mapping.build(args)
}

fn plain(name: &'static str, sql_name: &'static str, min_args: usize, max_args: usize) -> FunctionMapping {
    FunctionMapping {
        name,
        sql_name,
        min_args,
        max_args,
        aggregate: false,
        kind: FunctionKind::Plain,
    }
}

fn aggregate(name: &'static str, sql_name: &'static str, min_args: usize) -> FunctionMapping {
    FunctionMapping {
        name,
        sql_name,
        min_args,
        max_args: 1,
        aggregate: true,
        kind: FunctionKind::Plain,
    }
}

fn no_parens(name: &'static str, sql_name: &'static str) -> FunctionMapping {
    FunctionMapping {
        name,
        sql_name,
        min_args: 0,
        max_args: 0,
        aggregate: false,
        kind: FunctionKind::NoParens,
    }
}

fn date_part(name: &'static str, part: DatePart) -> FunctionMapping {
    FunctionMapping {
        name,
        sql_name: "EXTRACT",
        min_args: 1,
        max_args: 1,
        aggregate: false,
        kind: FunctionKind::Extract(part),
    }
}

// Static function mapping table
lazy_static::lazy_static! {
    static ref FUNCTION_MAPPINGS: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        // ===== STRING FUNCTIONS =====
        m.insert("upper", plain("upper", "UPPER", 1, 1));
        m.insert("lower", plain("lower", "LOWER", 1, 1));
        m.insert("trim", plain("trim", "TRIM", 1, 1));
        m.insert("length", plain("length", "LENGTH", 1, 1));
        m.insert("substring", plain("substring", "SUBSTRING", 2, 3));
        m.insert("concat", plain("concat", "CONCAT", 1, usize::MAX));
        m.insert("locate", FunctionMapping {
            name: "locate",
            sql_name: "LOCATE",
            min_args: 2,
            max_args: 3,
            aggregate: false,
            kind: FunctionKind::Locate,
        });

        // ===== NUMERIC FUNCTIONS =====
        m.insert("abs", plain("abs", "ABS", 1, 1));
        m.insert("sqrt", plain("sqrt", "SQRT", 1, 1));
        m.insert("mod", plain("mod", "MOD", 2, 2));

        // ===== DATETIME FUNCTIONS =====
        m.insert("currentdate", no_parens("currentDate", "CURRENT_DATE"));
        m.insert("currenttime", no_parens("currentTime", "CURRENT_TIME"));
        m.insert("currenttimestamp", no_parens("currentTimestamp", "CURRENT_TIMESTAMP"));
        m.insert("now", no_parens("now", "CURRENT_TIMESTAMP"));

        m.insert("year", date_part("year", DatePart::Year));
        m.insert("month", date_part("month", DatePart::Month));
        m.insert("week", date_part("week", DatePart::Week));
        m.insert("dayofyear", date_part("dayOfYear", DatePart::DayOfYear));
        m.insert("dayofmonth", date_part("dayOfMonth", DatePart::DayOfMonth));
        m.insert("dayofweek", date_part("dayOfWeek", DatePart::DayOfWeek));
        m.insert("hour", date_part("hour", DatePart::Hour));
        m.insert("minute", date_part("minute", DatePart::Minute));
        m.insert("second", date_part("second", DatePart::Second));

        // ===== AGGREGATE FUNCTIONS =====
        m.insert("count", aggregate("count", "COUNT", 0));
        m.insert("sum", aggregate("sum", "SUM", 1));
        m.insert("avg", aggregate("avg", "AVG", 1));
        m.insert("min", aggregate("min", "MIN", 1));
        m.insert("max", aggregate("max", "MAX", 1));

        m
    };
}
