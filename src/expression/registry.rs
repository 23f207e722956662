//! Function lookup by name

use std::collections::HashMap;
use std::fmt;

use super::{datetime, ExprRef};
use crate::executor::{ExecutorError, ExecutorResult};

/// Builder for a function expression
#[derive(Clone, Copy)]
pub enum Function {
    /// Takes exactly one argument
    Unary(fn(ExprRef) -> ExprRef),
}

impl Function {
    pub fn arity(&self) -> usize {
        match self {
            Function::Unary(_) => 1,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Unary(_) => f.write_str("Function::Unary"),
        }
    }
}

/// Case-insensitive map of function names to builders
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        let mut registry = FunctionRegistry::empty();
        registry.register("year", Function::Unary(datetime::year));
        registry.register("month", Function::Unary(datetime::month));
        registry.register("day", Function::Unary(datetime::day));
        registry.register("hour", Function::Unary(datetime::hour));
        registry.register("minute", Function::Unary(datetime::minute));
        registry.register("second", Function::Unary(datetime::second));
        registry.register("dayofyear", Function::Unary(datetime::day_of_year));
        registry
    }
}

impl FunctionRegistry {
    /// Registry with the built-in date part functions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// Add or replace a function
    pub fn register(&mut self, name: &str, function: Function) {
        self.functions.insert(name.to_ascii_lowercase(), function);
    }

    pub fn function(&self, name: &str) -> Option<Function> {
        self.functions.get(&name.to_ascii_lowercase()).copied()
    }

    /// Build a call to `name` over `args`
    pub fn build(&self, name: &str, mut args: Vec<ExprRef>) -> ExecutorResult<ExprRef> {
        let function = self
            .function(name)
            .ok_or_else(|| ExecutorError::UnknownFunction(name.to_string()))?;

        if args.len() != function.arity() {
            return Err(ExecutorError::InvalidArgumentNumber {
                function: name.to_string(),
                got: args.len(),
                expected: function.arity(),
            });
        }

        match function {
            Function::Unary(build) => match args.pop() {
                Some(arg) => Ok(build(arg)),
                None => Err(ExecutorError::InvalidArgumentNumber {
                    function: name.to_string(),
                    got: 0,
                    expected: 1,
                }),
            },
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}
