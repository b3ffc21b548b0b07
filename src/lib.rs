pub mod ast;
pub mod cli;
pub mod convert;
pub mod datum;
pub mod evaluator;
pub mod lexer;
pub mod methods;
pub mod output;
pub mod parser;
pub mod transform;
pub mod value;

pub use ast::{Path, Token};
pub use datum::Datum;
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer, Position, Profile};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser, compile, compile_core, compile_with};
pub use value::Value;
