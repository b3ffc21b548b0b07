//! # Path Expression Language - Abstract Syntax Tree
//!
//! This module defines the tree that path expressions compile to. A path
//! expression locates values inside a JSON-like document the way XPath
//! locates nodes in XML.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[path]** - Path nodes, the compiled form of an expression
//! - **[operators]** - Comparison, arithmetic, and sort-direction operators
//! - **[expressions]** - Filter conditions and their literals
//! - **[named]** - Backtick-quoted extension operators
//! - **[display]** - Rendering nodes back into expression text
//!
//! ## Quick Start
//!
//! ```text
//! $.store.book[?price < 10].title
//! ```
//!
//! Titles of every book cheaper than 10.
//!
//! ## Core Grammar
//!
//! | Form | Meaning |
//! |------|---------|
//! | `$` | the document root |
//! | `foo`, `'a.b'`, `foo,bar` | mapping members |
//! | `*` | every mapping member |
//! | `[2]`, `[-1]` | sequence element |
//! | `[1:3]`, `[::-1]`, `[*]` | sequence slice |
//! | `a.b` | `b` applied to every match of `a` |
//! | `a..b` | `b` applied to `a`'s matches and everything below them |
//! | `a where b` | matches of `a` that contain a match of `b` |
//! | `` `this` ``, `` `parent` `` | current value, value one level up |
//!
//! Scalars and mappings act as one-element sequences for `[0]` and slices,
//! so `[*]` is safe to apply to anything.
//!
//! ## Extended Grammar
//!
//! A strict superset of the core grammar adding:
//!
//! - **Filters** `[?cow > 5 & cat = 2]`, `[?@ =~ "a.+"]`, `[?flag = true]`
//! - **Alternation** `id|(resource.id)`
//! - **Sorting** `[/cow,\cat]`, `[/cat.(cow,bow)]`
//! - **Arithmetic** `$.price * 100`, `first + " " + last`
//! - **Named operators** `` `len` ``, `` `keys` ``, `` `sorted` ``,
//!   `` `str()` ``, `` `sub(/regex/, repl)` ``, `` `split(-, 0, -1)` ``
//!
//! ## Operator Binding
//!
//! From loosest to tightest: arithmetic (right-associative), trailing
//! brackets, `..`, `.`, `|`, `where`/`wherenot`. Trailing brackets apply to
//! everything on their left, so `$..book[2]` is the third match of `$..book`.

pub mod display;
pub mod expressions;
pub mod named;
pub mod operators;
pub mod path;
pub mod tokens;

pub use expressions::{Comparison, Expression, Literal, Pattern};
pub use named::{NamedOperator, SplitIndex};
pub use operators::{ArithOp, CompareOp, SortDirection};
pub use path::{Operand, Path, SortKey};
pub use tokens::Token;
