//! DSL (Domain Specific Language) parser for pore network descriptions.
//!
//! This module provides a line-oriented, human-editable language for
//! describing a network, its boundary conditions and the quantities to
//! report after solving.
//!
//! # Grammar Overview
//!
//! ```text
//! network     = { line }
//! line        = comment | directive | statement | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument } { option }
//! statement   = "pore" name number number number
//!             | "throat" name name number
//! option      = identifier '=' number
//!
//! target      = identifier | integer
//! number      = ['-'|'+'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+] [unit_suffix]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' | '.' }
//! ```
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .cubic | Generate a cubic lattice | `.cubic <nx> <ny> <nz> <spacing> [g=<conductance>]` |
//! | .spacing | Lattice spacing of an explicit network | `.spacing <sx> <sy> <sz>` |
//! | .phase | Phase name | `.phase <name>` |
//! | .quantity | Name of the solved field | `.quantity <name>` |
//! | .solver | Sparse solver | `.solver <lu\|bicgstab\|cg> [tol=<v>] [maxiter=<n>]` |
//! | .dirichlet | Fix the quantity | `.dirichlet <target> <value>` |
//! | .neumann | Fix the net rate | `.neumann <target> <value>` |
//! | .rate | Report a rate | `.rate <target> [group\|single]` |
//! | .effective | Report the effective property | `.effective` |
//!
//! A target is a face label of a cubic lattice (`left`, `right`, `front`,
//! `back`, `bottom`, `top`), a declared pore name, or a pore index.
//!
//! # Example
//!
//! ```text
//! # Diffusion through a 10x10x10 lattice
//! .cubic 10 10 10 100u g=1n
//! .quantity pore.concentration
//! .dirichlet left 1
//! .dirichlet right 0
//! .rate left
//! .effective
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a network DSL string into an AST.
pub fn parse(input: &str) -> Result<NetworkAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a network DSL file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetworkAst> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::TransportError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
