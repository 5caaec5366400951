//! Parser for the network DSL.

use std::collections::HashSet;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{Result, TransportError};
use crate::transport::{BcKind, RateMode, SolverKind};

/// Parser for network DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire network description.
    pub fn parse(&mut self) -> Result<NetworkAst> {
        let mut ast = NetworkAst::new();
        let mut pore_names = HashSet::new();

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            match self.current.kind {
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => self.parse_statement(&mut ast, &mut pore_names)?,
                _ => {
                    return Err(TransportError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(TransportError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(TransportError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    fn at_end_of_line(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn identifier(&mut self) -> Result<String> {
        Ok(self.expect(TokenKind::Identifier)?.text)
    }

    fn number(&mut self) -> Result<f64> {
        let tok = self.expect(TokenKind::Number)?;
        parse_value(&tok.text).ok_or_else(|| {
            TransportError::parse(tok.line, format!("invalid number: {}", tok.text))
        })
    }

    fn count(&mut self) -> Result<usize> {
        let tok = self.expect(TokenKind::Number)?;
        tok.text.parse::<usize>().map_err(|_| {
            TransportError::parse(
                tok.line,
                format!("expected a non-negative integer, got {}", tok.text),
            )
        })
    }

    fn point(&mut self) -> Result<[f64; 3]> {
        Ok([self.number()?, self.number()?, self.number()?])
    }

    fn pore_ref(&mut self) -> Result<PoreRef> {
        match self.current.kind {
            TokenKind::Identifier => Ok(PoreRef::Name(self.identifier()?)),
            TokenKind::Number => Ok(PoreRef::Index(self.count()?)),
            _ => Err(TransportError::parse(
                self.current.line,
                "expected a pore name, label or index",
            )),
        }
    }

    /// Trailing `key=value` options, keys lowercased.
    fn options(&mut self) -> Result<Vec<(String, f64)>> {
        let mut options = Vec::new();
        while !self.at_end_of_line() {
            let key = self.identifier()?.to_lowercase();
            self.expect(TokenKind::Equals)?;
            options.push((key, self.number()?));
        }
        Ok(options)
    }

    fn parse_statement(&mut self, ast: &mut NetworkAst, names: &mut HashSet<String>) -> Result<()> {
        let keyword = self.current.text.to_lowercase();
        let line = self.current.line;
        self.advance()?;

        match keyword.as_str() {
            "pore" => {
                if ast.lattice.is_some() {
                    return Err(TransportError::parse(
                        line,
                        "explicit pores cannot be mixed with a .cubic lattice",
                    ));
                }
                let name = self.identifier()?;
                if !names.insert(name.clone()) {
                    return Err(TransportError::DuplicatePore { name });
                }
                let coords = self.point()?;
                ast.pores.push(PoreDef { name, coords, line });
            }
            "throat" => {
                if ast.lattice.is_some() {
                    return Err(TransportError::parse(
                        line,
                        "explicit throats cannot be mixed with a .cubic lattice",
                    ));
                }
                let p1 = self.identifier()?;
                let p2 = self.identifier()?;
                let conductance = self.number()?;
                ast.throats.push(ThroatDef {
                    pores: [p1, p2],
                    conductance,
                    line,
                });
            }
            _ => {
                return Err(TransportError::parse(
                    line,
                    format!("unknown statement: {}", keyword),
                ));
            }
        }

        Ok(())
    }

    fn parse_directive(&mut self, ast: &mut NetworkAst) -> Result<()> {
        let directive = self.current.text.to_lowercase();
        let line = self.current.line;
        self.advance()?;

        match directive.as_str() {
            ".cubic" => {
                if ast.lattice.is_some() || !ast.pores.is_empty() || !ast.throats.is_empty() {
                    return Err(TransportError::parse(
                        line,
                        ".cubic must be the only network definition",
                    ));
                }
                let shape = [self.count()?, self.count()?, self.count()?];
                let spacing = self.number()?;
                let mut conductance = 1.0;
                for (key, value) in self.options()? {
                    match key.as_str() {
                        "g" | "conductance" => conductance = value,
                        _ => {
                            return Err(TransportError::parse(
                                line,
                                format!("unknown .cubic option: {}", key),
                            ))
                        }
                    }
                }
                ast.lattice = Some(LatticeDef {
                    shape,
                    spacing,
                    conductance,
                    line,
                });
            }
            ".spacing" => {
                ast.spacing = Some(self.point()?);
            }
            ".phase" => {
                ast.phase = Some(self.identifier()?);
            }
            ".quantity" => {
                ast.quantity = Some(self.identifier()?);
            }
            ".solver" => {
                let kind: SolverKind = self.identifier()?.parse()?;
                let mut solver = SolverDef {
                    kind,
                    tolerance: None,
                    max_iterations: None,
                    line,
                };
                for (key, value) in self.options()? {
                    match key.as_str() {
                        "tol" | "tolerance" => solver.tolerance = Some(value),
                        "maxiter" | "max_iterations" if value >= 1.0 && value.fract() == 0.0 => {
                            solver.max_iterations = Some(value as usize)
                        }
                        _ => {
                            return Err(TransportError::parse(
                                line,
                                format!("invalid .solver option: {}={}", key, value),
                            ))
                        }
                    }
                }
                ast.solver = Some(solver);
            }
            ".dirichlet" | ".neumann" => {
                let kind = if directive == ".dirichlet" {
                    BcKind::Dirichlet
                } else {
                    BcKind::Neumann
                };
                let target = self.pore_ref()?;
                let value = self.number()?;
                ast.conditions.push(ConditionDef {
                    kind,
                    target,
                    value,
                    line,
                });
            }
            ".rate" => {
                let target = self.pore_ref()?;
                let mode = if self.current.kind == TokenKind::Identifier {
                    self.identifier()?.parse::<RateMode>()?
                } else {
                    RateMode::Group
                };
                ast.rates.push(RateDef { target, mode, line });
            }
            ".effective" => {
                ast.effective = true;
            }
            _ => {
                return Err(TransportError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::super::parse;
    use super::*;

    #[test]
    fn test_parse_explicit_network() {
        let input = "\
# two pores and a throat
pore a 0 0 0
pore b 1m 0 0
throat a b 2.5
.dirichlet a 1
.neumann 1 -0.5
";
        let ast = parse(input).unwrap();
        assert_eq!(ast.pores.len(), 2);
        assert_relative_eq!(ast.pores[1].coords[0], 1e-3);
        assert_eq!(ast.throats[0].pores, ["a".to_string(), "b".to_string()]);
        assert_relative_eq!(ast.throats[0].conductance, 2.5);
        assert_eq!(ast.conditions[0].target, PoreRef::Name("a".to_string()));
        assert_eq!(ast.conditions[1].kind, BcKind::Neumann);
        assert_eq!(ast.conditions[1].target, PoreRef::Index(1));
        assert_eq!(ast.conditions[1].line, 6);
    }

    #[test]
    fn test_parse_cubic_with_options() {
        let input = ".cubic 4 3 2 100u g=2e-9\n\
                     .phase air\n\
                     .quantity pore.concentration\n\
                     .solver bicgstab tol=1e-8 maxiter=200\n\
                     .rate left single\n\
                     .effective";
        let ast = parse(input).unwrap();
        let lattice = ast.lattice.unwrap();
        assert_eq!(lattice.shape, [4, 3, 2]);
        assert_relative_eq!(lattice.spacing, 100e-6);
        assert_relative_eq!(lattice.conductance, 2e-9);
        assert_eq!(ast.phase.as_deref(), Some("air"));
        assert_eq!(ast.quantity.as_deref(), Some("pore.concentration"));

        let solver = ast.solver.unwrap();
        assert_eq!(solver.kind, SolverKind::BiCgStab);
        assert_eq!(solver.max_iterations, Some(200));
        assert_eq!(ast.rates[0].mode, RateMode::Single);
        assert!(ast.effective);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("pore a 0 0 0\npore a 1 0 0"),
            Err(TransportError::DuplicatePore { .. })
        ));
        assert!(matches!(
            parse(".cubic 2 2 2 1\npore a 0 0 0"),
            Err(TransportError::ParseError { line: 2, .. })
        ));
        assert!(matches!(
            parse(".solver gmres"),
            Err(TransportError::UnknownSolver { .. })
        ));
        assert!(matches!(
            parse(".cubic 2 2 1.5 1"),
            Err(TransportError::ParseError { line: 1, .. })
        ));
        assert!(matches!(
            parse(".effective now"),
            Err(TransportError::ParseError { .. })
        ));
        assert!(matches!(
            parse("valve a b 1"),
            Err(TransportError::ParseError { .. })
        ));
    }
}
