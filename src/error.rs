use std::fmt;
use smol_str::SmolStr;
use crate::infer::ty::Ty;
use crate::source::Location;
use crate::util::pluralize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Violation<'a> {
    UnresolvedVariable { name: SmolStr, loc: Location<'a> },
    UnresolvedModule { name: SmolStr, loc: Location<'a> },
    UnresolvedType { name: SmolStr, loc: Location<'a> },
    UnresolvedProperty { property: SmolStr, owner: SmolStr, loc: Location<'a> },
    UnresolvedVariant { name: SmolStr, enum_name: SmolStr, loc: Location<'a> },
    TypeMismatch { expected: Ty, found: Ty, loc: Location<'a> },
    ArityMismatch { expected: usize, found: usize, loc: Location<'a> },
    ImmutableAssign { name: SmolStr, loc: Location<'a> },
    ImmutableProperty { property: SmolStr, struct_name: SmolStr, loc: Location<'a> },
    NotCallable { found: Ty, loc: Location<'a> },
    NotAStruct { found: Ty, loc: Location<'a> },
    NotAnEnum { found: Ty, loc: Location<'a> },
    NotAPointer { found: Ty, loc: Location<'a> },
    ReturnOutsideFunction { loc: Location<'a> },
    CyclicImport { cycle: Vec<SmolStr>, loc: Location<'a> },
    // carried over from the parser
    Syntax { message: SmolStr, loc: Location<'a> },
}

impl<'a> Violation<'a> {
    pub fn loc(&self) -> Location<'a> {
        match self {
            Violation::UnresolvedVariable { loc, .. } => *loc,
            Violation::UnresolvedModule { loc, .. } => *loc,
            Violation::UnresolvedType { loc, .. } => *loc,
            Violation::UnresolvedProperty { loc, .. } => *loc,
            Violation::UnresolvedVariant { loc, .. } => *loc,
            Violation::TypeMismatch { loc, .. } => *loc,
            Violation::ArityMismatch { loc, .. } => *loc,
            Violation::ImmutableAssign { loc, .. } => *loc,
            Violation::ImmutableProperty { loc, .. } => *loc,
            Violation::NotCallable { loc, .. } => *loc,
            Violation::NotAStruct { loc, .. } => *loc,
            Violation::NotAnEnum { loc, .. } => *loc,
            Violation::NotAPointer { loc, .. } => *loc,
            Violation::ReturnOutsideFunction { loc } => *loc,
            Violation::CyclicImport { loc, .. } => *loc,
            Violation::Syntax { loc, .. } => *loc,
        }
    }
}

pub trait Report {
    fn write_into<W: fmt::Write>(&self, to: &mut W) -> fmt::Result;

    fn show_location<W: fmt::Write>(loc: &Location, to: &mut W) -> fmt::Result {
        if let Some(rendered) = loc.render() {
            writeln!(to, "  --> {}", rendered.source_name)?;
            writeln!(to, "{: >4} | {}", rendered.line_no, rendered.line)?;
            writeln!(to, "       {}{}", " ".repeat(rendered.range.start), "^".repeat(rendered.range.len()))?;
        }
        Ok(())
    }

    fn render_to_string(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out).unwrap();
        out
    }
}

impl Report for Violation<'_> {
    fn write_into<W: fmt::Write>(&self, to: &mut W) -> fmt::Result {
        match self {
            Violation::UnresolvedVariable { name, loc } => {
                writeln!(to, "Error: Could not resolve the variable '{name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::UnresolvedModule { name, loc } => {
                writeln!(to, "Error: Could not resolve the module '{name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::UnresolvedType { name, loc } => {
                writeln!(to, "Error: Could not resolve the type '{name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::UnresolvedProperty { property, owner, loc } => {
                writeln!(to, "Error: '{owner}' does not contain a property named '{property}'.")?;
                Self::show_location(loc, to)
            }
            Violation::UnresolvedVariant { name, enum_name, loc } => {
                writeln!(to, "Error: '{enum_name}' does not have a variant named '{name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::TypeMismatch { expected, found, loc } => {
                writeln!(to, "Error: Mismatched types. Expected '{expected}' but got '{found}'.")?;
                Self::show_location(loc, to)
            }
            Violation::ArityMismatch { expected, found, loc } => {
                writeln!(to, "Error: Expected {}, got {found}.", pluralize("argument", *expected as u64))?;
                Self::show_location(loc, to)
            }
            Violation::ImmutableAssign { name, loc } => {
                writeln!(to, "Error: Cannot reassign the immutable variable '{name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::ImmutableProperty { property, struct_name, loc } => {
                writeln!(to, "Error: Cannot reassign the immutable property '{property}' of '{struct_name}'.")?;
                Self::show_location(loc, to)
            }
            Violation::NotCallable { found, loc } => {
                writeln!(to, "Error: A value of type '{found}' is not callable.")?;
                Self::show_location(loc, to)
            }
            Violation::NotAStruct { found, loc } => {
                writeln!(to, "Error: Expected a struct, but got '{found}'.")?;
                Self::show_location(loc, to)
            }
            Violation::NotAnEnum { found, loc } => {
                writeln!(to, "Error: Expected an enum, but got '{found}'.")?;
                Self::show_location(loc, to)
            }
            Violation::NotAPointer { found, loc } => {
                writeln!(to, "Error: A value of type '{found}' is not a pointer and cannot be dereferenced.")?;
                Self::show_location(loc, to)
            }
            Violation::ReturnOutsideFunction { loc } => {
                writeln!(to, "Error: Cannot return outside of a function.")?;
                Self::show_location(loc, to)
            }
            Violation::CyclicImport { cycle, loc } => {
                let path: Vec<&str> = cycle.iter().map(|m| m.as_str()).collect();
                writeln!(to, "Error: Import cycle detected: {}.", path.join(" -> "))?;
                Self::show_location(loc, to)
            }
            Violation::Syntax { message, loc } => {
                writeln!(to, "Error: {message}")?;
                Self::show_location(loc, to)
            }
        }
    }
}

impl Report for [Violation<'_>] {
    fn write_into<W: fmt::Write>(&self, to: &mut W) -> fmt::Result {
        for violation in self {
            violation.write_into(to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infer::ty::Ty;
    use crate::source::Source;

    #[test]
    fn test_render_mismatch_with_excerpt() {
        let s = Source::from_text("<test>", "let p = true;");
        let violation = Violation::TypeMismatch {
            expected: Ty::int32(),
            found: Ty::bool(),
            loc: Location::new(&s, 8, 4)
        };
        let rendered = violation.render_to_string();
        assert!(rendered.contains("Error: Mismatched types. Expected 'Int32' but got 'Bool'."));
        assert!(rendered.contains("   1 | let p = true;"));
        assert!(rendered.contains("^^^^"));
    }

    #[test]
    fn test_render_generated_location_is_message_only() {
        let violation = Violation::ReturnOutsideFunction { loc: Location::Generated };
        assert_eq!(violation.render_to_string(), "Error: Cannot return outside of a function.\n");
    }

    #[test]
    fn test_render_cycle() {
        let violation = Violation::CyclicImport {
            cycle: vec!["a".into(), "b".into(), "a".into()],
            loc: Location::Generated
        };
        assert!(violation.render_to_string().contains("a -> b -> a"));
    }
}
