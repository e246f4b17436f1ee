//! Violation model and the two-phase configuration tree validator.
//!
//! Validation never fails fast: a run walks the whole configuration tree and
//! returns every problem it finds. Pass one evaluates the per-field
//! constraints of every node depth-first; pass two evaluates the named
//! cross-field rules of every node, in declaration order, even on nodes
//! whose field constraints already failed. The walk is read-only.

pub mod constraints;

use std::fmt;

use serde::Serialize;

/// Where in the pipeline a violation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Produced while decoding the source (syntax error, unknown field,
    /// type mismatch, malformed unit literal).
    Decode,
    /// A per-field constraint failed.
    Constraint,
    /// A named cross-field rule failed.
    CrossField,
}

/// One problem found in a configuration, addressed by its dotted path
/// within the tree (e.g. `server.port`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending field or rule.
    pub path: String,
    /// Human-readable failure message.
    pub message: String,
    /// Pipeline stage that produced the violation.
    pub kind: ViolationKind,
}

/// An ordered collection of [`Violation`]s. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationSet(pub Vec<Violation>);

impl ViolationSet {
    /// True when no violations were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of violations recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the violations in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }
}

impl fmt::Display for ViolationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.0 {
            writeln!(f, "  * {}: {}", violation.path, violation.message)?;
        }
        Ok(())
    }
}

impl IntoIterator for ViolationSet {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Recording context handed to [`Validate`] implementations.
pub struct Context<'a> {
    path: String,
    kind: ViolationKind,
    out: &'a mut Vec<Violation>,
}

impl Context<'_> {
    fn qualified(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    /// Record a per-field constraint check. A violation is recorded at
    /// `<node>.<field>` when `ok` is false.
    pub fn require(&mut self, field: &str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.out.push(Violation {
                path: self.qualified(field),
                message: message.into(),
                kind: self.kind,
            });
        }
    }

    /// Record a named cross-field rule check. The rule name becomes the
    /// final path segment, mirroring how per-field violations are addressed.
    pub fn rule(&mut self, name: &str, ok: bool, message: impl Into<String>) {
        if !ok {
            self.out.push(Violation {
                path: self.qualified(name),
                message: message.into(),
                kind: ViolationKind::CrossField,
            });
        }
    }
}

/// A configuration node that can be validated.
///
/// Implementations declare their per-field constraints and cross-field rules
/// explicitly; the generic walker in [`validate`] takes care of recursion
/// and path bookkeeping.
pub trait Validate {
    /// Evaluate every per-field constraint on this node.
    fn constraints(&self, ctx: &mut Context<'_>);

    /// Evaluate every named cross-field rule on this node. Rules run after
    /// all field constraints across the whole tree, regardless of whether
    /// those constraints passed.
    fn rules(&self, _ctx: &mut Context<'_>) {}

    /// Nested sub-configurations, as `(field name, node)` pairs in
    /// declaration order.
    fn children(&self) -> Vec<(&'static str, &dyn Validate)> {
        Vec::new()
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Constraints,
    Rules,
}

fn walk(node: &dyn Validate, path: &str, phase: Phase, out: &mut Vec<Violation>) {
    {
        let kind = match phase {
            Phase::Constraints => ViolationKind::Constraint,
            Phase::Rules => ViolationKind::CrossField,
        };
        let mut ctx = Context {
            path: path.to_string(),
            kind,
            out,
        };
        match phase {
            Phase::Constraints => node.constraints(&mut ctx),
            Phase::Rules => node.rules(&mut ctx),
        }
    }

    for (name, child) in node.children() {
        let child_path = if path.is_empty() {
            name.to_string()
        } else {
            format!("{path}.{name}")
        };
        walk(child, &child_path, phase, out);
    }
}

/// Validate a configuration tree, returning every violation found.
///
/// Runs two depth-first passes over the tree: field constraints first, then
/// cross-field rules. Ordering within the result follows declaration order.
pub fn validate(root: &dyn Validate) -> ViolationSet {
    let mut out = Vec::new();
    walk(root, "", Phase::Constraints, &mut out);
    walk(root, "", Phase::Rules, &mut out);
    ViolationSet(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        value: u32,
        floor: u32,
        ceiling: u32,
    }

    impl Validate for Leaf {
        fn constraints(&self, ctx: &mut Context<'_>) {
            ctx.require(
                "value",
                self.value >= self.floor,
                format!("must be at least {}", self.floor),
            );
        }

        fn rules(&self, ctx: &mut Context<'_>) {
            ctx.rule(
                "within_ceiling",
                self.value <= self.ceiling,
                format!("must not exceed {}", self.ceiling),
            );
        }
    }

    struct Root {
        first: Leaf,
        second: Leaf,
    }

    impl Validate for Root {
        fn constraints(&self, _ctx: &mut Context<'_>) {}

        fn children(&self) -> Vec<(&'static str, &dyn Validate)> {
            vec![("first", &self.first), ("second", &self.second)]
        }
    }

    fn leaf(value: u32) -> Leaf {
        Leaf {
            value,
            floor: 10,
            ceiling: 100,
        }
    }

    #[test]
    fn test_valid_tree_yields_no_violations() {
        let root = Root {
            first: leaf(50),
            second: leaf(50),
        };
        assert!(validate(&root).is_empty());
    }

    #[test]
    fn test_paths_are_dotted() {
        let root = Root {
            first: leaf(50),
            second: leaf(5),
        };
        let violations = validate(&root);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.0[0].path, "second.value");
        assert_eq!(violations.0[0].kind, ViolationKind::Constraint);
    }

    #[test]
    fn test_all_constraints_before_any_rule() {
        // Both leaves fail their constraint and their rule; all constraint
        // violations must precede all cross-field violations.
        let failing = Root {
            first: Leaf {
                value: 5,
                floor: 10,
                ceiling: 1,
            },
            second: Leaf {
                value: 5,
                floor: 10,
                ceiling: 1,
            },
        };
        let violations = validate(&failing);
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::Constraint,
                ViolationKind::Constraint,
                ViolationKind::CrossField,
                ViolationKind::CrossField,
            ]
        );
        assert_eq!(violations.0[2].path, "first.within_ceiling");
        assert_eq!(violations.0[3].path, "second.within_ceiling");
    }

    #[test]
    fn test_rules_run_even_when_constraints_fail() {
        let root = Root {
            first: Leaf {
                value: 5,
                floor: 10,
                ceiling: 1,
            },
            second: leaf(50),
        };
        let violations = validate(&root);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.kind == ViolationKind::CrossField));
    }

    #[test]
    fn test_display_lists_one_line_per_violation() {
        let root = Root {
            first: leaf(1),
            second: leaf(2),
        };
        let rendered = validate(&root).to_string();
        assert!(rendered.contains("  * first.value: must be at least 10"));
        assert!(rendered.contains("  * second.value: must be at least 10"));
    }
}
