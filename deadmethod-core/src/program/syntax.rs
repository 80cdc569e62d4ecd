//! Syntax trees of a typed program and a visitor to walk them.
//!
//! The tree keeps only what the usage scan needs: call expressions,
//! selectors (which carry the id used to look up the selection index),
//! identifiers and literals. Every other construct is a `compound` node
//! holding its children, so nested calls stay reachable.

use serde::{Deserialize, Serialize};

/// Identifier of a selector expression, unique within its package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExprId(pub u32);

/// `fun(args...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallExpr {
    pub fun: Box<Node>,
    #[serde(default)]
    pub args: Vec<Node>,
}

/// `x.sel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorExpr {
    pub id: ExprId,
    pub x: Box<Node>,
    pub sel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Call(CallExpr),
    Selector(SelectorExpr),
    Ident {
        name: String,
    },
    Literal {
        #[serde(default)]
        value: String,
    },
    Compound {
        #[serde(default)]
        label: String,
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    pub fn call(fun: Node, args: Vec<Node>) -> Self {
        Self::Call(CallExpr {
            fun: Box::new(fun),
            args,
        })
    }

    pub fn selector(id: u32, x: Node, sel: impl Into<String>) -> Self {
        Self::Selector(SelectorExpr {
            id: ExprId(id),
            x: Box::new(x),
            sel: sel.into(),
        })
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into() }
    }

    pub fn compound(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Compound {
            label: label.into(),
            children,
        }
    }

    /// Shorthand for `x.sel()` with the given selector id.
    pub fn method_call(id: u32, receiver: &str, method: &str) -> Self {
        Self::call(Self::selector(id, Self::ident(receiver), method), Vec::new())
    }
}

/// Syntax tree traversal.
///
/// Override the hooks you care about and call the matching free function to
/// keep descending.
pub trait Visit<'ast> {
    fn visit_node(&mut self, node: &'ast Node) {
        visit_node(self, node);
    }

    fn visit_call(&mut self, call: &'ast CallExpr) {
        visit_call(self, call);
    }

    fn visit_selector(&mut self, selector: &'ast SelectorExpr) {
        visit_selector(self, selector);
    }
}

pub fn visit_node<'ast, V>(v: &mut V, node: &'ast Node)
where
    V: Visit<'ast> + ?Sized,
{
    match node {
        Node::Call(call) => v.visit_call(call),
        Node::Selector(selector) => v.visit_selector(selector),
        Node::Compound { children, .. } => {
            for child in children {
                v.visit_node(child);
            }
        }
        Node::Ident { .. } | Node::Literal { .. } => {}
    }
}

pub fn visit_call<'ast, V>(v: &mut V, call: &'ast CallExpr)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_node(&call.fun);
    for arg in &call.args {
        v.visit_node(arg);
    }
}

pub fn visit_selector<'ast, V>(v: &mut V, selector: &'ast SelectorExpr)
where
    V: Visit<'ast> + ?Sized,
{
    v.visit_node(&selector.x);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CallCounter {
        calls: usize,
        selectors: Vec<String>,
    }

    impl<'ast> Visit<'ast> for CallCounter {
        fn visit_call(&mut self, call: &'ast CallExpr) {
            self.calls += 1;
            visit_call(self, call);
        }

        fn visit_selector(&mut self, selector: &'ast SelectorExpr) {
            self.selectors.push(selector.sel.clone());
            visit_selector(self, selector);
        }
    }

    #[test]
    fn test_visits_nested_calls() {
        // q.Get(ctx, q.Key()).Scan()
        let inner = Node::method_call(2, "q", "Key");
        let get = Node::call(
            Node::selector(1, Node::ident("q"), "Get"),
            vec![Node::ident("ctx"), inner],
        );
        let scan = Node::call(Node::selector(3, get, "Scan"), Vec::new());
        let file = Node::compound("file", vec![Node::compound("func", vec![scan])]);

        let mut counter = CallCounter {
            calls: 0,
            selectors: Vec::new(),
        };
        counter.visit_node(&file);

        assert_eq!(counter.calls, 3);
        assert_eq!(counter.selectors, vec!["Scan", "Get", "Key"]);
    }

    #[test]
    fn test_node_json_shape() {
        let json = r#"{
            "kind": "call",
            "fun": {
                "kind": "selector",
                "id": 7,
                "x": { "kind": "ident", "name": "q" },
                "sel": "ListUsers"
            },
            "args": [{ "kind": "literal", "value": "10" }]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let Node::Call(call) = node else {
            panic!("expected a call node");
        };
        let Node::Selector(sel) = call.fun.as_ref() else {
            panic!("expected a selector callee");
        };
        assert_eq!(sel.id, ExprId(7));
        assert_eq!(sel.sel, "ListUsers");
        assert_eq!(call.args.len(), 1);
    }
}
