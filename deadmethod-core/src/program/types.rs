//! Type-level view of a typed program: identities, type references,
//! declarations and resolved selections.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::syntax::ExprId;

/// Identifies a declared type across the whole program.
///
/// Equality is on both fields; two types with the same name in different
/// packages are different types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Canonical import path of the declaring package
    pub package: String,
    /// Type name as declared in the package scope
    pub name: String,
}

impl TypeIdentity {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// A type expression as reported by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A declared (defined) type
    Named(TypeIdentity),
    /// `*T`
    Pointer { elem: Box<TypeRef> },
    /// An unnamed interface type
    Interface,
    /// Anything else: basic types, slices, maps, funcs, type parameters...
    Other {
        #[serde(default)]
        repr: String,
    },
}

impl TypeRef {
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named(TypeIdentity::new(package, name))
    }

    /// Wrap this type in one level of pointer indirection.
    pub fn pointer(self) -> Self {
        Self::Pointer {
            elem: Box::new(self),
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer { .. })
    }

    /// Strip one level of pointer indirection, if present.
    ///
    /// `*T` and `T` canonicalize to `T`; `**T` only loses one star.
    pub fn deref(&self) -> &TypeRef {
        match self {
            Self::Pointer { elem } => elem,
            other => other,
        }
    }

    /// The named type behind at most one pointer, if any.
    pub fn owner(&self) -> Option<&TypeIdentity> {
        match self.deref() {
            Self::Named(id) => Some(id),
            _ => None,
        }
    }
}

/// How a method receives its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiverKind {
    Value,
    Pointer,
}

impl fmt::Display for ReceiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Pointer => write!(f, "pointer"),
        }
    }
}

/// A method declared directly on a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub receiver: ReceiverKind,
}

/// A struct field. Embedded fields carry the embedded type in `ty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }

    /// An embedded field; its name is the embedded type's name.
    pub fn embedded(ty: TypeRef) -> Self {
        let name = ty
            .owner()
            .map(|id| id.name.clone())
            .unwrap_or_default();
        Self {
            name,
            ty,
            embedded: true,
        }
    }
}

/// Underlying structure of a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Underlying {
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
    Interface {
        /// Methods spelled out in the interface body
        #[serde(default)]
        methods: Vec<String>,
        /// Embedded interfaces
        #[serde(default)]
        embedded: Vec<TypeRef>,
    },
    Other {
        #[serde(default)]
        repr: String,
    },
}

/// A top-level type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    /// `type A = B`
    #[serde(default)]
    pub alias: bool,
    pub underlying: Underlying,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn structure(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            alias: false,
            underlying: Underlying::Struct { fields },
            methods: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>, methods: &[&str], embedded: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            alias: false,
            underlying: Underlying::Interface {
                methods: methods.iter().map(|m| m.to_string()).collect(),
                embedded,
            },
            methods: Vec::new(),
        }
    }

    pub fn other(name: impl Into<String>, repr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: false,
            underlying: Underlying::Other { repr: repr.into() },
            methods: Vec::new(),
        }
    }

    pub fn alias_of(mut self) -> Self {
        self.alias = true;
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, receiver: ReceiverKind) -> Self {
        self.methods.push(MethodDecl {
            name: name.into(),
            receiver,
        });
        self
    }
}

/// An entry of a package's top-level scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Object {
    Type(TypeDecl),
    Func,
    Const,
    Var,
}

impl Object {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Type(decl) if decl.alias => "type alias",
            Self::Type(_) => "type",
            Self::Func => "func",
            Self::Const => "const",
            Self::Var => "var",
        }
    }
}

/// The method a selector statically resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    /// Receiver type as declared on the method (`T` or `*T`)
    pub recv: TypeRef,
}

impl MethodSymbol {
    pub fn new(name: impl Into<String>, recv: TypeRef) -> Self {
        Self {
            name: name.into(),
            recv,
        }
    }

    /// The type that declares this method, pointer stripped.
    pub fn owner(&self) -> Option<&TypeIdentity> {
        self.recv.owner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// `x.M` where `x` is a value
    MethodVal,
    /// `T.M` or `(*T).M`
    MethodExpr,
    /// `x.f` struct field
    FieldVal,
}

/// One entry of the selection index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selector node this entry describes
    pub expr: ExprId,
    pub kind: SelectionKind,
    /// Static type of the selector's operand
    pub recv: TypeRef,
    /// Resolved method; absent for fields and unresolved selections
    #[serde(default)]
    pub method: Option<MethodSymbol>,
}

impl Selection {
    pub fn method_val(expr: ExprId, recv: TypeRef, method: MethodSymbol) -> Self {
        Self {
            expr,
            kind: SelectionKind::MethodVal,
            recv,
            method: Some(method),
        }
    }

    pub fn method_expr(expr: ExprId, recv: TypeRef, method: MethodSymbol) -> Self {
        Self {
            expr,
            kind: SelectionKind::MethodExpr,
            recv,
            method: Some(method),
        }
    }

    pub fn field_val(expr: ExprId, recv: TypeRef) -> Self {
        Self {
            expr,
            kind: SelectionKind::FieldVal,
            recv,
            method: None,
        }
    }

    /// The resolved method, for method selections only.
    pub fn resolved_method(&self) -> Option<&MethodSymbol> {
        match self.kind {
            SelectionKind::MethodVal | SelectionKind::MethodExpr => self.method.as_ref(),
            SelectionKind::FieldVal => None,
        }
    }
}
