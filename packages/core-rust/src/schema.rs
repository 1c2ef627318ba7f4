//! Statically declared operation surfaces.
//!
//! A [`TypeDecl`] lists the methods a type exposes together with the
//! metadata the scanner needs: verb, disabled marker, parameters and the
//! return shape. Declarations are built once at startup by
//! [`Capability::declaration`](crate::traits::Capability::declaration).

use crate::types::{ParamType, ReturnShape, Verb};

/// Whether a declared type is an operation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Carries the capability marker; eligible for scanning.
    Capability,
    /// Any other declared type.
    Plain,
}

/// Declaration of one type and its methods, in declaration order.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: &'static str,
    pub kind: TypeKind,
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    /// Starts a declaration for a capability type.
    #[must_use]
    pub fn capability(name: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Capability,
            methods: Vec::new(),
        }
    }

    /// Starts a declaration for a type without the capability marker.
    #[must_use]
    pub fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: TypeKind::Plain,
            methods: Vec::new(),
        }
    }

    /// Appends a method.
    #[must_use]
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn is_capability(&self) -> bool {
        self.kind == TypeKind::Capability
    }
}

/// Declaration of one method.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: &'static str,
    /// `None` for methods without a verb marker; those are never routed.
    pub verb: Option<Verb>,
    pub disabled: bool,
    pub params: Vec<ParamDecl>,
    pub returns: ReturnShape,
}

impl MethodDecl {
    /// A method exposed under `GET`.
    #[must_use]
    pub fn get(name: &'static str) -> Self {
        Self::with_verb(name, Some(Verb::Get))
    }

    /// A method exposed under `POST`.
    #[must_use]
    pub fn post(name: &'static str) -> Self {
        Self::with_verb(name, Some(Verb::Post))
    }

    /// A method without a verb marker.
    #[must_use]
    pub fn unrouted(name: &'static str) -> Self {
        Self::with_verb(name, None)
    }

    fn with_verb(name: &'static str, verb: Option<Verb>) -> Self {
        Self {
            name,
            verb,
            disabled: false,
            params: Vec::new(),
            returns: ReturnShape::Unit,
        }
    }

    /// Marks the method disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: &'static str, ty: ParamType) -> Self {
        self.params.push(ParamDecl {
            name,
            ty,
            body_marker: false,
        });
        self
    }

    /// Appends a parameter carrying the body marker.
    #[must_use]
    pub fn body(mut self, name: &'static str, ty: ParamType) -> Self {
        self.params.push(ParamDecl {
            name,
            ty,
            body_marker: true,
        });
        self
    }

    /// Sets the return shape.
    #[must_use]
    pub fn returns(mut self, shape: ReturnShape) -> Self {
        self.returns = shape;
        self
    }
}

/// Declaration of one method parameter.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: &'static str,
    pub ty: ParamType,
    pub body_marker: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_declaration_order() {
        let decl = TypeDecl::capability("IKulupClient")
            .method(MethodDecl::get("GetAll"))
            .method(MethodDecl::unrouted("Helper"))
            .method(
                MethodDecl::post("Create")
                    .param("id", ParamType::Int32)
                    .body("payload", ParamType::array(ParamType::Text))
                    .returns(ReturnShape::DeferredValue),
            );

        let names: Vec<_> = decl.methods.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["GetAll", "Helper", "Create"]);
        assert!(decl.is_capability());

        let create = &decl.methods[2];
        assert_eq!(create.verb, Some(Verb::Post));
        assert_eq!(create.returns, ReturnShape::DeferredValue);
        assert!(!create.params[0].body_marker);
        assert!(create.params[1].body_marker);
        assert!(decl.methods[1].verb.is_none());
    }

    #[test]
    fn disabled_flag_and_plain_kind() {
        let decl = TypeDecl::plain("Clock").method(MethodDecl::get("Now").disabled());
        assert!(!decl.is_capability());
        assert!(decl.methods[0].disabled);
    }
}
