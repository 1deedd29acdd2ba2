//! Subtyping rules
//!
//! Implements the subtyping relation T <: U (T is a subtype of U).
//! Equality is checked first; after that the rules are keyed on the
//! supertype, in order, and the first applicable rule decides.

use crate::context::TypeContext;
use crate::kind::CompositeKind;
use crate::ty::{FunctionPurity, FunctionType, SimpleType, Type, TypeId};

/// Context for checking subtyping relationships
#[derive(Debug, Clone, Copy)]
pub struct SubtypingContext<'a> {
    /// Type context for resolving types
    type_ctx: &'a TypeContext,
}

impl<'a> SubtypingContext<'a> {
    /// Create a new subtyping context
    pub fn new(type_ctx: &'a TypeContext) -> Self {
        SubtypingContext { type_ctx }
    }

    /// Check if `sub` is a subtype of `sup` (sub <: sup)
    ///
    /// Returns true if a value of type `sub` can be used where `sup` is expected.
    /// An unknown `sub` is never a subtype.
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if self.type_ctx.get(sub).is_none() {
            return false;
        }
        let result = self.type_ctx.equal(sub, sup) || self.check_without_equality(sub, sup);
        tracing::trace!(
            sub = %self.type_ctx.type_string(sub),
            sup = %self.type_ctx.type_string(sup),
            result,
            "subtype check"
        );
        result
    }

    /// Check if `sub` is a subtype of `sup` and not equal to it
    pub fn is_proper_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if self.type_ctx.get(sub).is_none() || self.type_ctx.equal(sub, sup) {
            return false;
        }
        self.check_without_equality(sub, sup)
    }

    /// Like [`is_subtype`](Self::is_subtype), but `Never` is not of any kind
    ///
    /// Used to ask whether an expression's type is really, say, an integer type.
    pub fn is_same_type_kind(&self, sub: TypeId, sup: TypeId) -> bool {
        sub != self.type_ctx.never_type() && self.is_subtype(sub, sup)
    }

    /// Smallest type both `a` and `b` are subtypes of, if there is one
    ///
    /// Unrelated types meet at `AnyStruct` or `AnyResource` when they agree
    /// on resource-ness. The invalid type absorbs everything.
    pub fn least_common_supertype(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let ctx = self.type_ctx;
        if ctx.is_invalid_type(a) || ctx.is_invalid_type(b) {
            return Some(ctx.invalid_type());
        }
        if self.is_subtype(a, b) {
            return Some(b);
        }
        if self.is_subtype(b, a) {
            return Some(a);
        }
        match (ctx.is_resource_type(a), ctx.is_resource_type(b)) {
            (true, true) => Some(ctx.any_resource_type()),
            (false, false) => Some(ctx.any_struct_type()),
            _ => None,
        }
    }

    fn simple(&self, id: TypeId) -> Option<SimpleType> {
        self.type_ctx.get(id).and_then(Type::as_simple)
    }

    fn is_top_type(&self, id: Option<TypeId>) -> bool {
        match id {
            None => true,
            Some(id) => matches!(
                self.simple(id),
                Some(SimpleType::Any | SimpleType::AnyStruct | SimpleType::AnyResource)
            ),
        }
    }

    fn is_composite(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| self.type_ctx.as_composite(id).is_some())
    }

    fn restricted_parts(&self, id: TypeId) -> Option<(Option<TypeId>, &'a [TypeId])> {
        match self.type_ctx.get(id)? {
            Type::Restricted { ty, restrictions } => Some((*ty, restrictions.as_slice())),
            _ => None,
        }
    }

    fn contains_all(&self, set: &[TypeId], required: &[TypeId]) -> bool {
        required
            .iter()
            .all(|r| set.iter().any(|s| self.type_ctx.equal(*s, *r)))
    }

    fn conformances_contain(&self, id: TypeId, interface: TypeId) -> bool {
        self.type_ctx
            .effective_conformances(id)
            .iter()
            .any(|c| self.type_ctx.equal(*c, interface))
    }

    fn check_without_equality(&self, sub: TypeId, sup: TypeId) -> bool {
        let ctx = self.type_ctx;
        let (Some(sub_ty), Some(sup_ty)) = (ctx.get(sub), ctx.get(sup)) else {
            return false;
        };

        if matches!(sub_ty, Type::Simple(SimpleType::Never)) {
            return true;
        }

        let decided = match sup_ty {
            Type::Simple(SimpleType::Any) => Some(true),
            Type::Simple(SimpleType::AnyStruct) => Some(
                !ctx.is_resource_type(sub) && !matches!(sub_ty, Type::Simple(SimpleType::Any)),
            ),
            Type::Simple(SimpleType::AnyResource) => Some(ctx.is_resource_type(sub)),
            Type::Simple(SimpleType::AnyResourceAttachment) => {
                Some(ctx.is_resource_type(sub) && ctx.is_attachment_type(sub))
            }
            Type::Simple(SimpleType::AnyStructAttachment) => {
                Some(!ctx.is_resource_type(sub) && ctx.is_attachment_type(sub))
            }
            Type::Numeric(numeric) => Some(ctx.tag(sub).belongs_to(numeric.tag())),

            Type::Optional(sup_inner) => Some(match sub_ty {
                Type::Optional(sub_inner) => self.is_subtype(*sub_inner, *sup_inner),
                _ => self.is_subtype(sub, *sup_inner),
            }),

            Type::Dictionary {
                key: sup_key,
                value: sup_value,
            } => Some(match sub_ty {
                Type::Dictionary { key, value } => {
                    self.is_subtype(*key, *sup_key) && self.is_subtype(*value, *sup_value)
                }
                _ => false,
            }),

            Type::VariableSized(sup_element) => Some(match sub_ty {
                Type::VariableSized(element) => self.is_subtype(*element, *sup_element),
                _ => false,
            }),

            Type::ConstantSized {
                ty: sup_element,
                size: sup_size,
            } => Some(match sub_ty {
                Type::ConstantSized { ty, size } => {
                    size == sup_size && self.is_subtype(*ty, *sup_element)
                }
                _ => false,
            }),

            Type::Reference {
                ty: sup_referenced,
                authorization: sup_authorization,
            } => Some(match sub_ty {
                Type::Reference { ty, authorization } => {
                    sup_authorization.permits_access(authorization)
                        && self.is_subtype(*ty, *sup_referenced)
                }
                _ => false,
            }),

            Type::Function(sup_function) => Some(match sub_ty {
                Type::Function(sub_function) => self.function_subtype(sub_function, sup_function),
                _ => false,
            }),

            Type::Restricted {
                ty: sup_underlying,
                restrictions: sup_restrictions,
            } => Some(self.restricted_subtype(sub, sub_ty, *sup_underlying, sup_restrictions)),

            Type::Composite(_) => Some(match sub_ty {
                Type::Restricted { ty, .. } => {
                    !self.is_top_type(*ty)
                        && self.is_composite(*ty)
                        && ty.is_some_and(|underlying| ctx.equal(underlying, sup))
                }
                Type::Composite(_) => ctx.as_composite(sub).is_some_and(|composite| {
                    composite
                        .implicit_type_requirement_conformances
                        .iter()
                        .any(|requirement| ctx.equal(*requirement, sup))
                }),
                _ => false,
            }),

            Type::Interface(_) => Some(match sub_ty {
                Type::Composite(_) => {
                    let same_kind = ctx.as_composite(sub).map(|c| c.kind)
                        == ctx.as_interface(sup).map(|i| i.kind);
                    same_kind && self.conformances_contain(sub, sup)
                }
                Type::Restricted { restrictions, .. } => restrictions
                    .iter()
                    .any(|r| ctx.equal(*r, sup) || self.conformances_contain(*r, sup)),
                _ => false,
            }),

            Type::Capability(Some(sup_borrow)) => match sub_ty {
                Type::Capability(Some(sub_borrow)) => Some(self.is_subtype(*sub_borrow, *sup_borrow)),
                _ => None,
            },

            Type::Simple(simple) => {
                let sup_tag = simple.tag();
                Some(ctx.tag(sub).belongs_to(sup_tag))
            }

            Type::Capability(None)
            | Type::Generic(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => None,
        };

        if let Some(result) = decided {
            return result;
        }

        // Erase the type arguments of a parameterised subtype and retry
        match sub_ty {
            Type::Capability(Some(_)) => self.is_subtype(ctx.unparameterized_capability_type(), sup),
            _ => false,
        }
    }

    fn function_subtype(&self, sub: &FunctionType, sup: &FunctionType) -> bool {
        // View functions may be used where impure ones are expected
        let purity = sub.purity == sup.purity || sub.purity == FunctionPurity::View;
        if !purity || sub.parameters.len() != sup.parameters.len() {
            return false;
        }

        let parameters = sub.parameters.iter().zip(&sup.parameters).all(|(sub_p, sup_p)| {
            self.is_subtype(sup_p.type_annotation.ty, sub_p.type_annotation.ty)
        });

        parameters
            && self.is_subtype(sub.return_type.ty, sup.return_type.ty)
            && sub.is_constructor == sup.is_constructor
    }

    /// Subtyping against `T{Us}`.
    ///
    /// | sub \ sup            | top type `T`                 | composite `T`          |
    /// |----------------------|------------------------------|------------------------|
    /// | top type             | false                        | false                  |
    /// | `top{Vs}`            | `top <: T` and `Us ⊆ Vs`     | false                  |
    /// | `C{Vs}`              | `C <: T` and `Us ⊆ conf(C)`  | `C == T`               |
    /// | composite `C`        | `C <: T` and `Us ⊆ conf(C)`  | `C <: T`               |
    fn restricted_subtype(
        &self,
        sub: TypeId,
        sub_ty: &Type,
        sup_underlying: Option<TypeId>,
        sup_restrictions: &[TypeId],
    ) -> bool {
        let ctx = self.type_ctx;
        let underlying_subtype = |ty: Option<TypeId>| match (ty, sup_underlying) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(ty), Some(sup)) => self.is_subtype(ty, sup),
        };

        if self.is_top_type(sup_underlying) {
            return match sub_ty {
                Type::Simple(SimpleType::Any | SimpleType::AnyStruct | SimpleType::AnyResource) => {
                    false
                }
                Type::Restricted {
                    ty: sub_underlying,
                    restrictions: sub_restrictions,
                } => {
                    if self.is_top_type(*sub_underlying) {
                        underlying_subtype(*sub_underlying)
                            && self.contains_all(sub_restrictions, sup_restrictions)
                    } else if let Some(composite) = sub_underlying.filter(|u| self.is_composite(Some(*u))) {
                        underlying_subtype(Some(composite))
                            && self.contains_all(&ctx.effective_conformances(composite), sup_restrictions)
                    } else {
                        false
                    }
                }
                Type::Composite(_) => {
                    underlying_subtype(Some(sub))
                        && self.contains_all(&ctx.effective_conformances(sub), sup_restrictions)
                }
                _ => false,
            };
        }

        match sub_ty {
            Type::Restricted {
                ty: sub_underlying, ..
            } => {
                !self.is_top_type(*sub_underlying)
                    && self.is_composite(*sub_underlying)
                    && match (sub_underlying, sup_underlying) {
                        (Some(a), Some(b)) => ctx.equal(*a, b),
                        _ => false,
                    }
            }
            Type::Composite(_) => underlying_subtype(Some(sub)),
            _ => false,
        }
    }

    /// The composite kind `id` belongs to, for interfaces and composites
    pub fn composite_kind(&self, id: TypeId) -> Option<CompositeKind> {
        self.type_ctx
            .as_composite(id)
            .map(|c| c.kind)
            .or_else(|| self.type_ctx.as_interface(id).map(|i| i.kind))
    }

    /// Whether `sub` is a restricted type whose underlying type is a top type
    pub fn is_restricted_with_top_type(&self, id: TypeId) -> bool {
        self.restricted_parts(id)
            .is_some_and(|(underlying, _)| self.is_top_type(underlying))
    }
}
