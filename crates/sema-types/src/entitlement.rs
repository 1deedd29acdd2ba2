//! Images of authorizations under entitlement maps

use crate::access::{Access, EntitlementSetKind, PrimitiveAccess};
use crate::context::TypeContext;
use crate::error::TypeError;
use crate::member::Report;
use crate::span::Span;
use crate::ty::TypeId;

impl TypeContext {
    /// Authorization granted on a mapped member when accessed through `authorization`
    ///
    /// Each entitlement maps to the outputs of its relations, plus itself when
    /// the map includes the identity. A conjunction maps to the union of the
    /// images. A disjunction maps to a disjunction only if every image has at
    /// most one element; otherwise the output is reported as unrepresentable.
    pub fn entitlement_map_image(
        &self,
        map: TypeId,
        authorization: &Access,
        span: Span,
        report: Report<'_>,
    ) -> Access {
        let Some(map_type) = self.as_entitlement_map(map) else {
            return Access::UNAUTHORIZED;
        };

        let (kind, entitlements) = match authorization {
            Access::Primitive(PrimitiveAccess::Private) => return authorization.clone(),
            Access::Primitive(_) | Access::EntitlementMap(_) => return Access::UNAUTHORIZED,
            Access::EntitlementSet { kind, entitlements } => (*kind, entitlements),
        };

        let image_of = |entitlement: TypeId| {
            let mut image: Vec<TypeId> = map_type.outputs_of(entitlement).collect();
            if map_type.includes_identity && !image.contains(&entitlement) {
                image.push(entitlement);
            }
            image
        };

        let mut outputs = Vec::new();
        match kind {
            EntitlementSetKind::Conjunction => {
                for &entitlement in entitlements {
                    outputs.extend(image_of(entitlement));
                }
            }
            EntitlementSetKind::Disjunction => {
                for &entitlement in entitlements {
                    let image = image_of(entitlement);
                    if image.len() > 1 {
                        report(TypeError::UnrepresentableEntitlementMapOutput {
                            input: self.access_string(authorization),
                            map: self.qualified_string(map),
                            span,
                        });
                        return Access::UNAUTHORIZED;
                    }
                    outputs.extend(image);
                }
            }
        }

        if outputs.is_empty() {
            return Access::UNAUTHORIZED;
        }

        tracing::trace!(
            map = %self.qualified_string(map),
            outputs = outputs.len(),
            "mapped authorization"
        );
        Access::entitlement_set(kind, outputs)
    }
}
