//! Display strings and type keys
//!
//! Every type has three renderings: the unqualified display string, the
//! qualified display string (nominal types prefixed with their containers),
//! and the [`TypeKey`] used for identity, which also carries the location.

use crate::access::{Access, EntitlementSetKind};
use crate::context::TypeContext;
use crate::location::TypeKey;
use crate::ty::{FunctionType, Parameter, Type, TypeAnnotation, TypeId, TypeParameter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Plain,
    Qualified,
    Key,
}

impl Format {
    fn separator(self) -> &'static str {
        match self {
            Format::Key => "",
            _ => " ",
        }
    }
}

fn join(parts: &[String], separator: &str) -> String {
    parts.join(&format!(",{}", separator))
}

impl TypeContext {
    /// Unqualified display string
    pub fn type_string(&self, id: TypeId) -> String {
        self.format(id, Format::Plain)
    }

    /// Display string with nominal types qualified by their containers
    pub fn qualified_string(&self, id: TypeId) -> String {
        self.format(id, Format::Qualified)
    }

    /// Machine-readable identity of the type
    pub fn type_key(&self, id: TypeId) -> TypeKey {
        TypeKey(self.format(id, Format::Key))
    }

    /// Dot-separated identifier of a nominal type and its containers
    pub fn qualified_identifier(&self, id: TypeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(ty) = current {
            let Some(info) = self.nominal_info(ty) else {
                break;
            };
            parts.push(info.identifier);
            current = info.container;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Display string of an access or authorization
    pub fn access_string(&self, access: &Access) -> String {
        self.format_access(access, Format::Qualified)
    }

    /// Display string of a type annotation
    pub fn annotation_string(&self, annotation: &TypeAnnotation) -> String {
        self.format_annotation(annotation, Format::Qualified)
    }

    fn format_annotation(&self, annotation: &TypeAnnotation, format: Format) -> String {
        let ty = self.format(annotation.ty, format);
        if annotation.is_resource && format != Format::Key {
            format!("@{}", ty)
        } else {
            ty
        }
    }

    fn format_access(&self, access: &Access, format: Format) -> String {
        match access {
            Access::Primitive(primitive) => primitive.keyword().to_string(),
            Access::EntitlementSet { kind, entitlements } => {
                let separator = match (kind, format) {
                    (EntitlementSetKind::Conjunction, Format::Key) => ",",
                    (EntitlementSetKind::Conjunction, _) => ", ",
                    (EntitlementSetKind::Disjunction, Format::Key) => "|",
                    (EntitlementSetKind::Disjunction, _) => " | ",
                };
                entitlements
                    .iter()
                    .map(|e| self.format(*e, format))
                    .collect::<Vec<_>>()
                    .join(separator)
            }
            Access::EntitlementMap(map) => format!("mapping {}", self.format(*map, format)),
        }
    }

    fn format_nominal(&self, id: TypeId, format: Format) -> String {
        match format {
            Format::Plain => self
                .nominal_info(id)
                .map(|info| info.identifier.to_string())
                .unwrap_or_default(),
            Format::Qualified => self.qualified_identifier(id),
            Format::Key => {
                let qualified = self.qualified_identifier(id);
                match self.nominal_info(id).and_then(|info| info.location) {
                    Some(location) => location.type_key(&qualified).0,
                    None => qualified,
                }
            }
        }
    }

    fn format_type_parameter(&self, parameter: &TypeParameter, format: Format) -> String {
        match (format, parameter.type_bound) {
            (Format::Key, _) | (_, None) => parameter.name.clone(),
            (_, Some(bound)) => format!("{}: {}", parameter.name, self.format(bound, format)),
        }
    }

    fn format_parameter(&self, parameter: &Parameter, format: Format) -> String {
        if format == Format::Key {
            return self.format(parameter.type_annotation.ty, format);
        }

        let mut names = Vec::new();
        if let Some(label) = &parameter.label {
            names.push(label.as_str());
        }
        if !parameter.identifier.is_empty() {
            names.push(parameter.identifier.as_str());
        }

        let annotation = self.format_annotation(&parameter.type_annotation, format);
        if names.is_empty() {
            annotation
        } else {
            format!("{}: {}", names.join(" "), annotation)
        }
    }

    fn format_function(&self, function: &FunctionType, format: Format) -> String {
        let separator = format.separator();
        let mut out = String::new();

        let purity = function.purity.keyword();
        if !purity.is_empty() {
            out.push_str(purity);
            out.push(' ');
        }
        out.push_str("fun");

        if !function.type_parameters.is_empty() {
            let parameters: Vec<String> = function
                .type_parameters
                .iter()
                .map(|p| self.format_type_parameter(p, format))
                .collect();
            out.push('<');
            out.push_str(&join(&parameters, separator));
            out.push('>');
        }

        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|p| self.format_parameter(p, format))
            .collect();
        out.push('(');
        out.push_str(&join(&parameters, separator));
        out.push_str("):");
        out.push_str(separator);

        let return_type = match format {
            Format::Key => self.format(function.return_type.ty, format),
            _ => self.format_annotation(&function.return_type, format),
        };
        out.push_str(&return_type);
        out
    }

    fn format(&self, id: TypeId, format: Format) -> String {
        let Some(ty) = self.get(id) else {
            return "<<unknown>>".to_string();
        };
        let separator = format.separator();

        match ty {
            Type::Simple(simple) => simple.name().to_string(),
            Type::Numeric(numeric) => numeric.name().to_string(),
            Type::Optional(inner) => format!("{}?", self.format(*inner, format)),
            Type::VariableSized(element) => format!("[{}]", self.format(*element, format)),
            Type::ConstantSized { ty, size } => {
                format!("[{};{}{}]", self.format(*ty, format), separator, size)
            }
            Type::Dictionary { key, value } => format!(
                "{{{}:{}{}}}",
                self.format(*key, format),
                separator,
                self.format(*value, format)
            ),
            Type::Function(function) => self.format_function(function, format),
            Type::Composite(_)
            | Type::Interface(_)
            | Type::Entitlement(_)
            | Type::EntitlementMap(_) => self.format_nominal(id, format),
            Type::Reference { ty, authorization } => {
                let referenced = self.format(*ty, format);
                if authorization.is_unauthorized() {
                    format!("&{}", referenced)
                } else {
                    format!(
                        "auth({}){}&{}",
                        self.format_access(authorization, format),
                        separator,
                        referenced
                    )
                }
            }
            Type::Restricted { ty, restrictions } => {
                let underlying = ty.map(|t| self.format(t, format)).unwrap_or_default();
                let restrictions: Vec<String> = restrictions
                    .iter()
                    .map(|r| self.format(*r, format))
                    .collect();
                format!("{}{{{}}}", underlying, join(&restrictions, separator))
            }
            Type::Capability(borrow) => match borrow {
                Some(borrow) => format!("Capability<{}>", self.format(*borrow, format)),
                None => "Capability".to_string(),
            },
            Type::Generic(parameter) => parameter.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::CompositeKind;
    use crate::location::Location;
    use crate::nominal::{CompositeType, EntitlementType, InterfaceType};
    use crate::ty::FunctionPurity;
    use pretty_assertions::assert_eq;

    fn location() -> Location {
        Location::StringLocation("test".to_string())
    }

    #[test]
    fn test_structural_strings() {
        let mut ctx = TypeContext::new();
        let int = ctx.int_type();
        let string = ctx.string_type();
        let optional = ctx.optional_type(int);
        let array = ctx.constant_sized_type(optional, 3);
        let dictionary = ctx.dictionary_type(string, array);

        assert_eq!(ctx.type_string(dictionary), "{String: [Int?; 3]}");
        assert_eq!(ctx.type_key(dictionary).as_str(), "{String:[Int?;3]}");
    }

    #[test]
    fn test_function_strings() {
        let mut ctx = TypeContext::new();
        let int = ctx.type_annotation(ctx.int_type());
        let bool_type = ctx.type_annotation(ctx.bool_type());
        let function = FunctionType::new(
            FunctionPurity::View,
            vec![
                Parameter::new(Some("to"), "recipient", int),
                Parameter::unlabeled("amount", int),
            ],
            bool_type,
        );
        let id = ctx.function_type(function);

        assert_eq!(
            ctx.type_string(id),
            "view fun(to recipient: Int, _ amount: Int): Bool"
        );
        assert_eq!(ctx.type_key(id).as_str(), "view fun(Int,Int):Bool");
    }

    #[test]
    fn test_nominal_strings_and_keys() {
        let mut ctx = TypeContext::new();
        let contract = ctx.declare_composite(CompositeType::new(
            Some(location()),
            CompositeKind::Contract,
            "C",
        ));
        let resource = ctx.declare_composite(CompositeType::new(
            Some(location()),
            CompositeKind::Resource,
            "R",
        ));
        ctx.set_container(resource, contract);

        assert_eq!(ctx.type_string(resource), "R");
        assert_eq!(ctx.qualified_string(resource), "C.R");
        assert_eq!(ctx.type_key(resource).as_str(), "S.test.C.R");
    }

    #[test]
    fn test_reference_and_restricted_strings() {
        let mut ctx = TypeContext::new();
        let e1 = ctx.declare_entitlement(EntitlementType::new(Some(location()), "E1"));
        let e2 = ctx.declare_entitlement(EntitlementType::new(Some(location()), "E2"));
        let interface = ctx.declare_interface(InterfaceType::new(
            Some(location()),
            CompositeKind::Resource,
            "I",
        ));
        let any_resource = ctx.any_resource_type();
        let restricted = ctx.restricted_type(Some(any_resource), vec![interface]);
        let reference = ctx.reference_type(restricted, Access::conjunction(vec![e1, e2]));

        assert_eq!(ctx.type_string(reference), "auth(E1, E2) &AnyResource{I}");
        assert_eq!(
            ctx.type_key(reference).as_str(),
            "auth(S.test.E1,S.test.E2)&AnyResource{S.test.I}"
        );

        let int = ctx.int_type();
        let plain = ctx.reference_type(int, Access::UNAUTHORIZED);
        assert_eq!(ctx.type_string(plain), "&Int");
    }
}
