use indexmap::IndexMap;
use smol_str::SmolStr;
use crate::infer::ty::Ty;

#[derive(Debug, Clone, PartialEq)]
pub enum TyInfo {
    Struct(StructInfo),
    Enum(EnumInfo),
    EnumMember(EnumMemberInfo),
    Function(FunctionInfo)
}

impl TyInfo {
    pub fn name(&self) -> &SmolStr {
        match self {
            TyInfo::Struct(info) => &info.name,
            TyInfo::Enum(info) => &info.name,
            TyInfo::EnumMember(info) => &info.name,
            TyInfo::Function(info) => &info.name,
        }
    }

    pub fn ty(&self) -> Ty {
        match self {
            TyInfo::Struct(info) => info.ty(),
            TyInfo::Enum(info) => info.ty(),
            TyInfo::EnumMember(info) => Ty::Const(info.enum_name.clone()),
            TyInfo::Function(info) => info.ty.clone(),
        }
    }
}

// Structs and enums register twice: a name-only prototype first, so member
// type references can resolve the type's own name, then the completed info.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInfo {
    pub name: SmolStr,
    pub properties: IndexMap<SmolStr, PropertyInfo>,
    pub complete: bool
}

impl StructInfo {
    pub fn prototype(name: impl Into<SmolStr>) -> StructInfo {
        StructInfo { name: name.into(), properties: IndexMap::new(), complete: false }
    }

    pub fn completed(self, properties: IndexMap<SmolStr, PropertyInfo>) -> StructInfo {
        StructInfo { properties, complete: true, ..self }
    }

    pub fn ty(&self) -> Ty {
        Ty::Const(self.name.clone())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub name: SmolStr,
    pub ty: Ty,
    pub mutable: bool
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumInfo {
    pub name: SmolStr,
    pub members: IndexMap<SmolStr, EnumMemberInfo>,
    pub complete: bool
}

impl EnumInfo {
    pub fn prototype(name: impl Into<SmolStr>) -> EnumInfo {
        EnumInfo { name: name.into(), members: IndexMap::new(), complete: false }
    }

    pub fn completed(self, members: IndexMap<SmolStr, EnumMemberInfo>) -> EnumInfo {
        EnumInfo { members, complete: true, ..self }
    }

    pub fn ty(&self) -> Ty {
        Ty::Const(self.name.clone())
    }

    pub fn member(&self, name: &str) -> Option<&EnumMemberInfo> {
        self.members.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberInfo {
    pub name: SmolStr,
    pub enum_name: SmolStr,
    pub parameters: Vec<Ty>,
    // the enum type itself for a field-less member, a constructor function
    // otherwise
    pub constructor_ty: Ty
}

impl EnumMemberInfo {
    pub fn new(enum_name: impl Into<SmolStr>, name: impl Into<SmolStr>, parameters: Vec<Ty>) -> EnumMemberInfo {
        let enum_name = enum_name.into();
        let enum_ty = Ty::Const(enum_name.clone());
        let constructor_ty = if parameters.is_empty() {
            enum_ty
        } else {
            Ty::fun(parameters.iter().cloned(), enum_ty)
        };
        EnumMemberInfo { name: name.into(), enum_name, parameters, constructor_ty }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: SmolStr,
    pub parameters: Vec<(SmolStr, Ty)>,
    pub return_ty: Ty,
    pub ty: Ty
}

impl FunctionInfo {
    pub fn new(name: impl Into<SmolStr>, parameters: Vec<(SmolStr, Ty)>, return_ty: Ty) -> FunctionInfo {
        let ty = Ty::fun(parameters.iter().map(|(_, t)| t.clone()), return_ty.clone());
        FunctionInfo { name: name.into(), parameters, return_ty, ty }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_struct_completion_keeps_name() {
        let proto = StructInfo::prototype("Point");
        assert!(!proto.complete);
        let mut properties = IndexMap::new();
        properties.insert(
            SmolStr::from("x"),
            PropertyInfo { name: "x".into(), ty: Ty::int32(), mutable: false }
        );
        let complete = proto.completed(properties);
        assert!(complete.complete);
        assert_eq!(complete.name, "Point");
        assert_eq!(complete.property("x").map(|p| &p.ty), Some(&Ty::int32()));
    }

    #[test]
    fn test_field_less_member_is_a_value_of_the_enum() {
        let member = EnumMemberInfo::new("Maybe", "None", vec![]);
        assert_eq!(member.constructor_ty, Ty::Const("Maybe".into()));
    }

    #[test]
    fn test_member_with_fields_gets_a_constructor_function() {
        let member = EnumMemberInfo::new("Maybe", "Just", vec![Ty::int32()]);
        assert_eq!(member.constructor_ty, Ty::fun([Ty::int32()], Ty::Const("Maybe".into())));
    }

    #[test]
    fn test_function_info_curries_parameters() {
        let info = FunctionInfo::new(
            "add",
            vec![("a".into(), Ty::int32()), ("b".into(), Ty::int32())],
            Ty::int32()
        );
        assert_eq!(info.ty, Ty::fun([Ty::int32(), Ty::int32()], Ty::int32()));
        assert_eq!(info.ty.chain_parameters().len(), 2);
    }

    #[test]
    fn test_function_of_no_parameters_takes_unit() {
        let info = FunctionInfo::new("main", vec![], Ty::void());
        assert_eq!(info.ty, Ty::fun([], Ty::void()));
    }
}
