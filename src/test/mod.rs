use crate::{
    assembly::Instruction,
    metadata::{
        field::{Field, FieldAttributes},
        method::{Method, MethodBody},
        module::Module,
        signatures::TypeSignature,
        token::Token,
        typedef::TypeDef,
    },
};

// Helper function to create a module whose `<Module>` type (TypeDef row 1) holds `globals`
pub fn create_module(globals: Vec<Field>) -> Module {
    let mut module = Module::new("test.dll");
    module.get_or_create_module_type().fields = globals;
    module
}

// Helper function to create an assembly-visible static field, as hoisting obfuscators emit them
pub fn create_global_field(rid: u32, name: &str, signature: TypeSignature) -> Field {
    Field::new(
        Token::from_parts(Token::FIELD, rid),
        name,
        FieldAttributes::STATIC | FieldAttributes::ASSEMBLY,
        signature,
    )
}

// Helper function to create a method with a body and no locals
pub fn create_method(rid: u32, name: &str, instructions: Vec<Instruction>) -> Method {
    Method::new(
        Token::from_parts(Token::METHODDEF, rid),
        name,
        MethodBody::new(instructions),
    )
}

// Helper function to create a type in the `Test` namespace
pub fn create_type(rid: u32, name: &str, methods: Vec<Method>) -> TypeDef {
    let mut ty = TypeDef::new(Token::from_parts(Token::TYPEDEF, rid), "Test", name);
    ty.methods = methods;
    ty
}
