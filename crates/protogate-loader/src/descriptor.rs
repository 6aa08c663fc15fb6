//! Binary descriptor set decoding
//!
//! Reads the `FileDescriptorSet` that `protoc --descriptor_set_out` writes
//! and converts it to the schema model.

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet,
};
use protogate_core::{
    EnumType, FieldDef, LoadError, MessageType, ReservedRange, SchemaFile, SchemaTree,
};

/// Decode a serialized `FileDescriptorSet`
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<SchemaTree, LoadError> {
    let set = FileDescriptorSet::decode(bytes)
        .map_err(|e| LoadError::DecodeError(e.to_string()))?;

    tracing::debug!(files = set.file.len(), "Decoded descriptor set");

    set.file.iter().map(convert_file).collect::<Result<Vec<_>, _>>().map(|files| SchemaTree { files })
}

fn convert_file(file: &FileDescriptorProto) -> Result<SchemaFile, LoadError> {
    let mut schema_file = SchemaFile::new(file.name(), file.package());

    for message in &file.message_type {
        schema_file.messages.push(convert_message(message)?);
    }
    schema_file.enums = file.enum_type.iter().map(convert_enum).collect();

    Ok(schema_file)
}

fn convert_message(descriptor: &DescriptorProto) -> Result<MessageType, LoadError> {
    let mut message = MessageType::new(descriptor.name());

    for field in &descriptor.field {
        let mut def = FieldDef::new(field.name(), field_tag(descriptor, field)?, field_type(field));
        def.repeated = field.label() == Label::Repeated;

        // proto3 `optional` fields sit in a synthetic oneof of their own
        if !field.proto3_optional() {
            def.oneof = field
                .oneof_index
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| descriptor.oneof_decl.get(i))
                .map(|oneof| oneof.name().to_string());
        }

        message = message.with_field(def);
    }

    // Descriptor message ranges are end-exclusive
    message.reserved.ranges = descriptor
        .reserved_range
        .iter()
        .map(|r| ReservedRange::new(r.start(), r.end().saturating_sub(1)))
        .collect();
    message.reserved.names = descriptor.reserved_name.clone();

    for nested in &descriptor.nested_type {
        message.messages.push(convert_message(nested)?);
    }
    message.enums = descriptor.enum_type.iter().map(convert_enum).collect();

    Ok(message)
}

fn field_tag(message: &DescriptorProto, field: &FieldDescriptorProto) -> Result<u32, LoadError> {
    u32::try_from(field.number()).map_err(|_| {
        LoadError::DecodeError(format!(
            "field '{}' in message '{}' has invalid number {}",
            field.name(),
            message.name(),
            field.number()
        ))
    })
}

fn field_type(field: &FieldDescriptorProto) -> String {
    let scalar = match field.r#type() {
        Type::Double => "double",
        Type::Float => "float",
        Type::Int64 => "int64",
        Type::Uint64 => "uint64",
        Type::Int32 => "int32",
        Type::Fixed64 => "fixed64",
        Type::Fixed32 => "fixed32",
        Type::Bool => "bool",
        Type::String => "string",
        Type::Bytes => "bytes",
        Type::Uint32 => "uint32",
        Type::Sfixed32 => "sfixed32",
        Type::Sfixed64 => "sfixed64",
        Type::Sint32 => "sint32",
        Type::Sint64 => "sint64",
        Type::Group | Type::Message | Type::Enum => return field.type_name().to_string(),
    };
    scalar.to_string()
}

fn convert_enum(descriptor: &EnumDescriptorProto) -> EnumType {
    let allow_alias = descriptor
        .options
        .as_ref()
        .map(|o| o.allow_alias())
        .unwrap_or(false);

    let mut enum_type = EnumType::new(descriptor.name()).with_allow_alias(allow_alias);
    for value in &descriptor.value {
        enum_type = enum_type.with_constant(value.name(), value.number());
    }

    // Enum ranges are inclusive already
    enum_type.reserved.ranges = descriptor
        .reserved_range
        .iter()
        .map(|r| ReservedRange::new(r.start(), r.end()))
        .collect();
    enum_type.reserved.names = descriptor.reserved_name.clone();
    enum_type
}
