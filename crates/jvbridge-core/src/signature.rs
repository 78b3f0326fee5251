//! Method descriptor parsing
//!
//! Classifies each parameter and the return type of a host method descriptor
//! (`(I[BLjava/lang/String;)V`) into a [`HostType`].
//!
//! Classes with a dedicated converter map to it (`java/lang/String`, boxed
//! primitives, the configured wrapper class and callback interface);
//! every other class maps to `Object`. Nested arrays map to
//! `Array<Object>`, so inner arrays are marshaled dynamically.

use jvbridge_sdk::PrimitiveKind;

use crate::error::{BridgeError, BridgeResult};
use crate::options::BridgeOptions;
use crate::types::{HostType, JavaTypeId};

/// Deepest array nesting a host descriptor may have
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Parse a full method descriptor into parameter types and return type
pub fn parse_method_descriptor(
    descriptor: &str,
    options: &BridgeOptions,
) -> BridgeResult<(Vec<HostType>, HostType)> {
    let mut cursor = Cursor::new(descriptor);
    cursor.expect(b'(')?;

    let mut params = Vec::new();
    while cursor.peek() != Some(b')') {
        let ty = cursor.field_type(options)?;
        if ty.is_void() {
            return Err(cursor.error("void parameter"));
        }
        params.push(ty);
    }
    cursor.expect(b')')?;

    let ret = cursor.field_type(options)?;
    cursor.finish()?;
    Ok((params, ret))
}

/// Parse a single field descriptor (or an array class name such as `[B`)
pub fn parse_field_type(descriptor: &str, options: &BridgeOptions) -> BridgeResult<HostType> {
    let mut cursor = Cursor::new(descriptor);
    let ty = cursor.field_type(options)?;
    cursor.finish()?;
    Ok(ty)
}

/// Converter id for a binary class name
pub fn classify_class(class: &str, options: &BridgeOptions) -> JavaTypeId {
    if class == "java/lang/String" {
        JavaTypeId::String
    } else if let Some(kind) = PrimitiveKind::from_boxed_class(class) {
        JavaTypeId::boxed(kind)
    } else if class == options.wrapper_class {
        JavaTypeId::NativeObjectWrapper
    } else if class == options.callback_interface {
        JavaTypeId::FunctionType
    } else {
        JavaTypeId::Object
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn error(&self, what: &str) -> BridgeError {
        BridgeError::Signature(format!("{} at offset {} in '{}'", what, self.pos, self.text))
    }

    fn expect(&mut self, expected: u8) -> BridgeResult<()> {
        match self.bump() {
            Some(b) if b == expected => Ok(()),
            _ => Err(self.error(&format!("expected '{}'", expected as char))),
        }
    }

    fn finish(&self) -> BridgeResult<()> {
        if self.pos == self.text.len() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    fn class_name(&mut self) -> BridgeResult<&'a str> {
        let text: &'a str = self.text;
        let rest = &text[self.pos..];
        let len = rest
            .find(';')
            .ok_or_else(|| self.error("unterminated class name"))?;
        if len == 0 {
            return Err(self.error("empty class name"));
        }
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn scalar(&mut self, options: &BridgeOptions) -> BridgeResult<JavaTypeId> {
        match self.bump() {
            Some(b'V') => Ok(JavaTypeId::Void),
            Some(b'L') => Ok(classify_class(self.class_name()?, options)),
            Some(b) => PrimitiveKind::from_descriptor(b as char)
                .map(JavaTypeId::primitive)
                .ok_or_else(|| {
                    self.pos -= 1;
                    self.error(&format!("unknown type '{}'", b as char))
                }),
            None => Err(self.error("unexpected end")),
        }
    }

    fn field_type(&mut self, options: &BridgeOptions) -> BridgeResult<HostType> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            self.pos += 1;
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(self.error("too many array dimensions"));
            }
        }

        match (dimensions, self.scalar(options)?) {
            (0, id) => Ok(HostType::Scalar(id)),
            (_, JavaTypeId::Void) => Err(self.error("array of void")),
            (1, element) => Ok(HostType::Array(element)),
            _ => Ok(HostType::Array(JavaTypeId::Object)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> BridgeOptions {
        BridgeOptions::default()
    }

    #[test]
    fn test_parse_primitives() {
        let (params, ret) = parse_method_descriptor("(BCDFIJSZ)V", &opts()).unwrap();
        let ids: Vec<_> = params.iter().map(|t| t.id()).collect();
        assert_eq!(
            ids,
            vec![
                JavaTypeId::Byte,
                JavaTypeId::Char,
                JavaTypeId::Double,
                JavaTypeId::Float,
                JavaTypeId::Int,
                JavaTypeId::Long,
                JavaTypeId::Short,
                JavaTypeId::Boolean,
            ]
        );
        assert!(ret.is_void());
    }

    #[test]
    fn test_parse_classes() {
        let (params, ret) = parse_method_descriptor(
            "(Ljava/lang/String;Ljava/lang/Integer;Ljava/util/List;Ljvbridge/ScriptFunction;)Ljvbridge/JavaObjectWrapper;",
            &opts(),
        )
        .unwrap();
        assert_eq!(
            params,
            vec![
                HostType::Scalar(JavaTypeId::String),
                HostType::Scalar(JavaTypeId::BoxedInt),
                HostType::Scalar(JavaTypeId::Object),
                HostType::Scalar(JavaTypeId::FunctionType),
            ]
        );
        assert_eq!(ret, HostType::Scalar(JavaTypeId::NativeObjectWrapper));
    }

    #[test]
    fn test_parse_arrays() {
        let (params, ret) =
            parse_method_descriptor("([B[Ljava/lang/String;[[I)[D", &opts()).unwrap();
        assert_eq!(
            params,
            vec![
                HostType::Array(JavaTypeId::Byte),
                HostType::Array(JavaTypeId::String),
                HostType::Array(JavaTypeId::Object),
            ]
        );
        assert_eq!(ret, HostType::Array(JavaTypeId::Double));
    }

    #[test]
    fn test_parse_field_type_array_class() {
        assert_eq!(
            parse_field_type("[B", &opts()).unwrap(),
            HostType::Array(JavaTypeId::Byte)
        );
        assert_eq!(
            parse_field_type("[Ljava/lang/Long;", &opts()).unwrap(),
            HostType::Array(JavaTypeId::BoxedLong)
        );
    }

    #[test]
    fn test_array_dimension_limit() {
        let deepest = format!("{}I", "[".repeat(MAX_ARRAY_DIMENSIONS));
        assert_eq!(
            parse_field_type(&deepest, &opts()).unwrap(),
            HostType::Array(JavaTypeId::Object)
        );

        for depth in [MAX_ARRAY_DIMENSIONS + 1, 100_000] {
            let descriptor = format!("({}I)V", "[".repeat(depth));
            let err = parse_method_descriptor(&descriptor, &opts()).unwrap_err();
            assert!(matches!(err, BridgeError::Signature(_)));
        }
        assert!(parse_field_type("[[V", &opts()).is_err());
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "I)V", "(I", "(Q)V", "(V)V", "(Ljava/lang/String)V", "()V;", "([V)V", "(L;)V"] {
            let err = parse_method_descriptor(bad, &opts()).unwrap_err();
            assert!(matches!(err, BridgeError::Signature(_)), "{bad}: {err:?}");
        }
    }
}
