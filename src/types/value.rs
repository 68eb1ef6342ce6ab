//! CloudFormation intrinsic-function values.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A value slot in a template: either a literal string or one of the
/// intrinsic functions the generator emits.
///
/// Serialized forms:
/// - `Literal("x")` → `"x"`
/// - `Ref("Id")` → `{"Ref": "Id"}`
/// - `GetAtt("Id", "Arn")` → `{"Fn::GetAtt": ["Id", "Arn"]}`
/// - `ImportValue("Name")` → `{"Fn::ImportValue": "Name"}`
/// - `Sub("${AWS::StackName}-x")` → `{"Fn::Sub": "${AWS::StackName}-x"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Literal(String),
    Ref(String),
    GetAtt(String, String),
    ImportValue(String),
    Sub(String),
}

impl TemplateValue {
    /// `Fn::GetAtt` on the `Arn` attribute of a logical id.
    pub fn get_att_arn(logical_id: impl Into<String>) -> Self {
        TemplateValue::GetAtt(logical_id.into(), "Arn".to_string())
    }

    /// The `${AWS::StackName}-<name>` export-name substitution.
    pub fn stack_export(name: &str) -> Self {
        TemplateValue::Sub(format!("${{AWS::StackName}}-{name}"))
    }
}

impl<S: Into<String>> From<S> for TemplateValue {
    fn from(value: S) -> Self {
        TemplateValue::Literal(value.into())
    }
}

impl Serialize for TemplateValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TemplateValue::Literal(value) => serializer.serialize_str(value),
            TemplateValue::Ref(logical_id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", logical_id)?;
                map.end()
            }
            TemplateValue::GetAtt(logical_id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[logical_id.as_str(), attribute.as_str()])?;
                map.end()
            }
            TemplateValue::ImportValue(export_name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::ImportValue", export_name)?;
                map.end()
            }
            TemplateValue::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
        }
    }
}
