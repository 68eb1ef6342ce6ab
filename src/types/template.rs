//! Per-account template documents and export outputs.

use indexmap::IndexMap;
use serde::Serialize;

use super::resources::Resource;
use super::value::TemplateValue;

/// An export declaration attached to an output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: TemplateValue,
}

/// An output entry: description, value, and an optional stack export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub description: String,
    pub value: TemplateValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

impl Output {
    /// An output exported as `${AWS::StackName}-<export_name>`.
    pub fn exported(
        description: impl Into<String>,
        value: TemplateValue,
        export_name: &str,
    ) -> Self {
        Output {
            description: description.into(),
            value,
            export: Some(Export {
                name: TemplateValue::stack_export(export_name),
            }),
        }
    }
}

/// One account's accumulating template document.
///
/// Resources and outputs keep insertion order; `Outputs` is omitted from the
/// serialized document when no outputs were registered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateDocument {
    #[serde(rename = "Resources")]
    resources: IndexMap<String, Resource>,
    #[serde(rename = "Outputs", skip_serializing_if = "IndexMap::is_empty")]
    outputs: IndexMap<String, Output>,
}

impl TemplateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.resources.insert(logical_id.into(), resource);
    }

    pub fn add_output(&mut self, logical_id: impl Into<String>, output: Output) {
        self.outputs.insert(logical_id.into(), output);
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn output(&self, logical_id: &str) -> Option<&Output> {
        self.outputs.get(logical_id)
    }

    pub fn resources(&self) -> &IndexMap<String, Resource> {
        &self.resources
    }

    pub fn outputs(&self) -> &IndexMap<String, Output> {
        &self.outputs
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty()
    }

    /// Serialize the finished document for the I/O shell to write out.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resources::{GroupProperties, Resource};
    use serde_json::json;

    #[test]
    fn empty_outputs_section_is_omitted() {
        let mut document = TemplateDocument::new();
        document.add_resource("DevsGroup", Resource::new(GroupProperties::default()));
        let value = serde_json::to_value(&document).unwrap();
        assert!(value.get("Resources").is_some());
        assert!(value.get("Outputs").is_none());
    }

    #[test]
    fn outputs_serialize_with_export_names() {
        let mut document = TemplateDocument::new();
        document.add_output(
            "DevsGroupArn",
            Output::exported(
                "Group devs ARN",
                TemplateValue::get_att_arn("DevsGroup"),
                "DevsGroupArn",
            ),
        );
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(
            value["Outputs"]["DevsGroupArn"],
            json!({
                "Description": "Group devs ARN",
                "Value": { "Fn::GetAtt": ["DevsGroup", "Arn"] },
                "Export": { "Name": { "Fn::Sub": "${AWS::StackName}-DevsGroupArn" } },
            })
        );
    }

    #[test]
    fn resources_keep_insertion_order() {
        let mut document = TemplateDocument::new();
        for id in ["Zebra", "Alpha", "Middle"] {
            document.add_resource(id, Resource::new(GroupProperties::default()));
        }
        let ids: Vec<&String> = document.resources().keys().collect();
        assert_eq!(ids, ["Zebra", "Alpha", "Middle"]);
    }
}
