//! `Mackerel::*` to `Custom::*` rewriting
//!
//! A fragment is the template part CloudFormation hands to the macro. Only `Resources` is looked at, every other
//! top level key is kept as is.
//!
//! Rewriting happens in two passes:
//! 1. [plan] walks all resources, checks that they are well-formed and collects the names of those to rewrite
//! 2. [rewrite] applies the changes to the collected resources and cannot fail
//!
//! Because nothing is written before the first pass succeeded a rejected fragment is never partially rewritten.
use crate::config::MacroConfig;
use serde_json::{Map, Value};

pub const MACKEREL_TYPE_PREFIX: &str = "Mackerel::";
pub const CUSTOM_TYPE_PREFIX: &str = "Custom::";
pub const CUSTOM_RESOURCE_VERSION: &str = "1.0";
pub const SERVICE_TOKEN_PROPERTY: &str = "ServiceToken";

const RESOURCES: &str = "Resources";
const TYPE: &str = "Type";
const VERSION: &str = "Version";
const PROPERTIES: &str = "Properties";

/// Rewrites all `Mackerel::*` resources of `fragment`
///
/// Returns the number of rewritten resources. On error `fragment` is left untouched.
pub fn transform_in_place(fragment: &mut Value, config: &MacroConfig) -> Result<usize, TransformError> {
    let matched = plan(fragment)?;

    let Some(resources) = fragment.get_mut(RESOURCES).and_then(Value::as_object_mut) else {
        return Ok(0);
    };

    for name in &matched {
        if let Some(Value::Object(resource)) = resources.get_mut(name) {
            rewrite(resource, config.service_token());
        }
    }

    Ok(matched.len())
}

/// Owned variant of [transform_in_place]
pub fn transform(mut fragment: Value, config: &MacroConfig) -> Result<Value, TransformError> {
    transform_in_place(&mut fragment, config)?;
    Ok(fragment)
}

/// Validates all resources and returns the logical names of those to rewrite
fn plan(fragment: &Value) -> Result<Vec<String>, TransformError> {
    let fragment = fragment
        .as_object()
        .ok_or(TransformError::FragmentNotAnObject)?;

    let resources = match fragment.get(RESOURCES) {
        None => return Ok(vec![]),
        Some(Value::Object(resources)) => resources,
        Some(_) => return Err(TransformError::ResourcesNotAnObject),
    };

    let mut matched = vec![];
    for (name, resource) in resources {
        let resource = resource
            .as_object()
            .ok_or_else(|| TransformError::ResourceNotAnObject(name.clone()))?;

        let resource_type = match resource.get(TYPE) {
            None => return Err(TransformError::MissingType(name.clone())),
            Some(Value::String(resource_type)) => resource_type,
            Some(_) => return Err(TransformError::TypeNotAString(name.clone())),
        };

        if !resource_type.starts_with(MACKEREL_TYPE_PREFIX) {
            continue;
        }

        match resource.get(PROPERTIES) {
            None | Some(Value::Object(_)) => {}
            Some(_) => return Err(TransformError::PropertiesNotAnObject(name.clone())),
        }

        matched.push(name.clone());
    }

    Ok(matched)
}

/// Turns a single resource into a custom resource
///
/// Expects a resource that passed [plan]. Keys are updated in place so their position is kept, new keys are
/// appended.
fn rewrite(resource: &mut Map<String, Value>, service_token: &str) {
    let Some(suffix) = resource
        .get(TYPE)
        .and_then(Value::as_str)
        .and_then(|resource_type| resource_type.strip_prefix(MACKEREL_TYPE_PREFIX))
    else {
        return;
    };

    let custom_type = format!("{CUSTOM_TYPE_PREFIX}{suffix}");
    resource.insert(TYPE.to_string(), Value::String(custom_type));
    resource.insert(
        VERSION.to_string(),
        Value::String(CUSTOM_RESOURCE_VERSION.to_string()),
    );

    let properties = resource
        .entry(PROPERTIES)
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(properties) = properties {
        properties.insert(
            SERVICE_TOKEN_PROPERTY.to_string(),
            Value::String(service_token.to_string()),
        );
    }
}

/// Reasons a fragment is rejected
///
/// Only ever logged. The macro response does not tell them apart.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransformError {
    #[error("fragment is not an object")]
    FragmentNotAnObject,
    #[error("Resources is not an object")]
    ResourcesNotAnObject,
    #[error("resource {0} is not an object")]
    ResourceNotAnObject(String),
    #[error("resource {0} has no Type")]
    MissingType(String),
    #[error("Type of resource {0} is not a string")]
    TypeNotAString(String),
    #[error("Properties of resource {0} is not an object")]
    PropertiesNotAnObject(String),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ARN: &str = "arn:lambda:xyz";

    fn config() -> MacroConfig {
        MacroConfig::new(ARN).expect("valid config")
    }

    fn transform_err(mut fragment: Value) -> TransformError {
        let original = fragment.clone();
        let err = transform_in_place(&mut fragment, &config()).expect_err("must error");
        assert_eq!(fragment, original, "rejected fragment must not change");
        err
    }

    #[test]
    fn rewrites_mackerel_resource() {
        let fragment = json!({
            "Resources": {
                "A": { "Type": "Mackerel::Foo::Bar", "Properties": { "x": 1 } }
            }
        });

        let transformed = transform(fragment, &config()).expect("valid fragment");

        assert_eq!(
            transformed,
            json!({
                "Resources": {
                    "A": {
                        "Type": "Custom::Foo::Bar",
                        "Version": "1.0",
                        "Properties": { "x": 1, "ServiceToken": ARN }
                    }
                }
            })
        );
    }

    #[test]
    fn adds_properties_when_missing() {
        let mut fragment = json!({ "Resources": { "Org": { "Type": "Mackerel::Org" } } });

        let rewritten = transform_in_place(&mut fragment, &config()).expect("valid fragment");

        assert_eq!(rewritten, 1);
        assert_eq!(
            fragment["Resources"]["Org"],
            json!({
                "Type": "Custom::Org",
                "Version": "1.0",
                "Properties": { "ServiceToken": ARN }
            })
        );
    }

    #[test]
    fn key_order_is_kept() {
        let mut fragment = json!({
            "Resources": {
                "Host": {
                    "DependsOn": "Service",
                    "Type": "Mackerel::Host",
                    "Properties": { "Name": "web", "Roles": [] }
                }
            }
        });

        transform_in_place(&mut fragment, &config()).expect("valid fragment");

        let host = fragment["Resources"]["Host"].as_object().unwrap();
        assert_eq!(
            host.keys().collect::<Vec<_>>(),
            ["DependsOn", "Type", "Properties", "Version"]
        );
        assert_eq!(
            host["Properties"].as_object().unwrap().keys().collect::<Vec<_>>(),
            ["Name", "Roles", "ServiceToken"]
        );
    }

    #[test]
    fn other_resources_untouched() {
        let bucket = json!({
            "Type": "AWS::S3::Bucket",
            "Properties": { "BucketName": "logs" },
            "DeletionPolicy": "Retain"
        });
        let mut fragment = json!({
            "Resources": {
                "Bucket": bucket.clone(),
                "Service": { "Type": "Mackerel::Service", "Properties": { "Name": "svc" } }
            },
            "Outputs": { "BucketName": { "Value": { "Ref": "Bucket" } } }
        });
        let outputs = fragment["Outputs"].clone();

        let rewritten = transform_in_place(&mut fragment, &config()).expect("valid fragment");

        assert_eq!(rewritten, 1);
        assert_eq!(fragment["Resources"]["Bucket"], bucket);
        assert_eq!(fragment["Outputs"], outputs);
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let fragment = json!({
            "Resources": {
                "Lower": { "Type": "mackerel::Service" },
                "NoSeparator": { "Type": "MackerelService" },
                "Custom": { "Type": "Custom::Service" }
            }
        });

        let transformed = transform(fragment.clone(), &config()).expect("valid fragment");
        assert_eq!(transformed, fragment);
    }

    #[test]
    fn overwrites_existing_token_and_version() {
        let mut fragment = json!({
            "Resources": {
                "Monitor": {
                    "Type": "Mackerel::Monitor",
                    "Version": "0.1",
                    "Properties": { "ServiceToken": "arn:old" }
                }
            }
        });

        transform_in_place(&mut fragment, &config()).expect("valid fragment");

        assert_eq!(fragment["Resources"]["Monitor"]["Version"], json!("1.0"));
        assert_eq!(
            fragment["Resources"]["Monitor"]["Properties"]["ServiceToken"],
            json!(ARN)
        );
    }

    #[test]
    fn second_pass_is_noop() {
        let once = transform(
            json!({ "Resources": { "Role": { "Type": "Mackerel::Role", "Properties": {} } } }),
            &config(),
        )
        .expect("valid fragment");

        let mut twice = once.clone();
        let rewritten = transform_in_place(&mut twice, &config()).expect("valid fragment");

        assert_eq!(rewritten, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn no_resources() {
        let mut fragment = json!({ "AWSTemplateFormatVersion": "2010-09-09" });
        let original = fragment.clone();

        let rewritten = transform_in_place(&mut fragment, &config()).expect("valid fragment");

        assert_eq!(rewritten, 0);
        assert_eq!(fragment, original);
    }

    #[test]
    fn missing_type_rolls_back() {
        // `A` is inserted before `B` and would be rewritten first without the validation pass
        let err = transform_err(json!({
            "Resources": {
                "A": { "Type": "Mackerel::Service" },
                "B": { "Properties": {} }
            }
        }));
        assert_eq!(err, TransformError::MissingType("B".to_string()));
    }

    #[test]
    fn malformed_fragments() {
        assert_eq!(transform_err(json!([])), TransformError::FragmentNotAnObject);
        assert_eq!(
            transform_err(json!({ "Resources": null })),
            TransformError::ResourcesNotAnObject
        );
        assert_eq!(
            transform_err(json!({ "Resources": { "A": "Mackerel::Service" } })),
            TransformError::ResourceNotAnObject("A".to_string())
        );
        assert_eq!(
            transform_err(json!({ "Resources": { "A": { "Type": 42 } } })),
            TransformError::TypeNotAString("A".to_string())
        );
        assert_eq!(
            transform_err(json!({
                "Resources": { "A": { "Type": "Mackerel::Service", "Properties": null } }
            })),
            TransformError::PropertiesNotAnObject("A".to_string())
        );
    }

    #[test]
    fn properties_of_other_resources_are_not_checked() {
        let fragment = json!({
            "Resources": { "A": { "Type": "AWS::SNS::Topic", "Properties": "not an object" } }
        });

        let transformed = transform(fragment.clone(), &config()).expect("valid fragment");
        assert_eq!(transformed, fragment);
    }
}
