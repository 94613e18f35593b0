//! CloudFormation flavoured YAML input
//!
//! Templates written in YAML usually use the short form of intrinsic functions (`!Ref`, `!GetAtt`, `!Sub`, ...).
//! These are tags, which have no json equivalent, so they are expanded into their long form
//! (`{"Ref": ...}`, `{"Fn::GetAtt": [...]}`, `{"Fn::Sub": ...}`) before the fragment is transformed.
use serde_json::Value;
use serde_yaml::Value as YamlValue;

pub fn from_str(contents: &str) -> anyhow::Result<Value> {
    let yaml: YamlValue = serde_yaml::from_str(contents)?;
    to_json(yaml)
}

fn to_json(yaml: YamlValue) -> anyhow::Result<Value> {
    let value = match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(int) = n.as_i64() {
                Value::from(int)
            } else if let Some(uint) = n.as_u64() {
                Value::from(uint)
            } else {
                let float = n.as_f64().unwrap_or(f64::NAN);
                let Some(number) = serde_json::Number::from_f64(float) else {
                    anyhow::bail!("number {n} can not be represented in json");
                };
                Value::Number(number)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(sequence) => Value::Array(
            sequence
                .into_iter()
                .map(to_json)
                .collect::<anyhow::Result<_>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = serde_json::Map::new();
            for (key, value) in mapping {
                object.insert(key_to_string(key)?, to_json(value)?);
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            intrinsic(tag.trim_start_matches('!'), tagged.value)?
        }
    };

    Ok(value)
}

/// Expands a short form intrinsic function into `{ "<long name>": <argument> }`
fn intrinsic(name: &str, argument: YamlValue) -> anyhow::Result<Value> {
    let argument = match (name, argument) {
        // `!GetAtt Resource.Attribute` is the only short form with a different argument shape
        ("GetAtt", YamlValue::String(path)) => match path.split_once('.') {
            Some((resource, attribute)) => Value::from(vec![resource, attribute]),
            None => anyhow::bail!("!GetAtt {path} is missing the attribute name"),
        },
        (_, argument) => to_json(argument)?,
    };

    let long_name = match name {
        "Ref" | "Condition" => name.to_string(),
        _ => format!("Fn::{name}"),
    };

    let mut object = serde_json::Map::new();
    object.insert(long_name, argument);
    Ok(Value::Object(object))
}

fn key_to_string(key: YamlValue) -> anyhow::Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        other => anyhow::bail!("unsupported mapping key {other:?}"),
    }
}
