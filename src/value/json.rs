//! Conversion between `Value` and `serde_json::Value`.
//!
//! Kinds JSON cannot express directly are written as objects tagged with a
//! `$`-prefixed key, e.g. `{"$regexp": "^a"}` or `{"$type": "Dog", "name": "rex"}`.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Number, json};

use super::{ErrorValue, Function, Value};
use crate::registry::TypeRegistry;

impl Value {
    pub fn from_json(json: &serde_json::Value, types: &TypeRegistry) -> Result<Value> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => number_from_json(n),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::from_json(item, types))
                    .collect::<Result<_>>()?,
            ),
            serde_json::Value::Object(map) => object_from_json(map, types)?,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined => json!({ "$undefined": true }),
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => json!(n),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| json!({ "$float": f.to_string() })),
            Value::BigInt(n) => json!({ "$bigint": n.to_string() }),
            Value::Symbol(s) => json!({ "$symbol": s.as_ref() }),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Function(f) => json!({ "$function": f.name() }),
            Value::RegExp(re) => json!({ "$regexp": re.as_str() }),
            Value::Date(ms) => json!({ "$date": ms }),
            Value::Error(e) => json!({ "$error": e.subtype, "message": e.message }),
            Value::Set(items) => json!({ "$set": items.iter().map(Value::to_json).collect::<Vec<_>>() }),
            Value::Map(entries) => json!({
                "$map": entries
                    .iter()
                    .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                    .collect::<Vec<_>>()
            }),
            Value::Instance(inst) => {
                let mut out = Map::new();
                out.insert("$type".to_string(), json!(inst.class.name));
                for (k, v) in &inst.fields {
                    out.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

fn number_from_json(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::BigInt(u.into())
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn object_from_json(map: &Map<String, serde_json::Value>, types: &TypeRegistry) -> Result<Value> {
    if map.contains_key("$undefined") {
        return Ok(Value::Undefined);
    }
    if let Some(src) = map.get("$regexp") {
        let src = src.as_str().context("`$regexp` must be a string")?;
        return Value::regexp(src).with_context(|| format!("invalid regular expression `{src}`"));
    }
    if let Some(ms) = map.get("$date") {
        let ms = ms.as_i64().context("`$date` must be an integer (epoch millis)")?;
        return Ok(Value::Date(ms));
    }
    if let Some(subtype) = map.get("$error") {
        let subtype = subtype.as_str().context("`$error` must be a string")?;
        let message = map.get("message").and_then(|m| m.as_str()).unwrap_or("");
        return Ok(Value::Error(ErrorValue::new(subtype, message)));
    }
    if let Some(desc) = map.get("$symbol") {
        let desc = desc.as_str().context("`$symbol` must be a string")?;
        return Ok(Value::symbol(desc));
    }
    if let Some(n) = map.get("$bigint") {
        let n = match n {
            serde_json::Value::String(s) => s
                .parse::<i128>()
                .with_context(|| format!("invalid `$bigint` literal `{s}`"))?,
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => i.into(),
                None => bail!("`$bigint` must be an integer"),
            },
            _ => bail!("`$bigint` must be a string or integer"),
        };
        return Ok(Value::BigInt(n));
    }
    if let Some(f) = map.get("$float") {
        let f = match f {
            serde_json::Value::String(s) => s
                .parse::<f64>()
                .with_context(|| format!("invalid `$float` literal `{s}`"))?,
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            _ => bail!("`$float` must be a string or number"),
        };
        return Ok(Value::Float(f));
    }
    if let Some(items) = map.get("$set") {
        let items = items.as_array().context("`$set` must be an array")?;
        let items = items
            .iter()
            .map(|item| Value::from_json(item, types))
            .collect::<Result<_>>()?;
        return Ok(Value::Set(items));
    }
    if let Some(entries) = map.get("$map") {
        let entries = entries.as_array().context("`$map` must be an array of pairs")?;
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.as_array().map(Vec::as_slice) {
                Some([k, v]) => out.push((Value::from_json(k, types)?, Value::from_json(v, types)?)),
                _ => bail!("`$map` entries must be `[key, value]` pairs"),
            }
        }
        return Ok(Value::Map(out));
    }
    if let Some(name) = map.get("$function") {
        let name = name.as_str().context("`$function` must be a string")?;
        return Ok(Value::Function(Function::new(name, |_| Value::Undefined)));
    }
    if let Some(name) = map.get("$type") {
        let name = name.as_str().context("`$type` must be a string")?;
        let mut fields = BTreeMap::new();
        for (k, v) in map.iter().filter(|(k, _)| k.as_str() != "$type") {
            fields.insert(k.clone(), Value::from_json(v, types)?);
        }
        return Ok(Value::Instance(super::Instance {
            class: types.class(name),
            fields,
        }));
    }

    let mut out = BTreeMap::new();
    for (k, v) in map {
        out.insert(k.clone(), Value::from_json(v, types)?);
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Kind, classify};

    fn parse(src: &str) -> Value {
        let json: serde_json::Value = serde_json::from_str(src).unwrap();
        Value::from_json(&json, &TypeRegistry::new()).unwrap()
    }

    #[test]
    fn plain_json() {
        assert_eq!(parse("null"), Value::Null);
        assert_eq!(parse("[1, 2.5, \"a\"]"), Value::array([
            Value::Int(1),
            Value::Float(2.5),
            Value::from("a")
        ]));
        assert_eq!(parse("{\"x\": 1}"), Value::object([("x", Value::Int(1))]));
    }

    #[test]
    fn tagged_kinds() {
        assert_eq!(classify(&parse("{\"$undefined\": true}")), Kind::Undefined);
        assert_eq!(classify(&parse("{\"$regexp\": \"^a\"}")), Kind::RegExp);
        assert_eq!(classify(&parse("{\"$date\": 0}")), Kind::Date);
        assert_eq!(classify(&parse("{\"$symbol\": \"s\"}")), Kind::Symbol);
        assert_eq!(classify(&parse("{\"$bigint\": \"12\"}")), Kind::BigInt);
        assert_eq!(classify(&parse("{\"$set\": [1]}")), Kind::Set);
        assert_eq!(classify(&parse("{\"$map\": [[1, 2]]}")), Kind::Map);
        assert_eq!(classify(&parse("{\"$function\": \"f\"}")), Kind::Function);
        assert_eq!(classify(&parse("{\"$float\": \"4.2\"}")), Kind::Float);
        assert_eq!(
            classify(&parse("{\"$error\": \"RangeError\", \"message\": \"m\"}")),
            Kind::Error { subtype: "RangeError" }
        );
    }

    #[test]
    fn typed_instance_uses_registry_parent() {
        let mut types = TypeRegistry::new();
        types.define("Dog", Some("Animal"));
        let json: serde_json::Value =
            serde_json::from_str("{\"$type\": \"Dog\", \"name\": \"rex\"}").unwrap();
        let v = Value::from_json(&json, &types).unwrap();
        assert_eq!(
            classify(&v),
            Kind::Instance {
                type_name: "Dog",
                parent: Some("Animal")
            }
        );
    }

    #[test]
    fn bad_tags_are_errors() {
        let types = TypeRegistry::new();
        for src in [
            "{\"$regexp\": \"(\"}",
            "{\"$date\": \"soon\"}",
            "{\"$bigint\": \"abc\"}",
            "{\"$map\": [[1]]}",
        ] {
            let json: serde_json::Value = serde_json::from_str(src).unwrap();
            assert!(Value::from_json(&json, &types).is_err(), "{src}");
        }
    }

    #[test]
    fn to_json_inverts_tags() {
        let v = Value::array([
            Value::Undefined,
            Value::BigInt(5),
            Value::Error(ErrorValue::new("TypeError", "m")),
        ]);
        let types = TypeRegistry::new();
        assert_eq!(Value::from_json(&v.to_json(), &types).unwrap(), v);
    }
}
