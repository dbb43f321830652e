//! Per-leaf sealing of structured documents

use crate::cipher::{is_token, open_value, seal_value, DataKey, ValueType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::metadata::MacBuilder;
use serde_json::{Number, Value};

/// Visit every non-null scalar with its AAD path (`a:b:`); arrays do not add a segment
fn walk<F>(value: &mut Value, path: &mut Vec<String>, visit: &mut F) -> EnvelopeResult<()>
where
    F: FnMut(&mut Value, &str) -> EnvelopeResult<()>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push(key.clone());
                walk(child, path, visit)?;
                path.pop();
            }
            Ok(())
        }
        Value::Array(items) => items.iter_mut().try_for_each(|item| walk(item, path, visit)),
        Value::Null => Ok(()),
        leaf => {
            let mut aad = path.join(":");
            aad.push(':');
            visit(leaf, &aad)
        }
    }
}

pub(crate) fn seal_tree(value: &mut Value, data_key: &DataKey, mac: &mut MacBuilder) -> EnvelopeResult<()> {
    walk(value, &mut Vec::new(), &mut |leaf, aad| {
        let (plain, value_type) = match leaf {
            Value::String(s) => (s.clone(), ValueType::Str),
            Value::Bool(b) => (b.to_string(), ValueType::Bool),
            Value::Number(n) if n.is_f64() => (n.to_string(), ValueType::Float),
            Value::Number(n) => (n.to_string(), ValueType::Int),
            _ => return Ok(()),
        };
        mac.update(plain.as_bytes());
        *leaf = Value::String(seal_value(data_key, plain.as_bytes(), value_type, aad)?);
        Ok(())
    })
}

pub(crate) fn open_tree(value: &mut Value, data_key: &DataKey, mac: &mut MacBuilder) -> EnvelopeResult<()> {
    walk(value, &mut Vec::new(), &mut |leaf, aad| {
        let token = match leaf {
            Value::String(s) if is_token(s) => s.clone(),
            _ => {
                return Err(EnvelopeError::malformed(format!(
                    "value at '{aad}' is not encrypted"
                )))
            }
        };
        let (plain, value_type) = open_value(data_key, &token, aad)?;
        mac.update(&plain);

        let text = String::from_utf8(plain)
            .map_err(|_| EnvelopeError::malformed(format!("value at '{aad}' is not UTF-8")))?;
        let bad = |kind: &str| EnvelopeError::malformed(format!("value at '{aad}' is not a valid {kind}"));
        *leaf = match value_type {
            ValueType::Str => Value::String(text),
            ValueType::Bool => Value::Bool(text.parse().map_err(|_| bad("bool"))?),
            ValueType::Int => Value::Number(
                text.parse::<i64>()
                    .map(Number::from)
                    .or_else(|_| text.parse::<u64>().map(Number::from))
                    .map_err(|_| bad("int"))?,
            ),
            ValueType::Float => Value::Number(
                text.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| bad("float"))?,
            ),
            ValueType::Bytes => return Err(bad("tree value")),
        };
        Ok(())
    })
}
