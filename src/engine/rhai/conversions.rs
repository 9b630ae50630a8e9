//! Data conversion between JSON and Rhai values.
//!
//! Events enter user code as Rhai values; return values leave it through
//! [`ScriptValue`], whose `Serialize` implementation is strict so that values
//! with no JSON representation fail serialization instead of being coerced.

use rhai::{Array, Dynamic, Map};
use serde::{Serialize, Serializer, ser::Error as _};
use serde_json::{Number, Value};

/// Converts a JSON value to a Rhai `Dynamic` value.
///
/// Integer literals that do not fit in `i64` are stored as opaque JSON numbers
/// (decoded with `arbitrary_precision`) so that an entry point echoing them
/// back returns them digit for digit.
pub fn json_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => (*b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let (true, Some(f)) = (n.is_f64(), n.as_f64()) {
                f.into()
            } else {
                Dynamic::from(n.clone())
            }
        }
        Value::String(s) => s.clone().into(),
        Value::Array(arr) => {
            let rhai_array: Array = arr.iter().map(json_to_dynamic).collect();
            rhai_array.into()
        }
        Value::Object(obj) => {
            let mut rhai_map = Map::new();
            for (k, v) in obj {
                rhai_map.insert(k.as_str().into(), json_to_dynamic(v));
            }
            rhai_map.into()
        }
    }
}

/// A value returned by a Rhai entry point.
#[derive(Debug, Clone)]
pub struct ScriptValue(pub Dynamic);

impl Serialize for ScriptValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DynamicRef(&self.0).serialize(serializer)
    }
}

struct DynamicRef<'a>(&'a Dynamic);

impl Serialize for DynamicRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Values captured by closures are shared; read through the lock.
        let value = self.0.flatten_clone();

        if value.is_unit() {
            return serializer.serialize_unit();
        }
        if let Ok(b) = value.as_bool() {
            return serializer.serialize_bool(b);
        }
        if let Ok(i) = value.as_int() {
            return serializer.serialize_i64(i);
        }
        if let Ok(f) = value.as_float() {
            if !f.is_finite() {
                return Err(S::Error::custom(format!(
                    "Out of range float values are not JSON compliant: {f}"
                )));
            }
            return serializer.serialize_f64(f);
        }
        if let Ok(c) = value.as_char() {
            return serializer.collect_str(&c);
        }
        if value.is_string() {
            let s = value.into_immutable_string().map_err(S::Error::custom)?;
            return serializer.serialize_str(s.as_str());
        }
        if let Some(array) = value.read_lock::<Array>() {
            return serializer.collect_seq(array.iter().map(DynamicRef));
        }
        if let Some(map) = value.read_lock::<Map>() {
            return serializer.collect_map(map.iter().map(|(k, v)| (k.as_str(), DynamicRef(v))));
        }
        if let Some(number) = value.read_lock::<Number>() {
            return number.serialize(serializer);
        }

        Err(S::Error::custom(format!(
            "Object of type '{}' is not JSON serializable",
            value.type_name()
        )))
    }
}
