//! Best-effort structural typing of example JSON values.
//!
//! The output is an editing aid for script authors. Nothing downstream relies on it.

use ahash::AHashSet;
use serde_json::{Map, Value};

/// A TypeScript type as inferred from example values.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TsType {
    String,
    Number,
    Boolean,
    Any,
    Named(String),
    Array(Box<TsType>),
    Union(Vec<TsType>),
}

impl TsType {
    fn render(&self) -> String {
        match self {
            TsType::String => "string".to_string(),
            TsType::Number => "number".to_string(),
            TsType::Boolean => "boolean".to_string(),
            TsType::Any => "any".to_string(),
            TsType::Named(name) => name.clone(),
            TsType::Array(inner) => match inner.as_ref() {
                TsType::Union(_) => format!("({})[]", inner.render()),
                other => format!("{}[]", other.render()),
            },
            TsType::Union(members) => members
                .iter()
                .map(TsType::render)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    fn from_members(mut members: Vec<TsType>) -> TsType {
        if members.is_empty() || members.contains(&TsType::Any) {
            return TsType::Any;
        }
        if members.len() == 1 {
            return members.remove(0);
        }
        TsType::Union(members)
    }
}

#[derive(Debug)]
struct Field {
    key: String,
    ty: TsType,
    optional: bool,
}

#[derive(Debug)]
struct Interface {
    name: String,
    fields: Vec<Field>,
}

/// Infers a set of interfaces rooted at one named interface.
pub struct TypeInferrer {
    interfaces: Vec<Interface>,
    used_names: AHashSet<String>,
}

impl TypeInferrer {
    pub fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            used_names: AHashSet::new(),
        }
    }

    /// Declares `root_name` (and any nested interfaces) for `value`.
    ///
    /// A non-object value yields a type alias instead of an interface.
    pub fn infer(mut self, root_name: &str, value: &Value) -> String {
        match value {
            Value::Object(map) => {
                self.used_names.insert(root_name.to_string());
                self.infer_object(root_name.to_string(), &[map]);
                self.render()
            }
            other => {
                self.used_names.insert(root_name.to_string());
                let ty = self.infer_values("item", &[other]);
                let mut out = format!("type {} = {};\n", root_name, ty.render());
                if !self.interfaces.is_empty() {
                    out.push('\n');
                    out.push_str(&self.render());
                }
                out
            }
        }
    }

    /// Registers an interface merged from `objects` and returns its name.
    ///
    /// Keys missing from some of the objects become optional.
    fn infer_object(&mut self, name: String, objects: &[&Map<String, Value>]) -> String {
        let index = self.interfaces.len();
        self.interfaces.push(Interface {
            name: name.clone(),
            fields: Vec::new(),
        });

        let mut keys: Vec<&String> = Vec::new();
        for object in objects {
            for key in object.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let mut fields = Vec::with_capacity(keys.len());
        for key in keys {
            let values: Vec<&Value> = objects.iter().filter_map(|o| o.get(key)).collect();
            let optional = values.len() < objects.len();
            let ty = self.infer_values(key, &values);
            fields.push(Field {
                key: key.clone(),
                ty,
                optional,
            });
        }

        self.interfaces[index].fields = fields;
        name
    }

    fn infer_values(&mut self, key: &str, values: &[&Value]) -> TsType {
        let mut members: Vec<TsType> = Vec::new();
        let mut objects: Vec<&Map<String, Value>> = Vec::new();
        let mut elements: Vec<&Value> = Vec::new();
        let mut saw_array = false;

        for value in values {
            let ty = match value {
                Value::Null => TsType::Any,
                Value::Bool(_) => TsType::Boolean,
                Value::Number(_) => TsType::Number,
                Value::String(_) => TsType::String,
                Value::Object(map) => {
                    objects.push(map);
                    continue;
                }
                Value::Array(items) => {
                    saw_array = true;
                    elements.extend(items.iter());
                    continue;
                }
            };
            if !members.contains(&ty) {
                members.push(ty);
            }
        }

        if !objects.is_empty() {
            let name = self.unique_name(key);
            members.push(TsType::Named(self.infer_object(name, &objects)));
        }
        if saw_array {
            let inner = if elements.is_empty() {
                TsType::Any
            } else {
                self.infer_values(key, &elements)
            };
            members.push(TsType::Array(Box::new(inner)));
        }

        TsType::from_members(members)
    }

    fn unique_name(&mut self, key: &str) -> String {
        let base = pascal_case(key);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.used_names.contains(&name) {
            name = format!("{}{}", base, suffix);
            suffix += 1;
        }
        self.used_names.insert(name.clone());
        name
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for (i, interface) in self.interfaces.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("interface {} {{\n", interface.name));
            for field in &interface.fields {
                out.push_str(&format!(
                    "  {}{}: {};\n",
                    property_key(&field.key),
                    if field.optional { "?" } else { "" },
                    field.ty.render()
                ));
            }
            out.push_str("}\n");
        }
        out
    }
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

/// `"user_profile"` -> `"UserProfile"`. Falls back to `"Item"` when nothing usable is left.
fn pascal_case(key: &str) -> String {
    let mut name: String = key
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.is_empty() {
        name = "Item".to_string();
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}
